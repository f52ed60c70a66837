use std::{
    env,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    /// Directory holding one `<artifact>.json` file per model.
    pub model_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let listen_addr = env::var("SERVER_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".into())
            .parse()
            .unwrap_or_else(|_| SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8080));

        let model_dir = env::var("MODEL_DIR")
            .ok()
            .map(PathBuf::from)
            .unwrap_or_else(default_model_dir);

        Ok(Self {
            listen_addr,
            model_dir,
        })
    }

    pub fn with_model_dir(mut self, model_dir: impl AsRef<Path>) -> Self {
        self.model_dir = model_dir.as_ref().to_path_buf();
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8080),
            model_dir: default_model_dir(),
        }
    }
}

/// Artifacts live next to the binary unless `MODEL_DIR` says otherwise.
fn default_model_dir() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("models")))
        .unwrap_or_else(|| PathBuf::from("models"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_listens_on_localhost_8080() {
        let config = AppConfig::default();
        assert_eq!(config.listen_addr.port(), 8080);
        assert!(config.listen_addr.ip().is_loopback());
        assert!(config.model_dir.ends_with("models"));
    }

    #[test]
    fn model_dir_override() {
        let config = AppConfig::default().with_model_dir("/srv/artifacts");
        assert_eq!(config.model_dir, PathBuf::from("/srv/artifacts"));
    }
}
