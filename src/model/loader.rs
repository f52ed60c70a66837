use std::{fs, path::Path};

use serde::Deserialize;

use crate::{
    error::{LoadError, PredictError},
    model::Predictor,
    schema::Schema,
};

/// On-disk model description. Only the shapes the service can evaluate
/// natively are supported.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    LinearRegression {
        #[serde(default)]
        feature_names: Option<Vec<String>>,
        coefficients: Vec<f64>,
        intercept: f64,
    },
    LinearClassifier {
        #[serde(default)]
        feature_names: Option<Vec<String>>,
        coefficients: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
        classes: Vec<i64>,
    },
    DecisionTree {
        #[serde(default)]
        feature_names: Option<Vec<String>>,
        n_features: usize,
        nodes: Vec<TreeNode>,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

impl ModelArtifact {
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let raw = fs::read_to_string(path)?;
        let artifact: ModelArtifact = serde_json::from_str(&raw)?;
        artifact.check()?;
        Ok(artifact)
    }

    pub fn n_features(&self) -> usize {
        match self {
            ModelArtifact::LinearRegression { coefficients, .. } => coefficients.len(),
            ModelArtifact::LinearClassifier { coefficients, .. } => {
                coefficients.first().map_or(0, Vec::len)
            }
            ModelArtifact::DecisionTree { n_features, .. } => *n_features,
        }
    }

    fn feature_names(&self) -> Option<&[String]> {
        match self {
            ModelArtifact::LinearRegression { feature_names, .. }
            | ModelArtifact::LinearClassifier { feature_names, .. }
            | ModelArtifact::DecisionTree { feature_names, .. } => feature_names.as_deref(),
        }
    }

    /// Verifies the artifact can serve requests shaped by `schema`.
    pub fn check_schema(&self, schema: &Schema) -> Result<(), LoadError> {
        if self.n_features() != schema.len() {
            return Err(LoadError::SchemaMismatch(format!(
                "model takes {} features, endpoint supplies {}",
                self.n_features(),
                schema.len()
            )));
        }
        if let Some(names) = self.feature_names() {
            if !names.iter().map(String::as_str).eq(schema.fields.iter().copied()) {
                return Err(LoadError::SchemaMismatch(format!(
                    "feature names {names:?} differ from {:?}",
                    schema.fields
                )));
            }
        }
        Ok(())
    }

    fn check(&self) -> Result<(), LoadError> {
        if self.n_features() == 0 {
            return Err(LoadError::Invalid("model has no inputs".into()));
        }
        if let Some(names) = self.feature_names() {
            if names.len() != self.n_features() {
                return Err(LoadError::Invalid(format!(
                    "{} feature names for {} inputs",
                    names.len(),
                    self.n_features()
                )));
            }
        }

        match self {
            ModelArtifact::LinearRegression { .. } => Ok(()),
            ModelArtifact::LinearClassifier {
                coefficients,
                intercepts,
                classes,
                ..
            } => {
                let width = coefficients[0].len();
                if coefficients.iter().any(|row| row.len() != width) {
                    return Err(LoadError::Invalid("ragged coefficient rows".into()));
                }
                if intercepts.len() != coefficients.len() {
                    return Err(LoadError::Invalid(format!(
                        "{} intercepts for {} coefficient rows",
                        intercepts.len(),
                        coefficients.len()
                    )));
                }
                let expected_classes = if coefficients.len() == 1 {
                    2
                } else {
                    coefficients.len()
                };
                if classes.len() != expected_classes {
                    return Err(LoadError::Invalid(format!(
                        "expected {expected_classes} classes, found {}",
                        classes.len()
                    )));
                }
                Ok(())
            }
            ModelArtifact::DecisionTree {
                n_features, nodes, ..
            } => {
                if nodes.is_empty() {
                    return Err(LoadError::Invalid("tree has no nodes".into()));
                }
                for (idx, node) in nodes.iter().enumerate() {
                    if let TreeNode::Split {
                        feature,
                        left,
                        right,
                        ..
                    } = node
                    {
                        if *feature >= *n_features {
                            return Err(LoadError::Invalid(format!(
                                "node {idx} splits on feature {feature} of {n_features}"
                            )));
                        }
                        // Children must come after their parent, which rules out cycles.
                        let in_order = |child: usize| child > idx && child < nodes.len();
                        if !in_order(*left) || !in_order(*right) {
                            return Err(LoadError::Invalid(format!(
                                "node {idx} has out-of-order children"
                            )));
                        }
                    }
                }
                Ok(())
            }
        }
    }
}

impl Predictor for ModelArtifact {
    fn predict(&self, features: &[f64]) -> Result<f64, PredictError> {
        if features.len() != self.n_features() {
            return Err(PredictError::FeatureCount {
                expected: self.n_features(),
                actual: features.len(),
            });
        }

        let value = match self {
            ModelArtifact::LinearRegression {
                coefficients,
                intercept,
                ..
            } => dot(coefficients, features) + intercept,
            ModelArtifact::LinearClassifier {
                coefficients,
                intercepts,
                classes,
                ..
            } => {
                let scores: Vec<f64> = coefficients
                    .iter()
                    .zip(intercepts)
                    .map(|(row, bias)| dot(row, features) + bias)
                    .collect();
                let class_idx = match scores.as_slice() {
                    [score] => usize::from(*score > 0.0),
                    _ => argmax(scores.iter().copied()),
                };
                classes[class_idx] as f64
            }
            ModelArtifact::DecisionTree { nodes, .. } => walk(nodes, features),
        };

        if value.is_finite() {
            Ok(value)
        } else {
            Err(PredictError::NonFinite)
        }
    }
}

fn dot(weights: &[f64], features: &[f64]) -> f64 {
    weights.iter().zip(features).map(|(w, x)| w * x).sum()
}

fn argmax<I>(scores: I) -> usize
where
    I: IntoIterator<Item = f64>,
{
    let mut best = (0, f64::NEG_INFINITY);
    for (idx, score) in scores.into_iter().enumerate() {
        if score > best.1 {
            best = (idx, score);
        }
    }
    best.0
}

fn walk(nodes: &[TreeNode], features: &[f64]) -> f64 {
    let mut idx = 0;
    loop {
        match &nodes[idx] {
            TreeNode::Leaf { value } => return *value,
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                idx = if features[*feature] <= *threshold {
                    *left
                } else {
                    *right
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use serde_json::json;

    use super::*;

    fn parse(value: serde_json::Value) -> Result<ModelArtifact, LoadError> {
        let artifact: ModelArtifact = serde_json::from_value(value)?;
        artifact.check()?;
        Ok(artifact)
    }

    #[test]
    fn linear_regression() {
        let model = parse(json!({
            "kind": "linear_regression",
            "coefficients": [2.0, 0.5],
            "intercept": 1.0
        }))
        .unwrap();
        assert_eq!(model.predict(&[3.0, 4.0]).unwrap(), 9.0);
    }

    #[test]
    fn binary_classifier_thresholds_at_zero() {
        let model = parse(json!({
            "kind": "linear_classifier",
            "coefficients": [[1.0, -1.0]],
            "intercepts": [0.0],
            "classes": [0, 1]
        }))
        .unwrap();
        assert_eq!(model.predict(&[2.0, 1.0]).unwrap(), 1.0);
        assert_eq!(model.predict(&[1.0, 2.0]).unwrap(), 0.0);
    }

    #[test]
    fn multiclass_classifier_picks_highest_score() {
        let model = parse(json!({
            "kind": "linear_classifier",
            "coefficients": [[1.0, 0.0], [0.0, 1.0], [0.5, 0.5]],
            "intercepts": [0.0, 0.0, 0.2],
            "classes": [0, 1, 2]
        }))
        .unwrap();
        assert_eq!(model.predict(&[5.0, 1.0]).unwrap(), 0.0);
        assert_eq!(model.predict(&[1.0, 5.0]).unwrap(), 1.0);
        assert_eq!(model.predict(&[1.0, 1.0]).unwrap(), 2.0);
    }

    #[test]
    fn decision_tree_walks_splits() {
        let model = parse(json!({
            "kind": "decision_tree",
            "n_features": 2,
            "nodes": [
                {"feature": 0, "threshold": 50.0, "left": 1, "right": 2},
                {"value": 0.0},
                {"feature": 1, "threshold": 200.0, "left": 3, "right": 4},
                {"value": 0.0},
                {"value": 1.0}
            ]
        }))
        .unwrap();
        assert_eq!(model.predict(&[40.0, 300.0]).unwrap(), 0.0);
        assert_eq!(model.predict(&[60.0, 150.0]).unwrap(), 0.0);
        assert_eq!(model.predict(&[60.0, 250.0]).unwrap(), 1.0);
    }

    #[test]
    fn rejects_wrong_feature_count_at_predict() {
        let model = parse(json!({
            "kind": "linear_regression",
            "coefficients": [1.0, 1.0, 1.0],
            "intercept": 0.0
        }))
        .unwrap();
        assert!(matches!(
            model.predict(&[1.0]),
            Err(PredictError::FeatureCount {
                expected: 3,
                actual: 1
            })
        ));
    }

    #[test]
    fn rejects_malformed_artifacts() {
        let cases = [
            json!({"kind": "linear_regression", "coefficients": [], "intercept": 0.0}),
            json!({
                "kind": "linear_classifier",
                "coefficients": [[1.0], [1.0, 2.0]],
                "intercepts": [0.0, 0.0],
                "classes": [0, 1]
            }),
            json!({
                "kind": "linear_classifier",
                "coefficients": [[1.0]],
                "intercepts": [0.0],
                "classes": [0]
            }),
            json!({
                "kind": "decision_tree",
                "n_features": 1,
                "nodes": [{"feature": 0, "threshold": 1.0, "left": 0, "right": 1}, {"value": 1.0}]
            }),
            json!({
                "kind": "decision_tree",
                "n_features": 1,
                "nodes": [{"feature": 3, "threshold": 1.0, "left": 1, "right": 2}, {"value": 0.0}, {"value": 1.0}]
            }),
            json!({"kind": "random_forest"}),
        ];
        for case in cases {
            assert!(parse(case.clone()).is_err(), "accepted {case}");
        }
    }

    #[test]
    fn schema_check_compares_names_in_order() {
        const FIELDS: &[&str] = &["age", "chol"];
        let schema = Schema::strict(FIELDS);

        let matching = parse(json!({
            "kind": "linear_regression",
            "feature_names": ["age", "chol"],
            "coefficients": [1.0, 1.0],
            "intercept": 0.0
        }))
        .unwrap();
        assert!(matching.check_schema(&schema).is_ok());

        let swapped = parse(json!({
            "kind": "linear_regression",
            "feature_names": ["chol", "age"],
            "coefficients": [1.0, 1.0],
            "intercept": 0.0
        }))
        .unwrap();
        assert!(matches!(
            swapped.check_schema(&schema),
            Err(LoadError::SchemaMismatch(_))
        ));

        let too_wide = parse(json!({
            "kind": "linear_regression",
            "coefficients": [1.0, 1.0, 1.0],
            "intercept": 0.0
        }))
        .unwrap();
        assert!(too_wide.check_schema(&schema).is_err());
    }

    #[test]
    fn from_path_reports_missing_file() {
        let path = PathBuf::from("/nonexistent/heart.json");
        assert!(matches!(
            ModelArtifact::from_path(&path),
            Err(LoadError::Io(_))
        ));
    }
}
