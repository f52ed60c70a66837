//! The fixed set of prediction endpoints served by the gateway.

use serde_json::Value;

use crate::{error::PredictError, schema::Schema};

/// How a predictor's scalar is rendered in the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    /// Integer class label.
    Label,
    /// Continuous value.
    Magnitude,
    /// Label code mapped through [`sleep_category`].
    SleepCategory,
}

impl Output {
    pub fn render(self, value: f64) -> Result<Value, PredictError> {
        if !value.is_finite() {
            return Err(PredictError::NonFinite);
        }
        Ok(match self {
            Output::Label => Value::from(value.trunc() as i64),
            Output::Magnitude => Value::from(value),
            Output::SleepCategory => Value::from(sleep_category(value.trunc() as i64)),
        })
    }
}

pub fn sleep_category(code: i64) -> &'static str {
    match code {
        0 => "Insomnia",
        1 => "None",
        2 => "Sleep Apnea",
        _ => "Unknown",
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Endpoint {
    /// Model name used in error messages and registry lookups.
    pub name: &'static str,
    /// Segment under `/predict/`.
    pub path: &'static str,
    /// Artifact file stem inside the model directory.
    pub artifact: &'static str,
    pub schema: Schema,
    pub response_key: &'static str,
    pub output: Output,
}

impl Endpoint {
    pub fn route(&self) -> String {
        format!("/predict/{}", self.path)
    }
}

pub const DIABETES: Endpoint = Endpoint {
    name: "Diabetes",
    path: "diabetes",
    artifact: "diabetes",
    schema: Schema::strict(&[
        "Pregnancies",
        "Glucose",
        "BloodPressure",
        "SkinThickness",
        "Insulin",
        "BMI",
        "DiabetesPedigreeFunction",
        "Age",
    ]),
    response_key: "Diabetes Prediction",
    output: Output::Label,
};

pub const STRESS: Endpoint = Endpoint {
    name: "Stress",
    path: "stress",
    artifact: "stress",
    schema: Schema::strict(&[
        "snoring_rate",
        "respiration_rate",
        "body_temperature",
        "limb_movement",
        "blood_oxygen",
        "eye_movement",
        "sleeping_hours",
        "heart_rate",
    ]),
    response_key: "Stress Level",
    output: Output::Label,
};

pub const THYROID: Endpoint = Endpoint {
    name: "Thyroid",
    path: "thyroid",
    artifact: "thyroid",
    schema: Schema::strict(&["age", "sex", "TSH", "T3", "TT4", "T4U", "FTI"]),
    response_key: "Thyroid Condition",
    output: Output::Label,
};

pub const HEART: Endpoint = Endpoint {
    name: "Heart",
    path: "heart",
    artifact: "heart",
    schema: Schema::strict(&[
        "age", "sex", "cp", "trestbps", "chol", "fbs", "restecg", "thalach", "thal",
    ]),
    response_key: "Heart Disease Prediction",
    output: Output::Label,
};

pub const CALORIE: Endpoint = Endpoint {
    name: "Calorie",
    path: "calorie",
    artifact: "calorie",
    schema: Schema::strict(&[
        "Gender",
        "Age",
        "Height",
        "Weight",
        "Duration",
        "Heart_Rate",
        "Body_Temp",
    ]),
    response_key: "Calorie Burnt Prediction",
    output: Output::Magnitude,
};

pub const LUNGS: Endpoint = Endpoint {
    name: "Lungs",
    path: "lungs",
    artifact: "lungs",
    schema: Schema::strict(&[
        "GENDER",
        "AGE",
        "SMOKING",
        "YELLOW_FINGERS",
        "ANXIETY",
        "PEER_PRESSURE",
        "CHRONIC DISEASE",
        "FATIGUE",
        "ALLERGY",
        "WHEEZING",
        "ALCOHOL CONSUMING",
        "COUGHING",
        "SHORTNESS OF BREATH",
        "SWALLOWING DIFFICULTY",
        "CHEST PAIN",
    ]),
    response_key: "Lungs Prediction",
    output: Output::Label,
};

pub const COVID: Endpoint = Endpoint {
    name: "COVID",
    path: "covid",
    artifact: "covid",
    schema: Schema::strict(&[
        "Breathing Problem",
        "Fever",
        "Dry Cough",
        "Sore throat",
        "Running Nose",
        "Asthma",
        "Chronic Lung Disease",
        "Headache",
        "Heart Disease",
        "Diabetes",
    ]),
    response_key: "COVID Risk Prediction",
    output: Output::Label,
};

pub const GENERAL_HEALTH: Endpoint = Endpoint {
    name: "General Health",
    path: "genhealth",
    artifact: "genhealth",
    schema: Schema::strict(&[
        "Exercise",
        "Heart_Disease",
        "Skin_Cancer",
        "Other_Cancer",
        "Depression",
        "Diabetes",
        "Arthritis",
        "Sex",
        "Age_Category",
        "BMI",
    ]),
    response_key: "General Health Prediction",
    output: Output::Label,
};

pub const SLEEP: Endpoint = Endpoint {
    name: "Sleep Disorder",
    path: "sleep",
    artifact: "sleep",
    schema: Schema::fill_zero(&[
        "Gender",
        "Age",
        "Sleep Duration",
        "Quality of Sleep",
        "Physical Activity Level",
        "Stress Level",
        "BMI Category",
        "Heart Rate",
        "Daily Steps",
        "Systolic",
        "Diastolic",
        "Occupation_Doctor",
        "Occupation_Engineer",
        "Occupation_Lawyer",
        "Occupation_Manager",
        "Occupation_Nurse",
        "Occupation_Sales Representative",
        "Occupation_Salesperson",
        "Occupation_Scientist",
        "Occupation_Software Engineer",
        "Occupation_Teacher",
    ]),
    response_key: "Sleep Disorder Prediction",
    output: Output::SleepCategory,
};

pub const ALL: &[Endpoint] = &[
    DIABETES,
    STRESS,
    THYROID,
    HEART,
    CALORIE,
    LUNGS,
    COVID,
    GENERAL_HEALTH,
    SLEEP,
];

/// Path served by the first release for calorie predictions.
pub const DEPRECATED_CALORIE_ROUTE: &str = "/predict/calories";

pub fn by_name(name: &str) -> Option<&'static Endpoint> {
    ALL.iter().find(|endpoint| endpoint.name == name)
}
