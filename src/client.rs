//! Form client for the prediction endpoint.
//!
//! Mirrors what the browser form does: validate the raw field strings against
//! fixed ranges, map form keys to wire names, canonicalize categoricals, POST
//! the JSON body and render the structured response as text.

use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::sync::OnceLock;
use std::time::Duration;

use crate::explanation::format_value;
use crate::models::{Finding, Gender, ObservationPayload};

/// Shown whenever the endpoint cannot be reached or answers non-2xx.
pub const FETCH_FAILURE_MESSAGE: &str = "Unable to fetch prediction";

/// Inclusive `[min, max]` accepted by the form for each numeric field.
pub const FIELD_LIMITS: [(&str, f64, f64); 9] = [
    ("age", 18.0, 90.0),
    ("bilirubin", 0.1, 15.0),
    ("alk_phos", 40.0, 550.0),
    ("alt", 7.0, 190.0),
    ("ast", 8.0, 250.0),
    ("albumin", 1.5, 5.0),
    ("proteins", 2.0, 7.9),
    ("prothrombin", 9.4, 35.0),
    ("platelets", 55.0, 450.0),
];

pub fn field_limits(name: &str) -> Option<(f64, f64)> {
    FIELD_LIMITS
        .iter()
        .find(|(field, _, _)| *field == name)
        .map(|(_, min, max)| (*min, *max))
}

fn numeric_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9]+(\.[0-9]+)?$").expect("numeric pattern is valid"))
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldError {
    NotNumeric,
    OutOfRange { min: f64, max: f64 },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::NotNumeric => write!(f, "Please enter a valid numeric value."),
            FieldError::OutOfRange { min, max } => write!(
                f,
                "Value must be between {} and {}",
                format_value(*min),
                format_value(*max)
            ),
        }
    }
}

/// Validates one form field. Fields without limits always pass.
pub fn validate_field(name: &str, raw: &str) -> Result<(), FieldError> {
    let Some((min, max)) = field_limits(name) else {
        return Ok(());
    };

    let raw = raw.trim();
    if !numeric_pattern().is_match(raw) {
        return Err(FieldError::NotNumeric);
    }
    let value: f64 = raw.parse().map_err(|_| FieldError::NotNumeric)?;
    if value < min || value > max {
        return Err(FieldError::OutOfRange { min, max });
    }
    Ok(())
}

/// Raw `(form key, value)` pairs as entered by the user.
#[derive(Debug, Clone, Default)]
pub struct FormSubmission {
    fields: Vec<(String, String)>,
}

impl FormSubmission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Parses `key=value` arguments.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut form = Self::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| format!("expected key=value, got `{}`", pair))?;
            form = form.field(key.trim(), value);
        }
        Ok(form)
    }

    fn get(&self, name: &str) -> &str {
        self.fields
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .unwrap_or("")
    }

    /// Every numeric field that fails validation. A missing field counts as
    /// empty input.
    pub fn validate(&self) -> Vec<(String, FieldError)> {
        FIELD_LIMITS
            .iter()
            .filter_map(|(name, _, _)| {
                validate_field(name, self.get(name))
                    .err()
                    .map(|err| (name.to_string(), err))
            })
            .collect()
    }

    /// Maps form keys to the wire payload. Unparseable numbers become 0.
    pub fn to_payload(&self) -> ObservationPayload {
        let number = |name: &str| self.get(name).trim().parse::<f64>().unwrap_or(0.0);
        let gender = Gender::normalize(self.get("Gender"));
        let ascites = Finding::normalize(self.get("Ascites"));
        let liver_firmness = Finding::normalize(self.get("LiverFirmness"));

        ObservationPayload {
            age: number("age"),
            gender: gender.to_string(),
            total_bilirubin: number("bilirubin"),
            alkaline_phosphatase: number("alk_phos"),
            alanine_aminotransferase: number("alt"),
            aspartate_aminotransferase: number("ast"),
            albumin: number("albumin"),
            total_proteins: number("proteins"),
            prothrombin_time: number("prothrombin"),
            platelets: number("platelets"),
            ascites: ascites.to_string(),
            liver_firmness: liver_firmness.to_string(),
        }
    }
}

/// Prediction as the client reads it back. Every section is optional so a
/// partial body still renders whatever it carries.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PredictionView {
    #[serde(rename = "Predicted Stage")]
    pub predicted_stage: Option<String>,
    #[serde(rename = "Stage Explanation")]
    pub stage_explanation: Option<String>,
    #[serde(rename = "Feature Explanations")]
    pub feature_explanations: Option<Vec<String>>,
    #[serde(rename = "Ascites")]
    pub ascites: Option<String>,
    #[serde(rename = "LiverFirmness")]
    pub liver_firmness: Option<String>,
    #[serde(rename = "Calculated Values")]
    pub calculated_values: Option<CalculatedView>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct CalculatedView {
    #[serde(rename = "AST ALT Ratio")]
    pub ast_alt_ratio: Option<f64>,
    #[serde(rename = "FIB-4 Score")]
    pub fib4_score: Option<f64>,
    #[serde(rename = "Albumin Globulin Ratio")]
    pub albumin_globulin_ratio: Option<f64>,
}

#[derive(Debug, Clone)]
pub enum ClientError {
    /// Submission refused locally; nothing was sent.
    Invalid(Vec<(String, FieldError)>),
    /// Network failure, non-2xx status or unreadable body.
    Unavailable(String),
    /// 2xx response carrying an `error` field.
    Server(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Invalid(issues) => {
                write!(f, "Please enter valid values before submitting!")?;
                for (field, err) in issues {
                    write!(f, "\n  {}: {}", field, err)?;
                }
                Ok(())
            }
            ClientError::Unavailable(_) => write!(f, "Error: {}", FETCH_FAILURE_MESSAGE),
            ClientError::Server(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}

/// HTTP client for the prediction endpoint. Never retries.
#[derive(Clone)]
pub struct PredictionClient {
    client: reqwest::Client,
    endpoint: String,
}

impl PredictionClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ClientError::Unavailable(format!("Failed to create client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub async fn submit(&self, form: &FormSubmission) -> Result<PredictionView, ClientError> {
        let issues = form.validate();
        if !issues.is_empty() {
            return Err(ClientError::Invalid(issues));
        }

        let payload = form.to_payload();
        tracing::debug!("Sending prediction request: {:?}", payload);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Prediction request failed: {}", e);
                ClientError::Unavailable(e.to_string())
            })?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);
        if !status.is_success() {
            return Err(ClientError::Unavailable(format!("HTTP status {}", status)));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ClientError::Unavailable(format!("Failed to parse response: {}", e)))?;

        if let Some(error) = body.get("error") {
            let msg = error
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Err(ClientError::Server(msg));
        }

        serde_json::from_value(body)
            .map_err(|e| ClientError::Unavailable(format!("Unexpected response shape: {}", e)))
    }
}

const UNKNOWN: &str = "Unknown";

fn or_unknown(value: Option<f64>) -> String {
    value.map(format_value).unwrap_or_else(|| UNKNOWN.to_string())
}

/// Renders a successful prediction the way the result panel lays it out.
/// Missing explanation or calculated-value sections are left out.
pub fn render_prediction(response: &PredictionView) -> String {
    let stage = response
        .predicted_stage
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN);
    let mut out = format!("Prediction: {}\n", stage);

    if let Some(text) = response.stage_explanation.as_deref().filter(|s| !s.is_empty()) {
        out.push_str("\nStage Explanation:\n");
        out.push_str(text);
        out.push('\n');
    }

    if let Some(items) = &response.feature_explanations {
        out.push_str("\nFeature Explanations:\n");
        for item in items {
            out.push_str("  - ");
            out.push_str(item);
            out.push('\n');
        }
    }

    if let Some(calc) = &response.calculated_values {
        out.push_str("\nCalculated Values:\n");
        out.push_str(&format!("  AST/ALT Ratio: {}\n", or_unknown(calc.ast_alt_ratio)));
        out.push_str(&format!("  FIB-4 Score: {}\n", or_unknown(calc.fib4_score)));
        out.push_str(&format!(
            "  Albumin Globulin Ratio: {}\n",
            or_unknown(calc.albumin_globulin_ratio)
        ));
    }

    out.push_str("\nAdditional Info:\n");
    out.push_str(&format!(
        "  Ascites: {}\n",
        response.ascites.as_deref().unwrap_or(UNKNOWN)
    ));
    out.push_str(&format!(
        "  Liver Firmness: {}\n",
        response.liver_firmness.as_deref().unwrap_or(UNKNOWN)
    ));

    out
}

/// Renders either outcome. Errors replace the whole view, so nothing from
/// an earlier result survives.
pub fn render(result: &Result<PredictionView, ClientError>) -> String {
    match result {
        Ok(response) => render_prediction(response),
        Err(err) => format!("{}\n", err),
    }
}
