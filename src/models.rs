use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::errors::AppError;

// ============ Wire Models ============

/// Raw prediction request as posted by the form.
///
/// Key names are part of the wire contract and are case-sensitive. Numeric
/// fields must be JSON numbers; the categorical fields are free-form strings
/// that get normalized by [`PatientObservation::try_from`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ObservationPayload {
    /// Age in years.
    #[serde(rename = "Age")]
    pub age: f64,
    /// "Male" or "Female" (any case).
    #[serde(rename = "Gender")]
    pub gender: String,
    /// Total bilirubin (mg/dL).
    #[serde(rename = "Total Bilirubin")]
    pub total_bilirubin: f64,
    /// Alkaline phosphatase (IU/L).
    #[serde(rename = "Alkaline Phosphatase")]
    pub alkaline_phosphatase: f64,
    /// Alanine aminotransferase, ALT (U/L).
    #[serde(rename = "Alanine Aminotransferase")]
    pub alanine_aminotransferase: f64,
    /// Aspartate aminotransferase, AST (U/L).
    #[serde(rename = "Aspartate Aminotransferase")]
    pub aspartate_aminotransferase: f64,
    /// Albumin (g/dL).
    #[serde(rename = "Albumin")]
    pub albumin: f64,
    /// Total proteins (g/dL).
    #[serde(rename = "Total Proteins")]
    pub total_proteins: f64,
    /// Prothrombin time (seconds).
    #[serde(rename = "Prothrombin Time")]
    pub prothrombin_time: f64,
    /// Platelet count (10^3/µL).
    #[serde(rename = "Platelets")]
    pub platelets: f64,
    /// "Present" or "Absent" (any case).
    #[serde(rename = "Ascites")]
    pub ascites: String,
    /// "Present" or "Absent" (any case).
    #[serde(rename = "LiverFirmness")]
    pub liver_firmness: String,
}

/// Structured prediction response returned to the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PredictionResponse {
    #[serde(rename = "Predicted Stage")]
    pub predicted_stage: String,
    #[serde(rename = "Stage Explanation")]
    pub stage_explanation: String,
    /// Always twelve sentences in a fixed order.
    #[serde(rename = "Feature Explanations")]
    pub feature_explanations: Vec<String>,
    #[serde(rename = "Ascites")]
    pub ascites: Finding,
    #[serde(rename = "LiverFirmness")]
    pub liver_firmness: Finding,
    #[serde(rename = "Calculated Values")]
    pub calculated_values: CalculatedValues,
}

/// Derived values echoed back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CalculatedValues {
    #[serde(rename = "AST ALT Ratio")]
    pub ast_alt_ratio: f64,
    #[serde(rename = "FIB-4 Score")]
    pub fib4_score: f64,
    #[serde(rename = "Albumin Globulin Ratio")]
    pub albumin_globulin_ratio: f64,
}

/// Body of every failed request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Health check body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    /// When the model artifacts were loaded (RFC 3339).
    pub model_loaded_at: String,
    /// Number of columns the scaler expects.
    pub feature_count: usize,
}

// ============ Domain Models ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Lenient normalization: "male" in any case/padding is `Male`, anything
    /// else is `Female`.
    pub fn normalize(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("male") {
            Gender::Male
        } else {
            Gender::Female
        }
    }

    /// Encoding used in the feature vector.
    pub fn as_feature(self) -> f64 {
        match self {
            Gender::Male => 1.0,
            Gender::Female => 0.0,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "Male"),
            Gender::Female => write!(f, "Female"),
        }
    }
}

/// Present/absent clinical sign (ascites, liver firmness).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Finding {
    Present,
    Absent,
}

impl Finding {
    /// Lenient normalization: "present" in any case/padding is `Present`,
    /// anything else is `Absent`.
    pub fn normalize(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("present") {
            Finding::Present
        } else {
            Finding::Absent
        }
    }

    pub fn is_present(self) -> bool {
        matches!(self, Finding::Present)
    }

    pub fn as_feature(self) -> f64 {
        if self.is_present() {
            1.0
        } else {
            0.0
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::Present => write!(f, "Present"),
            Finding::Absent => write!(f, "Absent"),
        }
    }
}

/// Validated observation. Every numeric field is finite and non-negative;
/// categoricals are already normalized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatientObservation {
    pub age: f64,
    pub gender: Gender,
    pub total_bilirubin: f64,
    pub alkaline_phosphatase: f64,
    pub alt: f64,
    pub ast: f64,
    pub albumin: f64,
    pub total_proteins: f64,
    pub prothrombin_time: f64,
    pub platelets: f64,
    pub ascites: Finding,
    pub liver_firmness: Finding,
}

impl TryFrom<ObservationPayload> for PatientObservation {
    type Error = AppError;

    fn try_from(payload: ObservationPayload) -> Result<Self, Self::Error> {
        let numeric = [
            ("Age", payload.age),
            ("Total Bilirubin", payload.total_bilirubin),
            ("Alkaline Phosphatase", payload.alkaline_phosphatase),
            ("Alanine Aminotransferase", payload.alanine_aminotransferase),
            ("Aspartate Aminotransferase", payload.aspartate_aminotransferase),
            ("Albumin", payload.albumin),
            ("Total Proteins", payload.total_proteins),
            ("Prothrombin Time", payload.prothrombin_time),
            ("Platelets", payload.platelets),
        ];
        for (name, value) in numeric {
            if !value.is_finite() || value < 0.0 {
                return Err(AppError::Validation(format!(
                    "field `{}` must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        let gender = Gender::normalize(&payload.gender);
        let ascites = Finding::normalize(&payload.ascites);
        let liver_firmness = Finding::normalize(&payload.liver_firmness);

        if gender == Gender::Female && !payload.gender.trim().eq_ignore_ascii_case("female") {
            tracing::debug!("Unrecognized Gender {:?} coerced to Female", payload.gender);
        }

        Ok(Self {
            age: payload.age,
            gender,
            total_bilirubin: payload.total_bilirubin,
            alkaline_phosphatase: payload.alkaline_phosphatase,
            alt: payload.alanine_aminotransferase,
            ast: payload.aspartate_aminotransferase,
            albumin: payload.albumin,
            total_proteins: payload.total_proteins,
            prothrombin_time: payload.prothrombin_time,
            platelets: payload.platelets,
            ascites,
            liver_firmness,
        })
    }
}

impl PatientObservation {
    /// Parses and validates a raw request body in one step.
    pub fn from_json_slice(body: &[u8]) -> Result<Self, AppError> {
        let payload: ObservationPayload = serde_json::from_slice(body)?;
        Self::try_from(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body() -> serde_json::Value {
        json!({
            "Age": 45,
            "Gender": "male",
            "Total Bilirubin": 0.8,
            "Alkaline Phosphatase": 90,
            "Alanine Aminotransferase": 30,
            "Aspartate Aminotransferase": 35,
            "Albumin": 4.2,
            "Total Proteins": 7.0,
            "Prothrombin Time": 11,
            "Platelets": 250,
            "Ascites": "absent",
            "LiverFirmness": "absent"
        })
    }

    #[test]
    fn test_parses_valid_body() {
        let obs = PatientObservation::from_json_slice(body().to_string().as_bytes()).unwrap();
        assert_eq!(obs.gender, Gender::Male);
        assert_eq!(obs.ascites, Finding::Absent);
        assert_eq!(obs.alt, 30.0);
        assert_eq!(obs.ast, 35.0);
    }

    #[test]
    fn test_missing_field_names_the_key() {
        let mut value = body();
        value.as_object_mut().unwrap().remove("Platelets");
        let err = PatientObservation::from_json_slice(value.to_string().as_bytes()).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(err.to_string().contains("Platelets"));
    }

    #[test]
    fn test_non_numeric_field_rejected() {
        let mut value = body();
        value["Albumin"] = json!("four");
        let err = PatientObservation::from_json_slice(value.to_string().as_bytes()).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_key_names_are_case_sensitive() {
        let mut value = body();
        let age = value.as_object_mut().unwrap().remove("Age").unwrap();
        value["age"] = age;
        assert!(PatientObservation::from_json_slice(value.to_string().as_bytes()).is_err());
    }

    #[test]
    fn test_negative_value_rejected() {
        let mut value = body();
        value["Total Bilirubin"] = json!(-0.5);
        let err = PatientObservation::from_json_slice(value.to_string().as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Total Bilirubin"));
    }

    #[test]
    fn test_categorical_normalization_is_lenient() {
        assert_eq!(Gender::normalize("  MALE "), Gender::Male);
        assert_eq!(Gender::normalize("xyz"), Gender::Female);
        assert_eq!(Gender::normalize(""), Gender::Female);
        assert_eq!(Finding::normalize("Present"), Finding::Present);
        assert_eq!(Finding::normalize("yes"), Finding::Absent);
    }

    #[test]
    fn test_finding_serializes_canonical_names() {
        assert_eq!(serde_json::to_value(Finding::Present).unwrap(), json!("Present"));
        assert_eq!(serde_json::to_value(Finding::Absent).unwrap(), json!("Absent"));
    }
}
