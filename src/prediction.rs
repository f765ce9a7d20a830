//! Prediction pipeline: derive features, assemble the vector in the scaler's
//! column order, preprocess, scale, classify, then build the response.
use std::sync::Arc;

use crate::errors::{AppError, ResultExt};
use crate::explanation;
use crate::features::DerivedFeatures;
use crate::model_artifacts::ModelArtifacts;
use crate::models::{CalculatedValues, PatientObservation, PredictionResponse};
use crate::stage::LiverStage;

/// Named columns of the model's feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureColumn {
    Age,
    Gender,
    TotalBilirubin,
    AlkalinePhosphatase,
    Alt,
    Ast,
    AstAltRatio,
    Albumin,
    TotalProteins,
    ProthrombinTime,
    Platelets,
    AlbuminGlobulinRatio,
    Fib4Score,
    Ascites,
    LiverFirmness,
    AfldIndicator,
}

impl FeatureColumn {
    /// Training column order.
    pub const ALL: [FeatureColumn; 16] = [
        FeatureColumn::Age,
        FeatureColumn::Gender,
        FeatureColumn::TotalBilirubin,
        FeatureColumn::AlkalinePhosphatase,
        FeatureColumn::Alt,
        FeatureColumn::Ast,
        FeatureColumn::AstAltRatio,
        FeatureColumn::Albumin,
        FeatureColumn::TotalProteins,
        FeatureColumn::ProthrombinTime,
        FeatureColumn::Platelets,
        FeatureColumn::AlbuminGlobulinRatio,
        FeatureColumn::Fib4Score,
        FeatureColumn::Ascites,
        FeatureColumn::LiverFirmness,
        FeatureColumn::AfldIndicator,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FeatureColumn::Age => "Age",
            FeatureColumn::Gender => "Gender",
            FeatureColumn::TotalBilirubin => "Total Bilirubin",
            FeatureColumn::AlkalinePhosphatase => "Alkaline Phosphatase",
            FeatureColumn::Alt => "Alanine Aminotransferase",
            FeatureColumn::Ast => "Aspartate Aminotransferase",
            FeatureColumn::AstAltRatio => "AST/ALT Ratio",
            FeatureColumn::Albumin => "Albumin",
            FeatureColumn::TotalProteins => "Total Proteins",
            FeatureColumn::ProthrombinTime => "Prothrombin Time",
            FeatureColumn::Platelets => "Platelets",
            FeatureColumn::AlbuminGlobulinRatio => "Albumin/Globulin Ratio",
            FeatureColumn::Fib4Score => "FIB-4 Score",
            FeatureColumn::Ascites => "Ascites",
            FeatureColumn::LiverFirmness => "LiverFirmness",
            FeatureColumn::AfldIndicator => "AFLD Indicator",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|column| column.name() == name)
    }

    pub fn value(self, obs: &PatientObservation, derived: &DerivedFeatures) -> f64 {
        match self {
            FeatureColumn::Age => obs.age,
            FeatureColumn::Gender => obs.gender.as_feature(),
            FeatureColumn::TotalBilirubin => obs.total_bilirubin,
            FeatureColumn::AlkalinePhosphatase => obs.alkaline_phosphatase,
            FeatureColumn::Alt => obs.alt,
            FeatureColumn::Ast => obs.ast,
            FeatureColumn::AstAltRatio => derived.ast_alt_ratio,
            FeatureColumn::Albumin => obs.albumin,
            FeatureColumn::TotalProteins => obs.total_proteins,
            FeatureColumn::ProthrombinTime => obs.prothrombin_time,
            FeatureColumn::Platelets => obs.platelets,
            FeatureColumn::AlbuminGlobulinRatio => derived.albumin_globulin_ratio,
            FeatureColumn::Fib4Score => derived.fib4_score,
            FeatureColumn::Ascites => obs.ascites.as_feature(),
            FeatureColumn::LiverFirmness => obs.liver_firmness.as_feature(),
            FeatureColumn::AfldIndicator => f64::from(derived.afld_indicator),
        }
    }
}

/// Lays the observation out in `columns` order.
pub fn assemble_feature_vector(
    obs: &PatientObservation,
    derived: &DerivedFeatures,
    columns: &[String],
) -> Result<Vec<f64>, AppError> {
    columns
        .iter()
        .map(|name| {
            FeatureColumn::from_name(name)
                .map(|column| column.value(obs, derived))
                .ok_or_else(|| AppError::Model(format!("unknown feature column `{}`", name)))
        })
        .collect()
}

/// Runs predictions against the shared, read-only model artifacts.
#[derive(Debug, Clone)]
pub struct PredictionService {
    artifacts: Arc<ModelArtifacts>,
}

impl PredictionService {
    pub fn new(artifacts: Arc<ModelArtifacts>) -> Self {
        Self { artifacts }
    }

    pub fn artifacts(&self) -> &ModelArtifacts {
        &self.artifacts
    }

    /// Vector assembly, preprocessing, scaling and classification.
    pub fn classify(
        &self,
        obs: &PatientObservation,
        derived: &DerivedFeatures,
    ) -> Result<LiverStage, AppError> {
        let columns = self.artifacts.feature_names();
        let mut row = assemble_feature_vector(obs, derived, columns)?;
        self.artifacts.preprocessing.apply(columns, &mut row)?;

        let scaled = self.artifacts.scaler.transform(&row)?;
        let class = self.artifacts.classifier.predict(&scaled)?;
        tracing::debug!("Classifier returned class {}", class);

        LiverStage::try_from(class)
    }

    pub fn predict(&self, obs: &PatientObservation) -> Result<PredictionResponse, AppError> {
        let derived = DerivedFeatures::from_observation(obs);
        tracing::debug!(
            ast_alt_ratio = derived.ast_alt_ratio,
            fib4_score = derived.fib4_score,
            albumin_globulin_ratio = derived.albumin_globulin_ratio,
            afld_indicator = derived.afld_indicator,
            "Derived features"
        );

        let stage = self
            .classify(obs, &derived)
            .context("Prediction failed")?;

        tracing::info!("Predicted stage: {}", stage);

        Ok(build_response(obs, &derived, stage))
    }
}

pub fn build_response(
    obs: &PatientObservation,
    derived: &DerivedFeatures,
    stage: LiverStage,
) -> PredictionResponse {
    PredictionResponse {
        predicted_stage: stage.label().to_string(),
        stage_explanation: stage.explanation().to_string(),
        feature_explanations: explanation::explain(obs, derived),
        ascites: obs.ascites,
        liver_firmness: obs.liver_firmness,
        calculated_values: CalculatedValues {
            ast_alt_ratio: derived.ast_alt_ratio,
            fib4_score: derived.fib4_score,
            albumin_globulin_ratio: derived.albumin_globulin_ratio,
        },
    }
}
