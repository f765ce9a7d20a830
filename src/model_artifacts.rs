//! Externally trained model artifacts.
//!
//! The scaler and classifier are reached only through the [`Scaler`] and
//! [`Classifier`] traits. The bundled adapters read a single JSON artifact
//! holding a standard scaler, a linear multi-class classifier and the two
//! preprocessing column lists. Artifacts are loaded once at startup and are
//! never mutated afterwards.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::Path;

use crate::errors::AppError;
use crate::prediction::FeatureColumn;

/// Fitted feature scaler.
pub trait Scaler: Send + Sync {
    /// Column order the scaler was fitted with (`feature_names_in_`).
    fn feature_names(&self) -> &[String];

    fn transform(&self, row: &[f64]) -> Result<Vec<f64>, AppError>;
}

/// Fitted multi-class classifier.
pub trait Classifier: Send + Sync {
    fn predict(&self, row: &[f64]) -> Result<i64, AppError>;
}

/// Standard scaler: `(x - mean) / scale` per column.
#[derive(Debug, Clone, Deserialize)]
pub struct StandardScaler {
    pub feature_names_in: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    fn check(&self) -> anyhow::Result<()> {
        let n = self.feature_names_in.len();
        if n == 0 {
            anyhow::bail!("scaler has no feature names");
        }
        if self.mean.len() != n || self.scale.len() != n {
            anyhow::bail!(
                "scaler has {} feature names but {} means and {} scales",
                n,
                self.mean.len(),
                self.scale.len()
            );
        }
        Ok(())
    }
}

impl Scaler for StandardScaler {
    fn feature_names(&self) -> &[String] {
        &self.feature_names_in
    }

    fn transform(&self, row: &[f64]) -> Result<Vec<f64>, AppError> {
        if row.len() != self.mean.len() {
            return Err(AppError::Model(format!(
                "scaler expects {} features, got {}",
                self.mean.len(),
                row.len()
            )));
        }

        row.iter()
            .zip(self.mean.iter().zip(&self.scale))
            .zip(&self.feature_names_in)
            .map(|((x, (mean, scale)), name)| {
                // Zero-variance columns are only centered.
                let scale = if *scale == 0.0 { 1.0 } else { *scale };
                let scaled = (x - mean) / scale;
                if scaled.is_finite() {
                    Ok(scaled)
                } else {
                    Err(AppError::Model(format!(
                        "scaler produced a non-finite value for `{}`",
                        name
                    )))
                }
            })
            .collect()
    }
}

/// Linear multi-class classifier; predicts the class with the highest
/// decision value `coef[k] · x + intercept[k]`.
#[derive(Debug, Clone, Deserialize)]
pub struct LinearClassifier {
    pub classes: Vec<i64>,
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
}

impl LinearClassifier {
    fn check(&self, n_features: usize) -> anyhow::Result<()> {
        let k = self.classes.len();
        if k == 0 {
            anyhow::bail!("classifier has no classes");
        }
        if self.coef.len() != k || self.intercept.len() != k {
            anyhow::bail!(
                "classifier has {} classes but {} coefficient rows and {} intercepts",
                k,
                self.coef.len(),
                self.intercept.len()
            );
        }
        if let Some(row) = self.coef.iter().find(|row| row.len() != n_features) {
            anyhow::bail!(
                "classifier coefficient row has {} weights, scaler has {} features",
                row.len(),
                n_features
            );
        }
        Ok(())
    }
}

impl Classifier for LinearClassifier {
    fn predict(&self, row: &[f64]) -> Result<i64, AppError> {
        let mut best: Option<(usize, f64)> = None;

        for (idx, (weights, intercept)) in self.coef.iter().zip(&self.intercept).enumerate() {
            if weights.len() != row.len() {
                return Err(AppError::Model(format!(
                    "classifier expects {} features, got {}",
                    weights.len(),
                    row.len()
                )));
            }
            let score: f64 = weights.iter().zip(row).map(|(w, x)| w * x).sum::<f64>() + intercept;
            if !score.is_finite() {
                return Err(AppError::Model(
                    "classifier produced a non-finite decision value".to_string(),
                ));
            }
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((idx, score));
            }
        }

        best.map(|(idx, _)| self.classes[idx])
            .ok_or_else(|| AppError::Model("classifier has no classes".to_string()))
    }
}

/// Tail bounds for one winsorized column (the 5th and 95th percentiles of
/// the training data).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WinsorBounds {
    pub column: String,
    pub lower: f64,
    pub upper: f64,
}

/// Column transforms applied before scaling: `ln(1 + x)` first, then
/// winsorization.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Preprocessing {
    #[serde(default)]
    pub log_transform_columns: Vec<String>,
    #[serde(default)]
    pub winsorize_columns: Vec<WinsorBounds>,
}

impl Preprocessing {
    pub fn apply(&self, columns: &[String], row: &mut [f64]) -> Result<(), AppError> {
        for name in &self.log_transform_columns {
            let idx = column_index(columns, name)?;
            row[idx] = row[idx].ln_1p();
        }
        for bounds in &self.winsorize_columns {
            let idx = column_index(columns, &bounds.column)?;
            row[idx] = row[idx].clamp(bounds.lower, bounds.upper);
        }
        Ok(())
    }

    fn check(&self, columns: &[String]) -> anyhow::Result<()> {
        for name in &self.log_transform_columns {
            if !columns.contains(name) {
                anyhow::bail!("log-transform column `{}` is not a scaler feature", name);
            }
        }
        for bounds in &self.winsorize_columns {
            if !columns.contains(&bounds.column) {
                anyhow::bail!("winsorize column `{}` is not a scaler feature", bounds.column);
            }
            if bounds.lower.is_nan() || bounds.upper.is_nan() || bounds.lower > bounds.upper {
                anyhow::bail!(
                    "winsorize bounds for `{}` are inverted ({} > {})",
                    bounds.column,
                    bounds.lower,
                    bounds.upper
                );
            }
        }
        Ok(())
    }
}

fn column_index(columns: &[String], name: &str) -> Result<usize, AppError> {
    columns
        .iter()
        .position(|c| c == name)
        .ok_or_else(|| AppError::Model(format!("unknown preprocessing column `{}`", name)))
}

/// On-disk layout of the bundled artifact file.
#[derive(Debug, Deserialize)]
struct ArtifactFile {
    scaler: StandardScaler,
    classifier: LinearClassifier,
    #[serde(flatten)]
    preprocessing: Preprocessing,
}

/// Read-only model artifact set shared by every request.
pub struct ModelArtifacts {
    pub scaler: Box<dyn Scaler>,
    pub classifier: Box<dyn Classifier>,
    pub preprocessing: Preprocessing,
    pub loaded_at: DateTime<Utc>,
}

impl std::fmt::Debug for ModelArtifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelArtifacts")
            .field("feature_names", &self.scaler.feature_names())
            .field("preprocessing", &self.preprocessing)
            .field("loaded_at", &self.loaded_at)
            .finish()
    }
}

impl ModelArtifacts {
    /// Assembles artifacts from any scaler/classifier implementation.
    ///
    /// The scaler's column names must all be known features and the
    /// preprocessing lists may only name scaler columns.
    pub fn new(
        scaler: Box<dyn Scaler>,
        classifier: Box<dyn Classifier>,
        preprocessing: Preprocessing,
    ) -> anyhow::Result<Self> {
        let columns = scaler.feature_names();
        for name in columns {
            if FeatureColumn::from_name(name).is_none() {
                anyhow::bail!("scaler column `{}` is not a known feature", name);
            }
        }
        preprocessing.check(columns)?;

        Ok(Self {
            scaler,
            classifier,
            preprocessing,
            loaded_at: Utc::now(),
        })
    }

    pub fn from_json_str(raw: &str) -> anyhow::Result<Self> {
        let file: ArtifactFile = serde_json::from_str(raw)
            .map_err(|e| anyhow::anyhow!("Failed to parse model artifacts: {}", e))?;

        file.scaler.check()?;
        file.classifier.check(file.scaler.feature_names_in.len())?;

        Self::new(
            Box::new(file.scaler),
            Box::new(file.classifier),
            file.preprocessing,
        )
    }

    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read model artifacts {}: {}", path.display(), e)
        })?;
        let artifacts = Self::from_json_str(&raw)?;

        tracing::info!(
            "Model artifacts loaded from {} ({} features, {} log-transformed, {} winsorized)",
            path.display(),
            artifacts.feature_names().len(),
            artifacts.preprocessing.log_transform_columns.len(),
            artifacts.preprocessing.winsorize_columns.len()
        );

        Ok(artifacts)
    }

    pub fn feature_names(&self) -> &[String] {
        self.scaler.feature_names()
    }
}
