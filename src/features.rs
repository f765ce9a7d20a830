//! Composite features derived from the raw observation.
//!
//! Every function here is total: a zero denominator yields `0.0` instead of
//! an error or a non-finite value.

use crate::models::PatientObservation;

/// AST/ALT ratio at or above this value sets the AFLD indicator.
pub const AFLD_RATIO_THRESHOLD: f64 = 2.0;

/// Rounds to two decimal places, correctly rounded from the stored binary
/// value (1.115 is stored below the tie and becomes 1.11).
pub fn round2(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}

/// De Ritis ratio, `round(ast / alt, 2)`; 0 when `alt` is not positive.
pub fn ast_alt_ratio(ast: f64, alt: f64) -> f64 {
    if alt > 0.0 {
        finite_or_zero(round2(ast / alt))
    } else {
        0.0
    }
}

/// FIB-4 score, `round(age * ast / (platelets * sqrt(alt)), 2)`.
///
/// 0 when `alt` is not positive. A zero platelet count falls under the same
/// guard.
pub fn fib4_score(age: f64, ast: f64, alt: f64, platelets: f64) -> f64 {
    if alt > 0.0 && platelets > 0.0 {
        finite_or_zero(round2(age * ast / (platelets * alt.sqrt())))
    } else {
        0.0
    }
}

/// `round(albumin / (proteins - albumin), 2)`; 0 unless proteins exceed albumin.
pub fn albumin_globulin_ratio(albumin: f64, proteins: f64) -> f64 {
    if proteins > albumin {
        finite_or_zero(round2(albumin / (proteins - albumin)))
    } else {
        0.0
    }
}

/// 1 if the (rounded) AST/ALT ratio is at least 2, else 0.
pub fn afld_indicator(ast_alt_ratio: f64) -> u8 {
    u8::from(ast_alt_ratio >= AFLD_RATIO_THRESHOLD)
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Per-request derived features. Never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedFeatures {
    pub ast_alt_ratio: f64,
    pub fib4_score: f64,
    pub albumin_globulin_ratio: f64,
    pub afld_indicator: u8,
}

impl DerivedFeatures {
    pub fn from_observation(obs: &PatientObservation) -> Self {
        let ratio = ast_alt_ratio(obs.ast, obs.alt);
        Self {
            ast_alt_ratio: ratio,
            fib4_score: fib4_score(obs.age, obs.ast, obs.alt, obs.platelets),
            albumin_globulin_ratio: albumin_globulin_ratio(obs.albumin, obs.total_proteins),
            afld_indicator: afld_indicator(ratio),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.16666), 1.17);
        assert_eq!(round2(1.5), 1.5);
        assert_eq!(round2(0.0), 0.0);
        assert_eq!(round2(2.344), 2.34);
        assert_eq!(round2(-1.16666), -1.17);
    }

    #[test]
    fn test_round2_uses_stored_value() {
        // 223 / 200 is stored as 1.11499999...
        assert_eq!(round2(223.0 / 200.0), 1.11);
        assert_eq!(ast_alt_ratio(223.0, 200.0), 1.11);
        assert_eq!(round2(1.005), 1.0);
    }

    #[test]
    fn test_ast_alt_ratio_zero_guard() {
        assert_eq!(ast_alt_ratio(35.0, 30.0), 1.17);
        assert_eq!(ast_alt_ratio(35.0, 0.0), 0.0);
        assert_eq!(ast_alt_ratio(0.0, 10.0), 0.0);
    }

    #[test]
    fn test_fib4_guards() {
        assert_eq!(fib4_score(45.0, 35.0, 30.0, 250.0), 1.15);
        assert_eq!(fib4_score(45.0, 35.0, 0.0, 250.0), 0.0);
        assert_eq!(fib4_score(45.0, 35.0, 30.0, 0.0), 0.0);
    }

    #[test]
    fn test_albumin_globulin_ratio() {
        assert_eq!(albumin_globulin_ratio(4.2, 7.0), 1.5);
        assert_eq!(albumin_globulin_ratio(4.2, 4.2), 0.0);
        assert_eq!(albumin_globulin_ratio(5.0, 4.0), 0.0);
    }

    #[test]
    fn test_afld_indicator_threshold() {
        assert_eq!(afld_indicator(1.99), 0);
        assert_eq!(afld_indicator(2.0), 1);
        assert_eq!(afld_indicator(3.4), 1);
    }
}
