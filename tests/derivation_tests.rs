/// Unit tests for feature derivation and explanation text
/// Covers the zero guards, band boundaries and the fixed sentence order
use liver_stage_api::explanation::{self, EXPLANATION_COUNT};
use liver_stage_api::features::{
    afld_indicator, albumin_globulin_ratio, ast_alt_ratio, fib4_score, DerivedFeatures,
};
use liver_stage_api::models::{Finding, Gender, PatientObservation};

fn baseline() -> PatientObservation {
    PatientObservation {
        age: 45.0,
        gender: Gender::Male,
        total_bilirubin: 0.8,
        alkaline_phosphatase: 90.0,
        alt: 30.0,
        ast: 35.0,
        albumin: 4.2,
        total_proteins: 7.0,
        prothrombin_time: 11.0,
        platelets: 250.0,
        ascites: Finding::Absent,
        liver_firmness: Finding::Absent,
    }
}

#[cfg(test)]
mod derivation_tests {
    use super::*;

    #[test]
    fn test_baseline_derived_values() {
        let derived = DerivedFeatures::from_observation(&baseline());
        assert_eq!(derived.ast_alt_ratio, 1.17);
        // 45 * 35 / (250 * sqrt(30))
        assert_eq!(derived.fib4_score, 1.15);
        assert_eq!(derived.albumin_globulin_ratio, 1.5);
        assert_eq!(derived.afld_indicator, 0);
    }

    #[test]
    fn test_zero_alt_triggers_guards() {
        let obs = PatientObservation {
            alt: 0.0,
            ..baseline()
        };
        let derived = DerivedFeatures::from_observation(&obs);
        assert_eq!(derived.ast_alt_ratio, 0.0);
        assert_eq!(derived.fib4_score, 0.0);
        assert_eq!(derived.afld_indicator, 0);
        assert_eq!(derived.albumin_globulin_ratio, 1.5);
    }

    #[test]
    fn test_albumin_globulin_requires_proteins_above_albumin() {
        assert_eq!(albumin_globulin_ratio(4.0, 4.0), 0.0);
        assert_eq!(albumin_globulin_ratio(4.0, 3.0), 0.0);
        assert_eq!(albumin_globulin_ratio(3.0, 6.0), 1.0);
        assert_eq!(albumin_globulin_ratio(3.5, 6.5), 1.17);
    }

    #[test]
    fn test_afld_follows_rounded_ratio() {
        // 199.6 / 100 rounds to 2.0
        let ratio = ast_alt_ratio(199.6, 100.0);
        assert_eq!(ratio, 2.0);
        assert_eq!(afld_indicator(ratio), 1);

        let ratio = ast_alt_ratio(199.4, 100.0);
        assert_eq!(ratio, 1.99);
        assert_eq!(afld_indicator(ratio), 0);
    }

    #[test]
    fn test_fib4_high_risk_profile() {
        // 62 * 110 / (80 * sqrt(50)) = 12.055...
        assert_eq!(fib4_score(62.0, 110.0, 50.0, 80.0), 12.06);
    }
}

#[cfg(test)]
mod explanation_tests {
    use super::*;

    fn sentences(obs: &PatientObservation) -> Vec<String> {
        explanation::explain(obs, &DerivedFeatures::from_observation(obs))
    }

    #[test]
    fn test_baseline_is_all_normal() {
        let obs = baseline();
        let derived = DerivedFeatures::from_observation(&obs);
        assert_eq!(explanation::TOTAL_BILIRUBIN.band_for(obs.total_bilirubin).label, "normal");
        assert_eq!(
            explanation::ALKALINE_PHOSPHATASE.band_for(obs.alkaline_phosphatase).label,
            "normal"
        );
        assert_eq!(explanation::ALT.band_for(obs.alt).label, "normal");
        assert_eq!(explanation::AST.band_for(obs.ast).label, "normal");
        assert_eq!(explanation::AST_ALT_RATIO.band_for(derived.ast_alt_ratio).label, "normal");
        assert_eq!(explanation::ALBUMIN.band_for(obs.albumin).label, "normal");
        assert_eq!(explanation::TOTAL_PROTEINS.band_for(obs.total_proteins).label, "normal");
        assert_eq!(explanation::PROTHROMBIN_TIME.band_for(obs.prothrombin_time).label, "normal");
        assert_eq!(explanation::PLATELETS.band_for(obs.platelets).label, "normal");
        assert_eq!(
            explanation::ALBUMIN_GLOBULIN_RATIO
                .band_for(derived.albumin_globulin_ratio)
                .label,
            "normal"
        );
    }

    #[test]
    fn test_twelve_sentences_in_fixed_order() {
        let out = sentences(&baseline());
        assert_eq!(out.len(), EXPLANATION_COUNT);
        assert!(out[0].starts_with("Total bilirubin of 0.8 mg/dL"));
        assert!(out[1].starts_with("Alkaline phosphatase of 90 IU/L"));
        assert!(out[2].starts_with("ALT of 30 U/L"));
        assert!(out[3].starts_with("AST of 35 U/L"));
        assert!(out[4].starts_with("The AST/ALT ratio of 1.17"));
        assert!(out[5].starts_with("Albumin of 4.2 g/dL"));
        assert!(out[6].starts_with("Total proteins of 7 g/dL"));
        assert!(out[7].starts_with("A prothrombin time of 11 seconds"));
        assert!(out[8].starts_with("A platelet count of 250"));
        assert!(out[9].starts_with("The albumin/globulin ratio of 1.5"));
        assert!(out[10].starts_with("No ascites"));
        assert!(out[11].starts_with("No liver firmness"));
    }

    #[test]
    fn test_present_findings_are_positive_phrased() {
        let obs = PatientObservation {
            ascites: Finding::Present,
            liver_firmness: Finding::Present,
            ..baseline()
        };
        let out = sentences(&obs);
        assert!(out[10].starts_with("Ascites is present"));
        assert!(out[11].starts_with("The liver feels firm"));
    }

    #[test]
    fn test_bilirubin_boundary() {
        let at = PatientObservation {
            total_bilirubin: 1.2,
            ..baseline()
        };
        assert!(sentences(&at)[0].contains("within the normal range"));

        let above = PatientObservation {
            total_bilirubin: 1.20001,
            ..baseline()
        };
        let sentence = &sentences(&above)[0];
        assert!(sentence.contains("mildly elevated"));
        assert!(sentence.contains("1.20001"));
    }

    #[test]
    fn test_extreme_values_still_produce_twelve() {
        let obs = PatientObservation {
            age: 0.0,
            total_bilirubin: 40.0,
            alkaline_phosphatase: 0.0,
            alt: 0.0,
            ast: 5000.0,
            albumin: 9.0,
            total_proteins: 1.0,
            prothrombin_time: 0.0,
            platelets: 0.0,
            ..baseline()
        };
        let out = sentences(&obs);
        assert_eq!(out.len(), EXPLANATION_COUNT);
        assert!(out[0].contains("severely elevated"));
        assert!(out[4].contains("ratio of 0 is low"));
        assert!(out[9].contains("markedly low"));
    }
}
