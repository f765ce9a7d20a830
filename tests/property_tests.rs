/// Property-based tests using proptest
/// Tests invariants that should hold for all observations
use liver_stage_api::explanation::{self, EXPLANATION_COUNT};
use liver_stage_api::features::{
    afld_indicator, albumin_globulin_ratio, ast_alt_ratio, fib4_score, round2, DerivedFeatures,
};
use liver_stage_api::models::{Finding, Gender, PatientObservation};
use proptest::prelude::*;

fn finding() -> impl Strategy<Value = Finding> {
    prop_oneof![Just(Finding::Present), Just(Finding::Absent)]
}

prop_compose! {
    fn observation()(
        age in 0.0f64..120.0,
        male in proptest::bool::ANY,
        total_bilirubin in 0.0f64..50.0,
        alkaline_phosphatase in 0.0f64..2000.0,
        alt in 0.0f64..3000.0,
        ast in 0.0f64..3000.0,
        albumin in 0.0f64..8.0,
        total_proteins in 0.0f64..12.0,
        prothrombin_time in 0.0f64..60.0,
        platelets in 0.0f64..1000.0,
        ascites in finding(),
        liver_firmness in finding(),
    ) -> PatientObservation {
        PatientObservation {
            age,
            gender: if male { Gender::Male } else { Gender::Female },
            total_bilirubin,
            alkaline_phosphatase,
            alt,
            ast,
            albumin,
            total_proteins,
            prothrombin_time,
            platelets,
            ascites,
            liver_firmness,
        }
    }
}

// Property: ratios follow the closed form or the zero guard
proptest! {
    #[test]
    fn ast_alt_ratio_matches_formula(ast in 0.0f64..5000.0, alt in 0.001f64..5000.0) {
        prop_assert_eq!(ast_alt_ratio(ast, alt), round2(ast / alt));
    }

    #[test]
    fn ast_alt_ratio_zero_alt_is_zero(ast in 0.0f64..5000.0) {
        prop_assert_eq!(ast_alt_ratio(ast, 0.0), 0.0);
    }

    #[test]
    fn albumin_globulin_ratio_guard(albumin in 0.0f64..10.0, delta in 0.0f64..10.0) {
        // proteins <= albumin
        prop_assert_eq!(albumin_globulin_ratio(albumin, albumin - delta), 0.0);
    }

    #[test]
    fn albumin_globulin_ratio_matches_formula(albumin in 0.0f64..10.0, globulin in 0.01f64..10.0) {
        let proteins = albumin + globulin;
        prop_assume!(proteins > albumin);
        prop_assert_eq!(
            albumin_globulin_ratio(albumin, proteins),
            round2(albumin / (proteins - albumin))
        );
    }

    #[test]
    fn fib4_is_finite_and_non_negative(
        age in 0.0f64..120.0,
        ast in 0.0f64..5000.0,
        alt in 0.0f64..5000.0,
        platelets in 0.0f64..1000.0
    ) {
        let score = fib4_score(age, ast, alt, platelets);
        prop_assert!(score.is_finite());
        prop_assert!(score >= 0.0);
    }
}

// Property: derived features and explanations are total
proptest! {
    #[test]
    fn afld_indicator_iff_ratio_at_least_two(obs in observation()) {
        let derived = DerivedFeatures::from_observation(&obs);
        let expected = if derived.ast_alt_ratio >= 2.0 { 1 } else { 0 };
        prop_assert_eq!(derived.afld_indicator, expected);
        prop_assert_eq!(afld_indicator(derived.ast_alt_ratio), expected);
    }

    #[test]
    fn explanations_always_twelve(obs in observation()) {
        let derived = DerivedFeatures::from_observation(&obs);
        let sentences = explanation::explain(&obs, &derived);
        prop_assert_eq!(sentences.len(), EXPLANATION_COUNT);
        let placeholder = "{value}";
        prop_assert!(sentences.iter().all(|s| !s.is_empty() && !s.contains(placeholder)));
        prop_assert!(sentences[0].starts_with("Total bilirubin"));
        prop_assert!(sentences[4].starts_with("The AST/ALT ratio"));
        prop_assert!(sentences[9].starts_with("The albumin/globulin ratio"));
    }

    #[test]
    fn categorical_normalization_never_fails(raw in "\\PC*") {
        let gender = Gender::normalize(&raw);
        let expected = if raw.trim().eq_ignore_ascii_case("male") { Gender::Male } else { Gender::Female };
        prop_assert_eq!(gender, expected);
        let _ = Finding::normalize(&raw);
    }
}
