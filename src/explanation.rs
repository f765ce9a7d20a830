//! Range-based feature explanations.
//!
//! Each numeric field owns a [`BandTable`]: an ordered list of bands resolved
//! by first match. The first band is a strict lower cut (`value < bound`),
//! interior bands are upper-inclusive (`value <= bound`) and the last band is
//! open-ended. A value sitting exactly on the lowest cut therefore lands in
//! the band above it, while a value on an interior cut stays in the lower
//! band.

use crate::features::DerivedFeatures;
use crate::models::{Finding, PatientObservation};

/// Number of sentences [`explain`] always returns.
pub const EXPLANATION_COUNT: usize = 12;

const VALUE_PLACEHOLDER: &str = "{value}";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    /// `value < bound`
    Below(f64),
    /// `value <= bound`
    AtMost(f64),
    Unbounded,
}

impl Bound {
    pub fn contains(self, value: f64) -> bool {
        match self {
            Bound::Below(bound) => value < bound,
            Bound::AtMost(bound) => value <= bound,
            Bound::Unbounded => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub bound: Bound,
    /// Short band name ("normal", "mildly elevated", ...).
    pub label: &'static str,
    /// Sentence with a `{value}` placeholder.
    pub template: &'static str,
}

#[derive(Debug)]
pub struct BandTable {
    pub field: &'static str,
    pub bands: &'static [Band],
}

impl BandTable {
    /// Band selected for `value`. NaN falls through to the open-ended band.
    pub fn band_for(&self, value: f64) -> &Band {
        self.bands
            .iter()
            .find(|band| band.bound.contains(value))
            .unwrap_or(&self.bands[self.bands.len() - 1])
    }

    pub fn sentence(&self, value: f64) -> String {
        self.band_for(value)
            .template
            .replace(VALUE_PLACEHOLDER, &format_value(value))
    }
}

/// Whole numbers print without a fraction ("90"), everything else in its
/// shortest round-trip form ("0.8").
pub fn format_value(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}

pub static TOTAL_BILIRUBIN: BandTable = BandTable {
    field: "Total Bilirubin",
    bands: &[
        Band {
            bound: Bound::Below(0.3),
            label: "low",
            template: "Total bilirubin of {value} mg/dL is below the usual range, which is rarely a concern for the liver.",
        },
        Band {
            bound: Bound::AtMost(1.2),
            label: "normal",
            template: "Total bilirubin of {value} mg/dL is within the normal range, so the liver is clearing bilirubin properly.",
        },
        Band {
            bound: Bound::AtMost(3.0),
            label: "mildly elevated",
            template: "Total bilirubin of {value} mg/dL is mildly elevated, which can reflect early liver stress or reduced bilirubin processing.",
        },
        Band {
            bound: Bound::AtMost(10.0),
            label: "moderately elevated",
            template: "Total bilirubin of {value} mg/dL is moderately elevated, suggesting impaired liver clearance or an obstruction of bile flow.",
        },
        Band {
            bound: Bound::Unbounded,
            label: "severely elevated",
            template: "Total bilirubin of {value} mg/dL is severely elevated and usually comes with visible jaundice; it needs prompt medical attention.",
        },
    ],
};

pub static ALKALINE_PHOSPHATASE: BandTable = BandTable {
    field: "Alkaline Phosphatase",
    bands: &[
        Band {
            bound: Bound::Below(44.0),
            label: "low",
            template: "Alkaline phosphatase of {value} IU/L is below the usual range, which can be linked to nutritional deficiencies.",
        },
        Band {
            bound: Bound::AtMost(147.0),
            label: "normal",
            template: "Alkaline phosphatase of {value} IU/L is within the normal range, showing no sign of bile duct obstruction.",
        },
        Band {
            bound: Bound::AtMost(300.0),
            label: "mildly elevated",
            template: "Alkaline phosphatase of {value} IU/L is mildly elevated, which may point to early bile flow problems or bone activity.",
        },
        Band {
            bound: Bound::AtMost(550.0),
            label: "moderately elevated",
            template: "Alkaline phosphatase of {value} IU/L is moderately elevated, a pattern often seen with cholestasis or liver infiltration.",
        },
        Band {
            bound: Bound::Unbounded,
            label: "severely elevated",
            template: "Alkaline phosphatase of {value} IU/L is severely elevated, strongly suggesting bile duct obstruction or advanced liver disease.",
        },
    ],
};

pub static ALT: BandTable = BandTable {
    field: "Alanine Aminotransferase",
    bands: &[
        Band {
            bound: Bound::Below(7.0),
            label: "low",
            template: "ALT of {value} U/L is below the usual range, which is generally not a sign of liver damage.",
        },
        Band {
            bound: Bound::AtMost(56.0),
            label: "normal",
            template: "ALT of {value} U/L is within the normal range, indicating no active liver cell injury.",
        },
        Band {
            bound: Bound::AtMost(200.0),
            label: "mildly elevated",
            template: "ALT of {value} U/L is mildly elevated, which can be caused by fatty liver, medication or mild inflammation.",
        },
        Band {
            bound: Bound::AtMost(1000.0),
            label: "moderately elevated",
            template: "ALT of {value} U/L is moderately elevated, a sign of ongoing liver cell injury such as hepatitis.",
        },
        Band {
            bound: Bound::Unbounded,
            label: "severely elevated",
            template: "ALT of {value} U/L is severely elevated, pointing to acute and extensive liver cell damage.",
        },
    ],
};

pub static AST: BandTable = BandTable {
    field: "Aspartate Aminotransferase",
    bands: &[
        Band {
            bound: Bound::Below(8.0),
            label: "low",
            template: "AST of {value} U/L is below the usual range, which is generally not clinically significant.",
        },
        Band {
            bound: Bound::AtMost(40.0),
            label: "normal",
            template: "AST of {value} U/L is within the normal range, indicating no significant liver or muscle injury.",
        },
        Band {
            bound: Bound::AtMost(120.0),
            label: "mildly elevated",
            template: "AST of {value} U/L is mildly elevated, which may reflect liver inflammation, alcohol use or muscle strain.",
        },
        Band {
            bound: Bound::AtMost(400.0),
            label: "moderately elevated",
            template: "AST of {value} U/L is moderately elevated, consistent with active hepatitis or progressing liver injury.",
        },
        Band {
            bound: Bound::Unbounded,
            label: "severely elevated",
            template: "AST of {value} U/L is severely elevated, suggesting extensive liver cell damage.",
        },
    ],
};

pub static AST_ALT_RATIO: BandTable = BandTable {
    field: "AST/ALT Ratio",
    bands: &[
        Band {
            bound: Bound::Below(0.8),
            label: "low",
            template: "The AST/ALT ratio of {value} is low, a pattern often seen with fatty liver or viral hepatitis.",
        },
        Band {
            bound: Bound::AtMost(1.2),
            label: "normal",
            template: "The AST/ALT ratio of {value} is within the normal range.",
        },
        Band {
            bound: Bound::AtMost(2.0),
            label: "elevated",
            template: "The AST/ALT ratio of {value} is elevated, which can indicate developing fibrosis or cirrhosis.",
        },
        Band {
            bound: Bound::Unbounded,
            label: "markedly elevated",
            template: "The AST/ALT ratio of {value} is above 2, a pattern typical of alcohol-related liver disease.",
        },
    ],
};

pub static ALBUMIN: BandTable = BandTable {
    field: "Albumin",
    bands: &[
        Band {
            bound: Bound::Below(2.5),
            label: "severely low",
            template: "Albumin of {value} g/dL is severely low, which points to a seriously reduced ability of the liver to make proteins.",
        },
        Band {
            bound: Bound::AtMost(3.4),
            label: "low",
            template: "Albumin of {value} g/dL is low, suggesting reduced liver synthetic function or poor nutrition.",
        },
        Band {
            bound: Bound::AtMost(5.4),
            label: "normal",
            template: "Albumin of {value} g/dL is within the normal range, so the liver is producing proteins properly.",
        },
        Band {
            bound: Bound::Unbounded,
            label: "high",
            template: "Albumin of {value} g/dL is above the usual range, which is most often caused by dehydration.",
        },
    ],
};

pub static TOTAL_PROTEINS: BandTable = BandTable {
    field: "Total Proteins",
    bands: &[
        Band {
            bound: Bound::Below(5.0),
            label: "severely low",
            template: "Total proteins of {value} g/dL are severely low, which can result from advanced liver disease or protein loss.",
        },
        Band {
            bound: Bound::AtMost(5.9),
            label: "low",
            template: "Total proteins of {value} g/dL are low, which may indicate reduced liver function or malnutrition.",
        },
        Band {
            bound: Bound::AtMost(8.3),
            label: "normal",
            template: "Total proteins of {value} g/dL are within the normal range.",
        },
        Band {
            bound: Bound::Unbounded,
            label: "high",
            template: "Total proteins of {value} g/dL are high, which can be seen with chronic inflammation or dehydration.",
        },
    ],
};

pub static PROTHROMBIN_TIME: BandTable = BandTable {
    field: "Prothrombin Time",
    bands: &[
        Band {
            bound: Bound::Below(11.0),
            label: "short",
            template: "A prothrombin time of {value} seconds is shorter than usual, which is rarely related to liver disease.",
        },
        Band {
            bound: Bound::AtMost(13.5),
            label: "normal",
            template: "A prothrombin time of {value} seconds is within the normal range, so blood clotting factors are produced normally.",
        },
        Band {
            bound: Bound::AtMost(20.0),
            label: "prolonged",
            template: "A prothrombin time of {value} seconds is prolonged, suggesting the liver is making fewer clotting factors.",
        },
        Band {
            bound: Bound::Unbounded,
            label: "markedly prolonged",
            template: "A prothrombin time of {value} seconds is markedly prolonged, a sign of severe liver dysfunction and bleeding risk.",
        },
    ],
};

pub static PLATELETS: BandTable = BandTable {
    field: "Platelets",
    bands: &[
        Band {
            bound: Bound::Below(50.0),
            label: "severely low",
            template: "A platelet count of {value} x10^3/µL is severely low, often caused by an enlarged spleen in advanced liver disease.",
        },
        Band {
            bound: Bound::AtMost(149.0),
            label: "low",
            template: "A platelet count of {value} x10^3/µL is low, which can accompany fibrosis or portal hypertension.",
        },
        Band {
            bound: Bound::AtMost(450.0),
            label: "normal",
            template: "A platelet count of {value} x10^3/µL is within the normal range.",
        },
        Band {
            bound: Bound::Unbounded,
            label: "high",
            template: "A platelet count of {value} x10^3/µL is high, which is usually related to inflammation rather than the liver.",
        },
    ],
};

pub static ALBUMIN_GLOBULIN_RATIO: BandTable = BandTable {
    field: "Albumin/Globulin Ratio",
    bands: &[
        Band {
            bound: Bound::Below(0.8),
            label: "markedly low",
            template: "The albumin/globulin ratio of {value} is markedly low, a pattern seen in cirrhosis and chronic inflammation.",
        },
        Band {
            bound: Bound::AtMost(1.1),
            label: "low",
            template: "The albumin/globulin ratio of {value} is low, which may indicate reduced albumin production.",
        },
        Band {
            bound: Bound::AtMost(2.5),
            label: "normal",
            template: "The albumin/globulin ratio of {value} is within the normal range.",
        },
        Band {
            bound: Bound::Unbounded,
            label: "high",
            template: "The albumin/globulin ratio of {value} is high, which is usually not related to liver disease.",
        },
    ],
};

pub fn ascites_sentence(finding: Finding) -> &'static str {
    match finding {
        Finding::Present => {
            "Ascites is present: fluid has collected in the abdomen, a common complication of advanced liver disease."
        }
        Finding::Absent => {
            "No ascites was reported, so there is no sign of fluid build-up in the abdomen."
        }
    }
}

pub fn liver_firmness_sentence(finding: Finding) -> &'static str {
    match finding {
        Finding::Present => {
            "The liver feels firm, which suggests that scar tissue has built up in the organ."
        }
        Finding::Absent => {
            "No liver firmness was reported, so there is no physical sign of significant scarring."
        }
    }
}

/// Builds the twelve feature sentences in their fixed order: bilirubin,
/// alkaline phosphatase, ALT, AST, AST/ALT ratio, albumin, total proteins,
/// prothrombin time, platelets, albumin/globulin ratio, ascites, liver
/// firmness.
pub fn explain(obs: &PatientObservation, derived: &DerivedFeatures) -> Vec<String> {
    let mut sentences = Vec::with_capacity(EXPLANATION_COUNT);

    sentences.push(TOTAL_BILIRUBIN.sentence(obs.total_bilirubin));
    sentences.push(ALKALINE_PHOSPHATASE.sentence(obs.alkaline_phosphatase));
    sentences.push(ALT.sentence(obs.alt));
    sentences.push(AST.sentence(obs.ast));
    sentences.push(AST_ALT_RATIO.sentence(derived.ast_alt_ratio));
    sentences.push(ALBUMIN.sentence(obs.albumin));
    sentences.push(TOTAL_PROTEINS.sentence(obs.total_proteins));
    sentences.push(PROTHROMBIN_TIME.sentence(obs.prothrombin_time));
    sentences.push(PLATELETS.sentence(obs.platelets));
    sentences.push(ALBUMIN_GLOBULIN_RATIO.sentence(derived.albumin_globulin_ratio));
    sentences.push(ascites_sentence(obs.ascites).to_string());
    sentences.push(liver_firmness_sentence(obs.liver_firmness).to_string());

    sentences
}

/// All numeric tables, in output order.
pub fn band_tables() -> [&'static BandTable; 10] {
    [
        &TOTAL_BILIRUBIN,
        &ALKALINE_PHOSPHATASE,
        &ALT,
        &AST,
        &AST_ALT_RATIO,
        &ALBUMIN,
        &TOTAL_PROTEINS,
        &PROTHROMBIN_TIME,
        &PLATELETS,
        &ALBUMIN_GLOBULIN_RATIO,
    ]
}
