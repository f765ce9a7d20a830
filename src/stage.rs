use std::fmt;

use crate::errors::AppError;

/// Disease stage predicted by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiverStage {
    Healthy,
    Hepatitis,
    Fibrosis,
    Cirrhosis,
}

impl LiverStage {
    pub fn label(self) -> &'static str {
        match self {
            LiverStage::Healthy => "Healthy",
            LiverStage::Hepatitis => "Hepatitis",
            LiverStage::Fibrosis => "Fibrosis",
            LiverStage::Cirrhosis => "Cirrhosis",
        }
    }

    pub fn explanation(self) -> &'static str {
        match self {
            LiverStage::Healthy => {
                "The liver markers fall within the ranges expected of a healthy liver. \
                 There is no laboratory evidence of inflammation, scarring or impaired \
                 synthetic function. Routine check-ups and a balanced lifestyle are \
                 enough to keep it that way."
            }
            LiverStage::Hepatitis => {
                "The pattern of results points to hepatitis, an inflammation of the liver \
                 usually caused by a viral infection, alcohol, medication or an autoimmune \
                 process. Liver cells are being injured, which releases enzymes into the \
                 blood. Inflammation caught at this stage is often reversible, so further \
                 tests to identify the cause are recommended."
            }
            LiverStage::Fibrosis => {
                "The results are consistent with fibrosis, where ongoing injury has started \
                 to replace healthy liver tissue with scar tissue. The liver still works, \
                 but its structure is changing. Treating the underlying cause can slow or \
                 partly reverse the process, so specialist follow-up is advised."
            }
            LiverStage::Cirrhosis => {
                "The results suggest cirrhosis, the advanced stage of scarring in which \
                 large parts of the liver have been replaced by fibrous tissue and the \
                 organ can no longer work normally. Complications such as fluid build-up, \
                 bleeding and jaundice become more likely. Prompt evaluation by a liver \
                 specialist is strongly recommended."
            }
        }
    }
}

impl TryFrom<i64> for LiverStage {
    type Error = AppError;

    /// Classes outside 0..=3 are an internal fault; there is no fallback stage.
    fn try_from(class: i64) -> Result<Self, Self::Error> {
        match class {
            0 => Ok(LiverStage::Healthy),
            1 => Ok(LiverStage::Hepatitis),
            2 => Ok(LiverStage::Fibrosis),
            3 => Ok(LiverStage::Cirrhosis),
            other => Err(AppError::Internal(format!(
                "classifier returned unknown class {}",
                other
            ))),
        }
    }
}

impl fmt::Display for LiverStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classes_map_in_order() {
        let stages: Vec<LiverStage> = (0..4).map(|c| LiverStage::try_from(c).unwrap()).collect();
        assert_eq!(
            stages,
            vec![
                LiverStage::Healthy,
                LiverStage::Hepatitis,
                LiverStage::Fibrosis,
                LiverStage::Cirrhosis
            ]
        );
    }

    #[test]
    fn test_unknown_class_is_internal_error() {
        for class in [-1, 4, 42] {
            let err = LiverStage::try_from(class).unwrap_err();
            assert!(matches!(err, AppError::Internal(_)));
            assert!(err.to_string().contains(&class.to_string()));
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(LiverStage::Healthy.label(), "Healthy");
        assert_eq!(LiverStage::Cirrhosis.to_string(), "Cirrhosis");
        assert!(LiverStage::Fibrosis.explanation().contains("scar"));
    }
}
