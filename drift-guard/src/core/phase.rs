//! Phases of a validation run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A step of the linear validation state machine.
///
/// ```text
/// Start → LoadDatasets → CheckSchemas → DetectDrift → Combine
///       → PersistReport → EmitArtifact → Done
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationPhase {
    Start,
    LoadDatasets,
    CheckSchemas,
    DetectDrift,
    Combine,
    PersistReport,
    EmitArtifact,
    Done,
}

impl ValidationPhase {
    /// The phase that follows this one; `Done` is terminal.
    pub fn next(self) -> Self {
        match self {
            Self::Start => Self::LoadDatasets,
            Self::LoadDatasets => Self::CheckSchemas,
            Self::CheckSchemas => Self::DetectDrift,
            Self::DetectDrift => Self::Combine,
            Self::Combine => Self::PersistReport,
            Self::PersistReport => Self::EmitArtifact,
            Self::EmitArtifact | Self::Done => Self::Done,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "START",
            Self::LoadDatasets => "LOAD_DATASETS",
            Self::CheckSchemas => "CHECK_SCHEMAS",
            Self::DetectDrift => "DETECT_DRIFT",
            Self::Combine => "COMBINE",
            Self::PersistReport => "PERSIST_REPORT",
            Self::EmitArtifact => "EMIT_ARTIFACT",
            Self::Done => "DONE",
        }
    }
}

impl fmt::Display for ValidationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phases_are_linear() {
        let mut phase = ValidationPhase::Start;
        let mut visited = vec![phase];
        while phase != ValidationPhase::Done {
            phase = phase.next();
            visited.push(phase);
        }
        assert_eq!(visited.len(), 8);
        assert!(visited.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(ValidationPhase::Done.next(), ValidationPhase::Done);
    }

    #[test]
    fn test_display() {
        assert_eq!(ValidationPhase::DetectDrift.to_string(), "DETECT_DRIFT");
        assert_eq!(
            serde_json::to_string(&ValidationPhase::PersistReport).unwrap(),
            "\"PERSIST_REPORT\""
        );
    }
}
