//! Result kinds and their invalidation tags
//!
//! Each analysis the server can run has one result category. Push
//! notifications invalidate results by a string tag; the mapping between
//! kinds and tags is fixed here so it is written exactly once.

use serde::{Deserialize, Serialize};

/// Broadcast tag: the whole study's network changed
pub const STUDY_UPDATE_TAG: &str = "study";

/// A node finished building under some root network
pub const BUILD_COMPLETED_TAG: &str = "buildCompleted";

/// A node's build failed under some root network
pub const BUILD_FAILED_TAG: &str = "buildFailed";

/// Category of asynchronously computed analysis output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultKind {
    /// Load-flow computation
    LoadFlow,
    /// Security analysis (contingencies)
    SecurityAnalysis,
    /// Sensitivity analysis
    SensitivityAnalysis,
    /// Short-circuit analysis
    ShortCircuit,
    /// Dynamic simulation
    DynamicSimulation,
    /// Voltage profile initialization
    VoltageInit,
    /// State estimation
    StateEstimation,
}

impl ResultKind {
    /// All result kinds
    pub const ALL: [ResultKind; 7] = [
        Self::LoadFlow,
        Self::SecurityAnalysis,
        Self::SensitivityAnalysis,
        Self::ShortCircuit,
        Self::DynamicSimulation,
        Self::VoltageInit,
        Self::StateEstimation,
    ];

    /// The notification tag the server emits when this kind's result changed
    #[inline]
    #[must_use]
    pub fn update_tag(self) -> &'static str {
        match self {
            Self::LoadFlow => "loadflowResult",
            Self::SecurityAnalysis => "securityAnalysisResult",
            Self::SensitivityAnalysis => "sensitivityAnalysisResult",
            Self::ShortCircuit => "shortCircuitAnalysisResult",
            Self::DynamicSimulation => "dynamicSimulationResult",
            Self::VoltageInit => "voltageInitResult",
            Self::StateEstimation => "stateEstimationResult",
        }
    }

    /// Look up the kind carrying a given update tag
    #[inline]
    #[must_use]
    pub fn from_update_tag(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.update_tag() == tag)
    }

    /// Default invalidation set for a subscription of this kind
    ///
    /// A result is stale when its own tag fires, when the network itself
    /// changed, or when the node was rebuilt.
    #[inline]
    #[must_use]
    pub fn invalidation_tags(self) -> Vec<String> {
        vec![
            self.update_tag().to_string(),
            STUDY_UPDATE_TAG.to_string(),
            BUILD_COMPLETED_TAG.to_string(),
        ]
    }
}

impl std::fmt::Display for ResultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.update_tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_tags_are_distinct() {
        let mut tags: Vec<_> = ResultKind::ALL.iter().map(|k| k.update_tag()).collect();
        tags.sort_unstable();
        tags.dedup();
        assert_eq!(tags.len(), ResultKind::ALL.len());
    }

    #[test]
    fn tag_roundtrip() {
        for kind in ResultKind::ALL {
            assert_eq!(ResultKind::from_update_tag(kind.update_tag()), Some(kind));
        }
        assert_eq!(ResultKind::from_update_tag("unknownTag"), None);
    }

    #[test]
    fn invalidation_tags_include_broadcast_and_build() {
        let tags = ResultKind::LoadFlow.invalidation_tags();
        assert!(tags.iter().any(|t| t == "loadflowResult"));
        assert!(tags.iter().any(|t| t == STUDY_UPDATE_TAG));
        assert!(tags.iter().any(|t| t == BUILD_COMPLETED_TAG));
    }
}
