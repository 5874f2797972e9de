//! Subscription addressing

use crate::ids::{NodeUuid, RootNetworkUuid, StudyUuid};
use crate::kind::ResultKind;
use serde::{Deserialize, Serialize};

/// Composite identity of one result subscription
///
/// Results are independent per node, per root network and per kind; a change
/// to any component addresses a different cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionKey {
    /// Owning study
    pub study: StudyUuid,
    /// Tree node the result belongs to
    pub node: NodeUuid,
    /// Scenario the result was computed under
    pub root_network: RootNetworkUuid,
    /// Result category
    pub kind: ResultKind,
}

impl SubscriptionKey {
    /// Create a subscription key
    #[inline]
    #[must_use]
    pub fn new(
        study: StudyUuid,
        node: NodeUuid,
        root_network: RootNetworkUuid,
        kind: ResultKind,
    ) -> Self {
        Self {
            study,
            node,
            root_network,
            kind,
        }
    }
}

impl std::fmt::Display for SubscriptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.study, self.node, self.root_network, self.kind
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_differ_per_component() {
        let study = StudyUuid::new();
        let node = NodeUuid::new();
        let rn = RootNetworkUuid::new();

        let base = SubscriptionKey::new(study, node, rn, ResultKind::LoadFlow);
        assert_eq!(
            base,
            SubscriptionKey::new(study, node, rn, ResultKind::LoadFlow)
        );
        assert_ne!(
            base,
            SubscriptionKey::new(study, node, rn, ResultKind::SecurityAnalysis)
        );
        assert_ne!(
            base,
            SubscriptionKey::new(study, NodeUuid::new(), rn, ResultKind::LoadFlow)
        );
        assert_ne!(
            base,
            SubscriptionKey::new(study, node, RootNetworkUuid::new(), ResultKind::LoadFlow)
        );
    }
}
