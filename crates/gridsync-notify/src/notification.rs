//! Typed change notifications
//!
//! [`Notification::from_raw`] validates a raw envelope exactly once; each
//! variant carries only the headers that matter to it. Everything past this
//! boundary works with typed ids, never with the header bag.

use crate::envelope::{
    RawEnvelope, H_NEW_NODE, H_NODE, H_NODES, H_PARENT_NODE, H_ROOT_NETWORK, H_STUDY,
};
use crate::error::EnvelopeError;
use gridsync_model::{
    BuildStatus, NodeUuid, ResultKind, RootNetworkUuid, StudyUuid, BUILD_COMPLETED_TAG,
    BUILD_FAILED_TAG, STUDY_UPDATE_TAG,
};
use smallvec::SmallVec;

/// Update tag: a node was inserted into the tree
pub const NODE_CREATED_TAG: &str = "nodeCreated";
/// Update tag: node attributes changed
pub const NODE_UPDATED_TAG: &str = "nodeUpdated";
/// Update tag: nodes were removed, subtrees included
pub const NODE_DELETED_TAG: &str = "nodeDeleted";

/// Short inline list of node ids; envelopes rarely name more than a few
pub type NodeIds = SmallVec<[NodeUuid; 4]>;

/// A validated change notification
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// A node was created under `parent_id`
    NodeCreated {
        /// Owning study
        study: StudyUuid,
        /// Parent the node was attached to
        parent_id: NodeUuid,
        /// The new node
        node_id: NodeUuid,
    },
    /// Node attributes changed; the push carries ids only, attributes are
    /// re-fetched
    NodesUpdated {
        /// Owning study
        study: StudyUuid,
        /// Affected nodes
        node_ids: NodeIds,
    },
    /// Nodes (and their subtrees) were removed
    NodesDeleted {
        /// Owning study
        study: StudyUuid,
        /// Removed nodes
        node_ids: NodeIds,
    },
    /// A node's build finished under one root network
    BuildStatusChanged {
        /// Owning study
        study: StudyUuid,
        /// Rebuilt node
        node_id: NodeUuid,
        /// Scenario the build ran under
        root_network: RootNetworkUuid,
        /// Outcome
        status: BuildStatus,
    },
    /// A cached result category is stale
    ResultInvalidated {
        /// Owning study
        study: StudyUuid,
        /// The raw invalidation tag (a result kind's tag, the study
        /// broadcast tag, or a build tag)
        tag: String,
        /// Named nodes; empty means the invalidation is broadcast
        node_ids: NodeIds,
        /// Scenario filter, when the server scopes the change
        root_network: Option<RootNetworkUuid>,
    },
}

impl Notification {
    /// Validate a raw envelope into a typed notification
    ///
    /// # Errors
    /// [`EnvelopeError`] when a required header is absent or malformed, or
    /// the update type is unknown to this client.
    pub fn from_raw(raw: &RawEnvelope) -> Result<Self, EnvelopeError> {
        let update_type = raw.require_str(crate::envelope::H_UPDATE_TYPE)?.to_string();
        let study = StudyUuid(raw.require_uuid(H_STUDY)?);

        match update_type.as_str() {
            NODE_CREATED_TAG => Ok(Self::NodeCreated {
                study,
                parent_id: NodeUuid(raw.require_uuid(H_PARENT_NODE)?),
                node_id: NodeUuid(raw.require_uuid(H_NEW_NODE)?),
            }),
            NODE_UPDATED_TAG => Ok(Self::NodesUpdated {
                study,
                node_ids: Self::named_nodes(raw)?,
            }),
            NODE_DELETED_TAG => Ok(Self::NodesDeleted {
                study,
                node_ids: Self::named_nodes(raw)?,
            }),
            BUILD_COMPLETED_TAG | BUILD_FAILED_TAG => Ok(Self::BuildStatusChanged {
                study,
                node_id: NodeUuid(raw.require_uuid(H_NODE)?),
                root_network: RootNetworkUuid(raw.require_uuid(H_ROOT_NETWORK)?),
                status: if update_type == BUILD_COMPLETED_TAG {
                    BuildStatus::Built
                } else {
                    BuildStatus::BuiltWithErrors
                },
            }),
            tag if tag == STUDY_UPDATE_TAG || ResultKind::from_update_tag(tag).is_some() => {
                Ok(Self::ResultInvalidated {
                    study,
                    tag: update_type,
                    node_ids: Self::named_nodes(raw)?,
                    root_network: raw.optional_uuid(H_ROOT_NETWORK)?.map(RootNetworkUuid),
                })
            }
            _ => Err(EnvelopeError::UnrecognizedUpdateType(update_type)),
        }
    }

    /// Owning study of any notification
    #[inline]
    #[must_use]
    pub fn study(&self) -> StudyUuid {
        match self {
            Self::NodeCreated { study, .. }
            | Self::NodesUpdated { study, .. }
            | Self::NodesDeleted { study, .. }
            | Self::BuildStatusChanged { study, .. }
            | Self::ResultInvalidated { study, .. } => *study,
        }
    }

    /// Merge the `node` and `nodes` headers into one id list
    fn named_nodes(raw: &RawEnvelope) -> Result<NodeIds, EnvelopeError> {
        let mut ids = NodeIds::new();
        if let Some(id) = raw.optional_uuid(H_NODE)? {
            ids.push(NodeUuid(id));
        }
        for id in raw.optional_uuid_list(H_NODES)? {
            let id = NodeUuid(id);
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::H_UPDATE_TYPE;
    use pretty_assertions::assert_eq;

    fn base(update_type: &str, study: StudyUuid) -> RawEnvelope {
        RawEnvelope::new()
            .with_header(H_UPDATE_TYPE, update_type)
            .with_header(H_STUDY, study.to_string())
    }

    #[test]
    fn node_created_parses() {
        let study = StudyUuid::new();
        let parent = NodeUuid::new();
        let node = NodeUuid::new();

        let raw = base(NODE_CREATED_TAG, study)
            .with_header(H_PARENT_NODE, parent.to_string())
            .with_header(H_NEW_NODE, node.to_string());

        assert_eq!(
            Notification::from_raw(&raw).unwrap(),
            Notification::NodeCreated {
                study,
                parent_id: parent,
                node_id: node,
            }
        );
    }

    #[test]
    fn node_created_requires_parent() {
        let raw = base(NODE_CREATED_TAG, StudyUuid::new())
            .with_header(H_NEW_NODE, NodeUuid::new().to_string());

        assert_eq!(
            Notification::from_raw(&raw),
            Err(EnvelopeError::MissingHeader(H_PARENT_NODE))
        );
    }

    #[test]
    fn result_invalidated_merges_node_headers() {
        let study = StudyUuid::new();
        let a = NodeUuid::new();
        let b = NodeUuid::new();

        let raw = base("loadflowResult", study)
            .with_header(H_NODE, a.to_string())
            .with_header(H_NODES, serde_json::json!([a.to_string(), b.to_string()]));

        let Notification::ResultInvalidated { node_ids, tag, .. } =
            Notification::from_raw(&raw).unwrap()
        else {
            panic!("expected ResultInvalidated");
        };
        assert_eq!(tag, "loadflowResult");
        assert_eq!(node_ids.as_slice(), &[a, b]);
    }

    #[test]
    fn result_invalidated_broadcast_has_no_nodes() {
        let raw = base(STUDY_UPDATE_TAG, StudyUuid::new());

        let Notification::ResultInvalidated {
            node_ids,
            root_network,
            ..
        } = Notification::from_raw(&raw).unwrap()
        else {
            panic!("expected ResultInvalidated");
        };
        assert!(node_ids.is_empty());
        assert!(root_network.is_none());
    }

    #[test]
    fn build_completed_maps_status() {
        let study = StudyUuid::new();
        let node = NodeUuid::new();
        let rn = RootNetworkUuid::new();

        let raw = base(BUILD_COMPLETED_TAG, study)
            .with_header(H_NODE, node.to_string())
            .with_header(H_ROOT_NETWORK, rn.to_string());

        assert_eq!(
            Notification::from_raw(&raw).unwrap(),
            Notification::BuildStatusChanged {
                study,
                node_id: node,
                root_network: rn,
                status: BuildStatus::Built,
            }
        );

        let raw = base(BUILD_FAILED_TAG, study)
            .with_header(H_NODE, node.to_string())
            .with_header(H_ROOT_NETWORK, rn.to_string());

        let Notification::BuildStatusChanged { status, .. } =
            Notification::from_raw(&raw).unwrap()
        else {
            panic!("expected BuildStatusChanged");
        };
        assert_eq!(status, BuildStatus::BuiltWithErrors);
    }

    #[test]
    fn unknown_update_type_is_rejected() {
        let raw = base("somethingElse", StudyUuid::new());
        assert_eq!(
            Notification::from_raw(&raw),
            Err(EnvelopeError::UnrecognizedUpdateType(
                "somethingElse".to_string()
            ))
        );
    }

    #[test]
    fn missing_update_type_is_rejected() {
        let raw = RawEnvelope::new().with_header(H_STUDY, StudyUuid::new().to_string());
        assert_eq!(
            Notification::from_raw(&raw),
            Err(EnvelopeError::MissingHeader(H_UPDATE_TYPE))
        );
    }
}
