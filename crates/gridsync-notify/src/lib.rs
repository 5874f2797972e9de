//! gridsync notification ingress
//!
//! The push channel delivers change envelopes as loosely-typed header bags.
//! This crate is the validation boundary: [`RawEnvelope`] is the wire shape,
//! [`Notification`] the tagged union the engine consumes. Headers are
//! interpreted here and nowhere else.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod envelope;
pub mod error;
pub mod notification;

// Re-exports for convenience
pub use envelope::{
    RawEnvelope, H_NEW_NODE, H_NODE, H_NODES, H_PARENT_NODE, H_ROOT_NETWORK, H_STUDY,
    H_UPDATE_TYPE,
};
pub use error::EnvelopeError;
pub use notification::{
    NodeIds, Notification, NODE_CREATED_TAG, NODE_DELETED_TAG, NODE_UPDATED_TAG,
};
