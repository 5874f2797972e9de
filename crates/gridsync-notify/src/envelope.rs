//! Raw notification envelopes
//!
//! The push channel delivers a loosely-typed header bag per change. Nothing
//! downstream touches the bag directly; [`crate::Notification::from_raw`]
//! is the single place headers are interpreted.

use crate::error::EnvelopeError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;
use uuid::Uuid;

/// Header: kind of change this envelope announces
pub const H_UPDATE_TYPE: &str = "updateType";
/// Header: owning study
pub const H_STUDY: &str = "studyUuid";
/// Header: single affected node
pub const H_NODE: &str = "node";
/// Header: list of affected nodes
pub const H_NODES: &str = "nodes";
/// Header: affected root network
pub const H_ROOT_NETWORK: &str = "rootNetworkUuid";
/// Header: id of a freshly created node
pub const H_NEW_NODE: &str = "newNode";
/// Header: parent of a freshly created node
pub const H_PARENT_NODE: &str = "parentNode";

/// One change notification as delivered by the push channel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEnvelope {
    /// Loosely-typed header bag
    pub headers: BTreeMap<String, Value>,
}

impl RawEnvelope {
    /// Create an empty envelope
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With one header set (builder, used heavily by tests)
    #[inline]
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.headers.insert(name.to_string(), value.into());
        self
    }

    /// A required string header
    pub(crate) fn require_str(&self, name: &'static str) -> Result<&str, EnvelopeError> {
        let value = self
            .headers
            .get(name)
            .ok_or(EnvelopeError::MissingHeader(name))?;
        value.as_str().ok_or_else(|| EnvelopeError::MalformedHeader {
            name,
            reason: format!("expected string, got {value}"),
        })
    }

    /// A required UUID header
    pub(crate) fn require_uuid(&self, name: &'static str) -> Result<Uuid, EnvelopeError> {
        let s = self.require_str(name)?;
        Uuid::from_str(s).map_err(|e| EnvelopeError::MalformedHeader {
            name,
            reason: e.to_string(),
        })
    }

    /// An optional UUID header; absent is fine, malformed is not
    pub(crate) fn optional_uuid(&self, name: &'static str) -> Result<Option<Uuid>, EnvelopeError> {
        match self.headers.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(_) => self.require_uuid(name).map(Some),
        }
    }

    /// An optional UUID-list header
    ///
    /// The channel encodes lists either as a JSON array or as one bare
    /// string.
    pub(crate) fn optional_uuid_list(
        &self,
        name: &'static str,
    ) -> Result<Vec<Uuid>, EnvelopeError> {
        match self.headers.get(name) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::String(s)) => {
                let id = Uuid::from_str(s).map_err(|e| EnvelopeError::MalformedHeader {
                    name,
                    reason: e.to_string(),
                })?;
                Ok(vec![id])
            }
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    let s = item.as_str().ok_or_else(|| EnvelopeError::MalformedHeader {
                        name,
                        reason: format!("expected string element, got {item}"),
                    })?;
                    Uuid::from_str(s).map_err(|e| EnvelopeError::MalformedHeader {
                        name,
                        reason: e.to_string(),
                    })
                })
                .collect(),
            Some(other) => Err(EnvelopeError::MalformedHeader {
                name,
                reason: format!("expected array or string, got {other}"),
            }),
        }
    }
}
