//! Origin-request event wire format.
//!
//! An edge function forwards `{"Records":[{"cf":{"request":{...}}}]}` and
//! expects either the request object back, to continue to the origin, or a
//! generated response object.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Incoming origin-request event.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct EdgeEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<EdgeRecord>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EdgeRecord {
    pub cf: CfPayload,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CfPayload {
    #[serde(default)]
    pub request: Option<EdgeRequest>,
}

impl EdgeEvent {
    /// The request of the first record, if any.
    pub fn into_request(self) -> Option<EdgeRequest> {
        self.records.into_iter().next().and_then(|r| r.cf.request)
    }
}

/// The edge request, kept verbatim so it can be echoed back untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeRequest(pub Map<String, Value>);

impl EdgeRequest {
    pub fn uri(&self) -> Option<&str> {
        self.0.get("uri").and_then(Value::as_str)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HeaderEntry {
    pub key: String,
    pub value: String,
}

/// Response generated at the edge instead of contacting the origin.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EdgeResponse {
    pub status: String,
    #[serde(rename = "statusDescription")]
    pub status_description: String,
    /// Lowercase header name to entries.
    pub headers: BTreeMap<String, Vec<HeaderEntry>>,
}

impl EdgeResponse {
    pub fn new(status: u16, description: &str) -> Self {
        Self {
            status: status.to_string(),
            status_description: description.to_string(),
            headers: BTreeMap::new(),
        }
    }

    /// Add a header, keyed by its lowercase name.
    pub fn with_header(mut self, key: &str, value: impl Into<String>) -> Self {
        self.headers
            .entry(key.to_ascii_lowercase())
            .or_default()
            .push(HeaderEntry {
                key: key.to_string(),
                value: value.into(),
            });
        self
    }
}

/// What the edge function should return.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EdgeReply {
    Request(EdgeRequest),
    Response(EdgeResponse),
}
