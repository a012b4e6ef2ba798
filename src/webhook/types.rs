//! Webhook collaborator types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the external application owning a webhook.
///
/// Integer and string ids are both accepted; they are normalised to their
/// textual form, which is what partitions breaker state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(String);

impl AppId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for AppId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<u64> for AppId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for AppId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for AppId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Anything that can name the app owning a webhook endpoint.
pub trait Webhook {
    fn app_id(&self) -> AppId;
}

impl<W: Webhook + ?Sized> Webhook for &W {
    fn app_id(&self) -> AppId {
        (**self).app_id()
    }
}

/// A plain webhook target: an endpoint URL and the app it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookTarget {
    /// Webhook id.
    pub id: u64,
    /// Owning app.
    pub app_id: AppId,
    /// Endpoint the webhook is delivered to.
    pub target_url: String,
}

impl WebhookTarget {
    pub fn new(id: u64, app_id: impl Into<AppId>, target_url: impl Into<String>) -> Self {
        Self {
            id,
            app_id: app_id.into(),
            target_url: target_url.into(),
        }
    }
}

impl Webhook for WebhookTarget {
    fn app_id(&self) -> AppId {
        self.app_id.clone()
    }
}

/// Result of a synchronous webhook call: the parsed body, or the transport
/// error that prevented getting one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncResponse {
    pub body: Option<serde_json::Value>,
    pub error: Option<String>,
}

impl SyncResponse {
    pub fn ok(body: serde_json::Value) -> Self {
        Self {
            body: Some(body),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            body: None,
            error: Some(error.into()),
        }
    }

    /// No body and no error.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the endpoint returned something usable.
    pub fn has_content(&self) -> bool {
        match &self.body {
            None | Some(serde_json::Value::Null) => false,
            Some(serde_json::Value::Bool(b)) => *b,
            Some(serde_json::Value::String(s)) => !s.is_empty(),
            Some(serde_json::Value::Array(a)) => !a.is_empty(),
            Some(serde_json::Value::Object(o)) => !o.is_empty(),
            Some(serde_json::Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        }
    }
}
