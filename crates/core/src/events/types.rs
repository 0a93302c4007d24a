use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Events emitted after successful mutations, consumed by SSE listeners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ContentEvent {
    Welcome,
    Changed(ChangeEvent),
    Reconnect,
}

/// Content table touched by a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Resource {
    Carousel,
    Investments,
    Properties,
    Config,
    Settings,
    Storage,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Carousel => "carousel",
            Resource::Investments => "investments",
            Resource::Properties => "properties",
            Resource::Config => "config",
            Resource::Settings => "settings",
            Resource::Storage => "storage",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeAction {
    Created,
    Updated,
    Deleted,
    Uploaded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    pub resource: Resource,
    pub action: ChangeAction,
    /// Row id; `None` for singleton tables and uploads.
    pub id: Option<i64>,
    pub timestamp: DateTime<Utc>,
}

impl ChangeEvent {
    pub fn now(resource: Resource, action: ChangeAction, id: Option<i64>) -> Self {
        Self {
            resource,
            action,
            id,
            timestamp: Utc::now(),
        }
    }
}
