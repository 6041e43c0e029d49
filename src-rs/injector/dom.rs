use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Handle to an element inside a [`Document`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Change notifications the host page's listeners observe.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PageEvent {
    Input,
    InsertText { data: String },
    Change,
    Blur,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

/// Transient banner raised inside the page. The host removes it once
/// `dismiss_after_ms` has elapsed since `shown_at`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
    pub shown_at: DateTime<Utc>,
    pub dismiss_after_ms: u64,
}

impl Notice {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        let elapsed = now.signed_duration_since(self.shown_at);
        elapsed.num_milliseconds() >= self.dismiss_after_ms as i64
    }
}

#[derive(Debug, Error)]
pub enum DomError {
    #[error("no such element: {0}")]
    NoSuchNode(NodeId),

    #[error("element {0} is detached from the document")]
    Detached(NodeId),

    #[error("element {node} <{tag}> is neither a value holder nor a rich-text region")]
    UnsupportedElement { node: NodeId, tag: String },

    #[error("element {node} names parent {parent}, which does not precede it")]
    BrokenParent { node: NodeId, parent: usize },
}

/// The page the injector reads and writes.
///
/// Elements are reported in document order; selector matching is built on
/// the read half, the write half is the host's way of mutating the page and
/// notifying its listeners.
pub trait Document {
    fn nodes(&self) -> Vec<NodeId>;
    fn tag_name(&self, node: NodeId) -> Option<String>;
    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    fn set_value(&mut self, node: NodeId, value: &str) -> Result<(), DomError>;
    fn set_text_content(&mut self, node: NodeId, text: &str) -> Result<(), DomError>;
    fn focus(&mut self, node: NodeId) -> Result<(), DomError>;
    fn dispatch_event(&mut self, node: NodeId, event: PageEvent) -> Result<(), DomError>;

    /// Replaces any notice currently on screen.
    fn show_notice(&mut self, notice: Notice) -> Result<(), DomError>;
}
