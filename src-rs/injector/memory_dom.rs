use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::dom::{Document, DomError, NodeId, Notice, PageEvent};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MemoryElement {
    pub tag: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub parent: Option<usize>,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub events: Vec<PageEvent>,
    /// Writes against a detached element fail, as they would for a node a
    /// framework has already thrown away.
    #[serde(default)]
    pub detached: bool,
}

/// Element tree held in memory. Fixture pages are built with [`append`] or
/// deserialised from JSON; element order is document order, so a parent
/// must appear before its children.
///
/// [`append`]: MemoryDocument::append
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MemoryDocument {
    #[serde(default)]
    pub elements: Vec<MemoryElement>,
    #[serde(default)]
    pub focused: Option<usize>,
    #[serde(default)]
    pub notices: Vec<Notice>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, parent: Option<NodeId>, tag: &str, attributes: &[(&str, &str)]) -> NodeId {
        let element = MemoryElement {
            tag: tag.to_lowercase(),
            attributes: attributes
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            parent: parent.map(|node| node.0),
            ..MemoryElement::default()
        };
        self.elements.push(element);
        NodeId(self.elements.len() - 1)
    }

    pub fn detach(&mut self, node: NodeId) {
        if let Some(element) = self.elements.get_mut(node.0) {
            element.detached = true;
        }
    }

    pub fn element(&self, node: NodeId) -> Option<&MemoryElement> {
        self.elements.get(node.0)
    }

    pub fn value(&self, node: NodeId) -> &str {
        self.element(node).map(|el| el.value.as_str()).unwrap_or("")
    }

    pub fn text(&self, node: NodeId) -> &str {
        self.element(node).map(|el| el.text.as_str()).unwrap_or("")
    }

    pub fn events(&self, node: NodeId) -> &[PageEvent] {
        self.element(node).map(|el| el.events.as_slice()).unwrap_or(&[])
    }

    /// Notices still on screen at `now`.
    pub fn active_notices(&self, now: DateTime<Utc>) -> Vec<&Notice> {
        self.notices.iter().filter(|notice| !notice.is_expired(now)).collect()
    }

    pub fn expire_notices(&mut self, now: DateTime<Utc>) {
        self.notices.retain(|notice| !notice.is_expired(now));
    }

    /// Checks the parent links of a loaded page. Every parent must come
    /// earlier in document order, so the tree has no cycles.
    pub fn validate(&self) -> Result<(), DomError> {
        for (idx, element) in self.elements.iter().enumerate() {
            if let Some(parent) = element.parent {
                if parent >= idx {
                    return Err(DomError::BrokenParent {
                        node: NodeId(idx),
                        parent,
                    });
                }
            }
        }
        Ok(())
    }

    fn writable(&mut self, node: NodeId) -> Result<&mut MemoryElement, DomError> {
        let element = self.elements.get_mut(node.0).ok_or(DomError::NoSuchNode(node))?;
        if element.detached {
            return Err(DomError::Detached(node));
        }
        Ok(element)
    }
}

impl Document for MemoryDocument {
    fn nodes(&self) -> Vec<NodeId> {
        (0..self.elements.len()).map(NodeId).collect()
    }

    fn tag_name(&self, node: NodeId) -> Option<String> {
        self.element(node).map(|el| el.tag.clone())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node)?.attributes.get(name).cloned()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.element(node)?.parent.map(NodeId)
    }

    fn set_value(&mut self, node: NodeId, value: &str) -> Result<(), DomError> {
        self.writable(node)?.value = value.to_string();
        Ok(())
    }

    fn set_text_content(&mut self, node: NodeId, text: &str) -> Result<(), DomError> {
        self.writable(node)?.text = text.to_string();
        Ok(())
    }

    fn focus(&mut self, node: NodeId) -> Result<(), DomError> {
        self.writable(node)?;
        self.focused = Some(node.0);
        Ok(())
    }

    fn dispatch_event(&mut self, node: NodeId, event: PageEvent) -> Result<(), DomError> {
        self.writable(node)?.events.push(event);
        Ok(())
    }

    fn show_notice(&mut self, notice: Notice) -> Result<(), DomError> {
        self.notices.clear();
        self.notices.push(notice);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::injector::dom::NoticeKind;

    #[test]
    fn detached_elements_reject_writes() {
        let mut doc = MemoryDocument::new();
        let input = doc.append(None, "INPUT", &[("name", "summary")]);
        doc.detach(input);

        assert!(matches!(doc.set_value(input, "x"), Err(DomError::Detached(_))));
        assert_eq!(doc.tag_name(input).as_deref(), Some("input"));
    }

    #[test]
    fn notices_replace_and_expire() {
        let mut doc = MemoryDocument::new();
        let now = Utc::now();
        for message in ["first", "second"] {
            doc.show_notice(Notice {
                message: message.to_string(),
                kind: NoticeKind::Success,
                shown_at: now,
                dismiss_after_ms: 4_300,
            })
            .unwrap();
        }

        assert_eq!(doc.notices.len(), 1);
        assert_eq!(doc.active_notices(now).len(), 1);
        doc.expire_notices(now + Duration::milliseconds(4_300));
        assert!(doc.notices.is_empty());
    }

    #[test]
    fn fixture_json_deserializes() {
        let raw = r#"{
            "elements": [
                {"tag": "form"},
                {"tag": "input", "attributes": {"name": "summary"}, "parent": 0}
            ]
        }"#;
        let doc: MemoryDocument = serde_json::from_str(raw).unwrap();
        assert_eq!(doc.parent(NodeId(1)), Some(NodeId(0)));
        assert_eq!(doc.attribute(NodeId(1), "name").as_deref(), Some("summary"));
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn parents_must_precede_children() {
        let raw = r#"{"elements": [{"tag": "div", "parent": 1}, {"tag": "input", "parent": 0}]}"#;
        let doc: MemoryDocument = serde_json::from_str(raw).unwrap();
        assert!(matches!(
            doc.validate(),
            Err(DomError::BrokenParent { parent: 1, .. })
        ));
    }
}
