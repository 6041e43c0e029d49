use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::dom::{Document, DomError, NodeId, Notice, NoticeKind, PageEvent};
use super::locator::{FieldRole, LocatorTable, COMPOSER_TEST_ID};
use super::selector::SelectorError;
use crate::channel::{FillCommand, FillReply, FILL_ACTION};

/// Time a notice stays up, plus its exit animation.
pub const NOTICE_DISMISS_MS: u64 = 4_000 + 300;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillRequest {
    pub title: String,
    pub description: String,
    pub acceptance_criteria: String,
}

impl FillRequest {
    pub fn value(&self, role: FieldRole) -> &str {
        match role {
            FieldRole::Title => &self.title,
            FieldRole::Description => &self.description,
            FieldRole::AcceptanceCriteria => &self.acceptance_criteria,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillOutcome {
    pub succeeded: bool,
    pub fields_filled: usize,
    pub fields_attempted: usize,
}

impl FillOutcome {
    pub fn message(&self) -> String {
        if self.succeeded {
            format!("Filled {} field(s)", self.fields_filled)
        } else {
            "No form fields found".to_string()
        }
    }

    fn notice_text(&self) -> String {
        if self.succeeded {
            format!("Successfully filled {} field(s)!", self.fields_filled)
        } else {
            "No form fields found. Please make sure you are on a Jira create issue page.".to_string()
        }
    }
}

/// How a matched element takes its text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementModality {
    PlainValue,
    RichText { composer: bool },
}

pub fn classify(doc: &dyn Document, node: NodeId) -> Result<ElementModality, DomError> {
    let tag = doc.tag_name(node).ok_or(DomError::NoSuchNode(node))?;
    if tag.eq_ignore_ascii_case("input") || tag.eq_ignore_ascii_case("textarea") {
        return Ok(ElementModality::PlainValue);
    }
    match doc.attribute(node, "contenteditable") {
        Some(flag) if !flag.eq_ignore_ascii_case("false") => Ok(ElementModality::RichText {
            composer: doc.attribute(node, "data-testid").as_deref() == Some(COMPOSER_TEST_ID),
        }),
        _ => Err(DomError::UnsupportedElement { node, tag }),
    }
}

fn write_element(doc: &mut dyn Document, node: NodeId, value: &str) -> Result<(), DomError> {
    match classify(&*doc, node)? {
        ElementModality::PlainValue => {
            doc.set_value(node, value)?;
            doc.dispatch_event(node, PageEvent::Input)?;
            doc.dispatch_event(node, PageEvent::Change)?;
            doc.dispatch_event(node, PageEvent::Blur)?;
        }
        ElementModality::RichText { composer } => {
            doc.focus(node)?;
            doc.set_text_content(node, "")?;
            doc.set_text_content(node, value)?;
            if composer {
                doc.dispatch_event(
                    node,
                    PageEvent::InsertText {
                        data: value.to_string(),
                    },
                )?;
            }
            doc.dispatch_event(node, PageEvent::Input)?;
            doc.dispatch_event(node, PageEvent::Change)?;
            doc.dispatch_event(node, PageEvent::Blur)?;
        }
    }
    Ok(())
}

/// Fills the issue-creation form on whatever page it is handed.
pub struct Injector {
    locators: LocatorTable,
}

impl Injector {
    pub fn new(locators: LocatorTable) -> Self {
        Self { locators }
    }

    pub fn with_builtin_locators() -> Result<Self, SelectorError> {
        Ok(Self::new(LocatorTable::builtin()?))
    }

    pub fn fill(&self, doc: &mut dyn Document, request: &FillRequest) -> FillOutcome {
        let mut filled = 0;
        for role in FieldRole::ALL {
            let value = request.value(role);
            let locator = match self.locators.get(role) {
                Some(locator) => locator,
                None => {
                    debug!(role = %role, "no locator configured");
                    continue;
                }
            };
            match locator.resolve(doc, |doc, node| write_element(doc, node, value)) {
                Some((candidate, node)) => {
                    filled += 1;
                    debug!(role = %role, selector = %candidate.selector, node = %node, "field filled");
                }
                None => debug!(role = %role, "field not found"),
            }
        }

        let outcome = FillOutcome {
            succeeded: filled > 0,
            fields_filled: filled,
            fields_attempted: FieldRole::ALL.len(),
        };
        info!(filled, attempted = outcome.fields_attempted, "form fill finished");

        let notice = Notice {
            message: outcome.notice_text(),
            kind: if outcome.succeeded {
                NoticeKind::Success
            } else {
                NoticeKind::Error
            },
            shown_at: Utc::now(),
            dismiss_after_ms: NOTICE_DISMISS_MS,
        };
        if let Err(err) = doc.show_notice(notice) {
            warn!(error = %err, "could not show page notice");
        }
        outcome
    }

    /// Page-side end of the command channel. Unknown actions get no reply.
    pub fn handle_command(&self, doc: &mut dyn Document, command: &FillCommand) -> Option<FillReply> {
        if command.action != FILL_ACTION {
            debug!(action = %command.action, "ignoring unknown command");
            return None;
        }
        let outcome = self.fill(doc, &command.data);
        Some(FillReply {
            success: outcome.succeeded,
            message: outcome.message(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::injector::memory_dom::MemoryDocument;

    fn request() -> FillRequest {
        FillRequest {
            title: "Bug: Login fails".to_string(),
            description: "Users cannot log in".to_string(),
            acceptance_criteria: "- Error message is clear".to_string(),
        }
    }

    #[test]
    fn classify_by_tag_and_contenteditable() {
        let mut doc = MemoryDocument::new();
        let input = doc.append(None, "input", &[]);
        let composer = doc.append(
            None,
            "div",
            &[("contenteditable", "true"), ("data-testid", COMPOSER_TEST_ID)],
        );
        let rich = doc.append(None, "div", &[("contenteditable", "")]);
        let frozen = doc.append(None, "div", &[("contenteditable", "false")]);

        assert_eq!(classify(&doc, input).unwrap(), ElementModality::PlainValue);
        assert_eq!(
            classify(&doc, composer).unwrap(),
            ElementModality::RichText { composer: true }
        );
        assert_eq!(
            classify(&doc, rich).unwrap(),
            ElementModality::RichText { composer: false }
        );
        assert!(matches!(
            classify(&doc, frozen),
            Err(DomError::UnsupportedElement { .. })
        ));
    }

    #[test]
    fn plain_inputs_get_input_change_blur() {
        let mut doc = MemoryDocument::new();
        let summary = doc.append(None, "input", &[("name", "summary")]);
        let injector = Injector::with_builtin_locators().unwrap();

        let outcome = injector.fill(&mut doc, &request());

        assert_eq!(outcome.fields_filled, 1);
        assert_eq!(doc.value(summary), "Bug: Login fails");
        assert_eq!(
            doc.events(summary),
            &[PageEvent::Input, PageEvent::Change, PageEvent::Blur]
        );
    }

    #[test]
    fn unknown_action_gets_no_reply() {
        let mut doc = MemoryDocument::new();
        let injector = Injector::with_builtin_locators().unwrap();
        let command = FillCommand {
            action: "somethingElse".to_string(),
            data: request(),
        };
        assert!(injector.handle_command(&mut doc, &command).is_none());
        assert!(doc.notices.is_empty());
    }

    #[test]
    fn reply_reports_count() {
        let mut doc = MemoryDocument::new();
        doc.append(None, "textarea", &[("name", "description")]);
        doc.append(None, "textarea", &[("name", "acceptanceCriteria")]);
        let injector = Injector::with_builtin_locators().unwrap();

        let reply = injector
            .handle_command(&mut doc, &FillCommand::fill(request()))
            .unwrap();
        assert!(reply.success);
        assert_eq!(reply.message, "Filled 2 field(s)");
    }
}
