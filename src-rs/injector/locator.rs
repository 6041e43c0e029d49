use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::dom::{Document, DomError, NodeId};
use super::selector::{query_first, Selector, SelectorError};

/// Marker carried by the issue tracker's primary rich-text composer.
pub const COMPOSER_TEST_ID: &str = "ak-editor-textarea";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldRole {
    Title,
    Description,
    AcceptanceCriteria,
}

impl FieldRole {
    pub const ALL: [FieldRole; 3] = [
        FieldRole::Title,
        FieldRole::Description,
        FieldRole::AcceptanceCriteria,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldRole::Title => "title",
            FieldRole::Description => "description",
            FieldRole::AcceptanceCriteria => "acceptanceCriteria",
        }
    }
}

impl fmt::Display for FieldRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const TITLE_CANDIDATES: &[&str] = &[
    r#"input[name="summary"]"#,
    r#"input[id*="summary"]"#,
    r#"textarea[name="summary"]"#,
    r#"textarea[id*="summary"]"#,
    "#summary",
    r#"[data-testid="summary-field"]"#,
    r#"[data-testid="summary"]"#,
    r#"[data-testid="summary-input"]"#,
    r#"input[placeholder*="summary" i]"#,
    r#"textarea[placeholder*="summary" i]"#,
    r#"input[placeholder*="title" i]"#,
    r#"textarea[placeholder*="title" i]"#,
    ".summary-field input",
    ".summary-field textarea",
    ".title-field input",
    ".title-field textarea",
];

const DESCRIPTION_CANDIDATES: &[&str] = &[
    r#"div[data-testid="ak-editor-textarea"]"#,
    r#"div[contenteditable="true"][data-testid="ak-editor-textarea"]"#,
    r#"div[contenteditable="true"][id="ak-editor-textarea"]"#,
    r#"div[contenteditable="true"][role="textbox"]"#,
    r#"textarea[name="description"]"#,
    r#"textarea[id*="description"]"#,
    "#description",
    r#"[data-testid="description-field"]"#,
    r#"[data-testid="description"]"#,
    r#"[data-testid="description-input"]"#,
    ".description-field textarea",
    ".description textarea",
    r#"textarea[placeholder*="description" i]"#,
    r#"div[contenteditable="true"][data-testid="description"]"#,
    r#"div[contenteditable="true"][id*="description"]"#,
];

const ACCEPTANCE_CANDIDATES: &[&str] = &[
    r#"textarea[name="acceptanceCriteria"]"#,
    r#"textarea[id*="acceptance"]"#,
    "#acceptanceCriteria",
    r#"[data-testid="acceptance-criteria"]"#,
    r#"[data-testid="acceptance"]"#,
    r#"[data-testid="acceptance-criteria-input"]"#,
    ".acceptance-criteria textarea",
    ".acceptance textarea",
    r#"textarea[placeholder*="acceptance" i]"#,
    r#"textarea[placeholder*="criteria" i]"#,
    r#"div[contenteditable="true"][data-testid="acceptance-criteria"]"#,
    r#"div[contenteditable="true"][id*="acceptance"]"#,
];

#[derive(Clone, Debug)]
pub struct Candidate {
    pub priority: usize,
    pub selector: Selector,
}

/// Candidates for one role, most specific first.
#[derive(Clone, Debug)]
pub struct FieldLocator {
    pub role: FieldRole,
    pub candidates: Vec<Candidate>,
}

impl FieldLocator {
    pub fn parse(role: FieldRole, selectors: &[&str]) -> Result<Self, SelectorError> {
        let candidates = selectors
            .iter()
            .enumerate()
            .map(|(priority, source)| {
                Ok(Candidate {
                    priority,
                    selector: Selector::parse(source)?,
                })
            })
            .collect::<Result<Vec<_>, SelectorError>>()?;
        Ok(Self { role, candidates })
    }

    /// Walks the candidates in priority order, handing the first element each
    /// one matches to `attempt`. Returns the winning candidate and element, or
    /// `None` once the list is exhausted. A failed attempt moves on to the
    /// next candidate.
    pub fn resolve<F>(&self, doc: &mut dyn Document, mut attempt: F) -> Option<(&Candidate, NodeId)>
    where
        F: FnMut(&mut dyn Document, NodeId) -> Result<(), DomError>,
    {
        for candidate in &self.candidates {
            let node = match query_first(&*doc, &candidate.selector) {
                Some(node) => node,
                None => continue,
            };
            match attempt(&mut *doc, node) {
                Ok(()) => return Some((candidate, node)),
                Err(err) => warn!(
                    role = %self.role,
                    selector = %candidate.selector,
                    node = %node,
                    error = %err,
                    "candidate matched but could not be written"
                ),
            }
        }
        None
    }
}

#[derive(Clone, Debug)]
pub struct LocatorTable {
    locators: Vec<FieldLocator>,
}

impl LocatorTable {
    pub fn new(locators: Vec<FieldLocator>) -> Self {
        Self { locators }
    }

    /// The issue tracker's known create-form markup.
    pub fn builtin() -> Result<Self, SelectorError> {
        Ok(Self::new(vec![
            FieldLocator::parse(FieldRole::Title, TITLE_CANDIDATES)?,
            FieldLocator::parse(FieldRole::Description, DESCRIPTION_CANDIDATES)?,
            FieldLocator::parse(FieldRole::AcceptanceCriteria, ACCEPTANCE_CANDIDATES)?,
        ]))
    }

    pub fn get(&self, role: FieldRole) -> Option<&FieldLocator> {
        self.locators.iter().find(|locator| locator.role == role)
    }
}
