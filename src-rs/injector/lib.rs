pub mod dom;
pub mod fill;
pub mod locator;
pub mod memory_dom;
pub mod selector;

pub use dom::{Document, DomError, NodeId, Notice, NoticeKind, PageEvent};
pub use fill::{classify, ElementModality, FillOutcome, FillRequest, Injector, NOTICE_DISMISS_MS};
pub use locator::{Candidate, FieldLocator, FieldRole, LocatorTable, COMPOSER_TEST_ID};
pub use memory_dom::{MemoryDocument, MemoryElement};
pub use selector::{query_first, Selector, SelectorError};
