use serde::{Deserialize, Serialize};
use url::Url;

use crate::injector::{Document, FillRequest, Injector};

pub const FILL_ACTION: &str = "fillJiraForm";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillCommand {
    pub action: String,
    pub data: FillRequest,
}

impl FillCommand {
    pub fn fill(data: FillRequest) -> Self {
        Self {
            action: FILL_ACTION.to_string(),
            data,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillReply {
    pub success: bool,
    pub message: String,
}

/// One-shot link from the control surface to a page. `None` means nothing
/// on the page side answered.
pub trait PageChannel {
    fn send(&mut self, command: &FillCommand) -> Option<FillReply>;
}

/// Delivers commands straight to an injector running against `doc`.
pub struct InjectorChannel<'a> {
    injector: &'a Injector,
    doc: &'a mut dyn Document,
}

impl<'a> InjectorChannel<'a> {
    pub fn new(injector: &'a Injector, doc: &'a mut dyn Document) -> Self {
        Self { injector, doc }
    }
}

impl PageChannel for InjectorChannel<'_> {
    fn send(&mut self, command: &FillCommand) -> Option<FillReply> {
        self.injector.handle_command(&mut *self.doc, command)
    }
}

/// A page where the injector never loaded.
pub struct SilentChannel;

impl PageChannel for SilentChannel {
    fn send(&mut self, _command: &FillCommand) -> Option<FillReply> {
        None
    }
}

/// True when `tab_url`'s host is one of `hosts` or a subdomain of one.
pub fn is_target_page(tab_url: &str, hosts: &[String]) -> bool {
    let parsed = match Url::parse(tab_url) {
        Ok(parsed) => parsed,
        Err(_) => return false,
    };
    let host = match parsed.host_str() {
        Some(host) => host.to_lowercase(),
        None => return false,
    };
    hosts.iter().any(|target| {
        let target = target.trim().to_lowercase();
        !target.is_empty() && (host == target || host.ends_with(&format!(".{}", target)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hosts() -> Vec<String> {
        vec!["atlassian.net".to_string(), "jira.com".to_string()]
    }

    #[test]
    fn target_hosts_match_subdomains_only() {
        assert!(is_target_page("https://acme.atlassian.net/jira/software/projects/X", &hosts()));
        assert!(is_target_page("https://jira.com/secure/CreateIssue.jspa", &hosts()));
        assert!(!is_target_page("https://evilatlassian.net/", &hosts()));
        assert!(!is_target_page("https://example.com/?next=atlassian.net", &hosts()));
        assert!(!is_target_page("not a url", &hosts()));
    }

    #[test]
    fn command_wire_shape() {
        let command = FillCommand::fill(FillRequest {
            title: "Task: A".to_string(),
            description: "B".to_string(),
            acceptance_criteria: "- C".to_string(),
        });
        let json = serde_json::to_value(&command).unwrap();
        assert_eq!(json["action"], "fillJiraForm");
        assert_eq!(json["data"]["acceptanceCriteria"], "- C");
    }
}
