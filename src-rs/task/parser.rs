use tracing::debug;

use super::types::GeneratedTask;

/// Task-type tags a title is expected to start with.
pub const TASK_TAGS: [&str; 7] = ["Feature", "Bug", "Task", "Story", "Epic", "Fix", "Enhancement"];
pub const DEFAULT_TAG: &str = "Task";

const TITLE_HEADER: &str = "Title:";
const DESCRIPTION_HEADER: &str = "Description:";
const ACCEPTANCE_HEADER: &str = "Acceptance Criteria:";

pub fn has_task_tag(text: &str) -> bool {
    TASK_TAGS.iter().any(|tag| {
        text.strip_prefix(tag)
            .map(|rest| rest.starts_with(':'))
            .unwrap_or(false)
    })
}

fn tagged(title: &str) -> String {
    if has_task_tag(title) {
        title.to_string()
    } else {
        format!("{}: {}", DEFAULT_TAG, title)
    }
}

/// Makes sure the completion yields a tagged title. Returns `None` for an
/// empty completion.
pub fn normalize_response(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let lines: Vec<&str> = raw.lines().collect();

    if let Some(idx) = lines.iter().position(|line| line.trim().starts_with(TITLE_HEADER)) {
        let value = lines[idx].trim()[TITLE_HEADER.len()..].trim();
        let mut out: Vec<String> = lines.iter().map(|line| line.to_string()).collect();
        out[idx] = format!("{} {}", TITLE_HEADER, tagged(value));
        return Some(out.join("\n"));
    }

    // No title header: promote the first line.
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut promoted = false;
    for line in lines {
        if !promoted && !line.trim().is_empty() {
            out.push(format!("{} {}", TITLE_HEADER, tagged(line.trim())));
            promoted = true;
        } else {
            out.push(line.to_string());
        }
    }
    Some(out.join("\n"))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Section {
    Title,
    Description,
    Acceptance,
}

/// Single forward pass over the three-section layout.
pub fn parse_task(text: &str) -> GeneratedTask {
    let mut title = String::new();
    let mut description = String::new();
    let mut acceptance: Vec<&str> = Vec::new();
    let mut section: Option<Section> = None;
    let mut seen_title = false;

    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        // Only the first title header counts; later ones are plain content.
        let title_header = if seen_title { None } else { line.strip_prefix(TITLE_HEADER) };
        if let Some(rest) = title_header {
            section = Some(Section::Title);
            title = rest.trim().to_string();
            seen_title = true;
        } else if let Some(rest) = line.strip_prefix(DESCRIPTION_HEADER) {
            section = Some(Section::Description);
            description = rest.trim().to_string();
        } else if line.starts_with(ACCEPTANCE_HEADER) {
            section = Some(Section::Acceptance);
            acceptance.clear();
        } else {
            match section {
                Some(Section::Description) => {
                    description.push('\n');
                    description.push_str(line);
                }
                Some(Section::Acceptance) if line.starts_with('-') => acceptance.push(line),
                _ => debug!(line, "dropping line outside a known section"),
            }
        }
    }

    GeneratedTask {
        title: title.trim().to_string(),
        description: description.trim().to_string(),
        acceptance_criteria: acceptance.join("\n").trim().to_string(),
    }
}
