pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that converts text into well-formatted Jira tasks. \
Always provide clear, actionable titles and detailed descriptions with acceptance criteria.";

pub fn build_prompt(task_text: &str) -> String {
    format!(
        "Convert the following text into a Jira task format.\n\
Create a clear, concise title (starting with task type like 'Feature:', 'Bug:', etc.) and detailed description with acceptance criteria.\n\
\n\
Text: \"{task_text}\"\n\
\n\
Please format the response exactly as follows:\n\
Title: [Task type: A clear, concise title]\n\
Description: [Detailed description]\n\
Acceptance Criteria:\n\
- [First acceptance criterion]\n\
- [Second acceptance criterion]\n\
- [Third acceptance criterion]\n\
\n\
Make it professional and suitable for a development team. \
Example title format: 'Feature: Implement User Authentication' or 'Bug: Fix Login Validation'"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_text_and_layout() {
        let prompt = build_prompt("add dark mode");
        assert!(prompt.contains("Text: \"add dark mode\""));
        assert!(prompt.contains("\nTitle: [Task type"));
        assert!(prompt.contains("\nAcceptance Criteria:\n- [First"));
    }
}
