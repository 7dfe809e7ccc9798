/// A builder for rendering `{{KEY}}` templates.
pub struct PromptRenderer<'a> {
    template: &'a str,
    replacements: Vec<(&'a str, String)>,
}

impl<'a> PromptRenderer<'a> {
    pub fn new(template: &'a str) -> Self {
        Self {
            template,
            replacements: Vec::new(),
        }
    }

    pub fn set(mut self, key: &'a str, value: impl Into<String>) -> Self {
        self.replacements.push((key, value.into()));
        self
    }

    pub fn render(self) -> String {
        let mut result = self.template.to_string();
        for (key, value) in self.replacements {
            result = result.replace(key, &value);
        }

        if let Some(start) = result.find("{{") {
            if let Some(end) = result[start..].find("}}") {
                let placeholder = &result[start..start + end + 2];
                tracing::error!("Unreplaced placeholder in rendered prompt: {}", placeholder);
            }
        }

        result
    }
}

/// Returned by `manus_identity`; the client is expected to call it at the
/// start of each conversation.
pub const MANUS_IDENTITY: &str = r#"
You are Manus, an expert Planning Agent tasked with solving complex problems by creating and managing structured plans.
Your job is:
1. Analyze requests to understand the task scope
2. Create clear, actionable plans
3. Execute steps using available tools as needed
4. Track progress and adapt plans dynamically
5. Conclude clearly when the task is complete

Available tools include real-time search, browsing, file management and code execution in a sandbox.

Use the `code_interpreter` tool to save your work, like a scratchpad in Markdown.

Use the provided code_interpreter and bash_tool, and NOT the artifacts tool.

Do not use your own knowledge; it is more appropriate to use a tool before answering a question.

For example, if asked to plan a trip, first use the `web_search` tool to find information about the destination.

Break tasks into logical, sequential steps. Think about dependencies and verification methods.

Please make a plan before you start. Prefer to use tools rather than presenting the output in chat.

DO NOT use the artifacts tool.
"#;

pub const SERVER_INSTRUCTIONS: &str = "\
Manus MCP gives you a sandboxed workspace at {{SANDBOX_DIR}}. \
Use list/read/write to manage files, execute or code_interpreter to run \
{{LANGUAGES}} code, and run_command (or bash_tool) for shell commands. \
Foreground commands run without a shell; pass background=true for servers \
and pipelines, whose output is logged to a bg_process_*.log file in the sandbox. \
Every call is limited to {{GLOBAL_TIMEOUT}} seconds. \
web_search and browse_web reach the internet outside the sandbox.";

pub fn server_instructions(sandbox_dir: &str, languages: &str, global_timeout: u64) -> String {
    PromptRenderer::new(SERVER_INSTRUCTIONS)
        .set("{{SANDBOX_DIR}}", sandbox_dir)
        .set("{{LANGUAGES}}", languages)
        .set("{{GLOBAL_TIMEOUT}}", global_timeout.to_string())
        .render()
}
