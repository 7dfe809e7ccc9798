//! # MCP Server
//!
//! Exposes the [`Toolbox`] as MCP tools over stdio. Every tool answers with a
//! single text block; failures are text too, so a tool call never errors at
//! the protocol level.

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use std::sync::Arc;

use crate::application::Toolbox;
use crate::domain::interpreters;
use crate::domain::types::{BrowseRequest, ExecutionRequest};
use crate::interface::params::{
    BrowseParams, CodeInterpreterParams, CommandArgs, CommandParams, ExecuteParams, HelloParams,
    ReadParams, WebSearchParams, WriteParams,
};
use crate::strings::{messages, prompts};

#[derive(Clone)]
pub struct ManusServer {
    toolbox: Arc<Toolbox>,
    instructions: String,
    tool_router: ToolRouter<Self>,
}

fn text(body: String) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(body)]))
}

#[tool_router]
impl ManusServer {
    pub fn new(toolbox: Arc<Toolbox>) -> Self {
        let instructions = prompts::server_instructions(
            &toolbox.sandbox().root().display().to_string(),
            &interpreters::supported_languages(),
            toolbox.global_limit().as_secs(),
        );
        Self {
            toolbox,
            instructions,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "List the files in the sandbox directory. Returns JSON {\"files\": [...]}.")]
    async fn list(&self) -> Result<CallToolResult, McpError> {
        text(self.toolbox.list().await)
    }

    #[tool(description = "Read a text file from the sandbox directory.")]
    async fn read(&self, Parameters(p): Parameters<ReadParams>) -> Result<CallToolResult, McpError> {
        text(self.toolbox.read(p.filename.as_deref()).await)
    }

    #[tool(description = "Write a text file in the sandbox directory, creating parent directories.")]
    async fn write(&self, Parameters(p): Parameters<WriteParams>) -> Result<CallToolResult, McpError> {
        text(self.toolbox.write(p.filename.as_deref(), p.content.as_deref()).await)
    }

    #[tool(
        description = "Run a sandbox file or inline code with an interpreter. Returns JSON {exit_code, stdout, stderr}."
    )]
    async fn execute(&self, Parameters(p): Parameters<ExecuteParams>) -> Result<CallToolResult, McpError> {
        text(match ExecutionRequest::try_from(p) {
            Ok(request) => self.toolbox.execute(&request).await,
            Err(message) => self.toolbox.reject("execute", message).await,
        })
    }

    #[tool(
        description = "Run a command in the sandbox directory. Foreground commands run without a shell \
                       and return JSON {exit_code, stdout, stderr}. Set background=true for servers, \
                       pipes or redirection; output is logged to a bg_process_*.log file and the PID is returned."
    )]
    async fn run_command(&self, Parameters(p): Parameters<CommandParams>) -> Result<CallToolResult, McpError> {
        text(self.command("run_command", p).await)
    }

    #[tool(
        description = "Read, write, list and execute files in the sandbox. action is one of list, read, write, execute."
    )]
    async fn code_interpreter(
        &self,
        Parameters(p): Parameters<CodeInterpreterParams>,
    ) -> Result<CallToolResult, McpError> {
        text(match p.into_parts() {
            Ok((action, request)) => self.toolbox.code_interpreter(&action, &request).await,
            Err(message) => self.toolbox.reject("code_interpreter", message).await,
        })
    }

    #[tool(
        description = "Execute a command in the sandbox directory. Same as run_command. \
                       Use background=true for long-running processes such as web servers, \
                       then read the log file with code_interpreter and stop it with 'kill <pid>'."
    )]
    async fn bash_tool(&self, Parameters(p): Parameters<CommandParams>) -> Result<CallToolResult, McpError> {
        text(self.command("bash_tool", p).await)
    }

    #[tool(description = "Returns a friendly greeting message.")]
    async fn hello_world(&self, Parameters(p): Parameters<HelloParams>) -> Result<CallToolResult, McpError> {
        let name = p.name.unwrap_or_else(|| "World".to_string());
        tracing::info!("Saying hello to {}", name);
        text(messages::hello(&name))
    }

    #[tool(
        description = "Identity and working instructions for Manus. Call this at the start of each new message."
    )]
    async fn manus_identity(&self) -> Result<CallToolResult, McpError> {
        tracing::info!("Invoking manus_identity tool");
        text(prompts::MANUS_IDENTITY.to_string())
    }

    #[tool(
        description = "Search the web and return a JSON list of result URLs. Open them with browse_web."
    )]
    async fn web_search(&self, Parameters(p): Parameters<WebSearchParams>) -> Result<CallToolResult, McpError> {
        text(match p.num_results() {
            Ok(num_results) => {
                let query = p.query.as_deref().unwrap_or_default();
                self.toolbox.web_search(query, num_results).await
            }
            Err(message) => self.toolbox.reject("web_search", message).await,
        })
    }

    #[tool(
        description = "Browse the web. Actions: navigate (url), get_content, fetch (url), execute_js (script), scroll (scroll_amount)."
    )]
    async fn browse_web(&self, Parameters(p): Parameters<BrowseParams>) -> Result<CallToolResult, McpError> {
        text(match BrowseRequest::try_from(p) {
            Ok(request) => self.toolbox.browse(&request).await,
            Err(message) => self.toolbox.reject("browse_web", message).await,
        })
    }
}

impl ManusServer {
    async fn command(&self, tool: &str, params: CommandParams) -> String {
        match CommandArgs::try_from(params) {
            Ok(args) => {
                self.toolbox
                    .run_command(&args.command, args.timeout, args.background)
                    .await
            }
            Err(message) => self.toolbox.reject(tool, message).await,
        }
    }
}

#[tool_handler]
impl ServerHandler for ManusServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(self.instructions.clone()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            ..Default::default()
        }
    }
}
