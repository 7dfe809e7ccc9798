//! # Toolbox
//!
//! The boundary between the tool-call surface and the sandbox. Each call runs
//! under the global timeout guard, logs its start and terminal state, and
//! turns every failure into an `Error: <message>` string. Nothing propagates
//! to the transport as a fault.

use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::application::timeout::GlobalTimeoutGuard;
use crate::domain::config::ServerConfig;
use crate::domain::error::ToolError;
use crate::domain::types::{
    Action, BackgroundProcess, BrowseRequest, CommandOutput, ExecutionRequest, InvocationOutcome,
};
use crate::infrastructure::sandbox::Sandbox;
use crate::infrastructure::tools::{
    CommandMode, CommandRunner, FileStore, InterpreterDispatcher, Source,
};
use crate::infrastructure::web::{
    self, BrowserSession, DuckDuckGoSearch, HttpBrowser, SearchProvider, html,
};
use crate::strings::{logs, messages};

/// Fallbacks for arguments a caller leaves out.
#[derive(Debug, Clone, Copy)]
pub struct ToolDefaults {
    pub command_timeout: u64,
    pub execute_timeout: u64,
    pub search_max_results: usize,
}

impl From<&ServerConfig> for ToolDefaults {
    fn from(config: &ServerConfig) -> Self {
        Self {
            command_timeout: config.command_timeout,
            execute_timeout: config.execute_timeout,
            search_max_results: config.search_max_results,
        }
    }
}

#[derive(Serialize)]
struct FileList<'a> {
    files: &'a [String],
}

#[derive(Serialize)]
struct BackgroundReport {
    status: &'static str,
    pid: u32,
    log_file: String,
    script_file: String,
    message: String,
}

impl From<BackgroundProcess> for BackgroundReport {
    fn from(process: BackgroundProcess) -> Self {
        let log_file = process.log_file.display().to_string();
        Self {
            status: messages::BACKGROUND_STATUS,
            pid: process.pid,
            message: messages::background_started(process.pid, &log_file),
            log_file,
            script_file: process.script_file.display().to_string(),
        }
    }
}

#[derive(Serialize)]
struct PageContent {
    title: String,
    text: String,
    links_count: usize,
    images_count: usize,
}

pub struct Toolbox {
    sandbox: Arc<Sandbox>,
    files: FileStore,
    interpreter: InterpreterDispatcher,
    commands: CommandRunner,
    guard: GlobalTimeoutGuard,
    defaults: ToolDefaults,
    search: Arc<dyn SearchProvider>,
    browser: Mutex<Box<dyn BrowserSession>>,
}

impl Toolbox {
    pub fn new(sandbox: Arc<Sandbox>, config: &ServerConfig) -> Self {
        Self {
            files: FileStore::new(sandbox.clone()),
            interpreter: InterpreterDispatcher::new(sandbox.clone()),
            commands: CommandRunner::new(sandbox.clone()),
            sandbox,
            guard: GlobalTimeoutGuard::new(config.global_timeout()),
            defaults: ToolDefaults::from(config),
            search: Arc::new(DuckDuckGoSearch),
            browser: Mutex::new(Box::new(HttpBrowser::new())),
        }
    }

    #[cfg(test)]
    pub fn with_search(mut self, provider: Arc<dyn SearchProvider>) -> Self {
        self.search = provider;
        self
    }

    #[cfg(test)]
    pub fn with_browser(mut self, browser: Box<dyn BrowserSession>) -> Self {
        self.browser = Mutex::new(browser);
        self
    }

    pub fn sandbox(&self) -> &Sandbox {
        &self.sandbox
    }

    pub fn global_limit(&self) -> Duration {
        self.guard.limit()
    }

    /// Runs one tool invocation under the global guard and renders the result.
    async fn invoke<F>(&self, tool: &str, detail: &str, operation: F) -> String
    where
        F: Future<Output = Result<String, ToolError>>,
    {
        tracing::info!("{}", logs::tool_start(tool, detail));
        let result = self.guard.guard(operation).await;
        let outcome = InvocationOutcome::of(&result);

        match result {
            Ok(output) => {
                tracing::info!("{}", logs::tool_finished(tool, outcome));
                output
            }
            Err(err) => {
                let line = logs::tool_failed(tool, outcome, &err.to_string());
                match outcome {
                    InvocationOutcome::Failed | InvocationOutcome::OuterTimedOut => {
                        tracing::error!("{}", line)
                    }
                    _ => tracing::warn!("{}", line),
                }
                messages::error(err)
            }
        }
    }

    /// Reports arguments that could not be decoded for `tool`.
    pub async fn reject(&self, tool: &str, message: String) -> String {
        self.invoke(tool, "", rejection(message)).await
    }

    pub async fn list(&self) -> String {
        self.invoke("list", "", self.list_files()).await
    }

    pub async fn read(&self, filename: Option<&str>) -> String {
        self.invoke("read", filename.unwrap_or_default(), self.read_file(filename))
            .await
    }

    pub async fn write(&self, filename: Option<&str>, content: Option<&str>) -> String {
        self.invoke(
            "write",
            filename.unwrap_or_default(),
            self.write_file(filename, content),
        )
        .await
    }

    pub async fn execute(&self, request: &ExecutionRequest) -> String {
        let detail = request
            .filename
            .as_deref()
            .or(request.content.as_deref())
            .unwrap_or_default();
        self.invoke("execute", detail, self.execute_source(request))
            .await
    }

    pub async fn run_command(&self, command: &str, timeout: Option<u64>, background: bool) -> String {
        self.invoke(
            "run_command",
            command,
            self.run_shell_command(command, timeout, background),
        )
        .await
    }

    /// Single entry point taking an action name plus an [`ExecutionRequest`].
    pub async fn code_interpreter(&self, action: &str, request: &ExecutionRequest) -> String {
        match Action::parse(action) {
            Some(Action::List) => self.list().await,
            Some(Action::Read) => self.read(request.filename.as_deref()).await,
            Some(Action::Write) => {
                self.write(request.filename.as_deref(), request.content.as_deref())
                    .await
            }
            Some(Action::Execute) => self.execute(request).await,
            None => {
                self.invoke("code_interpreter", action, rejection(messages::unknown_action(action)))
                    .await
            }
        }
    }

    pub async fn web_search(&self, query: &str, num_results: Option<usize>) -> String {
        self.invoke("web_search", query, self.search_links(query, num_results))
            .await
    }

    pub async fn browse(&self, request: &BrowseRequest) -> String {
        let detail = request.url.as_deref().unwrap_or(&request.action);
        self.invoke("browse_web", detail, self.browse_action(request))
            .await
    }

    async fn list_files(&self) -> Result<String, ToolError> {
        let files = self.files.list().await?;
        Ok(serde_json::to_string(&FileList { files: &files })?)
    }

    async fn read_file(&self, filename: Option<&str>) -> Result<String, ToolError> {
        let filename = required(filename)
            .ok_or_else(|| ToolError::validation(messages::FILENAME_REQUIRED_READ))?;
        self.files.read(filename).await
    }

    async fn write_file(&self, filename: Option<&str>, content: Option<&str>) -> Result<String, ToolError> {
        let (Some(filename), Some(content)) = (required(filename), content) else {
            return Err(ToolError::validation(messages::FILENAME_CONTENT_REQUIRED_WRITE));
        };
        let bytes = self.files.write(filename, content).await?;
        Ok(messages::write_success(bytes, filename))
    }

    async fn execute_source(&self, request: &ExecutionRequest) -> Result<String, ToolError> {
        let source = Source::from_parts(request.filename.as_deref(), request.content.as_deref())?;
        let language = required(request.language.as_deref())
            .ok_or_else(|| ToolError::validation(messages::EXECUTE_ARGS_REQUIRED))?;
        let timeout = timeout_or(request.timeout, self.defaults.execute_timeout)?;

        let output = self.interpreter.execute(source, language, timeout).await?;
        Ok(serde_json::to_string_pretty(&output)?)
    }

    async fn run_shell_command(
        &self,
        command: &str,
        timeout: Option<u64>,
        background: bool,
    ) -> Result<String, ToolError> {
        let mode = if background {
            CommandMode::Background
        } else {
            CommandMode::Foreground {
                timeout: timeout_or(timeout, self.defaults.command_timeout)?,
            }
        };

        match self.commands.run(command, mode).await? {
            CommandOutput::Foreground(output) => Ok(serde_json::to_string_pretty(&output)?),
            CommandOutput::Background(process) => {
                Ok(serde_json::to_string(&BackgroundReport::from(process))?)
            }
        }
    }

    /// Search failures are reported inside the result list, not as errors.
    async fn search_links(&self, query: &str, num_results: Option<usize>) -> Result<String, ToolError> {
        if query.trim().is_empty() {
            return Err(ToolError::validation(messages::QUERY_REQUIRED));
        }
        let max_results = num_results.unwrap_or(self.defaults.search_max_results);

        let links = match self.search.search(query, max_results).await {
            Ok(links) => links,
            Err(e) => {
                let err = format!("{e:#}");
                tracing::warn!("{}", logs::search_failed(query, &err));
                vec![messages::search_error(err)]
            }
        };
        Ok(serde_json::to_string(&links)?)
    }

    async fn browse_action(&self, request: &BrowseRequest) -> Result<String, ToolError> {
        let action = request.action.trim();
        match action {
            "navigate" => {
                let url = required_arg(request.url.as_deref(), "URL", action)?;
                let mut browser = self.browser.lock().await;
                Ok(match browser.navigate(url).await {
                    Ok(()) => messages::navigated(url),
                    Err(e) => browser_failure(action, messages::navigate_failed(url, format!("{e:#}"))),
                })
            }
            "get_content" => {
                let page = self.browser.lock().await.page_html().await;
                match page {
                    Ok(page) => {
                        let summary = html::summarize(&page);
                        Ok(serde_json::to_string_pretty(&PageContent {
                            title: summary.title,
                            text: summary.text,
                            links_count: summary.links_count,
                            images_count: summary.images_count,
                        })?)
                    }
                    Err(e) => Ok(browser_failure(action, messages::content_failed(format!("{e:#}")))),
                }
            }
            "fetch" => {
                let url = required_arg(request.url.as_deref(), "URL", action)?;
                match web::fetch_webpage(url).await {
                    Ok(page) => Ok(serde_json::to_string_pretty(&page)?),
                    Err(e) => Ok(browser_failure(action, messages::fetch_failed(format!("{e:#}")))),
                }
            }
            "execute_js" => {
                let script = required_arg(request.script.as_deref(), "Script", action)?;
                let mut browser = self.browser.lock().await;
                Ok(match browser.execute_js(script).await {
                    Ok(value) => messages::js_result(&value),
                    Err(e) => browser_failure(action, messages::browser_action_error(format!("{e:#}"))),
                })
            }
            "scroll" => {
                let pixels = request.scroll_amount.ok_or_else(|| {
                    ToolError::validation(messages::browser_argument_required("Scroll amount", action))
                })?;
                let mut browser = self.browser.lock().await;
                Ok(match browser.scroll(pixels).await {
                    Ok(()) => messages::scrolled(pixels),
                    Err(e) => browser_failure(action, messages::browser_action_error(format!("{e:#}"))),
                })
            }
            _ => Err(ToolError::validation(messages::unknown_browser_action(action))),
        }
    }
}

fn required(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn required_arg<'a>(value: Option<&'a str>, argument: &str, action: &str) -> Result<&'a str, ToolError> {
    required(value)
        .ok_or_else(|| ToolError::validation(messages::browser_argument_required(argument, action)))
}

/// Per-call timeout in seconds, falling back to `default` when absent.
fn timeout_or(requested: Option<u64>, default: u64) -> Result<Duration, ToolError> {
    match requested.unwrap_or(default) {
        0 => Err(ToolError::validation(messages::TIMEOUT_TOO_SMALL)),
        secs => Ok(Duration::from_secs(secs)),
    }
}

async fn rejection(message: String) -> Result<String, ToolError> {
    Err(ToolError::Validation(message))
}

fn browser_failure(action: &str, message: String) -> String {
    tracing::warn!("{}", logs::browser_action_failed(action, &message));
    message
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use serde_json::Value;
    use tempfile::TempDir;

    use crate::domain::paths;

    fn toolbox_with(global_timeout: u64) -> (TempDir, Toolbox) {
        let dir = TempDir::new().unwrap();
        let config = ServerConfig {
            global_timeout,
            ..ServerConfig::default()
        };
        let toolbox = Toolbox::new(Arc::new(Sandbox::new(dir.path())), &config);
        (dir, toolbox)
    }

    fn toolbox() -> (TempDir, Toolbox) {
        toolbox_with(60)
    }

    fn inline(content: &str, language: &str, timeout: Option<u64>) -> ExecutionRequest {
        ExecutionRequest {
            content: Some(content.to_string()),
            language: Some(language.to_string()),
            timeout,
            ..ExecutionRequest::default()
        }
    }

    fn temp_files(dir: &TempDir) -> usize {
        std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(paths::EXEC_TEMP_PREFIX))
            .count()
    }

    struct FixedSearch(Result<Vec<&'static str>, &'static str>);

    #[async_trait]
    impl SearchProvider for FixedSearch {
        async fn search(&self, _query: &str, max_results: usize) -> anyhow::Result<Vec<String>> {
            match &self.0 {
                Ok(links) => Ok(links.iter().take(max_results).map(|l| l.to_string()).collect()),
                Err(e) => Err(anyhow!(*e)),
            }
        }
    }

    #[derive(Default)]
    struct StaticBrowser {
        page: Option<String>,
    }

    #[async_trait]
    impl BrowserSession for StaticBrowser {
        async fn navigate(&mut self, url: &str) -> anyhow::Result<()> {
            if url.contains("unreachable") {
                return Err(anyhow!("connection refused"));
            }
            self.page = Some(format!(
                "<html><head><title>{url}</title></head><body><p>Body</p><a href=\"/x\">x</a></body></html>"
            ));
            Ok(())
        }

        async fn page_html(&mut self) -> anyhow::Result<String> {
            self.page.clone().ok_or_else(|| anyhow!("no page"))
        }

        async fn execute_js(&mut self, _script: &str) -> anyhow::Result<String> {
            Ok("2".into())
        }

        async fn scroll(&mut self, _pixels: i64) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_file_operations_string_contract() {
        let (_dir, toolbox) = toolbox();
        assert_eq!(
            toolbox.write(Some("top.txt"), Some("hello")).await,
            "Successfully wrote 5 bytes to top.txt"
        );
        assert_eq!(
            toolbox.write(Some("notes/deep.md"), Some("é")).await,
            "Successfully wrote 2 bytes to notes/deep.md"
        );
        assert_eq!(toolbox.read(Some("top.txt")).await, "hello");
        assert_eq!(toolbox.list().await, r#"{"files":["top.txt"]}"#);
    }

    #[tokio::test]
    async fn test_errors_are_prefixed() {
        let (dir, toolbox) = toolbox();
        std::fs::write(dir.path().join("blob.bin"), [0xff, 0xfe, 0x00]).unwrap();

        assert_eq!(
            toolbox.read(Some("../secret")).await,
            "Error: File path ../secret attempts to escape the sandbox"
        );
        assert_eq!(
            toolbox.read(Some("missing.txt")).await,
            "Error: File 'missing.txt' does not exist"
        );
        assert_eq!(
            toolbox.read(Some("blob.bin")).await,
            "Error: File 'blob.bin' appears to be a binary file and cannot be read as text"
        );
        assert_eq!(
            toolbox.read(None).await,
            "Error: Filename is required for 'read' action"
        );
        assert_eq!(
            toolbox.write(Some("a.txt"), None).await,
            "Error: Filename and content are required for 'write' action"
        );
    }

    #[tokio::test]
    async fn test_execute_returns_json() {
        let (dir, toolbox) = toolbox();
        let output = toolbox.execute(&inline("print(6*7)", "python", None)).await;
        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["exit_code"], 0);
        assert_eq!(value["stdout"], "42\n");
        assert_eq!(value["stderr"], "");
        assert_eq!(temp_files(&dir), 0);
    }

    #[tokio::test]
    async fn test_execute_validation() {
        let (dir, toolbox) = toolbox();
        assert!(
            toolbox
                .execute(&inline("x", "cobol", None))
                .await
                .starts_with("Error: Unsupported language 'cobol'")
        );
        let no_language = ExecutionRequest {
            content: Some("print(1)".into()),
            ..ExecutionRequest::default()
        };
        assert_eq!(
            toolbox.execute(&no_language).await,
            "Error: Either filename or content, and language are required for 'execute' action"
        );
        assert_eq!(
            toolbox.execute(&inline("print(1)", "python", Some(0))).await,
            "Error: Timeout must be at least 1 second"
        );
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_inner_timeout_message() {
        let (dir, toolbox) = toolbox();
        let output = toolbox.execute(&inline("sleep 5", "bash", Some(1))).await;
        assert_eq!(output, "Error: Execution timed out after 1 seconds");
        assert_eq!(temp_files(&dir), 0);
    }

    #[tokio::test]
    async fn test_global_timeout_dominates_and_cleans_up() {
        let (dir, toolbox) = toolbox_with(2);
        let started = std::time::Instant::now();
        let output = toolbox.execute(&inline("sleep 5", "bash", Some(10))).await;

        assert_eq!(output, "Error: Operation timed out after 2 seconds (global timeout)");
        assert!(started.elapsed() < Duration::from_secs(4));
        assert_eq!(temp_files(&dir), 0);
    }

    #[tokio::test]
    async fn test_global_timeout_applies_to_commands() {
        let (_dir, toolbox) = toolbox_with(1);
        let output = toolbox.run_command("sleep 5", Some(30), false).await;
        assert_eq!(output, "Error: Operation timed out after 1 seconds (global timeout)");
    }

    #[tokio::test]
    async fn test_denylisted_command() {
        let (_dir, toolbox) = toolbox();
        assert_eq!(
            toolbox.run_command("sudo ls", None, false).await,
            "Error: Command contains potentially unsafe operations"
        );
    }

    #[tokio::test]
    async fn test_foreground_command_json() {
        let (_dir, toolbox) = toolbox();
        let value: Value =
            serde_json::from_str(&toolbox.run_command("echo hi", None, false).await).unwrap();
        assert_eq!(value["exit_code"], 0);
        assert_eq!(value["stdout"], "hi\n");
    }

    #[tokio::test]
    async fn test_background_command_report() {
        let (_dir, toolbox) = toolbox();
        let output = toolbox.run_command("sleep 30", None, true).await;
        let value: Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["status"], "background_process_started");
        let pid = value["pid"].as_u64().unwrap();
        let log_file = value["log_file"].as_str().unwrap();
        assert!(log_file.contains("bg_process_"));
        assert!(value["script_file"].as_str().unwrap().contains("run_bg_"));
        assert_eq!(
            value["message"],
            format!("Process started in background with PID {pid}. Output is being logged to {log_file}")
        );

        unsafe {
            libc::killpg(pid as libc::pid_t, libc::SIGKILL);
        }
    }

    #[tokio::test]
    async fn test_code_interpreter_dispatch() {
        let (_dir, toolbox) = toolbox();
        let write = ExecutionRequest {
            filename: Some("hello.py".into()),
            content: Some("print('hi')".into()),
            ..ExecutionRequest::default()
        };
        assert_eq!(
            toolbox.code_interpreter("write", &write).await,
            "Successfully wrote 11 bytes to hello.py"
        );
        assert_eq!(
            toolbox.code_interpreter("list", &ExecutionRequest::default()).await,
            r#"{"files":["hello.py"]}"#
        );

        let run = ExecutionRequest {
            filename: Some("hello.py".into()),
            language: Some("python".into()),
            ..ExecutionRequest::default()
        };
        let value: Value = serde_json::from_str(&toolbox.code_interpreter("execute", &run).await).unwrap();
        assert_eq!(value["stdout"], "hi\n");

        assert_eq!(
            toolbox.code_interpreter("delete", &ExecutionRequest::default()).await,
            "Error: Unknown action 'delete'"
        );
    }

    #[tokio::test]
    async fn test_web_search_results_and_failures() {
        let (_dir, toolbox) = toolbox();
        let toolbox = toolbox.with_search(Arc::new(FixedSearch(Ok(vec![
            "https://a.test/",
            "https://b.test/",
            "https://c.test/",
        ]))));
        assert_eq!(
            toolbox.web_search("rust", Some(2)).await,
            r#"["https://a.test/","https://b.test/"]"#
        );
        assert_eq!(toolbox.web_search("  ", None).await, "Error: Query is required");

        let (_dir, failing) = toolbox_with(60);
        let failing = failing.with_search(Arc::new(FixedSearch(Err("offline"))));
        assert_eq!(
            failing.web_search("rust", None).await,
            r#"["Error performing search: offline"]"#
        );
    }

    #[tokio::test]
    async fn test_browse_validation() {
        let (_dir, toolbox) = toolbox();
        let toolbox = toolbox.with_browser(Box::new(StaticBrowser::default()));
        let request = |action: &str| BrowseRequest {
            action: action.to_string(),
            ..BrowseRequest::default()
        };

        assert_eq!(
            toolbox.browse(&request("navigate")).await,
            "Error: URL is required for 'navigate' action"
        );
        assert_eq!(
            toolbox.browse(&request("fetch")).await,
            "Error: URL is required for 'fetch' action"
        );
        assert_eq!(
            toolbox.browse(&request("execute_js")).await,
            "Error: Script is required for 'execute_js' action"
        );
        assert_eq!(
            toolbox.browse(&request("scroll")).await,
            "Error: Scroll amount is required for 'scroll' action"
        );
        assert_eq!(
            toolbox.browse(&request("click")).await,
            "Error: Unknown action 'click'. Available actions: navigate, get_content, fetch, execute_js, scroll"
        );
    }

    #[tokio::test]
    async fn test_browse_session_flow() {
        let (_dir, toolbox) = toolbox();
        let toolbox = toolbox.with_browser(Box::new(StaticBrowser::default()));

        let get_content = BrowseRequest {
            action: "get_content".into(),
            ..BrowseRequest::default()
        };
        assert!(
            toolbox
                .browse(&get_content)
                .await
                .starts_with("Failed to get page content:")
        );

        let navigate = |url: &str| BrowseRequest {
            action: "navigate".into(),
            url: Some(url.to_string()),
            ..BrowseRequest::default()
        };
        assert_eq!(
            toolbox.browse(&navigate("https://site.test")).await,
            "Successfully navigated to https://site.test"
        );
        assert_eq!(
            toolbox.browse(&navigate("https://unreachable.test")).await,
            "Failed to navigate to https://unreachable.test: connection refused"
        );

        let value: Value = serde_json::from_str(&toolbox.browse(&get_content).await).unwrap();
        assert_eq!(value["title"], "https://site.test");
        assert_eq!(value["text"], "Body x");
        assert_eq!(value["links_count"], 1);
        assert_eq!(value["images_count"], 0);

        let scroll = BrowseRequest {
            action: "scroll".into(),
            scroll_amount: Some(-300),
            ..BrowseRequest::default()
        };
        assert_eq!(toolbox.browse(&scroll).await, "Scrolled up by 300 pixels");
    }
}
