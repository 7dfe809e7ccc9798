//! # Interpreter Dispatcher
//!
//! Runs a sandboxed file, or inline content materialized into a temp file,
//! through the interpreter registered for a language.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;

use crate::domain::error::ToolError;
use crate::domain::interpreters::{self, InterpreterSpec};
use crate::domain::paths;
use crate::domain::types::ExecOutput;
use crate::infrastructure::sandbox::Sandbox;
use crate::infrastructure::tools::process::{Captured, run_captured};
use crate::strings::messages;

/// What to run: an existing sandbox file or inline source.
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    File(&'a str),
    Inline(&'a str),
}

impl<'a> Source<'a> {
    /// Exactly one of `filename` / `content` must be present and non-empty.
    pub fn from_parts(filename: Option<&'a str>, content: Option<&'a str>) -> Result<Self, ToolError> {
        let filename = filename.filter(|f| !f.trim().is_empty());
        let content = content.filter(|c| !c.is_empty());
        match (filename, content) {
            (Some(f), None) => Ok(Self::File(f)),
            (None, Some(c)) => Ok(Self::Inline(c)),
            (Some(_), Some(_)) => Err(ToolError::validation(
                "Provide either filename or content for 'execute', not both",
            )),
            (None, None) => Err(ToolError::validation(messages::EXECUTE_ARGS_REQUIRED)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InterpreterDispatcher {
    sandbox: Arc<Sandbox>,
}

impl InterpreterDispatcher {
    pub fn new(sandbox: Arc<Sandbox>) -> Self {
        Self { sandbox }
    }

    /// Executes `source` with the interpreter for `language`.
    ///
    /// A missing file is reported before the language is checked. For inline
    /// content an unsupported language is rejected before anything is written.
    /// The temp file is removed on every exit path, including when this future
    /// is dropped by an outer deadline.
    pub async fn execute(
        &self,
        source: Source<'_>,
        language: &str,
        timeout: Duration,
    ) -> Result<ExecOutput, ToolError> {
        match source {
            Source::File(filename) => {
                let path = self.sandbox.resolve_path(filename)?;
                if !tokio::fs::try_exists(&path).await? {
                    return Err(ToolError::NotFound(filename.to_string()));
                }
                self.spawn(interpreter_for(language)?, path, timeout).await
            }
            Source::Inline(content) => {
                let spec = interpreter_for(language)?;
                // Deleted when dropped.
                let temp = tempfile::Builder::new()
                    .prefix(paths::EXEC_TEMP_PREFIX)
                    .suffix(interpreters::suffix_for(language))
                    .tempfile_in(self.sandbox.root())?;
                tokio::fs::write(temp.path(), content).await?;
                self.spawn(spec, temp.path().to_path_buf(), timeout).await
            }
        }
    }

    async fn spawn(
        &self,
        spec: &InterpreterSpec,
        script: PathBuf,
        timeout: Duration,
    ) -> Result<ExecOutput, ToolError> {
        tracing::info!("Executing command: {} {}", spec.program, script.display());

        let mut command = Command::new(spec.program);
        command.arg(&script).current_dir(self.sandbox.root());

        match run_captured(command, timeout).await? {
            Captured::Exited(output) => Ok(output),
            Captured::TimedOut => Err(ToolError::ExecutionTimeout {
                subject: "Execution",
                secs: timeout.as_secs(),
            }),
        }
    }
}

fn interpreter_for(language: &str) -> Result<&'static InterpreterSpec, ToolError> {
    interpreters::lookup(language).ok_or_else(|| {
        ToolError::validation(format!(
            "Unsupported language '{}'. Supported: {}",
            language,
            interpreters::supported_languages()
        ))
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn dispatcher() -> (TempDir, InterpreterDispatcher) {
        let dir = TempDir::new().unwrap();
        let sandbox = Arc::new(Sandbox::new(dir.path()));
        (dir, InterpreterDispatcher::new(sandbox))
    }

    fn leftover_temp_files(dir: &TempDir) -> Vec<String> {
        std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .filter(|name| name.starts_with(paths::EXEC_TEMP_PREFIX))
            .collect()
    }

    #[tokio::test]
    async fn test_python_inline() {
        let (dir, dispatcher) = dispatcher();
        let output = dispatcher
            .execute(Source::Inline("print(6*7)"), "python", Duration::from_secs(10))
            .await
            .unwrap();

        assert_eq!(output.exit_code, 0);
        assert!(output.stdout.contains("42"));
        assert!(leftover_temp_files(&dir).is_empty());
    }

    #[tokio::test]
    async fn test_language_tag_is_case_insensitive() {
        let (_dir, dispatcher) = dispatcher();
        let output = dispatcher
            .execute(Source::Inline("echo hi"), "BASH", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(output.stdout, "hi\n");
    }

    #[tokio::test]
    async fn test_runs_existing_file_in_sandbox_root() {
        let (dir, dispatcher) = dispatcher();
        std::fs::write(dir.path().join("where.sh"), "pwd; echo oops 1>&2; exit 4").unwrap();

        let output = dispatcher
            .execute(Source::File("where.sh"), "sh", Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(output.exit_code, 4);
        assert_eq!(
            std::fs::canonicalize(output.stdout.trim()).unwrap(),
            std::fs::canonicalize(dir.path()).unwrap()
        );
        assert_eq!(output.stderr, "oops\n");
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let (_dir, dispatcher) = dispatcher();
        let err = dispatcher
            .execute(Source::File("absent.py"), "python", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_missing_file_reported_before_language() {
        let (_dir, dispatcher) = dispatcher();
        let err = dispatcher
            .execute(Source::File("nope.xyz"), "cobol", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "File 'nope.xyz' does not exist");
    }

    #[tokio::test]
    async fn test_unsupported_language_creates_nothing() {
        let (dir, dispatcher) = dispatcher();
        let err = dispatcher
            .execute(Source::Inline("PROGRAM-ID. X."), "cobol", Duration::from_secs(5))
            .await
            .unwrap_err();

        assert!(matches!(err, ToolError::Validation(_)));
        assert!(err.to_string().starts_with("Unsupported language 'cobol'"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_timeout_kills_process_and_cleans_up() {
        let (dir, dispatcher) = dispatcher();
        let script = "echo $$ > pid.txt\nsleep 5\necho finished\n";

        let started = std::time::Instant::now();
        let err = dispatcher
            .execute(Source::Inline(script), "bash", Duration::from_secs(1))
            .await
            .unwrap_err();

        assert!(started.elapsed() < Duration::from_secs(4));
        assert_eq!(err.to_string(), "Execution timed out after 1 seconds");
        assert!(leftover_temp_files(&dir).is_empty());

        let pid: i32 = std::fs::read_to_string(dir.path().join("pid.txt"))
            .unwrap()
            .trim()
            .parse()
            .unwrap();
        assert_ne!(unsafe { libc::kill(pid, 0) }, 0, "interpreter {pid} still running");
    }

    #[tokio::test]
    async fn test_failing_content_still_cleans_up() {
        let (dir, dispatcher) = dispatcher();
        let output = dispatcher
            .execute(Source::Inline("raise SystemExit(3)"), "py", Duration::from_secs(10))
            .await
            .unwrap();
        assert_eq!(output.exit_code, 3);
        assert!(leftover_temp_files(&dir).is_empty());
    }

    #[tokio::test]
    async fn test_escape_rejected_before_spawn() {
        let (_dir, dispatcher) = dispatcher();
        let err = dispatcher
            .execute(Source::File("../../bin/sh"), "sh", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::PathEscape(_)));
    }

    #[test]
    fn test_source_requires_exactly_one() {
        assert!(matches!(Source::from_parts(Some("a.py"), None), Ok(Source::File("a.py"))));
        assert!(matches!(Source::from_parts(None, Some("x")), Ok(Source::Inline("x"))));
        assert!(Source::from_parts(Some("a.py"), Some("x")).is_err());
        assert!(Source::from_parts(None, None).is_err());
        assert!(Source::from_parts(Some("  "), Some("")).is_err());
    }
}
