//! Argument schemas for the MCP tools.
//!
//! Deserialization never rejects a call: missing arguments become `None` and
//! mistyped ones are kept as raw JSON, so the toolbox can answer with its usual
//! `Error: ...` text instead of the transport returning an invalid-params fault.

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::domain::types::{BrowseRequest, ExecutionRequest};
use crate::strings::messages;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ReadParams {
    #[schemars(description = "Path of the file, relative to the sandbox root")]
    #[serde(default, deserialize_with = "scalar_text")]
    pub filename: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct WriteParams {
    #[schemars(description = "Path of the file, relative to the sandbox root. Parent directories are created")]
    #[serde(default, deserialize_with = "scalar_text")]
    pub filename: Option<String>,
    #[schemars(description = "Text to write; replaces any existing content")]
    #[serde(default, deserialize_with = "scalar_text")]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExecuteParams {
    #[schemars(description = "Existing sandbox file to run. Give either this or content")]
    #[serde(default, deserialize_with = "scalar_text")]
    pub filename: Option<String>,
    #[schemars(description = "Source code to run from a temporary file. Give either this or filename")]
    #[serde(default, deserialize_with = "scalar_text")]
    pub content: Option<String>,
    #[schemars(description = "python, javascript, bash, ruby, perl or r")]
    #[serde(default, deserialize_with = "scalar_text")]
    pub language: Option<String>,
    #[schemars(description = "Maximum execution time in seconds (default 10)", with = "Option<u64>")]
    #[serde(default)]
    pub timeout: Option<Value>,
}

impl TryFrom<ExecuteParams> for ExecutionRequest {
    type Error = String;

    fn try_from(p: ExecuteParams) -> Result<Self, String> {
        Ok(Self {
            timeout: seconds(p.timeout.as_ref())?,
            filename: p.filename,
            content: p.content,
            language: p.language,
        })
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CodeInterpreterParams {
    #[schemars(description = "One of: list, read, write, execute")]
    #[serde(default, deserialize_with = "scalar_text")]
    pub action: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub filename: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub content: Option<String>,
    #[schemars(description = "Language for 'execute' (python, javascript, bash, ruby, perl, r)")]
    #[serde(default, deserialize_with = "scalar_text")]
    pub language: Option<String>,
    #[schemars(description = "Maximum execution time in seconds (default 10)", with = "Option<u64>")]
    #[serde(default)]
    pub timeout: Option<Value>,
}

impl CodeInterpreterParams {
    pub fn into_parts(self) -> Result<(String, ExecutionRequest), String> {
        Ok((
            self.action.unwrap_or_default(),
            ExecutionRequest {
                timeout: seconds(self.timeout.as_ref())?,
                filename: self.filename,
                content: self.content,
                language: self.language,
            },
        ))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CommandParams {
    #[schemars(description = "Command line to run in the sandbox directory")]
    #[serde(default, deserialize_with = "scalar_text")]
    pub command: Option<String>,
    #[schemars(
        description = "Maximum execution time in seconds (default 30, foreground only)",
        with = "Option<u64>"
    )]
    #[serde(default)]
    pub timeout: Option<Value>,
    #[schemars(
        description = "Run detached through bash, logging output to a file in the sandbox",
        with = "Option<bool>"
    )]
    #[serde(default)]
    pub background: Option<Value>,
}

/// Checked arguments of `run_command` / `bash_tool`.
#[derive(Debug, PartialEq)]
pub struct CommandArgs {
    pub command: String,
    pub timeout: Option<u64>,
    pub background: bool,
}

impl TryFrom<CommandParams> for CommandArgs {
    type Error = String;

    fn try_from(p: CommandParams) -> Result<Self, String> {
        Ok(Self {
            command: p.command.unwrap_or_default(),
            timeout: seconds(p.timeout.as_ref())?,
            background: flag(p.background.as_ref())?,
        })
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct HelloParams {
    #[schemars(description = "The name to greet (default 'World')")]
    #[serde(default, deserialize_with = "scalar_text")]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct WebSearchParams {
    #[schemars(description = "The search query")]
    #[serde(default, deserialize_with = "scalar_text")]
    pub query: Option<String>,
    #[schemars(description = "Number of result links to return", with = "Option<u64>")]
    #[serde(default)]
    pub num_results: Option<Value>,
}

impl WebSearchParams {
    pub fn num_results(&self) -> Result<Option<usize>, String> {
        match self.num_results.as_ref() {
            None => Ok(None),
            Some(value) => whole_number(value)
                .and_then(|n| usize::try_from(n).ok())
                .map(Some)
                .ok_or_else(|| messages::NUM_RESULTS_INVALID.to_string()),
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct BrowseParams {
    #[schemars(description = "One of: navigate, get_content, fetch, execute_js, scroll")]
    #[serde(default, deserialize_with = "scalar_text")]
    pub action: Option<String>,
    #[schemars(description = "URL for 'navigate' or 'fetch'")]
    #[serde(default, deserialize_with = "scalar_text")]
    pub url: Option<String>,
    #[schemars(description = "JavaScript for 'execute_js'")]
    #[serde(default, deserialize_with = "scalar_text")]
    pub script: Option<String>,
    #[schemars(description = "Pixels to scroll; positive is down, negative is up", with = "Option<i64>")]
    #[serde(default)]
    pub scroll_amount: Option<Value>,
}

impl TryFrom<BrowseParams> for BrowseRequest {
    type Error = String;

    fn try_from(p: BrowseParams) -> Result<Self, String> {
        let scroll_amount = match p.scroll_amount.as_ref() {
            None => None,
            Some(value) => Some(
                whole_number(value).ok_or_else(|| messages::SCROLL_AMOUNT_INVALID.to_string())?,
            ),
        };
        Ok(Self {
            action: p.action.unwrap_or_default(),
            url: p.url,
            script: p.script,
            scroll_amount,
        })
    }
}

/// Accepts any JSON scalar as text; `null`, arrays and objects count as absent.
fn scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// An integer sent as a JSON number (`5`, `5.0`) or a numeric string (`"5"`).
fn whole_number(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn seconds(value: Option<&Value>) -> Result<Option<u64>, String> {
    let Some(value) = value else {
        return Ok(None);
    };
    match whole_number(value) {
        Some(secs) => u64::try_from(secs)
            .map(Some)
            .map_err(|_| messages::TIMEOUT_TOO_SMALL.to_string()),
        None => Err(messages::TIMEOUT_NOT_A_NUMBER.to_string()),
    }
}

fn flag(value: Option<&Value>) -> Result<bool, String> {
    match value {
        None => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(Value::Number(n)) if n.as_u64() == Some(0) => Ok(false),
        Some(Value::Number(n)) if n.as_u64() == Some(1) => Ok(true),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" | "" => Ok(false),
            _ => Err(messages::BACKGROUND_INVALID.to_string()),
        },
        Some(_) => Err(messages::BACKGROUND_INVALID.to_string()),
    }
}
