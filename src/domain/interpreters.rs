//! Static language table: which interpreter runs a language and which file
//! suffix its source files get. Read-only for the life of the process.

#[derive(Debug, PartialEq, Eq)]
pub struct InterpreterSpec {
    /// Accepted language tags, lowercase.
    pub tags: &'static [&'static str],
    pub suffix: &'static str,
    pub program: &'static str,
}

pub const DEFAULT_SUFFIX: &str = ".txt";

pub static INTERPRETERS: &[InterpreterSpec] = &[
    InterpreterSpec {
        tags: &["python", "py"],
        suffix: ".py",
        program: "python3",
    },
    InterpreterSpec {
        tags: &["javascript", "js", "node"],
        suffix: ".js",
        program: "node",
    },
    InterpreterSpec {
        tags: &["bash", "sh"],
        suffix: ".sh",
        program: "bash",
    },
    InterpreterSpec {
        tags: &["ruby"],
        suffix: ".rb",
        program: "ruby",
    },
    InterpreterSpec {
        tags: &["perl"],
        suffix: ".pl",
        program: "perl",
    },
    InterpreterSpec {
        tags: &["r"],
        suffix: ".r",
        program: "Rscript",
    },
];

/// Looks up a language tag, case-insensitively.
pub fn lookup(language: &str) -> Option<&'static InterpreterSpec> {
    let tag = language.trim().to_ascii_lowercase();
    INTERPRETERS.iter().find(|spec| spec.tags.contains(&tag.as_str()))
}

/// File suffix for inline content, `.txt` for unknown languages.
pub fn suffix_for(language: &str) -> &'static str {
    lookup(language).map_or(DEFAULT_SUFFIX, |spec| spec.suffix)
}

/// Comma-separated list of the primary tags, for error messages.
pub fn supported_languages() -> String {
    INTERPRETERS
        .iter()
        .map(|spec| spec.tags[0])
        .collect::<Vec<_>>()
        .join(", ")
}
