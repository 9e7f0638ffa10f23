//! User-friendly diagnostic messages.
//!
//! Every fatal pipeline error is presented with its root cause, the captured
//! process output, and a suggested next step.

use std::fmt;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion when the docker command cannot be found.
    pub const DOCKER_NOT_FOUND: &str =
        "help: Install Docker or point --docker at a compatible engine";

    /// Suggestion when an image build or container run fails.
    pub const KEEP_BUILD_PRODUCTS: &str =
        "help: Re-run with --keep-build-products to inspect the build context and container";

    /// Suggestion when the configured platform is unknown.
    pub const UNKNOWN_PLATFORM: &str = "help: Run `drydock platforms` to see configured platforms";

    /// Suggestion when no manifest file is found.
    pub const NO_MANIFEST: &str = "help: Create a Drydock.toml declaring your [[targets]]";
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A diagnostic message with optional context and suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Error,
            context: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Warning,
            context: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// Add context to the diagnostic.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self) -> String {
        let mut output = format!("{}: {}", self.severity, self.message);

        for line in &self.context {
            output.push('\n');
            output.push_str("  ");
            output.push_str(line);
        }

        for suggestion in &self.suggestions {
            output.push('\n');
            output.push_str(suggestion);
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_with_context_and_suggestion() {
        let diag = Diagnostic::error("failed to build image `rpm-image-abc:latest`")
            .with_context("docker build exited with code 1")
            .with_suggestion(suggestions::KEEP_BUILD_PRODUCTS);

        let text = diag.format();
        assert!(text.starts_with("error: failed to build image"));
        assert!(text.contains("exited with code 1"));
        assert!(text.contains("--keep-build-products"));
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(Severity::Warning.to_string(), "warning");
    }
}
