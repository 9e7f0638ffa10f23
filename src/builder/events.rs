//! Build event types for JSON output.
//!
//! These events form the stable machine-readable schema emitted under
//! `--message-format=json`, one JSON object per line. In human mode the
//! same call sites log through `tracing` and forward captured process
//! output to the terminal.

use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;

/// A build event emitted during the pipeline.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "reason")]
pub enum BuildEvent {
    /// A docker stage (build-image, run-container, extract-rpms, ...) started.
    #[serde(rename = "stage-started")]
    StageStarted {
        /// Target name
        target: String,
        /// Stage name
        stage: String,
        /// Full command line
        cmd: String,
    },

    /// A docker stage finished.
    #[serde(rename = "stage-finished")]
    StageFinished {
        target: String,
        stage: String,
        success: bool,
    },

    /// Captured output from a docker subprocess.
    #[serde(rename = "stage-output")]
    StageOutput {
        target: String,
        stage: String,
        stdout: String,
        stderr: String,
    },

    /// An RPM was recovered from the exported container filesystem.
    #[serde(rename = "artifact-extracted")]
    ArtifactExtracted {
        target: String,
        /// Path under the output directory
        path: PathBuf,
    },

    /// A target's pipeline completed (success or failure).
    #[serde(rename = "target-finished")]
    TargetFinished {
        target: String,
        success: bool,
        artifacts: u64,
    },

    /// A generic diagnostic message.
    #[serde(rename = "diagnostic")]
    Diagnostic { level: String, message: String },
}

impl BuildEvent {
    /// Serialize this event to a JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Output format for build reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageFormat {
    /// Log through tracing, pass subprocess output through to the terminal
    #[default]
    Human,
    /// One JSON event per line on stdout
    Json,
}

/// Sink for pipeline progress and captured subprocess output.
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    format: MessageFormat,
}

impl Reporter {
    pub fn new(format: MessageFormat) -> Self {
        Reporter { format }
    }

    /// Emit a structured event (JSON mode only; human call sites log via tracing).
    pub fn emit(&self, event: BuildEvent) {
        if self.format == MessageFormat::Json {
            println!("{}", event.to_json());
        }
    }

    /// Forward a stage's captured stdout/stderr.
    pub fn stage_output(&self, target: &str, stage: &str, stdout: &[u8], stderr: &[u8]) {
        match self.format {
            MessageFormat::Human => {
                // Pass raw bytes through so docker's own formatting survives.
                let _ = std::io::stdout().write_all(stdout);
                let _ = std::io::stderr().write_all(stderr);
            }
            MessageFormat::Json => self.emit(BuildEvent::StageOutput {
                target: target.to_string(),
                stage: stage.to_string(),
                stdout: String::from_utf8_lossy(stdout).into_owned(),
                stderr: String::from_utf8_lossy(stderr).into_owned(),
            }),
        }
    }

    /// Report a non-fatal problem (cleanup failures and the like).
    pub fn warn(&self, message: impl Into<String>) {
        let message = message.into();
        match self.format {
            MessageFormat::Human => tracing::warn!("{message}"),
            MessageFormat::Json => self.emit(BuildEvent::Diagnostic {
                level: "warning".to_string(),
                message,
            }),
        }
    }

    /// Report a fatal per-target error.
    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        match self.format {
            MessageFormat::Human => eprintln!("{message}"),
            MessageFormat::Json => self.emit(BuildEvent::Diagnostic {
                level: "error".to_string(),
                message,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_started_serialization() {
        let event = BuildEvent::StageStarted {
            target: "hello".to_string(),
            stage: "build-image".to_string(),
            cmd: "docker build -t rpm-image-0:latest /tmp/ctx".to_string(),
        };
        let json = event.to_json();
        assert!(json.contains("\"reason\":\"stage-started\""));
        assert!(json.contains("\"stage\":\"build-image\""));
    }

    #[test]
    fn test_artifact_extracted_serialization() {
        let event = BuildEvent::ArtifactExtracted {
            target: "hello".to_string(),
            path: PathBuf::from("RPMS/x86_64/hello-1.0.rpm"),
        };
        let json = event.to_json();
        assert!(json.contains("\"reason\":\"artifact-extracted\""));
        assert!(json.contains("hello-1.0.rpm"));
    }

    #[test]
    fn test_target_finished_serialization() {
        let event = BuildEvent::TargetFinished {
            target: "hello".to_string(),
            success: true,
            artifacts: 2,
        };
        let json = event.to_json();
        assert!(json.contains("\"success\":true"));
        assert!(json.contains("\"artifacts\":2"));
    }
}
