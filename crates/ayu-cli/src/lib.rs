use std::path::PathBuf;

use anyhow::Context;
use ayu_core::models::{FieldKind, FormSchema, RawFile};
use ayu_intake::{FeedbackMessage, FeedbackSurface, Severity, SubmissionController};

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Parse a `name=value` pair given on the command line.
pub fn parse_field(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected name=value, got '{}'", raw)),
    }
}

/// Set one field on the form, treating checkbox fields as booleans.
pub async fn fill_field(
    controller: &SubmissionController,
    name: &str,
    value: &str,
) -> anyhow::Result<()> {
    let is_checkbox = matches!(
        controller.schema().field(name).map(|f| &f.kind),
        Some(FieldKind::Checkbox)
    );

    if is_checkbox {
        let checked = parse_flag(value)
            .with_context(|| format!("Field '{}' expects true or false, got '{}'", name, value))?;
        controller.set_checked(name, checked).await?;
    } else {
        controller.set_text(name, value).await?;
    }
    Ok(())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" | "" => Some(false),
        _ => None,
    }
}

/// Read every path into memory, stopping at the first unreadable one.
pub fn load_files(paths: &[PathBuf]) -> anyhow::Result<Vec<RawFile>> {
    paths
        .iter()
        .map(|path| {
            RawFile::from_path(path).with_context(|| format!("Failed to read {}", path.display()))
        })
        .collect()
}

/// One line per field: name, kind, required marker and label.
pub fn describe_schema(schema: &FormSchema) -> String {
    schema
        .fields()
        .iter()
        .map(|field| {
            let kind = match &field.kind {
                FieldKind::Text => "text".to_string(),
                FieldKind::TextArea => "textarea".to_string(),
                FieldKind::Email => "email".to_string(),
                FieldKind::Tel => "tel".to_string(),
                FieldKind::Checkbox => "checkbox".to_string(),
                FieldKind::Number { min, max } => match (min, max) {
                    (Some(min), Some(max)) => format!("number {}..{}", min, max),
                    _ => "number".to_string(),
                },
                FieldKind::Select { options } => format!("select [{}]", options.join("|")),
            };
            format!(
                "{:<20} {:<40} {}{}",
                field.name,
                truncate_string(&kind, 40),
                if field.required { "* " } else { "  " },
                field.label
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prints every feedback message to stderr as it is set.
pub struct TerminalSurface;

impl FeedbackSurface for TerminalSurface {
    fn reveal(&self, message: &FeedbackMessage) {
        let marker = match message.severity {
            Severity::Info => "info",
            Severity::Success => "ok",
            Severity::Error => "error",
        };
        eprintln!("[{}] {}", marker, message.text);
    }
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
