//! Output layer shared by the non-interactive commands.
//!
//! # Output mode resolution
//!
//! Precedence (highest wins):
//! 1. `--format` / `--json` flag
//! 2. `FORMAT` env var → `"pretty"` | `"text"` | `"json"`
//! 3. Default: [`OutputMode::Pretty`] if stdout is a TTY; [`OutputMode::Text`] if piped.

use cfdi_core::{CfdiError, ErrorCode};
use clap::ValueEnum;
use serde::Serialize;
use std::io::{self, IsTerminal, Write};

/// Shared width for human pretty separators.
pub const PRETTY_RULE_WIDTH: usize = 56;

pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = PRETTY_RULE_WIDTH)
}

/// Write a section heading followed by a separator.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

/// Render a left-aligned key/value line in human output.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<16} {}", format!("{key}:"), value.as_ref())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Human-oriented output with sections and formatted money.
    Pretty,
    /// Tab-separated rows for pipes and scripts.
    Text,
    /// Machine-readable JSON.
    Json,
}

impl OutputMode {
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }
}

fn resolve_output_mode_inner(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    format_env: Option<&str>,
    is_tty: bool,
) -> OutputMode {
    if let Some(mode) = format_flag {
        return mode;
    }

    if json_flag {
        return OutputMode::Json;
    }

    if let Some(val) = format_env {
        match val.to_lowercase().as_str() {
            "json" => return OutputMode::Json,
            "text" => return OutputMode::Text,
            "pretty" => return OutputMode::Pretty,
            _ => {}
        }
    }

    if is_tty {
        OutputMode::Pretty
    } else {
        OutputMode::Text
    }
}

/// Resolve the output mode from CLI flags, environment, and TTY defaults.
pub fn resolve_output_mode(format_flag: Option<OutputMode>, json_flag: bool) -> OutputMode {
    let env_val = std::env::var("FORMAT").ok();
    let is_tty = io::stdout().is_terminal();
    resolve_output_mode_inner(format_flag, json_flag, env_val.as_deref(), is_tty)
}

/// Render a serializable value with explicit pretty/text renderers.
pub fn render_mode<T: Serialize>(
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_mode(&mut out, mode, value, text_fn, pretty_fn)
}

/// [`render_mode`] into an arbitrary writer.
pub fn write_mode<T: Serialize>(
    out: &mut dyn Write,
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut *out, value)?;
            writeln!(out)?;
        }
        OutputMode::Text => text_fn(value, out)?,
        OutputMode::Pretty => pretty_fn(value, out)?,
    }
    Ok(())
}

/// A fatal error ready for display, with its stable code and hint.
#[derive(Debug, Serialize)]
pub struct CliError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    pub error_code: String,
}

impl From<&CfdiError> for CliError {
    fn from(err: &CfdiError) -> Self {
        let code = err.code();
        Self {
            message: err.to_string(),
            hint: code.hint().map(str::to_string),
            error_code: code.code().to_string(),
        }
    }
}

impl From<&anyhow::Error> for CliError {
    /// Uses the innermost [`CfdiError`] in the chain when there is one, so
    /// context added at the command boundary keeps the core's code.
    fn from(err: &anyhow::Error) -> Self {
        if let Some(core) = err.chain().find_map(|cause| cause.downcast_ref::<CfdiError>()) {
            let mut cli = Self::from(core);
            cli.message = format!("{err:#}");
            return cli;
        }
        let code = ErrorCode::InternalUnexpected;
        Self {
            message: format!("{err:#}"),
            hint: code.hint().map(str::to_string),
            error_code: code.code().to_string(),
        }
    }
}

/// Write `error` in the requested format.
pub fn write_error(out: &mut dyn Write, mode: OutputMode, error: &CliError) -> io::Result<()> {
    if mode.is_json() {
        let wrapper = serde_json::json!({ "error": error });
        serde_json::to_writer_pretty(&mut *out, &wrapper)?;
        return writeln!(out);
    }
    writeln!(out, "error[{}]: {}", error.error_code, error.message)?;
    if let Some(ref hint) = error.hint {
        writeln!(out, "  hint: {hint}")?;
    }
    Ok(())
}

/// [`write_error`], falling back to a plain `error[CODE]: message` line on
/// `plain` when the formatted write fails.
pub fn write_error_or_plain(
    out: &mut dyn Write,
    plain: &mut dyn Write,
    mode: OutputMode,
    error: &CliError,
) -> io::Result<()> {
    if let Err(err) = write_error(out, mode, error) {
        tracing::warn!(error = %err, "formatted error report failed");
        writeln!(plain, "error[{}]: {}", error.error_code, error.message)?;
    }
    Ok(())
}

/// Render a fatal error to stderr.
pub fn render_error(mode: OutputMode, error: &CliError) -> io::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    write_error_or_plain(&mut out, &mut io::stderr(), mode, error)
}
