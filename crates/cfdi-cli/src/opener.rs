//! Opening the source document behind a selected row.

use anyhow::{Context, Result, bail};
use cfdi_core::config::OpenConfig;
use cfdi_core::ingest::xml_files;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Locate the document stamped with `uuid` inside `dir`.
///
/// Tries `<dir>/<uuid>.xml` first, then any `.xml` file whose stem equals
/// the UUID ignoring case.
pub fn resolve_document(dir: &Path, uuid: &str) -> Result<PathBuf> {
    let direct = dir.join(format!("{uuid}.xml"));
    if direct.is_file() {
        return Ok(direct);
    }

    let files = xml_files(dir).with_context(|| format!("listing {}", dir.display()))?;
    files
        .into_iter()
        .find(|path| {
            path.file_stem()
                .and_then(|stem| stem.to_str())
                .is_some_and(|stem| stem.eq_ignore_ascii_case(uuid))
        })
        .with_context(|| format!("no document named {uuid}.xml in {}", dir.display()))
}

pub trait DocumentOpener {
    fn open(&mut self, path: &Path) -> Result<()>;
}

/// Spawns the configured program without waiting for it.
#[derive(Debug, Clone)]
pub struct CommandOpener {
    config: OpenConfig,
}

impl CommandOpener {
    pub const fn new(config: OpenConfig) -> Self {
        Self { config }
    }
}

impl DocumentOpener for CommandOpener {
    fn open(&mut self, path: &Path) -> Result<()> {
        if self.config.command.trim().is_empty() {
            bail!("no open command configured");
        }
        let mut child = Command::new(&self.config.command)
            .args(&self.config.args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("failed to run {}", self.config.command))?;
        tracing::debug!(pid = child.id(), path = %path.display(), "opener spawned");
        // Reap in the background so the console never blocks on the viewer.
        std::thread::spawn(move || child.wait());
        Ok(())
    }
}
