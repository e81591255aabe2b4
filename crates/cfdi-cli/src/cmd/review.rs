//! `cfdi review`: interactive console over an invoices folder.

use std::path::{Path, PathBuf};

use anyhow::Context;
use cfdi_core::config::load_config;
use cfdi_core::ingest::load_dir;
use cfdi_core::session::ReviewSession;
use clap::Args;

use crate::opener::CommandOpener;
use crate::tui::review::run_review_tui;

/// Arguments for `cfdi review`.
#[derive(Args, Debug, Default)]
pub struct ReviewArgs {
    /// Invoices folder (defaults to `[invoices] dir`, usually `cfdis`).
    pub dir: Option<PathBuf>,
}

/// Execute `cfdi review`.
pub fn run_review(args: &ReviewArgs, project_root: &Path) -> anyhow::Result<()> {
    let config = load_config(project_root)?;
    let dir = super::invoices_dir(args.dir.as_deref(), &config, project_root);

    let invoices =
        load_dir(&dir).with_context(|| format!("loading invoices from {}", dir.display()))?;
    let session = ReviewSession::new(invoices)?;

    run_review_tui(session, dir, CommandOpener::new(config.open))
}
