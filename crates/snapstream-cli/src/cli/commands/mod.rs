//! CLI command handlers, one file per command.

mod completions;
mod download;
mod fetch;
mod scan;

pub use completions::{run_completions, run_man};
pub use download::run_download;
pub use fetch::run_fetch;
pub use scan::run_scan;

use anyhow::Result;
use snapstream_core::storage::{ConflictAction, DirectorySink};
use std::path::PathBuf;

use crate::cli::FilterArgs;
use crate::session::Session;

/// Where downloads land and what happens to existing files there.
#[derive(Debug, Clone, Default)]
pub struct Target {
    /// Overrides the configured download directory.
    pub dir: Option<PathBuf>,
    pub overwrite: bool,
}

impl Target {
    fn sink(&self, session: &Session) -> Result<DirectorySink> {
        let dest = session.config.resolve_download_dir(self.dir.as_deref())?;
        let conflict = if self.overwrite {
            ConflictAction::Overwrite
        } else {
            ConflictAction::Uniquify
        };
        Ok(DirectorySink::new(dest).with_conflict_action(conflict))
    }
}

/// Scan, optionally measure image dimensions, and return the filtered URLs.
async fn scan_and_filter(session: &mut Session, url: &str, frames: bool, filter: &FilterArgs) -> Result<Vec<String>> {
    let scan = session.scan(url, frames).await?;
    if scan.frames_failed > 0 {
        eprintln!("{} frame(s) could not be loaded; see the log for details.", scan.frames_failed);
    }
    if filter.wants_measure() {
        let found = session.measure_dimensions().await?;
        tracing::debug!(found, "measured image dimensions");
    }
    let spec = filter.to_spec(session.config.filter.default_mode);
    Ok(session.visible(&spec))
}
