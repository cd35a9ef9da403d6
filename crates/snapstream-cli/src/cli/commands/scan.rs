//! `snapstream scan <url>` – list the images of a page.

use anyhow::Result;

use super::scan_and_filter;
use crate::cli::FilterArgs;
use crate::session::Session;

pub async fn run_scan(session: &mut Session, url: &str, frames: bool, filter: &FilterArgs, json: bool) -> Result<()> {
    let visible = scan_and_filter(session, url, frames, filter).await?;

    if json {
        let spec = filter.to_spec(session.config.filter.default_mode);
        println!("{}", serde_json::to_string_pretty(&session.visible_report(&spec))?);
        return Ok(());
    }

    for u in &visible {
        println!("{}", u);
    }
    eprintln!("{} of {} images shown", visible.len(), session.discovered.len());
    Ok(())
}
