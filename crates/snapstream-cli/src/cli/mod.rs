//! CLI for the SnapStream image downloader.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use snapstream_core::config;
use snapstream_core::downloader::DownloadOptions;
use snapstream_core::filter::{DimensionBounds, FilterMode, FilterSpec};
use std::path::PathBuf;

use crate::session::Session;
use commands::{run_completions, run_download, run_fetch, run_man, run_scan, Target};

/// Top-level CLI for the SnapStream image downloader.
#[derive(Debug, Parser)]
#[command(name = "snapstream")]
#[command(about = "SnapStream: find, filter and download the images of a web page", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Scan a page and print the image URLs that pass the filter.
    Scan {
        /// Page to scan.
        url: String,
        /// Also scan the page's iframes and merge what they contain.
        #[arg(long)]
        frames: bool,
        /// Print a JSON report ({allImages, linkedImages, origin}) instead of one URL per line.
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Scan a page, filter, and download every remaining image.
    Download {
        /// Page to scan.
        url: String,
        #[arg(long)]
        frames: bool,
        #[command(flatten)]
        filter: FilterArgs,
        /// Subfolder under the download directory.
        #[arg(long, value_name = "FOLDER")]
        folder: Option<String>,
        /// Base file name; images are numbered (`trip001.jpg`, `trip002.png`, ...).
        #[arg(long, value_name = "NAME")]
        name: Option<String>,
        /// Download directory (overrides config; default: current directory).
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
        /// Only list what would be downloaded.
        #[arg(long)]
        dry_run: bool,
        /// Replace existing files instead of saving as `name (1).ext`.
        #[arg(long)]
        overwrite: bool,
    },

    /// Download a single image URL.
    Fetch {
        /// Direct image URL.
        url: String,
        /// File name (extension is replaced by the one the server reports).
        #[arg(long, value_name = "NAME")]
        name: Option<String>,
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
        /// Origin to send as Referer/Origin (e.g. https://example.com).
        #[arg(long, value_name = "ORIGIN")]
        referrer: Option<String>,
        /// Replace an existing file with the same name.
        #[arg(long)]
        overwrite: bool,
    },

    /// Print shell completions to stdout.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print the man page to stdout.
    Man,
}

/// Filter flags shared by `scan` and `download`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct FilterArgs {
    /// Filter text (terms, wildcard, or regex depending on --mode).
    #[arg(long, value_name = "TEXT")]
    pub filter: Option<String>,
    /// How --filter is interpreted (default from config).
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,
    /// Only images that pages link to (`<a href="...jpg">`).
    #[arg(long)]
    pub only_linked: bool,
    #[arg(long, value_name = "PX")]
    pub min_width: Option<u32>,
    #[arg(long, value_name = "PX")]
    pub max_width: Option<u32>,
    #[arg(long, value_name = "PX")]
    pub min_height: Option<u32>,
    #[arg(long, value_name = "PX")]
    pub max_height: Option<u32>,
    /// Fetch images to read their real width/height so size bounds use it.
    #[arg(long)]
    pub measure_dimensions: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Normal,
    Wildcard,
    Regex,
}

impl From<ModeArg> for FilterMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Normal => FilterMode::Normal,
            ModeArg::Wildcard => FilterMode::Wildcard,
            ModeArg::Regex => FilterMode::Regex,
        }
    }
}

impl FilterArgs {
    pub fn to_spec(&self, default_mode: FilterMode) -> FilterSpec {
        FilterSpec {
            mode: self.mode.map(FilterMode::from).unwrap_or(default_mode),
            text: self.filter.clone().unwrap_or_default(),
            only_linked: self.only_linked,
            bounds: DimensionBounds {
                min_width: self.min_width,
                max_width: self.max_width,
                min_height: self.min_height,
                max_height: self.max_height,
            },
        }
    }

    /// Measuring only pays off when a size bound is set.
    pub fn wants_measure(&self) -> bool {
        self.measure_dimensions && !self.to_spec(FilterMode::Normal).bounds.is_unbounded()
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Scan {
                url,
                frames,
                json,
                filter,
            } => run_scan(&mut open_session()?, &url, frames, &filter, json).await?,
            CliCommand::Download {
                url,
                frames,
                filter,
                folder,
                name,
                dir,
                dry_run,
                overwrite,
            } => {
                let options = DownloadOptions {
                    filename_template: name,
                    folder,
                    save_as: false,
                };
                let mut session = open_session()?;
                let target = Target {
                    dir,
                    overwrite,
                };
                run_download(&mut session, &url, frames, &filter, options, &target, dry_run).await?;
            }
            CliCommand::Fetch {
                url,
                name,
                dir,
                referrer,
                overwrite,
            } => {
                let target = Target {
                    dir,
                    overwrite,
                };
                run_fetch(&open_session()?, &url, name, &target, referrer).await?
            }
            CliCommand::Completions { shell } => run_completions(shell)?,
            CliCommand::Man => run_man()?,
        }

        Ok(())
    }
}

fn open_session() -> Result<Session> {
    let cfg = config::load_or_init()?;
    tracing::debug!("loaded config: {:?}", cfg);
    Ok(Session::new(cfg))
}

#[cfg(test)]
mod tests;
