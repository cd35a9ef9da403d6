pub mod config;
pub mod logging;

pub mod content_type;
pub mod dimensions;
pub mod downloader;
pub mod fetch;
pub mod filename;
pub mod filter;
pub mod page;
pub mod scanner;
pub mod storage;
