use clap::Parser;
use reencode_core::{ScanConfig, DEFAULT_EXTENSIONS};
use std::path::PathBuf;

pub const DEFAULT_VIDEO_DIR: &str = "/Volumes/video/Other Rips";

#[derive(Debug, PartialEq, Eq, Parser)]
#[command(name = "reencode", version, about = "Video Reencode")]
pub struct Cli {
    /// Directory to search
    #[arg(short, long, default_value = DEFAULT_VIDEO_DIR)]
    pub directory: PathBuf,

    /// Supported file extensions, including the leading dot
    #[arg(short, long, num_args = 1.., default_values = DEFAULT_EXTENSIONS)]
    pub extensions: Vec<String>,
}

impl Cli {
    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig::new(self.extensions.clone())
    }
}
