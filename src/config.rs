use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

use crate::scanner::ScanConfig;

/// Writes the embedded metadata of every image and audio file under a
/// directory to `<file>.metadata.md` sidecars.
#[derive(Debug, Parser)]
#[command(name = "media-sidecar", version, about)]
pub struct Config {
    /// Directory to scan
    #[arg(env = "MEDIA_PATH", default_value = "./")]
    pub media_path: PathBuf,

    /// Do not draw a progress bar
    #[arg(long, env = "SIDECAR_NO_PROGRESS")]
    pub no_progress: bool,

    /// off, error, warn, info, debug or trace
    #[arg(long, env = "SIDECAR_LOG_LEVEL", default_value = "info")]
    pub log_level: LevelFilter,
}

impl Config {
    /// Reads `.env` if present, then the command line.
    pub fn load() -> Self {
        dotenv::dotenv().ok();
        Self::parse()
    }

    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            media_path: self.media_path.clone(),
            show_progress: !self.no_progress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_arguments() {
        let config = Config::try_parse_from([
            "media-sidecar",
            "/srv/photos",
            "--no-progress",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(config.media_path, PathBuf::from("/srv/photos"));
        assert_eq!(config.log_level, LevelFilter::Debug);

        let scan = config.scan_config();
        assert_eq!(scan.media_path, PathBuf::from("/srv/photos"));
        assert!(!scan.show_progress);
    }

    #[test]
    fn test_rejects_unknown_level() {
        assert!(Config::try_parse_from(["media-sidecar", "/srv", "--log-level", "loud"]).is_err());
    }
}
