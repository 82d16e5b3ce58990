pub mod audio;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod image;
pub mod library;
pub mod logger;
pub mod scanner;
pub mod sidecar;

pub use dispatch::{Dispatcher, Extractor};
pub use error::SidecarError;
pub use library::{MediaFile, MediaKind, Metadata};
pub use scanner::{process_file, walk_files, FileOutcome, FileReport, ScanConfig, ScanResult, Scanner};
