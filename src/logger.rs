use indicatif::MultiProgress;
use indicatif_log_bridge::LogWrapper;
use log::{LevelFilter, Metadata, Record};

struct SimpleLogger {
    level: LevelFilter,
}

impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            println!("{} - {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

/// Installs the console logger. Progress bars drawn on the returned
/// `MultiProgress` are suspended while a line is printed.
pub fn init(level: LevelFilter) -> Result<MultiProgress, log::SetLoggerError> {
    let multi = MultiProgress::new();
    LogWrapper::new(multi.clone(), SimpleLogger { level }).try_init()?;
    log::set_max_level(level);
    Ok(multi)
}
