use media_sidecar::config::Config;
use media_sidecar::{logger, Dispatcher, Scanner, SidecarError};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load();
    let multi = logger::init(config.log_level)?;

    let scan_config = config.scan_config();
    let mut scanner = Scanner::new(Dispatcher::default());
    if scan_config.show_progress {
        scanner = scanner.with_progress(multi);
    }

    let result = scanner.scan(&scan_config.media_path)?;

    if result.failed() > 0 {
        return Err(SidecarError::Failures(result.failed()).into());
    }
    Ok(())
}
