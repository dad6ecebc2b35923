use env_logger::{Builder, Target};
use log::LevelFilter;
use std::io::Write;
use std::str::FromStr;

/// Initialize the logger with custom formatting.
///
/// `level` applies to this crate, dependencies stay at `warn`. `RUST_LOG`
/// directives, when set, take precedence. Output goes to stderr so stdout
/// only carries the flow report.
pub fn init_logger(level: LevelFilter) {
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.args()
            )
        })
        .target(Target::Stderr)
        .filter(None, LevelFilter::Warn.min(level))
        .filter(Some(env!("CARGO_CRATE_NAME")), level)
        .parse_default_env()
        .init();
}

/// Get log level from string, `info` when unrecognised
pub fn get_log_level(level: &str) -> LevelFilter {
    LevelFilter::from_str(level.trim()).unwrap_or(LevelFilter::Info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(get_log_level("TRACE"), LevelFilter::Trace);
        assert_eq!(get_log_level("warn"), LevelFilter::Warn);
        assert_eq!(get_log_level(" debug "), LevelFilter::Debug);
        assert_eq!(get_log_level("off"), LevelFilter::Off);
        assert_eq!(get_log_level("chatty"), LevelFilter::Info);
    }
}
