//! Process logging on top of `log4rs`.
//!
//! The library only emits through the `log` facade; binaries and tests decide whether a logger
//! is installed. Re-initialization after a logger is already set is ignored.

use log::LevelFilter;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::append::rolling_file::policy::compound::{
    CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
};
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::{Path, PathBuf};

use crate::cache::METRICS_TARGET;

/// Initializes logging from `log4rs.yaml` in the working directory.
/// Prefer `configure_logging` for programmatic control.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    let _ = log4rs::init_file("log4rs.yaml", log4rs::config::Deserializers::default());
    Ok(())
}

/// Initializes logging from a specific log4rs config file.
pub fn init_path(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let _ = log4rs::init_file(path, log4rs::config::Deserializers::default());
    Ok(())
}

const ENCODER_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t} - {m}{n}";
const ROLL_SIZE_BYTES: u64 = 10 * 1024 * 1024;

#[must_use]
pub fn parse_level(level: Option<&str>) -> LevelFilter {
    match level.unwrap_or("info").to_ascii_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

fn rolling_appender(
    base: &Path,
    stem: &str,
    keep: u32,
) -> Result<RollingFileAppender, Box<dyn std::error::Error>> {
    let roller = FixedWindowRoller::builder()
        .build(&format!("{}", base.join(format!("{stem}.{{}}.log")).display()), keep)?;
    let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(ROLL_SIZE_BYTES)), Box::new(roller));
    let appender = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(ENCODER_PATTERN)))
        .build(base.join(format!("{stem}.log")), Box::new(policy))?;
    Ok(appender)
}

/// Builds the rolling-file logging config without installing it.
/// - `app.log`: root logger at `level`
/// - `cache.log`: target `memolite::cache` (construction and eviction events)
/// - `metrics.log`: target `memolite::metrics` (counter summaries)
/// - `dev6.log`: developer lines from `dev6!`, only when `enable_dev6` is set
///
/// # Errors
/// Returns an error if the directory cannot be created or an appender fails to build.
pub fn build_config(
    dir: Option<&Path>,
    level: Option<&str>,
    retention: Option<usize>,
    enable_dev6: bool,
) -> Result<Config, Box<dyn std::error::Error>> {
    let base = dir
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    std::fs::create_dir_all(&base)?;
    let keep = u32::try_from(retention.unwrap_or(7)).unwrap_or(u32::MAX);
    let lvl = parse_level(level);

    let mut builder = Config::builder()
        .appender(Appender::builder().build("app", Box::new(rolling_appender(&base, "app", keep)?)))
        .appender(
            Appender::builder().build("cache", Box::new(rolling_appender(&base, "cache", keep)?)),
        )
        .logger(Logger::builder().appender("cache").additive(false).build("memolite::cache", lvl))
        .appender(
            Appender::builder().build("metrics", Box::new(rolling_appender(&base, "metrics", keep)?)),
        )
        .logger(Logger::builder().appender("metrics").additive(false).build(METRICS_TARGET, lvl));

    if enable_dev6 {
        builder = builder
            .appender(
                Appender::builder().build("dev6", Box::new(rolling_appender(&base, "dev6", keep)?)),
            )
            .logger(
                Logger::builder()
                    .appender("dev6")
                    .additive(false)
                    .build(crate::utils::devlog::DEV_TARGET, LevelFilter::Trace),
            );
    } else {
        builder = builder.logger(
            Logger::builder().additive(false).build(crate::utils::devlog::DEV_TARGET, LevelFilter::Off),
        );
    }

    Ok(builder.build(Root::builder().appender("app").build(lvl))?)
}

/// Configure logging globally for the process.
/// - dir: base directory for logs; if None, current directory.
/// - level: off|error|warn|info|debug|trace
/// - retention: number of rolled files to keep (default 7)
///
/// # Errors
/// As [`build_config`]. A logger that is already installed is left in place.
pub fn configure_logging(
    dir: Option<&Path>,
    level: Option<&str>,
    retention: Option<usize>,
    enable_dev6: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(dir, level, retention, enable_dev6)?;
    let _ = log4rs::init_config(config);
    Ok(())
}

/// Parses a retention count; anything but a plain number is ignored.
#[must_use]
pub fn parse_retention(value: Option<&str>) -> Option<usize> {
    value.and_then(|s| s.trim().parse::<usize>().ok())
}

/// 1|true|yes enables dev6 file routing.
#[must_use]
pub fn parse_dev6(value: Option<&str>) -> bool {
    value.is_some_and(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

/// `MEMOLITE_LOG_RETENTION`, if set to a number.
#[must_use]
pub fn retention_from_env() -> Option<usize> {
    parse_retention(std::env::var("MEMOLITE_LOG_RETENTION").ok().as_deref())
}

/// Whether `MEMOLITE_DEV6` asks for the dev6 log file.
#[must_use]
pub fn dev6_from_env() -> bool {
    parse_dev6(std::env::var("MEMOLITE_DEV6").ok().as_deref())
}

/// Configure logging from environment variables if present:
/// - MEMOLITE_LOG_DIR
/// - MEMOLITE_LOG_LEVEL
/// - MEMOLITE_LOG_RETENTION
/// - MEMOLITE_DEV6 (1|true|yes)
pub fn configure_from_env() -> Result<(), Box<dyn std::error::Error>> {
    let dir = std::env::var("MEMOLITE_LOG_DIR").ok().map(PathBuf::from);
    let level = std::env::var("MEMOLITE_LOG_LEVEL").ok();
    configure_logging(dir.as_deref(), level.as_deref(), retention_from_env(), dev6_from_env())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_parsing_defaults_to_info() {
        assert_eq!(parse_level(None), LevelFilter::Info);
        assert_eq!(parse_level(Some("DEBUG")), LevelFilter::Debug);
        assert_eq!(parse_level(Some("off")), LevelFilter::Off);
        assert_eq!(parse_level(Some("nonsense")), LevelFilter::Info);
    }

    #[test]
    fn build_config_creates_log_dir() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("logs");
        let cfg = build_config(Some(&base), Some("debug"), Some(2), true).unwrap();
        assert!(base.is_dir());
        assert_eq!(cfg.root().level(), LevelFilter::Debug);
        assert!(cfg.loggers().iter().any(|l| l.name() == "memolite::dev6"));
        assert!(cfg.loggers().iter().any(|l| l.name() == "memolite::cache"));
        assert!(cfg.loggers().iter().any(|l| l.name() == METRICS_TARGET));
        assert!(cfg.appenders().iter().any(|a| a.name() == "metrics"));
    }

    #[test]
    fn retention_and_dev6_values() {
        assert_eq!(parse_retention(Some(" 3 ")), Some(3));
        assert_eq!(parse_retention(Some("many")), None);
        assert_eq!(parse_retention(None), None);
        assert!(parse_dev6(Some("TRUE")));
        assert!(parse_dev6(Some("1")));
        assert!(!parse_dev6(Some("0")));
        assert!(!parse_dev6(None));
    }

    #[test]
    fn init_path_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(init_path(&dir.path().join("absent.yaml")).is_ok());
    }
}
