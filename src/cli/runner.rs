use crate::cache::BoundedCache;
use crate::errors::CacheError;
use std::io::Write;

use super::command::Command;
use super::replay::{ReplayReport, parse_trace, replay};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutputMode {
    Human,
    Plain,
    Json,
}

/// Runs `cmd`, writing its report to `out`.
///
/// # Errors
/// `Io` if the trace cannot be read or output cannot be written, `TraceParse` for a malformed
/// trace, `InvalidConfiguration` for a rejected cache configuration.
pub fn run_with_format(cmd: Command, mode: OutputMode, out: &mut dyn Write) -> Result<(), CacheError> {
    match cmd {
        Command::Replay { trace, config } => {
            let text = std::fs::read_to_string(&trace)
                .map_err(|e| CacheError::Io(format!("failed to read {}: {e}", trace.display())))?;
            let ops = parse_trace(&text)?;
            let mut cache = BoundedCache::from_config(&config)?;
            let report = replay(&mut cache, &ops);
            write_report(&report, mode, out)
        }
        Command::CheckConfig { config } => {
            config.validate()?;
            let text = match mode {
                OutputMode::Json => serde_json::to_string_pretty(&config)?,
                OutputMode::Plain => format!(
                    "policy={} capacity={} initial_capacity={} load_factor={}",
                    config.policy, config.capacity, config.initial_capacity, config.load_factor
                ),
                OutputMode::Human => config.to_toml_string(),
            };
            writeln!(out, "{}", text.trim_end()).map_err(io_err)
        }
    }
}

fn io_err(e: std::io::Error) -> CacheError {
    CacheError::Io(e.to_string())
}

fn write_report(report: &ReplayReport, mode: OutputMode, out: &mut dyn Write) -> Result<(), CacheError> {
    let m = &report.metrics;
    match mode {
        OutputMode::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(report)?).map_err(io_err)?;
        }
        OutputMode::Plain => {
            for (k, v) in &report.entries {
                writeln!(out, "{k}\t{v}").map_err(io_err)?;
            }
            writeln!(
                out,
                "len={} capacity={} hits={} misses={} inserts={} updates={} removes={} evictions={}",
                report.entries.len(),
                report.capacity,
                m.hits,
                m.misses,
                m.inserts,
                m.updates,
                m.removes,
                m.evictions
            )
            .map_err(io_err)?;
        }
        OutputMode::Human => {
            writeln!(
                out,
                "policy={} capacity={} operations={}",
                report.policy, report.capacity, report.operations
            )
            .map_err(io_err)?;
            writeln!(out, "entries (eldest first):").map_err(io_err)?;
            for (k, v) in &report.entries {
                writeln!(out, "  {k} = {v}").map_err(io_err)?;
            }
            if !report.evicted.is_empty() {
                writeln!(out, "evicted: {}", report.evicted.join(", ")).map_err(io_err)?;
            }
            writeln!(
                out,
                "hits={} misses={} hit_ratio={:.3} evictions={}",
                m.hits,
                m.misses,
                m.hit_ratio(),
                m.evictions
            )
            .map_err(io_err)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheConfig, EvictionPolicy};

    #[test]
    fn check_config_plain_output() {
        let mut buf = Vec::new();
        let config = CacheConfig::new(EvictionPolicy::InsertionOrder, 4);
        run_with_format(Command::CheckConfig { config }, OutputMode::Plain, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "policy=insertion capacity=4 initial_capacity=16 load_factor=0.75\n");
    }

    #[test]
    fn replay_missing_trace_is_io_error() {
        let mut buf = Vec::new();
        let cmd = Command::Replay {
            trace: "/definitely/not/here.trace".into(),
            config: CacheConfig::default(),
        };
        assert!(matches!(run_with_format(cmd, OutputMode::Json, &mut buf), Err(CacheError::Io(_))));
    }
}
