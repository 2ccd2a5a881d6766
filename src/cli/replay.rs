use crate::cache::{BoundedCache, CacheMetrics, EvictionPolicy};
use crate::errors::CacheError;
use serde::Serialize;

/// One line of an operation trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceOp {
    Put { key: String, value: String },
    Get { key: String },
    Remove { key: String },
    Clear,
}

/// Parses a trace: one operation per line, `#` comments and blank lines skipped.
///
/// ```text
/// put <key> <value...>
/// get <key>
/// remove <key>
/// clear
/// ```
///
/// # Errors
/// `TraceParse` with the 1-based line number of the first malformed line.
pub fn parse_trace(text: &str) -> Result<Vec<TraceOp>, CacheError> {
    let mut ops = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fail = |reason: &str| CacheError::TraceParse { line: idx + 1, reason: reason.to_string() };
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((v, r)) => (v, r.trim()),
            None => (line, ""),
        };
        let op = match verb.to_ascii_lowercase().as_str() {
            "put" => {
                let (key, value) = match rest.split_once(char::is_whitespace) {
                    Some((k, v)) => (k, v.trim()),
                    None => return Err(fail("put needs a key and a value")),
                };
                TraceOp::Put { key: key.to_string(), value: value.to_string() }
            }
            "get" | "remove" => {
                if rest.is_empty() || rest.contains(char::is_whitespace) {
                    return Err(fail(&format!("{verb} takes exactly one key")));
                }
                if verb.eq_ignore_ascii_case("get") {
                    TraceOp::Get { key: rest.to_string() }
                } else {
                    TraceOp::Remove { key: rest.to_string() }
                }
            }
            "clear" => {
                if !rest.is_empty() {
                    return Err(fail("clear takes no arguments"));
                }
                TraceOp::Clear
            }
            other => return Err(fail(&format!("unknown operation '{other}'"))),
        };
        ops.push(op);
    }
    Ok(ops)
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub policy: EvictionPolicy,
    pub capacity: usize,
    pub operations: usize,
    /// Final contents, eldest first.
    pub entries: Vec<(String, String)>,
    /// Keys in the order they were evicted.
    pub evicted: Vec<String>,
    pub metrics: CacheMetrics,
}

/// Applies `ops` to `cache` and reports the outcome.
pub fn replay(cache: &mut BoundedCache<String, String>, ops: &[TraceOp]) -> ReplayReport {
    let mut evicted = Vec::new();
    for op in ops {
        match op {
            TraceOp::Put { key, value } => {
                // A new key into a full cache pushes out the current eldest.
                if !cache.contains_key(key.as_str()) && cache.len() == cache.capacity() {
                    if let Some((eldest, _)) = cache.eldest() {
                        evicted.push(eldest.clone());
                    }
                }
                cache.put(key.clone(), value.clone());
            }
            TraceOp::Get { key } => {
                let _ = cache.get(key.as_str());
            }
            TraceOp::Remove { key } => {
                let _ = cache.remove(key.as_str());
            }
            TraceOp::Clear => cache.clear(),
        }
    }
    log::info!(
        "replayed {} operations: len={} evicted={}",
        ops.len(),
        cache.len(),
        evicted.len()
    );
    let metrics = cache.metrics();
    metrics.log_summary("replay");
    ReplayReport {
        policy: cache.policy(),
        capacity: cache.capacity(),
        operations: ops.len(),
        entries: cache.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        evicted,
        metrics,
    }
}
