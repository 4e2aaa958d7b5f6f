use std::time::SystemTime;

/// `true` when an artifact must be rebuilt.
///
/// An artifact is fresh only if it exists and is strictly newer than every input; an input
/// sharing the output's timestamp counts as newer.
pub fn is_stale(output: Option<SystemTime>, inputs: &[SystemTime]) -> bool {
    match output {
        None => true,
        Some(out) => inputs.iter().any(|input| *input >= out),
    }
}

/// Timestamp of an optional input; absent inputs read as the epoch.
pub fn or_epoch(t: Option<SystemTime>) -> SystemTime {
    t.unwrap_or(SystemTime::UNIX_EPOCH)
}

#[cfg(test)]
#[path = "../../tests/unit/build/freshness.rs"]
mod tests;
