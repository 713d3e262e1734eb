//! Per-manager session trace file.
//!
//! Records status transitions and raw session events, one timestamped line
//! each. Tracing is optional: with no log directory the handle is empty and
//! writes are dropped.

use std::{
    fs::{File, OpenOptions},
    io::Write,
    path::Path,
    sync::{Arc, Mutex, PoisonError},
};

use chrono::{SecondsFormat, Utc};

/// Shared handle to an append-only trace file.
pub type TraceHandle = Arc<Mutex<Option<File>>>;

/// A handle that writes nowhere.
pub fn disabled() -> TraceHandle {
    Arc::new(Mutex::new(None))
}

/// Append `[timestamp] KIND: data` to the trace file, if one is open.
pub fn trace_line(handle: &TraceHandle, kind: &str, data: &str) {
    let mut guard = handle.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(file) = guard.as_mut() {
        let ts = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let _ = writeln!(file, "[{ts}] {kind}: {data}");
        let _ = file.flush();
    }
}

/// Open (or create) `{log_dir}/{log_id}.log`.
///
/// Failures to create the directory or file leave the handle empty.
pub fn open_trace_file(log_dir: Option<&Path>, log_id: &str) -> TraceHandle {
    let file = log_dir.and_then(|dir| {
        if let Err(e) = std::fs::create_dir_all(dir) {
            log::warn!("Cannot create trace dir {}: {}", dir.display(), e);
            return None;
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(format!("{log_id}.log")))
            .map_err(|e| log::warn!("Cannot open trace file for {}: {}", log_id, e))
            .ok()
    });
    Arc::new(Mutex::new(file))
}
