//! FILENAME: app/visual/src/logging.rs
// PURPOSE: Debug logging for the visual.
// CONTEXT: Lines are kept in a bounded in-memory buffer that the host can show
// as an overlay, and are mirrored to the `log` facade.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::Local;
use once_cell::sync::Lazy;

// ============================================================================
// DEBUG BUFFER
// ============================================================================

/// Lines kept before the oldest ones are dropped.
pub const MAX_LOG_LINES: usize = 500;

/// Global sequence counter
static LOG_SEQ: AtomicU64 = AtomicU64::new(0);

struct DebugBuffer {
    lines: VecDeque<String>,
    visible: bool,
}

static DEBUG_BUFFER: Lazy<Mutex<DebugBuffer>> = Lazy::new(|| {
    Mutex::new(DebugBuffer {
        lines: VecDeque::with_capacity(64),
        visible: false,
    })
});

/// Get next sequence number
pub fn next_seq() -> u64 {
    LOG_SEQ.fetch_add(1, Ordering::SeqCst) + 1
}

/// Write a log line in the unified `seq|LEVEL|CATEGORY|message` format.
pub fn write_log(level: &str, category: &str, message: &str) {
    let seq = next_seq();
    let line = format!("{}|{}|{}|{}", seq, level, category, message);
    let stamped = format!("[{}] {}", Local::now().format("%H:%M:%S%.3f"), line);

    if let Ok(mut guard) = DEBUG_BUFFER.lock() {
        if guard.lines.len() >= MAX_LOG_LINES {
            guard.lines.pop_front();
        }
        guard.lines.push_back(stamped);
    }

    match level {
        "E" => log::error!(target: "drill_visual", "{}", line),
        "W" => log::warn!(target: "drill_visual", "{}", line),
        "I" => log::info!(target: "drill_visual", "{}", line),
        _ => log::debug!(target: "drill_visual", "{}", line),
    }
}

/// Write an ENTER log line for function entry
pub fn write_log_enter(level: &str, category: &str, func_name: &str, params: &str) {
    let message = if params.is_empty() {
        format!("ENTER {}", func_name)
    } else {
        format!("ENTER {} {}", func_name, params)
    };
    write_log(level, category, &message);
}

/// Write an EXIT log line for function exit
pub fn write_log_exit(level: &str, category: &str, func_name: &str, result: &str) {
    let message = if result.is_empty() {
        format!("EXIT {}", func_name)
    } else {
        format!("EXIT {} {}", func_name, result)
    };
    write_log(level, category, &message);
}

// ============================================================================
// OVERLAY CONTROL
// ============================================================================

pub fn show() {
    if let Ok(mut guard) = DEBUG_BUFFER.lock() {
        guard.visible = true;
    }
}

pub fn hide() {
    if let Ok(mut guard) = DEBUG_BUFFER.lock() {
        guard.visible = false;
    }
}

/// Flips the overlay and returns the new visibility.
pub fn toggle() -> bool {
    match DEBUG_BUFFER.lock() {
        Ok(mut guard) => {
            guard.visible = !guard.visible;
            guard.visible
        }
        Err(_) => false,
    }
}

pub fn is_visible() -> bool {
    DEBUG_BUFFER.lock().map(|g| g.visible).unwrap_or(false)
}

pub fn clear() {
    if let Ok(mut guard) = DEBUG_BUFFER.lock() {
        guard.lines.clear();
    }
}

/// A copy of the buffered lines, oldest first.
pub fn lines() -> Vec<String> {
    DEBUG_BUFFER
        .lock()
        .map(|g| g.lines.iter().cloned().collect())
        .unwrap_or_default()
}

/// Drains the buffer, oldest first.
pub fn take_lines() -> Vec<String> {
    DEBUG_BUFFER
        .lock()
        .map(|mut g| g.lines.drain(..).collect())
        .unwrap_or_default()
}

// ============================================================================
// MACRO DEFINITIONS & EXPORTS
// ============================================================================

#[macro_export]
macro_rules! log_debug {
    ($cat:expr, $($arg:tt)*) => {
        $crate::logging::write_log("D", $cat, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_info {
    ($cat:expr, $($arg:tt)*) => {
        $crate::logging::write_log("I", $cat, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($cat:expr, $($arg:tt)*) => {
        $crate::logging::write_log("W", $cat, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($cat:expr, $($arg:tt)*) => {
        $crate::logging::write_log("E", $cat, &format!($($arg)*))
    };
}

// ENTER/EXIT macros for function tracing

#[macro_export]
macro_rules! log_enter {
    ($cat:expr, $func:expr) => {
        $crate::logging::write_log_enter("D", $cat, $func, "")
    };
    ($cat:expr, $func:expr, $($arg:tt)*) => {
        $crate::logging::write_log_enter("D", $cat, $func, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_exit {
    ($cat:expr, $func:expr) => {
        $crate::logging::write_log_exit("D", $cat, $func, "")
    };
    ($cat:expr, $func:expr, $($arg:tt)*) => {
        $crate::logging::write_log_exit("D", $cat, $func, &format!($($arg)*))
    };
}

pub use log_debug;
pub use log_enter;
pub use log_error;
pub use log_exit;
pub use log_info;
pub use log_warn;
