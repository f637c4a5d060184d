//! Human-readable formatting for report and log values

use std::time::Duration;

/// Formats an elapsed time for stage summaries (`850ms`, `2.40s`, `1m5s`)
pub fn format_elapsed(elapsed: Duration) -> String {
    let millis = elapsed.as_millis() as u64;

    if millis < 1000 {
        format!("{millis}ms")
    } else if millis < 60_000 {
        let seconds = millis as f64 / 1000.0;
        if seconds >= 10.0 {
            format!("{seconds:.1}s")
        } else {
            format!("{seconds:.2}s")
        }
    } else {
        let total_seconds = millis / 1000;
        let minutes = total_seconds / 60;
        let seconds = total_seconds % 60;
        if seconds == 0 {
            format!("{minutes}m")
        } else {
            format!("{minutes}m{seconds}s")
        }
    }
}

/// Percentage of `part` in `total` with one decimal place; an empty total is 0%
pub fn format_percentage(part: usize, total: usize) -> String {
    if total == 0 {
        return "0.0%".to_string();
    }
    format!("{:.1}%", part as f64 * 100.0 / total as f64)
}
