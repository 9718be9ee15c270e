//! Progress formatting helpers.

use std::time::Duration;

/// Format a step duration for spinner finish lines.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 1.0 {
        format!("{}ms", d.as_millis())
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let mins = (secs / 60.0).floor();
        let rest = secs - mins * 60.0;
        format!("{}m {:.0}s", mins, rest)
    }
}
