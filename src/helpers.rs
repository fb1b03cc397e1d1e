use std::time::Duration;

/// `mm:ss`, truncating partial seconds. Minutes keep counting past 99.
pub fn format_time(elapsed: Duration) -> String {
    let total_seconds = elapsed.as_secs();
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

pub fn format_best_time(best: Option<Duration>) -> String {
    best.map(format_time).unwrap_or_else(|| "--:--".to_string())
}
