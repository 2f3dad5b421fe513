// Display helpers for renderers

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Human readable size with 1024 steps, e.g. `1.5 KB`. Used for both
/// totals and per-second rates.
pub fn format_bytes(bytes: f64) -> String {
    if !bytes.is_finite() || bytes <= 0.0 {
        return "0 B".to_string();
    }

    let exponent = (bytes.ln() / 1024f64.ln()).floor().max(0.0) as usize;
    let exponent = exponent.min(UNITS.len() - 1);
    let scaled = bytes / 1024f64.powi(exponent as i32);

    let mut text = format!("{:.2}", scaled);
    if text.contains('.') {
        text = text.trim_end_matches('0').trim_end_matches('.').to_string();
    }
    format!("{} {}", text, UNITS[exponent])
}

pub fn format_rate(bytes_per_sec: f64) -> String {
    format!("{}/s", format_bytes(bytes_per_sec))
}

/// `HH:MM:SS`; hours keep growing past 99.
pub fn format_uptime(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}
