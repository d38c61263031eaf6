/// Convert an abbreviated magnitude string as rendered by the feed
/// ("1.2K", "3M", "47") into an exact count.
///
/// Best-effort for noisy rendered text: anything unparseable collapses
/// to 0 rather than failing.
pub fn abbreviated_count(raw: &str) -> u64 {
    let text = raw.trim().to_ascii_uppercase();
    if text.contains('K') {
        scaled(&text.replace('K', ""), 1_000)
    } else if text.contains('M') {
        scaled(&text.replace('M', ""), 1_000_000)
    } else {
        text.parse::<u64>().unwrap_or(0)
    }
}

fn scaled(text: &str, multiplier: u64) -> u64 {
    match text.trim().parse::<f64>() {
        // Truncates, matching the rendered-count convention ("1.2K" == 1200).
        Ok(value) if value.is_finite() && value > 0.0 => (value * multiplier as f64) as u64,
        _ => 0,
    }
}
