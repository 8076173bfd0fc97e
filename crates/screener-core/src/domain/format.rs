//! Display formatting shared by table rows and market cards.

/// Sign-prefixed two-decimal percentage: `+0.44%`, `-4.15%`, `+0.00%`.
pub fn format_percent(value: f64) -> String {
    // -0.0 would otherwise print as "+-0.00%"
    let value = if value == 0.0 { 0.0 } else { value };
    if value >= 0.0 {
        format!("+{value:.2}%")
    } else {
        format!("{value:.2}%")
    }
}

/// Dollar price with two decimals.
pub fn format_price(value: f64) -> String {
    format!("${value:.2}")
}

/// Percentage change between the first and last observation of a window.
/// A zero base yields `0.0` rather than `NaN`/`inf`.
pub fn change_percent(first: f64, last: f64) -> f64 {
    if first == 0.0 {
        return 0.0;
    }
    (last - first) / first * 100.0
}
