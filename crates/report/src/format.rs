//! Number and label formatting shared by every report.

use tour_core::Show;

/// Chart/summary label for a show, with the start time as the source wrote it.
pub fn show_label(show: &Show) -> String {
    format!("Venue {} | {}", show.venue_id, show.event_dt_text)
}

/// Integer with comma thousands separators.
pub fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Float rounded to a whole number, with thousands separators.
pub fn thousands_f64(x: f64) -> String {
    if x.is_finite() && x >= 0.0 {
        thousands(x.round() as u64)
    } else {
        format!("{:.0}", x)
    }
}

/// Round to two decimal places.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
