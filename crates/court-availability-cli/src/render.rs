//! Plain-text digest of resolved courts, grouped by hall.

use std::fmt::Write;

use court_availability::{AvailabilityResult, Interval};

use crate::config::WatchConfig;

/// Render a digest for one surface and window.
///
/// Halls appear in order of their first free court; courts outside any
/// configured hall are listed last under "Other courts".
pub fn render_digest(
    config: &WatchConfig,
    surface: &str,
    window: Interval,
    results: &[AvailabilityResult],
) -> String {
    if results.is_empty() {
        return format!("No free courts ({surface}, {window})\n");
    }

    let mut groups: Vec<(Option<&str>, Vec<&AvailabilityResult>)> = Vec::new();
    for result in results {
        let hall = config.hall_of(result.court.number);
        match groups.iter_mut().find(|(name, _)| *name == hall) {
            Some((_, members)) => members.push(result),
            None => groups.push((hall, vec![result])),
        }
    }
    // Ungrouped courts go last.
    groups.sort_by_key(|(name, _)| name.is_none());

    let mut out = format!("Free courts ({surface}, {window}): {}\n", results.len());
    for (name, members) in groups {
        let _ = writeln!(out, "\n{}", name.unwrap_or("Other courts"));
        for result in members {
            let best = result.best_available_window;
            let _ = writeln!(
                out,
                "  Court #{} - {best} ({})",
                result.court.number,
                format_duration(best.duration_minutes())
            );
            if result.all_available_windows.len() > 1 {
                let rest: Vec<String> = result.all_available_windows[1..]
                    .iter()
                    .map(|w| w.to_string())
                    .collect();
                let _ = writeln!(out, "    also: {}", rest.join(", "));
            }
        }
    }
    out
}

fn format_duration(minutes: u32) -> String {
    match (minutes / 60, minutes % 60) {
        (0, m) => format!("{m} min"),
        (h, 0) => format!("{h} h"),
        (h, m) => format!("{h} h {m} min"),
    }
}
