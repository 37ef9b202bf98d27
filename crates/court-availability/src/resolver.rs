//! Suffix-window availability resolution over fixed half-hour cells.
//!
//! The evening window is cut into equal cells. A cell is blocked for a court
//! when any of the court's reservations overlaps it. The only availability
//! reported is the run of free cells ending at the close of the window, and
//! every shorter tail of that run. A free stretch followed by a blocked cell
//! does not count, because a booking must run to the end of the evening.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::court::{AvailabilityResult, BlockedSlot, Court, CourtId};
use crate::error::{AvailabilityError, Result};
use crate::time::{Interval, TimeOfDay, GRANULARITY_MINUTES};

/// Cell size used by the booking site.
pub const DEFAULT_CELL_MINUTES: u32 = 30;

/// A blocked slot that was skipped because one of its times is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedSlot {
    pub slot: BlockedSlot,
    pub reason: String,
}

/// Results of one resolution call plus the slots recovered as non-blocking.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Resolution {
    /// One entry per court with at least one free tail cell, in catalog order.
    pub results: Vec<AvailabilityResult>,
    /// Slots that failed with `InvalidTime` and were treated as non-blocking.
    pub rejected: Vec<RejectedSlot>,
}

/// Compute the free suffix windows of each court within `[window_start, window_end)`.
///
/// Courts with no free cell adjacent to `window_end` are left out. Blocked
/// slots for courts outside `court_catalog` are ignored. A slot with a
/// malformed time is logged and treated as non-blocking.
///
/// # Arguments
///
/// * `court_catalog` — The courts to check, typically one surface category.
/// * `blocked_slots` — Existing reservations for the day.
/// * `window_start` — Opening of the evening window.
/// * `window_end` — Close of the evening window; `00:00` means midnight.
/// * `cell_minutes` — Cell size, a positive multiple of 30 minutes.
///
/// # Errors
/// Returns `AvailabilityError::InvalidInput` if the catalog is empty, or the
/// window is malformed, empty, or not a whole number of cells.
pub fn resolve(
    court_catalog: &[Court],
    blocked_slots: &[BlockedSlot],
    window_start: TimeOfDay,
    window_end: TimeOfDay,
    cell_minutes: u32,
) -> Result<Vec<AvailabilityResult>> {
    resolve_with_report(
        court_catalog,
        blocked_slots,
        window_start,
        window_end,
        cell_minutes,
    )
    .map(|resolution| resolution.results)
}

/// Same as [`resolve`], also reporting which blocked slots were rejected.
pub fn resolve_with_report(
    court_catalog: &[Court],
    blocked_slots: &[BlockedSlot],
    window_start: TimeOfDay,
    window_end: TimeOfDay,
    cell_minutes: u32,
) -> Result<Resolution> {
    if court_catalog.is_empty() {
        return Err(AvailabilityError::InvalidInput(
            "court catalog is empty".to_string(),
        ));
    }
    let cells = partition_window(window_start, window_end, cell_minutes)?;

    let known: HashSet<CourtId> = court_catalog.iter().map(|c| c.court_id).collect();
    let mut busy: HashMap<CourtId, Vec<(u32, u32)>> = HashMap::new();
    let mut rejected = Vec::new();

    for slot in blocked_slots {
        if !known.contains(&slot.court_id) {
            continue;
        }
        match slot.interval.span() {
            Ok(Some(span)) => busy.entry(slot.court_id).or_default().push(span),
            // Zero-length and inverted slots occupy nothing.
            Ok(None) => {}
            Err(err) => {
                warn!(
                    court_id = %slot.court_id,
                    interval = %slot.interval,
                    "treating malformed blocked slot as free: {err}"
                );
                rejected.push(RejectedSlot {
                    slot: *slot,
                    reason: err.to_string(),
                });
            }
        }
    }

    let results = court_catalog
        .iter()
        .filter_map(|court| {
            let spans = busy
                .get(&court.court_id)
                .map(Vec::as_slice)
                .unwrap_or_default();
            let blocked: Vec<bool> = cells
                .iter()
                .map(|&(a, b)| spans.iter().any(|&(c, d)| a < d && c < b))
                .collect();
            let free_tail = blocked.iter().rev().take_while(|b| !**b).count();
            debug!(
                court = court.number,
                ?blocked,
                free_tail,
                "resolved court cells"
            );
            suffix_windows(&cells, free_tail, window_end).map(|windows| AvailabilityResult {
                court: court.clone(),
                best_available_window: windows[0],
                all_available_windows: windows,
            })
        })
        .collect();

    Ok(Resolution { results, rejected })
}

/// Split the window into chronological `(start, end)` minute cells.
fn partition_window(
    window_start: TimeOfDay,
    window_end: TimeOfDay,
    cell_minutes: u32,
) -> Result<Vec<(u32, u32)>> {
    if cell_minutes == 0 || cell_minutes % GRANULARITY_MINUTES != 0 {
        return Err(AvailabilityError::InvalidInput(format!(
            "cell size must be a positive multiple of {GRANULARITY_MINUTES} minutes, got {cell_minutes}"
        )));
    }
    let window = Interval::new(window_start, window_end);
    let (start, end) = window
        .span()
        .map_err(|err| AvailabilityError::InvalidInput(format!("window bound: {err}")))?
        .ok_or_else(|| AvailabilityError::InvalidInput(format!("window {window} is empty")))?;
    if (end - start) % cell_minutes != 0 {
        return Err(AvailabilityError::InvalidInput(format!(
            "window {window} does not divide into {cell_minutes}-minute cells"
        )));
    }
    Ok((start..end)
        .step_by(cell_minutes as usize)
        .map(|m| (m, m + cell_minutes))
        .collect())
}

/// Windows for tail lengths `free_tail` down to 1, or `None` when nothing
/// at the end of the evening is free.
fn suffix_windows(
    cells: &[(u32, u32)],
    free_tail: usize,
    window_end: TimeOfDay,
) -> Option<Vec<Interval>> {
    if free_tail == 0 {
        return None;
    }
    let n = cells.len();
    Some(
        (1..=free_tail)
            .rev()
            .map(|len| Interval::new(TimeOfDay::from_minute_of_day(cells[n - len].0), window_end))
            .collect(),
    )
}
