//! Normalization of the booking site's `initialize` payload.
//!
//! The site embeds one JSON object per day with the court catalog under
//! `instructions.set.court_types` and existing reservations under
//! `instructions.set.time_blocked`. Reservation times come in several shapes:
//!
//! ```json
//! {"time_from": {"hours": 22, "minutes": 30}}
//! {"time_from": {"hours": "22", "minutes": "30"}}
//! {"time_from": 22}
//! {"time_from": "22"}
//! {"time_from": "22:30"}
//! ```
//!
//! All of them are folded into [`TimeOfDay`] here so the resolver only ever
//! sees the typed model. Entries that cannot be read at all are dropped and
//! counted. Entries that parse but are out of range (`"hours": 25`) pass
//! through for the resolver to reject.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::court::{BlockedSlot, Court, CourtCatalog, CourtId};
use crate::error::Result;
use crate::time::{Interval, TimeOfDay};

/// One day of normalized vendor data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayPayload {
    pub catalog: CourtCatalog,
    pub blocked_slots: Vec<BlockedSlot>,
    /// Court and reservation entries that could not be normalized.
    pub dropped: usize,
}

#[derive(Debug, Default, Deserialize)]
struct Initialize {
    #[serde(default)]
    instructions: Option<Instructions>,
}

#[derive(Debug, Default, Deserialize)]
struct Instructions {
    #[serde(default)]
    set: Option<SetSection>,
}

#[derive(Debug, Default, Deserialize)]
struct SetSection {
    #[serde(default)]
    court_types: Option<Vec<Value>>,
    #[serde(default)]
    time_blocked: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct RawCourtType {
    name: String,
    #[serde(default)]
    courts: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct RawCourt {
    id: RawNumber,
    number: RawNumber,
}

#[derive(Debug, Deserialize)]
struct RawBlocked {
    court_id: RawNumber,
    time_from: RawTime,
    time_to: RawTime,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Int(u64),
    Text(String),
}

impl RawNumber {
    fn value(&self) -> Option<u64> {
        match self {
            RawNumber::Int(n) => Some(*n),
            RawNumber::Text(s) => s.trim().parse().ok(),
        }
    }

    fn value_u32(&self) -> Option<u32> {
        self.value().and_then(|n| u32::try_from(n).ok())
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTime {
    Parts {
        hours: RawNumber,
        #[serde(default)]
        minutes: Option<RawNumber>,
    },
    Hour(u64),
    Text(String),
}

impl RawTime {
    fn normalize(&self) -> Option<TimeOfDay> {
        match self {
            RawTime::Parts { hours, minutes } => {
                let minutes = match minutes {
                    Some(m) => m.value_u32()?,
                    None => 0,
                };
                Some(TimeOfDay::raw(hours.value_u32()?, minutes))
            }
            RawTime::Hour(h) => Some(TimeOfDay::raw(u32::try_from(*h).ok()?, 0)),
            RawTime::Text(s) => {
                let s = s.trim();
                let (h, m) = s.split_once(':').unwrap_or((s, "0"));
                Some(TimeOfDay::raw(h.trim().parse().ok()?, m.trim().parse().ok()?))
            }
        }
    }
}

/// Parse and normalize an `initialize` payload.
///
/// # Errors
/// Returns `AvailabilityError::Payload` if `json` is not valid JSON or its
/// top-level sections have the wrong type.
pub fn parse_initialize(json: &str) -> Result<DayPayload> {
    let root: Initialize = serde_json::from_str(json)?;
    Ok(normalize(root))
}

/// Like [`parse_initialize`] for an already-decoded value.
pub fn parse_initialize_value(value: Value) -> Result<DayPayload> {
    let root: Initialize = serde_json::from_value(value)?;
    Ok(normalize(root))
}

fn normalize(root: Initialize) -> DayPayload {
    let set = root
        .instructions
        .and_then(|i| i.set)
        .unwrap_or_default();

    let mut dropped = 0;
    let mut courts = Vec::new();
    for entry in set.court_types.unwrap_or_default() {
        let court_type: RawCourtType = match serde_json::from_value(entry) {
            Ok(ct) => ct,
            Err(err) => {
                debug!("dropping court type: {err}");
                dropped += 1;
                continue;
            }
        };
        for raw in court_type.courts.unwrap_or_default() {
            match read_court(raw, &court_type.name) {
                Some(court) => courts.push(court),
                None => dropped += 1,
            }
        }
    }

    let mut blocked_slots = Vec::new();
    for entry in set.time_blocked.unwrap_or_default() {
        match read_blocked(entry) {
            Some(slot) => blocked_slots.push(slot),
            None => dropped += 1,
        }
    }

    debug!(
        courts = courts.len(),
        blocked = blocked_slots.len(),
        dropped,
        "normalized initialize payload"
    );
    DayPayload {
        catalog: CourtCatalog::new(courts),
        blocked_slots,
        dropped,
    }
}

fn read_court(raw: Value, surface: &str) -> Option<Court> {
    let court: RawCourt = serde_json::from_value(raw)
        .map_err(|err| debug!("dropping court entry: {err}"))
        .ok()?;
    Some(Court {
        court_id: CourtId(court.id.value()?),
        number: court.number.value_u32()?,
        surface_category: surface.to_string(),
    })
}

fn read_blocked(raw: Value) -> Option<BlockedSlot> {
    let blocked: RawBlocked = serde_json::from_value(raw)
        .map_err(|err| debug!("dropping time_blocked entry: {err}"))
        .ok()?;
    let start = blocked.time_from.normalize()?;
    let end = blocked.time_to.normalize()?;
    Some(BlockedSlot {
        court_id: CourtId(blocked.court_id.value()?),
        interval: Interval::new(start, end),
    })
}
