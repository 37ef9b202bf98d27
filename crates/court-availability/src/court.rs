//! Court catalog model: courts, existing reservations, and resolved availability.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::time::Interval;

/// Vendor identifier of a bookable court.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourtId(pub u64);

impl fmt::Display for CourtId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A static catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Court {
    pub court_id: CourtId,
    /// Number painted on the court, as shown to players.
    pub number: u32,
    /// Surface category as the vendor names it (e.g. "Грунт" for clay).
    pub surface_category: String,
}

/// An existing reservation occupying part of a court's day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedSlot {
    pub court_id: CourtId,
    pub interval: Interval,
}

/// Free windows for one court, longest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityResult {
    pub court: Court,
    /// Always equal to `all_available_windows[0]`.
    pub best_available_window: Interval,
    /// Every suffix window ending at the close of the evening, longest first.
    pub all_available_windows: Vec<Interval>,
}

/// The courts of one day, across all surface categories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourtCatalog {
    courts: Vec<Court>,
}

impl CourtCatalog {
    pub fn new(courts: Vec<Court>) -> Self {
        CourtCatalog { courts }
    }

    pub fn courts(&self) -> &[Court] {
        &self.courts
    }

    pub fn is_empty(&self) -> bool {
        self.courts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.courts.len()
    }

    /// Courts of one surface category, in catalog order. Exact match on the
    /// vendor's category name.
    pub fn by_surface(&self, surface: &str) -> Vec<Court> {
        self.courts
            .iter()
            .filter(|c| c.surface_category == surface)
            .cloned()
            .collect()
    }

    /// Distinct surface categories in order of first appearance.
    pub fn surfaces(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for court in &self.courts {
            if !seen.contains(&court.surface_category.as_str()) {
                seen.push(court.surface_category.as_str());
            }
        }
        seen
    }
}
