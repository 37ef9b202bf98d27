//! # court-availability
//!
//! Evening court availability for a tennis club's booking site.
//!
//! The booking site reports existing reservations per court. This crate cuts
//! an evening window (usually 22:00-00:00) into half-hour cells, marks the
//! cells each court already has booked, and reports the free windows that
//! run to the close of the evening.
//!
//! ```rust
//! use court_availability::{resolve, BlockedSlot, Court, CourtId, Interval, TimeOfDay};
//!
//! let courts = vec![Court {
//!     court_id: CourtId(41),
//!     number: 4,
//!     surface_category: "Грунт".to_string(),
//! }];
//! let blocked = vec![BlockedSlot {
//!     court_id: CourtId(41),
//!     interval: "22:00-22:30".parse().unwrap(),
//! }];
//!
//! let results = resolve(
//!     &courts,
//!     &blocked,
//!     TimeOfDay::new(22, 0).unwrap(),
//!     TimeOfDay::MIDNIGHT,
//!     30,
//! )
//! .unwrap();
//! assert_eq!(results[0].best_available_window.to_string(), "22:30-00:00");
//! assert_eq!(results[0].all_available_windows.len(), 3);
//! ```
//!
//! ## Modules
//!
//! - [`time`] — `TimeOfDay` and `Interval` with midnight normalization
//! - [`court`] — Court catalog, blocked slots, availability results
//! - [`resolver`] — Suffix-window resolution over half-hour cells
//! - [`payload`] — Normalization of the booking site's `initialize` JSON
//! - [`requests`] — Queued booking requests and their stores
//! - [`error`] — Error types

pub mod court;
pub mod error;
pub mod payload;
pub mod requests;
pub mod resolver;
pub mod time;

pub use court::{AvailabilityResult, BlockedSlot, Court, CourtCatalog, CourtId};
pub use error::AvailabilityError;
pub use payload::{parse_initialize, DayPayload};
pub use requests::{BookingRequest, JsonFileStore, MemoryStore, NewRequest, RequestStatus, RequestStore};
pub use resolver::{resolve, resolve_with_report, Resolution, DEFAULT_CELL_MINUTES};
pub use time::{Interval, TimeOfDay};
