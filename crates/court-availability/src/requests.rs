//! Queued booking requests and the store that persists them.
//!
//! A request names a date, a start time and a duration. Each availability
//! check is recorded on the request so that a scheduler can retry open
//! requests until the date opens for booking, then hand the matching court
//! to the booking collaborator.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::court::AvailabilityResult;
use crate::error::{AvailabilityError, Result};
use crate::time::{Interval, TimeOfDay, GRANULARITY_MINUTES, MINUTES_PER_DAY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Pending,
    /// Checked, but the date had no free courts yet.
    Waiting,
    Completed,
    Failed,
}

impl RequestStatus {
    /// Pending and waiting requests are still worth checking.
    pub fn is_open(self) -> bool {
        matches!(self, RequestStatus::Pending | RequestStatus::Waiting)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Waiting => "waiting",
            RequestStatus::Completed => "completed",
            RequestStatus::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A fresh request before the store assigns its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRequest {
    pub date: NaiveDate,
    pub time_from: TimeOfDay,
    pub duration_minutes: u32,
    pub description: String,
}

impl NewRequest {
    /// See [`BookingRequest::target_window`].
    pub fn target_window(&self) -> Result<Interval> {
        window_for(self.time_from, self.duration_minutes)
    }
}

fn window_for(time_from: TimeOfDay, duration_minutes: u32) -> Result<Interval> {
    let start = time_from
        .minute_of_day()
        .map_err(|err| AvailabilityError::InvalidInput(err.to_string()))?;
    if duration_minutes == 0 || duration_minutes % GRANULARITY_MINUTES != 0 {
        return Err(AvailabilityError::InvalidInput(format!(
            "duration {duration_minutes} is not a positive multiple of {GRANULARITY_MINUTES} minutes"
        )));
    }
    let end = start + duration_minutes;
    if end > MINUTES_PER_DAY {
        return Err(AvailabilityError::InvalidInput(format!(
            "{time_from} + {duration_minutes} min runs past midnight"
        )));
    }
    Ok(Interval::new(time_from, TimeOfDay::from_minute_of_day(end)))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub id: u64,
    pub date: NaiveDate,
    pub time_from: TimeOfDay,
    pub duration_minutes: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_check: Option<DateTime<Utc>>,
    #[serde(default)]
    pub attempts: u32,
    /// Result or error message from the last transition.
    #[serde(default)]
    pub outcome: Option<String>,
}

impl BookingRequest {
    /// The window this request wants booked.
    ///
    /// # Errors
    /// Returns `AvailabilityError::InvalidInput` if the duration is not a
    /// positive multiple of 30 minutes or the window runs past midnight.
    pub fn target_window(&self) -> Result<Interval> {
        window_for(self.time_from, self.duration_minutes)
            .map_err(|err| AvailabilityError::InvalidInput(format!("request #{}: {err}", self.id)))
    }

    /// First result, in catalog order, offering exactly the target window.
    pub fn find_match<'a>(
        &self,
        results: &'a [AvailabilityResult],
    ) -> Result<Option<&'a AvailabilityResult>> {
        let target = self.target_window()?;
        Ok(results
            .iter()
            .find(|r| r.all_available_windows.contains(&target)))
    }

    /// Record an availability check against freshly resolved `results`.
    ///
    /// No results at all means the date is not open yet and the request
    /// waits. Results without the target window fail the request. A match
    /// leaves the request pending and is returned for booking.
    pub fn record_check<'a>(
        &mut self,
        results: &'a [AvailabilityResult],
        now: DateTime<Utc>,
    ) -> Result<Option<&'a AvailabilityResult>> {
        let target = self.target_window()?;
        self.attempts += 1;
        self.last_check = Some(now);

        if results.is_empty() {
            self.status = RequestStatus::Waiting;
            self.outcome = Some(format!("no free courts on {} yet", self.date));
            debug!(id = self.id, "request waiting");
            return Ok(None);
        }

        match self.find_match(results)? {
            Some(found) => {
                self.status = RequestStatus::Pending;
                self.outcome = Some(format!("court #{} offers {target}", found.court.number));
                info!(id = self.id, court = found.court.number, %target, "request matched");
                Ok(Some(found))
            }
            None => {
                self.status = RequestStatus::Failed;
                self.outcome = Some(format!("no court offers {target}"));
                info!(id = self.id, %target, "request has no matching court");
                Ok(None)
            }
        }
    }

    /// Record the booking collaborator's answer.
    pub fn record_booking(&mut self, success: bool, message: impl Into<String>, now: DateTime<Utc>) {
        self.status = if success {
            RequestStatus::Completed
        } else {
            RequestStatus::Failed
        };
        self.last_check = Some(now);
        self.outcome = Some(message.into());
    }
}

/// Persistence for booking requests, keyed by id.
pub trait RequestStore {
    /// All requests in insertion order.
    fn list(&self) -> Result<Vec<BookingRequest>>;

    fn get(&self, id: u64) -> Result<Option<BookingRequest>> {
        Ok(self.list()?.into_iter().find(|r| r.id == id))
    }

    /// Store a new pending request and return it with its assigned id.
    ///
    /// # Errors
    /// Returns `AvailabilityError::InvalidInput` if the requested window is
    /// not bookable (see [`BookingRequest::target_window`]).
    fn insert(&mut self, request: NewRequest, now: DateTime<Utc>) -> Result<BookingRequest>;

    /// Replace the stored request with the same id.
    ///
    /// # Errors
    /// Returns `AvailabilityError::UnknownRequest` if no such id is stored.
    fn update(&mut self, request: &BookingRequest) -> Result<()>;

    /// Requests that are still pending or waiting.
    fn open_requests(&self) -> Result<Vec<BookingRequest>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|r| r.status.is_open())
            .collect())
    }
}

fn build_request(
    existing: &[BookingRequest],
    request: NewRequest,
    now: DateTime<Utc>,
) -> Result<BookingRequest> {
    request.target_window()?;
    let id = existing.iter().map(|r| r.id).max().unwrap_or(0) + 1;
    Ok(BookingRequest {
        id,
        date: request.date,
        time_from: request.time_from,
        duration_minutes: request.duration_minutes,
        description: request.description,
        status: RequestStatus::Pending,
        created_at: now,
        last_check: None,
        attempts: 0,
        outcome: None,
    })
}

fn replace(requests: &mut [BookingRequest], request: &BookingRequest) -> Result<()> {
    let slot = requests
        .iter_mut()
        .find(|r| r.id == request.id)
        .ok_or(AvailabilityError::UnknownRequest(request.id))?;
    *slot = request.clone();
    Ok(())
}

/// In-process store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    requests: Vec<BookingRequest>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RequestStore for MemoryStore {
    fn list(&self) -> Result<Vec<BookingRequest>> {
        Ok(self.requests.clone())
    }

    fn insert(&mut self, request: NewRequest, now: DateTime<Utc>) -> Result<BookingRequest> {
        let stored = build_request(&self.requests, request, now)?;
        self.requests.push(stored.clone());
        Ok(stored)
    }

    fn update(&mut self, request: &BookingRequest) -> Result<()> {
        replace(&mut self.requests, request)
    }
}

/// Store backed by a pretty-printed JSON array on disk.
///
/// A missing file reads as an empty store. Every write replaces the file via
/// a sibling temp file and a rename.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<BookingRequest>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&text).map_err(|err| {
            AvailabilityError::Store(format!("{}: {err}", self.path.display()))
        })
    }

    fn save(&self, requests: &[BookingRequest]) -> Result<()> {
        let json = serde_json::to_string_pretty(requests)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), count = requests.len(), "saved booking requests");
        Ok(())
    }
}

impl RequestStore for JsonFileStore {
    fn list(&self) -> Result<Vec<BookingRequest>> {
        self.load()
    }

    fn insert(&mut self, request: NewRequest, now: DateTime<Utc>) -> Result<BookingRequest> {
        let mut requests = self.load()?;
        let stored = build_request(&requests, request, now)?;
        requests.push(stored.clone());
        self.save(&requests)?;
        Ok(stored)
    }

    fn update(&mut self, request: &BookingRequest) -> Result<()> {
        let mut requests = self.load()?;
        replace(&mut requests, request)?;
        self.save(&requests)
    }
}
