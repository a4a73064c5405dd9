//! Clock-in/out state machine.
//!
//! ```text
//! (none) --clock_in--> active --clock_out--> completed
//!                        |
//!                        +--record_location--> active
//! ```
//!
//! A user has at most one active timesheet. The store enforces this with a
//! conditional insert, so two concurrent clock-ins cannot both succeed.

use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use crate::models::{Coordinates, Location, Timesheet};
use crate::services::access::Authorized;

/// Clock operation failures.
#[derive(Debug, Error)]
pub enum ClockError<E> {
    #[error("Already clocked in")]
    AlreadyClockedIn,

    #[error("Timesheet not found")]
    NotActive,

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Storage error")]
    Store(E),
}

/// Storage for timesheets and their locations.
#[async_trait::async_trait]
pub trait ClockStore: Send + Sync {
    type Error: Send;

    /// Opens an active timesheet and records the entry location in one
    /// transaction. Returns `None` without writing when the user already has
    /// an active timesheet.
    async fn open_timesheet(
        &self,
        user_id: Uuid,
        business_id: Uuid,
        at: Coordinates,
    ) -> Result<Option<Timesheet>, Self::Error>;

    /// Completes the user's active timesheet `timesheet_id` and records the
    /// exit location in one transaction. `None` when no such active
    /// timesheet exists.
    async fn close_timesheet(
        &self,
        user_id: Uuid,
        timesheet_id: Uuid,
        at: Coordinates,
    ) -> Result<Option<Timesheet>, Self::Error>;

    /// Appends a location to the user's active timesheet `timesheet_id`.
    async fn append_location(
        &self,
        user_id: Uuid,
        timesheet_id: Uuid,
        at: Coordinates,
    ) -> Result<Option<Location>, Self::Error>;
}

fn check_coordinates<E>(at: &Coordinates) -> Result<(), ClockError<E>> {
    at.validate().map_err(|errors| {
        let message = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .next()
            .unwrap_or_else(|| "out of range".to_string());
        ClockError::InvalidCoordinates(message)
    })
}

/// Starts a timesheet for the caller.
pub async fn clock_in<S>(
    store: &S,
    caller: &Authorized,
    at: Coordinates,
) -> Result<Timesheet, ClockError<S::Error>>
where
    S: ClockStore + ?Sized,
{
    check_coordinates(&at)?;

    let timesheet = store
        .open_timesheet(caller.user_id, caller.business_id, at)
        .await
        .map_err(ClockError::Store)?
        .ok_or(ClockError::AlreadyClockedIn)?;

    tracing::info!(
        user_id = %caller.user_id,
        timesheet_id = %timesheet.id,
        "Clocked in"
    );
    Ok(timesheet)
}

/// Completes the caller's active timesheet.
pub async fn clock_out<S>(
    store: &S,
    caller: &Authorized,
    timesheet_id: Uuid,
    at: Coordinates,
) -> Result<Timesheet, ClockError<S::Error>>
where
    S: ClockStore + ?Sized,
{
    check_coordinates(&at)?;

    let timesheet = store
        .close_timesheet(caller.user_id, timesheet_id, at)
        .await
        .map_err(ClockError::Store)?
        .ok_or(ClockError::NotActive)?;

    tracing::info!(
        user_id = %caller.user_id,
        timesheet_id = %timesheet.id,
        "Clocked out"
    );
    Ok(timesheet)
}

/// Records a location ping on the caller's active timesheet.
pub async fn record_location<S>(
    store: &S,
    caller: &Authorized,
    timesheet_id: Uuid,
    at: Coordinates,
) -> Result<Location, ClockError<S::Error>>
where
    S: ClockStore + ?Sized,
{
    check_coordinates(&at)?;

    store
        .append_location(caller.user_id, timesheet_id, at)
        .await
        .map_err(ClockError::Store)?
        .ok_or(ClockError::NotActive)
}
