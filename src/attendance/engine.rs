use std::sync::Arc;

use chrono::{Local, NaiveDateTime, SubsecRound};
use tracing::{info, instrument, warn};

use super::geofence;
use super::store::{SessionStore, StoreError};
use crate::error::AppError;
use crate::model::attendance::{
    AttendanceSession, DateRange, GeoPoint, NewSession, SessionEnd, StatusView,
};
use crate::utils::pagination::{Paginated, Pagination};

/// Source of "now" for session timestamps.
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Server local time, whole seconds.
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(0)
}

const ALREADY_OPEN: &str = "You already have an active session. Please clock-out first.";
const NOT_OPEN: &str = "No active session found. Please clock-in first.";

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::OpenSessionExists => AppError::Conflict(ALREADY_OPEN.to_string()),
            StoreError::Database(e) => AppError::Database(e),
        }
    }
}

/// Clock-in, clock-out and status for one employee at a time.
///
/// Operations for different employees never touch the same rows, so the
/// engine itself holds no locks.
pub struct AttendanceEngine<S> {
    store: S,
    clock: Clock,
}

impl<S: SessionStore> AttendanceEngine<S> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, Arc::new(local_now))
    }

    pub fn with_clock(store: S, clock: Clock) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Opens a session at `point`, classified against the current offices.
    #[instrument(name = "attendance_clock_in", skip(self, point, photo_ref))]
    pub async fn clock_in(
        &self,
        employee_id: u64,
        point: GeoPoint,
        photo_ref: Option<String>,
    ) -> Result<AttendanceSession, AppError> {
        if let Some(open) = self.store.find_open_session(employee_id).await? {
            info!(session_id = open.id, "Clock-in rejected: session already open");
            return Err(AppError::Conflict(ALREADY_OPEN.to_string()));
        }

        let offices = self.store.list_office_locations().await?;
        let classification = geofence::classify(point, &offices);
        let now = (self.clock)();

        let new_session = NewSession {
            employee_id,
            work_date: now.date(),
            start_time: now,
            work_mode: classification.mode,
            office_id: classification.office.map(|o| o.id),
            office_name: classification.office.map(|o| o.name.clone()),
            clock_in_location: point,
            clock_in_photo_ref: photo_ref,
        };

        match self.store.insert_session(new_session).await {
            Ok(session) => {
                info!(
                    session_id = session.id,
                    work_mode = session.work_mode.as_str(),
                    office_id = session.office_id,
                    "Clocked in"
                );
                Ok(session)
            }
            Err(StoreError::OpenSessionExists) => {
                warn!("Clock-in rejected by open-session constraint");
                Err(AppError::Conflict(ALREADY_OPEN.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Closes the employee's open session at `point`.
    #[instrument(name = "attendance_clock_out", skip(self, point, photo_ref))]
    pub async fn clock_out(
        &self,
        employee_id: u64,
        point: GeoPoint,
        photo_ref: Option<String>,
    ) -> Result<AttendanceSession, AppError> {
        let Some(open) = self.store.find_open_session(employee_id).await? else {
            info!("Clock-out rejected: no open session");
            return Err(AppError::PreconditionFailed(NOT_OPEN.to_string()));
        };

        let end = SessionEnd {
            end_time: (self.clock)().max(open.start_time),
            clock_out_location: point,
            clock_out_photo_ref: photo_ref,
        };

        match self.store.close_session(employee_id, open.id, end).await? {
            Some(closed) => {
                info!(session_id = closed.id, "Clocked out");
                Ok(closed)
            }
            None => {
                warn!(session_id = open.id, "Session was closed concurrently");
                Err(AppError::PreconditionFailed(NOT_OPEN.to_string()))
            }
        }
    }

    /// Projects the most recently started session into a status view.
    #[instrument(name = "attendance_status", skip(self))]
    pub async fn status(&self, employee_id: u64) -> Result<StatusView, AppError> {
        let latest = self.store.find_most_recent_session(employee_id).await?;
        Ok(StatusView::from_latest(latest.as_ref()))
    }

    #[instrument(name = "attendance_history", skip(self))]
    pub async fn history(
        &self,
        employee_id: u64,
        range: DateRange,
        page: Pagination,
    ) -> Result<Paginated<AttendanceSession>, AppError> {
        let (sessions, total) = self.store.list_sessions(employee_id, range, page).await?;
        Ok(Paginated::new(sessions, total, page))
    }
}
