//! Persistence boundary of the attendance engine.
//!
//! Every method is a single atomic statement against the backing store. The
//! "one open session per employee" rule is enforced here, by the store, not by
//! the engine's read-then-write sequence.

use std::future::Future;
use std::sync::Arc;

use derive_more::Display;

use crate::model::attendance::{AttendanceSession, DateRange, NewSession, SessionEnd};
use crate::model::office_location::OfficeLocation;
use crate::utils::pagination::Pagination;

#[derive(Debug, Display)]
pub enum StoreError {
    /// The employee already holds an open session.
    #[display(fmt = "employee already has an open session")]
    OpenSessionExists,

    #[display(fmt = "{}", _0)]
    Database(sqlx::Error),
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Database(e) => Some(e),
            StoreError::OpenSessionExists => None,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Database(e)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

pub trait SessionStore: Send + Sync {
    /// The employee's open session, most recently started first if the
    /// invariant was ever violated.
    fn find_open_session(
        &self,
        employee_id: u64,
    ) -> impl Future<Output = StoreResult<Option<AttendanceSession>>> + Send + '_;

    /// The employee's most recently started session, open or closed.
    fn find_most_recent_session(
        &self,
        employee_id: u64,
    ) -> impl Future<Output = StoreResult<Option<AttendanceSession>>> + Send + '_;

    /// Inserts an open session. Fails with [`StoreError::OpenSessionExists`]
    /// when the employee already has one; the check and the insert are atomic.
    fn insert_session(
        &self,
        session: NewSession,
    ) -> impl Future<Output = StoreResult<AttendanceSession>> + Send + '_;

    /// Closes the session if it belongs to `employee_id` and is still open.
    /// Returns `None` when no such open session exists.
    fn close_session(
        &self,
        employee_id: u64,
        session_id: u64,
        end: SessionEnd,
    ) -> impl Future<Output = StoreResult<Option<AttendanceSession>>> + Send + '_;

    /// All offices, in the order geofence matching should try them.
    fn list_office_locations(
        &self,
    ) -> impl Future<Output = StoreResult<Arc<Vec<OfficeLocation>>>> + Send + '_;

    /// One page of the employee's sessions with `work_date` in `range`,
    /// newest first, plus the total number of matching rows.
    fn list_sessions(
        &self,
        employee_id: u64,
        range: DateRange,
        page: Pagination,
    ) -> impl Future<Output = StoreResult<(Vec<AttendanceSession>, i64)>> + Send + '_;
}
