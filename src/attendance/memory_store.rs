//! In-memory [`SessionStore`] for tests.
//!
//! The open-session check and the insert happen under one lock, which is the
//! same guarantee the MySQL unique key gives.

use std::cmp::Reverse;
use std::sync::{Arc, Mutex, MutexGuard};

use super::store::{SessionStore, StoreError, StoreResult};
use crate::model::attendance::{AttendanceSession, DateRange, NewSession, SessionEnd};
use crate::model::office_location::OfficeLocation;
use crate::utils::pagination::Pagination;

#[derive(Default)]
struct State {
    sessions: Vec<AttendanceSession>,
    offices: Arc<Vec<OfficeLocation>>,
    next_id: u64,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn with_offices(offices: Vec<OfficeLocation>) -> Self {
        Self {
            state: Mutex::new(State {
                offices: Arc::new(offices),
                ..State::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn sessions_of(&self, employee_id: u64) -> Vec<AttendanceSession> {
        self.lock()
            .sessions
            .iter()
            .filter(|s| s.employee_id == employee_id)
            .cloned()
            .collect()
    }

    pub fn open_count(&self, employee_id: u64) -> usize {
        self.lock()
            .sessions
            .iter()
            .filter(|s| s.employee_id == employee_id && s.is_open())
            .count()
    }

    fn latest_where(
        &self,
        employee_id: u64,
        pred: impl Fn(&AttendanceSession) -> bool,
    ) -> Option<AttendanceSession> {
        self.lock()
            .sessions
            .iter()
            .filter(|s| s.employee_id == employee_id && pred(s))
            .max_by_key(|s| (s.start_time, s.id))
            .cloned()
    }
}

impl SessionStore for MemoryStore {
    async fn find_open_session(&self, employee_id: u64) -> StoreResult<Option<AttendanceSession>> {
        Ok(self.latest_where(employee_id, AttendanceSession::is_open))
    }

    async fn find_most_recent_session(
        &self,
        employee_id: u64,
    ) -> StoreResult<Option<AttendanceSession>> {
        Ok(self.latest_where(employee_id, |_| true))
    }

    async fn insert_session(&self, new: NewSession) -> StoreResult<AttendanceSession> {
        let mut state = self.lock();
        if state
            .sessions
            .iter()
            .any(|s| s.employee_id == new.employee_id && s.is_open())
        {
            return Err(StoreError::OpenSessionExists);
        }

        state.next_id += 1;
        let session = AttendanceSession {
            id: state.next_id,
            employee_id: new.employee_id,
            work_date: new.work_date,
            start_time: new.start_time,
            end_time: None,
            work_mode: new.work_mode,
            office_id: new.office_id,
            office_name: new.office_name,
            clock_in_location: new.clock_in_location,
            clock_out_location: None,
            clock_in_photo_ref: new.clock_in_photo_ref,
            clock_out_photo_ref: None,
        };
        state.sessions.push(session.clone());
        Ok(session)
    }

    async fn close_session(
        &self,
        employee_id: u64,
        session_id: u64,
        end: SessionEnd,
    ) -> StoreResult<Option<AttendanceSession>> {
        let mut state = self.lock();
        let Some(session) = state
            .sessions
            .iter_mut()
            .find(|s| s.id == session_id && s.employee_id == employee_id && s.is_open())
        else {
            return Ok(None);
        };

        session.end_time = Some(end.end_time);
        session.clock_out_location = Some(end.clock_out_location);
        session.clock_out_photo_ref = end.clock_out_photo_ref;
        Ok(Some(session.clone()))
    }

    async fn list_office_locations(&self) -> StoreResult<Arc<Vec<OfficeLocation>>> {
        Ok(self.lock().offices.clone())
    }

    async fn list_sessions(
        &self,
        employee_id: u64,
        range: DateRange,
        page: Pagination,
    ) -> StoreResult<(Vec<AttendanceSession>, i64)> {
        let mut matching: Vec<AttendanceSession> = self
            .lock()
            .sessions
            .iter()
            .filter(|s| s.employee_id == employee_id && range.contains(s.work_date))
            .cloned()
            .collect();
        matching.sort_by_key(|s| Reverse((s.work_date, s.start_time, s.id)));

        let total = matching.len() as i64;
        let data = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .collect();
        Ok((data, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::{GeoPoint, WorkMode};
    use chrono::NaiveDate;

    fn new_session(employee_id: u64) -> NewSession {
        let start = NaiveDate::from_ymd_opt(2026, 4, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        NewSession {
            employee_id,
            work_date: start.date(),
            start_time: start,
            work_mode: WorkMode::Remote,
            office_id: None,
            office_name: None,
            clock_in_location: GeoPoint::new(0.0, 0.0),
            clock_in_photo_ref: None,
        }
    }

    #[actix_web::test]
    async fn second_open_insert_is_refused() {
        let store = MemoryStore::default();
        store.insert_session(new_session(1)).await.unwrap();

        let err = store.insert_session(new_session(1)).await.unwrap_err();
        assert!(matches!(err, StoreError::OpenSessionExists));

        // other employees are unaffected
        store.insert_session(new_session(2)).await.unwrap();
        assert_eq!(store.open_count(1), 1);
        assert_eq!(store.open_count(2), 1);
    }

    #[actix_web::test]
    async fn closing_is_one_shot_and_owner_scoped() {
        let store = MemoryStore::default();
        let open = store.insert_session(new_session(1)).await.unwrap();
        let end = SessionEnd {
            end_time: open.start_time,
            clock_out_location: GeoPoint::new(0.0, 0.0),
            clock_out_photo_ref: None,
        };

        assert!(store.close_session(2, open.id, end.clone()).await.unwrap().is_none());
        assert!(store.close_session(1, open.id, end.clone()).await.unwrap().is_some());
        assert!(store.close_session(1, open.id, end).await.unwrap().is_none());
    }
}
