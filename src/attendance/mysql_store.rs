use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use sqlx::MySqlPool;

use super::store::{SessionStore, StoreError, StoreResult};
use crate::db::is_duplicate_key;
use crate::model::attendance::{
    AttendanceSession, DateRange, GeoPoint, NewSession, SessionEnd, WorkMode,
};
use crate::model::office_location::OfficeLocation;
use crate::utils::office_cache::OfficeCache;
use crate::utils::pagination::Pagination;

const SESSION_COLUMNS: &str = "id, employee_id, work_date, start_time, end_time, work_mode, \
     office_id, office_name, ci_latitude, ci_longitude, co_latitude, co_longitude, \
     clock_in_photo, clock_out_photo";

/// Raw `attendance_sessions` row.
#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    id: u64,
    employee_id: u64,
    work_date: NaiveDate,
    start_time: NaiveDateTime,
    end_time: Option<NaiveDateTime>,
    work_mode: String,
    office_id: Option<u64>,
    office_name: Option<String>,
    ci_latitude: f64,
    ci_longitude: f64,
    co_latitude: Option<f64>,
    co_longitude: Option<f64>,
    clock_in_photo: Option<String>,
    clock_out_photo: Option<String>,
}

impl TryFrom<SessionRow> for AttendanceSession {
    type Error = sqlx::Error;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        let work_mode = row
            .work_mode
            .parse()
            .map_err(|e: strum::ParseError| sqlx::Error::Decode(Box::new(e)))?;

        let clock_out_location = match (row.co_latitude, row.co_longitude) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
            _ => None,
        };

        Ok(Self {
            id: row.id,
            employee_id: row.employee_id,
            work_date: row.work_date,
            start_time: row.start_time,
            end_time: row.end_time,
            work_mode,
            office_id: row.office_id,
            office_name: row.office_name,
            clock_in_location: GeoPoint::new(row.ci_latitude, row.ci_longitude),
            clock_out_location,
            clock_in_photo_ref: row.clock_in_photo,
            clock_out_photo_ref: row.clock_out_photo,
        })
    }
}

fn into_sessions(rows: Vec<SessionRow>) -> Result<Vec<AttendanceSession>, sqlx::Error> {
    rows.into_iter().map(AttendanceSession::try_from).collect()
}

/// Filters of the cross-employee admin listing.
#[derive(Debug, Default)]
pub struct SessionFilter {
    pub employee_id: Option<u64>,
    pub work_mode: Option<WorkMode>,
    pub range: DateRange,
}

enum FilterValue {
    U64(u64),
    Str(&'static str),
    Date(NaiveDate),
}

/// [`SessionStore`] over MySQL.
///
/// The `uq_attendance_open_session` unique key makes a second open session
/// for the same employee fail at insert time.
#[derive(Clone)]
pub struct MySqlSessionStore {
    pool: MySqlPool,
    offices: OfficeCache,
}

impl MySqlSessionStore {
    pub fn new(pool: MySqlPool, offices: OfficeCache) -> Self {
        Self { pool, offices }
    }

    pub async fn find_by_id(&self, id: u64) -> Result<Option<AttendanceSession>, sqlx::Error> {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM attendance_sessions WHERE id = ?");
        sqlx::query_as::<_, SessionRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(AttendanceSession::try_from)
            .transpose()
    }

    /// Sessions of every employee matching `filter`, newest first.
    pub async fn list_all(
        &self,
        filter: &SessionFilter,
        page: Pagination,
    ) -> Result<(Vec<AttendanceSession>, i64), sqlx::Error> {
        let mut where_sql = String::from(" WHERE 1=1");
        let mut args: Vec<FilterValue> = Vec::new();

        if let Some(id) = filter.employee_id {
            where_sql.push_str(" AND employee_id = ?");
            args.push(FilterValue::U64(id));
        }
        if let Some(mode) = filter.work_mode {
            where_sql.push_str(" AND work_mode = ?");
            args.push(FilterValue::Str(mode.as_str()));
        }
        if let Some(start) = filter.range.start {
            where_sql.push_str(" AND work_date >= ?");
            args.push(FilterValue::Date(start));
        }
        if let Some(end) = filter.range.end {
            where_sql.push_str(" AND work_date <= ?");
            args.push(FilterValue::Date(end));
        }

        let count_sql = format!("SELECT COUNT(*) FROM attendance_sessions{where_sql}");
        let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
        for arg in &args {
            count_q = match arg {
                FilterValue::U64(v) => count_q.bind(*v),
                FilterValue::Str(s) => count_q.bind(*s),
                FilterValue::Date(d) => count_q.bind(*d),
            };
        }
        let total = count_q.fetch_one(&self.pool).await?;

        let data_sql = format!(
            "SELECT {SESSION_COLUMNS} FROM attendance_sessions{where_sql} \
             ORDER BY work_date DESC, start_time DESC, id DESC LIMIT ? OFFSET ?"
        );
        let mut data_q = sqlx::query_as::<_, SessionRow>(&data_sql);
        for arg in args {
            data_q = match arg {
                FilterValue::U64(v) => data_q.bind(v),
                FilterValue::Str(s) => data_q.bind(s),
                FilterValue::Date(d) => data_q.bind(d),
            };
        }
        let rows = data_q
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok((into_sessions(rows)?, total))
    }

    async fn fetch_one_where(
        &self,
        condition: &str,
        employee_id: u64,
    ) -> Result<Option<AttendanceSession>, sqlx::Error> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM attendance_sessions \
             WHERE employee_id = ? {condition} \
             ORDER BY start_time DESC, id DESC LIMIT 1"
        );
        sqlx::query_as::<_, SessionRow>(&sql)
            .bind(employee_id)
            .fetch_optional(&self.pool)
            .await?
            .map(AttendanceSession::try_from)
            .transpose()
    }
}

impl SessionStore for MySqlSessionStore {
    async fn find_open_session(&self, employee_id: u64) -> StoreResult<Option<AttendanceSession>> {
        Ok(self
            .fetch_one_where("AND end_time IS NULL", employee_id)
            .await?)
    }

    async fn find_most_recent_session(
        &self,
        employee_id: u64,
    ) -> StoreResult<Option<AttendanceSession>> {
        Ok(self.fetch_one_where("", employee_id).await?)
    }

    async fn insert_session(&self, session: NewSession) -> StoreResult<AttendanceSession> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendance_sessions
                (employee_id, work_date, start_time, work_mode, office_id, office_name,
                 ci_latitude, ci_longitude, clock_in_photo)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(session.employee_id)
        .bind(session.work_date)
        .bind(session.start_time)
        .bind(session.work_mode.as_str())
        .bind(session.office_id)
        .bind(session.office_name.as_deref())
        .bind(session.clock_in_location.latitude)
        .bind(session.clock_in_location.longitude)
        .bind(session.clock_in_photo_ref.as_deref())
        .execute(&self.pool)
        .await;

        let result = match result {
            Ok(r) => r,
            Err(e) if is_duplicate_key(&e) => return Err(StoreError::OpenSessionExists),
            Err(e) => return Err(e.into()),
        };

        self.find_by_id(result.last_insert_id())
            .await?
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))
    }

    async fn close_session(
        &self,
        employee_id: u64,
        session_id: u64,
        end: SessionEnd,
    ) -> StoreResult<Option<AttendanceSession>> {
        let result = sqlx::query(
            r#"
            UPDATE attendance_sessions
            SET end_time = ?, co_latitude = ?, co_longitude = ?, clock_out_photo = ?
            WHERE id = ?
            AND employee_id = ?
            AND end_time IS NULL
            "#,
        )
        .bind(end.end_time)
        .bind(end.clock_out_location.latitude)
        .bind(end.clock_out_location.longitude)
        .bind(end.clock_out_photo_ref.as_deref())
        .bind(session_id)
        .bind(employee_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Ok(self.find_by_id(session_id).await?)
    }

    async fn list_office_locations(&self) -> StoreResult<Arc<Vec<OfficeLocation>>> {
        Ok(self.offices.get_or_load(&self.pool).await?)
    }

    async fn list_sessions(
        &self,
        employee_id: u64,
        range: DateRange,
        page: Pagination,
    ) -> StoreResult<(Vec<AttendanceSession>, i64)> {
        let filter = SessionFilter {
            employee_id: Some(employee_id),
            work_mode: None,
            range,
        };
        Ok(self.list_all(&filter, page).await?)
    }
}
