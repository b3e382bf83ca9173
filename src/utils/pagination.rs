use serde::Serialize;
use utoipa::ToSchema;

use crate::model::attendance::AttendanceSession;
use crate::model::attendance_request::AttendanceRequest;
use crate::model::office_location::OfficeLocation;

pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    /// Non-positive values fall back to the defaults; `limit` is capped.
    pub fn sanitize(page: Option<i64>, limit: Option<i64>) -> Self {
        let limit = match limit {
            Some(l) if l > 0 => l.min(MAX_LIMIT as i64) as u32,
            _ => DEFAULT_LIMIT,
        };
        let page = match page {
            Some(p) if p > 0 => p.min(u32::MAX as i64) as u32,
            _ => 1,
        };
        Self { page, limit }
    }

    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PageMeta {
    #[schema(example = 42)]
    pub total: i64,
    #[schema(example = 10)]
    pub limit: u32,
    #[schema(example = 1)]
    pub page: u32,
}

#[derive(Debug, Serialize, ToSchema)]
#[aliases(
    SessionPage = Paginated<AttendanceSession>,
    OfficeLocationPage = Paginated<OfficeLocation>,
    AttendanceRequestPage = Paginated<AttendanceRequest>
)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: PageMeta,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total: i64, page: Pagination) -> Self {
        Self {
            data,
            pagination: PageMeta {
                total,
                limit: page.limit,
                page: page.page,
            },
        }
    }
}
