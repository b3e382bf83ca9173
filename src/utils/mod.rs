pub mod date_filter;
pub mod office_cache;
pub mod pagination;
pub mod validation;
