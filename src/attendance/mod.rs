//! Attendance session lifecycle: geofence classification, the session engine
//! and the stores it runs on.

pub mod engine;
pub mod geofence;
#[cfg(test)]
pub mod memory_store;
pub mod mysql_store;
pub mod store;

pub use engine::AttendanceEngine;
pub use mysql_store::MySqlSessionStore;
