pub mod attendance;
pub mod attendance_request;
pub mod office_location;
pub mod role;
