pub mod attendance;
pub mod employee;
pub mod leave;
pub mod overtime;
pub mod schedule;
pub mod shift;
pub mod transaction;
pub mod user;
pub mod work_location;
