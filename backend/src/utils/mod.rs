pub mod geo;
pub mod jwt;
pub mod password;
pub mod time;

pub use geo::*;
pub use jwt::*;
pub use password::*;
pub use time::*;
