pub mod booking;
pub mod catalogue;
pub mod schedule;
pub mod user;
