pub mod accounts;
pub mod bookings;
pub mod matches;
pub mod teams;
