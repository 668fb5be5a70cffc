#![forbid(unsafe_code)]

pub mod day;
pub mod error;
pub mod model;
pub mod time;

pub use day::DayKey;
pub use time::Clock;
