pub mod file_upload;
pub mod rating;
pub mod user;

pub use file_upload::*;
pub use rating::*;
pub use user::*;

use chrono::{DateTime, SecondsFormat, Utc};

/// Render a timestamp the way the backend records store it: `2024-01-31T09:15:00.000Z`.
pub fn iso_timestamp(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}
