use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::iso_timestamp;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Rating {
    pub id: String,
    #[serde(default)]
    pub rate: f64,
    #[serde(default)]
    pub comment: String,
    /// ISO-8601 timestamp
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub classname: String,
}

/// Record body written to `<classname>/rating`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RatingRecord {
    pub rate: f64,
    pub user: String,
    pub comment: String,
    pub time: String,
    pub classname: String,
}

impl RatingRecord {
    pub fn into_rating(self, id: String) -> Rating {
        Rating {
            id,
            rate: self.rate,
            comment: self.comment,
            time: self.time,
            user: self.user,
            classname: self.classname,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewRating {
    pub rate: f64,
    pub user: String,
    pub comment: String,
    pub time: DateTime<Utc>,
    pub classname: String,
}

impl NewRating {
    pub fn to_record(&self) -> RatingRecord {
        RatingRecord {
            rate: self.rate,
            user: self.user.clone(),
            comment: self.comment.clone(),
            time: iso_timestamp(&self.time),
            classname: self.classname.clone(),
        }
    }
}
