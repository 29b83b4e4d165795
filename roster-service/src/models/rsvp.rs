//! Rsvp model - a user's attendance flag for an event.

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Rsvp document as stored in the `rsvps` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Rsvp {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user_id: ObjectId,
    pub event_id: ObjectId,
    pub rsvp: bool,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Rsvp {
    /// New rsvps always start as attending.
    pub fn attending(user_id: ObjectId, event_id: ObjectId) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            user_id,
            event_id,
            rsvp: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RsvpResponse {
    pub id: String,
    pub user_id: String,
    pub event_id: String,
    pub rsvp: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Rsvp> for RsvpResponse {
    fn from(r: Rsvp) -> Self {
        Self {
            id: r.id.to_hex(),
            user_id: r.user_id.to_hex(),
            event_id: r.event_id.to_hex(),
            rsvp: r.rsvp,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}
