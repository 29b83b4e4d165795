//! Role model - links a user to an organization under a role label.

use chrono::{DateTime, Utc};
use mongodb::bson::{oid::ObjectId, Document};
use serde::{Deserialize, Serialize};

use super::organization::{document_to_json, OrganizationRef};

/// Role document as stored in the `roles` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user_id: ObjectId,
    pub organization_id: ObjectId,
    pub role: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Role {
    pub fn new(user_id: ObjectId, organization_id: ObjectId, role: String) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            user_id,
            organization_id,
            role,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A role joined with the organization it points at.
#[derive(Debug, Clone)]
pub struct PopulatedRole {
    pub role: Role,
    pub organization: Option<Document>,
}

/// Role response for API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleResponse {
    pub id: String,
    pub user_id: String,
    pub organization_id: OrganizationRef,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Role> for RoleResponse {
    fn from(r: Role) -> Self {
        Self {
            id: r.id.to_hex(),
            user_id: r.user_id.to_hex(),
            organization_id: OrganizationRef::Id(r.organization_id.to_hex()),
            role: r.role,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

impl From<PopulatedRole> for RoleResponse {
    fn from(populated: PopulatedRole) -> Self {
        let organization = populated.organization;
        let mut response = RoleResponse::from(populated.role);
        if let Some(document) = organization {
            response.organization_id = OrganizationRef::Expanded(document_to_json(document));
        }
        response
    }
}
