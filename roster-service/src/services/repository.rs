//! Persistence gateway: collection-scoped operations the controllers rely on.
//!
//! Every method is a single store round trip. Listing methods return records
//! newest first (`createdAt` descending).

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use service_core::error::AppError;

use crate::models::{PopulatedRole, Role, Rsvp};

#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn list_roles(&self) -> Result<Vec<Role>, AppError>;

    /// Roles held by a user, each joined with its organization document.
    async fn list_roles_by_user(&self, user_id: ObjectId) -> Result<Vec<PopulatedRole>, AppError>;

    async fn list_roles_by_organization(
        &self,
        organization_id: ObjectId,
    ) -> Result<Vec<Role>, AppError>;

    async fn find_role(&self, id: ObjectId) -> Result<Option<Role>, AppError>;

    async fn insert_role(&self, role: &Role) -> Result<(), AppError>;

    /// Replaces the label and returns the record as it is after the update.
    async fn update_role_label(&self, id: ObjectId, label: &str)
        -> Result<Option<Role>, AppError>;

    async fn delete_role(&self, id: ObjectId) -> Result<Option<Role>, AppError>;
}

#[async_trait]
pub trait RsvpRepository: Send + Sync {
    async fn list_rsvps(&self) -> Result<Vec<Rsvp>, AppError>;

    async fn list_rsvps_by_user(&self, user_id: ObjectId) -> Result<Vec<Rsvp>, AppError>;

    async fn list_rsvps_by_event(&self, event_id: ObjectId) -> Result<Vec<Rsvp>, AppError>;

    async fn find_rsvp(&self, id: ObjectId) -> Result<Option<Rsvp>, AppError>;

    async fn find_rsvp_by_user_and_event(
        &self,
        user_id: ObjectId,
        event_id: ObjectId,
    ) -> Result<Option<Rsvp>, AppError>;

    async fn insert_rsvp(&self, rsvp: &Rsvp) -> Result<(), AppError>;

    /// Replaces the attendance flag and returns the record as it is after the update.
    async fn update_rsvp_flag(&self, id: ObjectId, attending: bool)
        -> Result<Option<Rsvp>, AppError>;

    async fn delete_rsvp(&self, id: ObjectId) -> Result<Option<Rsvp>, AppError>;

    /// Removes every rsvp for the pair and returns how many were deleted.
    async fn delete_rsvps_by_user_and_event(
        &self,
        user_id: ObjectId,
        event_id: ObjectId,
    ) -> Result<u64, AppError>;
}

/// Everything the HTTP layer needs from a backing store.
#[async_trait]
pub trait Store: RoleRepository + RsvpRepository {
    async fn health_check(&self) -> Result<(), AppError>;
}
