//! In-process store with the same semantics as the MongoDB gateway.
//!
//! Used by the integration tests and for running the router without a database.
//! Every repository call is counted so callers can assert that validation
//! failures never reach the store, and the store can be switched into a failing
//! mode to exercise persistence errors.

use async_trait::async_trait;
use chrono::Utc;
use mongodb::bson::{oid::ObjectId, Document};
use service_core::error::AppError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::{PopulatedRole, Role, Rsvp};
use crate::services::repository::{RoleRepository, RsvpRepository, Store};

#[derive(Default)]
struct Collections {
    roles: Vec<Role>,
    rsvps: Vec<Rsvp>,
    organizations: HashMap<ObjectId, Document>,
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    collections: Arc<RwLock<Collections>>,
    calls: Arc<AtomicUsize>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of repository operations performed so far.
    pub fn store_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Registers an organization document for role expansion. Keyed by its `_id`.
    pub async fn insert_organization(&self, organization: Document) -> Result<(), AppError> {
        let id = organization.get_object_id("_id").map_err(|e| {
            AppError::BadRequest(anyhow::anyhow!("Organization needs an ObjectId `_id`: {}", e))
        })?;
        self.collections
            .write()
            .await
            .organizations
            .insert(id, organization);
        Ok(())
    }

    /// While set, every operation (health check included) fails with a persistence error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<(), AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "in-memory store is unavailable"
            )));
        }
        Ok(())
    }

    fn record_call(&self) -> Result<(), AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.ensure_available()
    }
}

fn newest_first<T, F>(mut records: Vec<T>, created_at: F) -> Vec<T>
where
    F: Fn(&T) -> chrono::DateTime<Utc>,
{
    records.sort_by_key(|record| std::cmp::Reverse(created_at(record)));
    records
}

#[async_trait]
impl RoleRepository for InMemoryStore {
    async fn list_roles(&self) -> Result<Vec<Role>, AppError> {
        self.record_call()?;
        let roles = self.collections.read().await.roles.clone();
        Ok(newest_first(roles, |r| r.created_at))
    }

    async fn list_roles_by_user(&self, user_id: ObjectId) -> Result<Vec<PopulatedRole>, AppError> {
        self.record_call()?;
        let collections = self.collections.read().await;
        let roles = collections
            .roles
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        Ok(newest_first(roles, |r: &Role| r.created_at)
            .into_iter()
            .map(|role| PopulatedRole {
                organization: collections.organizations.get(&role.organization_id).cloned(),
                role,
            })
            .collect())
    }

    async fn list_roles_by_organization(
        &self,
        organization_id: ObjectId,
    ) -> Result<Vec<Role>, AppError> {
        self.record_call()?;
        let roles = self
            .collections
            .read()
            .await
            .roles
            .iter()
            .filter(|r| r.organization_id == organization_id)
            .cloned()
            .collect();
        Ok(newest_first(roles, |r: &Role| r.created_at))
    }

    async fn find_role(&self, id: ObjectId) -> Result<Option<Role>, AppError> {
        self.record_call()?;
        let collections = self.collections.read().await;
        Ok(collections.roles.iter().find(|r| r.id == id).cloned())
    }

    async fn insert_role(&self, role: &Role) -> Result<(), AppError> {
        self.record_call()?;
        let mut collections = self.collections.write().await;
        if collections.roles.iter().any(|r| r.id == role.id) {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "duplicate key: role {}",
                role.id
            )));
        }
        collections.roles.push(role.clone());
        Ok(())
    }

    async fn update_role_label(
        &self,
        id: ObjectId,
        label: &str,
    ) -> Result<Option<Role>, AppError> {
        self.record_call()?;
        let mut collections = self.collections.write().await;
        Ok(collections.roles.iter_mut().find(|r| r.id == id).map(|role| {
            role.role = label.to_string();
            role.updated_at = Utc::now();
            role.clone()
        }))
    }

    async fn delete_role(&self, id: ObjectId) -> Result<Option<Role>, AppError> {
        self.record_call()?;
        let mut collections = self.collections.write().await;
        let position = collections.roles.iter().position(|r| r.id == id);
        Ok(position.map(|index| collections.roles.remove(index)))
    }
}

#[async_trait]
impl RsvpRepository for InMemoryStore {
    async fn list_rsvps(&self) -> Result<Vec<Rsvp>, AppError> {
        self.record_call()?;
        let rsvps = self.collections.read().await.rsvps.clone();
        Ok(newest_first(rsvps, |r| r.created_at))
    }

    async fn list_rsvps_by_user(&self, user_id: ObjectId) -> Result<Vec<Rsvp>, AppError> {
        self.record_call()?;
        let rsvps = self
            .collections
            .read()
            .await
            .rsvps
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        Ok(newest_first(rsvps, |r: &Rsvp| r.created_at))
    }

    async fn list_rsvps_by_event(&self, event_id: ObjectId) -> Result<Vec<Rsvp>, AppError> {
        self.record_call()?;
        let rsvps = self
            .collections
            .read()
            .await
            .rsvps
            .iter()
            .filter(|r| r.event_id == event_id)
            .cloned()
            .collect();
        Ok(newest_first(rsvps, |r: &Rsvp| r.created_at))
    }

    async fn find_rsvp(&self, id: ObjectId) -> Result<Option<Rsvp>, AppError> {
        self.record_call()?;
        let collections = self.collections.read().await;
        Ok(collections.rsvps.iter().find(|r| r.id == id).cloned())
    }

    async fn find_rsvp_by_user_and_event(
        &self,
        user_id: ObjectId,
        event_id: ObjectId,
    ) -> Result<Option<Rsvp>, AppError> {
        self.record_call()?;
        let collections = self.collections.read().await;
        Ok(collections
            .rsvps
            .iter()
            .find(|r| r.user_id == user_id && r.event_id == event_id)
            .cloned())
    }

    async fn insert_rsvp(&self, rsvp: &Rsvp) -> Result<(), AppError> {
        self.record_call()?;
        let mut collections = self.collections.write().await;
        if collections.rsvps.iter().any(|r| r.id == rsvp.id) {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "duplicate key: rsvp {}",
                rsvp.id
            )));
        }
        collections.rsvps.push(rsvp.clone());
        Ok(())
    }

    async fn update_rsvp_flag(
        &self,
        id: ObjectId,
        attending: bool,
    ) -> Result<Option<Rsvp>, AppError> {
        self.record_call()?;
        let mut collections = self.collections.write().await;
        Ok(collections.rsvps.iter_mut().find(|r| r.id == id).map(|rsvp| {
            rsvp.rsvp = attending;
            rsvp.updated_at = Utc::now();
            rsvp.clone()
        }))
    }

    async fn delete_rsvp(&self, id: ObjectId) -> Result<Option<Rsvp>, AppError> {
        self.record_call()?;
        let mut collections = self.collections.write().await;
        let position = collections.rsvps.iter().position(|r| r.id == id);
        Ok(position.map(|index| collections.rsvps.remove(index)))
    }

    async fn delete_rsvps_by_user_and_event(
        &self,
        user_id: ObjectId,
        event_id: ObjectId,
    ) -> Result<u64, AppError> {
        self.record_call()?;
        let mut collections = self.collections.write().await;
        let before = collections.rsvps.len();
        collections
            .rsvps
            .retain(|r| !(r.user_id == user_id && r.event_id == event_id));
        Ok((before - collections.rsvps.len()) as u64)
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn health_check(&self) -> Result<(), AppError> {
        self.ensure_available()
    }
}
