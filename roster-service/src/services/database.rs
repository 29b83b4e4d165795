use async_trait::async_trait;
use chrono::Utc;
use futures::stream::TryStreamExt;
use mongodb::{
    bson::{self, doc, oid::ObjectId, Document},
    options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument},
    Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;

use crate::models::{PopulatedRole, Role, Rsvp};
use crate::services::repository::{RoleRepository, RsvpRepository, Store};

const ROLES: &str = "roles";
const RSVPS: &str = "rsvps";
const ORGANIZATIONS: &str = "organizations";

#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
}

impl MongoDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(database = %database, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for roster-service");

        self.create_index(ROLES, doc! { "userId": 1, "createdAt": -1 }, "user_roles")
            .await?;
        self.create_index(
            ROLES,
            doc! { "organizationId": 1, "createdAt": -1 },
            "organization_roles",
        )
        .await?;
        self.create_index(RSVPS, doc! { "userId": 1, "createdAt": -1 }, "user_rsvps")
            .await?;
        self.create_index(RSVPS, doc! { "eventId": 1, "createdAt": -1 }, "event_rsvps")
            .await?;
        self.create_index(RSVPS, doc! { "userId": 1, "eventId": 1 }, "user_event_rsvps")
            .await?;

        Ok(())
    }

    async fn create_index(
        &self,
        collection: &str,
        keys: Document,
        name: &str,
    ) -> Result<(), AppError> {
        let index = IndexModel::builder()
            .keys(keys)
            .options(IndexOptions::builder().name(name.to_string()).build())
            .build();

        self.db
            .collection::<Document>(collection)
            .create_index(index, None)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to create {} index on {} collection: {}",
                    name,
                    collection,
                    e
                );
                AppError::from(e)
            })?;
        tracing::info!(collection = %collection, index = %name, "Created index");
        Ok(())
    }

    pub fn roles(&self) -> Collection<Role> {
        self.db.collection(ROLES)
    }

    pub fn rsvps(&self) -> Collection<Rsvp> {
        self.db.collection(RSVPS)
    }
}

fn newest_first() -> FindOptions {
    FindOptions::builder().sort(doc! { "createdAt": -1 }).build()
}

fn return_updated() -> FindOneAndUpdateOptions {
    FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build()
}

async fn find_sorted<T>(collection: Collection<T>, filter: Document) -> Result<Vec<T>, AppError>
where
    T: serde::de::DeserializeOwned + Unpin + Send + Sync,
{
    let cursor = collection.find(filter, newest_first()).await?;
    let records: Vec<T> = cursor.try_collect().await?;
    Ok(records)
}

#[async_trait]
impl RoleRepository for MongoDb {
    async fn list_roles(&self) -> Result<Vec<Role>, AppError> {
        find_sorted(self.roles(), doc! {}).await
    }

    async fn list_roles_by_user(&self, user_id: ObjectId) -> Result<Vec<PopulatedRole>, AppError> {
        let pipeline = vec![
            doc! { "$match": { "userId": user_id } },
            doc! { "$sort": { "createdAt": -1 } },
            doc! { "$lookup": {
                "from": ORGANIZATIONS,
                "localField": "organizationId",
                "foreignField": "_id",
                "as": "organization",
            } },
            doc! { "$addFields": { "organization": { "$arrayElemAt": ["$organization", 0] } } },
        ];

        let mut cursor = self.roles().aggregate(pipeline, None).await?;
        let mut roles = Vec::new();
        while let Some(mut document) = cursor.try_next().await? {
            let organization = match document.remove("organization") {
                Some(bson::Bson::Document(organization)) => Some(organization),
                _ => None,
            };
            let role: Role = bson::from_document(document)?;
            roles.push(PopulatedRole { role, organization });
        }
        Ok(roles)
    }

    async fn list_roles_by_organization(
        &self,
        organization_id: ObjectId,
    ) -> Result<Vec<Role>, AppError> {
        find_sorted(self.roles(), doc! { "organizationId": organization_id }).await
    }

    async fn find_role(&self, id: ObjectId) -> Result<Option<Role>, AppError> {
        Ok(self.roles().find_one(doc! { "_id": id }, None).await?)
    }

    async fn insert_role(&self, role: &Role) -> Result<(), AppError> {
        self.roles().insert_one(role, None).await?;
        Ok(())
    }

    async fn update_role_label(
        &self,
        id: ObjectId,
        label: &str,
    ) -> Result<Option<Role>, AppError> {
        let update = doc! { "$set": {
            "role": label,
            "updatedAt": bson::DateTime::from_chrono(Utc::now()),
        } };
        Ok(self
            .roles()
            .find_one_and_update(doc! { "_id": id }, update, return_updated())
            .await?)
    }

    async fn delete_role(&self, id: ObjectId) -> Result<Option<Role>, AppError> {
        Ok(self
            .roles()
            .find_one_and_delete(doc! { "_id": id }, None)
            .await?)
    }
}

#[async_trait]
impl RsvpRepository for MongoDb {
    async fn list_rsvps(&self) -> Result<Vec<Rsvp>, AppError> {
        find_sorted(self.rsvps(), doc! {}).await
    }

    async fn list_rsvps_by_user(&self, user_id: ObjectId) -> Result<Vec<Rsvp>, AppError> {
        find_sorted(self.rsvps(), doc! { "userId": user_id }).await
    }

    async fn list_rsvps_by_event(&self, event_id: ObjectId) -> Result<Vec<Rsvp>, AppError> {
        find_sorted(self.rsvps(), doc! { "eventId": event_id }).await
    }

    async fn find_rsvp(&self, id: ObjectId) -> Result<Option<Rsvp>, AppError> {
        Ok(self.rsvps().find_one(doc! { "_id": id }, None).await?)
    }

    async fn find_rsvp_by_user_and_event(
        &self,
        user_id: ObjectId,
        event_id: ObjectId,
    ) -> Result<Option<Rsvp>, AppError> {
        Ok(self
            .rsvps()
            .find_one(doc! { "userId": user_id, "eventId": event_id }, None)
            .await?)
    }

    async fn insert_rsvp(&self, rsvp: &Rsvp) -> Result<(), AppError> {
        self.rsvps().insert_one(rsvp, None).await?;
        Ok(())
    }

    async fn update_rsvp_flag(
        &self,
        id: ObjectId,
        attending: bool,
    ) -> Result<Option<Rsvp>, AppError> {
        let update = doc! { "$set": {
            "rsvp": attending,
            "updatedAt": bson::DateTime::from_chrono(Utc::now()),
        } };
        Ok(self
            .rsvps()
            .find_one_and_update(doc! { "_id": id }, update, return_updated())
            .await?)
    }

    async fn delete_rsvp(&self, id: ObjectId) -> Result<Option<Rsvp>, AppError> {
        Ok(self
            .rsvps()
            .find_one_and_delete(doc! { "_id": id }, None)
            .await?)
    }

    async fn delete_rsvps_by_user_and_event(
        &self,
        user_id: ObjectId,
        event_id: ObjectId,
    ) -> Result<u64, AppError> {
        let result = self
            .rsvps()
            .delete_many(doc! { "userId": user_id, "eventId": event_id }, None)
            .await?;
        Ok(result.deleted_count)
    }
}

#[async_trait]
impl Store for MongoDb {
    async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }
}
