pub mod database;
pub mod jwt;
pub mod memory;
pub mod metrics;
pub mod repository;

pub use database::MongoDb;
pub use jwt::{AccessTokenClaims, JwtVerifier};
pub use memory::InMemoryStore;
pub use metrics::{get_metrics, init_metrics};
pub use repository::{RoleRepository, RsvpRepository, Store};
