pub mod organization;
pub mod role;
pub mod rsvp;

pub use organization::{document_to_json, OrganizationRef};
pub use role::{PopulatedRole, Role, RoleResponse};
pub use rsvp::{Rsvp, RsvpResponse};
