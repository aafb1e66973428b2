//! Consumer contract for the desk client.
//!
//! Screens subscribe to a path and get a uniform `{data, loading, error}`
//! view with an explicit reload, list responses normalized to one shape
//! regardless of server envelope, and a broadcast bus that decouples the
//! form that created an entity from the list that must reload because of it.

mod events;
mod page;
mod resource;

pub use events::{ChangeBus, EntityChanged};
pub use page::ListPage;
pub use resource::{Resource, ResourceOptions, ResourceState};
