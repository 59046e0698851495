// Service exports
pub mod catalog;
pub mod sessions;

pub use catalog::{CatalogClient, CatalogError, CatalogService};
pub use sessions::{SessionError, SessionStore};
