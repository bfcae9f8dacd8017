pub mod group_queries;
pub mod contact_queries;

pub use contact_queries::{ContactFilter, ContactSort};
