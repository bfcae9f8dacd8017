pub mod schema;
pub mod group_repo;
pub mod contact_repo;
