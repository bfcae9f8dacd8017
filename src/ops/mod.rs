pub mod group_ops;
pub mod contact_ops;
pub mod suggestion_ops;

pub use contact_ops::ContactInput;
