pub mod ids;
pub mod group;
pub mod contact;

// Re-exports for convenience
pub use ids::Id;
pub use group::Group;
pub use contact::{
    Contact, ContactSource, DisplayLang, DisplayName, LabeledAddress, MAX_ADDRESSES,
    MAX_ALTERNATIVE_NUMBERS,
};
