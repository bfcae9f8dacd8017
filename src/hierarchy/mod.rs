//! Pure, side-effect free views over the flat group records: the decorated
//! tree and subtree membership. Nothing here touches the database.

pub mod builder;
pub mod membership;

pub use builder::{build_hierarchy, filter_hierarchy, find_node, flatten, GroupNode};
pub use membership::{
    ancestor_ids, descendant_ids, direct_member_count, member_count, members, ChildIndex,
};
