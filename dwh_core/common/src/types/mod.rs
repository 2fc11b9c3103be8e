pub mod cluster;
pub mod lookup;
pub mod role;

pub use cluster::{ClusterDetails, ClusterStatus};
pub use lookup::Lookup;
pub use role::RoleDetails;
