//! Group Module
//!
//! Named cache namespaces, their data-source callback and the registry that
//! holds them.

mod getter;
#[allow(clippy::module_inception)]
mod group;
mod registry;
mod snapshot;

pub use getter::Getter;
pub use group::Group;
pub use registry::Registry;
pub use snapshot::GroupSnapshot;
