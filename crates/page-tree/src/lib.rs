//! Arena model of the live document tree.
//!
//! The host owns the tree and mutates it between calls; the locator engine
//! only reads it, except for two scoped cosmetic toggles (hit-test
//! suppression and outline flashes) which restore themselves on drop.

pub mod errors;
pub mod hit;
pub mod model;
pub mod snapshot;
pub mod style;

pub use errors::*;
pub use model::*;
pub use snapshot::*;
pub use style::*;
