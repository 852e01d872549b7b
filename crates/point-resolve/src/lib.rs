//! Resilient point resolution.
//!
//! Standard hit-testing finds whatever paints on top — which, under open
//! dropdowns and dialogs, is usually a click-catching backdrop or a portal
//! with no semantic wrapper. This crate classifies those layers and digs
//! through them to the node the user is actually pointing at.

pub mod backdrop;
pub mod chrome;
pub mod policy;
pub mod resolver;

pub use backdrop::*;
pub use chrome::*;
pub use policy::*;
pub use resolver::*;
