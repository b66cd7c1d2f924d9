//! Combat data model and rules lookup. Keep this crate free of IO and
//! platform concerns.

pub mod action;
pub mod rules;
pub mod snapshot;

pub use action::*;
pub use rules::*;
pub use snapshot::*;
