//! Turn planning package: beam search over card sequences for one combat turn.

mod config;
mod error;
mod lethal;
mod planner;
mod scoring;
mod simulator;
mod targeting;
mod trace;

pub use config::*;
pub use error::*;
pub use lethal::*;
pub use planner::*;
pub use scoring::*;
pub use simulator::*;
pub use targeting::*;
pub use trace::*;
