//! Core data models for the platform monitor.

mod notification;
mod ranking;
mod snapshot;

pub use notification::*;
pub use ranking::*;
pub use snapshot::*;
