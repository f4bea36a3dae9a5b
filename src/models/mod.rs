//! Data models for the Virtual Classroom backend.
//!
//! Field names match the page's JSON contract (camelCase) so stored
//! collections written by either side stay interchangeable.

mod class;
mod profile;
mod session;

pub use class::*;
pub use profile::*;
pub use session::*;
