//! Video conference page: capture state, roster and invitations.
//!
//! Capture requests are split in two so the session is never locked while a
//! permission prompt is open: `begin_*` moves a control to `Requesting` and
//! says what to acquire, the caller awaits the devices, then `complete_*`
//! applies the outcome.

mod invite;
mod media;
mod roster;
mod session;

pub use invite::*;
pub use media::*;
pub use roster::*;
pub use session::*;

use serde::Serialize;

/// Per-device control state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleState {
    Off,
    Requesting,
    On,
}

/// What a mic/camera toggle needs next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleStep {
    /// Request these tracks, then complete the toggle with the outcome
    Acquire(MediaConstraints),
    /// Settled without a capture request
    Done(ToggleState),
    /// A request for this control is already in flight
    Pending,
}

/// What a screen-share control needs next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenStep {
    Acquire,
    Stopped,
    Pending,
}
