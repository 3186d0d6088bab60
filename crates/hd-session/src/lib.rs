//! Session resolution for the mobile client core.
//!
//! Turns stored credential primitives into a validated [`Session`], polling
//! the credential store with a bounded retry to bridge its
//! eventual-consistency window after a login write. The retry is a
//! consistency wait against the store only; it never touches the network.

pub mod resolver;
pub mod retry;

pub use resolver::{SessionOverrides, SessionResolver};
pub use retry::{poll_until, NoopSleep, Sleep, TokioSleep};

pub use hd_common::Session;
