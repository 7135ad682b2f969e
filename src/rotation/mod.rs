//! Four-phase credential rotation protocol.
//!
//! A rotation advances a secret from one value to the next through four
//! scheduler-driven phases:
//!
//! 1. **createSecret** — stage a new candidate value under the request token
//! 2. **setSecret** — propagate the candidate to the protected resource
//! 3. **testSecret** — verify the candidate works against the resource
//! 4. **finishSecret** — promote the candidate to current
//!
//! [`RotationHandler`] validates every request against the store's live
//! version/stage metadata before any phase logic runs, then dispatches on
//! [`RotationStep`]. All durable state lives in the secret store; the
//! handler holds nothing between invocations, which is what makes scheduler
//! re-delivery safe.

pub mod error;
pub mod event;
pub mod handler;
pub mod target;

// Re-export main types
pub use error::{Result, RotationError};
pub use event::{RotationEvent, RotationStep};
pub use handler::RotationHandler;
pub use target::{NoopTarget, RotationTarget};
