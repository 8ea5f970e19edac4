//! Domain models for the OKR tracker.
//!
//! - [`Objective`]: top-level qualitative goal. Owns key results.
//! - [`KeyResult`]: measurable metric or binary milestone under one objective.
//!   Owns initiatives.
//! - [`Initiative`]: actionable task under one key result.
//!
//! Progress is never stored. The `*WithProgress`, [`KeyResultDetail`],
//! [`ObjectiveDetail`] and [`Dashboard`] types carry values computed on read.

mod initiative;
mod key_result;
mod objective;
mod view;

pub use initiative::*;
pub use key_result::*;
pub use objective::*;
pub use view::*;
