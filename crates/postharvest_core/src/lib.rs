//! Postharvest core: pure harvest state machine, no I/O.
mod ledger;
mod policy;
mod post;
mod state;

pub use ledger::SeenLedger;
pub use policy::{HarvestLimits, StopReason};
pub use post::Post;
pub use state::HarvestState;
