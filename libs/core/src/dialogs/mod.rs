//! Minimal dialog stack: the [`Dialog`] trait, a registry and the per-turn context.

mod context;
mod dialog;
mod instance;
mod set;
mod turn_result;

pub use context::DialogContext;
pub use dialog::Dialog;
pub use instance::{DialogInstance, DialogState};
pub use set::DialogSet;
pub use turn_result::{DialogReason, DialogTurnResult, DialogTurnStatus};
