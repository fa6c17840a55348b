//! Phase-aware deployment of desired resources.
//!
//! This module turns the entity phase into a write strategy and runs it:
//! - [`PhaseDispatcher`]: picks replace or patch and registers it on the pass
//! - [`ResourceReplacer`]: full create-or-update of each resource
//! - [`PatchApplier`]: positive merge patch of each resource
//! - [`ReconcilePass`] / [`PostActionQueue`]: the per-pass deferred work

mod action;
mod applier;
mod dispatcher;
mod phase;
mod replacer;

pub use action::{ActionSummary, PostAction, PostActionQueue, ReconcilePass};
pub use applier::{PatchApplier, PatchResources};
pub use dispatcher::{PhaseDispatcher, Strategy};
pub use phase::Phase;
pub use replacer::{ReplaceResources, ResourceReplacer};
