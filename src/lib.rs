// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # Phase Deployer
//!
//! A phase-aware deployer that reconciles desired resources into a live
//! store without clobbering server-side fields.
//!
//! ## Overview
//!
//! Each reconciliation pass looks at the lifecycle phase of the entity
//! under reconciliation and picks how the desired set reaches the store:
//!
//! - **Initialization / Deploying**: every resource is created or fully
//!   replaced, in manifest order
//! - **Running**: every resource is patched with a *positive* merge patch,
//!   which only adds or changes fields and never deletes what the server
//!   added after creation
//! - **Anything else**: the deployer does nothing
//!
//! The write happens as a post-action, after the full desired set for the
//! pass is known.
//!
//! ## Modules
//!
//! - [`resource`]: Resource model, identities and manifest loading
//! - [`patch`]: Merge-patch codec and the positive patch generator
//! - [`store`]: Live store backends (local, memory)
//! - [`deployer`]: Phases, post-actions and the phase dispatcher
//! - [`reconciler`]: Pass driver and reports
//! - [`config`]: Settings parsing and validation
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```yaml
//! deployer:
//!   enabled: true
//!   kind: deployment
//!
//! store:
//!   backend: local
//!   path: .phase-deployer/store
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod config;
pub mod deployer;
pub mod error;
pub mod patch;
pub mod reconciler;
pub mod resource;
pub mod store;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::{Cli, Commands, OutputFormatter};
pub use config::{ConfigParser, ConfigValidator, DeployerConfig, DeployerSettings, ResourceHasher};
pub use deployer::{Phase, PhaseDispatcher, PostAction, ReconcilePass, Strategy};
pub use error::{DeployerError, Result};
pub use patch::{Patch, PatchCodec, PatchType, PositivePatchGenerator};
pub use reconciler::{Entity, PassReport, Reconciler};
pub use resource::{ManifestLoader, ObjectKey, Resource, ResourceSet};
pub use store::{LocalResourceStore, MemoryResourceStore, ResourceStore};
