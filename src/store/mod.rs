//! Live resource stores for the phase deployer.
//!
//! A store is the authoritative holder of live resources. The deployer only
//! talks to it through [`ResourceStore`], so backends are interchangeable:
//! an in-memory store for embedding and tests, and a local file store.

mod local;
mod memory;
mod backend;

pub use local::LocalResourceStore;
pub use memory::{Defaulter, MemoryResourceStore};
pub use backend::ResourceStore;
