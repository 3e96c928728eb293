//! Top-level facade crate for selfmon.
//!
//! Re-exports the metric core and the agent library so users can depend on a single crate.

pub mod core {
    pub use selfmon_core::*;
}

pub mod agent {
    pub use selfmon_agent::*;
}
