//! selfmon agent library entry.
//!
//! Wires configuration, the metrics record and the periodic collect loop on
//! top of `selfmon-core`. Consumed by the binary (`main.rs`) and by
//! integration tests.

pub mod app_state;
pub mod collect_loop;
pub mod config;
pub mod record;
