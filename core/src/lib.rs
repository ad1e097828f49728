//! # Datasync Core
//! Keyed reconciliation of entity lists against driver-owned components.
//!
//! A [`Reconciler`] remembers the entities it saw in the previous pass, keyed by a caller-supplied
//! key function. Handing it the next list computes which keys entered, persisted and exited and
//! drives `exit`, `enter` and `update` on every registered [`Driver`], exactly once per
//! transition.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

#[macro_use]
extern crate cfg_if;

mod config;
mod debug;
mod drivers;
mod error;
mod memo;
mod reconciler;

pub use config::{ReconcilerConfig, DEFAULT_DEBUG_NAMESPACE};
pub use debug::{DebugKind, DebugSettings, Debugger, Watched};
pub use drivers::{
    component_table::ComponentTable,
    driver::Driver,
    fn_driver::FnDriver,
    registered_driver::{DriverHandle, DriverId, RemovedDriver},
};
pub use error::{
    DriverError, DriverOp, DriverResult, InvalidDriverError, InvalidInputError, Phase,
    ReconcileError,
};
pub use memo::Memo;
pub use reconciler::{pass_summary::PassSummary, reconciler::Reconciler, snapshot::Snapshot};
