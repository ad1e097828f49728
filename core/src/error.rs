use std::fmt;

use thiserror::Error;

/// The four lifecycle operations every driver must provide
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DriverOp {
    Filter,
    Enter,
    Exit,
    Update,
}

impl DriverOp {
    pub const ALL: [DriverOp; 4] = [
        DriverOp::Filter,
        DriverOp::Enter,
        DriverOp::Exit,
        DriverOp::Update,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DriverOp::Filter => "filter",
            DriverOp::Enter => "enter",
            DriverOp::Exit => "exit",
            DriverOp::Update => "update",
        }
    }
}

impl fmt::Display for DriverOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Dispatch phase of a reconciliation pass. Phases always run in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Exit,
    Enter,
    Update,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Exit => f.write_str("exit"),
            Phase::Enter => f.write_str("enter"),
            Phase::Update => f.write_str("update"),
        }
    }
}

/// A driver could not be registered because it does not provide every lifecycle operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid driver {driver}: missing required operation(s) {}", format_ops(.missing))]
pub struct InvalidDriverError {
    pub driver: &'static str,
    pub missing: Vec<DriverOp>,
}

fn format_ops(ops: &[DriverOp]) -> String {
    ops.iter()
        .map(DriverOp::name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors detected before a pass touches the snapshot
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidInputError {
    /// `reconcile` was called on a reconciler that has no key function
    #[error("Invalid input: no key function has been set, call Reconciler::set_key_fn() before reconcile()")]
    MissingKeyFunction,
}

/// Failure reported by a driver callback
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Source(#[from] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl DriverError {
    pub fn msg(message: impl Into<String>) -> Self {
        DriverError::Message(message.into())
    }

    pub fn source<T: std::error::Error + Send + Sync + 'static>(error: T) -> Self {
        DriverError::Source(Box::new(error))
    }
}

pub type DriverResult<T> = Result<T, DriverError>;

/// Errors returned by `Reconciler::reconcile`
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    InvalidInput(#[from] InvalidInputError),

    /// A driver callback failed. The pass was abandoned mid-phase; the snapshot swap stands.
    #[error("Driver {driver} failed in {op} during the {phase} phase for key {key:?}: {source}")]
    Callback {
        driver: &'static str,
        phase: Phase,
        op: DriverOp,
        key: String,
        #[source]
        source: DriverError,
    },
}

impl ReconcileError {
    pub fn is_callback(&self) -> bool {
        matches!(self, ReconcileError::Callback { .. })
    }
}
