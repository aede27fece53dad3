use std::fmt::Debug;

use tracing::{debug, warn};

use crate::audit::{CompensationStatus, RollbackAuditLog};
use crate::error::{CompensationError, RollbackError};

/// One undo operation of a [`CompensatingChain`].
pub trait Compensation<E>: Send {
    /// Human-readable name for logging and audit.
    fn name(&self) -> &str;

    /// Whether a snapshot is present, i.e. whether `apply` would do anything.
    fn is_armed(&self) -> bool;

    /// Undo using the recorded snapshot, consuming it.
    ///
    /// Must be a no-op when no snapshot is present.
    ///
    /// # Errors
    ///
    /// Returns an error if the undo itself fails.
    fn apply(&mut self) -> Result<(), E>;
}

/// A compensation bound to an optional snapshot of the data needed to undo.
pub struct CompensatingNode<S, E> {
    name: String,
    undo: Box<dyn FnMut(S) -> Result<(), E> + Send>,
    value: Option<S>,
}

impl<S, E> CompensatingNode<S, E>
where
    S: Send,
{
    /// Create an unarmed node; `undo` only runs once a value is set.
    pub fn new<F>(name: impl Into<String>, undo: F) -> Self
    where
        F: FnMut(S) -> Result<(), E> + Send + 'static,
    {
        Self {
            name: name.into(),
            undo: Box::new(undo),
            value: None,
        }
    }

    /// Set the snapshot this node will undo with.
    pub fn set_value(&mut self, value: S) {
        self.value = Some(value);
    }

    /// Builder form of [`set_value`](Self::set_value); `None` leaves the node unarmed.
    #[must_use]
    pub fn with_value(mut self, value: Option<S>) -> Self {
        self.value = value;
        self
    }
}

impl<S, E> Compensation<E> for CompensatingNode<S, E>
where
    S: Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn is_armed(&self) -> bool {
        self.value.is_some()
    }

    fn apply(&mut self) -> Result<(), E> {
        match self.value.take() {
            Some(value) => (self.undo)(value),
            None => Ok(()),
        }
    }
}

/// An ordered sequence of compensations.
///
/// Nodes run in insertion order. Whoever builds the chain is responsible for
/// inserting the most recently applied step first. An empty chain is the
/// no-op rollback.
pub struct CompensatingChain<E> {
    nodes: Vec<Box<dyn Compensation<E>>>,
}

impl<E> Default for CompensatingChain<E> {
    fn default() -> Self {
        Self::noop()
    }
}

impl<E> CompensatingChain<E> {
    /// The rollback that never does anything.
    #[must_use]
    pub fn noop() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Append a compensation to run after the ones already in the chain.
    #[must_use]
    pub fn then<C>(mut self, node: C) -> Self
    where
        C: Compensation<E> + 'static,
    {
        self.nodes.push(Box::new(node));
        self
    }

    pub(crate) fn push_boxed(&mut self, node: Box<dyn Compensation<E>>) {
        self.nodes.push(node);
    }

    /// Move every compensation of `other` to the end of this chain.
    pub fn append(&mut self, mut other: Self) {
        self.nodes.append(&mut other.nodes);
    }

    /// Number of compensations, armed or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the chain has no compensations at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether applying the chain would have no effect.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.nodes.iter().all(|n| !n.is_armed())
    }

    /// Names in execution order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.name()).collect()
    }
}

impl<E: Debug> CompensatingChain<E> {
    /// Run every armed compensation in order.
    ///
    /// # Errors
    ///
    /// Returns every compensation failure; later compensations still run.
    pub fn apply(&mut self) -> Result<(), RollbackError<E>> {
        self.apply_with_audit().0
    }

    /// Run the chain and also return an audit log of what happened.
    pub fn apply_with_audit(&mut self) -> (Result<(), RollbackError<E>>, RollbackAuditLog) {
        let mut audit = RollbackAuditLog::new();
        let mut failures = Vec::new();

        for node in &mut self.nodes {
            if !node.is_armed() {
                debug!(compensation = node.name(), "nothing recorded, skipping");
                audit.record(node.name(), CompensationStatus::Skipped);
                continue;
            }

            debug!(compensation = node.name(), "compensating");
            match node.apply() {
                Ok(()) => audit.record(node.name(), CompensationStatus::Compensated),
                Err(error) => {
                    warn!(compensation = node.name(), ?error, "compensation failed");
                    audit.record(node.name(), CompensationStatus::Failed);
                    failures.push(CompensationError {
                        compensation: node.name().to_string(),
                        error,
                    });
                }
            }
        }

        let result = if failures.is_empty() {
            Ok(())
        } else {
            Err(RollbackError { failures })
        };
        (result, audit)
    }
}
