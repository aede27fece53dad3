use crate::chain::ForwardChain;
use crate::compensation::CompensatingChain;
use crate::erased::{ErasedStep, StepWrapper};

/// Write-once slot handed to a step while it executes.
///
/// Recording consumes the slot, so a step can capture its undo data at most
/// once per execution, and only from inside `execute`.
pub struct UndoSlot<'a, S> {
    target: &'a mut Option<S>,
}

impl<'a, S> UndoSlot<'a, S> {
    pub(crate) fn new(target: &'a mut Option<S>) -> Self {
        Self { target }
    }

    /// Record the data needed to undo this step's effect.
    pub fn record(self, snapshot: S) {
        *self.target = Some(snapshot);
    }
}

/// A provisioning step that can capture the data needed to undo itself.
///
/// # Type Parameters
///
/// - `T`: The shared input every step of the chain receives
pub trait AtomicStep<T>: Send + Sync {
    /// Data captured during `execute` that `compensate` needs.
    type Snapshot: Send + 'static;

    /// Error type for step failures.
    type Error;

    /// Human-readable name for logging and error messages.
    fn name(&self) -> &'static str;

    /// Execute the step against the shared input.
    ///
    /// A step that has something to undo records a snapshot through `undo`.
    /// Dropping the slot unused leaves the step's compensation unarmed.
    ///
    /// # Errors
    ///
    /// Returns an error if the step fails to complete.
    fn execute(&self, input: &T, undo: UndoSlot<'_, Self::Snapshot>) -> Result<(), Self::Error>;

    /// Undo the step's effect using the snapshot recorded during `execute`.
    ///
    /// Only called when a snapshot was recorded. The default implementation
    /// is a no-op, suitable for logging-only or idempotent steps.
    ///
    /// # Errors
    ///
    /// Returns an error if compensation fails.
    fn compensate(&self, snapshot: Self::Snapshot) -> Result<(), Self::Error> {
        let _ = snapshot;
        Ok(())
    }
}

/// A forward chain of atomic steps that knows how to undo itself.
pub struct StepChain<T, E> {
    chain: ForwardChain<Box<dyn ErasedStep<T, E>>>,
}

impl<T, E> StepChain<T, E>
where
    T: 'static,
    E: 'static,
{
    /// Start a chain with its first step.
    #[must_use]
    pub fn new<S>(first: S) -> Self
    where
        S: AtomicStep<T, Error = E> + 'static,
    {
        let head: Box<dyn ErasedStep<T, E>> = Box::new(StepWrapper::new(first));
        Self {
            chain: ForwardChain::new(head),
        }
    }

    /// Append a step after the current tail.
    #[must_use]
    pub fn then<S>(self, next: S) -> Self
    where
        S: AtomicStep<T, Error = E> + 'static,
    {
        let next: Box<dyn ErasedStep<T, E>> = Box::new(StepWrapper::new(next));
        Self {
            chain: self.chain.then(next),
        }
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// A step chain always has a first step, so this is only `false`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Step names, head first.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.chain.names::<T>()
    }

    /// Run every step head to tail with the same input.
    ///
    /// Snapshots from a previous run are discarded before the first step
    /// starts, so steps that do not run this time stay unarmed.
    ///
    /// # Errors
    ///
    /// Returns the first step error; later steps do not run.
    pub fn apply(&mut self, input: &T) -> Result<(), E> {
        self.reset();
        self.chain.apply(input)
    }

    /// Discard every recorded snapshot without compensating.
    pub fn reset(&mut self) {
        for step in self.chain.nodes_mut() {
            step.clear_snapshot();
        }
    }

    /// Compose the compensations of every step, tail first.
    ///
    /// Recorded snapshots move into the returned chain, so a second call
    /// yields a rollback with nothing left to undo. Steps that never ran or
    /// never recorded anything contribute unarmed nodes.
    pub fn rollback(&mut self) -> CompensatingChain<E> {
        let mut rollback = CompensatingChain::noop();
        for step in self.chain.nodes_mut().iter_mut().rev() {
            rollback.push_boxed(step.take_compensation());
        }
        rollback
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Debug, PartialEq, thiserror::Error)]
    #[error("{0}")]
    struct TestError(String);

    /// Shared "remote" register that steps overwrite and restore.
    #[derive(Default)]
    struct Register {
        values: Mutex<Vec<(String, i32)>>,
        log: Mutex<Vec<String>>,
    }

    struct SetStep {
        name: &'static str,
        register: Arc<Register>,
    }

    impl AtomicStep<i32> for SetStep {
        type Snapshot = Vec<(String, i32)>;
        type Error = TestError;

        fn name(&self) -> &'static str {
            self.name
        }

        fn execute(
            &self,
            input: &i32,
            undo: UndoSlot<'_, Self::Snapshot>,
        ) -> Result<(), TestError> {
            let mut values = self.register.values.lock().expect("values lock");
            undo.record(values.clone());
            values.push((self.name.to_string(), *input));
            Ok(())
        }

        fn compensate(&self, snapshot: Self::Snapshot) -> Result<(), TestError> {
            self.register
                .log
                .lock()
                .expect("log lock")
                .push(format!("undo {}", self.name));
            *self.register.values.lock().expect("values lock") = snapshot;
            Ok(())
        }
    }

    struct FailStep;

    impl AtomicStep<i32> for FailStep {
        type Snapshot = ();
        type Error = TestError;

        fn name(&self) -> &'static str {
            "fail"
        }

        fn execute(&self, _input: &i32, _undo: UndoSlot<'_, ()>) -> Result<(), TestError> {
            Err(TestError("boom".to_string()))
        }
    }

    struct RejectNegative;

    impl AtomicStep<i32> for RejectNegative {
        type Snapshot = ();
        type Error = TestError;

        fn name(&self) -> &'static str {
            "reject_negative"
        }

        fn execute(&self, input: &i32, _undo: UndoSlot<'_, ()>) -> Result<(), TestError> {
            if *input < 0 {
                return Err(TestError(format!("negative input {input}")));
            }
            Ok(())
        }
    }

    fn set(name: &'static str, register: &Arc<Register>) -> SetStep {
        SetStep {
            name,
            register: Arc::clone(register),
        }
    }

    #[test]
    fn rollback_runs_tail_first() {
        let register = Arc::new(Register::default());
        let mut chain: StepChain<i32, TestError> =
            StepChain::new(set("a", &register)).then(set("b", &register));

        chain.apply(&1).expect("steps succeed");
        chain.rollback().apply().expect("rollback succeeds");

        assert_eq!(
            *register.log.lock().expect("log lock"),
            vec!["undo b", "undo a"]
        );
        assert!(register.values.lock().expect("values lock").is_empty());
    }

    #[test]
    fn steps_after_a_failure_contribute_nothing() {
        let register = Arc::new(Register::default());
        let mut chain: StepChain<i32, TestError> = StepChain::new(set("a", &register))
            .then(FailStep)
            .then(set("c", &register));

        let err = chain.apply(&4).expect_err("fail step aborts");
        assert_eq!(err, TestError("boom".to_string()));

        let mut rollback = chain.rollback();
        assert_eq!(rollback.names(), vec!["c", "fail", "a"]);
        rollback.apply().expect("rollback succeeds");

        assert_eq!(*register.log.lock().expect("log lock"), vec!["undo a"]);
    }

    #[test]
    fn rerun_failing_early_ignores_snapshots_from_the_previous_run() {
        let register = Arc::new(Register::default());
        let mut chain: StepChain<i32, TestError> = StepChain::new(set("a", &register))
            .then(RejectNegative)
            .then(set("c", &register));

        chain.apply(&1).expect("first run succeeds");
        *register.values.lock().expect("values lock") = vec![("live".to_string(), 99)];

        chain.apply(&-1).expect_err("second run stops at the middle step");
        chain.rollback().apply().expect("rollback succeeds");

        assert_eq!(*register.log.lock().expect("log lock"), vec!["undo a"]);
        assert_eq!(
            *register.values.lock().expect("values lock"),
            vec![("live".to_string(), 99)]
        );
    }

    #[test]
    fn reset_disarms_every_step() {
        let register = Arc::new(Register::default());
        let mut chain: StepChain<i32, TestError> =
            StepChain::new(set("a", &register)).then(set("b", &register));

        chain.apply(&1).expect("steps succeed");
        chain.reset();

        assert!(chain.rollback().is_noop());
    }

    #[test]
    fn second_rollback_has_nothing_left() {
        let register = Arc::new(Register::default());
        let mut chain: StepChain<i32, TestError> = StepChain::new(set("a", &register));

        chain.apply(&1).expect("step succeeds");
        let first = chain.rollback();
        let second = chain.rollback();

        assert!(!first.is_noop());
        assert!(second.is_noop());
    }

    #[test]
    fn names_are_head_first() {
        let register = Arc::new(Register::default());
        let chain: StepChain<i32, TestError> =
            StepChain::new(set("a", &register)).then(FailStep);

        assert_eq!(chain.names(), vec!["a", "fail"]);
        assert_eq!(chain.len(), 2);
    }
}
