use std::marker::PhantomData;
use std::sync::Arc;

use crate::chain::Operator;
use crate::compensation::{CompensatingNode, Compensation};
use crate::step::{AtomicStep, UndoSlot};

pub(crate) trait ErasedStep<T, E>: Operator<T, Error = E> + Send {
    /// Move the recorded snapshot, if any, into a compensation node.
    fn take_compensation(&mut self) -> Box<dyn Compensation<E>>;

    /// Drop any snapshot left over from an earlier run.
    fn clear_snapshot(&mut self);
}

pub(crate) struct StepWrapper<T, S>
where
    S: AtomicStep<T>,
{
    step: Arc<S>,
    snapshot: Option<S::Snapshot>,
    _input: PhantomData<fn(&T)>,
}

impl<T, S> StepWrapper<T, S>
where
    S: AtomicStep<T>,
{
    pub(crate) fn new(step: S) -> Self {
        Self {
            step: Arc::new(step),
            snapshot: None,
            _input: PhantomData,
        }
    }
}

impl<T, S> Operator<T> for StepWrapper<T, S>
where
    S: AtomicStep<T>,
{
    type Error = S::Error;

    fn name(&self) -> &str {
        self.step.name()
    }

    fn apply(&mut self, input: &T) -> Result<(), S::Error> {
        self.snapshot = None;
        self.step.execute(input, UndoSlot::new(&mut self.snapshot))
    }
}

impl<T, S> ErasedStep<T, S::Error> for StepWrapper<T, S>
where
    T: 'static,
    S: AtomicStep<T> + 'static,
    S::Error: 'static,
{
    fn take_compensation(&mut self) -> Box<dyn Compensation<S::Error>> {
        let step = Arc::clone(&self.step);
        let node = CompensatingNode::new(self.step.name(), move |snapshot: S::Snapshot| {
            step.compensate(snapshot)
        })
        .with_value(self.snapshot.take());
        Box::new(node)
    }

    fn clear_snapshot(&mut self) {
        self.snapshot = None;
    }
}
