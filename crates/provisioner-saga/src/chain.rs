use tracing::{debug, warn};

/// A single link of a [`ForwardChain`].
///
/// Every operator of a chain receives the same, unmodified input.
pub trait Operator<T> {
    /// Error type for operator failures.
    type Error;

    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Run the operator against the shared input.
    ///
    /// # Errors
    ///
    /// Returns an error if the operator fails; the chain stops at that point.
    fn apply(&mut self, input: &T) -> Result<(), Self::Error>;
}

impl<T, O> Operator<T> for Box<O>
where
    O: Operator<T> + ?Sized,
{
    type Error = O::Error;

    fn name(&self) -> &str {
        (**self).name()
    }

    fn apply(&mut self, input: &T) -> Result<(), Self::Error> {
        (**self).apply(input)
    }
}

/// Operator backed by a closure.
pub struct FnOperator<F> {
    name: String,
    op: F,
}

/// Wrap a closure as a named [`Operator`].
#[must_use]
pub fn operator<T, E, F>(name: impl Into<String>, op: F) -> FnOperator<F>
where
    F: FnMut(&T) -> Result<(), E>,
{
    FnOperator {
        name: name.into(),
        op,
    }
}

impl<T, E, F> Operator<T> for FnOperator<F>
where
    F: FnMut(&T) -> Result<(), E>,
{
    type Error = E;

    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&mut self, input: &T) -> Result<(), E> {
        (self.op)(input)
    }
}

/// An ordered sequence of operators sharing one input.
///
/// The chain is always executed as a whole, head to tail. Building it with
/// repeated [`then`](Self::then) calls hands back the same chain, so whichever
/// binding a caller keeps still runs every link from the first one.
///
/// Execution is fail-fast: the first error stops the traversal and is
/// returned unchanged. Effects of the links that already ran are left in
/// place; undoing them is the job of a [`CompensatingChain`](crate::CompensatingChain).
pub struct ForwardChain<N> {
    nodes: Vec<N>,
}

impl<N> ForwardChain<N> {
    /// Start a chain with its head node.
    #[must_use]
    pub fn new(head: N) -> Self {
        Self { nodes: vec![head] }
    }

    /// Append `next` as the new tail.
    #[must_use]
    pub fn then(mut self, next: N) -> Self {
        self.nodes.push(next);
        self
    }

    /// Number of links in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A chain always has a head, so this is only `false`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Links in head-to-tail order.
    #[must_use]
    pub fn nodes(&self) -> &[N] {
        &self.nodes
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [N] {
        &mut self.nodes
    }

    /// Run every link from head to tail with the same input.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing link. No later link runs.
    pub fn apply<T>(&mut self, input: &T) -> Result<(), N::Error>
    where
        N: Operator<T>,
    {
        let total = self.nodes.len();
        for (position, node) in self.nodes.iter_mut().enumerate() {
            debug!(operator = node.name(), position, total, "applying operator");
            if let Err(error) = node.apply(input) {
                warn!(operator = node.name(), position, "operator failed, aborting chain");
                return Err(error);
            }
        }
        Ok(())
    }

    /// Names of all links, head first.
    pub fn names<T>(&self) -> Vec<String>
    where
        N: Operator<T>,
    {
        self.nodes.iter().map(|n| n.name().to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    type Log = Rc<RefCell<Vec<String>>>;

    fn recording(name: &'static str, log: &Log) -> Box<dyn Operator<i32, Error = String>> {
        let log = Rc::clone(log);
        Box::new(operator(name, move |input: &i32| {
            log.borrow_mut().push(format!("{name}:{input}"));
            Ok::<(), String>(())
        }))
    }

    fn failing(name: &'static str, log: &Log) -> Box<dyn Operator<i32, Error = String>> {
        let log = Rc::clone(log);
        Box::new(operator(name, move |_: &i32| {
            log.borrow_mut().push(format!("{name}:failed"));
            Err::<(), String>(format!("{name} exploded"))
        }))
    }

    #[test]
    fn apply_runs_every_link_in_order_with_the_same_input() {
        let log = Log::default();
        let mut chain = ForwardChain::new(recording("a", &log))
            .then(recording("b", &log))
            .then(recording("c", &log));

        chain.apply(&7).expect("chain should succeed");

        assert_eq!(*log.borrow(), vec!["a:7", "b:7", "c:7"]);
    }

    #[test]
    fn apply_stops_at_first_failure() {
        let log = Log::default();
        let mut chain = ForwardChain::new(recording("a", &log))
            .then(failing("b", &log))
            .then(recording("c", &log));

        let err = chain.apply(&1).expect_err("middle link fails");

        assert_eq!(err, "b exploded");
        assert_eq!(*log.borrow(), vec!["a:1", "b:failed"]);
    }

    #[test]
    fn failure_leaves_earlier_effects_in_place() {
        let log = Log::default();
        let mut chain = ForwardChain::new(recording("a", &log)).then(failing("b", &log));

        let _ = chain.apply(&3);

        assert_eq!(log.borrow()[0], "a:3");
    }

    #[test]
    fn reapplying_runs_the_whole_chain_again() {
        let log = Log::default();
        let mut chain = ForwardChain::new(recording("a", &log)).then(recording("b", &log));

        chain.apply(&1).expect("first run");
        chain.apply(&2).expect("second run");

        assert_eq!(*log.borrow(), vec!["a:1", "b:1", "a:2", "b:2"]);
    }

    #[test]
    fn names_are_head_first() {
        let log = Log::default();
        let chain = ForwardChain::new(recording("first", &log)).then(recording("second", &log));

        assert_eq!(chain.names::<i32>(), vec!["first", "second"]);
        assert_eq!(chain.len(), 2);
        assert!(!chain.is_empty());
    }
}
