use tracing::debug;

use crate::chain::{ForwardChain, Operator};
use crate::compensation::CompensatingChain;
use crate::step::StepChain;

/// A unit of provisioning work that can be chained with other units.
///
/// Handlers are the only thing a [`HandlerChain`] accepts, so plain
/// operators and handlers can never be mixed in one chain.
pub trait ProvisioningHandler<T>: Send {
    /// Error type for handler failures.
    type Error;

    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Run the handler's unit of work.
    ///
    /// # Errors
    ///
    /// Returns an error if any part of the unit fails.
    fn handle(&mut self, input: &T) -> Result<(), Self::Error>;

    /// This handler's own compensations, most recent first.
    ///
    /// Most remote pushes cannot be cheaply undone, so the default is the
    /// no-op rollback.
    fn rollback(&mut self) -> CompensatingChain<Self::Error> {
        CompensatingChain::noop()
    }

    /// Forget any undo state from a previous run.
    fn reset(&mut self) {}
}

/// Handler whose unit of work is a [`StepChain`].
pub struct StepHandler<T, E> {
    name: &'static str,
    steps: StepChain<T, E>,
}

impl<T, E> StepHandler<T, E> {
    #[must_use]
    pub fn new(name: &'static str, steps: StepChain<T, E>) -> Self {
        Self { name, steps }
    }
}

impl<T, E> ProvisioningHandler<T> for StepHandler<T, E>
where
    T: 'static,
    E: 'static,
{
    type Error = E;

    fn name(&self) -> &str {
        self.name
    }

    fn handle(&mut self, input: &T) -> Result<(), E> {
        self.steps.apply(input)
    }

    fn rollback(&mut self) -> CompensatingChain<E> {
        self.steps.rollback()
    }

    fn reset(&mut self) {
        self.steps.reset();
    }
}

struct HandlerSlot<T, E> {
    handler: Box<dyn ProvisioningHandler<T, Error = E>>,
    complete: bool,
}

impl<T, E> Operator<T> for HandlerSlot<T, E> {
    type Error = E;

    fn name(&self) -> &str {
        self.handler.name()
    }

    fn apply(&mut self, input: &T) -> Result<(), E> {
        self.complete = false;
        self.handler.handle(input)?;
        self.complete = true;
        Ok(())
    }
}

/// A chain of provisioning handlers with completion tracking.
///
/// Each handler carries an `is_complete` flag that is true only when its
/// most recent run returned without error. Applying the chain clears every
/// flag and resets every handler first, then runs the handlers head to tail.
///
/// Rollback walks backwards from a chosen handler: that handler's own
/// compensations run first, then those of every handler before it.
/// [`rollback`](Self::rollback) starts at the tail and covers the whole
/// chain. [`rollback_at`](Self::rollback_at) starting at an earlier handler
/// leaves everything appended after it untouched.
pub struct HandlerChain<T, E> {
    chain: ForwardChain<HandlerSlot<T, E>>,
}

impl<T, E> HandlerChain<T, E>
where
    T: 'static,
    E: 'static,
{
    /// Start a chain with its first handler.
    #[must_use]
    pub fn new<H>(first: H) -> Self
    where
        H: ProvisioningHandler<T, Error = E> + 'static,
    {
        Self {
            chain: ForwardChain::new(Self::slot(first)),
        }
    }

    /// Append a handler after the current tail.
    #[must_use]
    pub fn then<H>(self, next: H) -> Self
    where
        H: ProvisioningHandler<T, Error = E> + 'static,
    {
        Self {
            chain: self.chain.then(Self::slot(next)),
        }
    }

    fn slot<H>(handler: H) -> HandlerSlot<T, E>
    where
        H: ProvisioningHandler<T, Error = E> + 'static,
    {
        HandlerSlot {
            handler: Box::new(handler),
            complete: false,
        }
    }

    /// Number of handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// A handler chain always has a head, so this is only `false`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Handler names, head first.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.chain.names::<T>()
    }

    /// Whether the handler at `index` completed its most recent run.
    #[must_use]
    pub fn is_complete(&self, index: usize) -> bool {
        self.chain.nodes().get(index).is_some_and(|slot| slot.complete)
    }

    /// Whether the tail handler completed, i.e. the whole chain did.
    #[must_use]
    pub fn is_tail_complete(&self) -> bool {
        self.is_complete(self.len() - 1)
    }

    /// Run every handler head to tail.
    ///
    /// # Errors
    ///
    /// Returns the first handler error; later handlers do not run.
    pub fn apply(&mut self, input: &T) -> Result<(), E> {
        self.reset();
        self.chain.apply(input)
    }

    /// Clear every completion flag and every handler's undo state.
    pub fn reset(&mut self) {
        for slot in self.chain.nodes_mut() {
            slot.complete = false;
            slot.handler.reset();
        }
    }

    /// Rollback for the whole chain, starting at the tail.
    pub fn rollback(&mut self) -> CompensatingChain<E> {
        let tail = self.len() - 1;
        self.rollback_at(tail)
    }

    /// Rollback starting at the handler at `index`.
    ///
    /// If that handler completed, there is nothing to compensate and the
    /// no-op rollback is returned. Otherwise its compensations come first,
    /// followed by every earlier handler's, nearest first. Handlers after
    /// `index` are never included. An out-of-range index is clamped to the
    /// tail.
    pub fn rollback_at(&mut self, index: usize) -> CompensatingChain<E> {
        let index = index.min(self.len() - 1);
        let slots = self.chain.nodes_mut();

        if slots[index].complete {
            debug!(
                handler = slots[index].handler.name(),
                "handler completed, nothing to roll back"
            );
            return CompensatingChain::noop();
        }

        let mut rollback = CompensatingChain::noop();
        for slot in slots[..=index].iter_mut().rev() {
            debug!(handler = slot.handler.name(), "collecting compensations");
            rollback.append(slot.handler.rollback());
        }
        rollback
    }
}

impl<T, E> ProvisioningHandler<T> for HandlerChain<T, E>
where
    T: 'static,
    E: 'static,
{
    type Error = E;

    fn name(&self) -> &str {
        "handler_chain"
    }

    fn handle(&mut self, input: &T) -> Result<(), E> {
        self.apply(input)
    }

    fn rollback(&mut self) -> CompensatingChain<E> {
        HandlerChain::rollback(self)
    }

    fn reset(&mut self) {
        HandlerChain::reset(self);
    }
}
