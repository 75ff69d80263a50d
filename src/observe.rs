//! Step-granularity observation and cooperative cancellation
//!
//! Long solves and propagations report one event per iteration or time step.
//! An observer may answer with [`Action::StopEarly`] to end the run; the
//! caller then gets everything computed so far.

/// Control actions an observer can request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop after the current step and return the partial result.
    StopEarly,
}

/// How a propagation run terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// All requested steps were taken.
    Complete,

    /// An observer returned [`Action::StopEarly`].
    StoppedByObserver,
}

/// Receives solver events and optionally returns a control action
pub trait Observer<E> {
    fn observe(&mut self, event: &E) -> Option<Action>;
}

impl<E, F> Observer<E> for F
where
    F: FnMut(&E) -> Option<Action>,
{
    fn observe(&mut self, event: &E) -> Option<Action> {
        self(event)
    }
}

/// No-op observer.
impl<E> Observer<E> for () {
    fn observe(&mut self, _event: &E) -> Option<Action> {
        None
    }
}
