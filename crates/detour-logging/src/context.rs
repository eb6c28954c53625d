//! Run context for log correlation
//!
//! Every simulation run gets a unique run id. The [`RunContextGuard`] keeps
//! that id and the run's seed in thread-local storage; [`run_span`] reads it
//! back so every line logged inside the span carries both, and lines from
//! different runs appended to the same JSONL file can be told apart.

use std::cell::RefCell;

use tracing::{Span, info_span};
use uuid::Uuid;

/// Run context data stored in thread-local storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContextData {
    /// Unique id of this run
    pub run_id: Uuid,
    /// Seed that reproduces this run
    pub seed: u64,
}

thread_local! {
    static RUN_CONTEXT: RefCell<Option<RunContextData>> = const { RefCell::new(None) };
}

/// RAII guard for run context
///
/// When this guard is created, it sets the run context for the current thread.
/// When it's dropped, it restores the previous context (if any).
///
/// # Example
///
/// ```ignore
/// use detour_logging::RunContextGuard;
///
/// let _guard = RunContextGuard::new(seed);
/// let _enter = run_span().entered();
/// ```
pub struct RunContextGuard {
    current: RunContextData,
    previous: Option<RunContextData>,
}

impl RunContextGuard {
    /// Start a new run context with a fresh run id
    pub fn new(seed: u64) -> Self {
        Self::with_run_id(Uuid::new_v4(), seed)
    }

    /// Start a run context with a specific run id
    pub fn with_run_id(run_id: Uuid, seed: u64) -> Self {
        let current = RunContextData { run_id, seed };
        let previous = RUN_CONTEXT.with(|ctx| ctx.borrow_mut().replace(current.clone()));
        Self { current, previous }
    }

    /// Run id held by this guard
    pub fn run_id(&self) -> Uuid {
        self.current.run_id
    }

    /// Seed held by this guard
    pub fn seed(&self) -> u64 {
        self.current.seed
    }

    /// Get the current run context (if any)
    pub fn current() -> Option<RunContextData> {
        RUN_CONTEXT.with(|ctx| ctx.borrow().clone())
    }

    /// Get the current run id (if set)
    pub fn current_run_id() -> Option<Uuid> {
        Self::current().map(|ctx| ctx.run_id)
    }
}

impl Drop for RunContextGuard {
    fn drop(&mut self) {
        RUN_CONTEXT.with(|ctx| *ctx.borrow_mut() = self.previous.take());
    }
}

/// Span named `run` carrying the current thread's run id and seed
///
/// Returns a disabled span when no [`RunContextGuard`] is active.
pub fn run_span() -> Span {
    match RunContextGuard::current() {
        Some(ctx) => info_span!("run", run_id = %ctx.run_id, seed = ctx.seed),
        None => Span::none(),
    }
}
