//! Thread-local context tracking for crash reports.
//!
//! Records which generation phase is running and which file or history
//! source it is working on, so a panic can say where it happened. Guards
//! restore the previous context on drop.

use std::cell::RefCell;
use std::path::PathBuf;

thread_local! {
    static CURRENT_CONTEXT: RefCell<GenerationContext> = const { RefCell::new(GenerationContext::new()) };
}

/// Snapshot of what the generator was doing.
#[derive(Debug, Clone, Default)]
pub struct GenerationContext {
    pub phase: Option<GenerationPhase>,
    /// Table file being read or written
    pub current_file: Option<PathBuf>,
    /// Description of the history source being scanned
    pub history_source: Option<String>,
}

impl GenerationContext {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: None,
            current_file: None,
            history_source: None,
        }
    }
}

/// Stages of a generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationPhase {
    /// Reading the previous compatibility table
    LoadingPriorTable,
    /// Computing the next version number
    ResolvingVersion,
    /// Reading history and extracting signatures
    ScanningHistory,
    /// Serializing and writing the new table
    Writing,
}

impl std::fmt::Display for GenerationPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LoadingPriorTable => write!(f, "loading_prior_table"),
            Self::ResolvingVersion => write!(f, "resolving_version"),
            Self::ScanningHistory => write!(f, "scanning_history"),
            Self::Writing => write!(f, "writing"),
        }
    }
}

/// RAII guard restoring the previous context on drop.
pub struct ContextGuard {
    previous: GenerationContext,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        CURRENT_CONTEXT.with(|ctx| {
            *ctx.borrow_mut() = self.previous.clone();
        });
    }
}

fn replace_with(update: impl FnOnce(&mut GenerationContext)) -> ContextGuard {
    CURRENT_CONTEXT.with(|ctx| {
        let previous = ctx.borrow().clone();
        update(&mut ctx.borrow_mut());
        ContextGuard { previous }
    })
}

/// Enter `phase` until the returned guard drops.
#[must_use]
pub fn set_phase(phase: GenerationPhase) -> ContextGuard {
    replace_with(|ctx| ctx.phase = Some(phase))
}

/// Record the table file being processed until the guard drops.
#[must_use]
pub fn set_current_file(path: impl Into<PathBuf>) -> ContextGuard {
    let path = path.into();
    replace_with(|ctx| ctx.current_file = Some(path))
}

/// Record the history source being scanned until the guard drops.
#[must_use]
pub fn set_history_source(description: impl Into<String>) -> ContextGuard {
    let description = description.into();
    replace_with(|ctx| ctx.history_source = Some(description))
}

/// Current context snapshot, read by the panic hook.
#[must_use]
pub fn get_current_context() -> GenerationContext {
    CURRENT_CONTEXT.with(|ctx| ctx.borrow().clone())
}

/// Reset the current thread's context to empty.
pub fn reset_context() {
    CURRENT_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = GenerationContext::new();
    });
}
