//! Crash reporting and phase tracking.
//!
//! Install the panic hook at startup and mark phases while generating:
//!
//! ```ignore
//! use compatgen::observability::{install_panic_hook, set_phase, GenerationPhase};
//!
//! install_panic_hook();
//! let _phase = set_phase(GenerationPhase::ScanningHistory);
//! ```

pub mod context;
pub mod panic_hook;

pub use context::{
    get_current_context, reset_context, set_current_file, set_history_source, set_phase,
    ContextGuard, GenerationContext, GenerationPhase,
};
pub use panic_hook::install_panic_hook;
