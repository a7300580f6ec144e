//! Automatic tainting and symbolization of program arguments for debugger-hosted
//! analysis.
//!
//! When a freshly-started target stops at its entry function, this crate reads
//! `argc`/`argv` out of the live process and marks every argument byte in an
//! external taint or symbolic-execution engine, so that the rest of the analysis
//! can track which registers and memory locations the user controls. Afterwards it
//! inspects each executed instruction and comments the controlled reads at that
//! instruction's address.
//!
//! The debugger host and the analysis engine are external collaborators, consumed
//! through the [host::Debugger] and [engine::Engine] traits. The
//! [analysis::Analysis] facade owns all process-wide state and exposes the two
//! host event entry points: breakpoint dispatch
//! ([analysis::Analysis::on_breakpoint]) and per-instruction annotation
//! ([analysis::Analysis::on_instruction]).
//!
//! Everything runs synchronously on the host's control thread; nothing here is
//! shared across threads.

/// Owned analysis context and the facade tying the components together.
pub mod analysis;

/// Per-instruction inspection of controlled registers and memory.
pub mod annotate;

/// Process-wide behavior switches.
pub mod config;

/// Interface consumed from the taint/symbolic engine, plus the mode-independent
/// marking capability built on top of it.
pub mod engine;

/// Interface consumed from the debugger host.
pub mod host;

/// Deferred actions to run when specific breakpoints are hit.
pub mod registry;

/// Entry discovery and the argument-seeding breakpoint callback.
pub mod seeder;

/// One-way latch arming downstream instrumentation.
pub mod trigger;

#[cfg(test)]
mod test_fixture;

#[cfg(test)]
mod tests;
