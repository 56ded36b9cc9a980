//! Shader toolchain: source loading, per-stage compilation, program linking.
//!
//! Compile and link failures are carried as values (a stage or program
//! marked failed plus a bounded diagnostic) rather than panics or early
//! exits. Both stages can therefore be compiled and their errors reported
//! in a single run; the caller decides whether to escalate. A failed
//! program reaches the renderer, which refuses to build a pipeline from it
//! and draws nothing.

mod compile;
mod link;
mod source;

pub use compile::{CompiledStage, StageKind};
pub use link::{LinkedProgram, UniformLocation};
pub use source::load_source;
