//! Time subsystem.
//!
//! Frame timing and the animation state derived from it, decoupled from the
//! runtime so both are unit-testable. Intended usage:
//! - one `FrameClock` per render loop, anchored at loop start
//! - call `tick()` once per presented frame to obtain a `FrameTime`
//! - derive `RotationState` from the elapsed time, never accumulate it

mod frame_clock;
mod rotation;

pub use frame_clock::{FrameClock, FrameTime};
pub use rotation::RotationState;
