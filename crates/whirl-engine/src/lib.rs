//! Whirl engine crate.
//!
//! Owns the platform + GPU runtime pieces used by the demo binary: device
//! setup, the shader toolchain (load / compile / link), triangle geometry,
//! frame timing, and the window runtime.

pub mod core;
pub mod device;
pub mod logging;
pub mod render;
pub mod shader;
pub mod time;
pub mod window;
