//! GPU rendering subsystem.
//!
//! Renderers own their device-side resources (pipeline, buffers, bind
//! groups) and issue wgpu commands against a [`RenderTarget`].

mod ctx;
pub mod geometry;
mod triangle;

pub use ctx::{RenderCtx, RenderTarget};
pub use geometry::{GeometryBuffer, TRIANGLE_VERTICES, Vertex};
pub use triangle::TriangleRenderer;
