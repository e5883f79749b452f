//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the game window, and wires them to the
//! GPU layer. The runtime drives one window and redraws continuously.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig, RuntimeCtx};
pub use winit::dpi::LogicalSize;
