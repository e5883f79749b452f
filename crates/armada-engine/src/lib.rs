//! Armada engine crate.
//!
//! This crate owns the platform + GPU runtime pieces (window, device, input,
//! time) and the 2D graphics subsystem built on top of them: an
//! immediate-mode batched quad renderer, orthographic cameras, textures and
//! font atlases.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod paint;
pub mod graphics;
