//! Strata: nested pipeline-state stacks and uniform-block reflection for
//! OpenGL ES 3.
//!
//! The crate sits between raw GL calls and render code:
//! - [`state`]: save/apply/restore stacks for each piece of pipeline state
//! - [`shader`]: program lifecycle and reflection of attributes, uniforms and
//!   uniform blocks
//! - [`ubo`]: typed reads and writes into uniform-block buffers
//! - [`env`]: the per-context [`DrawEnv`] that owns all of the above
//!
//! Everything talks to the driver through the [`gl::Gl`] trait; production
//! code wraps a `glow::Context` in [`gl::GlowBackend`].

pub mod env;
pub mod gl;
pub mod logging;
pub mod shader;
pub mod state;
pub mod ubo;

pub use env::{DrawEnv, EnvConfig};
