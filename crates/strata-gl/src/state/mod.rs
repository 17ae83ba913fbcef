//! Pipeline-state stacks.
//!
//! Every piece of GPU pipeline state (blend, depth test, viewport, bound
//! program, bound buffers, ...) is mirrored by a [`StateStack`] that can save
//! the live value, change it, and restore it later:
//!
//! ```ignore
//! env.blend.push();
//! env.blend.apply_func(true, glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
//! // ... draw ...
//! env.blend.pop(); // previous blend state is restored and re-applied
//! ```
//!
//! A state kind only supplies the [`StateKind`] primitives; the push/pop/grow
//! machinery is shared.

mod binding;
mod fog;
mod settings;
mod stack;

pub use binding::{BufferBinding, ProgramBinding, TextureBinding};
pub use fog::{Fog, FogParams, FogState};
pub use settings::{
    Blend, BlendColor, ColorMask, CullFace, DepthMask, DepthTest, LineWidth, PointSize,
    PolygonOffset, ScissorTest, StencilFace, StencilOp, StencilOps, StencilTest, Viewport,
};
pub use stack::StateStack;

use crate::gl::Gl;

/// Type-specific half of a state stack.
///
/// `Snapshot` is the POD record captured by `push()`; `Default` plays the role
/// of a blank slot.
pub trait StateKind {
    type Snapshot: Copy + Default;

    /// Short name used in logs.
    const NAME: &'static str;

    /// Copies the live fields into a snapshot.
    fn snapshot(&self) -> Self::Snapshot;

    /// Overwrites the live fields from a snapshot without touching the GPU.
    fn restore(&mut self, snapshot: &Self::Snapshot);

    /// Issues the GL calls that make the GPU match the live fields.
    ///
    /// Must be idempotent.
    fn commit(&mut self, gl: &dyn Gl);
}

/// Object-safe view of a state stack.
pub trait DrawSetting {
    fn name(&self) -> &'static str;
    fn apply(&mut self);
    fn push(&mut self);
    fn pop(&mut self);
    fn stack_depth(&self) -> usize;
}
