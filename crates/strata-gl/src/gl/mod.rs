//! GPU API surface.
//!
//! Everything in this crate talks to the graphics driver through [`Gl`], a
//! narrow object-safe subset of OpenGL ES 3.0. GPU object names are raw `u32`
//! values with `0` meaning "none", mirroring the GL convention so that state
//! snapshots stay plain-old-data.
//!
//! Implementations:
//! - [`GlowBackend`]: production backend over a current `glow::Context`
//! - `FakeGl` (tests only): records calls and answers introspection queries
//!   from scripted program fixtures

mod error;
mod glow_backend;

#[cfg(test)]
pub(crate) mod fake;

pub use error::{check_err, GlError, GlErrorKind};
pub use glow_backend::GlowBackend;

/// Result of an active attribute/uniform query.
///
/// `name` holds the raw bytes reported by the driver; decoding is left to the
/// caller so that an undecodable name can be surfaced as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveInfo {
    /// GL type enum (e.g. `glow::FLOAT_VEC4`).
    pub ty: u32,
    /// Array length; 1 for non-arrays.
    pub size: i32,
    pub name: Vec<u8>,
}

/// The subset of OpenGL ES 3.0 used by the state stacks, the reflector and
/// uniform-block uploads.
///
/// All calls must be issued on the thread that owns the GL context.
pub trait Gl {
    // ── capabilities & fixed-function state ───────────────────────────────

    fn enable(&self, cap: u32);
    fn disable(&self, cap: u32);
    fn blend_func_separate(&self, src_rgb: u32, dst_rgb: u32, src_alpha: u32, dst_alpha: u32);
    fn blend_color(&self, red: f32, green: f32, blue: f32, alpha: f32);
    fn color_mask(&self, red: bool, green: bool, blue: bool, alpha: bool);
    fn cull_face(&self, face: u32);
    fn depth_mask(&self, on: bool);
    fn depth_func(&self, func: u32);
    fn polygon_offset(&self, factor: f32, units: f32);
    fn scissor(&self, x: i32, y: i32, width: i32, height: i32);
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    fn stencil_func_separate(&self, face: u32, func: u32, reference: i32, mask: u32);
    fn stencil_op_separate(&self, face: u32, stencil_fail: u32, depth_fail: u32, pass: u32);

    // ── bindings ──────────────────────────────────────────────────────────

    fn use_program(&self, program: u32);
    fn bind_buffer(&self, target: u32, buffer: u32);
    fn bind_buffer_base(&self, target: u32, index: u32, buffer: u32);
    fn bind_texture(&self, target: u32, texture: u32);

    // ── objects ───────────────────────────────────────────────────────────

    fn create_buffer(&self) -> Result<u32, String>;
    fn delete_buffer(&self, buffer: u32);
    fn buffer_data(&self, target: u32, data: &[u8], usage: u32);
    fn create_texture(&self) -> Result<u32, String>;
    fn delete_texture(&self, texture: u32);

    // ── shaders & programs ────────────────────────────────────────────────

    fn create_shader(&self, kind: u32) -> Result<u32, String>;
    fn shader_source(&self, shader: u32, source: &str);
    fn compile_shader(&self, shader: u32);
    fn shader_compile_status(&self, shader: u32) -> bool;
    fn shader_info_log(&self, shader: u32) -> String;
    fn delete_shader(&self, shader: u32);

    fn create_program(&self) -> Result<u32, String>;
    fn attach_shader(&self, program: u32, shader: u32);
    fn detach_shader(&self, program: u32, shader: u32);
    fn link_program(&self, program: u32);
    fn program_link_status(&self, program: u32) -> bool;
    fn program_info_log(&self, program: u32) -> String;
    fn delete_program(&self, program: u32);

    // ── introspection ─────────────────────────────────────────────────────

    fn program_parameter(&self, program: u32, pname: u32) -> i32;
    fn active_attribute(&self, program: u32, index: u32) -> Option<ActiveInfo>;
    fn active_uniform(&self, program: u32, index: u32) -> Option<ActiveInfo>;
    /// Bulk `glGetActiveUniformsiv`; one value per entry of `indices`.
    fn active_uniforms_parameter(&self, program: u32, indices: &[u32], pname: u32) -> Vec<i32>;
    fn uniform_location(&self, program: u32, name: &str) -> Option<u32>;
    fn uniform_block_parameter(&self, program: u32, block: u32, pname: u32) -> i32;
    /// Fills `out` with `UNIFORM_BLOCK_ACTIVE_UNIFORM_INDICES`.
    fn uniform_block_member_indices(&self, program: u32, block: u32, out: &mut [i32]);
    fn uniform_block_name(&self, program: u32, block: u32) -> Vec<u8>;
    fn uniform_block_binding(&self, program: u32, block: u32, binding: u32);
    /// `glUniform1i` on the currently bound program.
    fn uniform_1_i32(&self, location: u32, value: i32);

    // ── queries ───────────────────────────────────────────────────────────

    fn get_parameter_i32(&self, pname: u32) -> i32;

    // ── errors ────────────────────────────────────────────────────────────

    fn get_error(&self) -> u32;
}
