use std::num::NonZeroU32;

use glow::HasContext;

use super::{ActiveInfo, Gl};

/// [`Gl`] implementation over a native `glow::Context`.
///
/// Object names cross the boundary as raw `u32`; `0` maps to `None` for
/// binding calls and turns deletions into no-ops.
pub struct GlowBackend {
    gl: glow::Context,
}

impl GlowBackend {
    /// Wraps a loaded GL context.
    ///
    /// # Safety
    ///
    /// `gl` must be current on the calling thread and must stay current for as
    /// long as this backend is used. Every [`Gl`] method forwards to `glow`
    /// under that assumption.
    pub unsafe fn new(gl: glow::Context) -> Self {
        Self { gl }
    }

    /// Returns the wrapped context for calls outside the [`Gl`] subset.
    #[inline]
    pub fn context(&self) -> &glow::Context {
        &self.gl
    }
}

#[inline]
fn program(id: u32) -> Option<glow::NativeProgram> {
    NonZeroU32::new(id).map(glow::NativeProgram)
}

#[inline]
fn shader(id: u32) -> Option<glow::NativeShader> {
    NonZeroU32::new(id).map(glow::NativeShader)
}

#[inline]
fn buffer(id: u32) -> Option<glow::NativeBuffer> {
    NonZeroU32::new(id).map(glow::NativeBuffer)
}

#[inline]
fn texture(id: u32) -> Option<glow::NativeTexture> {
    NonZeroU32::new(id).map(glow::NativeTexture)
}

// SAFETY (all blocks below): the context is current on this thread, which is
// the contract of `GlowBackend::new`.
impl Gl for GlowBackend {
    fn enable(&self, cap: u32) {
        unsafe { self.gl.enable(cap) }
    }

    fn disable(&self, cap: u32) {
        unsafe { self.gl.disable(cap) }
    }

    fn blend_func_separate(&self, src_rgb: u32, dst_rgb: u32, src_alpha: u32, dst_alpha: u32) {
        unsafe { self.gl.blend_func_separate(src_rgb, dst_rgb, src_alpha, dst_alpha) }
    }

    fn blend_color(&self, red: f32, green: f32, blue: f32, alpha: f32) {
        unsafe { self.gl.blend_color(red, green, blue, alpha) }
    }

    fn color_mask(&self, red: bool, green: bool, blue: bool, alpha: bool) {
        unsafe { self.gl.color_mask(red, green, blue, alpha) }
    }

    fn cull_face(&self, face: u32) {
        unsafe { self.gl.cull_face(face) }
    }

    fn depth_mask(&self, on: bool) {
        unsafe { self.gl.depth_mask(on) }
    }

    fn depth_func(&self, func: u32) {
        unsafe { self.gl.depth_func(func) }
    }

    fn polygon_offset(&self, factor: f32, units: f32) {
        unsafe { self.gl.polygon_offset(factor, units) }
    }

    fn scissor(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.scissor(x, y, width, height) }
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.viewport(x, y, width, height) }
    }

    fn stencil_func_separate(&self, face: u32, func: u32, reference: i32, mask: u32) {
        unsafe { self.gl.stencil_func_separate(face, func, reference, mask) }
    }

    fn stencil_op_separate(&self, face: u32, stencil_fail: u32, depth_fail: u32, pass: u32) {
        unsafe { self.gl.stencil_op_separate(face, stencil_fail, depth_fail, pass) }
    }

    fn use_program(&self, id: u32) {
        unsafe { self.gl.use_program(program(id)) }
    }

    fn bind_buffer(&self, target: u32, id: u32) {
        unsafe { self.gl.bind_buffer(target, buffer(id)) }
    }

    fn bind_buffer_base(&self, target: u32, index: u32, id: u32) {
        unsafe { self.gl.bind_buffer_base(target, index, buffer(id)) }
    }

    fn bind_texture(&self, target: u32, id: u32) {
        unsafe { self.gl.bind_texture(target, texture(id)) }
    }

    fn create_buffer(&self) -> Result<u32, String> {
        unsafe { self.gl.create_buffer() }.map(|b| b.0.get())
    }

    fn delete_buffer(&self, id: u32) {
        if let Some(b) = buffer(id) {
            unsafe { self.gl.delete_buffer(b) }
        }
    }

    fn buffer_data(&self, target: u32, data: &[u8], usage: u32) {
        unsafe { self.gl.buffer_data_u8_slice(target, data, usage) }
    }

    fn create_texture(&self) -> Result<u32, String> {
        unsafe { self.gl.create_texture() }.map(|t| t.0.get())
    }

    fn delete_texture(&self, id: u32) {
        if let Some(t) = texture(id) {
            unsafe { self.gl.delete_texture(t) }
        }
    }

    fn create_shader(&self, kind: u32) -> Result<u32, String> {
        unsafe { self.gl.create_shader(kind) }.map(|s| s.0.get())
    }

    fn shader_source(&self, id: u32, source: &str) {
        if let Some(s) = shader(id) {
            unsafe { self.gl.shader_source(s, source) }
        }
    }

    fn compile_shader(&self, id: u32) {
        if let Some(s) = shader(id) {
            unsafe { self.gl.compile_shader(s) }
        }
    }

    fn shader_compile_status(&self, id: u32) -> bool {
        shader(id).is_some_and(|s| unsafe { self.gl.get_shader_compile_status(s) })
    }

    fn shader_info_log(&self, id: u32) -> String {
        shader(id)
            .map(|s| unsafe { self.gl.get_shader_info_log(s) })
            .unwrap_or_default()
    }

    fn delete_shader(&self, id: u32) {
        if let Some(s) = shader(id) {
            unsafe { self.gl.delete_shader(s) }
        }
    }

    fn create_program(&self) -> Result<u32, String> {
        unsafe { self.gl.create_program() }.map(|p| p.0.get())
    }

    fn attach_shader(&self, prog: u32, sh: u32) {
        if let (Some(p), Some(s)) = (program(prog), shader(sh)) {
            unsafe { self.gl.attach_shader(p, s) }
        }
    }

    fn detach_shader(&self, prog: u32, sh: u32) {
        if let (Some(p), Some(s)) = (program(prog), shader(sh)) {
            unsafe { self.gl.detach_shader(p, s) }
        }
    }

    fn link_program(&self, id: u32) {
        if let Some(p) = program(id) {
            unsafe { self.gl.link_program(p) }
        }
    }

    fn program_link_status(&self, id: u32) -> bool {
        program(id).is_some_and(|p| unsafe { self.gl.get_program_link_status(p) })
    }

    fn program_info_log(&self, id: u32) -> String {
        program(id)
            .map(|p| unsafe { self.gl.get_program_info_log(p) })
            .unwrap_or_default()
    }

    fn delete_program(&self, id: u32) {
        if let Some(p) = program(id) {
            unsafe { self.gl.delete_program(p) }
        }
    }

    fn program_parameter(&self, id: u32, pname: u32) -> i32 {
        program(id).map_or(0, |p| unsafe { self.gl.get_program_parameter_i32(p, pname) })
    }

    fn active_attribute(&self, id: u32, index: u32) -> Option<ActiveInfo> {
        let p = program(id)?;
        let attr = unsafe { self.gl.get_active_attribute(p, index) }?;
        Some(ActiveInfo {
            ty: attr.atype,
            size: attr.size,
            name: attr.name.into_bytes(),
        })
    }

    fn active_uniform(&self, id: u32, index: u32) -> Option<ActiveInfo> {
        let p = program(id)?;
        let uni = unsafe { self.gl.get_active_uniform(p, index) }?;
        Some(ActiveInfo {
            ty: uni.utype,
            size: uni.size,
            name: uni.name.into_bytes(),
        })
    }

    fn active_uniforms_parameter(&self, id: u32, indices: &[u32], pname: u32) -> Vec<i32> {
        match program(id) {
            Some(p) if !indices.is_empty() => unsafe {
                self.gl.get_active_uniforms_parameter(p, indices, pname)
            },
            _ => Vec::new(),
        }
    }

    fn uniform_location(&self, id: u32, name: &str) -> Option<u32> {
        let p = program(id)?;
        unsafe { self.gl.get_uniform_location(p, name) }.map(|loc| loc.0)
    }

    fn uniform_block_parameter(&self, id: u32, block: u32, pname: u32) -> i32 {
        program(id).map_or(0, |p| unsafe {
            self.gl.get_active_uniform_block_parameter_i32(p, block, pname)
        })
    }

    fn uniform_block_member_indices(&self, id: u32, block: u32, out: &mut [i32]) {
        if let Some(p) = program(id) {
            if out.is_empty() {
                return;
            }
            unsafe {
                self.gl.get_active_uniform_block_parameter_i32_slice(
                    p,
                    block,
                    glow::UNIFORM_BLOCK_ACTIVE_UNIFORM_INDICES,
                    out,
                )
            }
        }
    }

    fn uniform_block_name(&self, id: u32, block: u32) -> Vec<u8> {
        program(id)
            .map(|p| unsafe { self.gl.get_active_uniform_block_name(p, block) }.into_bytes())
            .unwrap_or_default()
    }

    fn uniform_block_binding(&self, id: u32, block: u32, binding: u32) {
        if let Some(p) = program(id) {
            unsafe { self.gl.uniform_block_binding(p, block, binding) }
        }
    }

    fn uniform_1_i32(&self, location: u32, value: i32) {
        let loc = glow::NativeUniformLocation(location);
        unsafe { self.gl.uniform_1_i32(Some(&loc), value) }
    }

    fn get_parameter_i32(&self, pname: u32) -> i32 {
        unsafe { self.gl.get_parameter_i32(pname) }
    }

    fn get_error(&self) -> u32 {
        unsafe { self.gl.get_error() }
    }
}
