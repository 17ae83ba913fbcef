//! Headless [`Gl`] used by unit tests.
//!
//! Records every state-setting call and answers introspection queries from
//! scripted [`ProgramFixture`]s. Fixtures are consumed in order by
//! `link_program`.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};

use super::{ActiveInfo, Gl};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum GlCall {
    Enable(u32),
    Disable(u32),
    BlendFuncSeparate(u32, u32, u32, u32),
    BlendColor(f32, f32, f32, f32),
    ColorMask(bool, bool, bool, bool),
    CullFace(u32),
    DepthMask(bool),
    DepthFunc(u32),
    PolygonOffset(f32, f32),
    Scissor(i32, i32, i32, i32),
    Viewport(i32, i32, i32, i32),
    StencilFuncSeparate(u32, u32, i32, u32),
    StencilOpSeparate(u32, u32, u32, u32),
    UseProgram(u32),
    BindBuffer(u32, u32),
    BindBufferBase(u32, u32, u32),
    BindTexture(u32, u32),
    BufferData(u32, usize),
    UniformBlockBinding(u32, u32, u32),
    Uniform1i(u32, i32),
}

#[derive(Debug, Clone)]
pub(crate) struct FakeAttribute {
    pub name: Vec<u8>,
    pub ty: u32,
    pub size: i32,
}

impl FakeAttribute {
    pub fn new(name: &str, ty: u32) -> Self {
        Self {
            name: name.as_bytes().to_vec(),
            ty,
            size: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct FakeUniform {
    pub name: Vec<u8>,
    pub ty: u32,
    pub size: i32,
    pub array_stride: i32,
    pub matrix_stride: i32,
    pub block_index: i32,
    pub offset: i32,
    pub location: Option<u32>,
}

impl FakeUniform {
    /// Default-block uniform with its own location.
    pub fn plain(name: &str, ty: u32, location: u32) -> Self {
        Self {
            name: name.as_bytes().to_vec(),
            ty,
            size: 1,
            array_stride: -1,
            matrix_stride: -1,
            block_index: -1,
            offset: -1,
            location: Some(location),
        }
    }

    /// Member of block `block_index` at byte `offset`.
    pub fn member(name: &str, ty: u32, block_index: i32, offset: i32) -> Self {
        Self {
            name: name.as_bytes().to_vec(),
            ty,
            size: 1,
            array_stride: 0,
            matrix_stride: 0,
            block_index,
            offset,
            location: None,
        }
    }

    pub fn array(mut self, size: i32, stride: i32) -> Self {
        self.size = size;
        self.array_stride = stride;
        self
    }

    pub fn matrix(mut self, stride: i32) -> Self {
        self.matrix_stride = stride;
        self
    }
}

#[derive(Debug, Clone)]
pub(crate) struct FakeBlock {
    pub name: Vec<u8>,
    pub binding: i32,
    pub data_size: i32,
    pub members: Vec<i32>,
}

impl FakeBlock {
    pub fn new(name: &str, data_size: i32, members: Vec<i32>) -> Self {
        Self {
            name: name.as_bytes().to_vec(),
            binding: 0,
            data_size,
            members,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ProgramFixture {
    pub attributes: Vec<FakeAttribute>,
    pub uniforms: Vec<FakeUniform>,
    pub blocks: Vec<FakeBlock>,
    pub link_ok: bool,
    pub info_log: String,
}

impl Default for ProgramFixture {
    fn default() -> Self {
        Self {
            attributes: Vec::new(),
            uniforms: Vec::new(),
            blocks: Vec::new(),
            link_ok: true,
            info_log: String::new(),
        }
    }
}

#[derive(Debug)]
struct FakeShader {
    source: String,
    compiled: bool,
}

#[derive(Debug, Default)]
pub(crate) struct FakeGl {
    calls: RefCell<Vec<GlCall>>,
    errors: RefCell<VecDeque<u32>>,
    next_id: Cell<u32>,

    fixtures: RefCell<VecDeque<ProgramFixture>>,
    programs: RefCell<HashMap<u32, ProgramFixture>>,
    shaders: RefCell<HashMap<u32, FakeShader>>,
    deleted_programs: RefCell<Vec<u32>>,

    buffers: RefCell<HashMap<u32, Vec<u8>>>,
    bound: RefCell<HashMap<u32, u32>>,
    indexed: RefCell<HashMap<(u32, u32), u32>>,
}

impl FakeGl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a fixture for the next `link_program` call.
    pub fn install(&self, fixture: ProgramFixture) {
        self.fixtures.borrow_mut().push_back(fixture);
    }

    /// Queues an error code for `get_error`.
    pub fn push_error(&self, code: u32) {
        self.errors.borrow_mut().push_back(code);
    }

    pub fn calls(&self) -> Vec<GlCall> {
        self.calls.borrow().clone()
    }

    pub fn take_calls(&self) -> Vec<GlCall> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }

    pub fn buffer_contents(&self, buffer: u32) -> Option<Vec<u8>> {
        self.buffers.borrow().get(&buffer).cloned()
    }

    pub fn bound(&self, target: u32) -> u32 {
        self.bound.borrow().get(&target).copied().unwrap_or(0)
    }

    pub fn indexed_binding(&self, target: u32, index: u32) -> u32 {
        self.indexed.borrow().get(&(target, index)).copied().unwrap_or(0)
    }

    pub fn block_binding(&self, program: u32, block: u32) -> Option<i32> {
        self.programs
            .borrow()
            .get(&program)
            .and_then(|p| p.blocks.get(block as usize))
            .map(|b| b.binding)
    }

    pub fn is_program_deleted(&self, program: u32) -> bool {
        self.deleted_programs.borrow().contains(&program)
    }

    pub fn shader_source_of(&self, shader: u32) -> Option<String> {
        self.shaders.borrow().get(&shader).map(|s| s.source.clone())
    }

    fn record(&self, call: GlCall) {
        self.calls.borrow_mut().push(call);
    }

    fn alloc_id(&self) -> u32 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    fn with_program<R>(&self, program: u32, f: impl FnOnce(&ProgramFixture) -> R) -> Option<R> {
        self.programs.borrow().get(&program).map(f)
    }
}

fn max_name_len<'a>(names: impl Iterator<Item = &'a Vec<u8>>) -> i32 {
    // GL counts the terminating NUL.
    names.map(|n| n.len() as i32 + 1).max().unwrap_or(0)
}

impl Gl for FakeGl {
    fn enable(&self, cap: u32) {
        self.record(GlCall::Enable(cap));
    }

    fn disable(&self, cap: u32) {
        self.record(GlCall::Disable(cap));
    }

    fn blend_func_separate(&self, src_rgb: u32, dst_rgb: u32, src_alpha: u32, dst_alpha: u32) {
        self.record(GlCall::BlendFuncSeparate(src_rgb, dst_rgb, src_alpha, dst_alpha));
    }

    fn blend_color(&self, red: f32, green: f32, blue: f32, alpha: f32) {
        self.record(GlCall::BlendColor(red, green, blue, alpha));
    }

    fn color_mask(&self, red: bool, green: bool, blue: bool, alpha: bool) {
        self.record(GlCall::ColorMask(red, green, blue, alpha));
    }

    fn cull_face(&self, face: u32) {
        self.record(GlCall::CullFace(face));
    }

    fn depth_mask(&self, on: bool) {
        self.record(GlCall::DepthMask(on));
    }

    fn depth_func(&self, func: u32) {
        self.record(GlCall::DepthFunc(func));
    }

    fn polygon_offset(&self, factor: f32, units: f32) {
        self.record(GlCall::PolygonOffset(factor, units));
    }

    fn scissor(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record(GlCall::Scissor(x, y, width, height));
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record(GlCall::Viewport(x, y, width, height));
    }

    fn stencil_func_separate(&self, face: u32, func: u32, reference: i32, mask: u32) {
        self.record(GlCall::StencilFuncSeparate(face, func, reference, mask));
    }

    fn stencil_op_separate(&self, face: u32, stencil_fail: u32, depth_fail: u32, pass: u32) {
        self.record(GlCall::StencilOpSeparate(face, stencil_fail, depth_fail, pass));
    }

    fn use_program(&self, program: u32) {
        self.record(GlCall::UseProgram(program));
    }

    fn bind_buffer(&self, target: u32, buffer: u32) {
        self.bound.borrow_mut().insert(target, buffer);
        self.record(GlCall::BindBuffer(target, buffer));
    }

    fn bind_buffer_base(&self, target: u32, index: u32, buffer: u32) {
        // Like GL, binding to an indexed point also binds the generic target.
        self.indexed.borrow_mut().insert((target, index), buffer);
        self.bound.borrow_mut().insert(target, buffer);
        self.record(GlCall::BindBufferBase(target, index, buffer));
    }

    fn bind_texture(&self, target: u32, texture: u32) {
        self.record(GlCall::BindTexture(target, texture));
    }

    fn create_buffer(&self) -> Result<u32, String> {
        let id = self.alloc_id();
        self.buffers.borrow_mut().insert(id, Vec::new());
        Ok(id)
    }

    fn delete_buffer(&self, buffer: u32) {
        self.buffers.borrow_mut().remove(&buffer);
    }

    fn buffer_data(&self, target: u32, data: &[u8], _usage: u32) {
        let id = self.bound(target);
        if let Some(store) = self.buffers.borrow_mut().get_mut(&id) {
            store.clear();
            store.extend_from_slice(data);
        }
        self.record(GlCall::BufferData(target, data.len()));
    }

    fn create_texture(&self) -> Result<u32, String> {
        Ok(self.alloc_id())
    }

    fn delete_texture(&self, _texture: u32) {}

    fn create_shader(&self, _kind: u32) -> Result<u32, String> {
        let id = self.alloc_id();
        self.shaders.borrow_mut().insert(
            id,
            FakeShader {
                source: String::new(),
                compiled: false,
            },
        );
        Ok(id)
    }

    fn shader_source(&self, shader: u32, source: &str) {
        if let Some(s) = self.shaders.borrow_mut().get_mut(&shader) {
            s.source = source.to_owned();
        }
    }

    fn compile_shader(&self, shader: u32) {
        if let Some(s) = self.shaders.borrow_mut().get_mut(&shader) {
            s.compiled = !s.source.contains("#error");
        }
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        self.shaders.borrow().get(&shader).is_some_and(|s| s.compiled)
    }

    fn shader_info_log(&self, shader: u32) -> String {
        match self.shaders.borrow().get(&shader) {
            Some(s) if !s.compiled => "0:1: '#error' : compilation terminated".to_owned(),
            _ => String::new(),
        }
    }

    fn delete_shader(&self, shader: u32) {
        self.shaders.borrow_mut().remove(&shader);
    }

    fn create_program(&self) -> Result<u32, String> {
        Ok(self.alloc_id())
    }

    fn attach_shader(&self, _program: u32, _shader: u32) {}

    fn detach_shader(&self, _program: u32, _shader: u32) {}

    fn link_program(&self, program: u32) {
        let fixture = self.fixtures.borrow_mut().pop_front().unwrap_or_default();
        self.programs.borrow_mut().insert(program, fixture);
    }

    fn program_link_status(&self, program: u32) -> bool {
        self.with_program(program, |p| p.link_ok).unwrap_or(false)
    }

    fn program_info_log(&self, program: u32) -> String {
        self.with_program(program, |p| p.info_log.clone()).unwrap_or_default()
    }

    fn delete_program(&self, program: u32) {
        self.programs.borrow_mut().remove(&program);
        self.deleted_programs.borrow_mut().push(program);
    }

    fn program_parameter(&self, program: u32, pname: u32) -> i32 {
        self.with_program(program, |p| match pname {
            glow::LINK_STATUS => p.link_ok as i32,
            glow::ACTIVE_ATTRIBUTES => p.attributes.len() as i32,
            glow::ACTIVE_ATTRIBUTE_MAX_LENGTH => max_name_len(p.attributes.iter().map(|a| &a.name)),
            glow::ACTIVE_UNIFORMS => p.uniforms.len() as i32,
            glow::ACTIVE_UNIFORM_MAX_LENGTH => max_name_len(p.uniforms.iter().map(|u| &u.name)),
            glow::ACTIVE_UNIFORM_BLOCKS => p.blocks.len() as i32,
            glow::ACTIVE_UNIFORM_BLOCK_MAX_NAME_LENGTH => max_name_len(p.blocks.iter().map(|b| &b.name)),
            _ => 0,
        })
        .unwrap_or(0)
    }

    fn active_attribute(&self, program: u32, index: u32) -> Option<ActiveInfo> {
        self.with_program(program, |p| {
            p.attributes.get(index as usize).map(|a| ActiveInfo {
                ty: a.ty,
                size: a.size,
                name: a.name.clone(),
            })
        })
        .flatten()
    }

    fn active_uniform(&self, program: u32, index: u32) -> Option<ActiveInfo> {
        self.with_program(program, |p| {
            p.uniforms.get(index as usize).map(|u| ActiveInfo {
                ty: u.ty,
                size: u.size,
                name: u.name.clone(),
            })
        })
        .flatten()
    }

    fn active_uniforms_parameter(&self, program: u32, indices: &[u32], pname: u32) -> Vec<i32> {
        self.with_program(program, |p| {
            indices
                .iter()
                .map(|&i| {
                    let u = &p.uniforms[i as usize];
                    match pname {
                        glow::UNIFORM_ARRAY_STRIDE => u.array_stride,
                        glow::UNIFORM_MATRIX_STRIDE => u.matrix_stride,
                        glow::UNIFORM_BLOCK_INDEX => u.block_index,
                        glow::UNIFORM_OFFSET => u.offset,
                        glow::UNIFORM_SIZE => u.size,
                        glow::UNIFORM_TYPE => u.ty as i32,
                        _ => 0,
                    }
                })
                .collect()
        })
        .unwrap_or_default()
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<u32> {
        self.with_program(program, |p| {
            p.uniforms
                .iter()
                .find(|u| u.name == name.as_bytes())
                .and_then(|u| u.location)
        })
        .flatten()
    }

    fn uniform_block_parameter(&self, program: u32, block: u32, pname: u32) -> i32 {
        self.with_program(program, |p| {
            let Some(b) = p.blocks.get(block as usize) else {
                return 0;
            };
            match pname {
                glow::UNIFORM_BLOCK_BINDING => b.binding,
                glow::UNIFORM_BLOCK_DATA_SIZE => b.data_size,
                glow::UNIFORM_BLOCK_NAME_LENGTH => b.name.len() as i32 + 1,
                glow::UNIFORM_BLOCK_ACTIVE_UNIFORMS => b.members.len() as i32,
                _ => 0,
            }
        })
        .unwrap_or(0)
    }

    fn uniform_block_member_indices(&self, program: u32, block: u32, out: &mut [i32]) {
        self.with_program(program, |p| {
            if let Some(b) = p.blocks.get(block as usize) {
                for (dst, src) in out.iter_mut().zip(&b.members) {
                    *dst = *src;
                }
            }
        });
    }

    fn uniform_block_name(&self, program: u32, block: u32) -> Vec<u8> {
        self.with_program(program, |p| {
            p.blocks.get(block as usize).map(|b| b.name.clone())
        })
        .flatten()
        .unwrap_or_default()
    }

    fn uniform_block_binding(&self, program: u32, block: u32, binding: u32) {
        if let Some(b) = self
            .programs
            .borrow_mut()
            .get_mut(&program)
            .and_then(|p| p.blocks.get_mut(block as usize))
        {
            b.binding = binding as i32;
        }
        self.record(GlCall::UniformBlockBinding(program, block, binding));
    }

    fn uniform_1_i32(&self, location: u32, value: i32) {
        self.record(GlCall::Uniform1i(location, value));
    }

    fn get_parameter_i32(&self, pname: u32) -> i32 {
        let target = match pname {
            glow::ARRAY_BUFFER_BINDING => glow::ARRAY_BUFFER,
            glow::ELEMENT_ARRAY_BUFFER_BINDING => glow::ELEMENT_ARRAY_BUFFER,
            glow::UNIFORM_BUFFER_BINDING => glow::UNIFORM_BUFFER,
            _ => return 0,
        };
        self.bound(target) as i32
    }

    fn get_error(&self) -> u32 {
        self.errors.borrow_mut().pop_front().unwrap_or(glow::NO_ERROR)
    }
}
