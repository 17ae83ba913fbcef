use anyhow::{Context, Result};

use crate::gl::Gl;
use crate::shader::{MemberType, UniformBlock};

use super::layout::Std140;
use super::member::UboMember;

/// A uniform block's client-side buffer plus the GPU buffer it is uploaded
/// into.
///
/// A `Ubo` is either built from a reflected [`UniformBlock`] (layout decided
/// by the driver) or assembled member by member with std140 placement.
///
/// Lifecycle:
/// 1. declare members with [`add_uniform`](Self::add_uniform) (std140 only)
/// 2. [`alloc`](Self::alloc) the client buffer
/// 3. [`init`](Self::init) the GPU buffer
/// 4. edit through [`UboMember`] accessors and [`bind`](Self::bind)
pub struct Ubo {
    name: String,
    binding: u32,
    members: Vec<(String, UboMember)>,
    layout: Option<Std140>,
    data: Vec<u8>,
    buffer: u32,
}

impl Ubo {
    /// Starts an empty std140 block.
    pub fn new(name: impl Into<String>, binding: u32) -> Self {
        Self {
            name: name.into(),
            binding,
            members: Vec::new(),
            layout: Some(Std140::new()),
            data: Vec::new(),
            buffer: 0,
        }
    }

    /// Mirrors a reflected block. The client buffer is allocated at the
    /// driver-reported size; members with unknown types are skipped.
    pub fn from_block(block: &UniformBlock) -> Self {
        let members = block
            .members
            .iter()
            .filter_map(|u| match UboMember::from_uniform(u) {
                Some(m) => Some((u.name.clone(), m)),
                None => {
                    log::warn!("block `{}`: member `{}` has no usable layout", block.name, u.name);
                    None
                }
            })
            .collect();

        Self {
            name: block.name.clone(),
            binding: block.binding,
            members,
            layout: None,
            data: vec![0; block.data_size as usize],
            buffer: 0,
        }
    }

    /// Appends a std140 member and returns its accessor.
    ///
    /// # Panics
    /// Debug builds panic if the block was reflected or already allocated.
    pub fn add_uniform(&mut self, name: impl Into<String>, ty: MemberType, array_len: u32) -> UboMember {
        debug_assert!(self.data.is_empty(), "`{}`: add_uniform after alloc", self.name);
        let layout = self.layout.get_or_insert_with(Std140::new);
        let p = layout.place(ty, array_len.max(1));
        let member = UboMember::new(ty, array_len.max(1), p.offset, p.array_stride, p.matrix_stride);
        self.members.push((name.into(), member));
        member
    }

    /// Allocates the zeroed client buffer at the std140 size.
    pub fn alloc(&mut self) {
        let size = self.layout.as_ref().map_or(0, Std140::size);
        self.data = vec![0; size as usize];
    }

    /// Creates the GPU buffer. Idempotent.
    pub fn init(&mut self, gl: &dyn Gl) -> Result<()> {
        if self.buffer == 0 {
            self.buffer = gl
                .create_buffer()
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("failed to create buffer for uniform block `{}`", self.name))?;
        }
        Ok(())
    }

    /// Uploads the client buffer and attaches it to the block's binding point.
    ///
    /// The generic `UNIFORM_BUFFER` binding is put back to whatever was bound
    /// before the call.
    pub fn bind(&self, gl: &dyn Gl) {
        debug_assert!(self.buffer != 0, "`{}`: bind before init", self.name);
        let previous = gl.get_parameter_i32(glow::UNIFORM_BUFFER_BINDING) as u32;
        gl.bind_buffer(glow::UNIFORM_BUFFER, self.buffer);
        gl.buffer_data(glow::UNIFORM_BUFFER, &self.data, glow::DYNAMIC_DRAW);
        gl.bind_buffer_base(glow::UNIFORM_BUFFER, self.binding, self.buffer);
        gl.bind_buffer(glow::UNIFORM_BUFFER, previous);
    }

    /// Deletes the GPU buffer; the client copy is kept.
    pub fn dispose(&mut self, gl: &dyn Gl) {
        if self.buffer != 0 {
            gl.delete_buffer(self.buffer);
            self.buffer = 0;
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn binding(&self) -> u32 {
        self.binding
    }

    #[inline]
    pub fn set_binding(&mut self, binding: u32) {
        self.binding = binding;
    }

    /// GPU buffer name; 0 before [`init`](Self::init).
    #[inline]
    pub fn buffer(&self) -> u32 {
        self.buffer
    }

    pub fn member(&self, name: &str) -> Option<UboMember> {
        self.members.iter().find(|(n, _)| n == name).map(|(_, m)| *m)
    }

    pub fn members(&self) -> impl Iterator<Item = (&str, UboMember)> {
        self.members.iter().map(|(n, m)| (n.as_str(), *m))
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}
