//! Program resource descriptors produced by reflection.
//!
//! Descriptors are owned plain data: they can be cloned out and read from any
//! thread, but they describe one link of one program and go stale when the
//! program is relinked or disposed.

use std::fmt;

use super::member_type::MemberType;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Attribute,
    Uniform,
    UniformBlock,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Attribute => "attribute",
            Self::Uniform => "uniform",
            Self::UniformBlock => "uniform block",
        })
    }
}

/// An active program input (vertex attribute).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramResource {
    pub kind: ResourceKind,
    /// GL type enum.
    pub ty: u32,
    pub array_len: u32,
    /// Driver ordinal, unique per kind within one program.
    pub index: u32,
    /// Binding slot used at draw time.
    pub location: Option<u32>,
    pub name: String,
}

impl ProgramResource {
    #[inline]
    pub fn member_type(&self) -> Option<MemberType> {
        MemberType::from_gl(self.ty)
    }
}

/// An active uniform, either in the default block or inside a named block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uniform {
    /// GL type enum.
    pub ty: u32,
    pub array_len: u32,
    pub index: u32,
    /// `None` for block members, which are not individually addressable.
    pub location: Option<u32>,
    pub name: String,
    /// Bytes between array elements; `None` if not an array.
    pub array_stride: Option<u32>,
    /// Bytes between matrix columns; `None` if not a matrix.
    pub matrix_stride: Option<u32>,
    /// Owning block; `None` for default-block uniforms.
    pub block_index: Option<u32>,
    /// Byte offset within the owning block's buffer.
    pub block_offset: Option<u32>,
}

impl Uniform {
    #[inline]
    pub fn kind(&self) -> ResourceKind {
        ResourceKind::Uniform
    }

    #[inline]
    pub fn member_type(&self) -> Option<MemberType> {
        MemberType::from_gl(self.ty)
    }

    #[inline]
    pub fn is_block_member(&self) -> bool {
        self.block_index.is_some()
    }
}

/// A named uniform block and its members, in driver order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformBlock {
    pub index: u32,
    /// Uniform-buffer binding point the block reads from.
    pub binding: u32,
    pub name: String,
    pub data_size: u32,
    pub members: Vec<Uniform>,
}

impl UniformBlock {
    pub fn member(&self, name: &str) -> Option<&Uniform> {
        self.members.iter().find(|u| u.name == name)
    }
}

/// Everything reflection discovers about one linked program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramResources {
    pub attributes: Vec<ProgramResource>,
    /// Default-block uniforms only; block members live in `blocks`.
    pub uniforms: Vec<Uniform>,
    pub blocks: Vec<UniformBlock>,
}

impl ProgramResources {
    pub fn attribute(&self, name: &str) -> Option<&ProgramResource> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn uniform(&self, name: &str) -> Option<&Uniform> {
        self.uniforms.iter().find(|u| u.name == name)
    }

    pub fn block(&self, name: &str) -> Option<&UniformBlock> {
        self.blocks.iter().find(|b| b.name == name)
    }
}
