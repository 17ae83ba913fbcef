//! Shader programs and what the driver reports about them.
//!
//! - [`Program`] / [`Shader`]: compile, link, bind and dispose
//! - [`reflect`]: attributes, uniforms and uniform blocks of a linked program
//! - [`BlockBindings`]: block name to binding point, shared across programs

mod bindings;
mod member_type;
mod program;
mod reflect;
mod resource;

pub use bindings::{BindingCollision, BlockBindings};
pub use member_type::{Component, MemberType};
pub use program::{Program, ProgramError, ProgramState, Shader, ShaderKind};
pub use reflect::{list_attributes, list_uniform_blocks, list_uniforms, reflect, ReflectError};
pub use resource::{ProgramResource, ProgramResources, ResourceKind, Uniform, UniformBlock};
