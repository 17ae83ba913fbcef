//! Program introspection.
//!
//! Reflection runs in four passes against a linked program:
//! 1. list active attributes
//! 2. list active uniforms with their layout parameters
//! 3. list uniform blocks and attach their members
//! 4. drop block members from the flat uniform list
//!
//! The result is an owned [`ProgramResources`]; nothing here caches GL state.

use std::string::FromUtf8Error;

use thiserror::Error;

use crate::gl::Gl;

use super::member_type::MemberType;
use super::resource::{ProgramResource, ProgramResources, ResourceKind, Uniform, UniformBlock};

#[derive(Debug, Error)]
pub enum ReflectError {
    #[error("program {program}: driver reported no active {kind} at index {index}")]
    Missing {
        program: u32,
        kind: ResourceKind,
        index: u32,
    },

    #[error("program {program}: name of {kind} {index} is not valid UTF-8")]
    Name {
        program: u32,
        kind: ResourceKind,
        index: u32,
        #[source]
        source: FromUtf8Error,
    },

    #[error("program {program}: block `{block}` lists uniform {member}, but only {active} are active")]
    MemberOutOfRange {
        program: u32,
        block: String,
        member: i32,
        active: usize,
    },

    #[error("program {program}: block member `{name}` has inconsistent layout: {detail}")]
    Layout {
        program: u32,
        name: String,
        detail: &'static str,
    },
}

/// Reflects every active attribute, uniform and uniform block of `program`.
///
/// `program` must be successfully linked. Uniforms that belong to a block are
/// reported only under that block.
pub fn reflect(gl: &dyn Gl, program: u32) -> Result<ProgramResources, ReflectError> {
    let attributes = list_attributes(gl, program)?;
    let mut uniforms = list_uniforms(gl, program)?;
    let blocks = list_uniform_blocks(gl, program, &uniforms)?;
    uniforms.retain(|u| !u.is_block_member());

    log::debug!(
        "program {program}: {} attributes, {} uniforms, {} blocks",
        attributes.len(),
        uniforms.len(),
        blocks.len()
    );
    for b in &blocks {
        log::debug!(
            "  block `{}` index={} binding={} size={} members={}",
            b.name,
            b.index,
            b.binding,
            b.data_size,
            b.members.len()
        );
    }

    Ok(ProgramResources {
        attributes,
        uniforms,
        blocks,
    })
}

/// Lists active vertex attributes in driver index order.
pub fn list_attributes(gl: &dyn Gl, program: u32) -> Result<Vec<ProgramResource>, ReflectError> {
    let count = as_count(gl.program_parameter(program, glow::ACTIVE_ATTRIBUTES));
    let mut out = Vec::with_capacity(count as usize);

    for index in 0..count {
        let info = gl
            .active_attribute(program, index)
            .ok_or(ReflectError::Missing {
                program,
                kind: ResourceKind::Attribute,
                index,
            })?;
        let name = decode_name(info.name, program, ResourceKind::Attribute, index)?;

        out.push(ProgramResource {
            kind: ResourceKind::Attribute,
            ty: info.ty,
            array_len: as_count(info.size).max(1),
            index,
            // Attribute locations are dense and positional in ES 3.
            location: Some(index),
            name,
        });
    }

    Ok(out)
}

/// Lists every active uniform, block members included, in driver index order.
pub fn list_uniforms(gl: &dyn Gl, program: u32) -> Result<Vec<Uniform>, ReflectError> {
    let count = as_count(gl.program_parameter(program, glow::ACTIVE_UNIFORMS));
    if count == 0 {
        return Ok(Vec::new());
    }

    let indices: Vec<u32> = (0..count).collect();
    let array_strides = gl.active_uniforms_parameter(program, &indices, glow::UNIFORM_ARRAY_STRIDE);
    let matrix_strides = gl.active_uniforms_parameter(program, &indices, glow::UNIFORM_MATRIX_STRIDE);
    let block_indices = gl.active_uniforms_parameter(program, &indices, glow::UNIFORM_BLOCK_INDEX);
    let offsets = gl.active_uniforms_parameter(program, &indices, glow::UNIFORM_OFFSET);

    let mut out = Vec::with_capacity(count as usize);
    for index in 0..count {
        let i = index as usize;
        let info = gl.active_uniform(program, index).ok_or(ReflectError::Missing {
            program,
            kind: ResourceKind::Uniform,
            index,
        })?;
        let name = decode_name(info.name, program, ResourceKind::Uniform, index)?;
        let block_index = block_indices.get(i).copied().and_then(non_negative);

        // Block members have no location of their own.
        let location = match block_index {
            Some(_) => None,
            None => gl.uniform_location(program, &name),
        };

        out.push(Uniform {
            ty: info.ty,
            array_len: as_count(info.size).max(1),
            index,
            location,
            name,
            array_stride: array_strides.get(i).copied().and_then(stride),
            matrix_stride: matrix_strides.get(i).copied().and_then(stride),
            block_index,
            block_offset: offsets.get(i).copied().and_then(non_negative),
        });
    }

    Ok(out)
}

/// Lists uniform blocks in index order, copying each member out of `uniforms`
/// (the complete list from [`list_uniforms`]).
pub fn list_uniform_blocks(
    gl: &dyn Gl,
    program: u32,
    uniforms: &[Uniform],
) -> Result<Vec<UniformBlock>, ReflectError> {
    let count = as_count(gl.program_parameter(program, glow::ACTIVE_UNIFORM_BLOCKS));
    let mut out = Vec::with_capacity(count as usize);
    let mut member_indices = Vec::new();

    for index in 0..count {
        let raw_name = gl.uniform_block_name(program, index);
        let name = decode_name(raw_name, program, ResourceKind::UniformBlock, index)?;

        let binding = as_count(gl.uniform_block_parameter(program, index, glow::UNIFORM_BLOCK_BINDING));
        let data_size = as_count(gl.uniform_block_parameter(program, index, glow::UNIFORM_BLOCK_DATA_SIZE));
        let active = as_count(gl.uniform_block_parameter(program, index, glow::UNIFORM_BLOCK_ACTIVE_UNIFORMS));

        member_indices.clear();
        member_indices.resize(active as usize, 0);
        gl.uniform_block_member_indices(program, index, &mut member_indices);

        let mut members = Vec::with_capacity(member_indices.len());
        for &m in &member_indices {
            let member = usize::try_from(m)
                .ok()
                .and_then(|m| uniforms.get(m))
                .ok_or_else(|| ReflectError::MemberOutOfRange {
                    program,
                    block: name.clone(),
                    member: m,
                    active: uniforms.len(),
                })?;
            check_member_layout(program, member)?;
            members.push(member.clone());
        }

        out.push(UniformBlock {
            index,
            binding,
            name,
            data_size,
            members,
        });
    }

    Ok(out)
}

fn check_member_layout(program: u32, member: &Uniform) -> Result<(), ReflectError> {
    let fail = |detail| {
        Err(ReflectError::Layout {
            program,
            name: member.name.clone(),
            detail,
        })
    };

    if member.block_offset.is_none() {
        return fail("no block offset");
    }
    if member.array_len > 1 && member.array_stride.is_none() {
        return fail("array without array stride");
    }
    if member.member_type().is_some_and(MemberType::is_matrix) && member.matrix_stride.is_none() {
        return fail("matrix without matrix stride");
    }
    Ok(())
}

fn decode_name(raw: Vec<u8>, program: u32, kind: ResourceKind, index: u32) -> Result<String, ReflectError> {
    String::from_utf8(raw).map_err(|source| ReflectError::Name {
        program,
        kind,
        index,
        source,
    })
}

/// Clamps a driver count to zero.
#[inline]
fn as_count(v: i32) -> u32 {
    v.max(0) as u32
}

#[inline]
fn non_negative(v: i32) -> Option<u32> {
    u32::try_from(v).ok()
}

/// Drivers report 0 (or -1) for "no stride".
#[inline]
fn stride(v: i32) -> Option<u32> {
    (v > 0).then_some(v as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::fake::{FakeAttribute, FakeBlock, FakeGl, FakeUniform, ProgramFixture};

    /// Links a fixture and returns the program name.
    fn linked(gl: &FakeGl, fixture: ProgramFixture) -> u32 {
        gl.install(fixture);
        let program = gl.create_program().unwrap();
        gl.link_program(program);
        program
    }

    fn fog_fixture() -> ProgramFixture {
        ProgramFixture {
            attributes: vec![
                FakeAttribute::new("a_position", glow::FLOAT_VEC3),
                FakeAttribute::new("a_normal", glow::FLOAT_VEC3),
            ],
            uniforms: vec![
                FakeUniform::plain("u_mvp", glow::FLOAT_MAT4, 0),
                FakeUniform::member("COLOR", glow::FLOAT_VEC4, 0, 0),
                FakeUniform::plain("u_tex", glow::SAMPLER_2D, 4),
                FakeUniform::member("PARAMS", glow::FLOAT_VEC2, 0, 16),
            ],
            blocks: vec![FakeBlock::new("FOG", 32, vec![1, 3])],
            ..Default::default()
        }
    }

    #[test]
    fn block_members_leave_the_flat_list() {
        let gl = FakeGl::new();
        let program = linked(&gl, fog_fixture());
        let res = reflect(&gl, program).unwrap();

        let flat: Vec<_> = res.uniforms.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(flat, ["u_mvp", "u_tex"]);

        let fog = res.block("FOG").unwrap();
        let members: Vec<_> = fog.members.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(members, ["COLOR", "PARAMS"]);
        assert_eq!(fog.data_size, 32);

        // Every active uniform lands in exactly one place.
        assert_eq!(res.uniforms.len() + fog.members.len(), 4);
        for m in &fog.members {
            assert_eq!(m.block_index, Some(fog.index));
            assert!(res.uniform(&m.name).is_none());
        }
    }

    #[test]
    fn attributes_keep_driver_order() {
        let gl = FakeGl::new();
        let program = linked(&gl, fog_fixture());
        let res = reflect(&gl, program).unwrap();

        let names: Vec<_> = res.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["a_position", "a_normal"]);
        for (i, a) in res.attributes.iter().enumerate() {
            assert_eq!(a.index, i as u32);
            assert_eq!(a.kind, ResourceKind::Attribute);
            assert_eq!(a.member_type(), Some(MemberType::VEC3));
        }
    }

    #[test]
    fn default_block_uniforms_have_locations_and_no_layout() {
        let gl = FakeGl::new();
        let program = linked(&gl, fog_fixture());
        let res = reflect(&gl, program).unwrap();

        let mvp = res.uniform("u_mvp").unwrap();
        assert_eq!(mvp.location, Some(0));
        assert_eq!(mvp.block_index, None);
        assert_eq!(mvp.block_offset, None);
        assert_eq!(mvp.array_stride, None);

        let params = res.block("FOG").unwrap().member("PARAMS").unwrap();
        assert_eq!(params.location, None);
        assert_eq!(params.block_offset, Some(16));
        assert_eq!(params.array_stride, None);
        assert_eq!(params.matrix_stride, None);
    }

    #[test]
    fn strides_are_reported_for_arrays_and_matrices() {
        let gl = FakeGl::new();
        let program = linked(
            &gl,
            ProgramFixture {
                uniforms: vec![
                    FakeUniform::member("lights", glow::FLOAT_VEC4, 0, 0).array(5, 16),
                    FakeUniform::member("model", glow::FLOAT_MAT4, 0, 80).matrix(16),
                ],
                blocks: vec![FakeBlock::new("Scene", 144, vec![0, 1])],
                ..Default::default()
            },
        );
        let res = reflect(&gl, program).unwrap();
        let scene = res.block("Scene").unwrap();

        let lights = scene.member("lights").unwrap();
        assert_eq!(lights.array_len, 5);
        assert_eq!(lights.array_stride, Some(16));

        let model = scene.member("model").unwrap();
        assert_eq!(model.matrix_stride, Some(16));
        assert!(res.uniforms.is_empty());
    }

    #[test]
    fn empty_program_reflects_to_nothing() {
        let gl = FakeGl::new();
        let program = linked(&gl, ProgramFixture::default());
        assert_eq!(reflect(&gl, program).unwrap(), ProgramResources::default());
    }

    #[test]
    fn long_names_are_kept_whole() {
        let long = format!("Block_{}", "é".repeat(1500));
        let gl = FakeGl::new();
        let program = linked(
            &gl,
            ProgramFixture {
                uniforms: vec![FakeUniform::member("m", glow::FLOAT, 0, 0)],
                blocks: vec![FakeBlock::new(&long, 16, vec![0])],
                ..Default::default()
            },
        );

        let res = reflect(&gl, program).unwrap();
        assert_eq!(res.blocks[0].name, long);
        assert!(res.block(&long).is_some());
    }

    #[test]
    fn invalid_utf8_name_is_an_error() {
        let gl = FakeGl::new();
        let mut bad = FakeUniform::plain("x", glow::FLOAT, 0);
        bad.name = vec![0xff, 0xfe];
        let program = linked(
            &gl,
            ProgramFixture {
                uniforms: vec![bad],
                ..Default::default()
            },
        );

        let err = reflect(&gl, program).unwrap_err();
        assert!(matches!(
            err,
            ReflectError::Name {
                kind: ResourceKind::Uniform,
                index: 0,
                ..
            }
        ));
    }

    #[test]
    fn member_index_past_uniform_count_is_an_error() {
        let gl = FakeGl::new();
        let program = linked(
            &gl,
            ProgramFixture {
                uniforms: vec![FakeUniform::member("a", glow::FLOAT, 0, 0)],
                blocks: vec![FakeBlock::new("B", 16, vec![0, 7])],
                ..Default::default()
            },
        );

        let err = reflect(&gl, program).unwrap_err();
        assert!(matches!(err, ReflectError::MemberOutOfRange { member: 7, active: 1, .. }));
    }

    #[test]
    fn block_array_without_stride_is_an_error() {
        let gl = FakeGl::new();
        let program = linked(
            &gl,
            ProgramFixture {
                uniforms: vec![FakeUniform::member("w", glow::FLOAT, 0, 0).array(4, 0)],
                blocks: vec![FakeBlock::new("B", 64, vec![0])],
                ..Default::default()
            },
        );

        let err = reflect(&gl, program).unwrap_err();
        assert!(matches!(err, ReflectError::Layout { .. }));
        assert!(err.to_string().contains("array without array stride"));
    }
}
