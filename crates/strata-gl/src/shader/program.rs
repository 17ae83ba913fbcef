//! Shader compilation and program lifecycle.
//!
//! ```text
//! Uninitialized --init--> Linked --bind--> Bound <--> Unbound
//!       ^                                       |
//!       +------------------relink---------------+
//! any --dispose--> Disposed
//! ```
//!
//! Linking reflects the program and points its uniform blocks at the
//! environment's shared binding points.

use std::fmt;

use thiserror::Error;

use crate::env::DrawEnv;
use crate::gl::{Gl, GlError};
use crate::ubo::Ubo;

use super::reflect::{reflect, ReflectError};
use super::resource::{ProgramResource, ProgramResources, Uniform, UniformBlock};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    Vertex,
    Fragment,
}

impl ShaderKind {
    #[inline]
    pub fn gl(self) -> u32 {
        match self {
            Self::Vertex => glow::VERTEX_SHADER,
            Self::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
        })
    }
}

#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("failed to create {what} object: {reason}")]
    Create { what: &'static str, reason: String },

    #[error("{kind} shader failed to compile:\n{log}")]
    Compile { kind: ShaderKind, log: String },

    #[error("program failed to link:\n{log}")]
    Link { log: String },

    #[error(transparent)]
    Reflect(#[from] ReflectError),

    #[error(transparent)]
    Gl(#[from] GlError),

    #[error("program has been disposed")]
    Disposed,
}

/// One shader stage: source text plus its GL object once compiled.
#[derive(Debug, Clone)]
pub struct Shader {
    kind: ShaderKind,
    source: String,
    id: u32,
}

impl Shader {
    pub fn new(kind: ShaderKind, source: impl Into<String>) -> Self {
        Self {
            kind,
            source: source.into(),
            id: 0,
        }
    }

    pub fn vertex(source: impl Into<String>) -> Self {
        Self::new(ShaderKind::Vertex, source)
    }

    pub fn fragment(source: impl Into<String>) -> Self {
        Self::new(ShaderKind::Fragment, source)
    }

    #[inline]
    pub fn kind(&self) -> ShaderKind {
        self.kind
    }

    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// GL shader name; 0 until compiled.
    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Compiles the shader if it is not compiled yet and returns its name.
    ///
    /// On failure the shader object is deleted and the driver's info log is
    /// returned in the error.
    pub fn compile(&mut self, gl: &dyn Gl) -> Result<u32, ProgramError> {
        if self.id != 0 {
            return Ok(self.id);
        }

        let id = gl.create_shader(self.kind.gl()).map_err(|reason| ProgramError::Create {
            what: "shader",
            reason,
        })?;
        gl.shader_source(id, &self.source);
        gl.compile_shader(id);

        if !gl.shader_compile_status(id) {
            let log = gl.shader_info_log(id);
            gl.delete_shader(id);
            return Err(ProgramError::Compile { kind: self.kind, log });
        }

        self.id = id;
        Ok(id)
    }

    pub fn dispose(&mut self, gl: &dyn Gl) {
        if self.id != 0 {
            gl.delete_shader(self.id);
            self.id = 0;
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ProgramState {
    Uninitialized,
    /// Linked and reflected, never bound.
    Linked,
    Bound,
    Unbound,
    Disposed,
}

/// A linked shader program together with its reflected resources.
pub struct Program {
    shaders: Vec<Shader>,
    id: u32,
    state: ProgramState,
    resources: ProgramResources,
    shared_block_bindings: bool,
}

impl Program {
    pub fn new(shaders: impl IntoIterator<Item = Shader>) -> Self {
        Self {
            shaders: shaders.into_iter().collect(),
            id: 0,
            state: ProgramState::Uninitialized,
            resources: ProgramResources::default(),
            shared_block_bindings: true,
        }
    }

    pub fn from_sources(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self::new([Shader::vertex(vertex), Shader::fragment(fragment)])
    }

    /// Keeps the driver's block bindings instead of the environment's shared
    /// binding points.
    pub fn with_driver_block_bindings(mut self) -> Self {
        self.shared_block_bindings = false;
        self
    }

    /// GL program name; 0 unless linked.
    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[inline]
    pub fn state(&self) -> ProgramState {
        self.state
    }

    #[inline]
    pub fn is_linked(&self) -> bool {
        matches!(
            self.state,
            ProgramState::Linked | ProgramState::Bound | ProgramState::Unbound
        )
    }

    #[inline]
    pub fn shaders(&self) -> &[Shader] {
        &self.shaders
    }

    /// Reflected resources; empty unless linked.
    #[inline]
    pub fn resources(&self) -> &ProgramResources {
        &self.resources
    }

    pub fn attribute(&self, name: &str) -> Option<&ProgramResource> {
        self.resources.attribute(name)
    }

    pub fn uniform(&self, name: &str) -> Option<&Uniform> {
        self.resources.uniform(name)
    }

    pub fn block(&self, name: &str) -> Option<&UniformBlock> {
        self.resources.block(name)
    }

    /// Client-side buffer laid out like block `name` of this program.
    pub fn block_ubo(&self, name: &str) -> Option<Ubo> {
        self.block(name).map(Ubo::from_block)
    }

    /// Compiles, links and reflects. A no-op if already linked.
    pub fn init(&mut self, env: &mut DrawEnv) -> Result<(), ProgramError> {
        match self.state {
            ProgramState::Disposed => return Err(ProgramError::Disposed),
            ProgramState::Uninitialized => {}
            _ => return Ok(()),
        }

        let gl = env.gl();
        let id = gl.create_program().map_err(|reason| ProgramError::Create {
            what: "program",
            reason,
        })?;

        let mut resources = match self.link(gl, id) {
            Ok(r) => r,
            Err(e) => {
                gl.delete_program(id);
                log::error!("{e}");
                return Err(e);
            }
        };

        if self.shared_block_bindings {
            env.assign_block_bindings(id, &mut resources.blocks);
        }
        assign_texture_units(env, id, &resources.uniforms);

        self.id = id;
        self.resources = resources;
        self.state = ProgramState::Linked;
        log::debug!("program {id} linked");

        env.checkpoint()?;
        Ok(())
    }

    fn link(&mut self, gl: &dyn Gl, id: u32) -> Result<ProgramResources, ProgramError> {
        for shader in &mut self.shaders {
            let sid = shader.compile(gl)?;
            gl.attach_shader(id, sid);
        }

        gl.link_program(id);
        if !gl.program_link_status(id) {
            return Err(ProgramError::Link {
                log: gl.program_info_log(id),
            });
        }

        for shader in &self.shaders {
            gl.detach_shader(id, shader.id());
        }

        reflect(gl, id).map_err(ProgramError::from)
    }

    /// Deletes the linked program and links a fresh one from the same
    /// shaders. Resources read before the relink are stale afterwards.
    ///
    /// The program must not be saved in an open `env.program` scope; the
    /// matching `pop()` would reinstall the deleted name.
    pub fn relink(&mut self, env: &mut DrawEnv) -> Result<(), ProgramError> {
        if self.state == ProgramState::Disposed {
            return Err(ProgramError::Disposed);
        }
        self.release_program(env);
        self.init(env)
    }

    /// Makes this the current program, linking on first use.
    pub fn bind(&mut self, env: &mut DrawEnv) -> Result<(), ProgramError> {
        self.init(env)?;
        env.program.bind(self.id);
        self.state = ProgramState::Bound;
        Ok(())
    }

    pub fn unbind(&mut self, env: &mut DrawEnv) {
        debug_assert!(self.is_linked(), "unbind on a program that is not linked");
        env.program.bind(0);
        self.state = ProgramState::Unbound;
    }

    /// Deletes the program and its shaders. Terminal.
    ///
    /// Same scope restriction as [`relink`](Self::relink).
    pub fn dispose(&mut self, env: &mut DrawEnv) {
        self.release_program(env);
        for shader in &mut self.shaders {
            shader.dispose(env.gl());
        }
        self.state = ProgramState::Disposed;
    }

    fn release_program(&mut self, env: &mut DrawEnv) {
        if self.id == 0 {
            return;
        }
        debug_assert!(
            !env.program.saved().contains(&self.id),
            "program {} released while saved in an open program scope",
            self.id
        );
        if env.program.current().id == self.id {
            env.program.bind(0);
        }
        env.gl().delete_program(self.id);
        self.id = 0;
        self.resources = ProgramResources::default();
        self.state = ProgramState::Uninitialized;
    }
}

/// Gives each default-block sampler its own texture unit, in reflection
/// order. Sampler arrays take one unit per element.
fn assign_texture_units(env: &mut DrawEnv, program: u32, uniforms: &[Uniform]) {
    let samplers: Vec<&Uniform> = uniforms
        .iter()
        .filter(|u| u.location.is_some() && u.member_type().is_some_and(|t| t.is_sampler()))
        .collect();
    if samplers.is_empty() {
        return;
    }

    env.program.push();
    env.program.bind(program);
    let gl = env.gl();
    let mut unit = 0i32;
    for u in samplers {
        let Some(location) = u.location else { continue };
        if u.array_len <= 1 {
            gl.uniform_1_i32(location, unit);
            unit += 1;
            continue;
        }
        let base = u.name.strip_suffix("[0]").unwrap_or(&u.name);
        for e in 0..u.array_len {
            let loc = if e == 0 {
                Some(location)
            } else {
                gl.uniform_location(program, &format!("{base}[{e}]"))
            };
            if let Some(loc) = loc {
                gl.uniform_1_i32(loc, unit);
            }
            unit += 1;
        }
    }
    log::debug!("program {program}: {unit} texture unit(s) assigned");
    env.program.pop();
}
