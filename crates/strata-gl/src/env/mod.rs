//! Per-context draw environment.
//!
//! A [`DrawEnv`] owns one state stack per piece of pipeline state, the
//! uniform-block binding registry and the fog block. Render code receives
//! `&mut DrawEnv` and brackets its state changes with push/pop:
//!
//! ```ignore
//! env.depth_test.push();
//! env.depth_test.apply_func(true, glow::LEQUAL);
//! mesh.draw(env);
//! env.depth_test.pop();
//! ```
//!
//! The environment is bound to the thread that owns the GL context.

mod config;

pub use config::EnvConfig;

use std::rc::Rc;

use anyhow::{Context, Result};

use crate::gl::{check_err, Gl, GlError};
use crate::shader::{BlockBindings, UniformBlock};
use crate::state::{
    Blend, BlendColor, BufferBinding, ColorMask, CullFace, DepthMask, DepthTest, DrawSetting, Fog,
    LineWidth, PointSize, PolygonOffset, ProgramBinding, ScissorTest, StateKind, StateStack,
    StencilOp, StencilTest, TextureBinding, Viewport,
};
use crate::ubo::Ubo;

pub struct DrawEnv {
    gl: Rc<dyn Gl>,
    config: EnvConfig,
    bindings: BlockBindings,

    // ── object bindings ───────────────────────────────────────────────────
    pub program: StateStack<ProgramBinding>,
    pub array_buf: StateStack<BufferBinding>,
    pub element_buf: StateStack<BufferBinding>,
    pub uniform_buf: StateStack<BufferBinding>,
    pub texture_2d: StateStack<TextureBinding>,

    // ── fixed-function state ──────────────────────────────────────────────
    pub blend: StateStack<Blend>,
    pub blend_color: StateStack<BlendColor>,
    pub color_mask: StateStack<ColorMask>,
    pub cull_face: StateStack<CullFace>,
    pub depth_mask: StateStack<DepthMask>,
    pub depth_test: StateStack<DepthTest>,
    pub line_width: StateStack<LineWidth>,
    pub point_size: StateStack<PointSize>,
    pub polygon_offset: StateStack<PolygonOffset>,
    pub scissor_test: StateStack<ScissorTest>,
    pub stencil_test: StateStack<StencilTest>,
    pub stencil_op: StateStack<StencilOp>,
    pub viewport: StateStack<Viewport>,

    // ── shared uniform blocks ─────────────────────────────────────────────
    pub fog: StateStack<Fog>,
}

const SETTING_COUNT: usize = 19;

fn stack<K: StateKind>(gl: &Rc<dyn Gl>, live: K, capacity: usize) -> StateStack<K> {
    StateStack::new(gl.clone(), live, capacity)
}

impl DrawEnv {
    /// Builds an environment whose mirrors match a freshly created context.
    ///
    /// Creates the fog block's GPU buffer; nothing else touches the GPU until
    /// the first apply.
    pub fn new(gl: Rc<dyn Gl>, config: EnvConfig) -> Result<Self> {
        let cap = config.stack_capacity;
        let mut bindings = BlockBindings::new(config.first_block_binding);

        let mut fog = Fog::new(bindings.binding_for(Fog::BLOCK_NAME));
        fog.init(gl.as_ref()).context("failed to initialize fog block")?;

        log::debug!(
            "draw env: stack capacity {cap}, error checks {}, fog at binding {}",
            if config.check_errors { "on" } else { "off" },
            fog.binding()
        );

        Ok(Self {
            program: stack(&gl, ProgramBinding::default(), cap),
            array_buf: stack(&gl, BufferBinding::new(glow::ARRAY_BUFFER), cap),
            element_buf: stack(&gl, BufferBinding::new(glow::ELEMENT_ARRAY_BUFFER), cap),
            uniform_buf: stack(&gl, BufferBinding::new(glow::UNIFORM_BUFFER), cap),
            texture_2d: stack(&gl, TextureBinding::new(glow::TEXTURE_2D), cap),
            blend: stack(&gl, Blend::default(), cap),
            blend_color: stack(&gl, BlendColor::default(), cap),
            color_mask: stack(&gl, ColorMask::default(), cap),
            cull_face: stack(&gl, CullFace::default(), cap),
            depth_mask: stack(&gl, DepthMask::default(), cap),
            depth_test: stack(&gl, DepthTest::default(), cap),
            line_width: stack(&gl, LineWidth::default(), cap),
            point_size: stack(&gl, PointSize::default(), cap),
            polygon_offset: stack(&gl, PolygonOffset::default(), cap),
            scissor_test: stack(&gl, ScissorTest::default(), cap),
            stencil_test: stack(&gl, StencilTest::default(), cap),
            stencil_op: stack(&gl, StencilOp::default(), cap),
            viewport: stack(&gl, Viewport::default(), cap),
            fog: stack(&gl, fog, cap),
            gl,
            config,
            bindings,
        })
    }

    #[inline]
    pub fn gl(&self) -> &dyn Gl {
        self.gl.as_ref()
    }

    /// Shared handle to the context, for objects that outlive a borrow of
    /// the environment.
    #[inline]
    pub fn gl_handle(&self) -> Rc<dyn Gl> {
        self.gl.clone()
    }

    #[inline]
    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    #[inline]
    pub fn bindings(&self) -> &BlockBindings {
        &self.bindings
    }

    #[inline]
    pub fn bindings_mut(&mut self) -> &mut BlockBindings {
        &mut self.bindings
    }

    /// Points every block of `program` at its registered binding point.
    pub fn assign_block_bindings(&mut self, program: u32, blocks: &mut [UniformBlock]) {
        self.bindings.apply_to_program(self.gl.as_ref(), program, blocks);
    }

    /// Uploads `ubo` and attaches it to its binding point. The generic
    /// uniform-buffer binding, and so the `uniform_buf` mirror, is unchanged.
    pub fn bind_ubo(&self, ubo: &Ubo) {
        ubo.bind(self.gl.as_ref());
    }

    /// Polls the GL error flag unconditionally.
    pub fn check_err(&self) -> Result<(), GlError> {
        check_err(self.gl.as_ref())
    }

    /// Polls the GL error flag if [`EnvConfig::check_errors`] is set.
    pub fn checkpoint(&self) -> Result<(), GlError> {
        if self.config.check_errors {
            self.check_err()
        } else {
            Ok(())
        }
    }

    /// Every state stack, labelled by field name.
    pub fn settings(&self) -> Vec<(&'static str, &dyn DrawSetting)> {
        let all: [(&'static str, &dyn DrawSetting); SETTING_COUNT] = [
            ("program", &self.program as &dyn DrawSetting),
            ("array_buf", &self.array_buf as &dyn DrawSetting),
            ("element_buf", &self.element_buf as &dyn DrawSetting),
            ("uniform_buf", &self.uniform_buf as &dyn DrawSetting),
            ("texture_2d", &self.texture_2d as &dyn DrawSetting),
            ("blend", &self.blend as &dyn DrawSetting),
            ("blend_color", &self.blend_color as &dyn DrawSetting),
            ("color_mask", &self.color_mask as &dyn DrawSetting),
            ("cull_face", &self.cull_face as &dyn DrawSetting),
            ("depth_mask", &self.depth_mask as &dyn DrawSetting),
            ("depth_test", &self.depth_test as &dyn DrawSetting),
            ("line_width", &self.line_width as &dyn DrawSetting),
            ("point_size", &self.point_size as &dyn DrawSetting),
            ("polygon_offset", &self.polygon_offset as &dyn DrawSetting),
            ("scissor_test", &self.scissor_test as &dyn DrawSetting),
            ("stencil_test", &self.stencil_test as &dyn DrawSetting),
            ("stencil_op", &self.stencil_op as &dyn DrawSetting),
            ("viewport", &self.viewport as &dyn DrawSetting),
            ("fog", &self.fog as &dyn DrawSetting),
        ];
        all.into()
    }

    pub fn settings_mut(&mut self) -> Vec<(&'static str, &mut dyn DrawSetting)> {
        let all: [(&'static str, &mut dyn DrawSetting); SETTING_COUNT] = [
            ("program", &mut self.program as &mut dyn DrawSetting),
            ("array_buf", &mut self.array_buf as &mut dyn DrawSetting),
            ("element_buf", &mut self.element_buf as &mut dyn DrawSetting),
            ("uniform_buf", &mut self.uniform_buf as &mut dyn DrawSetting),
            ("texture_2d", &mut self.texture_2d as &mut dyn DrawSetting),
            ("blend", &mut self.blend as &mut dyn DrawSetting),
            ("blend_color", &mut self.blend_color as &mut dyn DrawSetting),
            ("color_mask", &mut self.color_mask as &mut dyn DrawSetting),
            ("cull_face", &mut self.cull_face as &mut dyn DrawSetting),
            ("depth_mask", &mut self.depth_mask as &mut dyn DrawSetting),
            ("depth_test", &mut self.depth_test as &mut dyn DrawSetting),
            ("line_width", &mut self.line_width as &mut dyn DrawSetting),
            ("point_size", &mut self.point_size as &mut dyn DrawSetting),
            ("polygon_offset", &mut self.polygon_offset as &mut dyn DrawSetting),
            ("scissor_test", &mut self.scissor_test as &mut dyn DrawSetting),
            ("stencil_test", &mut self.stencil_test as &mut dyn DrawSetting),
            ("stencil_op", &mut self.stencil_op as &mut dyn DrawSetting),
            ("viewport", &mut self.viewport as &mut dyn DrawSetting),
            ("fog", &mut self.fog as &mut dyn DrawSetting),
        ];
        all.into()
    }

    /// Re-issues every mirrored state, e.g. after the context was created or
    /// touched by foreign code.
    pub fn apply_all(&mut self) {
        for (_, s) in self.settings_mut() {
            s.apply();
        }
    }

    /// Stacks with unmatched pushes. Empty at the end of a well-formed frame.
    pub fn unbalanced(&self) -> Vec<(&'static str, usize)> {
        self.settings()
            .into_iter()
            .map(|(name, s)| (name, s.stack_depth()))
            .filter(|&(_, depth)| depth > 0)
            .collect()
    }

    /// Logs a warning for every unbalanced stack and returns whether all were
    /// at rest.
    pub fn check_balance(&self) -> bool {
        let open = self.unbalanced();
        for (name, depth) in &open {
            log::warn!("{name}: {depth} unmatched push(es)");
        }
        open.is_empty()
    }

    /// Releases GPU objects owned by the environment.
    pub fn dispose(&mut self) {
        self.fog.current_mut().dispose(self.gl.as_ref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::fake::{FakeGl, GlCall};

    fn env_with(config: EnvConfig) -> (Rc<FakeGl>, DrawEnv) {
        let fake = Rc::new(FakeGl::new());
        let env = DrawEnv::new(fake.clone() as Rc<dyn Gl>, config).unwrap();
        (fake, env)
    }

    fn env() -> (Rc<FakeGl>, DrawEnv) {
        env_with(EnvConfig::default())
    }

    #[test]
    fn fresh_env_is_at_rest_and_silent() {
        let (fake, env) = env();
        assert!(env.unbalanced().is_empty());
        assert!(fake.calls().is_empty());
        assert_eq!(env.settings().len(), SETTING_COUNT);
        assert!(env.settings().iter().all(|(_, s)| s.stack_depth() == 0));
    }

    #[test]
    fn fog_takes_first_block_binding() {
        let (_, env) = env_with(EnvConfig {
            first_block_binding: 3,
            ..EnvConfig::default()
        });
        assert_eq!(env.fog.current().binding(), 3);
        assert_eq!(env.bindings().get(Fog::BLOCK_NAME), Some(3));
        assert_ne!(env.fog.current().ubo().buffer(), 0);
    }

    #[test]
    fn unbalanced_names_open_stacks() {
        let (_, mut env) = env();
        env.blend.push();
        env.viewport.push();
        env.viewport.push();

        assert_eq!(env.unbalanced(), vec![("blend", 1), ("viewport", 2)]);
        assert!(!env.check_balance());

        env.viewport.pop();
        env.viewport.pop();
        env.blend.pop();
        assert!(env.check_balance());
    }

    #[test]
    fn nested_scopes_restore_across_stacks() {
        let (fake, mut env) = env();
        env.depth_test.apply_func(true, glow::LESS);

        env.depth_test.push();
        env.blend.push();
        env.depth_test.apply_func(true, glow::LEQUAL);
        env.blend.apply_func(true, glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
        env.blend.pop();
        env.depth_test.pop();

        assert!(env.depth_test.current().on);
        assert_eq!(env.depth_test.current().func, glow::LESS);
        assert!(!env.blend.current().on);
        assert!(env.unbalanced().is_empty());
        assert_eq!(fake.calls().last(), Some(&GlCall::DepthFunc(glow::LESS)));
    }

    #[test]
    fn apply_all_touches_every_stack() {
        let (fake, mut env) = env();
        env.apply_all();
        let calls = fake.take_calls();

        assert!(calls.contains(&GlCall::UseProgram(0)));
        assert!(calls.contains(&GlCall::BindBuffer(glow::ELEMENT_ARRAY_BUFFER, 0)));
        assert!(calls.contains(&GlCall::BindTexture(glow::TEXTURE_2D, 0)));
        assert!(calls.contains(&GlCall::Viewport(0, 0, 1, 1)));
        let fog = env.fog.current().ubo().buffer();
        assert!(calls.contains(&GlCall::BindBufferBase(glow::UNIFORM_BUFFER, 0, fog)));
    }

    #[test]
    fn bind_ubo_keeps_uniform_mirror_in_step() {
        let (fake, mut env) = env();
        let mut ubo = Ubo::new("Lights", 1);
        ubo.add_uniform("count", crate::shader::MemberType::INT, 1);
        ubo.alloc();
        ubo.init(env.gl()).unwrap();

        let scratch = env.uniform_buf.create().unwrap();
        env.uniform_buf.bind(scratch);

        env.bind_ubo(&ubo);
        assert_eq!(env.uniform_buf.current().id, scratch);
        assert_eq!(fake.bound(glow::UNIFORM_BUFFER), scratch);
        assert_eq!(fake.indexed_binding(glow::UNIFORM_BUFFER, 1), ubo.buffer());
    }

    #[test]
    fn fog_scope_leaves_uniform_mirror_in_step() {
        let (fake, mut env) = env();
        let scratch = env.uniform_buf.create().unwrap();
        env.uniform_buf.bind(scratch);

        env.fog.push();
        env.fog.apply_params(glam::Vec4::ONE, 0.3, 4.0);
        assert_eq!(fake.bound(glow::UNIFORM_BUFFER), scratch);
        env.fog.pop();

        assert_eq!(env.uniform_buf.current().id, fake.bound(glow::UNIFORM_BUFFER));
        assert_eq!(fake.bound(glow::UNIFORM_BUFFER), scratch);
        let fog = env.fog.current().ubo().buffer();
        assert_eq!(fake.indexed_binding(glow::UNIFORM_BUFFER, 0), fog);
    }

    #[test]
    fn checkpoint_honours_config() {
        let (fake, env) = env_with(EnvConfig {
            check_errors: false,
            ..EnvConfig::default()
        });
        fake.push_error(glow::INVALID_VALUE);
        assert!(env.checkpoint().is_ok());

        let err = env.check_err().unwrap_err();
        assert_eq!(err.code, glow::INVALID_VALUE);
    }

    #[test]
    fn dispose_releases_fog_buffer() {
        let (fake, mut env) = env();
        let id = env.fog.current().ubo().buffer();
        env.dispose();
        assert!(fake.buffer_contents(id).is_none());
        assert_eq!(env.fog.current().ubo().buffer(), 0);
    }
}
