//! Fixed-function state kinds.
//!
//! Defaults match the GL initial state so that a fresh stack mirrors a fresh
//! context.

use crate::gl::Gl;

use super::{StateKind, StateStack};

/// Implements [`StateKind`] for a `Copy` state struct that is its own snapshot.
macro_rules! pod_kind {
    ($ty:ty, $name:literal, |$s:ident, $gl:ident| $commit:block) => {
        impl StateKind for $ty {
            type Snapshot = Self;
            const NAME: &'static str = $name;

            #[inline]
            fn snapshot(&self) -> Self {
                *self
            }

            #[inline]
            fn restore(&mut self, snapshot: &Self) {
                *self = *snapshot;
            }

            fn commit(&mut self, $gl: &dyn Gl) {
                let $s = &*self;
                $commit
            }
        }
    };
}

#[inline]
fn toggle(gl: &dyn Gl, cap: u32, on: bool) {
    if on {
        gl.enable(cap);
    } else {
        gl.disable(cap);
    }
}

// ── blend ─────────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Blend {
    pub on: bool,
    pub src_rgb: u32,
    pub dst_rgb: u32,
    pub src_alpha: u32,
    pub dst_alpha: u32,
}

impl Default for Blend {
    fn default() -> Self {
        Self {
            on: false,
            src_rgb: glow::ONE,
            dst_rgb: glow::ZERO,
            src_alpha: glow::ONE,
            dst_alpha: glow::ZERO,
        }
    }
}

pod_kind!(Blend, "blend", |s, gl| {
    toggle(gl, glow::BLEND, s.on);
    gl.blend_func_separate(s.src_rgb, s.dst_rgb, s.src_alpha, s.dst_alpha);
});

impl StateStack<Blend> {
    pub fn enable(&mut self, on: bool) {
        self.apply_with(|b| b.on = on);
    }

    /// Sets one factor pair for both RGB and alpha.
    pub fn apply_func(&mut self, on: bool, src: u32, dst: u32) {
        self.apply_func_separate(on, src, dst, src, dst);
    }

    pub fn apply_func_separate(
        &mut self,
        on: bool,
        src_rgb: u32,
        dst_rgb: u32,
        src_alpha: u32,
        dst_alpha: u32,
    ) {
        self.apply_with(|b| {
            *b = Blend {
                on,
                src_rgb,
                dst_rgb,
                src_alpha,
                dst_alpha,
            }
        });
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct BlendColor {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
    pub alpha: f32,
}

pod_kind!(BlendColor, "blend_color", |s, gl| {
    gl.blend_color(s.red, s.green, s.blue, s.alpha);
});

impl StateStack<BlendColor> {
    pub fn apply_color(&mut self, red: f32, green: f32, blue: f32, alpha: f32) {
        self.apply_with(|c| {
            *c = BlendColor {
                red,
                green,
                blue,
                alpha,
            }
        });
    }
}

// ── color / depth masks ───────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ColorMask {
    pub red: bool,
    pub green: bool,
    pub blue: bool,
    pub alpha: bool,
}

impl Default for ColorMask {
    fn default() -> Self {
        Self {
            red: true,
            green: true,
            blue: true,
            alpha: true,
        }
    }
}

pod_kind!(ColorMask, "color_mask", |s, gl| {
    gl.color_mask(s.red, s.green, s.blue, s.alpha);
});

impl StateStack<ColorMask> {
    pub fn apply_mask(&mut self, red: bool, green: bool, blue: bool, alpha: bool) {
        self.apply_with(|m| {
            *m = ColorMask {
                red,
                green,
                blue,
                alpha,
            }
        });
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DepthMask {
    pub on: bool,
}

impl Default for DepthMask {
    fn default() -> Self {
        Self { on: true }
    }
}

pod_kind!(DepthMask, "depth_mask", |s, gl| {
    gl.depth_mask(s.on);
});

impl StateStack<DepthMask> {
    pub fn enable(&mut self, on: bool) {
        self.apply_with(|m| m.on = on);
    }
}

// ── culling & depth test ──────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CullFace {
    pub on: bool,
    pub face: u32,
}

impl Default for CullFace {
    fn default() -> Self {
        Self {
            on: false,
            face: glow::BACK,
        }
    }
}

pod_kind!(CullFace, "cull_face", |s, gl| {
    toggle(gl, glow::CULL_FACE, s.on);
    gl.cull_face(s.face);
});

impl StateStack<CullFace> {
    pub fn enable(&mut self, on: bool) {
        self.apply_with(|c| c.on = on);
    }

    pub fn apply_face(&mut self, on: bool, face: u32) {
        self.apply_with(|c| *c = CullFace { on, face });
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DepthTest {
    pub on: bool,
    pub func: u32,
}

impl Default for DepthTest {
    fn default() -> Self {
        Self {
            on: false,
            func: glow::LESS,
        }
    }
}

pod_kind!(DepthTest, "depth_test", |s, gl| {
    toggle(gl, glow::DEPTH_TEST, s.on);
    gl.depth_func(s.func);
});

impl StateStack<DepthTest> {
    pub fn enable(&mut self, on: bool) {
        self.apply_with(|d| d.on = on);
    }

    pub fn apply_func(&mut self, on: bool, func: u32) {
        self.apply_with(|d| *d = DepthTest { on, func });
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct PolygonOffset {
    pub fill_on: bool,
    pub factor: f32,
    pub units: f32,
}

pod_kind!(PolygonOffset, "polygon_offset", |s, gl| {
    toggle(gl, glow::POLYGON_OFFSET_FILL, s.fill_on);
    gl.polygon_offset(s.factor, s.units);
});

impl StateStack<PolygonOffset> {
    pub fn enable(&mut self, on: bool) {
        self.apply_with(|p| p.fill_on = on);
    }

    pub fn apply_offset(&mut self, on: bool, factor: f32, units: f32) {
        self.apply_with(|p| {
            *p = PolygonOffset {
                fill_on: on,
                factor,
                units,
            }
        });
    }
}

/// Scissor test and box, in window pixels.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ScissorTest {
    pub on: bool,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Default for ScissorTest {
    fn default() -> Self {
        Self {
            on: false,
            x: 0,
            y: 0,
            width: 1,
            height: 1,
        }
    }
}

pod_kind!(ScissorTest, "scissor_test", |s, gl| {
    toggle(gl, glow::SCISSOR_TEST, s.on);
    gl.scissor(s.x, s.y, s.width, s.height);
});

impl StateStack<ScissorTest> {
    pub fn enable(&mut self, on: bool) {
        self.apply_with(|s| s.on = on);
    }

    pub fn apply_box(&mut self, on: bool, x: i32, y: i32, width: i32, height: i32) {
        self.apply_with(|s| {
            *s = ScissorTest {
                on,
                x,
                y,
                width,
                height,
            }
        });
    }
}

// ── stencil ───────────────────────────────────────────────────────────────

/// Stencil function for one face.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StencilFace {
    pub func: u32,
    pub reference: i32,
    pub mask: u32,
}

impl Default for StencilFace {
    fn default() -> Self {
        Self {
            func: glow::ALWAYS,
            reference: 0,
            mask: u32::MAX,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct StencilTest {
    pub on: bool,
    pub front: StencilFace,
    pub back: StencilFace,
}

pod_kind!(StencilTest, "stencil_test", |s, gl| {
    toggle(gl, glow::STENCIL_TEST, s.on);
    gl.stencil_func_separate(glow::FRONT, s.front.func, s.front.reference, s.front.mask);
    gl.stencil_func_separate(glow::BACK, s.back.func, s.back.reference, s.back.mask);
});

impl StateStack<StencilTest> {
    /// Sets the front-face function without applying.
    pub fn front(&mut self, func: u32, reference: i32, mask: u32) {
        self.current_mut().front = StencilFace { func, reference, mask };
    }

    /// Sets the back-face function without applying.
    pub fn back(&mut self, func: u32, reference: i32, mask: u32) {
        self.current_mut().back = StencilFace { func, reference, mask };
    }

    pub fn enable(&mut self, on: bool) {
        self.apply_with(|s| s.on = on);
    }

    /// Sets the same function on both faces.
    pub fn apply_func(&mut self, on: bool, func: u32, reference: i32, mask: u32) {
        let face = StencilFace { func, reference, mask };
        self.apply_with(|s| {
            *s = StencilTest {
                on,
                front: face,
                back: face,
            }
        });
    }
}

/// Stencil actions for one face.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StencilOps {
    pub stencil_fail: u32,
    pub depth_fail: u32,
    pub pass: u32,
}

impl Default for StencilOps {
    fn default() -> Self {
        Self {
            stencil_fail: glow::KEEP,
            depth_fail: glow::KEEP,
            pass: glow::KEEP,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct StencilOp {
    pub front: StencilOps,
    pub back: StencilOps,
}

pod_kind!(StencilOp, "stencil_op", |s, gl| {
    let StencilOps { stencil_fail, depth_fail, pass } = s.front;
    gl.stencil_op_separate(glow::FRONT, stencil_fail, depth_fail, pass);
    let StencilOps { stencil_fail, depth_fail, pass } = s.back;
    gl.stencil_op_separate(glow::BACK, stencil_fail, depth_fail, pass);
});

impl StateStack<StencilOp> {
    /// Sets the same actions on both faces.
    pub fn apply_ops(&mut self, stencil_fail: u32, depth_fail: u32, pass: u32) {
        let ops = StencilOps {
            stencil_fail,
            depth_fail,
            pass,
        };
        self.apply_with(|s| *s = StencilOp { front: ops, back: ops });
    }
}

// ── viewport ──────────────────────────────────────────────────────────────

/// Viewport rectangle in window pixels.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Viewport {
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Returns `(x0, y0, x1, y1)`.
    #[inline]
    pub fn bounds(self) -> (i32, i32, i32, i32) {
        (self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0, 0, 1, 1)
    }
}

pod_kind!(Viewport, "viewport", |s, gl| {
    gl.viewport(s.x, s.y, s.width, s.height);
});

impl StateStack<Viewport> {
    pub fn apply_rect(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.apply_with(|v| *v = Viewport::new(x, y, width, height));
    }
}

// ── mirrored scalars ──────────────────────────────────────────────────────

/// Line width mirror.
///
/// Wide lines are expanded by the geometry writers, so applying only updates
/// the mirrored value.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LineWidth {
    pub value: f32,
}

impl Default for LineWidth {
    fn default() -> Self {
        Self { value: 1.0 }
    }
}

pod_kind!(LineWidth, "line_width", |_s, _gl| {});

impl StateStack<LineWidth> {
    pub fn set(&mut self, value: f32) {
        self.current_mut().value = value;
    }
}

/// Point size mirror; written into shaders as `gl_PointSize` by callers.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointSize {
    pub value: f32,
}

impl Default for PointSize {
    fn default() -> Self {
        Self { value: 1.0 }
    }
}

pod_kind!(PointSize, "point_size", |_s, _gl| {});

impl StateStack<PointSize> {
    pub fn set(&mut self, value: f32) {
        self.current_mut().value = value;
    }
}
