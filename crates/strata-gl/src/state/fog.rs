//! Fog parameters, stored in a uniform block shared by every program that
//! declares `uniform FOG { vec4 COLOR; vec2 PARAMS; }`.
//!
//! `PARAMS.x` is the density and `PARAMS.y` the start distance.

use anyhow::Result;
use glam::Vec4;

use crate::gl::Gl;
use crate::shader::MemberType;
use crate::ubo::{Ubo, UboMember};

use super::{StateKind, StateStack};

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct FogParams {
    pub color: Vec4,
    pub density: f32,
    pub start: f32,
}

/// Saved fog block contents.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct FogState {
    pub binding: u32,
    pub color: [f32; 4],
    pub params: [f32; 2],
}

/// Live fog block.
pub struct Fog {
    ubo: Ubo,
    color: UboMember,
    params: UboMember,
}

impl Fog {
    /// Block name programs must declare to receive fog.
    pub const BLOCK_NAME: &'static str = "FOG";

    /// Builds the std140 block at `binding`. Call [`init`](Self::init)
    /// before the first apply.
    pub fn new(binding: u32) -> Self {
        let mut ubo = Ubo::new(Self::BLOCK_NAME, binding);
        let color = ubo.add_uniform("COLOR", MemberType::VEC4, 1);
        let params = ubo.add_uniform("PARAMS", MemberType::VEC2, 1);
        ubo.alloc();
        Self { ubo, color, params }
    }

    /// Creates the GPU buffer backing the block.
    pub fn init(&mut self, gl: &dyn Gl) -> Result<()> {
        self.ubo.init(gl)
    }

    pub fn dispose(&mut self, gl: &dyn Gl) {
        self.ubo.dispose(gl);
    }

    #[inline]
    pub fn ubo(&self) -> &Ubo {
        &self.ubo
    }

    #[inline]
    pub fn binding(&self) -> u32 {
        self.ubo.binding()
    }

    #[inline]
    pub fn set_binding(&mut self, binding: u32) {
        self.ubo.set_binding(binding);
    }

    pub fn color(&self) -> Vec4 {
        self.color.get_vec4(self.ubo.data())
    }

    pub fn set_color(&mut self, color: Vec4) {
        self.color.set_vec4(self.ubo.data_mut(), color);
    }

    pub fn density(&self) -> f32 {
        self.params.get_component_float(self.ubo.data(), 0, 0, 0)
    }

    pub fn set_density(&mut self, density: f32) {
        self.params.set_component_float(self.ubo.data_mut(), 0, 0, 0, density);
    }

    pub fn start_dist(&self) -> f32 {
        self.params.get_component_float(self.ubo.data(), 0, 1, 0)
    }

    pub fn set_start_dist(&mut self, start: f32) {
        self.params.set_component_float(self.ubo.data_mut(), 0, 1, 0, start);
    }

    pub fn params(&self) -> FogParams {
        FogParams {
            color: self.color(),
            density: self.density(),
            start: self.start_dist(),
        }
    }

    pub fn set_params(&mut self, p: &FogParams) {
        self.set_color(p.color);
        self.set_density(p.density);
        self.set_start_dist(p.start);
    }
}

impl StateKind for Fog {
    type Snapshot = FogState;
    const NAME: &'static str = "fog";

    fn snapshot(&self) -> FogState {
        let params = self.params.get_vec2(self.ubo.data());
        FogState {
            binding: self.binding(),
            color: self.color().to_array(),
            params: params.to_array(),
        }
    }

    fn restore(&mut self, s: &FogState) {
        self.set_binding(s.binding);
        self.set_color(Vec4::from_array(s.color));
        self.params.set_vec2(self.ubo.data_mut(), s.params.into());
    }

    fn commit(&mut self, gl: &dyn Gl) {
        self.ubo.bind(gl);
    }
}

impl StateStack<Fog> {
    pub fn apply_params(&mut self, color: Vec4, density: f32, start: f32) {
        self.apply_with(|f| {
            f.set_color(color);
            f.set_density(density);
            f.set_start_dist(start);
        });
    }

    pub fn apply_fog(&mut self, params: &FogParams) {
        self.apply_with(|f| f.set_params(params));
    }

    /// Moves the block to another binding point and re-uploads.
    pub fn apply_binding(&mut self, binding: u32) {
        self.apply_with(|f| f.set_binding(binding));
    }
}
