use std::fmt;

/// Scalar kind stored in each 4-byte lane of a uniform.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Component {
    Float,
    Int,
    UInt,
    Bool,
    /// Texture unit index (stored as an int lane).
    Sampler,
}

impl Component {
    /// True for kinds read and written through the integer accessors.
    #[inline]
    pub fn is_integer(self) -> bool {
        !matches!(self, Self::Float)
    }
}

/// Decoded GL uniform/attribute type.
///
/// Shapes follow GLSL: a `vecN` has `rows == N, cols == 1`; a `matCxR` has
/// `cols == C, rows == R`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct MemberType {
    gl: u32,
    component: Component,
    cols: u8,
    rows: u8,
    glsl: &'static str,
}

impl MemberType {
    pub const FLOAT: Self = Self::new(glow::FLOAT, Component::Float, 1, 1, "float");
    pub const VEC2: Self = Self::new(glow::FLOAT_VEC2, Component::Float, 1, 2, "vec2");
    pub const VEC3: Self = Self::new(glow::FLOAT_VEC3, Component::Float, 1, 3, "vec3");
    pub const VEC4: Self = Self::new(glow::FLOAT_VEC4, Component::Float, 1, 4, "vec4");
    pub const INT: Self = Self::new(glow::INT, Component::Int, 1, 1, "int");
    pub const MAT3: Self = Self::new(glow::FLOAT_MAT3, Component::Float, 3, 3, "mat3");
    pub const MAT4: Self = Self::new(glow::FLOAT_MAT4, Component::Float, 4, 4, "mat4");

    const fn new(gl: u32, component: Component, cols: u8, rows: u8, glsl: &'static str) -> Self {
        Self {
            gl,
            component,
            cols,
            rows,
            glsl,
        }
    }

    /// Decodes a GL type enum. Returns `None` for types outside ES 3.0.
    pub fn from_gl(gl: u32) -> Option<Self> {
        use Component::*;

        let (component, cols, rows, glsl) = match gl {
            glow::FLOAT => (Float, 1, 1, "float"),
            glow::FLOAT_VEC2 => (Float, 1, 2, "vec2"),
            glow::FLOAT_VEC3 => (Float, 1, 3, "vec3"),
            glow::FLOAT_VEC4 => (Float, 1, 4, "vec4"),
            glow::INT => (Int, 1, 1, "int"),
            glow::INT_VEC2 => (Int, 1, 2, "ivec2"),
            glow::INT_VEC3 => (Int, 1, 3, "ivec3"),
            glow::INT_VEC4 => (Int, 1, 4, "ivec4"),
            glow::UNSIGNED_INT => (UInt, 1, 1, "uint"),
            glow::UNSIGNED_INT_VEC2 => (UInt, 1, 2, "uvec2"),
            glow::UNSIGNED_INT_VEC3 => (UInt, 1, 3, "uvec3"),
            glow::UNSIGNED_INT_VEC4 => (UInt, 1, 4, "uvec4"),
            glow::BOOL => (Bool, 1, 1, "bool"),
            glow::BOOL_VEC2 => (Bool, 1, 2, "bvec2"),
            glow::BOOL_VEC3 => (Bool, 1, 3, "bvec3"),
            glow::BOOL_VEC4 => (Bool, 1, 4, "bvec4"),
            glow::FLOAT_MAT2 => (Float, 2, 2, "mat2"),
            glow::FLOAT_MAT3 => (Float, 3, 3, "mat3"),
            glow::FLOAT_MAT4 => (Float, 4, 4, "mat4"),
            glow::FLOAT_MAT2x3 => (Float, 2, 3, "mat2x3"),
            glow::FLOAT_MAT2x4 => (Float, 2, 4, "mat2x4"),
            glow::FLOAT_MAT3x2 => (Float, 3, 2, "mat3x2"),
            glow::FLOAT_MAT3x4 => (Float, 3, 4, "mat3x4"),
            glow::FLOAT_MAT4x2 => (Float, 4, 2, "mat4x2"),
            glow::FLOAT_MAT4x3 => (Float, 4, 3, "mat4x3"),
            glow::SAMPLER_2D => (Sampler, 1, 1, "sampler2D"),
            glow::SAMPLER_3D => (Sampler, 1, 1, "sampler3D"),
            glow::SAMPLER_CUBE => (Sampler, 1, 1, "samplerCube"),
            glow::SAMPLER_2D_SHADOW => (Sampler, 1, 1, "sampler2DShadow"),
            glow::SAMPLER_2D_ARRAY => (Sampler, 1, 1, "sampler2DArray"),
            glow::SAMPLER_2D_ARRAY_SHADOW => (Sampler, 1, 1, "sampler2DArrayShadow"),
            glow::SAMPLER_CUBE_SHADOW => (Sampler, 1, 1, "samplerCubeShadow"),
            glow::INT_SAMPLER_2D => (Sampler, 1, 1, "isampler2D"),
            glow::INT_SAMPLER_3D => (Sampler, 1, 1, "isampler3D"),
            glow::INT_SAMPLER_CUBE => (Sampler, 1, 1, "isamplerCube"),
            glow::INT_SAMPLER_2D_ARRAY => (Sampler, 1, 1, "isampler2DArray"),
            glow::UNSIGNED_INT_SAMPLER_2D => (Sampler, 1, 1, "usampler2D"),
            glow::UNSIGNED_INT_SAMPLER_3D => (Sampler, 1, 1, "usampler3D"),
            glow::UNSIGNED_INT_SAMPLER_CUBE => (Sampler, 1, 1, "usamplerCube"),
            glow::UNSIGNED_INT_SAMPLER_2D_ARRAY => (Sampler, 1, 1, "usampler2DArray"),
            _ => return None,
        };

        Some(Self::new(gl, component, cols, rows, glsl))
    }

    #[inline]
    pub fn gl(self) -> u32 {
        self.gl
    }

    #[inline]
    pub fn component(self) -> Component {
        self.component
    }

    /// Number of columns; 1 for scalars and vectors.
    #[inline]
    pub fn cols(self) -> u32 {
        self.cols as u32
    }

    /// Number of rows (vector length for vectors).
    #[inline]
    pub fn rows(self) -> u32 {
        self.rows as u32
    }

    #[inline]
    pub fn is_matrix(self) -> bool {
        self.cols > 1
    }

    #[inline]
    pub fn is_sampler(self) -> bool {
        self.component == Component::Sampler
    }

    /// Number of 4-byte lanes in one element.
    #[inline]
    pub fn lanes(self) -> u32 {
        self.cols() * self.rows()
    }

    #[inline]
    pub fn glsl_name(self) -> &'static str {
        self.glsl
    }
}

impl fmt::Display for MemberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glsl)
    }
}
