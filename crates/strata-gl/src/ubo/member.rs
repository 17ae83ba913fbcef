//! Typed access to one member of a uniform block's client-side buffer.
//!
//! Every value is addressed as a 4-byte lane:
//!
//! ```text
//! address(e, r, c) = offset + e * array_stride + c * matrix_stride + r * 4
//! ```
//!
//! Lanes are stored in native byte order, which is what the driver expects
//! for data handed to `glBufferData`.
//!
//! Index and shape mismatches are programming errors and are caught with
//! debug assertions; release builds still panic on out-of-buffer slicing.

use bytemuck::Pod;
use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};

use crate::shader::{Component, MemberType, Uniform};

use super::layout::LANE;

const LANE_BYTES: usize = LANE as usize;

/// Layout of one block member, detached from any buffer.
///
/// Accessors take the block buffer explicitly so one `UboMember` can address
/// any number of buffers with the same layout.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct UboMember {
    ty: MemberType,
    array_len: u32,
    offset: u32,
    array_stride: Option<u32>,
    matrix_stride: Option<u32>,
}

impl UboMember {
    /// Builds an accessor for a reflected block member.
    ///
    /// Returns `None` for uniforms that are not in a block or whose type is
    /// not a known ES 3.0 type.
    pub fn from_uniform(u: &Uniform) -> Option<Self> {
        Some(Self {
            ty: u.member_type()?,
            array_len: u.array_len.max(1),
            offset: u.block_offset?,
            array_stride: u.array_stride,
            matrix_stride: u.matrix_stride,
        })
    }

    pub(crate) fn new(
        ty: MemberType,
        array_len: u32,
        offset: u32,
        array_stride: Option<u32>,
        matrix_stride: Option<u32>,
    ) -> Self {
        Self {
            ty,
            array_len,
            offset,
            array_stride,
            matrix_stride,
        }
    }

    #[inline]
    pub fn ty(&self) -> MemberType {
        self.ty
    }

    #[inline]
    pub fn array_len(&self) -> u32 {
        self.array_len
    }

    #[inline]
    pub fn offset(&self) -> u32 {
        self.offset
    }

    #[inline]
    pub fn array_stride(&self) -> Option<u32> {
        self.array_stride
    }

    #[inline]
    pub fn matrix_stride(&self) -> Option<u32> {
        self.matrix_stride
    }

    /// Byte address of lane (`row`, `col`) of element `elem`.
    pub fn address(&self, elem: u32, row: u32, col: u32) -> usize {
        debug_assert!(elem < self.array_len, "element {elem} out of range (len {})", self.array_len);
        debug_assert!(
            row < self.ty.rows() && col < self.ty.cols(),
            "lane ({row}, {col}) out of range for {}",
            self.ty
        );

        let mut addr = self.offset as usize + row as usize * LANE_BYTES;
        if let Some(s) = self.array_stride {
            addr += elem as usize * s as usize;
        }
        if let Some(s) = self.matrix_stride {
            addr += col as usize * s as usize;
        }
        addr
    }

    // ── scalars ───────────────────────────────────────────────────────────

    #[inline]
    pub fn get_int(&self, buf: &[u8]) -> i32 {
        self.get_component_int(buf, 0, 0, 0)
    }

    #[inline]
    pub fn set_int(&self, buf: &mut [u8], v: i32) {
        self.set_component_int(buf, 0, 0, 0, v);
    }

    #[inline]
    pub fn get_float(&self, buf: &[u8]) -> f32 {
        self.get_component_float(buf, 0, 0, 0)
    }

    #[inline]
    pub fn set_float(&self, buf: &mut [u8], v: f32) {
        self.set_component_float(buf, 0, 0, 0, v);
    }

    // ── single components ─────────────────────────────────────────────────

    pub fn get_component_int(&self, buf: &[u8], elem: u32, row: u32, col: u32) -> i32 {
        self.expect_int();
        read_lane(buf, self.address(elem, row, col))
    }

    pub fn set_component_int(&self, buf: &mut [u8], elem: u32, row: u32, col: u32, v: i32) {
        self.expect_int();
        write_lane(buf, self.address(elem, row, col), v);
    }

    pub fn get_component_float(&self, buf: &[u8], elem: u32, row: u32, col: u32) -> f32 {
        self.expect_float();
        read_lane(buf, self.address(elem, row, col))
    }

    pub fn set_component_float(&self, buf: &mut [u8], elem: u32, row: u32, col: u32, v: f32) {
        self.expect_float();
        write_lane(buf, self.address(elem, row, col), v);
    }

    // ── vectors ───────────────────────────────────────────────────────────

    pub fn get_vec2(&self, buf: &[u8]) -> Vec2 {
        Vec2::from_array(self.read_vec(buf, 0))
    }

    pub fn set_vec2(&self, buf: &mut [u8], v: Vec2) {
        self.write_vec(buf, 0, v.to_array());
    }

    pub fn get_vec3(&self, buf: &[u8]) -> Vec3 {
        Vec3::from_array(self.read_vec(buf, 0))
    }

    pub fn set_vec3(&self, buf: &mut [u8], v: Vec3) {
        self.write_vec(buf, 0, v.to_array());
    }

    pub fn get_vec4(&self, buf: &[u8]) -> Vec4 {
        Vec4::from_array(self.read_vec(buf, 0))
    }

    pub fn set_vec4(&self, buf: &mut [u8], v: Vec4) {
        self.write_vec(buf, 0, v.to_array());
    }

    // ── matrices (column-major) ───────────────────────────────────────────

    pub fn get_mat3(&self, buf: &[u8]) -> Mat3 {
        Mat3::from_cols_array(&self.read_mat(buf, 0))
    }

    pub fn set_mat3(&self, buf: &mut [u8], m: &Mat3) {
        self.write_mat(buf, 0, &m.to_cols_array());
    }

    pub fn get_mat4(&self, buf: &[u8]) -> Mat4 {
        Mat4::from_cols_array(&self.read_mat(buf, 0))
    }

    pub fn set_mat4(&self, buf: &mut [u8], m: &Mat4) {
        self.write_mat(buf, 0, &m.to_cols_array());
    }

    // ── bulk arrays ───────────────────────────────────────────────────────
    //
    // Bulk accessors cover elements `first .. first + out.len()`.

    pub fn get_ints(&self, buf: &[u8], first: u32, out: &mut [i32]) {
        for (e, v) in self.elems(first, out.len()).zip(out) {
            *v = self.get_component_int(buf, e, 0, 0);
        }
    }

    pub fn set_ints(&self, buf: &mut [u8], first: u32, vals: &[i32]) {
        for (e, &v) in self.elems(first, vals.len()).zip(vals) {
            self.set_component_int(buf, e, 0, 0, v);
        }
    }

    pub fn get_floats(&self, buf: &[u8], first: u32, out: &mut [f32]) {
        for (e, v) in self.elems(first, out.len()).zip(out) {
            *v = self.get_component_float(buf, e, 0, 0);
        }
    }

    pub fn set_floats(&self, buf: &mut [u8], first: u32, vals: &[f32]) {
        for (e, &v) in self.elems(first, vals.len()).zip(vals) {
            self.set_component_float(buf, e, 0, 0, v);
        }
    }

    pub fn get_vec2s(&self, buf: &[u8], first: u32, out: &mut [Vec2]) {
        for (e, v) in self.elems(first, out.len()).zip(out) {
            *v = Vec2::from_array(self.read_vec(buf, e));
        }
    }

    pub fn set_vec2s(&self, buf: &mut [u8], first: u32, vals: &[Vec2]) {
        for (e, v) in self.elems(first, vals.len()).zip(vals) {
            self.write_vec(buf, e, v.to_array());
        }
    }

    pub fn get_vec3s(&self, buf: &[u8], first: u32, out: &mut [Vec3]) {
        for (e, v) in self.elems(first, out.len()).zip(out) {
            *v = Vec3::from_array(self.read_vec(buf, e));
        }
    }

    pub fn set_vec3s(&self, buf: &mut [u8], first: u32, vals: &[Vec3]) {
        for (e, v) in self.elems(first, vals.len()).zip(vals) {
            self.write_vec(buf, e, v.to_array());
        }
    }

    pub fn get_vec4s(&self, buf: &[u8], first: u32, out: &mut [Vec4]) {
        for (e, v) in self.elems(first, out.len()).zip(out) {
            *v = Vec4::from_array(self.read_vec(buf, e));
        }
    }

    pub fn set_vec4s(&self, buf: &mut [u8], first: u32, vals: &[Vec4]) {
        for (e, v) in self.elems(first, vals.len()).zip(vals) {
            self.write_vec(buf, e, v.to_array());
        }
    }

    pub fn get_mat3s(&self, buf: &[u8], first: u32, out: &mut [Mat3]) {
        for (e, m) in self.elems(first, out.len()).zip(out) {
            *m = Mat3::from_cols_array(&self.read_mat(buf, e));
        }
    }

    pub fn set_mat3s(&self, buf: &mut [u8], first: u32, vals: &[Mat3]) {
        for (e, m) in self.elems(first, vals.len()).zip(vals) {
            self.write_mat(buf, e, &m.to_cols_array());
        }
    }

    pub fn get_mat4s(&self, buf: &[u8], first: u32, out: &mut [Mat4]) {
        for (e, m) in self.elems(first, out.len()).zip(out) {
            *m = Mat4::from_cols_array(&self.read_mat(buf, e));
        }
    }

    pub fn set_mat4s(&self, buf: &mut [u8], first: u32, vals: &[Mat4]) {
        for (e, m) in self.elems(first, vals.len()).zip(vals) {
            self.write_mat(buf, e, &m.to_cols_array());
        }
    }

    // ── internals ─────────────────────────────────────────────────────────

    fn elems(&self, first: u32, len: usize) -> std::ops::Range<u32> {
        let end = first + len as u32;
        debug_assert!(
            end <= self.array_len,
            "elements {first}..{end} out of range (len {})",
            self.array_len
        );
        first..end
    }

    /// Reads element `elem` of a float vector member with `N` rows.
    fn read_vec<const N: usize>(&self, buf: &[u8], elem: u32) -> [f32; N] {
        self.expect_shape(1, N as u32);
        std::array::from_fn(|r| self.get_component_float(buf, elem, r as u32, 0))
    }

    fn write_vec<const N: usize>(&self, buf: &mut [u8], elem: u32, v: [f32; N]) {
        self.expect_shape(1, N as u32);
        for (r, x) in v.into_iter().enumerate() {
            self.set_component_float(buf, elem, r as u32, 0, x);
        }
    }

    /// Reads a square `D`x`D` matrix element into column-major order. `L`
    /// must equal `D * D`.
    fn read_mat<const L: usize>(&self, buf: &[u8], elem: u32) -> [f32; L] {
        let dim = mat_dim(L);
        self.expect_shape(dim, dim);
        std::array::from_fn(|i| {
            let (c, r) = (i as u32 / dim, i as u32 % dim);
            self.get_component_float(buf, elem, r, c)
        })
    }

    fn write_mat<const L: usize>(&self, buf: &mut [u8], elem: u32, m: &[f32; L]) {
        let dim = mat_dim(L);
        self.expect_shape(dim, dim);
        for (i, &x) in m.iter().enumerate() {
            let (c, r) = (i as u32 / dim, i as u32 % dim);
            self.set_component_float(buf, elem, r, c, x);
        }
    }

    #[inline]
    fn expect_float(&self) {
        debug_assert!(
            self.ty.component() == Component::Float,
            "float access to {} member",
            self.ty
        );
    }

    #[inline]
    fn expect_int(&self) {
        debug_assert!(
            self.ty.component().is_integer(),
            "integer access to {} member",
            self.ty
        );
    }

    #[inline]
    fn expect_shape(&self, cols: u32, rows: u32) {
        debug_assert!(
            self.ty.cols() == cols && self.ty.rows() == rows,
            "{cols}x{rows} access to {} member",
            self.ty
        );
    }
}

#[inline]
fn mat_dim(lanes: usize) -> u32 {
    match lanes {
        4 => 2,
        9 => 3,
        _ => 4,
    }
}

#[inline]
fn read_lane<T: Pod>(buf: &[u8], at: usize) -> T {
    bytemuck::pod_read_unaligned(&buf[at..at + LANE_BYTES])
}

#[inline]
fn write_lane<T: Pod>(buf: &mut [u8], at: usize, v: T) {
    buf[at..at + LANE_BYTES].copy_from_slice(bytemuck::bytes_of(&v));
}
