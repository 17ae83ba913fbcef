//! std140 placement for blocks assembled on the client.

use crate::shader::MemberType;

/// Bytes per scalar lane.
pub const LANE: u32 = 4;

/// Base alignment of arrays, matrix columns and the block itself.
const VEC4_ALIGN: u32 = 16;

/// Placement of one member inside a std140 block.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Placement {
    pub offset: u32,
    pub array_stride: Option<u32>,
    pub matrix_stride: Option<u32>,
}

/// Running std140 cursor. Members are placed in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Std140 {
    cursor: u32,
}

impl Std140 {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places a member of type `ty` with `array_len` elements (1 for
    /// non-arrays) after everything placed so far.
    pub fn place(&mut self, ty: MemberType, array_len: u32) -> Placement {
        debug_assert!(array_len >= 1, "array_len must be at least 1");

        let rows = ty.rows();
        let (align, size, matrix_stride) = if ty.is_matrix() {
            // Column-major: an array of `cols` column vectors, each padded
            // to a vec4 slot.
            (VEC4_ALIGN, ty.cols() * VEC4_ALIGN, Some(VEC4_ALIGN))
        } else {
            let size = rows * LANE;
            let align = match rows {
                1 => LANE,
                2 => 2 * LANE,
                _ => VEC4_ALIGN,
            };
            (align, size, None)
        };

        let (align, stride, total) = if array_len > 1 {
            let stride = round_up(size, VEC4_ALIGN);
            (VEC4_ALIGN, Some(stride), stride * array_len)
        } else {
            (align, None, size)
        };

        let offset = round_up(self.cursor, align);
        self.cursor = offset + total;

        Placement {
            offset,
            array_stride: stride,
            matrix_stride,
        }
    }

    /// Block size so far, padded to a vec4 boundary.
    #[inline]
    pub fn size(&self) -> u32 {
        round_up(self.cursor, VEC4_ALIGN)
    }
}

#[inline]
fn round_up(v: u32, align: u32) -> u32 {
    v.div_ceil(align) * align
}
