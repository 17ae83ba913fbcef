use thiserror::Error;

use super::Gl;

/// Classification of a `glGetError` code.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum GlErrorKind {
    InvalidEnum,
    InvalidValue,
    InvalidOperation,
    InvalidFramebufferOperation,
    OutOfMemory,
    Unknown,
}

impl GlErrorKind {
    pub fn from_code(code: u32) -> Self {
        match code {
            glow::INVALID_ENUM => Self::InvalidEnum,
            glow::INVALID_VALUE => Self::InvalidValue,
            glow::INVALID_OPERATION => Self::InvalidOperation,
            glow::INVALID_FRAMEBUFFER_OPERATION => Self::InvalidFramebufferOperation,
            glow::OUT_OF_MEMORY => Self::OutOfMemory,
            _ => Self::Unknown,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Self::InvalidEnum => "Invalid enum",
            Self::InvalidValue => "Invalid value",
            Self::InvalidOperation => "Invalid operation",
            Self::InvalidFramebufferOperation => "Invalid framebuffer operation",
            Self::OutOfMemory => "Out of memory",
            Self::Unknown => "Unknown error",
        }
    }
}

/// A GPU-reported error.
///
/// GL errors indicate programming mistakes rather than transient conditions,
/// so they are never retried.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Error)]
#[error("Err 0x{code:08X}: {}", .kind.describe())]
pub struct GlError {
    pub code: u32,
    pub kind: GlErrorKind,
}

impl GlError {
    #[inline]
    pub fn from_code(code: u32) -> Self {
        Self {
            code,
            kind: GlErrorKind::from_code(code),
        }
    }
}

/// Polls `glGetError` once.
///
/// Returns `Ok(())` for `GL_NO_ERROR`; otherwise the decoded error, which is
/// also logged at `error` level.
pub fn check_err(gl: &dyn Gl) -> Result<(), GlError> {
    let code = gl.get_error();
    if code == glow::NO_ERROR {
        return Ok(());
    }
    let err = GlError::from_code(code);
    log::error!("{err}");
    Err(err)
}
