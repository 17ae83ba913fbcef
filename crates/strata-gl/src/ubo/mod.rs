//! Uniform buffer objects: std140 placement, typed member access and upload.

mod block;
mod layout;
mod member;

pub use block::Ubo;
pub use layout::{Placement, Std140, LANE};
pub use member::UboMember;
