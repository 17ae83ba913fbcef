use std::collections::HashMap;

use thiserror::Error;

use crate::gl::Gl;

use super::resource::UniformBlock;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("binding point {point} requested for block `{name}` is already held by `{holder}`")]
pub struct BindingCollision {
    pub name: String,
    pub point: u32,
    pub holder: String,
}

/// Process-wide map from uniform-block name to binding point.
///
/// Every program that declares a block with a given name reads it from the
/// same point, so one buffer bound there feeds all of them. Points are handed
/// out sequentially on first request; an explicit [`assign`](Self::assign)
/// can pin a name to a point that no other name holds.
#[derive(Debug, Clone, Default)]
pub struct BlockBindings {
    next: u32,
    by_name: HashMap<String, u32>,
}

impl BlockBindings {
    /// Creates a registry that starts allocating at `first`.
    pub fn new(first: u32) -> Self {
        Self {
            next: first,
            by_name: HashMap::new(),
        }
    }

    /// Binding point for `name`, allocating the next free one if needed.
    pub fn binding_for(&mut self, name: &str) -> u32 {
        if let Some(&point) = self.by_name.get(name) {
            return point;
        }

        while self.holder_of(self.next).is_some() {
            self.next += 1;
        }
        let point = self.next;
        self.next += 1;
        self.by_name.insert(name.to_owned(), point);
        log::trace!("uniform block `{name}` -> binding {point}");
        point
    }

    /// Pins `name` to `point`.
    ///
    /// Re-assigning a name to its current point is a no-op. A point held by a
    /// different name is rejected and the registry is left unchanged.
    pub fn assign(&mut self, name: &str, point: u32) -> Result<(), BindingCollision> {
        if let Some(holder) = self.holder_of(point) {
            if holder != name {
                let err = BindingCollision {
                    name: name.to_owned(),
                    point,
                    holder: holder.to_owned(),
                };
                log::warn!("{err}");
                return Err(err);
            }
            return Ok(());
        }

        self.by_name.insert(name.to_owned(), point);
        Ok(())
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<u32> {
        self.by_name.get(name).copied()
    }

    /// Binds every block of `program` to its registered point and records the
    /// point in the descriptors.
    pub fn apply_to_program(&mut self, gl: &dyn Gl, program: u32, blocks: &mut [UniformBlock]) {
        for block in blocks {
            let point = self.binding_for(&block.name);
            if block.binding != point {
                gl.uniform_block_binding(program, block.index, point);
                block.binding = point;
            }
        }
    }

    fn holder_of(&self, point: u32) -> Option<&str> {
        self.by_name
            .iter()
            .find(|(_, p)| **p == point)
            .map(|(name, _)| name.as_str())
    }
}
