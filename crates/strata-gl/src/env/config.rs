/// Construction-time settings for a [`DrawEnv`](super::DrawEnv).
#[derive(Debug, Clone)]
pub struct EnvConfig {
    /// Snapshot slots pre-allocated per state stack.
    pub stack_capacity: usize,
    /// Poll `glGetError` after program initialization and at
    /// [`DrawEnv::checkpoint`](super::DrawEnv::checkpoint).
    ///
    /// On by default in debug builds only; `glGetError` stalls the pipeline.
    pub check_errors: bool,
    /// First uniform-buffer binding point handed out to named blocks.
    pub first_block_binding: u32,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            stack_capacity: 8,
            check_errors: cfg!(debug_assertions),
            first_block_binding: 0,
        }
    }
}
