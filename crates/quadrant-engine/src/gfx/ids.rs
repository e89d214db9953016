/// Handle to a GPU buffer created through a [`RenderBackend`](super::RenderBackend).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct BufferId(pub(crate) u32);

/// Handle to a compiled shader program.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ProgramId(pub(crate) u32);

/// Handle to uploaded texture pixels.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TextureId(pub(crate) u32);

impl BufferId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl ProgramId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl TextureId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}
