/// Ordering bucket for drawables.
///
/// Layers render back to front in declaration order; within a layer,
/// later submissions draw on top.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Default)]
pub enum DepthLayer {
    Background,
    #[default]
    Middleground,
    Foreground,
}

impl DepthLayer {
    /// Every layer, back to front.
    pub const ALL: [DepthLayer; 3] =
        [DepthLayer::Background, DepthLayer::Middleground, DepthLayer::Foreground];

    pub const COUNT: usize = Self::ALL.len();

    /// Position in [`ALL`](Self::ALL).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_back_to_front() {
        assert!(DepthLayer::ALL.windows(2).all(|w| w[0] < w[1]));
        for (i, layer) in DepthLayer::ALL.iter().enumerate() {
            assert_eq!(layer.index(), i);
        }
    }
}
