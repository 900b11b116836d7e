/// Pixel dimensions of a frame as reported by the frame source.
///
/// The pair is unordered: the source does not guarantee which component is
/// the width of the upright image, so consumers must not assume
/// `first == width`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub first: u32,
    pub second: u32,
}

impl Resolution {
    pub fn new(first: u32, second: u32) -> Self {
        Self { first, second }
    }

    pub fn larger(&self) -> u32 {
        self.first.max(self.second)
    }

    pub fn smaller(&self) -> u32 {
        self.first.min(self.second)
    }

    pub fn is_empty(&self) -> bool {
        self.first == 0 || self.second == 0
    }
}

impl Default for Resolution {
    /// A 1x1 placeholder used before the first detection completes.
    fn default() -> Self {
        Self::new(1, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_larger_and_smaller_ignore_order() {
        let a = Resolution::new(720, 1280);
        let b = Resolution::new(1280, 720);
        assert_eq!(a.larger(), 1280);
        assert_eq!(a.smaller(), 720);
        assert_eq!(a.larger(), b.larger());
        assert_eq!(a.smaller(), b.smaller());
    }

    #[test]
    fn test_default_is_unit() {
        assert_eq!(Resolution::default(), Resolution::new(1, 1));
        assert!(!Resolution::default().is_empty());
    }

    #[test]
    fn test_zero_component_is_empty() {
        assert!(Resolution::new(0, 10).is_empty());
        assert!(Resolution::new(10, 0).is_empty());
    }
}
