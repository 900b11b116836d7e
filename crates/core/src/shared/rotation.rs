/// Clockwise rotation that turns a captured frame upright.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Accepts any multiple of 90, including negative values.
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }

    pub fn degrees(self) -> u32 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// True when the upright image has width and height swapped.
    pub fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, Some(Rotation::Deg0))]
    #[case(90, Some(Rotation::Deg90))]
    #[case(180, Some(Rotation::Deg180))]
    #[case(270, Some(Rotation::Deg270))]
    #[case(360, Some(Rotation::Deg0))]
    #[case(-90, Some(Rotation::Deg270))]
    #[case(45, None)]
    fn test_from_degrees(#[case] degrees: i32, #[case] expected: Option<Rotation>) {
        assert_eq!(Rotation::from_degrees(degrees), expected);
    }

    #[test]
    fn test_swaps_axes_only_for_quarter_turns() {
        assert!(!Rotation::Deg0.swaps_axes());
        assert!(Rotation::Deg90.swaps_axes());
        assert!(!Rotation::Deg180.swaps_axes());
        assert!(Rotation::Deg270.swaps_axes());
    }

    #[test]
    fn test_degrees_round_trip() {
        for r in [
            Rotation::Deg0,
            Rotation::Deg90,
            Rotation::Deg180,
            Rotation::Deg270,
        ] {
            assert_eq!(Rotation::from_degrees(r.degrees() as i32), Some(r));
        }
    }
}
