//! Placement gravity and entrance/exit animation styles.
//!
//! Gravity decides which edge of the host an overlay hugs. When no animation
//! was chosen explicitly, the animation is derived from the resolved gravity
//! so that an overlay slides in from the edge it is attached to.

use super::error::{Result, ScrimError};
use serde::{Deserialize, Serialize};

/// Raw platform gravity constants understood by [`Gravity::from_bits`].
pub mod bits {
    pub const NO_GRAVITY: u32 = 0x0000_0000;
    pub const LEFT: u32 = 0x0000_0003;
    pub const RIGHT: u32 = 0x0000_0005;
    pub const TOP: u32 = 0x0000_0030;
    pub const BOTTOM: u32 = 0x0000_0050;
    pub const CENTER: u32 = 0x0000_0011;
    pub const START: u32 = 0x0080_0003;
    pub const END: u32 = 0x0080_0005;
}

/// Edge (or center) an overlay is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gravity {
    Center,
    Top,
    Bottom,
    Left,
    Right,
}

impl Gravity {
    /// Maps a raw platform gravity constant to a typed gravity.
    ///
    /// `NO_GRAVITY` maps to `Ok(None)` (unset). `START`/`END` are treated as
    /// `Left`/`Right` for left-to-right layouts.
    ///
    /// # Errors
    ///
    /// Returns [`ScrimError::UnsupportedGravity`] for any other constant,
    /// including composite values such as `TOP | LEFT`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use scrim::Gravity;
    /// use scrim::domain::gravity::bits;
    ///
    /// assert_eq!(Gravity::from_bits(bits::BOTTOM).unwrap(), Some(Gravity::Bottom));
    /// assert_eq!(Gravity::from_bits(bits::NO_GRAVITY).unwrap(), None);
    /// assert!(Gravity::from_bits(bits::TOP | bits::LEFT).is_err());
    /// ```
    pub fn from_bits(value: u32) -> Result<Option<Self>> {
        match value {
            bits::NO_GRAVITY => Ok(None),
            bits::CENTER => Ok(Some(Self::Center)),
            bits::TOP => Ok(Some(Self::Top)),
            bits::BOTTOM => Ok(Some(Self::Bottom)),
            bits::LEFT | bits::START => Ok(Some(Self::Left)),
            bits::RIGHT | bits::END => Ok(Some(Self::Right)),
            other => Err(ScrimError::UnsupportedGravity(other)),
        }
    }

    /// Returns the raw platform constant for this gravity.
    #[must_use]
    pub const fn to_bits(self) -> u32 {
        match self {
            Self::Center => bits::CENTER,
            Self::Top => bits::TOP,
            Self::Bottom => bits::BOTTOM,
            Self::Left => bits::LEFT,
            Self::Right => bits::RIGHT,
        }
    }
}

/// Entrance/exit animation of an overlay window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Animation {
    /// No window animation. Used while the host is in the background.
    None,
    Fade,
    /// Enters from the top edge.
    SlideDown,
    /// Enters from the bottom edge.
    SlideUp,
    SlideFromLeft,
    SlideFromRight,
    /// Platform animation resource chosen by the integrator.
    Custom(u32),
}

impl Animation {
    /// Default animation for an overlay attached to `gravity`.
    ///
    /// ```rust
    /// use scrim::{Animation, Gravity};
    ///
    /// assert_eq!(Animation::for_gravity(Gravity::Bottom), Animation::SlideUp);
    /// assert_eq!(Animation::for_gravity(Gravity::Center), Animation::Fade);
    /// ```
    #[must_use]
    pub const fn for_gravity(gravity: Gravity) -> Self {
        match gravity {
            Gravity::Top => Self::SlideDown,
            Gravity::Bottom => Self::SlideUp,
            Gravity::Left => Self::SlideFromLeft,
            Gravity::Right => Self::SlideFromRight,
            Gravity::Center => Self::Fade,
        }
    }

    /// Whether this is a horizontal slide.
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::SlideFromLeft | Self::SlideFromRight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_and_end_fold_into_left_and_right() {
        assert_eq!(Gravity::from_bits(bits::START).unwrap(), Some(Gravity::Left));
        assert_eq!(Gravity::from_bits(bits::END).unwrap(), Some(Gravity::Right));
    }

    #[test]
    fn unsupported_constant_is_reported_with_its_value() {
        let err = Gravity::from_bits(0x7).unwrap_err();
        assert!(matches!(err, ScrimError::UnsupportedGravity(0x7)));
        assert_eq!(err.to_string(), "unsupported gravity constant: 0x7");
    }

    #[test]
    fn bits_round_trip_for_every_gravity() {
        for gravity in [Gravity::Center, Gravity::Top, Gravity::Bottom, Gravity::Left, Gravity::Right] {
            assert_eq!(Gravity::from_bits(gravity.to_bits()).unwrap(), Some(gravity));
        }
    }

    #[test]
    fn side_gravities_slide_horizontally() {
        assert!(Animation::for_gravity(Gravity::Left).is_horizontal());
        assert!(Animation::for_gravity(Gravity::Right).is_horizontal());
        assert_eq!(Animation::for_gravity(Gravity::Top), Animation::SlideDown);
        assert!(!Animation::Fade.is_horizontal());
    }
}
