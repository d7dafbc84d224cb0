//! Fixed orientation on translucent hosts.
//!
//! One platform release refuses to start a translucent (semi-transparent)
//! host that also requests a fixed orientation. Hosts used as overlay
//! backdrops are often translucent, so before such a host starts its
//! requested orientation is reset to [`Orientation::Unspecified`] on that
//! release only.

use serde::{Deserialize, Serialize};

/// Platform level on which the quirk exists.
pub const AFFECTED_PLATFORM_LEVEL: u32 = 26;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Unspecified,
    Portrait,
    Landscape,
    /// Follows the sensor; not a fixed orientation.
    Sensor,
}

impl Orientation {
    #[must_use]
    pub const fn is_fixed(self) -> bool {
        matches!(self, Self::Portrait | Self::Landscape)
    }
}

/// Capability a host exposes so the shim can inspect and correct it.
pub trait OrientationControl {
    fn is_translucent(&self) -> bool;

    fn requested_orientation(&self) -> Orientation;

    fn set_requested_orientation(&self, orientation: Orientation);
}

/// Applies the workaround if `platform_level` is affected.
///
/// Returns `true` if the host's orientation was changed.
///
/// ```rust
/// use scrim::compat::{fix_translucent_orientation, Orientation, OrientationControl};
/// use scrim::host::HostWindow;
///
/// let host = HostWindow::new("backdrop");
/// host.set_translucent(true);
/// host.set_requested_orientation(Orientation::Portrait);
///
/// assert!(!fix_translucent_orientation(&*host, 30));
/// assert!(fix_translucent_orientation(&*host, 26));
/// assert_eq!(host.requested_orientation(), Orientation::Unspecified);
/// ```
pub fn fix_translucent_orientation(host: &dyn OrientationControl, platform_level: u32) -> bool {
    if platform_level != AFFECTED_PLATFORM_LEVEL || !host.is_translucent() {
        return false;
    }
    let requested = host.requested_orientation();
    if !requested.is_fixed() {
        return false;
    }
    tracing::debug!(?requested, platform_level, "resetting fixed orientation on translucent host");
    host.set_requested_orientation(Orientation::Unspecified);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Fake {
        translucent: bool,
        orientation: Cell<Orientation>,
    }

    impl OrientationControl for Fake {
        fn is_translucent(&self) -> bool {
            self.translucent
        }

        fn requested_orientation(&self) -> Orientation {
            self.orientation.get()
        }

        fn set_requested_orientation(&self, orientation: Orientation) {
            self.orientation.set(orientation);
        }
    }

    #[test]
    fn opaque_hosts_are_left_alone() {
        let host = Fake {
            translucent: false,
            orientation: Cell::new(Orientation::Landscape),
        };
        assert!(!fix_translucent_orientation(&host, AFFECTED_PLATFORM_LEVEL));
        assert_eq!(host.orientation.get(), Orientation::Landscape);
    }

    #[test]
    fn non_fixed_orientations_are_left_alone() {
        let host = Fake {
            translucent: true,
            orientation: Cell::new(Orientation::Sensor),
        };
        assert!(!fix_translucent_orientation(&host, AFFECTED_PLATFORM_LEVEL));
        assert_eq!(host.orientation.get(), Orientation::Sensor);
    }

    #[test]
    fn translucent_fixed_host_is_reset_on_affected_level() {
        let host = Fake {
            translucent: true,
            orientation: Cell::new(Orientation::Portrait),
        };
        assert!(fix_translucent_orientation(&host, AFFECTED_PLATFORM_LEVEL));
        assert_eq!(host.orientation.get(), Orientation::Unspecified);
    }
}
