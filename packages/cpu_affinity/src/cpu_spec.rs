use std::str::FromStr;

use derive_more::derive::Display;

use crate::{CoreId, Error, ProcessingUnitId, SocketId};

/// Addresses a processor by its position in the hardware topology: socket,
/// core within that socket, processing unit within that core.
///
/// All three coordinates are zero-based and dense, as guaranteed by topology
/// discovery. For instance, the first hardware thread of the first core on the
/// first socket is `(0, 0, 0)`.
///
/// Specs order lexicographically (socket, then core, then processing unit),
/// so a sorted collection of specs is naturally grouped by socket and core.
///
/// # Example
///
/// ```
/// use cpu_affinity::CpuSpec;
///
/// let spec = CpuSpec::new(0, 2, 1);
/// assert_eq!(spec.socket(), 0);
/// assert_eq!(spec.core(), 2);
/// assert_eq!(spec.processing_unit(), 1);
/// assert_eq!(spec.to_string(), "0,2,1");
/// ```
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[display("{socket},{core},{processing_unit}")]
pub struct CpuSpec {
    socket: SocketId,
    core: CoreId,
    processing_unit: ProcessingUnitId,
}

impl CpuSpec {
    /// The spec that addresses no processor: all coordinates are -1.
    pub const INVALID: Self = Self {
        socket: -1,
        core: -1,
        processing_unit: -1,
    };

    /// Creates a spec from zero-based socket, core and processing unit
    /// coordinates.
    #[must_use]
    pub const fn new(
        socket: SocketId,
        core: CoreId,
        processing_unit: ProcessingUnitId,
    ) -> Self {
        Self {
            socket,
            core,
            processing_unit,
        }
    }

    /// The zero-based socket index.
    #[inline]
    #[must_use]
    pub const fn socket(&self) -> SocketId {
        self.socket
    }

    /// The zero-based core index within the socket.
    #[inline]
    #[must_use]
    pub const fn core(&self) -> CoreId {
        self.core
    }

    /// The zero-based processing unit index within the core.
    #[inline]
    #[must_use]
    pub const fn processing_unit(&self) -> ProcessingUnitId {
        self.processing_unit
    }

    /// Whether all three coordinates address a real position (are
    /// non-negative).
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.socket >= 0 && self.core >= 0 && self.processing_unit >= 0
    }
}

impl Default for CpuSpec {
    /// Returns [`CpuSpec::INVALID`].
    fn default() -> Self {
        Self::INVALID
    }
}

impl FromStr for CpuSpec {
    type Err = Error;

    /// Parses a `socket,core,processing_unit` triple, the same format
    /// [`Display`][std::fmt::Display] emits.
    ///
    /// ```
    /// use cpu_affinity::CpuSpec;
    ///
    /// let spec: CpuSpec = "1,0,1".parse().unwrap();
    /// assert_eq!(spec, CpuSpec::new(1, 0, 1));
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = || Error::InvalidSpecFormat {
            invalid_value: s.to_string(),
        };

        let mut parts = s.split(',');

        let next_coordinate = |parts: &mut std::str::Split<'_, char>| {
            parts
                .next()
                .and_then(|part| part.trim().parse::<i32>().ok())
                .ok_or_else(error)
        };

        let socket = next_coordinate(&mut parts)?;
        let core = next_coordinate(&mut parts)?;
        let processing_unit = next_coordinate(&mut parts)?;

        if parts.next().is_some() {
            return Err(error());
        }

        Ok(Self::new(socket, core, processing_unit))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn smoke_test() {
        let spec = CpuSpec::new(1, 2, 3);

        assert_eq!(spec.socket(), 1);
        assert_eq!(spec.core(), 2);
        assert_eq!(spec.processing_unit(), 3);
        assert!(spec.is_valid());

        assert_eq!(spec, CpuSpec::new(1, 2, 3));
        assert_ne!(spec, CpuSpec::new(1, 2, 4));
    }

    #[test]
    fn default_is_invalid() {
        let spec = CpuSpec::default();

        assert_eq!(spec, CpuSpec::INVALID);
        assert_eq!(spec.socket(), -1);
        assert_eq!(spec.core(), -1);
        assert_eq!(spec.processing_unit(), -1);
        assert!(!spec.is_valid());
    }

    #[test]
    fn orders_by_socket_then_core_then_processing_unit() {
        assert!(CpuSpec::new(0, 9, 9) < CpuSpec::new(1, 0, 0));
        assert!(CpuSpec::new(0, 0, 9) < CpuSpec::new(0, 1, 0));
        assert!(CpuSpec::new(0, 0, 0) < CpuSpec::new(0, 0, 1));
        assert!(CpuSpec::INVALID < CpuSpec::new(0, 0, 0));
    }

    #[test]
    fn round_trips_through_string() {
        let spec = CpuSpec::new(1, 0, 1);

        let parsed: CpuSpec = spec.to_string().parse().unwrap();

        assert_eq!(parsed, spec);
    }

    #[test]
    fn garbage_is_parse_error() {
        "".parse::<CpuSpec>().unwrap_err();
        "1".parse::<CpuSpec>().unwrap_err();
        "1,2".parse::<CpuSpec>().unwrap_err();
        "1,2,3,4".parse::<CpuSpec>().unwrap_err();
        "a,b,c".parse::<CpuSpec>().unwrap_err();
    }
}
