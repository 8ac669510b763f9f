use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};

use crate::{CoreId, CpuSpec, NumaNodeId, ProcessingUnitId, ProcessorId, SocketId};

/// A logical processor discovered on the system.
///
/// Combines the topology address ([`CpuSpec`]), the operating-system-native
/// identifier used in affinity system calls, and the NUMA node the processor
/// belongs to (-1 when unknown).
///
/// A `Cpu` is immutable once constructed. Identity, ordering and hashing all
/// delegate to the spec, so an ordered collection of processors is grouped by
/// socket, then core, then processing unit.
#[derive(Clone, Copy, Debug)]
pub struct Cpu {
    spec: CpuSpec,
    id: ProcessorId,
    numa_node: NumaNodeId,
}

impl Cpu {
    #[must_use]
    pub(crate) const fn new(spec: CpuSpec, id: ProcessorId, numa_node: NumaNodeId) -> Self {
        Self {
            spec,
            id,
            numa_node,
        }
    }

    /// The topology address of this processor.
    #[inline]
    #[must_use]
    pub const fn spec(&self) -> CpuSpec {
        self.spec
    }

    /// The operating-system-native identifier of this processor, as used in
    /// affinity system calls.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> ProcessorId {
        self.id
    }

    /// The NUMA node this processor belongs to, or -1 when unknown.
    #[inline]
    #[must_use]
    pub const fn numa_node(&self) -> NumaNodeId {
        self.numa_node
    }

    /// The zero-based socket index.
    #[inline]
    #[must_use]
    pub const fn socket(&self) -> SocketId {
        self.spec.socket()
    }

    /// The zero-based core index within the socket.
    #[inline]
    #[must_use]
    pub const fn core(&self) -> CoreId {
        self.spec.core()
    }

    /// The zero-based processing unit index within the core.
    #[inline]
    #[must_use]
    pub const fn processing_unit(&self) -> ProcessingUnitId {
        self.spec.processing_unit()
    }
}

impl PartialEq for Cpu {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.spec == other.spec
    }
}

impl Eq for Cpu {}

impl Hash for Cpu {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.spec.hash(state);
    }
}

impl PartialOrd for Cpu {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cpu {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.spec.cmp(&other.spec)
    }
}

impl Display for Cpu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[id: {}, numa: {}, socket: {}, core: {}, processing_unit: {}]",
            self.id,
            self.numa_node,
            self.socket(),
            self.core(),
            self.processing_unit()
        )
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::hash::DefaultHasher;

    use super::*;

    fn hash_of(cpu: &Cpu) -> u64 {
        let mut hasher = DefaultHasher::new();
        cpu.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn smoke_test() {
        let cpu = Cpu::new(CpuSpec::new(0, 1, 0), 3, 0);

        assert_eq!(cpu.spec(), CpuSpec::new(0, 1, 0));
        assert_eq!(cpu.id(), 3);
        assert_eq!(cpu.numa_node(), 0);
        assert_eq!(cpu.socket(), 0);
        assert_eq!(cpu.core(), 1);
        assert_eq!(cpu.processing_unit(), 0);

        // Display writes something (anything - as long as it writes something).
        assert!(!cpu.to_string().is_empty());
    }

    #[test]
    fn identity_is_the_spec() {
        // Same spec but different native id and node - still equal.
        let first = Cpu::new(CpuSpec::new(0, 0, 0), 0, 0);
        let second = Cpu::new(CpuSpec::new(0, 0, 0), 7, 1);

        assert_eq!(first, second);
        assert_eq!(hash_of(&first), hash_of(&second));

        let third = Cpu::new(CpuSpec::new(0, 0, 1), 0, 0);
        assert_ne!(first, third);
        assert!(first < third);
    }

    #[test]
    fn ordering_groups_by_socket_core_processing_unit() {
        let mut cpus = vec![
            Cpu::new(CpuSpec::new(1, 0, 0), 2, 1),
            Cpu::new(CpuSpec::new(0, 1, 0), 1, 0),
            Cpu::new(CpuSpec::new(0, 0, 1), 4, 0),
            Cpu::new(CpuSpec::new(0, 0, 0), 0, 0),
        ];

        cpus.sort_unstable();

        let specs: Vec<_> = cpus.iter().map(Cpu::spec).collect();
        assert_eq!(
            specs,
            vec![
                CpuSpec::new(0, 0, 0),
                CpuSpec::new(0, 0, 1),
                CpuSpec::new(0, 1, 0),
                CpuSpec::new(1, 0, 0),
            ]
        );
    }
}
