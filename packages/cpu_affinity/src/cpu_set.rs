use std::collections::BTreeSet;
use std::collections::btree_set;
use std::fmt::{self, Display};

use itertools::Itertools;

use crate::Cpu;

/// An ordered set of processors, unique by [`CpuSpec`][crate::CpuSpec].
///
/// Members are kept in spec order (socket, then core, then processing unit),
/// and inserting a processor whose spec is already present has no effect.
/// Unlike the topology itself, a `CpuSet` may be empty - an empty set is how
/// lookups express "nothing matched".
///
/// # Example
///
/// ```
/// use cpu_affinity::{AffinityManager, CpuSet};
///
/// let manager = AffinityManager::new();
/// let all: &CpuSet = manager.cpus();
///
/// for cpu in all {
///     println!("{cpu}");
/// }
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CpuSet {
    cpus: BTreeSet<Cpu>,
}

impl CpuSet {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cpus: BTreeSet::new(),
        }
    }

    /// Inserts a processor into the set.
    ///
    /// Returns whether the processor was newly inserted; a processor with the
    /// same spec already in the set keeps its place and `false` is returned.
    pub fn insert(&mut self, cpu: Cpu) -> bool {
        self.cpus.insert(cpu)
    }

    /// Removes a processor from the set, returning whether it was present.
    pub fn remove(&mut self, cpu: &Cpu) -> bool {
        self.cpus.remove(cpu)
    }

    /// Whether a processor with the same spec is in the set.
    #[must_use]
    pub fn contains(&self, cpu: &Cpu) -> bool {
        self.cpus.contains(cpu)
    }

    /// The number of processors in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cpus.len()
    }

    /// Whether the set contains no processors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cpus.is_empty()
    }

    /// Removes all processors from the set.
    pub fn clear(&mut self) {
        self.cpus.clear();
    }

    /// The first processor in spec order, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Cpu> {
        self.cpus.first()
    }

    /// Iterates over the processors in spec order.
    pub fn iter(&self) -> btree_set::Iter<'_, Cpu> {
        self.cpus.iter()
    }
}

impl FromIterator<Cpu> for CpuSet {
    fn from_iter<I: IntoIterator<Item = Cpu>>(iter: I) -> Self {
        Self {
            cpus: iter.into_iter().collect(),
        }
    }
}

impl Extend<Cpu> for CpuSet {
    fn extend<I: IntoIterator<Item = Cpu>>(&mut self, iter: I) {
        self.cpus.extend(iter);
    }
}

impl IntoIterator for CpuSet {
    type Item = Cpu;
    type IntoIter = btree_set::IntoIter<Cpu>;

    fn into_iter(self) -> Self::IntoIter {
        self.cpus.into_iter()
    }
}

impl<'a> IntoIterator for &'a CpuSet {
    type Item = &'a Cpu;
    type IntoIter = btree_set::Iter<'a, Cpu>;

    fn into_iter(self) -> Self::IntoIter {
        self.cpus.iter()
    }
}

impl Display for CpuSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.cpus.iter().join(", "))
    }
}
