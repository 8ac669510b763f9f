use std::fmt::Debug;

/// Linux exposes processor topology as a virtual filesystem. This trait
/// abstracts the files we read from it, to allow them to be mocked.
///
/// All reads are synchronous and blocking because the data never lives on a
/// real storage device - we expect to hit a fast path in the OS. Every
/// accessor returns `None` when the file is absent or unreadable; the caller
/// decides whether that means "skip" or "fall back".
#[cfg_attr(test, mockall::automock)]
pub(crate) trait Filesystem: Debug + Send + Sync + 'static {
    /// Contents of `/sys/devices/system/node/has_cpu`: the NUMA nodes with at
    /// least one processor attached, in cpulist format.
    fn get_numa_nodes_with_cpus_contents(&self) -> Option<String>;

    /// Contents of `/sys/devices/system/node/node{}/cpulist`: the processors
    /// attached to one NUMA node, in cpulist format.
    fn get_numa_node_cpulist_contents(&self, node_index: u32) -> Option<String>;

    /// Contents of `/sys/devices/system/cpu/possible`: every logical
    /// processor id the system could ever use, in cpulist format. Used when
    /// no NUMA information is exposed.
    fn get_possible_cpus_contents(&self) -> Option<String>;

    /// Contents of `/sys/devices/system/cpu/cpu{}/topology/physical_package_id`:
    /// the OS identifier of the socket holding this processor. A single
    /// integer (+ newline); may be absent or negative on exotic hardware.
    fn get_cpu_package_id_contents(&self, cpu_index: u32) -> Option<String>;

    /// Contents of `/sys/devices/system/cpu/cpu{}/topology/core_id`: the OS
    /// identifier of the core holding this processor. A single integer
    /// (+ newline); not guaranteed dense or zero-based.
    fn get_cpu_core_id_contents(&self, cpu_index: u32) -> Option<String>;
}
