use std::fs;

use crate::pal::linux::Filesystem;

/// The virtual filesystem of the real operating system that the build is
/// targeting.
///
/// You would only use a different filesystem in PAL unit tests that need a
/// mock. Even then, whenever possible, unit tests should use the real
/// filesystem for maximum realism.
#[derive(Debug, Default)]
pub(crate) struct BuildTargetFilesystem;

// Real filesystem bindings are excluded from coverage measurement because
// they are exercised via integration tests running on actual Linux.
#[cfg_attr(coverage_nightly, coverage(off))]
impl Filesystem for BuildTargetFilesystem {
    fn get_numa_nodes_with_cpus_contents(&self) -> Option<String> {
        fs::read_to_string("/sys/devices/system/node/has_cpu").ok()
    }

    fn get_numa_node_cpulist_contents(&self, node_index: u32) -> Option<String> {
        fs::read_to_string(format!("/sys/devices/system/node/node{node_index}/cpulist")).ok()
    }

    fn get_possible_cpus_contents(&self) -> Option<String> {
        fs::read_to_string("/sys/devices/system/cpu/possible").ok()
    }

    fn get_cpu_package_id_contents(&self, cpu_index: u32) -> Option<String> {
        fs::read_to_string(format!(
            "/sys/devices/system/cpu/cpu{cpu_index}/topology/physical_package_id"
        ))
        .ok()
    }

    fn get_cpu_core_id_contents(&self, cpu_index: u32) -> Option<String> {
        fs::read_to_string(format!(
            "/sys/devices/system/cpu/cpu{cpu_index}/topology/core_id"
        ))
        .ok()
    }
}
