/// Identifies a socket (physical processor package) by its zero-based index.
///
/// Socket indices are assigned by topology discovery and are always dense and
/// zero-based, regardless of how the operating system numbers packages.
/// The value -1 marks an invalid or unknown socket.
pub type SocketId = i32;

/// Identifies a core by its zero-based index within a socket.
///
/// Core indices are assigned by topology discovery in first-seen order and are
/// dense per socket. Identical indices on different sockets refer to different
/// physical cores. The value -1 marks an invalid or unknown core.
pub type CoreId = i32;

/// Identifies a processing unit (hardware thread) by its zero-based index
/// within a core.
///
/// On a system with SMT, the first hardware thread of every core has
/// processing unit index 0, the second has index 1, and so on. The value -1
/// marks an invalid or unknown processing unit.
pub type ProcessingUnitId = i32;

/// Identifies a NUMA node, matching the numeric identifier used by operating
/// system tooling.
///
/// The value -1 means the node is unknown, either because the platform does
/// not expose NUMA information or because discovery fell back to a flat view
/// of the system.
pub type NumaNodeId = i32;

/// The operating-system-native identifier of a logical processor, as used in
/// real affinity system calls.
///
/// These values are not guaranteed to be sequential, contiguous or zero-based;
/// they carry no topology meaning. Use [`CpuSpec`][crate::CpuSpec] for
/// topology-aware addressing.
pub type ProcessorId = u32;

/// A raw bit position reported by the native affinity read primitive.
///
/// This need not equal [`ProcessorId`]: some discovery backends number
/// processors differently from the bit ordering the operating system uses in
/// affinity masks. [`NativeCpuMapper`][crate::NativeCpuMapper] builds the
/// bridge between the two empirically.
pub type RawProcessorId = u32;
