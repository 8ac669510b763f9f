#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Discover the physical processor topology of the machine - sockets, cores,
//! hardware threads, NUMA nodes - and control which processors the current
//! thread is allowed to run on.
//!
//! Operating systems hand out processor numbers that carry no structure: on
//! one machine processors 0 and 1 are two hardware threads of the same core,
//! on another they sit on different sockets. This crate reads the real
//! hardware layout once, at startup, and re-indexes it into dense, zero-based
//! socket/core/processing-unit coordinates that mean the same thing
//! everywhere, regardless of how the underlying OS numbers things.
//!
//! # Quick start
//!
//! Enumerate the topology and pin the current thread to one processor:
//!
//! ```no_run
//! use cpu_affinity::AffinityManager;
//!
//! let manager = AffinityManager::new();
//!
//! for cpu in manager.cpus() {
//!     println!("{cpu}");
//! }
//!
//! // Pin to the first hardware thread of the first core of the first socket.
//! if let Some(cpu) = manager.cpu_from_spec(cpu_affinity::CpuSpec::new(0, 0, 0)) {
//!     manager.pin(cpu).unwrap();
//! }
//! ```
//!
//! # Spreading work across cores
//!
//! [`RoundRobinAllocator`] dispenses processors so that consecutive
//! allocations land on distinct physical cores before any SMT siblings are
//! reused:
//!
//! ```no_run
//! use cpu_affinity::{AffinityManager, RoundRobinAllocator};
//!
//! let manager = AffinityManager::new();
//! let mut allocator = RoundRobinAllocator::new(manager.cpus());
//!
//! for _ in 0..4 {
//!     let cpu = allocator.allocate().unwrap();
//!     println!("next worker goes to {cpu}");
//! }
//! ```
//!
//! # Scoped affinity changes
//!
//! [`AffinityStack`] saves and restores the thread's affinity in LIFO order,
//! so a temporarily narrowed affinity can always be undone:
//!
//! ```no_run
//! use cpu_affinity::{AffinityManager, AffinityStack};
//!
//! let manager = AffinityManager::new();
//! let first_core = manager.cpus_by_socket_and_core(0, 0);
//!
//! let mut stack = AffinityStack::new(manager);
//! stack.push_affinity().unwrap();
//! stack.set_affinity(&first_core).unwrap();
//! // ... work that benefits from staying on one core ...
//! stack.pop_affinity().unwrap();
//! ```
//!
//! # What this crate does not do
//!
//! Topology is captured once per process: processor hot-plug and other
//! runtime topology changes are unsupported, and there is no re-scan API.
//! Affinity is the only scheduling control offered - priorities, scheduling
//! policies and NUMA memory binding are out of scope. No operation retries:
//! every OS call either succeeds or fails atomically and the result is
//! returned verbatim.
//!
//! # Operating system compatibility
//!
//! Linux is supported natively, with topology read from the `/sys` virtual
//! filesystem and affinity applied via scheduler system calls. On other
//! operating systems a fallback implementation keeps the API functional:
//! topology is synthesized from `std::thread::available_parallelism()` and
//! affinity changes are tracked per thread but not applied to the OS
//! scheduler.

mod affinity_manager;
mod affinity_stack;
mod cpu;
mod cpu_set;
mod cpu_spec;
mod error;
mod native_cpu_mapper;
mod primitive_types;
mod round_robin_allocator;

pub use affinity_manager::*;
pub use affinity_stack::*;
pub use cpu::*;
pub use cpu_set::*;
pub use cpu_spec::*;
pub use error::*;
pub use native_cpu_mapper::*;
pub use primitive_types::*;
pub use round_robin_allocator::*;

mod pal;
