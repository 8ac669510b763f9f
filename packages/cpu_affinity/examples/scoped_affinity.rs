//! Narrows the current thread to the first core of the first socket, then
//! restores the original affinity via the affinity stack.

use cpu_affinity::{AffinityManager, AffinityStack};

fn main() {
    let manager = AffinityManager::new();

    if !manager.has_cpus() {
        println!("Unable to load the processor topology on this system.");
        return;
    }

    let first_core = manager.cpus_by_socket_and_core(0, 0);
    let mut stack = AffinityStack::new(manager);

    if stack.push_affinity().is_err() {
        println!("Unable to read the thread affinity on this system.");
        return;
    }

    match stack.set_affinity(&first_core) {
        Ok(()) => println!("Thread narrowed to {first_core}"),
        Err(error) => println!("Unable to narrow the thread affinity: {error}"),
    }

    if let Err(error) = stack.pop_affinity() {
        println!("Unable to restore the thread affinity: {error}");
        return;
    }

    match stack.affinity() {
        Ok(affinity) => println!("Affinity after restore: {affinity}"),
        Err(error) => println!("Unable to read the thread affinity: {error}"),
    }
}
