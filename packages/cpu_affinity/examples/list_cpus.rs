//! Prints every discovered processor and the current thread's affinity.

use cpu_affinity::AffinityManager;

fn main() {
    let manager = AffinityManager::new();

    if !manager.has_cpus() {
        println!("Unable to load the processor topology on this system.");
        return;
    }

    println!("Discovered processors:");

    for cpu in manager.cpus() {
        println!("  {cpu}");
    }

    match manager.affinity() {
        Ok(affinity) => println!("Current thread affinity: {affinity}"),
        Err(error) => println!("Unable to read the thread affinity: {error}"),
    }
}
