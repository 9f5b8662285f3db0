use scf::{ScfResult, ScfStatus};
use tracing::info;

pub fn report_summary(result: &ScfResult) {
    match result.status {
        ScfStatus::Converged => info!("\nSCF converged in {} cycles.", result.iterations),
        ScfStatus::IterationLimitExceeded => {
            info!("\nSCF stopped after {} cycles.", result.iterations)
        }
    }

    info!("\nFinal Energy Levels:");
    for (i, energy) in result.orbital_energies.iter().enumerate() {
        let marker = if i < result.num_occupied { "occ" } else { "virt" };
        info!("  Level {}: {:.8} au ({})", i + 1, energy, marker);
    }
    if let (Some(homo), Some(lumo)) = (result.homo_energy(), result.lumo_energy()) {
        info!("HOMO-LUMO gap: {:.8} au", lumo - homo);
    }

    info!("\nNuclear Repulsion Energy: {:.10} au", result.nuclear_repulsion);
    info!("Electronic Energy: {:.10} au", result.electronic_energy);
    info!("Hartree-Fock Total Energy: {:.10} au", result.total_energy);
}
