use crate::config::Config;
use color_eyre::eyre::{eyre, Result};
use nalgebra::Vector3;
use periodic_table_on_an_enum::Element;
use scf::Molecule;
use tracing::info;

/// Build the molecule defined in the YAML configuration, converted to bohr.
pub fn build_molecule(config: &Config, charge: i32) -> Result<Molecule> {
    info!("\nPreparing geometry...");

    let atoms = config
        .geometry
        .iter()
        .map(|atom| {
            let element = Element::from_symbol(&atom.element)
                .ok_or_else(|| eyre!("Invalid element symbol: {}", atom.element))?;
            Ok((element, Vector3::from(atom.coords)))
        })
        .collect::<Result<Vec<_>>>()?;

    let molecule = Molecule::from_units(&atoms, charge, config.units.unwrap_or_default())?;
    info!(
        "{} atoms, charge {}, {} electrons",
        molecule.num_atoms(),
        molecule.charge,
        molecule.electron_count()?
    );
    Ok(molecule)
}
