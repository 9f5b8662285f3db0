//! Nuclear framework: elements, positions (bohr) and total charge.

use crate::error::ScfError;
use basis::basis::BasisSet;
use basis::library::BasisLibrary;
use nalgebra::Vector3;
use periodic_table_on_an_enum::Element;
use serde::Deserialize;
use tracing::debug;

/// 1 bohr in ångström.
pub const BOHR_TO_ANGSTROM: f64 = 0.529177249;

/// Nuclei closer than this (bohr) are treated as coincident.
const MIN_NUCLEAR_DISTANCE: f64 = 1e-8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Units {
    #[default]
    Angstrom,
    Bohr,
}

impl Units {
    /// Factor that converts a coordinate in these units to bohr.
    pub fn to_bohr(&self) -> f64 {
        match self {
            Units::Angstrom => 1.0 / BOHR_TO_ANGSTROM,
            Units::Bohr => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Atom {
    pub element: Element,
    /// Position in bohr.
    pub position: Vector3<f64>,
}

impl Atom {
    pub fn new(element: Element, position: Vector3<f64>) -> Self {
        Self { element, position }
    }

    pub fn atomic_number(&self) -> u32 {
        self.element.get_atomic_number() as u32
    }
}

#[derive(Debug, Clone)]
pub struct Molecule {
    pub atoms: Vec<Atom>,
    pub charge: i32,
}

impl Molecule {
    pub fn new(atoms: Vec<Atom>, charge: i32) -> Result<Self, ScfError> {
        if atoms.is_empty() {
            return Err(ScfError::InvalidInput("molecule has no atoms".to_string()));
        }
        if let Some(atom) = atoms
            .iter()
            .find(|a| a.position.iter().any(|c| !c.is_finite()))
        {
            return Err(ScfError::DegenerateGeometry(format!(
                "{} has non-finite coordinates {:?}",
                atom.element.get_symbol(),
                atom.position
            )));
        }
        Ok(Self { atoms, charge })
    }

    /// Coordinates already in bohr.
    pub fn from_bohr(atoms: &[(Element, Vector3<f64>)], charge: i32) -> Result<Self, ScfError> {
        Molecule::from_units(atoms, charge, Units::Bohr)
    }

    pub fn from_angstrom(
        atoms: &[(Element, Vector3<f64>)],
        charge: i32,
    ) -> Result<Self, ScfError> {
        Molecule::from_units(atoms, charge, Units::Angstrom)
    }

    pub fn from_units(
        atoms: &[(Element, Vector3<f64>)],
        charge: i32,
        units: Units,
    ) -> Result<Self, ScfError> {
        let scale = units.to_bohr();
        let atoms = atoms
            .iter()
            .map(|(element, position)| Atom::new(*element, position * scale))
            .collect();
        Molecule::new(atoms, charge)
    }

    pub fn num_atoms(&self) -> usize {
        self.atoms.len()
    }

    /// Σ Z − charge.
    pub fn electron_count(&self) -> Result<usize, ScfError> {
        let nuclear: i64 = self.atoms.iter().map(|a| a.atomic_number() as i64).sum();
        let electrons = nuclear - self.charge as i64;
        if electrons < 0 {
            return Err(ScfError::InvalidInput(format!(
                "charge {} leaves a negative electron count",
                self.charge
            )));
        }
        Ok(electrons as usize)
    }

    /// Σ_{i<j} Z_i Z_j / r_ij in hartree.
    pub fn nuclear_repulsion(&self) -> Result<f64, ScfError> {
        let mut energy = 0.0;
        for (i, a) in self.atoms.iter().enumerate() {
            for (j, b) in self.atoms.iter().enumerate().skip(i + 1) {
                let r = (a.position - b.position).norm();
                if r < MIN_NUCLEAR_DISTANCE {
                    return Err(ScfError::DegenerateGeometry(format!(
                        "atoms {} ({}) and {} ({}) coincide (r = {:e} bohr)",
                        i,
                        a.element.get_symbol(),
                        j,
                        b.element.get_symbol(),
                        r
                    )));
                }
                energy += (a.atomic_number() * b.atomic_number()) as f64 / r;
            }
        }
        Ok(energy)
    }

    /// (atomic number, centre) pairs in atom order, as consumed by the basis
    /// builder and the nuclear-attraction integrals.
    pub fn nuclei(&self) -> Vec<(u32, Vector3<f64>)> {
        self.atoms
            .iter()
            .map(|a| (a.atomic_number(), a.position))
            .collect()
    }

    pub fn build_basis<L: BasisLibrary + ?Sized>(&self, library: &L) -> Result<BasisSet, ScfError> {
        let basis = BasisSet::build(library, &self.nuclei())?;
        debug!(
            "{} atoms, {} electrons, {} basis functions",
            self.num_atoms(),
            self.electron_count()?,
            basis.len()
        );
        Ok(basis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use basis::library::Sto3g;

    fn h2() -> Molecule {
        Molecule::from_angstrom(
            &[
                (Element::Hydrogen, Vector3::new(0.0, 0.0, 0.0)),
                (Element::Hydrogen, Vector3::new(0.0, 0.0, 0.74)),
            ],
            0,
        )
        .unwrap()
    }

    #[test]
    fn test_h2_nuclear_repulsion() {
        let e = h2().nuclear_repulsion().unwrap();
        assert!(
            (e - 0.7151043908648649).abs() < 1e-8,
            "nuclear repulsion {}",
            e
        );
    }

    #[test]
    fn test_electron_count_with_charge() {
        let water = Molecule::from_bohr(
            &[
                (Element::Oxygen, Vector3::new(0.0, 0.0, 0.0)),
                (Element::Hydrogen, Vector3::new(0.0, 1.43, 1.1)),
                (Element::Hydrogen, Vector3::new(0.0, -1.43, 1.1)),
            ],
            0,
        )
        .unwrap();
        assert_eq!(water.electron_count().unwrap(), 10);

        let mut cation = water.clone();
        cation.charge = 1;
        assert_eq!(cation.electron_count().unwrap(), 9);

        let mut stripped = water;
        stripped.charge = 11;
        assert!(matches!(
            stripped.electron_count(),
            Err(ScfError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_coincident_nuclei_rejected() {
        let mol = Molecule::from_bohr(
            &[
                (Element::Hydrogen, Vector3::new(0.0, 0.0, 0.0)),
                (Element::Helium, Vector3::new(0.0, 0.0, 0.0)),
            ],
            0,
        )
        .unwrap();
        assert!(matches!(
            mol.nuclear_repulsion(),
            Err(ScfError::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn test_invalid_molecules() {
        assert!(matches!(
            Molecule::new(Vec::new(), 0),
            Err(ScfError::InvalidInput(_))
        ));
        assert!(matches!(
            Molecule::from_bohr(&[(Element::Hydrogen, Vector3::new(f64::NAN, 0.0, 0.0))], 0),
            Err(ScfError::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn test_build_basis_in_bohr() {
        let mol = h2();
        let basis = mol.build_basis(&Sto3g).unwrap();
        assert_eq!(basis.len(), 2);
        let bond = basis.functions()[1].center().z;
        assert!((bond - 0.74 / BOHR_TO_ANGSTROM).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_element_is_basis_error() {
        let mol = Molecule::from_bohr(&[(Element::Iron, Vector3::zeros())], 0).unwrap();
        assert!(matches!(mol.build_basis(&Sto3g), Err(ScfError::Basis(_))));
    }
}
