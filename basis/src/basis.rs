#![allow(non_snake_case)]
use crate::cgto::{ContractedGTO, ContractedGTOBuilder};
use crate::error::BasisError;
use crate::library::BasisLibrary;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Highest total angular momentum of a single basis function (g shells).
pub const MAX_ANGULAR_MOMENTUM: i32 = 4;

/// One-electron integrals shared by primitive and contracted Gaussians.
pub trait Basis {
    fn evaluate(&self, r: &Vector3<f64>) -> f64;
    fn Sab(a: &Self, b: &Self) -> f64;
    fn Tab(a: &Self, b: &Self) -> f64;
    fn Vab(a: &Self, b: &Self, R: Vector3<f64>, Z: u32) -> f64;
}

/// Cartesian powers of a shell in canonical order: x-major, then y, then z.
/// For l = 2 this is xx, xy, xz, yy, yz, zz.
pub fn cartesian_components(l: i32) -> Vec<Vector3<i32>> {
    let mut components = Vec::with_capacity(((l + 1) * (l + 2) / 2).max(0) as usize);
    for lx in (0..=l).rev() {
        for ly in (0..=(l - lx)).rev() {
            components.push(Vector3::new(lx, ly, l - lx - ly));
        }
    }
    components
}

/// Shell as tabulated in a basis-set library: one angular momentum and one
/// contraction shared by every Cartesian component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellDefinition {
    pub l: i32,
    pub exponents: Vec<f64>,
    pub coefficients: Vec<f64>,
}

impl ShellDefinition {
    pub fn new(l: i32, exponents: Vec<f64>, coefficients: Vec<f64>) -> Result<Self, BasisError> {
        if l < 0 {
            return Err(BasisError::MalformedBasis(format!(
                "negative angular momentum {}",
                l
            )));
        }
        if l > MAX_ANGULAR_MOMENTUM {
            return Err(BasisError::AngularMomentumTooHigh {
                l,
                max: MAX_ANGULAR_MOMENTUM,
            });
        }
        if exponents.is_empty() {
            return Err(BasisError::MalformedBasis(
                "shell has no primitives".to_string(),
            ));
        }
        if exponents.len() != coefficients.len() {
            return Err(BasisError::MalformedBasis(format!(
                "shell with l = {} has {} exponents but {} coefficients",
                l,
                exponents.len(),
                coefficients.len()
            )));
        }
        if let Some(bad) = exponents.iter().find(|e| !(e.is_finite() && **e > 0.0)) {
            return Err(BasisError::MalformedBasis(format!(
                "exponent must be positive and finite, got {}",
                bad
            )));
        }
        Ok(Self {
            l,
            exponents,
            coefficients,
        })
    }

    pub fn num_functions(&self) -> usize {
        ((self.l + 1) * (self.l + 2) / 2) as usize
    }
}

/// All shells a library defines for one element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementBasis {
    pub symbol: String,
    pub atomic_number: u32,
    pub shells: Vec<ShellDefinition>,
}

impl ElementBasis {
    pub fn num_functions(&self) -> usize {
        self.shells.iter().map(|s| s.num_functions()).sum()
    }
}

/// Contiguous block of basis functions sharing centre and total angular
/// momentum. `first` and `last` are inclusive indices into the flat list.
#[derive(Debug, Clone, PartialEq)]
pub struct Shell {
    pub atom_index: usize,
    pub l: i32,
    pub center: Vector3<f64>,
    pub first: usize,
    pub last: usize,
}

impl Shell {
    pub fn len(&self) -> usize {
        self.last - self.first + 1
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.first..=self.last).contains(&index)
    }
}

/// Flat, insertion-ordered list of normalised basis functions for a molecule.
#[derive(Debug, Clone)]
pub struct BasisSet {
    pub name: String,
    functions: Vec<ContractedGTO>,
    shells: Vec<Shell>,
    function_atoms: Vec<usize>,
}

impl BasisSet {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            functions: Vec::new(),
            shells: Vec::new(),
            function_atoms: Vec::new(),
        }
    }

    /// Expand `definition` into its Cartesian components at `center` and
    /// append them.
    pub fn add_shell(
        &mut self,
        atom_index: usize,
        center: Vector3<f64>,
        definition: &ShellDefinition,
    ) -> Result<&Shell, BasisError> {
        let first = self.functions.len();
        let mut functions = Vec::with_capacity(definition.num_functions());
        for l_xyz in cartesian_components(definition.l) {
            let function = ContractedGTOBuilder::new(center, l_xyz)?
                .with_primitives(&definition.exponents, &definition.coefficients)?
                .normalize()?;
            functions.push(function);
        }

        self.function_atoms
            .extend(std::iter::repeat(atom_index).take(functions.len()));
        self.functions.extend(functions);
        self.shells.push(Shell {
            atom_index,
            l: definition.l,
            center,
            first,
            last: self.functions.len() - 1,
        });
        Ok(&self.shells[self.shells.len() - 1])
    }

    /// Build the basis for atoms given as (atomic number, centre in bohr),
    /// shells appended in atom order.
    pub fn build<L: BasisLibrary + ?Sized>(
        library: &L,
        atoms: &[(u32, Vector3<f64>)],
    ) -> Result<Self, BasisError> {
        let mut basis = BasisSet::new(library.name());
        for (atom_index, (atomic_number, center)) in atoms.iter().enumerate() {
            let element = library.element_basis(*atomic_number)?;
            for shell in &element.shells {
                basis.add_shell(atom_index, *center, shell)?;
            }
            debug!(
                "{} basis for atom {} ({}): {} functions",
                library.name(),
                atom_index,
                element.symbol,
                element.num_functions()
            );
        }
        debug!(
            "Basis set {} built: {} shells, {} functions",
            basis.name,
            basis.shells.len(),
            basis.functions.len()
        );
        Ok(basis)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn functions(&self) -> &[ContractedGTO] {
        &self.functions
    }

    pub fn shells(&self) -> &[Shell] {
        &self.shells
    }

    /// Index of the atom the i-th basis function sits on.
    pub fn atom_of(&self, index: usize) -> usize {
        self.function_atoms[index]
    }

    pub fn max_angular_momentum(&self) -> i32 {
        self.shells.iter().map(|s| s.l).max().unwrap_or(0)
    }
}
