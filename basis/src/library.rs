//! Built-in basis-set data.
//!
//! Only minimal STO-3G is tabulated here (H through Ne). The exponents are
//! the universal ζ = 1 three-Gaussian fits to Slater 1s and 2sp functions,
//! scaled by ζ² of the element's Slater exponent.

use crate::basis::{ElementBasis, ShellDefinition};
use crate::error::BasisError;

/// Source of per-element shell definitions.
pub trait BasisLibrary {
    fn name(&self) -> &str;
    fn element_basis(&self, atomic_number: u32) -> Result<ElementBasis, BasisError>;
}

const STO3G_1S_EXPONENTS: [f64; 3] = [2.227660584, 0.405771156, 0.1098175104];
const STO3G_1S_COEFFICIENTS: [f64; 3] = [0.1543289673, 0.5353281423, 0.4446345422];
const STO3G_2SP_EXPONENTS: [f64; 3] = [0.994202729, 0.2310313333, 0.0751386016];
const STO3G_2S_COEFFICIENTS: [f64; 3] = [-0.09996722919, 0.3995128261, 0.7001154689];
const STO3G_2P_COEFFICIENTS: [f64; 3] = [0.1559162750, 0.6076837186, 0.3919573931];

// (symbol, ζ 1s, ζ 2sp)
const STO3G_SLATER_EXPONENTS: [(&str, f64, Option<f64>); 10] = [
    ("H", 1.24, None),
    ("He", 1.69, None),
    ("Li", 2.69, Some(0.80)),
    ("Be", 3.68, Some(1.15)),
    ("B", 4.68, Some(1.50)),
    ("C", 5.67, Some(1.72)),
    ("N", 6.67, Some(1.95)),
    ("O", 7.66, Some(2.25)),
    ("F", 8.65, Some(2.55)),
    ("Ne", 9.64, Some(2.88)),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct Sto3g;

fn scaled(exponents: &[f64; 3], zeta: f64) -> Vec<f64> {
    exponents.iter().map(|e| e * zeta * zeta).collect()
}

impl BasisLibrary for Sto3g {
    fn name(&self) -> &str {
        "sto-3g"
    }

    fn element_basis(&self, atomic_number: u32) -> Result<ElementBasis, BasisError> {
        let (symbol, zeta_1s, zeta_2sp) = (atomic_number as usize)
            .checked_sub(1)
            .and_then(|i| STO3G_SLATER_EXPONENTS.get(i))
            .copied()
            .ok_or_else(|| BasisError::UnknownElement {
                atomic_number,
                library: self.name().to_string(),
            })?;

        let mut shells = vec![ShellDefinition::new(
            0,
            scaled(&STO3G_1S_EXPONENTS, zeta_1s),
            STO3G_1S_COEFFICIENTS.to_vec(),
        )?];
        if let Some(zeta) = zeta_2sp {
            shells.push(ShellDefinition::new(
                0,
                scaled(&STO3G_2SP_EXPONENTS, zeta),
                STO3G_2S_COEFFICIENTS.to_vec(),
            )?);
            shells.push(ShellDefinition::new(
                1,
                scaled(&STO3G_2SP_EXPONENTS, zeta),
                STO3G_2P_COEFFICIENTS.to_vec(),
            )?);
        }

        Ok(ElementBasis {
            symbol: symbol.to_string(),
            atomic_number,
            shells,
        })
    }
}

/// Look up a built-in library by (case-insensitive) name.
pub fn builtin(name: &str) -> Option<Box<dyn BasisLibrary + Send + Sync>> {
    match name.to_lowercase().replace('-', "").as_str() {
        "sto3g" => Some(Box::new(Sto3g)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sto3g_hydrogen_exponents() {
        let h = Sto3g.element_basis(1).unwrap();
        assert_eq!(h.symbol, "H");
        assert_eq!(h.shells.len(), 1);
        let expected = [3.42525091, 0.62391373, 0.16885540];
        for (e, x) in h.shells[0].exponents.iter().zip(expected.iter()) {
            assert!((e - x).abs() < 1e-6, "H exponent {} vs {}", e, x);
        }
    }

    #[test]
    fn test_sto3g_second_row_layout() {
        let o = Sto3g.element_basis(8).unwrap();
        let ls: Vec<i32> = o.shells.iter().map(|s| s.l).collect();
        assert_eq!(ls, vec![0, 0, 1]);
        assert_eq!(o.num_functions(), 5);
    }

    #[test]
    fn test_unknown_element() {
        assert!(matches!(
            Sto3g.element_basis(0),
            Err(BasisError::UnknownElement { atomic_number: 0, .. })
        ));
        assert!(matches!(
            Sto3g.element_basis(11),
            Err(BasisError::UnknownElement { atomic_number: 11, .. })
        ));
    }

    #[test]
    fn test_builtin_lookup() {
        assert!(builtin("STO-3G").is_some());
        assert!(builtin("6-31g").is_none());
    }
}
