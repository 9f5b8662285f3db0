//! Two-electron repulsion integrals (ab|cd) over contracted Gaussians.
//!
//! Two interchangeable strategies are provided, Huzinaga's B-array expansion
//! and the Head-Gordon–Pople HRR/VRR recursion. They evaluate the same
//! integral and are selected by value (`EriMethod`) or used directly.

pub mod hgp;
pub mod huzinaga;

pub use hgp::HeadGordonPople;
pub use huzinaga::Huzinaga;

use crate::cgto::ContractedGTO;
use crate::gto::GTO;
use itertools::iproduct;
use serde::{Deserialize, Serialize};

/// A way of computing chemists'-notation Coulomb integrals (ab|cd).
pub trait TwoElectronStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn coulomb(
        &self,
        a: &ContractedGTO,
        b: &ContractedGTO,
        c: &ContractedGTO,
        d: &ContractedGTO,
    ) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EriMethod {
    Huzinaga,
    #[default]
    #[serde(alias = "hgp")]
    HeadGordonPople,
}

impl TwoElectronStrategy for EriMethod {
    fn name(&self) -> &'static str {
        match self {
            EriMethod::Huzinaga => Huzinaga.name(),
            EriMethod::HeadGordonPople => HeadGordonPople.name(),
        }
    }

    fn coulomb(
        &self,
        a: &ContractedGTO,
        b: &ContractedGTO,
        c: &ContractedGTO,
        d: &ContractedGTO,
    ) -> f64 {
        match self {
            EriMethod::Huzinaga => Huzinaga.coulomb(a, b, c, d),
            EriMethod::HeadGordonPople => HeadGordonPople.coulomb(a, b, c, d),
        }
    }
}

/// Sum a primitive integral over all primitive quartets with their weights.
pub(crate) fn contract_quartet<F>(
    a: &ContractedGTO,
    b: &ContractedGTO,
    c: &ContractedGTO,
    d: &ContractedGTO,
    primitive: F,
) -> f64
where
    F: Fn(&GTO, &GTO, &GTO, &GTO) -> f64,
{
    iproduct!(
        a.weighted_primitives(),
        b.weighted_primitives(),
        c.weighted_primitives(),
        d.weighted_primitives()
    )
    .map(|((pa, wa), (pb, wb), (pc, wc), (pd, wd))| wa * wb * wc * wd * primitive(pa, pb, pc, pd))
    .sum()
}

/// Triangular index of the unordered pair {i, j}.
pub fn pair_index(i: usize, j: usize) -> usize {
    let (hi, lo) = if i >= j { (i, j) } else { (j, i) };
    hi * (hi + 1) / 2 + lo
}

/// Canonical packed position of (ij|kl): swap to the larger index within each
/// pair, then pack the two pair indices triangularly. All eight permutations
/// of a quartet map to the same slot.
pub fn eri_index(i: usize, j: usize, k: usize, l: usize) -> usize {
    pair_index(pair_index(i, j), pair_index(k, l))
}

/// Number of unique integrals for `n` basis functions.
pub fn num_unique_integrals(n: usize) -> usize {
    let pairs = n * (n + 1) / 2;
    pairs * (pairs + 1) / 2
}
