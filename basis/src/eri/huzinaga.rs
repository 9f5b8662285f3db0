#![allow(non_snake_case)]
//! Electron repulsion from Huzinaga's closed-form B-array expansion.
//!
//! Each Cartesian axis contributes a B array indexed by Boys order; the
//! integral is Σ Bx[I] By[J] Bz[K] F_{I+J+K}(|P-Q|² / 4δ) times the
//! four-centre Gaussian prefactor.

use super::{contract_quartet, TwoElectronStrategy};
use crate::cgto::ContractedGTO;
use crate::gto::GTO;
use crate::helper::{binomial_prefactor, boys_table, factorial_ratio_squared};
use itertools::iproduct;
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, Default)]
pub struct Huzinaga;

fn sign(n: i32) -> f64 {
    if n % 2 == 0 {
        1.0
    } else {
        -1.0
    }
}

fn b_factor(i: i32, l1: i32, l2: i32, P: f64, A: f64, B: f64, r: i32, gamma: f64) -> f64 {
    binomial_prefactor(i, l1, l2, P - A, P - B)
        * factorial_ratio_squared(i, r)
        * (4.0 * gamma).powi(r - i)
}

// One Cartesian axis. `ls` are the powers of a, b, c, d along this axis,
// `coords` the coordinates of P, A, B, Q, C, D.
fn b_array(ls: [i32; 4], coords: [f64; 6], gamma1: f64, gamma2: f64, delta: f64) -> Vec<f64> {
    let [l1, l2, l3, l4] = ls;
    let [P, A, B, Q, C, D] = coords;
    let mut arr = vec![0.0; (l1 + l2 + l3 + l4 + 1) as usize];

    for i1 in 0..=(l1 + l2) {
        for i2 in 0..=(l3 + l4) {
            for r1 in 0..=(i1 / 2) {
                let f1 = b_factor(i1, l1, l2, P, A, B, r1, gamma1);
                for r2 in 0..=(i2 / 2) {
                    let f2 = sign(i2) * b_factor(i2, l3, l4, Q, C, D, r2, gamma2);
                    let reduced = i1 + i2 - 2 * (r1 + r2);
                    for u in 0..=(reduced / 2) {
                        let I = (reduced - u) as usize;
                        arr[I] += f1
                            * f2
                            * sign(u)
                            * factorial_ratio_squared(reduced, u)
                            * (Q - P).powi(reduced - 2 * u)
                            / delta.powi(reduced - u);
                    }
                }
            }
        }
    }
    arr
}

impl Huzinaga {
    /// (ab|cd) over unnormalised primitives.
    pub fn primitive(a: &GTO, b: &GTO, c: &GTO, d: &GTO) -> f64 {
        let (gamma1, P) = GTO::product_center(a.alpha, &a.center, b.alpha, &b.center);
        let (gamma2, Q) = GTO::product_center(c.alpha, &c.center, d.alpha, &d.center);
        let rab2 = (a.center - b.center).norm_squared();
        let rcd2 = (c.center - d.center).norm_squared();
        let rpq2 = (P - Q).norm_squared();
        let delta = 0.25 * (1.0 / gamma1 + 1.0 / gamma2);

        let axis = |k: usize| {
            b_array(
                [a.l_xyz[k], b.l_xyz[k], c.l_xyz[k], d.l_xyz[k]],
                [P[k], a.center[k], b.center[k], Q[k], c.center[k], d.center[k]],
                gamma1,
                gamma2,
                delta,
            )
        };
        let (Bx, By, Bz) = (axis(0), axis(1), axis(2));
        let boys = boys_table(Bx.len() + By.len() + Bz.len() - 3, 0.25 * rpq2 / delta);

        let sum: f64 = iproduct!(0..Bx.len(), 0..By.len(), 0..Bz.len())
            .map(|(I, J, K)| Bx[I] * By[J] * Bz[K] * boys[I + J + K])
            .sum();

        2.0 * PI.powf(2.5) / (gamma1 * gamma2 * (gamma1 + gamma2).sqrt())
            * (-a.alpha * b.alpha * rab2 / gamma1).exp()
            * (-c.alpha * d.alpha * rcd2 / gamma2).exp()
            * sum
    }
}

impl TwoElectronStrategy for Huzinaga {
    fn name(&self) -> &'static str {
        "huzinaga"
    }

    fn coulomb(
        &self,
        a: &ContractedGTO,
        b: &ContractedGTO,
        c: &ContractedGTO,
        d: &ContractedGTO,
    ) -> f64 {
        contract_quartet(a, b, c, d, Huzinaga::primitive)
    }
}
