#![allow(non_snake_case)]
extern crate nalgebra as na;

use crate::basis::Basis;
use crate::helper::{binomial_prefactor, boys_table, double_factorial, factorial};
use itertools::iproduct;
use na::Vector3;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Primitive Cartesian Gaussian N (x-Ax)^l (y-Ay)^m (z-Az)^n exp(-alpha |r-A|^2).
///
/// `norm` is the closed-form constant that gives the primitive unit
/// self-overlap. The `raw_*` integrals below work on unnormalised
/// primitives; the `Basis` implementation folds the norms in.
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq)]
pub struct GTO {
    pub alpha: f64,
    pub l_xyz: Vector3<i32>,
    pub center: Vector3<f64>,
    pub norm: f64,
}

// l_xyz shifted by `delta` along one axis, None if a power would go negative
fn shifted(l_xyz: &Vector3<i32>, axis: usize, delta: i32) -> Option<Vector3<i32>> {
    let mut l = *l_xyz;
    l[axis] += delta;
    if l[axis] < 0 {
        None
    } else {
        Some(l)
    }
}

impl GTO {
    pub fn new(alpha: f64, l_xyz: Vector3<i32>, center: Vector3<f64>) -> Self {
        let norm = GTO::compute_norm(alpha, &l_xyz);
        Self {
            alpha,
            l_xyz,
            center,
            norm,
        }
    }

    // N = (2/pi)^(3/4) 2^L alpha^((2L+3)/4) / sqrt((2l-1)!! (2m-1)!! (2n-1)!!)
    pub fn compute_norm(alpha: f64, l_xyz: &Vector3<i32>) -> f64 {
        let L = l_xyz.x + l_xyz.y + l_xyz.z;
        let numerator =
            (2.0 / PI).powf(0.75) * 2.0_f64.powi(L) * alpha.powf((2 * L + 3) as f64 / 4.0);
        let denominator = (double_factorial(2 * l_xyz.x - 1)
            * double_factorial(2 * l_xyz.y - 1)
            * double_factorial(2 * l_xyz.z - 1))
        .sqrt();
        numerator / denominator
    }

    pub fn angular_momentum(&self) -> i32 {
        self.l_xyz.x + self.l_xyz.y + self.l_xyz.z
    }

    /// Exponent and centre of the Gaussian product of `a` and `b`.
    pub fn product_center(
        alpha1: f64,
        A: &Vector3<f64>,
        alpha2: f64,
        B: &Vector3<f64>,
    ) -> (f64, Vector3<f64>) {
        let gamma = alpha1 + alpha2;
        (gamma, (A * alpha1 + B * alpha2) / gamma)
    }

    /// One-dimensional overlap factor Σ_i f_{2i}(l1, l2, PA, PB) (2i-1)!! / (2γ)^i.
    pub fn overlap_1d(l1: i32, l2: i32, PA: f64, PB: f64, gamma: f64) -> f64 {
        (0..=(l1 + l2) / 2)
            .map(|i| {
                binomial_prefactor(2 * i, l1, l2, PA, PB) * double_factorial(2 * i - 1)
                    / (2.0 * gamma).powi(i)
            })
            .sum()
    }

    pub fn raw_overlap(
        alpha1: f64,
        l1: &Vector3<i32>,
        A: &Vector3<f64>,
        alpha2: f64,
        l2: &Vector3<i32>,
        B: &Vector3<f64>,
    ) -> f64 {
        let (gamma, P) = GTO::product_center(alpha1, A, alpha2, B);
        let rab2 = (A - B).norm_squared();
        let PA = P - A;
        let PB = P - B;

        let prefactor = (PI / gamma).powf(1.5) * (-alpha1 * alpha2 * rab2 / gamma).exp();
        prefactor
            * GTO::overlap_1d(l1.x, l2.x, PA.x, PB.x, gamma)
            * GTO::overlap_1d(l1.y, l2.y, PA.y, PB.y, gamma)
            * GTO::overlap_1d(l1.z, l2.z, PA.z, PB.z, gamma)
    }

    /// Kinetic energy <a| -1/2 ∇² |b> written through overlaps of `b` with its
    /// powers shifted by ±2 along each axis.
    pub fn raw_kinetic(
        alpha1: f64,
        l1: &Vector3<i32>,
        A: &Vector3<f64>,
        alpha2: f64,
        l2: &Vector3<i32>,
        B: &Vector3<f64>,
    ) -> f64 {
        let overlap = |l: &Vector3<i32>| GTO::raw_overlap(alpha1, l1, A, alpha2, l, B);
        let L2 = l2.x + l2.y + l2.z;

        let term0 = alpha2 * (2 * L2 + 3) as f64 * overlap(l2);

        let mut term1 = 0.0;
        let mut term2 = 0.0;
        for axis in 0..3 {
            if let Some(up) = shifted(l2, axis, 2) {
                term1 += overlap(&up);
            }
            if let Some(down) = shifted(l2, axis, -2) {
                let l = l2[axis] as f64;
                term2 += l * (l - 1.0) * overlap(&down);
            }
        }

        term0 - 2.0 * alpha2 * alpha2 * term1 - 0.5 * term2
    }

    /// Hermite-like expansion coefficients of one Cartesian axis of the
    /// nuclear-attraction integral, indexed by the Boys order they multiply.
    pub(crate) fn nuclear_a_array(l1: i32, l2: i32, PA: f64, PB: f64, CP: f64, gamma: f64) -> Vec<f64> {
        let mut A = vec![0.0; (l1 + l2 + 1) as usize];
        let eps = 0.25 / gamma;
        for i in 0..=(l1 + l2) {
            let fi = binomial_prefactor(i, l1, l2, PA, PB) * factorial(i);
            let sign_i = if i % 2 == 0 { 1.0 } else { -1.0 };
            for r in 0..=(i / 2) {
                for u in 0..=((i - 2 * r) / 2) {
                    let I = (i - 2 * r - u) as usize;
                    let sign_u = if u % 2 == 0 { 1.0 } else { -1.0 };
                    let power = i - 2 * r - 2 * u;
                    A[I] += sign_i * sign_u * fi * CP.powi(power) * eps.powi(r + u)
                        / (factorial(r) * factorial(u) * factorial(power));
                }
            }
        }
        A
    }

    /// Attraction of the product a·b to a unit positive charge at `C`.
    /// The result is negative; multiply by the nuclear charge.
    pub fn raw_nuclear(
        alpha1: f64,
        l1: &Vector3<i32>,
        A: &Vector3<f64>,
        alpha2: f64,
        l2: &Vector3<i32>,
        B: &Vector3<f64>,
        C: &Vector3<f64>,
    ) -> f64 {
        let (gamma, P) = GTO::product_center(alpha1, A, alpha2, B);
        let rab2 = (A - B).norm_squared();
        let rcp2 = (C - P).norm_squared();
        let PA = P - A;
        let PB = P - B;
        let CP = P - C;

        let Ax = GTO::nuclear_a_array(l1.x, l2.x, PA.x, PB.x, CP.x, gamma);
        let Ay = GTO::nuclear_a_array(l1.y, l2.y, PA.y, PB.y, CP.y, gamma);
        let Az = GTO::nuclear_a_array(l1.z, l2.z, PA.z, PB.z, CP.z, gamma);
        let boys = boys_table(Ax.len() + Ay.len() + Az.len() - 3, rcp2 * gamma);

        let sum: f64 = iproduct!(0..Ax.len(), 0..Ay.len(), 0..Az.len())
            .map(|(I, J, K)| Ax[I] * Ay[J] * Az[K] * boys[I + J + K])
            .sum();

        -2.0 * PI / gamma * (-alpha1 * alpha2 * rab2 / gamma).exp() * sum
    }
}

impl Basis for GTO {
    fn evaluate(&self, r: &Vector3<f64>) -> f64 {
        let d = r - self.center;
        self.norm
            * d.x.powi(self.l_xyz.x)
            * d.y.powi(self.l_xyz.y)
            * d.z.powi(self.l_xyz.z)
            * (-self.alpha * d.norm_squared()).exp()
    }

    fn Sab(a: &GTO, b: &GTO) -> f64 {
        a.norm
            * b.norm
            * GTO::raw_overlap(a.alpha, &a.l_xyz, &a.center, b.alpha, &b.l_xyz, &b.center)
    }

    fn Tab(a: &GTO, b: &GTO) -> f64 {
        a.norm
            * b.norm
            * GTO::raw_kinetic(a.alpha, &a.l_xyz, &a.center, b.alpha, &b.l_xyz, &b.center)
    }

    fn Vab(a: &GTO, b: &GTO, R: Vector3<f64>, Z: u32) -> f64 {
        (Z as f64)
            * a.norm
            * b.norm
            * GTO::raw_nuclear(a.alpha, &a.l_xyz, &a.center, b.alpha, &b.l_xyz, &b.center, &R)
    }
}
