#![allow(non_snake_case)]
//! Head-Gordon–Pople evaluation of (ab|cd).
//!
//! The horizontal recurrence moves angular momentum from b onto a and from d
//! onto c,
//!
//!   (a, b + 1_i | c d) = (a + 1_i, b | c d) + (A_i - B_i) (a b | c d),
//!
//! until only (a0|c0) classes remain. Those come from the vertical
//! recurrence over primitive quartets, keyed by (a, c, m) where m is the
//! auxiliary Boys order. The HRR coefficients depend only on the centres, so
//! it runs once on contracted quantities; each primitive quartet keeps its
//! own VRR memo.

use super::TwoElectronStrategy;
use crate::cgto::ContractedGTO;
use crate::gto::GTO;
use crate::helper::boys_table;
use itertools::iproduct;
use nalgebra::Vector3;
use std::collections::HashMap;
use std::f64::consts::{PI, SQRT_2};

#[derive(Debug, Clone, Copy, Default)]
pub struct HeadGordonPople;

type Powers = [i32; 3];

fn powers(l_xyz: &Vector3<i32>) -> Powers {
    [l_xyz.x, l_xyz.y, l_xyz.z]
}

fn step(p: Powers, axis: usize, delta: i32) -> Powers {
    let mut q = p;
    q[axis] += delta;
    q
}

struct VrrContext {
    PA: Vector3<f64>,
    WP: Vector3<f64>,
    QC: Vector3<f64>,
    WQ: Vector3<f64>,
    zeta: f64,
    eta: f64,
    // Kab Kcd / sqrt(ζ+η) F_m(T) for m = 0..=m_max
    base: Vec<f64>,
    memo: HashMap<(Powers, Powers, usize), f64>,
}

impl VrrContext {
    fn new(a: &GTO, b: &GTO, c: &GTO, d: &GTO, m_max: usize) -> Self {
        let (zeta, P) = GTO::product_center(a.alpha, &a.center, b.alpha, &b.center);
        let (eta, Q) = GTO::product_center(c.alpha, &c.center, d.alpha, &d.center);
        let W = (P * zeta + Q * eta) / (zeta + eta);

        let rab2 = (a.center - b.center).norm_squared();
        let rcd2 = (c.center - d.center).norm_squared();
        let Kab = SQRT_2 * PI.powf(1.25) / zeta * (-a.alpha * b.alpha / zeta * rab2).exp();
        let Kcd = SQRT_2 * PI.powf(1.25) / eta * (-c.alpha * d.alpha / eta * rcd2).exp();
        let prefactor = Kab * Kcd / (zeta + eta).sqrt();

        let T = zeta * eta / (zeta + eta) * (P - Q).norm_squared();
        let base = boys_table(m_max, T)
            .into_iter()
            .map(|f| prefactor * f)
            .collect();

        Self {
            PA: P - a.center,
            WP: W - P,
            QC: Q - c.center,
            WQ: W - Q,
            zeta,
            eta,
            base,
            memo: HashMap::new(),
        }
    }

    // [a0|c0]^(m)
    fn vrr(&mut self, a: Powers, c: Powers, m: usize) -> f64 {
        if let Some(&value) = self.memo.get(&(a, c, m)) {
            return value;
        }

        let zeta = self.zeta;
        let eta = self.eta;
        let value = if let Some(axis) = (0..3).find(|&k| c[k] > 0) {
            let (qc, wq) = (self.QC[axis], self.WQ[axis]);
            let c1 = step(c, axis, -1);
            let mut v = qc * self.vrr(a, c1, m) + wq * self.vrr(a, c1, m + 1);
            if c[axis] > 1 {
                let c2 = step(c, axis, -2);
                let lower = self.vrr(a, c2, m) - zeta / (zeta + eta) * self.vrr(a, c2, m + 1);
                v += 0.5 * (c[axis] - 1) as f64 / eta * lower;
            }
            if a[axis] > 0 {
                let a1 = step(a, axis, -1);
                v += 0.5 * a[axis] as f64 / (zeta + eta) * self.vrr(a1, c1, m + 1);
            }
            v
        } else if let Some(axis) = (0..3).find(|&k| a[k] > 0) {
            let (pa, wp) = (self.PA[axis], self.WP[axis]);
            let a1 = step(a, axis, -1);
            let mut v = pa * self.vrr(a1, c, m) + wp * self.vrr(a1, c, m + 1);
            if a[axis] > 1 {
                let a2 = step(a, axis, -2);
                let lower = self.vrr(a2, c, m) - eta / (zeta + eta) * self.vrr(a2, c, m + 1);
                v += 0.5 * (a[axis] - 1) as f64 / zeta * lower;
            }
            v
        } else {
            self.base[m]
        };

        self.memo.insert((a, c, m), value);
        value
    }
}

struct HrrContext {
    AB: Vector3<f64>,
    CD: Vector3<f64>,
    // (contraction weight, primitive quartet)
    quartets: Vec<(f64, VrrContext)>,
    memo: HashMap<(Powers, Powers, Powers, Powers), f64>,
}

impl HrrContext {
    fn hrr(&mut self, a: Powers, b: Powers, c: Powers, d: Powers) -> f64 {
        if let Some(&value) = self.memo.get(&(a, b, c, d)) {
            return value;
        }

        let value = if let Some(axis) = (0..3).find(|&k| b[k] > 0) {
            let ab = self.AB[axis];
            let b1 = step(b, axis, -1);
            self.hrr(step(a, axis, 1), b1, c, d) + ab * self.hrr(a, b1, c, d)
        } else if let Some(axis) = (0..3).find(|&k| d[k] > 0) {
            let cd = self.CD[axis];
            let d1 = step(d, axis, -1);
            self.hrr(a, b, step(c, axis, 1), d1) + cd * self.hrr(a, b, c, d1)
        } else {
            self.quartets
                .iter_mut()
                .map(|(w, q)| *w * q.vrr(a, c, 0))
                .sum::<f64>()
        };

        self.memo.insert((a, b, c, d), value);
        value
    }
}

impl HeadGordonPople {
    /// (ab|cd) over unnormalised primitives.
    pub fn primitive(a: &GTO, b: &GTO, c: &GTO, d: &GTO) -> f64 {
        let m_max = (a.angular_momentum()
            + b.angular_momentum()
            + c.angular_momentum()
            + d.angular_momentum()) as usize;
        let mut ctx = HrrContext {
            AB: a.center - b.center,
            CD: c.center - d.center,
            quartets: vec![(1.0, VrrContext::new(a, b, c, d, m_max))],
            memo: HashMap::new(),
        };
        ctx.hrr(
            powers(&a.l_xyz),
            powers(&b.l_xyz),
            powers(&c.l_xyz),
            powers(&d.l_xyz),
        )
    }
}

impl TwoElectronStrategy for HeadGordonPople {
    fn name(&self) -> &'static str {
        "head_gordon_pople"
    }

    fn coulomb(
        &self,
        a: &ContractedGTO,
        b: &ContractedGTO,
        c: &ContractedGTO,
        d: &ContractedGTO,
    ) -> f64 {
        let m_max = (a.angular_momentum()
            + b.angular_momentum()
            + c.angular_momentum()
            + d.angular_momentum()) as usize;

        let quartets = iproduct!(
            a.weighted_primitives(),
            b.weighted_primitives(),
            c.weighted_primitives(),
            d.weighted_primitives()
        )
        .map(|((pa, wa), (pb, wb), (pc, wc), (pd, wd))| {
            (wa * wb * wc * wd, VrrContext::new(pa, pb, pc, pd, m_max))
        })
        .collect();

        let mut ctx = HrrContext {
            AB: a.center() - b.center(),
            CD: c.center() - d.center(),
            quartets,
            memo: HashMap::new(),
        };
        ctx.hrr(
            powers(a.l_xyz()),
            powers(b.l_xyz()),
            powers(c.l_xyz()),
            powers(d.l_xyz()),
        )
    }
}
