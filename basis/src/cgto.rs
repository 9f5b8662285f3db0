/* Contracted gaussian type orbital (CGTO), built on top of the primitive
   GTO in gto.rs.

   A ContractedGTO can only be obtained from ContractedGTOBuilder::normalize,
   so every instance handed to the integral code has unit self-overlap.
*/
#![allow(non_snake_case)]

use crate::basis::{Basis, MAX_ANGULAR_MOMENTUM};
use crate::error::BasisError;
use crate::gto::GTO;
use itertools::iproduct;
use nalgebra::Vector3;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ContractedGTO {
    center: Vector3<f64>,
    l_xyz: Vector3<i32>,
    primitives: Vec<GTO>,
    coefficients: Vec<f64>,
    norm: f64,
}

/// Collects primitives for one contracted function. Consumed by `normalize`.
#[derive(Debug, Clone)]
pub struct ContractedGTOBuilder {
    center: Vector3<f64>,
    l_xyz: Vector3<i32>,
    primitives: Vec<GTO>,
    coefficients: Vec<f64>,
}

impl ContractedGTOBuilder {
    pub fn new(center: Vector3<f64>, l_xyz: Vector3<i32>) -> Result<Self, BasisError> {
        if l_xyz.iter().any(|&l| l < 0) {
            return Err(BasisError::MalformedBasis(format!(
                "negative Cartesian power in {:?}",
                l_xyz
            )));
        }
        let l = l_xyz.x + l_xyz.y + l_xyz.z;
        if l > MAX_ANGULAR_MOMENTUM {
            return Err(BasisError::AngularMomentumTooHigh {
                l,
                max: MAX_ANGULAR_MOMENTUM,
            });
        }
        if center.iter().any(|c| !c.is_finite()) {
            return Err(BasisError::DegenerateGeometry(format!(
                "basis function centre {:?} is not finite",
                center
            )));
        }
        Ok(Self {
            center,
            l_xyz,
            primitives: Vec::new(),
            coefficients: Vec::new(),
        })
    }

    /// Append a primitive; its own closed-form normalisation is computed here.
    pub fn add_primitive(
        &mut self,
        exponent: f64,
        coefficient: f64,
    ) -> Result<&mut Self, BasisError> {
        if !(exponent.is_finite() && exponent > 0.0) {
            return Err(BasisError::MalformedBasis(format!(
                "exponent must be positive and finite, got {}",
                exponent
            )));
        }
        if !coefficient.is_finite() {
            return Err(BasisError::MalformedBasis(format!(
                "contraction coefficient must be finite, got {}",
                coefficient
            )));
        }
        self.primitives
            .push(GTO::new(exponent, self.l_xyz, self.center));
        self.coefficients.push(coefficient);
        Ok(self)
    }

    pub fn with_primitives(
        mut self,
        exponents: &[f64],
        coefficients: &[f64],
    ) -> Result<Self, BasisError> {
        if exponents.len() != coefficients.len() {
            return Err(BasisError::MalformedBasis(format!(
                "{} exponents but {} contraction coefficients",
                exponents.len(),
                coefficients.len()
            )));
        }
        for (&e, &c) in exponents.iter().zip(coefficients) {
            self.add_primitive(e, c)?;
        }
        Ok(self)
    }

    /// Rescale the contraction so that <φ|φ> = 1.
    pub fn normalize(self) -> Result<ContractedGTO, BasisError> {
        if self.primitives.is_empty() {
            return Err(BasisError::MalformedBasis(
                "contracted function has no primitives".to_string(),
            ));
        }

        let self_overlap: f64 = iproduct!(0..self.primitives.len(), 0..self.primitives.len())
            .map(|(i, j)| {
                self.coefficients[i]
                    * self.coefficients[j]
                    * GTO::Sab(&self.primitives[i], &self.primitives[j])
            })
            .sum();

        if !(self_overlap.is_finite() && self_overlap > 0.0) {
            return Err(BasisError::MalformedBasis(format!(
                "contracted function has self-overlap {}",
                self_overlap
            )));
        }

        Ok(ContractedGTO {
            center: self.center,
            l_xyz: self.l_xyz,
            primitives: self.primitives,
            coefficients: self.coefficients,
            norm: 1.0 / self_overlap.sqrt(),
        })
    }
}

impl ContractedGTO {
    pub fn center(&self) -> &Vector3<f64> {
        &self.center
    }

    pub fn l_xyz(&self) -> &Vector3<i32> {
        &self.l_xyz
    }

    pub fn angular_momentum(&self) -> i32 {
        self.l_xyz.x + self.l_xyz.y + self.l_xyz.z
    }

    pub fn primitives(&self) -> &[GTO] {
        &self.primitives
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn norm(&self) -> f64 {
        self.norm
    }

    /// Primitives paired with the full weight (contraction coefficient times
    /// primitive and contracted norms) they carry in this function.
    pub fn weighted_primitives(&self) -> impl Iterator<Item = (&GTO, f64)> + Clone + '_ {
        let norm = self.norm;
        self.primitives
            .iter()
            .zip(self.coefficients.iter())
            .map(move |(p, &c)| (p, norm * c * p.norm))
    }

    /// Σ c N (Δx)^l (Δy)^m (Δz)^n exp(-α|Δ|²) at point `r`.
    pub fn amplitude(&self, r: &Vector3<f64>) -> f64 {
        self.norm
            * self
                .primitives
                .iter()
                .zip(&self.coefficients)
                .map(|(p, c)| c * p.evaluate(r))
                .sum::<f64>()
    }

    /// Cartesian label such as "s", "px" or "dxy".
    pub fn label(&self) -> String {
        let shell = match self.angular_momentum() {
            0 => 's',
            1 => 'p',
            2 => 'd',
            3 => 'f',
            _ => 'g',
        };
        let mut label = shell.to_string();
        for (axis, &power) in ['x', 'y', 'z'].iter().zip(self.l_xyz.iter()) {
            for _ in 0..power {
                label.push(*axis);
            }
        }
        label
    }

    // Σ_ij c_i c_j <p_i| op |p_j> scaled by both contracted norms
    fn contract_pairs<F>(a: &ContractedGTO, b: &ContractedGTO, op: F) -> f64
    where
        F: Fn(&GTO, &GTO) -> f64,
    {
        let sum: f64 = iproduct!(
            a.primitives.iter().zip(&a.coefficients),
            b.primitives.iter().zip(&b.coefficients)
        )
        .map(|((pa, ca), (pb, cb))| ca * cb * op(pa, pb))
        .sum();
        a.norm * b.norm * sum
    }
}

impl Basis for ContractedGTO {
    fn evaluate(&self, r: &Vector3<f64>) -> f64 {
        self.amplitude(r)
    }

    fn Sab(a: &ContractedGTO, b: &ContractedGTO) -> f64 {
        ContractedGTO::contract_pairs(a, b, GTO::Sab)
    }

    fn Tab(a: &ContractedGTO, b: &ContractedGTO) -> f64 {
        ContractedGTO::contract_pairs(a, b, GTO::Tab)
    }

    fn Vab(a: &ContractedGTO, b: &ContractedGTO, R: Vector3<f64>, Z: u32) -> f64 {
        ContractedGTO::contract_pairs(a, b, |pa, pb| GTO::Vab(pa, pb, R, Z))
    }
}
