#![allow(non_snake_case)]
use nalgebra::Vector3;
use rayon::prelude::*;
use std::f64::consts::PI;

const GAMMA_EPS: f64 = 1.0e-15;
const GAMMA_FPMIN: f64 = 1.0e-300;
const GAMMA_MAX_ITER: usize = 500;


// Simpson's rule integration
pub fn simpson_integration<F>(f: F, a: f64, b: f64, n: usize) -> f64
where
    F: Fn(f64) -> f64,
{
    let n = if n % 2 == 0 { n } else { n + 1 };
    let h = (b - a) / n as f64;

    let mut sum = f(a) + f(b);
    for i in 1..n {
        let x = a + i as f64 * h;
        sum += if i % 2 == 0 { 2.0 * f(x) } else { 4.0 * f(x) };
    }
    sum * h / 3.0
}

fn simpson_weight(i: usize, n: usize) -> f64 {
    if i == 0 || i == n {
        1.0
    } else if i % 2 == 1 {
        4.0
    } else {
        2.0
    }
}

/// Parallel Simpson's rule over the box [a.x,b.x] x [a.y,b.y] x [a.z,b.z].
///
/// Subdivision counts are rounded up to the next even number.
pub fn simpson_integration_3d<F>(
    f: F,
    a: Vector3<f64>,
    b: Vector3<f64>,
    nx: usize,
    ny: usize,
    nz: usize,
) -> f64
where
    F: Fn(f64, f64, f64) -> f64 + Sync,
{
    let nx = nx + nx % 2;
    let ny = ny + ny % 2;
    let nz = nz + nz % 2;

    let hx = (b.x - a.x) / nx as f64;
    let hy = (b.y - a.y) / ny as f64;
    let hz = (b.z - a.z) / nz as f64;

    let sum: f64 = (0..=nx)
        .into_par_iter()
        .map(|i| {
            let x = a.x + i as f64 * hx;
            let wx = simpson_weight(i, nx);
            let mut plane = 0.0;
            for j in 0..=ny {
                let y = a.y + j as f64 * hy;
                let wy = simpson_weight(j, ny);
                for k in 0..=nz {
                    let z = a.z + k as f64 * hz;
                    plane += wx * wy * simpson_weight(k, nz) * f(x, y, z);
                }
            }
            plane
        })
        .sum();

    sum * (hx * hy * hz) / 27.0
}

/// n! as a float; negative arguments give 1.
pub fn factorial(n: i32) -> f64 {
    (1..=n).fold(1.0, |acc, x| acc * x as f64)
}

/// n!! as a float, with the convention (-1)!! = 0!! = 1.
pub fn double_factorial(n: i32) -> f64 {
    let mut acc = 1.0;
    let mut k = n;
    while k > 1 {
        acc *= k as f64;
        k -= 2;
    }
    acc
}

pub fn binomial(n: i32, k: i32) -> f64 {
    if k < 0 || k > n {
        return 0.0;
    }
    factorial(n) / (factorial(k) * factorial(n - k))
}

/// a! / (b! (a - 2b)!), the ratio that shows up in the Hermite expansion of
/// the nuclear-attraction and electron-repulsion B/A arrays.
pub fn factorial_ratio_squared(a: i32, b: i32) -> f64 {
    factorial(a) / (factorial(b) * factorial(a - 2 * b))
}

/// Coefficient of x^s in (x + xpa)^ia (x + xpb)^ib.
///
/// Shared by the overlap, nuclear-attraction and two-electron formulas.
pub fn binomial_prefactor(s: i32, ia: i32, ib: i32, xpa: f64, xpb: f64) -> f64 {
    (0..=s)
        .filter(|&t| s - ia <= t && t <= ib)
        .map(|t| {
            binomial(ia, s - t)
                * binomial(ib, t)
                * xpa.powi(ia - s + t)
                * xpb.powi(ib - t)
        })
        .sum()
}

/// ln |Γ(x)|.
pub fn ln_gamma(x: f64) -> f64 {
    libm::lgamma(x)
}

/// Γ(m + 1/2) = (2m - 1)!! √π / 2^m, exact for the orders the Boys function needs.
pub fn half_integer_gamma(m: i32) -> f64 {
    double_factorial(2 * m - 1) * PI.sqrt() / 2f64.powi(m)
}

// Σ x^n / (a (a+1) ... (a+n)); the e^{-x} x^a prefactor is left to the caller.
fn gamma_series(a: f64, x: f64) -> f64 {
    let mut ap = a;
    let mut term = 1.0 / a;
    let mut sum = term;
    for _ in 0..GAMMA_MAX_ITER {
        ap += 1.0;
        term *= x / ap;
        sum += term;
        if term.abs() < sum.abs() * GAMMA_EPS {
            break;
        }
    }
    sum
}

// Modified Lentz evaluation of the continued fraction for Γ(a, x) e^{x} x^{-a}.
fn gamma_continued_fraction(a: f64, x: f64) -> f64 {
    let mut b = x + 1.0 - a;
    let mut c = 1.0 / GAMMA_FPMIN;
    let mut d = 1.0 / b;
    let mut h = d;
    for i in 1..GAMMA_MAX_ITER {
        let an = -(i as f64) * (i as f64 - a);
        b += 2.0;
        d = an * d + b;
        if d.abs() < GAMMA_FPMIN {
            d = GAMMA_FPMIN;
        }
        c = b + an / c;
        if c.abs() < GAMMA_FPMIN {
            c = GAMMA_FPMIN;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;
        if (delta - 1.0).abs() < GAMMA_EPS {
            break;
        }
    }
    h
}

/// Regularised lower incomplete gamma function P(a, x) = γ(a, x) / Γ(a).
pub fn gamma_p(a: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    let log_prefactor = -x + a * x.ln() - ln_gamma(a);
    if x < a + 1.0 {
        log_prefactor.exp() * gamma_series(a, x)
    } else {
        1.0 - log_prefactor.exp() * gamma_continued_fraction(a, x)
    }
}

/// Lower incomplete gamma function γ(a, x).
pub fn lower_incomplete_gamma(a: f64, x: f64) -> f64 {
    gamma_p(a, x) * ln_gamma(a).exp()
}

/// Boys function F_m(x) = ∫_0^1 t^{2m} exp(-x t^2) dt.
///
/// Uses F_m(x) = γ(m + 1/2, x) / (2 x^{m + 1/2}) with the x^{m + 1/2} factor
/// cancelled analytically, so F_m(0) = 1 / (2m + 1) comes out exactly.
/// Small negative arguments produced by rounding are clamped to zero.
pub fn boys_function(m: i32, x: f64) -> f64 {
    let a = m as f64 + 0.5;
    let x = x.max(0.0);
    if x < a + 1.0 {
        0.5 * (-x).exp() * gamma_series(a, x)
    } else {
        0.5 * (half_integer_gamma(m) * x.powf(-a) - (-x).exp() * gamma_continued_fraction(a, x))
    }
}

/// F_0(x) .. F_{m_max}(x), the top order from `boys_function` and the rest by
/// the stable downward recursion F_{m} = (2x F_{m+1} + e^{-x}) / (2m + 1).
pub fn boys_table(m_max: usize, x: f64) -> Vec<f64> {
    let x = x.max(0.0);
    let mut table = vec![0.0; m_max + 1];
    table[m_max] = boys_function(m_max as i32, x);
    let ex = (-x).exp();
    for m in (0..m_max).rev() {
        table[m] = (2.0 * x * table[m + 1] + ex) / (2 * m + 1) as f64;
    }
    table
}
