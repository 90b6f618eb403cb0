//! Closed-form UFF potentials. Every function returns `(energy, dE/dx)` where `x`
//! is the internal coordinate the potential is written in.

use super::constants::MIN_DISTANCE;

#[inline]
pub fn harmonic_bond(r: f64, r0: f64, kb: f64) -> (f64, f64) {
    let delta = r - r0;
    (kb * delta * delta, 2.0 * kb * delta)
}

/// Angle bending in one of four shapes selected by the central atom's
/// coordination class. The linear form uses `1 + cos` so its minimum sits at 180°.
#[inline]
pub fn angle_bend(theta: f64, coordination: u8, ka: f64, c: [f64; 3]) -> (f64, f64) {
    let (cos_t, sin_t) = (theta.cos(), theta.sin());
    match coordination {
        1 => (ka * (1.0 + cos_t), -ka * sin_t),
        2 => (
            (ka / 4.5) * (1.0 + (1.0 + cos_t) * (4.0 * cos_t)),
            -(ka * 4.0 / 4.5) * (sin_t + (2.0 * theta).sin()),
        ),
        4 | 6 => (
            ka * (1.0 + cos_t) * cos_t * cos_t,
            -ka * cos_t * (2.0 + 3.0 * cos_t) * sin_t,
        ),
        _ => (
            ka * (c[0] + c[1] * cos_t + c[2] * (2.0 * cos_t * cos_t - 1.0)),
            -ka * (c[1] * sin_t + 2.0 * c[2] * (2.0 * theta).sin()),
        ),
    }
}

#[inline]
pub fn cosine_torsion(phi: f64, v: f64, n: f64, cos_n_phi0: f64) -> (f64, f64) {
    (
        v * (1.0 - cos_n_phi0 * (n * phi).cos()),
        v * n * cos_n_phi0 * (n * phi).sin(),
    )
}

#[inline]
pub fn inversion(omega: f64, koop: f64, c: [f64; 3]) -> (f64, f64) {
    (
        koop * (c[0] + c[1] * omega.cos() + c[2] * (2.0 * omega).cos()),
        -koop * (c[1] * omega.sin() + 2.0 * c[2] * (2.0 * omega).sin()),
    )
}

/// 12-6 Lennard-Jones in the minimum-distance form `kab * ((x/r)^12 - 2 (x/r)^6)`.
#[inline]
pub fn lennard_jones_12_6(dist: f64, xij: f64, kab: f64) -> (f64, f64) {
    let r = dist.max(MIN_DISTANCE);
    let t = xij / r;
    let t6 = t.powi(6);
    let t12 = t6 * t6;
    let energy = kab * (t12 - 2.0 * t6);
    let d_energy = 12.0 * kab / xij * (t6 * t - t12 * t);
    (energy, d_energy)
}

#[inline]
pub fn coulomb(dist: f64, qq: f64) -> (f64, f64) {
    let r = dist.max(MIN_DISTANCE);
    (qq / r, -qq / (r * r))
}
