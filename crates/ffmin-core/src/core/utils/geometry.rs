use nalgebra::{Point3, Vector3};

const MIN_SIN: f64 = 1e-8;
const MIN_CROSS_NORM_SQ: f64 = 1e-20;

/// Internal coordinate value together with its Cartesian derivatives, one
/// vector per participating atom in argument order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Derivatives<const N: usize> {
    pub value: f64,
    pub gradients: [Vector3<f64>; N],
}

fn project_out(v: &Vector3<f64>, unit: &Vector3<f64>) -> Vector3<f64> {
    v - unit * unit.dot(v)
}

pub fn distance(a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    (a - b).norm()
}

/// Bond length `|a - b|` and its derivatives. Coincident atoms yield zero gradients.
pub fn distance_derivatives(a: &Point3<f64>, b: &Point3<f64>) -> Derivatives<2> {
    let ab = a - b;
    let r = ab.norm();
    let u = if r > 0.0 { ab / r } else { Vector3::zeros() };
    Derivatives {
        value: r,
        gradients: [u, -u],
    }
}

/// The angle a-b-c in radians, with `b` at the vertex.
pub fn bend_angle(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    let u = a - b;
    let v = c - b;
    let cos = u.dot(&v) / (u.norm() * v.norm());
    cos.clamp(-1.0, 1.0).acos()
}

pub fn bend_angle_derivatives(
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
) -> Derivatives<3> {
    let u = a - b;
    let v = c - b;
    let (ru, rv) = (u.norm(), v.norm());
    if ru == 0.0 || rv == 0.0 {
        return Derivatives {
            value: f64::NAN,
            gradients: [Vector3::zeros(); 3],
        };
    }
    let (eu, ev) = (u / ru, v / rv);
    let cos = eu.dot(&ev).clamp(-1.0, 1.0);
    let theta = cos.acos();
    let sin = theta.sin().max(MIN_SIN);

    let grad_a = -(ev - eu * cos) / (ru * sin);
    let grad_c = -(eu - ev * cos) / (rv * sin);
    let grad_b = -(grad_a + grad_c);
    Derivatives {
        value: theta,
        gradients: [grad_a, grad_b, grad_c],
    }
}

/// The signed dihedral angle a-b-c-d in radians, in `(-pi, pi]`. NaN when either
/// plane is undefined, matching [`torsion_angle_derivatives`].
pub fn torsion_angle(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>, d: &Point3<f64>) -> f64 {
    let f = a - b;
    let g = b - c;
    let h = d - c;
    let m = f.cross(&g);
    let n = h.cross(&g);
    let gn = g.norm();
    if m.norm_squared() < MIN_CROSS_NORM_SQ || n.norm_squared() < MIN_CROSS_NORM_SQ || gn == 0.0 {
        return f64::NAN;
    }
    n.cross(&m).dot(&g).atan2(m.dot(&n) * gn)
}

/// Dihedral derivatives in the Blondel-Karplus form. When either plane is
/// undefined (three collinear atoms) the value is NaN and the gradients vanish.
pub fn torsion_angle_derivatives(
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
    d: &Point3<f64>,
) -> Derivatives<4> {
    let f = a - b;
    let g = b - c;
    let h = d - c;
    let m = f.cross(&g);
    let n = h.cross(&g);
    let (m2, n2) = (m.norm_squared(), n.norm_squared());
    let gn = g.norm();
    if m2 < MIN_CROSS_NORM_SQ || n2 < MIN_CROSS_NORM_SQ || gn == 0.0 {
        return Derivatives {
            value: f64::NAN,
            gradients: [Vector3::zeros(); 4],
        };
    }
    let phi = n.cross(&m).dot(&g).atan2(m.dot(&n) * gn);

    let fg = f.dot(&g);
    let hg = h.dot(&g);
    let grad_a = -m * (gn / m2);
    let grad_d = n * (gn / n2);
    let grad_b = m * (gn / m2) + m * (fg / (m2 * gn)) - n * (hg / (n2 * gn));
    let grad_c = n * (hg / (n2 * gn)) - m * (fg / (m2 * gn)) - n * (gn / n2);
    Derivatives {
        value: phi,
        gradients: [grad_a, grad_b, grad_c, grad_d],
    }
}

/// Wilson out-of-plane angle in radians: the angle between the bond b-d and the
/// plane spanned by the bonds b-a and b-c, with `b` the central atom.
pub fn wilson_angle(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>, d: &Point3<f64>) -> f64 {
    let ei = (a - b).normalize();
    let ek = (c - b).normalize();
    let el = (d - b).normalize();
    let n = ei.cross(&ek);
    (n.dot(&el) / n.norm()).clamp(-1.0, 1.0).asin()
}

pub fn wilson_angle_derivatives(
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
    d: &Point3<f64>,
) -> Derivatives<4> {
    let (ri, rk, rl) = (a - b, c - b, d - b);
    let (li, lk, ll) = (ri.norm(), rk.norm(), rl.norm());
    let degenerate = Derivatives {
        value: f64::NAN,
        gradients: [Vector3::zeros(); 4],
    };
    if li == 0.0 || lk == 0.0 || ll == 0.0 {
        return degenerate;
    }
    let (ei, ek, el) = (ri / li, rk / lk, rl / ll);
    let cross = ei.cross(&ek);
    let s_norm = cross.norm();
    if s_norm * s_norm < MIN_CROSS_NORM_SQ {
        return degenerate;
    }
    let normal = cross / s_norm;
    let s = normal.dot(&el).clamp(-1.0, 1.0);
    let omega = s.asin();
    let cos_omega = omega.cos().max(MIN_SIN);
    let c = ei.dot(&ek);

    let ds_dei = ek.cross(&el) / s_norm - (ei - ek * c) * (s / (s_norm * s_norm));
    let ds_dek = el.cross(&ei) / s_norm - (ek - ei * c) * (s / (s_norm * s_norm));
    let grad_a = project_out(&ds_dei, &ei) / (li * cos_omega);
    let grad_c = project_out(&ds_dek, &ek) / (lk * cos_omega);
    let grad_d = (normal - el * s) / (ll * cos_omega);
    let grad_b = -(grad_a + grad_c + grad_d);
    Derivatives {
        value: omega,
        gradients: [grad_a, grad_b, grad_c, grad_d],
    }
}
