//! Dynamical maps: Newton root finding on z³ − 1 and the Phoenix feedback map.

use crate::complex::Complex;
use crate::escape_time::BAILOUT_SQ;

/// Convergence radius (and derivative floor) for Newton iteration.
pub const NEWTON_EPSILON: f64 = 1e-6;

/// Feedback constant of the Phoenix map.
pub const PHOENIX_P: f64 = -0.5;

const SQRT3_2: f64 = 0.866_025_403_784_438_6;

const CUBE_ROOTS_OF_UNITY: [Complex; 3] = [
    Complex::new(1.0, 0.0),
    Complex::new(-0.5, SQRT3_2),
    Complex::new(-0.5, -SQRT3_2),
];

/// Newton's method on f(z) = z³ − 1 starting at z₀ = (x, y).
///
/// Returns the iteration at which z came within [`NEWTON_EPSILON`] of a cube
/// root of unity, or at which |f′(z)|² dropped below it. Returns `max_iter`
/// if neither happened.
pub fn newton(x: f64, y: f64, max_iter: u32) -> f64 {
    let eps_sq = NEWTON_EPSILON * NEWTON_EPSILON;
    let mut z = Complex::new(x, y);

    for i in 0..max_iter {
        if CUBE_ROOTS_OF_UNITY
            .iter()
            .any(|&root| z.sub(root).norm_sq() < eps_sq)
        {
            return i as f64;
        }

        let z2 = z.square();
        let f = z2.mul(z).sub(Complex::ONE);
        let df = z2.scale(3.0);

        match f.checked_div(df, NEWTON_EPSILON) {
            Some(step) => z = z.sub(step),
            None => return i as f64,
        }
    }
    max_iter as f64
}

/// Phoenix map: z ← z² + c + P·z_prev, z₀ = z_prev = 0.
pub fn phoenix(cx: f64, cy: f64, max_iter: u32) -> f64 {
    let mut x = 0.0_f64;
    let mut y = 0.0_f64;
    let mut x_prev = 0.0_f64;
    let mut y_prev = 0.0_f64;

    for i in 0..max_iter {
        if x * x + y * y > BAILOUT_SQ {
            return i as f64;
        }
        let xtemp = x * x - y * y + cx + PHOENIX_P * x_prev;
        let ytemp = 2.0 * x * y + cy + PHOENIX_P * y_prev;
        x_prev = x;
        y_prev = y;
        x = xtemp;
        y = ytemp;
    }
    max_iter as f64
}
