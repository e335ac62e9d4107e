//! The compiled backend module: every kernel of the crate under its export
//! name, plus the maps that only exist compiled (magnet I, magnet II, lambda).

use crate::backend::{BackendModule, Export};
use crate::complex::Complex;
use crate::dynamical::{self, NEWTON_EPSILON};
use crate::escape_time::{self, BAILOUT_SQ};

/// Squared distance to the fixed point z = 1 below which a magnet orbit counts as converged.
const MAGNET_CONVERGED_SQ: f64 = NEWTON_EPSILON * NEWTON_EPSILON;

/// Smallest squared denominator norm the magnet maps divide by.
const MAGNET_MIN_DENOM_SQ: f64 = 1e-12;

/// Magnet I: z ← ((z² + c − 1) / (2z + c − 2))², z₀ = 0.
///
/// Stops on escape, on convergence to z = 1, or on a vanishing denominator,
/// returning the iteration index.
pub fn magnet1(cx: f64, cy: f64, max_iter: u32) -> f64 {
    let c = Complex::new(cx, cy);
    let c_minus_1 = c.sub(Complex::new(1.0, 0.0));
    let c_minus_2 = c.sub(Complex::new(2.0, 0.0));
    let mut z = Complex::default();

    for i in 0..max_iter {
        if z.norm_sq() > BAILOUT_SQ || z.sub(Complex::ONE).norm_sq() < MAGNET_CONVERGED_SQ {
            return i as f64;
        }
        let num = z.square().add(c_minus_1);
        let den = z.scale(2.0).add(c_minus_2);
        match num.checked_div(den, MAGNET_MIN_DENOM_SQ) {
            Some(q) => z = q.square(),
            None => return i as f64,
        }
    }
    max_iter as f64
}

/// Magnet II:
/// z ← ((z³ + 3(c − 1)z + (c − 1)(c − 2)) / (3z² + 3(c − 2)z + (c − 1)(c − 2) + 1))², z₀ = 0.
pub fn magnet2(cx: f64, cy: f64, max_iter: u32) -> f64 {
    let c = Complex::new(cx, cy);
    let c_minus_1 = c.sub(Complex::new(1.0, 0.0));
    let c_minus_2 = c.sub(Complex::new(2.0, 0.0));
    let product = c_minus_1.mul(c_minus_2);
    let mut z = Complex::default();

    for i in 0..max_iter {
        if z.norm_sq() > BAILOUT_SQ || z.sub(Complex::ONE).norm_sq() < MAGNET_CONVERGED_SQ {
            return i as f64;
        }
        let z2 = z.square();
        let num = z2.mul(z).add(c_minus_1.scale(3.0).mul(z)).add(product);
        let den = z2
            .scale(3.0)
            .add(c_minus_2.scale(3.0).mul(z))
            .add(product)
            .add(Complex::ONE);
        match num.checked_div(den, MAGNET_MIN_DENOM_SQ) {
            Some(q) => z = q.square(),
            None => return i as f64,
        }
    }
    max_iter as f64
}

/// Logistic map in the complex plane: z ← c·z·(1 − z), z₀ = 1/2.
pub fn lambda(cx: f64, cy: f64, max_iter: u32) -> f64 {
    let c = Complex::new(cx, cy);
    let mut z = Complex::new(0.5, 0.0);

    for i in 0..max_iter {
        if z.norm_sq() > BAILOUT_SQ {
            return i as f64;
        }
        z = c.mul(z).mul(Complex::ONE.sub(z));
    }
    max_iter as f64
}

/// In-process compiled module. Hosts without a loadable module (tests,
/// headless drivers) attach this one.
#[derive(Clone, Copy, Debug, Default)]
pub struct NativeModule;

impl NativeModule {
    pub const NAME: &'static str = "native";

    /// Every export name this module answers to.
    pub const EXPORTS: [&'static str; 13] = [
        "mandelbrot",
        "julia",
        "burning_ship",
        "tricorn",
        "multibrot",
        "celtic",
        "buffalo",
        "perpendicular_burning_ship",
        "newton",
        "phoenix",
        "magnet1",
        "magnet2",
        "lambda_fractale",
    ];
}

impl BackendModule for NativeModule {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn export(&self, name: &str) -> Option<Export> {
        let export = match name {
            "mandelbrot" => Export::escape(escape_time::mandelbrot),
            "julia" => Export::julia(escape_time::julia),
            "burning_ship" => Export::escape(escape_time::burning_ship),
            "tricorn" => Export::escape(escape_time::tricorn),
            "multibrot" => Export::power(escape_time::multibrot),
            "celtic" => Export::escape(escape_time::celtic),
            "buffalo" => Export::escape(escape_time::buffalo),
            "perpendicular_burning_ship" => Export::escape(escape_time::perpendicular_burning_ship),
            "newton" => Export::escape(dynamical::newton),
            "phoenix" => Export::escape(dynamical::phoenix),
            "magnet1" => Export::escape(magnet1),
            "magnet2" => Export::escape(magnet2),
            "lambda_fractale" => Export::escape(lambda),
            _ => return None,
        };
        Some(export)
    }
}
