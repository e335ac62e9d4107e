//! Escape-time kernels.
//!
//! Every kernel iterates z from a start value, stops the first time
//! |z|² > 4 and returns the iteration index at which that happened, or
//! `max_iter` if the cap came first. All kernels are pure.

/// Squared bailout radius shared by all escape-time kernels.
pub const BAILOUT_SQ: f64 = 4.0;

/// z ← z² + c, z₀ = 0.
pub fn mandelbrot(cx: f64, cy: f64, max_iter: u32) -> f64 {
    let mut x = 0.0_f64;
    let mut y = 0.0_f64;

    for i in 0..max_iter {
        if x * x + y * y > BAILOUT_SQ {
            return i as f64;
        }
        let xtemp = x * x - y * y + cx;
        y = 2.0 * x * y + cy;
        x = xtemp;
    }
    max_iter as f64
}

/// z ← z² + c with z₀ = (zx, zy) and a fixed constant c.
pub fn julia(zx: f64, zy: f64, c_re: f64, c_im: f64, max_iter: u32) -> f64 {
    let mut x = zx;
    let mut y = zy;

    for i in 0..max_iter {
        if x * x + y * y > BAILOUT_SQ {
            return i as f64;
        }
        let xtemp = x * x - y * y + c_re;
        y = 2.0 * x * y + c_im;
        x = xtemp;
    }
    max_iter as f64
}

/// z ← (|Re z| + i|Im z|)² + c.
pub fn burning_ship(cx: f64, cy: f64, max_iter: u32) -> f64 {
    let mut x = 0.0_f64;
    let mut y = 0.0_f64;

    for i in 0..max_iter {
        if x * x + y * y > BAILOUT_SQ {
            return i as f64;
        }
        let ax = x.abs();
        let ay = y.abs();
        let xtemp = ax * ax - ay * ay + cx;
        y = 2.0 * ax * ay + cy;
        x = xtemp;
    }
    max_iter as f64
}

/// z ← conj(z)² + c.
pub fn tricorn(cx: f64, cy: f64, max_iter: u32) -> f64 {
    let mut x = 0.0_f64;
    let mut y = 0.0_f64;

    for i in 0..max_iter {
        if x * x + y * y > BAILOUT_SQ {
            return i as f64;
        }
        let xtemp = x * x - y * y + cx;
        y = -2.0 * x * y + cy;
        x = xtemp;
    }
    max_iter as f64
}

/// Mandelbrot with the real part of z² folded: Re ← |x² − y²|.
pub fn celtic(cx: f64, cy: f64, max_iter: u32) -> f64 {
    let mut x = 0.0_f64;
    let mut y = 0.0_f64;

    for i in 0..max_iter {
        if x * x + y * y > BAILOUT_SQ {
            return i as f64;
        }
        let xtemp = (x * x - y * y).abs() + cx;
        y = 2.0 * x * y + cy;
        x = xtemp;
    }
    max_iter as f64
}

/// Both parts of z² folded: Re ← |x² − y²|, Im ← |2xy|.
pub fn buffalo(cx: f64, cy: f64, max_iter: u32) -> f64 {
    let mut x = 0.0_f64;
    let mut y = 0.0_f64;

    for i in 0..max_iter {
        if x * x + y * y > BAILOUT_SQ {
            return i as f64;
        }
        let xtemp = (x * x - y * y).abs() + cx;
        y = (2.0 * x * y).abs() + cy;
        x = xtemp;
    }
    max_iter as f64
}

/// Burning ship variant folding only the real part in the cross term.
pub fn perpendicular_burning_ship(cx: f64, cy: f64, max_iter: u32) -> f64 {
    let mut x = 0.0_f64;
    let mut y = 0.0_f64;

    for i in 0..max_iter {
        if x * x + y * y > BAILOUT_SQ {
            return i as f64;
        }
        let ax = x.abs();
        let ay = y.abs();
        let xtemp = ax * ax - ay * ay + cx;
        y = -2.0 * ax * y + cy;
        x = xtemp;
    }
    max_iter as f64
}

/// z ← z^p + c, evaluated in polar form so non-integer powers work.
pub fn multibrot(cx: f64, cy: f64, max_iter: u32, power: f64) -> f64 {
    let mut x = 0.0_f64;
    let mut y = 0.0_f64;

    for i in 0..max_iter {
        if x * x + y * y > BAILOUT_SQ {
            return i as f64;
        }
        let r = (x * x + y * y).sqrt();
        let theta = y.atan2(x);
        let rn = r.powf(power);
        let angle = power * theta;
        x = rn * angle.cos() + cx;
        y = rn * angle.sin() + cy;
    }
    max_iter as f64
}
