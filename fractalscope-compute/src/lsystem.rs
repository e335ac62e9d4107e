//! Koch curve as an L-system, drawn by a turtle in surface pixel space.

use fractalscope_core::{map_color, PaletteName, PixelBuffer};
use std::f64::consts::FRAC_PI_3;

/// Deepest expansion drawn; beyond this segments shrink below a pixel.
pub const MAX_KOCH_DEPTH: u32 = 6;

const AXIOM: &str = "F";
const PRODUCTION: &str = "F+F--F+F";
const BACKGROUND: [u8; 4] = [0, 0, 0, 255];

/// Expansion depth for an iteration cap: floor((cap − 64) / 128), clamped to 0..=6.
pub fn koch_depth(max_iterations: u32) -> u32 {
    (max_iterations.saturating_sub(64) / 128).min(MAX_KOCH_DEPTH)
}

/// Rewrite the axiom `depth` times, replacing every `F` by the production.
pub fn koch_generate(depth: u32) -> String {
    let mut commands = String::from(AXIOM);
    for _ in 0..depth {
        let mut next = String::with_capacity(commands.len() * PRODUCTION.len());
        for ch in commands.chars() {
            match ch {
                'F' => next.push_str(PRODUCTION),
                other => next.push(other),
            }
        }
        commands = next;
    }
    commands
}

/// Run the turtle over `commands` for a `width` × `height` surface.
///
/// The turtle starts at (0.1·w, 0.65·h) facing +x and each `F` advances by
/// 0.8·w / 3^depth. `+` and `-` turn by ±60°. Screen y grows downward.
pub fn koch_polyline(commands: &str, depth: u32, width: u32, height: u32) -> Vec<(f64, f64)> {
    let segment = 0.8 * width as f64 / 3f64.powi(depth as i32);
    let mut x = 0.1 * width as f64;
    let mut y = 0.65 * height as f64;
    let mut heading = 0.0_f64;

    let mut points = vec![(x, y)];
    for ch in commands.chars() {
        match ch {
            'F' => {
                x += segment * heading.cos();
                y += segment * heading.sin();
                points.push((x, y));
            }
            '+' => heading += FRAC_PI_3,
            '-' => heading -= FRAC_PI_3,
            _ => {}
        }
    }
    points
}

/// Stroke width in pixels for a surface width: w / 800 clamped to [1, 2].
pub fn stroke_width(width: u32) -> f64 {
    (width as f64 / 800.0).clamp(1.0, 2.0)
}

fn stamp(buffer: &mut PixelBuffer, x: f64, y: f64, brush: i64, rgb: [u8; 3]) {
    let x0 = x.floor() as i64 - brush / 2;
    let y0 = y.floor() as i64 - brush / 2;
    for py in y0..y0 + brush {
        for px in x0..x0 + brush {
            if px >= 0 && py >= 0 && px <= u32::MAX as i64 && py <= u32::MAX as i64 {
                buffer.put_rgb(px as u32, py as u32, rgb);
            }
        }
    }
}

/// Stroke consecutive points with a square brush. Pixels outside the buffer
/// are clipped individually.
pub fn draw_polyline(buffer: &mut PixelBuffer, points: &[(f64, f64)], rgb: [u8; 3], width: f64) {
    let brush = (width.round() as i64).max(1);
    for pair in points.windows(2) {
        let (x1, y1) = pair[0];
        let (x2, y2) = pair[1];
        let steps = ((x2 - x1).abs().max((y2 - y1).abs()).ceil() as u32).max(1);
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            stamp(buffer, x1 + (x2 - x1) * t, y1 + (y2 - y1) * t, brush, rgb);
        }
    }
    if let [(x, y)] = points {
        stamp(buffer, *x, *y, brush, rgb);
    }
}

/// Draw the whole Koch curve for `max_iterations` into `buffer`.
///
/// The buffer is first filled opaque black; the stroke uses the palette
/// colour of min(0.6·cap, cap − 1).
pub fn render_koch(buffer: &mut PixelBuffer, max_iterations: u32, palette: PaletteName) {
    let (width, height) = buffer.size();
    buffer.fill(BACKGROUND);

    let depth = koch_depth(max_iterations);
    let commands = koch_generate(depth);
    let points = koch_polyline(&commands, depth, width, height);

    let max = max_iterations as f64;
    let stroke = map_color((max * 0.6).min(max - 1.0), max, palette);
    draw_polyline(buffer, &points, stroke, stroke_width(width));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_first_levels() {
        assert_eq!(koch_generate(0), "F");
        assert_eq!(koch_generate(1), "F+F--F+F");
        assert_eq!(
            koch_generate(2),
            "F+F--F+F+F+F--F+F--F+F--F+F+F+F--F+F"
        );
    }

    #[test]
    fn forward_count_quadruples() {
        for depth in 0..=MAX_KOCH_DEPTH {
            let count = koch_generate(depth).chars().filter(|&c| c == 'F').count();
            assert_eq!(count, 4usize.pow(depth));
        }
    }

    #[test]
    fn depth_from_cap() {
        assert_eq!(koch_depth(0), 0);
        assert_eq!(koch_depth(63), 0);
        assert_eq!(koch_depth(191), 0);
        assert_eq!(koch_depth(192), 1);
        assert_eq!(koch_depth(256), 1);
        assert_eq!(koch_depth(832), 6);
        assert_eq!(koch_depth(100_000), 6);
    }

    #[test]
    fn polyline_spans_eighty_percent_of_width() {
        for depth in 0..=3 {
            let points = koch_polyline(&koch_generate(depth), depth, 1000, 500);
            assert_eq!(points.len(), 4usize.pow(depth) + 1);

            let (x0, y0) = points[0];
            let (xn, yn) = points[points.len() - 1];
            assert_eq!((x0, y0), (100.0, 325.0));
            assert!((xn - 900.0).abs() < 1e-6);
            assert!((yn - 325.0).abs() < 1e-6);
        }
    }

    #[test]
    fn stroke_width_is_clamped() {
        assert_eq!(stroke_width(400), 1.0);
        assert_eq!(stroke_width(1200), 1.5);
        assert_eq!(stroke_width(4000), 2.0);
    }

    #[test]
    fn render_fills_background_and_strokes_baseline() {
        let mut buffer = PixelBuffer::new(100, 40);
        render_koch(&mut buffer, 64, PaletteName::Fire);

        // depth 0 is a straight segment from x = 10 to x = 90 at y = 26
        let stroke = map_color(38.4, 64.0, PaletteName::Fire);
        assert_eq!(buffer.pixel(50, 26), Some([stroke[0], stroke[1], stroke[2], 255]));
        assert_eq!(buffer.pixel(50, 10), Some(BACKGROUND));
        assert_eq!(buffer.pixel(5, 26), Some(BACKGROUND));
        assert!(buffer.as_bytes().chunks_exact(4).all(|p| p[3] == 255));
    }

    #[test]
    fn offscreen_segments_are_clipped() {
        let mut buffer = PixelBuffer::new(10, 10);
        draw_polyline(&mut buffer, &[(-4.0, -4.0), (12.0, 12.0)], [9, 9, 9], 1.0);
        assert_eq!(buffer.pixel(3, 3), Some([9, 9, 9, 255]));
        assert_eq!(buffer.pixel(3, 4), Some([0, 0, 0, 0]));
    }
}
