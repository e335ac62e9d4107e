use fractalscope_compute::{
    koch_generate, map_color, BackendUsed, FractalKind, IfsSampler, IfsSystem, NativeModule,
    PaletteName, PixelBuffer, RenderConfig, RenderSession, RequestOutcome, SessionOptions,
    StepOutcome, Viewport,
};
use std::ops::Range;
use std::rc::Rc;

fn render(config: RenderConfig, width: u32, height: u32) -> RenderSession {
    let mut session = RenderSession::new(config, width, height, SessionOptions::default());
    assert_eq!(session.request_render(), RequestOutcome::Started);
    let mut sink = |_: &PixelBuffer, _: Range<u32>| {};
    session.run_to_completion(&mut sink);
    session
}

#[test]
fn every_kind_finishes_a_pass() {
    for kind in FractalKind::ALL {
        let session = render(RenderConfig::new(kind, 32, PaletteName::Ocean), 24, 18);
        let status = session.status().expect("status after pass");

        assert!(!session.is_rendering(), "{}", kind);
        assert_eq!(status.kind, kind);
        assert_eq!(status.completed, kind.has_interpreted(), "{}", kind);
        assert_eq!(session.buffer().size(), (24, 18));
    }
}

#[test]
fn interior_pixels_are_black() {
    // the surface centre of the default Mandelbrot view is c = -0.5, inside the set
    let session = render(RenderConfig::new(FractalKind::Mandelbrot, 128, PaletteName::Fire), 40, 40);
    assert_eq!(session.buffer().pixel(20, 20), Some([0, 0, 0, 255]));
}

#[test]
fn escaped_pixels_use_palette_color() {
    let session = render(RenderConfig::new(FractalKind::Mandelbrot, 100, PaletteName::Aurora), 40, 40);

    // pixel (0, 0) sits at c = (-2.25, -1.75); z1 = c escapes at iteration 1
    let (cx, cy) = session.pixel_to_complex(0.0, 0.0);
    assert!((cx + 2.25).abs() < 1e-12);
    assert!((cy + 1.75).abs() < 1e-12);

    let rgb = map_color(1.0, 100.0, PaletteName::Aurora);
    assert_eq!(session.buffer().pixel(0, 0), Some([rgb[0], rgb[1], rgb[2], 255]));
}

#[test]
fn zoom_then_unzoom_restores_view() {
    let mut session = RenderSession::new(RenderConfig::default(), 320, 200, SessionOptions::default());
    let original = *session.viewport();

    session.zoom_at(37.0, 150.0, 2.0).unwrap();
    session.zoom_at(37.0, 150.0, 0.5).unwrap();

    let restored = session.viewport();
    assert!((restored.center_x - original.center_x).abs() < 1e-12);
    assert!((restored.center_y - original.center_y).abs() < 1e-12);
    assert!((restored.units_per_pixel - original.units_per_pixel).abs() < 1e-15);
}

#[test]
fn reset_view_restores_preset() {
    let mut session = RenderSession::new(
        RenderConfig::new(FractalKind::BurningShip, 64, PaletteName::Fire),
        300,
        200,
        SessionOptions::default(),
    );
    session.pan(25.0, -10.0);
    session.zoom_at(10.0, 10.0, 3.0).unwrap();
    let mut sink = |_: &PixelBuffer, _: Range<u32>| {};
    session.run_to_completion(&mut sink);

    session.reset_view();
    assert_eq!(
        *session.viewport(),
        Viewport::from_preset(&FractalKind::BurningShip.preset(5.0), 300)
    );
}

#[test]
fn multibrot_power_change_resets_view() {
    let mut session = RenderSession::new(
        RenderConfig::new(FractalKind::Multibrot, 64, PaletteName::Fire),
        100,
        100,
        SessionOptions::default(),
    );
    let mut sink = |_: &PixelBuffer, _: Range<u32>| {};
    session.run_to_completion(&mut sink);

    session.set_config(session.config().with_multibrot_power(8.0));
    assert!((session.viewport().span(100) - 1.6).abs() < 1e-12);
}

#[test]
fn ifs_points_are_reproducible() {
    let points = |cap| IfsSampler::new(IfsSystem::Barnsley, cap).drain_points();
    let first = points(40);
    assert_eq!(first.len(), 36_000);
    assert_eq!(first, points(40));
    assert_ne!(first, points(41));
}

#[test]
fn ifs_pass_is_reproducible() {
    let config = RenderConfig::new(FractalKind::Barnsley, 48, PaletteName::Aurora);
    let a = render(config, 60, 80);
    let b = render(config, 60, 80);
    assert_eq!(a.buffer(), b.buffer());
    assert_eq!(a.status().unwrap().backend_used, BackendUsed::Interpreted);
}

#[test]
fn koch_strings() {
    assert_eq!(koch_generate(0), "F");
    assert_eq!(koch_generate(1), "F+F--F+F");
    assert_eq!(koch_generate(2), koch_generate(1).replace('F', "F+F--F+F"));
}

#[test]
fn progress_counts_bands() {
    let mut session = RenderSession::new(
        RenderConfig::new(FractalKind::Celtic, 32, PaletteName::Fire),
        10,
        30,
        SessionOptions {
            rows_per_tick: 4,
            ..SessionOptions::default()
        },
    );
    session.request_render();

    let mut sink = |_: &PixelBuffer, _: Range<u32>| {};
    let mut steps = 0;
    loop {
        steps += 1;
        match session.step(&mut sink) {
            StepOutcome::Continue => {
                let progress = session.progress();
                assert_eq!(progress.completed_steps, steps);
                assert!(!progress.is_complete);
            }
            StepOutcome::Finished(_) => break,
            StepOutcome::Idle => panic!("pass ended without finishing"),
        }
    }
    assert_eq!(steps, 8);
    assert!((session.progress().percentage() - 100.0).abs() < 1e-3);
}

#[test]
fn backend_failure_is_per_kind() {
    let mut session = RenderSession::new(
        RenderConfig::new(FractalKind::Lambda, 32, PaletteName::Fire),
        8,
        8,
        SessionOptions::default(),
    );
    session.backend_failed("network error");
    session.request_render();
    let mut sink = |_: &PixelBuffer, _: Range<u32>| {};
    let status = session.run_to_completion(&mut sink).unwrap();
    assert_eq!(status.backend_used, BackendUsed::Unavailable);

    // other kinds are unaffected
    session.set_config(RenderConfig::new(FractalKind::Phoenix, 32, PaletteName::Fire));
    let status = session.run_to_completion(&mut sink).unwrap();
    assert!(status.completed);
    assert_eq!(status.backend_used, BackendUsed::Interpreted);

    // and a later successful load covers the compiled-only kind
    session.set_config(RenderConfig::new(FractalKind::Lambda, 32, PaletteName::Fire));
    session.run_to_completion(&mut sink);
    session.attach_backend(Rc::new(NativeModule));
    let status = session.run_to_completion(&mut sink).unwrap();
    assert!(status.completed);
    assert_eq!(status.to_string().split(" - ").next(), Some("native"));
}
