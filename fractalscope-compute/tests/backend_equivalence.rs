use fractalscope_compute::{
    interpreted_value, map_color, resolve_kernel, BackendModule, BackendSlot, Export, ExportTable,
    FractalKind, KernelParams, KernelSource, NativeModule, PaletteName, SessionOptions, INTERIOR,
};
use std::rc::Rc;

const CAPS: [u32; 3] = [1, 50, 300];

fn params(max_iterations: u32) -> KernelParams {
    KernelParams {
        max_iterations,
        julia_constant: (-0.8, 0.156),
        multibrot_power: 5.0,
    }
}

fn grid() -> Vec<(f64, f64)> {
    let mut points = Vec::new();
    for j in 0..13 {
        for i in 0..13 {
            points.push((-2.4 + i as f64 * 0.4, -2.4 + j as f64 * 0.4));
        }
    }
    points
}

fn per_pixel_kinds() -> impl Iterator<Item = FractalKind> {
    FractalKind::ALL.into_iter().filter(|k| k.signature().is_some())
}

#[test]
fn native_exports_match_interpreted_kernels() {
    for kind in per_pixel_kinds().filter(|k| k.has_interpreted()) {
        let export = NativeModule
            .export(kind.export_name())
            .expect("native module exports every per-pixel kind");
        for cap in CAPS {
            let p = params(cap);
            for (cx, cy) in grid() {
                let compiled = export.call(cx, cy, &p);
                let interpreted = interpreted_value(kind, cx, cy, &p).unwrap();
                assert!(
                    (compiled - interpreted).abs() <= 1e-9,
                    "{} at ({}, {}) cap {}: {} vs {}",
                    kind,
                    cx,
                    cy,
                    cap,
                    compiled,
                    interpreted
                );
            }
        }
    }
}

#[test]
fn results_stay_in_range_and_cap_is_black() {
    for kind in per_pixel_kinds() {
        let export = NativeModule.export(kind.export_name()).unwrap();
        for cap in CAPS {
            let p = params(cap);
            for (cx, cy) in grid() {
                let value = export.call(cx, cy, &p);
                assert!((0.0..=cap as f64).contains(&value), "{} gave {}", kind, value);
                if value == cap as f64 {
                    for palette in PaletteName::ALL {
                        assert_eq!(map_color(value, cap as f64, palette), INTERIOR);
                    }
                }
            }
        }
    }
}

#[test]
fn kernels_are_deterministic() {
    for kind in per_pixel_kinds() {
        let export = NativeModule.export(kind.export_name()).unwrap();
        let p = params(200);
        for (cx, cy) in grid() {
            assert_eq!(
                export.call(cx, cy, &p).to_bits(),
                export.call(cx, cy, &p).to_bits()
            );
        }
    }
}

#[test]
fn native_module_resolves_for_every_per_pixel_kind() {
    let slot = BackendSlot::Loaded(Rc::new(NativeModule));
    for kind in per_pixel_kinds() {
        let kernel = resolve_kernel(kind, &slot, &SessionOptions::default(), &params(64));
        assert_eq!(
            kernel.source(),
            &KernelSource::Compiled(NativeModule::NAME.to_string()),
            "{}",
            kind
        );
    }
}

#[test]
fn partial_module_degrades_per_kind() {
    let native = NativeModule;
    let table = ExportTable::new("partial")
        .with("julia", native.export("julia").unwrap())
        .with("magnet2", native.export("magnet2").unwrap());
    let slot = BackendSlot::Loaded(Rc::new(table));
    let options = SessionOptions::default();

    let source = |kind| resolve_kernel(kind, &slot, &options, &params(64)).source().clone();
    assert_eq!(source(FractalKind::Julia), KernelSource::Compiled("partial".to_string()));
    assert_eq!(source(FractalKind::Magnet2), KernelSource::Compiled("partial".to_string()));
    assert_eq!(source(FractalKind::Mandelbrot), KernelSource::Interpreted);
    assert_eq!(source(FractalKind::Magnet1), KernelSource::Unavailable);
    assert_eq!(source(FractalKind::Lambda), KernelSource::Unavailable);
}

#[test]
fn drifting_export_is_rejected() {
    let drifting = Export::escape(|cx, cy, max| {
        let v = fractalscope_compute::escape_time::celtic(cx, cy, max);
        if v < max as f64 {
            v + 1e-6
        } else {
            v
        }
    });
    let slot = BackendSlot::Loaded(Rc::new(ExportTable::new("drift").with("celtic", drifting)));

    let strict = resolve_kernel(
        FractalKind::Celtic,
        &slot,
        &SessionOptions::default(),
        &params(64),
    );
    assert_eq!(strict.source(), &KernelSource::Interpreted);

    let lenient = resolve_kernel(
        FractalKind::Celtic,
        &slot,
        &SessionOptions {
            validation_tolerance: 1e-3,
            ..SessionOptions::default()
        },
        &params(64),
    );
    assert_eq!(lenient.source(), &KernelSource::Compiled("drift".to_string()));
}
