// tests/end_to_end.rs
// Full capture runs on a real device: static frame, rotation sweep, padded readback, bad shader,
// oversized target.
// Each test is skipped when the machine has no usable graphics adapter.

use sphere_capture::{
    App, Error, Gpu, RenderConfig, RenderMode, Renderer, SphereStrategy, SHADER_SOURCE,
};

fn gpu_or_skip() -> Option<Gpu> {
    match Gpu::new() {
        Ok(gpu) => Some(gpu),
        Err(Error::DeviceUnavailable(reason)) => {
            eprintln!("skipping: no graphics device ({reason})");
            None
        }
        Err(other) => panic!("unexpected device error: {other}"),
    }
}

/// The clear color (0.1, 0.2, 0.3) after sRGB encoding.
const CLEAR_SRGB: [u8; 3] = [89, 124, 149];

fn is_clear(pixel: &image::Rgb<u8>) -> bool {
    pixel
        .0
        .iter()
        .zip(CLEAR_SRGB)
        .all(|(&actual, expected)| actual.abs_diff(expected) <= 2)
}

fn decode(path: &std::path::Path) -> image::RgbImage {
    let decoded = image::open(path).expect("output is a readable PNG");
    assert_eq!(decoded.color(), image::ColorType::Rgb8);
    decoded.to_rgb8()
}

#[test]
fn static_stacked_sphere_writes_one_frame() {
    let Some(gpu) = gpu_or_skip() else { return };
    let dir = tempfile::tempdir().unwrap();
    let config = RenderConfig {
        segments: 20,
        out_dir: dir.path().to_path_buf(),
        ..RenderConfig::for_strategy(SphereStrategy::Stacked)
    };

    let renderer = Renderer::new(gpu, &config, SHADER_SOURCE).unwrap();
    assert_eq!(renderer.vertex_count(), 882);
    assert_eq!(renderer.index_count(), 2520);

    let path = config.frame_path(None);
    renderer.render_to_png(&path).unwrap();
    renderer.shutdown();

    let files: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(files.len(), 1);

    let image = decode(&path);
    assert_eq!(image.dimensions(), (1000, 1000));
    assert!(is_clear(image.get_pixel(0, 0)));
    assert!(!is_clear(image.get_pixel(500, 500)), "sphere missing from the centre");
}

#[test]
fn rotation_sweep_writes_37_frames() {
    let Some(gpu) = gpu_or_skip() else { return };
    let dir = tempfile::tempdir().unwrap();
    let config = RenderConfig {
        mode: RenderMode::Sweep { step_degrees: 10 },
        out_dir: dir.path().to_path_buf(),
        ..RenderConfig::for_strategy(SphereStrategy::Grid)
    };

    let report = App::new(config.clone(), SHADER_SOURCE).run_on(gpu).unwrap();
    assert_eq!(report.written.len(), 37);
    assert!(report.failed.is_empty());

    for angle in (0..=360).step_by(10) {
        let image = decode(&dir.path().join(format!("{angle}.png")));
        assert_eq!(image.dimensions(), (1000, 1000));
        assert!(!is_clear(image.get_pixel(500, 500)), "frame {angle} is blank");
    }
}

#[test]
fn padded_rows_are_stripped_for_odd_widths() {
    let Some(gpu) = gpu_or_skip() else { return };
    let dir = tempfile::tempdir().unwrap();
    let config = RenderConfig {
        width: 300,
        height: 200,
        row_alignment: 512,
        out_dir: dir.path().to_path_buf(),
        ..RenderConfig::for_strategy(SphereStrategy::Grid)
    };

    let report = App::new(config, SHADER_SOURCE).run_on(gpu).unwrap();
    let image = decode(&report.written[0]);
    assert_eq!(image.dimensions(), (300, 200));
    for (x, y) in [(0, 0), (299, 0), (0, 199), (299, 199)] {
        assert!(is_clear(image.get_pixel(x, y)), "corner ({x}, {y}) is not background");
    }
    assert!(!is_clear(image.get_pixel(150, 100)));
}

#[test]
fn invalid_shader_is_a_validation_error() {
    let Some(gpu) = gpu_or_skip() else { return };
    let config = RenderConfig::for_strategy(SphereStrategy::Grid);

    let result = Renderer::new(gpu, &config, "@vertex fn vs_main( -> {");
    assert!(matches!(result, Err(Error::Validation(_))));
}

#[test]
fn oversized_target_is_rejected_before_allocation() {
    let Some(gpu) = gpu_or_skip() else { return };
    let max = gpu.device.limits().max_texture_dimension_2d;
    let config = RenderConfig {
        width: max + 1,
        ..RenderConfig::for_strategy(SphereStrategy::Grid)
    };

    let result = Renderer::new(gpu, &config, SHADER_SOURCE);
    assert!(matches!(result, Err(Error::InvalidConfig(_))));
}
