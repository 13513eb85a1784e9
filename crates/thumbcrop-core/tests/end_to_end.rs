//! Full editor runs: bytes in, encoded circular crop out.

use proptest::prelude::*;
use thumbcrop_core::encode::encode_rgba;
use thumbcrop_core::{
    decode_image, Action, Completion, Editor, EditorConfig, ExportFormat, NumericField, Placement,
    Point, SourceImage,
};

const RED: [u8; 4] = [255, 0, 0, 255];
const GREEN: [u8; 4] = [0, 255, 0, 255];

/// Left half red, right half green.
fn split_image(width: u32, height: u32) -> SourceImage {
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for _ in 0..height {
        for x in 0..width {
            pixels.extend_from_slice(if x < width / 2 { &RED } else { &GREEN });
        }
    }
    SourceImage::new(width, height, pixels)
}

fn split_png(width: u32, height: u32) -> Vec<u8> {
    let image = split_image(width, height);
    encode_rgba(&image.pixels, width, height, ExportFormat::Png, [255; 3])
        .unwrap()
}

fn loaded_editor() -> Editor {
    let mut editor = Editor::new(EditorConfig::default()).unwrap();
    let completion = editor.load_bytes_now(&split_png(800, 400)).unwrap();
    assert_eq!(completion, Completion::Committed);
    editor
}

#[test]
fn test_landscape_image_placement() {
    let editor = loaded_editor();

    let placement = editor.placement();
    assert_eq!(placement, Placement::fit(800, 400, 400.0));
    assert_eq!(placement.scale_w, 1.0);
    assert_eq!(placement.scale_h, 0.5);
    assert_eq!(placement.origin(), Point::new(0.0, 100.0));
    assert_eq!(editor.draw_offset(), Point::new(0.0, 0.0));
}

#[test]
fn test_crop_shows_image_inside_circle() {
    let editor = loaded_editor();
    let crop = editor.crop();
    assert_eq!(crop.image().dimensions(), (100, 100));

    // Image band covers crop rows 25..75
    assert_eq!(crop.pixel(1, 50), RED);
    assert_eq!(crop.pixel(98, 50), GREEN);
    assert_eq!(crop.pixel(50, 10)[3], 0);
    assert_eq!(crop.pixel(50, 80)[3], 0);
    assert_eq!(crop.pixel(50, 50)[3], 255);
    assert_eq!(crop.pixel(50, 25)[3], 255);
    assert_eq!(crop.pixel(50, 24)[3], 0);

    // Corners are outside the circle
    assert_eq!(crop.pixel(0, 0)[3], 0);
    assert_eq!(crop.pixel(99, 99)[3], 0);
}

#[test]
fn test_exported_png_matches_crop_surface() {
    let editor = loaded_editor();
    let rendered = editor.rendered_crop().unwrap();
    assert_eq!(rendered.mime, "image/png");

    let decoded = decode_image(&rendered.bytes).unwrap();
    assert_eq!((decoded.width, decoded.height), (100, 100));
    assert_eq!(decoded.pixels, editor.crop().image().as_raw().to_vec());
}

#[test]
fn test_reset_returns_to_loaded_frame() {
    let mut editor = loaded_editor();
    let preview = editor.preview().image().clone();
    let crop = editor.crop().image().clone();
    let bytes = editor.rendered_crop().unwrap().bytes.clone();

    editor.dispatch_now(Action::SetZoom(2.5)).unwrap();
    editor
        .dispatch_now(Action::PointerDown(Point::new(10.0, 10.0)))
        .unwrap();
    editor
        .dispatch_now(Action::PointerMove(Point::new(60.0, -20.0)))
        .unwrap();
    editor.dispatch_now(Action::PointerLeave).unwrap();
    editor
        .dispatch_now(Action::Numeric(NumericField::PanY, "33".into()))
        .unwrap();
    assert_ne!(editor.crop().image(), &crop);

    editor.dispatch_now(Action::Reset).unwrap();
    assert!(editor.view().is_reset());
    assert_eq!(editor.preview().image(), &preview);
    assert_eq!(editor.crop().image(), &crop);
    assert_eq!(editor.rendered_crop().unwrap().bytes, bytes);
}

#[test]
fn test_zoom_zero_renders_nothing_in_crop() {
    let mut editor = loaded_editor();
    editor.dispatch_now(Action::SetZoom(0.0)).unwrap();
    assert!(editor.crop().image().pixels().all(|p| p.0[3] == 0));
}

#[test]
fn test_jpeg_export_is_flattened() {
    let config = EditorConfig {
        format: ExportFormat::Jpeg { quality: 90 },
        matte: [0, 0, 255],
        ..EditorConfig::default()
    };
    assert_eq!(config.download_filename(), "thumbnail.jpg");

    let mut editor = Editor::new(config).unwrap();
    editor.load_now(split_image(800, 400)).unwrap();

    let rendered = editor.rendered_crop().unwrap();
    assert_eq!(rendered.mime, "image/jpeg");

    // Transparent corners become the matte colour
    let decoded = decode_image(&rendered.bytes).unwrap();
    let corner = &decoded.pixels[0..4];
    assert!(corner[2] > 200 && corner[0] < 50 && corner[1] < 50);
    assert_eq!(corner[3], 255);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Property: nothing is ever drawn outside the inscribed circle of the crop.
    #[test]
    fn prop_crop_is_masked_to_circle(
        zoom in 0.0f64..6.0,
        pan_x in -300.0f64..300.0,
        pan_y in -300.0f64..300.0,
    ) {
        let mut editor = Editor::new(EditorConfig::default()).unwrap();
        editor.load_now(split_image(16, 8)).unwrap();
        editor.dispatch_now(Action::SetZoom(zoom)).unwrap();
        editor
            .dispatch_now(Action::SetPan(Point::new(pan_x, pan_y)))
            .unwrap();

        for (x, y, px) in editor.crop().image().enumerate_pixels() {
            let dx = x as f64 + 0.5 - 50.0;
            let dy = y as f64 + 0.5 - 50.0;
            if (dx * dx + dy * dy).sqrt() > 50.0 + 1e-9 {
                prop_assert_eq!(px.0[3], 0, "pixel ({}, {}) outside the circle", x, y);
            }
        }
    }
}
