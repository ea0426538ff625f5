use std::fs;
use std::path::PathBuf;

use bi1docs::content::ContentSource;
use bi1docs::rendering::paint::PaintCommand;
use bi1docs::rendering::raster::rasterize;
use bi1docs::{capture, CaptureOptions, DocumentSurface, SectionRegistry, SurfaceSnapshot, Viewport};

fn golden_path(name: &str) -> PathBuf {
    let mut p = PathBuf::from("tests/goldens/expected");
    p.push(name);
    p
}

fn surface() -> DocumentSurface {
    DocumentSurface::build(
        SectionRegistry::global(),
        &ContentSource::builtin(),
        Viewport { width: 320, height: 480 },
    )
    .expect("layout")
}

#[test]
fn capture_is_repeatable() {
    let s = surface();
    let a = capture(&s, &CaptureOptions::default()).expect("capture");
    s.scroll_to("power");
    let b = capture(&s, &CaptureOptions::default()).expect("capture");
    assert_eq!((a.width, a.height), (b.width, b.height));
    assert_eq!(a.digest(), b.digest());
}

#[test]
fn capture_has_white_background_and_brand_mark() {
    let s = surface();
    let img = capture(&s, &CaptureOptions::default()).expect("capture");
    assert_eq!(img.width, 640);
    assert_eq!(img.height, s.height() * 2);
    assert_eq!(img.pixels.get_pixel(0, 0).0, [255, 255, 255, 255]);
    // centre of the 80px cover mark, 8px below the top, at 2x
    let mark = img.pixels.get_pixel(320, (8 + 40) * 2).0;
    assert_eq!(mark, [37, 99, 235, 255]);
}

/// Two overlapping rects (one translucent) under two greeked glyphs.
fn greeked_snapshot() -> SurfaceSnapshot {
    SurfaceSnapshot {
        width: 16,
        height: 12,
        origin: None,
        commands: vec![
            PaintCommand::SolidRect {
                x: 2,
                y: 1,
                width: 6,
                height: 4,
                rgba: [37, 99, 235, 255],
            },
            PaintCommand::SolidRect {
                x: 4,
                y: 3,
                width: 10,
                height: 6,
                rgba: [0, 0, 0, 128],
            },
            PaintCommand::Text {
                x: 0,
                y: 0,
                text: "Hi".into(),
                size: 1,
                rgba: [20, 20, 20, 255],
            },
        ],
    }
}

#[test]
fn greeked_capture_pixels() {
    let img = rasterize(&greeked_snapshot(), &CaptureOptions::default()).expect("capture");
    assert_eq!((img.width, img.height), (32, 24));
    assert_eq!(img.pixels.get_pixel(1, 1).0, [255, 255, 255, 255]);
    // glyph cells
    assert_eq!(img.pixels.get_pixel(10, 7).0, [20, 20, 20, 255]);
    assert_eq!(img.pixels.get_pixel(20, 7).0, [20, 20, 20, 255]);
    // translucent black over the blue rect, then over white
    assert_eq!(img.pixels.get_pixel(15, 7).0, [18, 49, 117, 255]);
    assert_eq!(img.pixels.get_pixel(15, 12).0, [127, 127, 127, 255]);
}

#[test]
fn golden_capture_matches_fixture() {
    let img = rasterize(&greeked_snapshot(), &CaptureOptions::default()).expect("capture");
    let digest = img.digest();

    let expected_path = golden_path("greeked_16x12.sha256");
    if std::env::var("UPDATE_GOLDENS").is_ok() {
        fs::create_dir_all("tests/goldens/expected").ok();
        fs::write(&expected_path, format!("{}\n", digest)).expect("write golden");
        println!("Updated golden: {:?}", expected_path);
        return;
    }

    let exp = fs::read_to_string(&expected_path).expect("unable to read golden");
    assert_eq!(digest, exp.trim());
}
