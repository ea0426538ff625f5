use bi1docs::{assemble, paginate, Error, PageGeometry, RasterImage};
use image::RgbaImage;
use proptest::prelude::*;

/// Pages expected for a `w` x `h` surface on 210 x 295 pages, using integer
/// arithmetic: image height is 210h/w, so pages = ceil(42h / 59w), plus one
/// trailing page when the height lands exactly on a page boundary.
fn expected_pages(w: u64, h: u64) -> usize {
    let num = 42 * h;
    let den = 59 * w;
    let ceil = (num + den - 1) / den;
    let trailing = if num % den == 0 { 1 } else { 0 };
    (ceil + trailing) as usize
}

#[test]
fn documented_example_yields_three_pages() {
    // W=800, H=3000 captured at scale 2
    let image = RasterImage::new(RgbaImage::new(1600, 6000), 2);
    let doc = assemble(image, PageGeometry::default()).expect("assemble");
    assert_eq!(doc.image_height, 787.5);
    assert_eq!(doc.page_count(), 3);
}

#[test]
fn exact_page_multiple_does_not_fail() {
    // 590 mm tall once fitted: exactly two pages, plus the trailing blank one
    let (height, frames) = paginate(420, 1180, PageGeometry::default()).expect("paginate");
    assert_eq!(height, 590.0);
    assert!(frames.len() >= 2);
    assert_eq!(frames.len(), 3);
}

#[test]
fn zero_width_never_produces_a_document() {
    let image = RasterImage::new(RgbaImage::new(0, 500), 2);
    match assemble(image, PageGeometry::default()) {
        Err(Error::AssemblyError(msg)) => assert!(msg.contains("zero width")),
        other => panic!("expected AssemblyError, got {:?}", other.map(|d| d.page_count())),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn page_count_does_not_depend_on_scale(w in 1u32..2000, h in 0u32..20000, s in 1u32..5) {
        let g = PageGeometry::default();
        let base = g.page_count(w, h).unwrap();
        let scaled = g.page_count(w * s, h * s).unwrap();
        prop_assert_eq!(base, scaled);
    }

    #[test]
    fn page_count_matches_ceiling_formula(w in 1u32..2000, h in 1u32..20000) {
        let (_, frames) = paginate(w, h, PageGeometry::default()).unwrap();
        prop_assert_eq!(frames.len(), expected_pages(w as u64, h as u64));
    }

    #[test]
    fn frames_are_numbered_and_step_by_one_page(w in 1u32..2000, h in 0u32..20000) {
        let g = PageGeometry::default();
        let (_, frames) = paginate(w, h, g).unwrap();
        prop_assert!(!frames.is_empty());
        prop_assert_eq!(frames[0].offset, 0.0);
        for (i, f) in frames.iter().enumerate() {
            prop_assert_eq!(f.number, i + 1);
            let expected = -(i as f64) * g.page_height;
            prop_assert!((f.offset - expected).abs() < 1e-3);
        }
    }
}
