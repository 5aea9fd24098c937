//! Integration tests for exporting documents from disk.

use answerspace::export::{export_document, export_document_with_progress, DirectorySink, OutputFormat};
use answerspace::model::{Project, Settings, Spacer, SpacerStore, SpacerStyle};
use answerspace::render::{ExportMode, ExportOptions, PATTERN_INK};
use answerspace::source::{ImageSequence, PageSize, PageSource, RasterPages};
use answerspace::{export_image_dir, Error};
use image::{Rgba, RgbaImage};
use std::path::Path;

const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);

fn write_pages(dir: &Path, count: usize, width: u32, height: u32) {
    for i in 1..=count {
        RgbaImage::from_pixel(width, height, INK)
            .save(dir.join(format!("scan-{:02}.png", i)))
            .unwrap();
    }
}

fn small_a4() -> ExportOptions {
    // One unit per pixel on a 60 x 84 page keeps images tiny.
    ExportOptions::new()
        .with_dpi(1.0)
        .with_page_size(PageSize::new(60.0, 84.0))
}

#[test]
fn test_export_image_dir_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("scans");
    std::fs::create_dir(&input).unwrap();
    write_pages(&input, 2, 60, 84);

    let mut store = SpacerStore::new();
    store
        .insert(1, Spacer::plain("1", 40.0, 42.0).with_style(SpacerStyle::Ruled))
        .unwrap();
    let project = dir.path().join("worksheet.json");
    Project::from_store(&store, 1.0, 1, "scans").save(&project).unwrap();

    let out = dir.path().join("out");
    let written = export_image_dir(&input, &project, &out, &small_a4(), OutputFormat::Png).unwrap();

    // 84 + 42 + 84 rows over 84-row pages.
    assert_eq!(written.len(), 3);
    let first = image::open(&written[0]).unwrap().to_rgba8();
    assert_eq!(first.dimensions(), (60, 84));
    assert_eq!(*first.get_pixel(10, 39), INK);
    assert_eq!(*first.get_pixel(10, 40), PATTERN_INK);
}

#[test]
fn test_long_mode_from_settings() {
    let mut settings = Settings {
        export_options: small_a4().with_mode(ExportMode::Long),
        ..Default::default()
    };
    settings
        .spacers
        .insert(2, vec![Spacer::plain("7", 0.0, 16.0)]);

    let json = settings.to_json().unwrap();
    let restored = Settings::from_json(&json).unwrap();
    let store = restored.spacer_store().unwrap();

    let pages = RasterPages::new(vec![RgbaImage::from_pixel(60, 84, INK), RgbaImage::from_pixel(60, 84, INK)]);
    let doc = export_document(&pages, &store, &restored.export_options).unwrap();

    assert_eq!(doc.page_count(), 1);
    assert_eq!(doc.pages[0].image.height(), 184);
    assert_eq!(doc.pages[0].sources, vec![1, 2]);
    assert_eq!(doc.stats.spacer_count, 1);
}

#[test]
fn test_unreadable_page_aborts_without_output() {
    let dir = tempfile::tempdir().unwrap();
    write_pages(dir.path(), 1, 60, 84);
    std::fs::write(dir.path().join("scan-02.png"), b"truncated").unwrap();

    let pages = ImageSequence::from_dir(dir.path()).unwrap();
    assert_eq!(pages.page_count(), 2);

    let mut progress = Vec::new();
    let result = export_document_with_progress(&pages, &SpacerStore::new(), &small_a4(), |p| progress.push(p.page));
    assert!(matches!(result, Err(Error::Rasterization { page: 2, .. })));
    assert_eq!(progress, vec![1]);
}

#[test]
fn test_pages_are_scaled_to_output_width() {
    // A 120 px wide scan on a 60 px wide output page is halved.
    let pages = RasterPages::new(vec![RgbaImage::from_pixel(120, 168, INK)]);
    let doc = export_document(&pages, &SpacerStore::new(), &small_a4()).unwrap();
    assert_eq!(doc.page_count(), 1);
    assert_eq!(doc.pages[0].filled_rows, 84);
}

#[test]
fn test_jpeg_quality_is_applied() {
    let pages = RasterPages::new(vec![RgbaImage::from_fn(60, 84, |x, y| {
        Rgba([(x * 4) as u8, (y * 3) as u8, ((x + y) * 2) as u8, 255])
    })]);
    let dir = tempfile::tempdir().unwrap();

    let mut sizes = Vec::new();
    for quality in [0.1, 0.95] {
        let doc = export_document(&pages, &SpacerStore::new(), &small_a4().with_quality(quality)).unwrap();
        let out = dir.path().join(format!("q{}", quality));
        let mut sink = DirectorySink::new(&out, OutputFormat::Jpeg, quality).unwrap();
        doc.write_to(&mut sink).unwrap();
        sizes.push(std::fs::metadata(out.join("page-0001.jpg")).unwrap().len());
    }
    assert!(sizes[0] < sizes[1]);
}

#[test]
fn test_failed_write_leaves_no_partial_output() {
    let pages = RasterPages::new(vec![RgbaImage::from_pixel(60, 84, INK), RgbaImage::from_pixel(60, 84, INK)]);
    let doc = export_document(&pages, &SpacerStore::new(), &small_a4()).unwrap();
    assert_eq!(doc.page_count(), 2);

    let dir = tempfile::tempdir().unwrap();
    // A directory where the second page belongs makes its write fail.
    std::fs::create_dir(dir.path().join("page-0002.png")).unwrap();

    let mut sink = DirectorySink::new(dir.path(), OutputFormat::Png, 0.8).unwrap();
    assert!(doc.write_to(&mut sink).is_err());
    assert!(sink.written().is_empty());
    assert!(!dir.path().join("page-0001.png").exists());
}
