//! Integration tests for pagination of composite rasters.

use answerspace::render::{slice_to_pages, stitch_long, CompositeRaster, OutputPage, SlicePolicy, PAPER};
use image::{Rgba, RgbaImage};
use proptest::prelude::*;

const WIDTH: u32 = 3;

/// Composite whose rows carry their global row number in the red/green channels.
fn numbered(page: usize, first_row: u32, height: u32) -> CompositeRaster {
    let image = RgbaImage::from_fn(WIDTH, height, |_, y| {
        let n = first_row + y;
        Rgba([(n & 0xff) as u8, (n >> 8) as u8, page as u8, 255])
    });
    CompositeRaster {
        page,
        image,
        scale: 1.0,
        spacers: Vec::new(),
    }
}

fn stream(heights: &[u32]) -> Vec<CompositeRaster> {
    let mut first = 0;
    heights
        .iter()
        .enumerate()
        .map(|(i, &h)| {
            let raster = numbered(i + 1, first, h);
            first += h;
            raster
        })
        .collect()
}

/// Global row numbers of the filled rows of a page.
fn row_numbers(page: &OutputPage) -> Vec<u32> {
    (0..page.filled_rows)
        .map(|y| {
            let p = page.image.get_pixel(0, y);
            p[0] as u32 | (p[1] as u32) << 8
        })
        .collect()
}

proptest! {
    #[test]
    fn test_continuous_slicing_is_seamless(
        heights in prop::collection::vec(0..300u32, 1..6),
        page_height in 1..200u32,
    ) {
        let rasters = stream(&heights);
        let pages = slice_to_pages(&rasters, WIDTH, page_height, SlicePolicy::Continuous).unwrap();

        let total: u32 = heights.iter().sum();
        prop_assert_eq!(pages.len() as u32, total.div_ceil(page_height));

        let rows: Vec<u32> = pages.iter().flat_map(row_numbers).collect();
        prop_assert_eq!(rows, (0..total).collect::<Vec<_>>());

        // Only the last page may be short.
        for page in pages.iter().rev().skip(1) {
            prop_assert_eq!(page.filled_rows, page_height);
        }
        for (i, page) in pages.iter().enumerate() {
            prop_assert_eq!(page.number, i + 1);
            prop_assert_eq!(page.image.dimensions(), (WIDTH, page_height));
        }
    }

    #[test]
    fn test_slicing_is_idempotent(
        heights in prop::collection::vec(0..300u32, 1..6),
        page_height in 1..200u32,
        independent in any::<bool>(),
    ) {
        let policy = if independent { SlicePolicy::Independent } else { SlicePolicy::Continuous };
        let rasters = stream(&heights);
        let first = slice_to_pages(&rasters, WIDTH, page_height, policy).unwrap();
        let second = slice_to_pages(&rasters, WIDTH, page_height, policy).unwrap();

        prop_assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            prop_assert_eq!(&a.image, &b.image);
        }
    }

    #[test]
    fn test_independent_pages_never_mix_sources(
        heights in prop::collection::vec(0..300u32, 1..6),
        page_height in 1..200u32,
    ) {
        let rasters = stream(&heights);
        let pages = slice_to_pages(&rasters, WIDTH, page_height, SlicePolicy::Independent).unwrap();

        let expected: u32 = heights.iter().map(|h| h.div_ceil(page_height).max(1)).sum();
        prop_assert_eq!(pages.len() as u32, expected);
        for page in &pages {
            prop_assert_eq!(page.sources.len(), 1);
            for y in page.filled_rows..page_height {
                prop_assert_eq!(*page.image.get_pixel(0, y), PAPER);
            }
        }
    }
}

#[test]
fn test_scenario_d_continuous() {
    let rasters = stream(&[1000, 500]);
    let pages = slice_to_pages(&rasters, WIDTH, 842, SlicePolicy::Continuous).unwrap();

    assert_eq!(pages.len(), 2);
    let second = &pages[1];
    assert_eq!(second.sources, vec![1, 2]);
    assert_eq!(second.filled_rows, 658);
    // Tail of page 1 followed directly by page 2.
    assert_eq!(*second.image.get_pixel(0, 157), Rgba([(999 & 0xff) as u8, 3, 1, 255]));
    assert_eq!(*second.image.get_pixel(0, 158), Rgba([(1000 & 0xff) as u8, 3, 2, 255]));
    assert_eq!(*second.image.get_pixel(0, 658), PAPER);
}

#[test]
fn test_scenario_e_independent() {
    let rasters = stream(&[1000, 500]);
    let pages = slice_to_pages(&rasters, WIDTH, 842, SlicePolicy::Independent).unwrap();

    assert_eq!(pages.len(), 3);
    assert_eq!(pages[0].sources, vec![1]);
    assert_eq!(pages[1].sources, vec![1]);
    assert_eq!(pages[1].filled_rows, 158);
    assert_eq!(pages[2].sources, vec![2]);
    assert_eq!(pages[2].filled_rows, 500);
}

#[test]
fn test_long_page_holds_whole_stream() {
    let rasters = stream(&[1000, 500]);
    let page = stitch_long(&rasters, WIDTH);
    assert_eq!(page.image.height(), 1500);
    assert_eq!(row_numbers(&page), (0..1500).collect::<Vec<_>>());
}

#[test]
fn test_zero_page_height_rejected() {
    let rasters = stream(&[10]);
    assert!(slice_to_pages(&rasters, WIDTH, 0, SlicePolicy::Continuous).is_err());
}
