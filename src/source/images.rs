//! Page source that treats a list of image files as document pages.

use super::{check_page, scaled_dimensions, PageSize, PageSource};
use crate::error::{Error, Result};
use image::imageops::FilterType;
use image::RgbaImage;
use std::cmp::Ordering;
use std::iter::Peekable;
use std::path::{Path, PathBuf};
use std::str::Chars;

/// A document made of one image file per page (scans, exported page renders).
///
/// Natural page size is the image's pixel size; files are decoded lazily on
/// every rasterization so only one page is held in memory at a time.
#[derive(Debug, Clone, Default)]
pub struct ImageSequence {
    paths: Vec<PathBuf>,
}

impl ImageSequence {
    /// Create a sequence from page image paths in page order.
    pub fn new<P: Into<PathBuf>>(paths: impl IntoIterator<Item = P>) -> Self {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Collect the PNG and JPEG files of a directory, in natural file name
    /// order (`page-2.png` before `page-10.png`).
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let is_image = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| matches!(e.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg"))
                .unwrap_or(false);
            if is_image {
                paths.push(path);
            }
        }
        paths.sort_by(|a, b| natural_cmp(&file_name(a), &file_name(b)).then_with(|| a.cmp(b)));
        log::debug!("found {} page images", paths.len());
        Ok(Self { paths })
    }

    /// Page image paths.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Compare names with digit runs ordered by value, case-insensitively otherwise.
fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut a_chars = a.chars().peekable();
    let mut b_chars = b.chars().peekable();

    loop {
        match (a_chars.peek(), b_chars.peek()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(&ac), Some(&bc)) => {
                if ac.is_ascii_digit() && bc.is_ascii_digit() {
                    match collect_number(&mut a_chars).cmp(&collect_number(&mut b_chars)) {
                        Ordering::Equal => continue,
                        other => return other,
                    }
                }
                match ac.to_ascii_lowercase().cmp(&bc.to_ascii_lowercase()) {
                    Ordering::Equal => {
                        a_chars.next();
                        b_chars.next();
                    }
                    other => return other,
                }
            }
        }
    }
}

fn collect_number(chars: &mut Peekable<Chars<'_>>) -> u64 {
    let mut num: u64 = 0;
    while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
        num = num.saturating_mul(10).saturating_add(digit as u64);
        chars.next();
    }
    num
}

impl PageSource for ImageSequence {
    fn page_count(&self) -> usize {
        self.paths.len()
    }

    fn page_size(&self, page: usize) -> Result<PageSize> {
        check_page(page, self.paths.len())?;
        let (w, h) = image::image_dimensions(&self.paths[page - 1])
            .map_err(|e| Error::rasterization(page, e.to_string()))?;
        Ok(PageSize::new(w as f32, h as f32))
    }

    fn rasterize(&self, page: usize, scale: f32) -> Result<RgbaImage> {
        check_page(page, self.paths.len())?;
        let path = &self.paths[page - 1];
        let decoded = image::open(path).map_err(|e| {
            log::warn!("failed to decode {}: {}", path.display(), e);
            Error::rasterization(page, e.to_string())
        })?;

        let size = PageSize::new(decoded.width() as f32, decoded.height() as f32);
        let (w, h) = scaled_dimensions(size, scale);
        if (w, h) == (decoded.width(), decoded.height()) {
            return Ok(decoded.to_rgba8());
        }
        Ok(decoded.resize_exact(w, h, FilterType::Triangle).to_rgba8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_reads_pages_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        RgbaImage::from_pixel(30, 40, Rgba([10, 20, 30, 255]))
            .save(dir.path().join("b.png"))
            .unwrap();
        RgbaImage::from_pixel(20, 10, Rgba([10, 20, 30, 255]))
            .save(dir.path().join("a.png"))
            .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let source = ImageSequence::from_dir(dir.path()).unwrap();
        assert_eq!(source.page_count(), 2);
        assert_eq!(source.page_size(1).unwrap(), PageSize::new(20.0, 10.0));
        assert_eq!(source.rasterize(2, 0.5).unwrap().dimensions(), (15, 20));
    }

    #[test]
    fn test_dir_pages_in_numeric_order() {
        let dir = tempfile::tempdir().unwrap();
        RgbaImage::from_pixel(10, 100, Rgba([0, 0, 0, 255]))
            .save(dir.path().join("page-10.png"))
            .unwrap();
        RgbaImage::from_pixel(10, 20, Rgba([0, 0, 0, 255]))
            .save(dir.path().join("page-2.png"))
            .unwrap();

        let source = ImageSequence::from_dir(dir.path()).unwrap();
        let names: Vec<_> = source.paths().iter().map(|p| file_name(p)).collect();
        assert_eq!(names, ["page-2.png", "page-10.png"]);
        assert_eq!(source.page_size(1).unwrap().height, 20.0);
        assert_eq!(source.page_size(2).unwrap().height, 100.0);
    }

    #[test]
    fn test_natural_cmp() {
        assert_eq!(natural_cmp("scan-9.jpg", "scan-10.jpg"), Ordering::Less);
        assert_eq!(natural_cmp("Page-3.png", "page-3.png"), Ordering::Equal);
        assert_eq!(natural_cmp("b.png", "a10.png"), Ordering::Greater);
    }

    #[test]
    fn test_missing_file_is_rasterization_error() {
        let source = ImageSequence::new(vec!["/nonexistent/page.png"]);
        assert!(matches!(
            source.rasterize(1, 1.0),
            Err(Error::Rasterization { page: 1, .. })
        ));
    }
}
