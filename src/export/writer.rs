//! Encoding of output pages and handing them to a destination.

use crate::error::Result;
use crate::render::OutputPage;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Image encoding of output pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Lossy, at the export quality
    #[default]
    Jpeg,

    /// Lossless
    Png,
}

impl OutputFormat {
    /// File extension without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }

    /// MIME type of encoded pages.
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
        }
    }
}

/// Encode one page. `quality` (0..=1) only affects JPEG.
pub fn encode_page(page: &OutputPage, format: OutputFormat, quality: f32) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    match format {
        OutputFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(page.image.clone()).to_rgb8();
            let quality = (quality * 100.0).round().clamp(1.0, 100.0) as u8;
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
            encoder.write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)?;
        }
        OutputFormat::Png => {
            page.image
                .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
        }
    }
    Ok(buf)
}

/// File name of an output page, e.g. `page-0001.jpg`.
pub fn page_file_name(number: usize, format: OutputFormat) -> String {
    format!("page-{:04}.{}", number, format.extension())
}

/// Destination of exported pages (the document assembler).
pub trait PageSink {
    /// Accept the next page, in output order.
    fn accept(&mut self, page: &OutputPage) -> Result<()>;

    /// Called once after the last page.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }

    /// Called instead of `finish` when a page could not be accepted.
    /// Discards whatever the sink already persisted.
    fn abort(&mut self) {}
}

/// Writes each page as an image file into a directory.
#[derive(Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    format: OutputFormat,
    quality: f32,
    written: Vec<PathBuf>,
    created_dir: bool,
}

impl DirectorySink {
    /// Create the sink, creating `dir` if needed.
    pub fn new<P: AsRef<Path>>(dir: P, format: OutputFormat, quality: f32) -> Result<Self> {
        let dir = dir.as_ref();
        let created_dir = !dir.exists();
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            format,
            quality,
            written: Vec::new(),
            created_dir,
        })
    }

    /// Paths written so far.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// Consume the sink, returning the written paths.
    pub fn into_written(self) -> Vec<PathBuf> {
        self.written
    }
}

impl PageSink for DirectorySink {
    fn accept(&mut self, page: &OutputPage) -> Result<()> {
        let bytes = encode_page(page, self.format, self.quality)?;
        let path = self.dir.join(page_file_name(page.number, self.format));
        std::fs::write(&path, bytes)?;
        log::debug!("wrote {}", path.display());
        self.written.push(path);
        Ok(())
    }

    fn abort(&mut self) {
        for path in self.written.drain(..) {
            if let Err(e) = std::fs::remove_file(&path) {
                log::warn!("failed to remove {}: {}", path.display(), e);
            }
        }
        if self.created_dir {
            // Only succeeds when nothing else landed in the directory.
            let _ = std::fs::remove_dir(&self.dir);
        }
    }
}

/// Keeps encoded pages in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    format: OutputFormat,
    quality: f32,
    /// Encoded pages in output order
    pub pages: Vec<Vec<u8>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new(format: OutputFormat, quality: f32) -> Self {
        Self {
            format,
            quality,
            pages: Vec::new(),
        }
    }
}

impl PageSink for MemorySink {
    fn accept(&mut self, page: &OutputPage) -> Result<()> {
        self.pages.push(encode_page(page, self.format, self.quality)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{PageSlicer, SlicePolicy};
    use image::{Rgba, RgbaImage};

    fn page() -> OutputPage {
        let mut slicer = PageSlicer::new(8, 8, SlicePolicy::Independent).unwrap();
        slicer
            .push(1, &RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 255])))
            .remove(0)
    }

    #[test]
    fn test_file_names() {
        assert_eq!(page_file_name(1, OutputFormat::Jpeg), "page-0001.jpg");
        assert_eq!(page_file_name(12, OutputFormat::Png), "page-0012.png");
    }

    #[test]
    fn test_encode_jpeg() {
        let bytes = encode_page(&page(), OutputFormat::Jpeg, 0.8).unwrap();
        assert!(bytes.starts_with(&[0xFF, 0xD8]));
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 8));
    }

    #[test]
    fn test_encode_png_is_lossless() {
        let bytes = encode_page(&page(), OutputFormat::Png, 0.1).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded, page().image);
    }

    #[test]
    fn test_directory_sink() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let mut sink = DirectorySink::new(&out, OutputFormat::Png, 0.8).unwrap();
        sink.accept(&page()).unwrap();
        sink.finish().unwrap();

        assert_eq!(sink.written(), &[out.join("page-0001.png")]);
        assert!(out.join("page-0001.png").exists());
    }

    #[test]
    fn test_directory_sink_creates_nested_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("a").join("b");
        let mut sink = DirectorySink::new(&out, OutputFormat::Jpeg, 0.8).unwrap();
        sink.accept(&page()).unwrap();
        assert!(out.join("page-0001.jpg").exists());
    }

    #[test]
    fn test_abort_removes_written_pages() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let mut sink = DirectorySink::new(&out, OutputFormat::Png, 0.8).unwrap();
        sink.accept(&page()).unwrap();
        sink.abort();

        assert!(sink.written().is_empty());
        assert!(!out.join("page-0001.png").exists());
        assert!(!out.exists());
    }

    #[test]
    fn test_abort_keeps_existing_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "keep").unwrap();
        let mut sink = DirectorySink::new(dir.path(), OutputFormat::Png, 0.8).unwrap();
        sink.accept(&page()).unwrap();
        sink.abort();

        assert!(!dir.path().join("page-0001.png").exists());
        assert!(dir.path().join("notes.txt").exists());
    }
}
