//! # answerspace
//!
//! Insert answer space into existing documents.
//!
//! This library takes the rendered pages of a document, inserts fixed-height
//! spacer blocks (blank, ruled, dot-grid or squared) at chosen offsets, reflows
//! the original content below them and re-paginates the result into
//! fixed-size output pages.
//!
//! ## Quick Start
//!
//! ```no_run
//! use answerspace::{export_project, ExportOptions};
//! use answerspace::source::ImageSequence;
//!
//! fn main() -> answerspace::Result<()> {
//!     let pages = ImageSequence::from_dir("./scans")?;
//!     let doc = export_project(&pages, "worksheet.json", &ExportOptions::default())?;
//!     println!("{} output pages", doc.page_count());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Segment planning**: original content split around spacers, offsets stay
//!   in original page coordinates
//! - **Patterned spacers**: plain, ruled, dot grid and squared paper
//! - **Pagination**: continuous flow across source pages, per-page, or one
//!   long page
//! - **Interactive editing**: render tokens, coalesced edits and two-phase
//!   drag/resize for viewers
//! - **Async rendering**: optional tokio-backed background renders (`async` feature)

pub mod editor;
pub mod error;
pub mod export;
pub mod layout;
pub mod model;
pub mod render;
pub mod source;

// Re-export commonly used types
pub use editor::{CommitMode, Editor, EditorState, Effect, PendingAdjustment, Tool};
pub use error::{Error, Result};
pub use export::{
    export_document, export_document_with_progress, DirectorySink, ExportProgress, ExportStats, ExportedDocument,
    OutputFormat, PageSink,
};
pub use layout::{plan_segments, reflowed_height, Segment};
pub use model::{Project, Settings, Spacer, SpacerPreset, SpacerProperty, SpacerStore, SpacerStyle};
pub use render::{
    build_composite, slice_to_pages, CompositeRaster, ExportMode, ExportOptions, OutputPage, RenderCoordinator,
    SlicePolicy, ViewOptions,
};
pub use source::{ImageSequence, PageSize, PageSource, RasterPages};

use std::path::{Path, PathBuf};

/// Load a project file and return its validated spacers.
///
/// # Example
///
/// ```no_run
/// use answerspace::load_spacers;
///
/// let store = load_spacers("worksheet.json").unwrap();
/// println!("Spacers: {}", store.len());
/// ```
pub fn load_spacers<P: AsRef<Path>>(path: P) -> Result<SpacerStore> {
    let project = Project::load(path)?;
    project.spacer_store()
}

/// Export a document with the spacers of a project file.
///
/// # Arguments
///
/// * `source` - The document's pages
/// * `project` - Path to the project file
/// * `options` - Export options
pub fn export_project<S, P>(source: &S, project: P, options: &ExportOptions) -> Result<ExportedDocument>
where
    S: PageSource + ?Sized,
    P: AsRef<Path>,
{
    let store = load_spacers(project)?;
    export_document(source, &store, options)
}

/// Export a directory of page images into a directory of output images.
///
/// Nothing is written unless every page exported successfully.
///
/// # Example
///
/// ```no_run
/// use answerspace::{export_image_dir, ExportOptions, OutputFormat};
///
/// let written = export_image_dir("./scans", "worksheet.json", "./out", &ExportOptions::default(), OutputFormat::Jpeg)?;
/// println!("wrote {} pages", written.len());
/// # Ok::<(), answerspace::Error>(())
/// ```
pub fn export_image_dir<P, Q, R>(
    input_dir: P,
    project: Q,
    output_dir: R,
    options: &ExportOptions,
    format: OutputFormat,
) -> Result<Vec<PathBuf>>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    R: AsRef<Path>,
{
    let pages = ImageSequence::from_dir(input_dir)?;
    let doc = export_project(&pages, project, options)?;
    let mut sink = DirectorySink::new(output_dir, format, options.output_quality)?;
    doc.write_to(&mut sink)?;
    Ok(sink.into_written())
}

/// Builder for exporting documents with answer space.
///
/// # Example
///
/// ```no_run
/// use answerspace::{Answerspace, ImageSequence};
///
/// let pages = ImageSequence::from_dir("./scans")?;
/// let written = Answerspace::new()
///     .with_dpi(3.0)
///     .independent()
///     .with_project("worksheet.json")?
///     .export(&pages)?
///     .write_to_dir("./out")?;
/// # Ok::<(), answerspace::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Answerspace {
    store: SpacerStore,
    options: ExportOptions,
    format: OutputFormat,
}

impl Answerspace {
    /// Create a new builder with no spacers and default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use these spacers.
    pub fn with_spacers(mut self, store: SpacerStore) -> Self {
        self.store = store;
        self
    }

    /// Load spacers from a project file.
    pub fn with_project<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        self.store = load_spacers(path)?;
        Ok(self)
    }

    /// Replace all export options.
    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the export mode.
    pub fn with_mode(mut self, mode: ExportMode) -> Self {
        self.options = self.options.with_mode(mode);
        self
    }

    /// Export as one long page.
    pub fn long(self) -> Self {
        self.with_mode(ExportMode::Long)
    }

    /// Start every source page on a new output page.
    pub fn independent(mut self) -> Self {
        self.options = self.options.independent();
        self
    }

    /// Set the rasterization multiplier.
    pub fn with_dpi(mut self, dpi: f32) -> Self {
        self.options = self.options.with_dpi(dpi);
        self
    }

    /// Set the JPEG quality (0..=1).
    pub fn with_quality(mut self, quality: f32) -> Self {
        self.options = self.options.with_quality(quality);
        self
    }

    /// Set the output page size.
    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.options = self.options.with_page_size(page_size);
        self
    }

    /// Set the image encoding of written pages.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Export a document.
    pub fn export<S: PageSource + ?Sized>(self, source: &S) -> Result<AnswerspaceResult> {
        let document = export_document(source, &self.store, &self.options)?;
        Ok(AnswerspaceResult {
            document,
            format: self.format,
        })
    }
}

/// Result of an export.
#[derive(Debug, Clone)]
pub struct AnswerspaceResult {
    /// The exported document
    pub document: ExportedDocument,
    /// Encoding used when writing
    format: OutputFormat,
}

impl AnswerspaceResult {
    /// Write the pages as image files into `dir`.
    pub fn write_to_dir<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<PathBuf>> {
        let mut sink = DirectorySink::new(dir, self.format, self.document.options.output_quality)?;
        self.document.write_to(&mut sink)?;
        Ok(sink.into_written())
    }

    /// Number of output pages.
    pub fn page_count(&self) -> usize {
        self.document.page_count()
    }

    /// Get the document.
    pub fn document(&self) -> &ExportedDocument {
        &self.document
    }
}
