//! Editing session: the state behind the interactive viewer.
//!
//! Every handler takes the explicit [`EditorState`] through `&mut self` and
//! returns an [`Effect`] telling the host what to do next. Changes that alter
//! the rendered document issue a fresh render token; edits made through the
//! properties panel can instead be coalesced to one render per frame.
//!
//! # Example
//!
//! ```
//! use answerspace::editor::{Editor, Effect, Tool};
//!
//! let mut editor = Editor::new(3);
//! editor.set_tool(Tool::AddSpace);
//! let effect = editor.page_click(1, 250.0).unwrap();
//! assert!(matches!(effect, Effect::Render(_)));
//! assert_eq!(editor.store().len(), 1);
//! ```

mod adjust;
mod schedule;

pub use adjust::{AdjustmentKind, AdjustmentOutcome, Ghost, PendingAdjustment, DRAG_THRESHOLD_PX};
pub use schedule::FrameScheduler;

use crate::error::{Error, Result};
use crate::layout::to_source_y;
use crate::model::{Project, Settings, SpacerPreset, SpacerProperty, SpacerStore};
use crate::render::{clamp_zoom, ExportOptions, RenderAttempt, RenderCoordinator, ViewOptions};

/// Zoom step for zoom in/out.
pub const ZOOM_STEP: f32 = 1.2;

/// Horizontal room kept free around the page when fitting to width.
pub const FIT_MARGIN_PX: f32 = 40.0;

/// Smallest page width fit-to-width will aim for.
pub const MIN_FIT_WIDTH_PX: f32 = 100.0;

/// Active pointer tool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tool {
    /// Select and adjust existing spacers
    #[default]
    Select,
    /// Insert a spacer where the page is clicked
    AddSpace,
}

/// How a property edit reaches the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitMode {
    /// Render right away
    Immediate,
    /// Render on the next animation frame together with other edits
    Coalesced,
}

/// What the host has to do after a handler ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Nothing visible changed
    None,
    /// Start this render
    Render(RenderAttempt),
    /// A render is scheduled for the next frame
    Scheduled,
}

/// UI state of an editing session.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    /// Active tool
    pub tool: Tool,

    /// 1-indexed current page
    pub current_page: usize,

    /// Pages in the document
    pub page_count: usize,

    /// Viewer zoom
    pub scale: f32,

    /// Output page-break guides are shown
    pub show_page_breaks: bool,

    /// Insertion guide follows the pointer
    pub show_placement_guide: bool,

    /// Selected spacer
    pub selected: Option<String>,

    /// Style copied into new spacers
    pub last_preset: SpacerPreset,

    /// Last used export configuration
    pub export_options: ExportOptions,
}

impl EditorState {
    /// State for a freshly opened document.
    pub fn new(page_count: usize) -> Self {
        Self {
            tool: Tool::Select,
            current_page: 1,
            page_count,
            scale: 1.0,
            show_page_breaks: false,
            show_placement_guide: false,
            selected: None,
            last_preset: SpacerPreset::default(),
            export_options: ExportOptions::default(),
        }
    }
}

/// An editing session over one document.
#[derive(Debug, Clone)]
pub struct Editor {
    store: SpacerStore,
    state: EditorState,
    coordinator: RenderCoordinator,
    frames: FrameScheduler,
}

impl Editor {
    /// Start editing a document with `page_count` pages.
    pub fn new(page_count: usize) -> Self {
        Self {
            store: SpacerStore::new(),
            state: EditorState::new(page_count),
            coordinator: RenderCoordinator::new(),
            frames: FrameScheduler::new(),
        }
    }

    /// Restore a session from persisted settings.
    pub fn from_settings(settings: &Settings, page_count: usize) -> Result<Self> {
        let mut editor = Self::new(page_count);
        editor.store = settings.spacer_store()?;
        editor.state.scale = clamp_zoom(settings.scale);
        editor.state.current_page = clamp_page(settings.current_page, page_count);
        editor.state.show_page_breaks = settings.show_page_breaks;
        editor.state.show_placement_guide = settings.show_placement_guide;
        editor.state.last_preset = settings.last_spacer_preset;
        editor.state.export_options = settings.export_options.clone();
        Ok(editor)
    }

    /// Snapshot the session for persistence.
    pub fn settings(&self) -> Settings {
        Settings {
            spacers: self.store.to_pages(),
            scale: self.state.scale,
            current_page: self.state.current_page,
            show_page_breaks: self.state.show_page_breaks,
            show_placement_guide: self.state.show_placement_guide,
            last_spacer_preset: self.state.last_preset,
            export_options: self.state.export_options.clone(),
        }
    }

    /// Snapshot the spacer layout as a project file.
    pub fn project(&self, pdf_name: impl Into<String>) -> Project {
        Project::from_store(&self.store, self.state.scale, self.state.current_page, pdf_name)
    }

    /// Replace the spacer layout with a loaded project.
    pub fn apply_project(&mut self, project: &Project) -> Result<Effect> {
        self.store = project.spacer_store()?;
        self.state.scale = clamp_zoom(project.scale);
        self.state.current_page = clamp_page(project.current_page, self.state.page_count);
        self.state.selected = None;
        log::info!("loaded project {:?} with {} spacers", project.pdf_name, self.store.len());
        Ok(self.render())
    }

    /// The spacers.
    pub fn store(&self) -> &SpacerStore {
        &self.store
    }

    /// The UI state.
    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// The render coordinator shared with render tasks.
    pub fn coordinator(&self) -> &RenderCoordinator {
        &self.coordinator
    }

    /// View options matching the current state.
    pub fn view_options(&self) -> ViewOptions {
        ViewOptions::new()
            .with_scale(self.state.scale)
            .with_page_breaks(self.state.show_page_breaks)
    }

    /// Export options with the last used settings.
    pub fn export_options(&self) -> &ExportOptions {
        &self.state.export_options
    }

    /// Remember the export configuration.
    pub fn set_export_options(&mut self, options: ExportOptions) -> Result<()> {
        options.validate()?;
        self.state.export_options = options;
        Ok(())
    }

    /// Issue a render token for the current state.
    pub fn render(&mut self) -> Effect {
        Effect::Render(self.coordinator.begin())
    }

    /// Switch tools.
    pub fn set_tool(&mut self, tool: Tool) {
        self.state.tool = tool;
    }

    /// Jump to a page. Out-of-range targets are ignored.
    pub fn go_to_page(&mut self, page: usize) -> Effect {
        if page == 0 || page > self.state.page_count || page == self.state.current_page {
            return Effect::None;
        }
        self.state.current_page = page;
        self.render()
    }

    /// Go to the next page.
    pub fn next_page(&mut self) -> Effect {
        self.go_to_page(self.state.current_page + 1)
    }

    /// Go to the previous page.
    pub fn previous_page(&mut self) -> Effect {
        self.go_to_page(self.state.current_page.saturating_sub(1))
    }

    /// Set the zoom, clamped to the supported range.
    pub fn set_zoom(&mut self, scale: f32) -> Effect {
        let scale = clamp_zoom(scale);
        if scale == self.state.scale {
            return Effect::None;
        }
        self.state.scale = scale;
        self.render()
    }

    /// Zoom in one step.
    pub fn zoom_in(&mut self) -> Effect {
        self.set_zoom(self.state.scale * ZOOM_STEP)
    }

    /// Zoom out one step.
    pub fn zoom_out(&mut self) -> Effect {
        self.set_zoom(self.state.scale / ZOOM_STEP)
    }

    /// Zoom so the first page fills a container of `container_width` pixels.
    pub fn fit_to_width(&mut self, container_width: f32, first_page_width: f32) -> Effect {
        if !first_page_width.is_finite() || first_page_width <= 0.0 {
            return Effect::None;
        }
        let available = (container_width - FIT_MARGIN_PX).max(MIN_FIT_WIDTH_PX);
        self.set_zoom(available / first_page_width)
    }

    /// Show or hide output page-break guides.
    pub fn toggle_page_breaks(&mut self) -> Effect {
        self.state.show_page_breaks = !self.state.show_page_breaks;
        self.render()
    }

    /// Show or hide the insertion guide. The document itself is unchanged.
    pub fn toggle_placement_guide(&mut self) {
        self.state.show_placement_guide = !self.state.show_placement_guide;
    }

    /// Handle a click on a page at `display_y` pixels below the page top.
    ///
    /// With [`Tool::AddSpace`] a spacer is inserted at the original offset
    /// under the pointer; with [`Tool::Select`] the selection is cleared.
    pub fn page_click(&mut self, page: usize, display_y: f32) -> Result<Effect> {
        if page == 0 || page > self.state.page_count {
            return Err(Error::PageOutOfRange(page, self.state.page_count));
        }
        match self.state.tool {
            Tool::Select => {
                self.state.selected = None;
                Ok(Effect::None)
            }
            Tool::AddSpace => {
                let y = to_source_y(display_y / self.state.scale, self.store.spacers_on(page));
                let id = self.store.create(page, y, &self.state.last_preset)?.id.clone();
                log::debug!("inserted spacer {} on page {} at y={}", id, page, y);
                self.state.selected = Some(id);
                Ok(self.render())
            }
        }
    }

    /// Select a spacer.
    pub fn select(&mut self, id: &str) -> Result<()> {
        if self.store.get(id).is_none() {
            return Err(Error::SpacerNotFound(id.to_string()));
        }
        self.state.selected = Some(id.to_string());
        Ok(())
    }

    /// Clear the selection.
    pub fn deselect(&mut self) {
        self.state.selected = None;
    }

    /// Delete a spacer.
    pub fn delete(&mut self, id: &str) -> Result<Effect> {
        self.store.remove(id)?;
        if self.state.selected.as_deref() == Some(id) {
            self.state.selected = None;
        }
        Ok(self.render())
    }

    /// Delete the selected spacer, if any.
    pub fn delete_selected(&mut self) -> Result<Effect> {
        match self.state.selected.clone() {
            Some(id) => self.delete(&id),
            None => Ok(Effect::None),
        }
    }

    /// Duplicate a spacer and select the copy.
    pub fn duplicate(&mut self, id: &str) -> Result<Effect> {
        let copy = self.store.duplicate(id)?.id.clone();
        self.state.selected = Some(copy);
        Ok(self.render())
    }

    /// Edit a spacer property from the properties panel.
    ///
    /// Style and pitch edits also become the preset for new spacers.
    pub fn set_property(&mut self, id: &str, property: SpacerProperty, mode: CommitMode) -> Result<Effect> {
        self.store.update(id, &property)?;
        self.state.last_preset.remember(&property);
        match mode {
            CommitMode::Immediate => Ok(self.render()),
            CommitMode::Coalesced => {
                self.frames.request();
                Ok(Effect::Scheduled)
            }
        }
    }

    /// Run the animation frame: start the coalesced render, if one is pending.
    pub fn on_animation_frame(&mut self) -> Effect {
        if self.frames.fire() {
            self.render()
        } else {
            Effect::None
        }
    }

    /// Press on a spacer body: start a possible drag.
    pub fn begin_drag(&self, id: &str) -> Result<PendingAdjustment> {
        PendingAdjustment::begin(&self.store, id, AdjustmentKind::Move, self.state.scale)
    }

    /// Press on a spacer's resize handle.
    pub fn begin_resize(&self, id: &str) -> Result<PendingAdjustment> {
        PendingAdjustment::begin(&self.store, id, AdjustmentKind::Resize, self.state.scale)
    }

    /// Pointer release: commit the adjustment, or select on a plain click.
    pub fn commit_adjustment(&mut self, adjustment: PendingAdjustment) -> Result<Effect> {
        match adjustment.commit(&mut self.store)? {
            AdjustmentOutcome::Committed { id, .. } => {
                self.state.selected = Some(id);
                Ok(self.render())
            }
            AdjustmentOutcome::Clicked(id) => {
                self.state.selected = Some(id);
                Ok(Effect::None)
            }
        }
    }

    /// Remove every spacer.
    pub fn clear_all(&mut self) -> Effect {
        self.store.clear();
        self.state.selected = None;
        self.render()
    }
}

fn clamp_page(page: usize, page_count: usize) -> usize {
    page.clamp(1, page_count.max(1))
}
