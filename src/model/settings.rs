//! Persisted editor settings and project files.

use super::spacer::{Spacer, SpacerPreset};
use super::store::SpacerStore;
use crate::error::{Error, Result};
use crate::render::ExportOptions;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Session settings blob: spacers plus view and export preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Spacers keyed by 1-indexed page number
    pub spacers: BTreeMap<usize, Vec<Spacer>>,

    /// Viewer zoom
    pub scale: f32,

    /// 1-indexed page the viewer was on
    pub current_page: usize,

    /// Draw output page-break guides in the viewer
    pub show_page_breaks: bool,

    /// Draw the insertion guide under the pointer
    pub show_placement_guide: bool,

    /// Style copied into new spacers
    pub last_spacer_preset: SpacerPreset,

    /// Last used export configuration
    pub export_options: ExportOptions,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            spacers: BTreeMap::new(),
            scale: 1.0,
            current_page: 1,
            show_page_breaks: false,
            show_placement_guide: false,
            last_spacer_preset: SpacerPreset::default(),
            export_options: ExportOptions::default(),
        }
    }
}

impl Settings {
    /// Parse settings from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        Ok(settings)
    }

    /// Serialize settings as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Save settings to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Validate the spacers and build a store from them.
    pub fn spacer_store(&self) -> Result<SpacerStore> {
        SpacerStore::from_pages(self.spacers.clone())
    }
}

/// A shareable project file: the spacer layout of one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Spacers keyed by 1-indexed page number
    pub spacers: BTreeMap<usize, Vec<Spacer>>,

    /// Viewer zoom
    #[serde(default = "default_scale")]
    pub scale: f32,

    /// 1-indexed page the viewer was on
    #[serde(default = "default_page")]
    pub current_page: usize,

    /// Name or fingerprint of the source document
    #[serde(default)]
    pub pdf_name: String,

    /// When the project was written
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

fn default_scale() -> f32 {
    1.0
}

fn default_page() -> usize {
    1
}

impl Project {
    /// Snapshot a store into a project.
    pub fn from_store(store: &SpacerStore, scale: f32, current_page: usize, pdf_name: impl Into<String>) -> Self {
        Self {
            spacers: store.to_pages(),
            scale,
            current_page,
            pdf_name: pdf_name.into(),
            timestamp: Utc::now(),
        }
    }

    /// Parse a project file. A blob without a `spacers` key is rejected.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if value.get("spacers").is_none() {
            return Err(Error::Settings("Invalid project file format".into()));
        }
        let project: Project = serde_json::from_value(value)?;
        Ok(project)
    }

    /// Serialize the project as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a project file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Write a project file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Validate the spacers and build a store from them.
    pub fn spacer_store(&self) -> Result<SpacerStore> {
        SpacerStore::from_pages(self.spacers.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SpacerStyle;
    use crate::render::ExportMode;

    #[test]
    fn test_settings_defaults_from_empty_blob() {
        let settings = Settings::from_json("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert!(settings.export_options.continue_across);
    }

    #[test]
    fn test_settings_round_trip_keys() {
        let mut settings = Settings::default();
        settings.spacers.insert(
            2,
            vec![Spacer::plain("5", 120.0, 80.0).with_style(SpacerStyle::DotGrid)],
        );
        settings.export_options.mode = ExportMode::Long;
        let json = settings.to_json().unwrap();
        assert!(json.contains("\"2\""));
        assert!(json.contains("\"lastSpacerPreset\""));
        assert!(json.contains("\"dot-grid\""));
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_settings_store_validates() {
        let json = r#"{"spacers":{"1":[{"id":"a","y":10,"height":-4}]}}"#;
        let settings = Settings::from_json(json).unwrap();
        assert!(settings.spacer_store().unwrap_err().is_input_error());
    }

    #[test]
    fn test_project_requires_spacers() {
        let err = Project::from_json(r#"{"scale":1.5}"#).unwrap_err();
        assert!(matches!(err, Error::Settings(_)));

        let project = Project::from_json(r#"{"spacers":{"3":[]}}"#).unwrap();
        assert_eq!(project.current_page, 1);
        assert_eq!(project.scale, 1.0);
    }

    #[test]
    fn test_project_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.json");

        let mut store = SpacerStore::new();
        store.insert(1, Spacer::plain("1", 300.0, 100.0)).unwrap();
        let project = Project::from_store(&store, 1.25, 1, "worksheet.pdf");
        project.save(&path).unwrap();

        let loaded = Project::load(&path).unwrap();
        assert_eq!(loaded.pdf_name, "worksheet.pdf");
        assert_eq!(loaded.spacer_store().unwrap().len(), 1);
    }
}
