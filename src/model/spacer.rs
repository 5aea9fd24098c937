//! Spacer blocks and their visual styles.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Height given to newly inserted spacers, in source-page units.
pub const DEFAULT_SPACER_HEIGHT: f32 = 100.0;

/// Smallest height a resize gesture may shrink a spacer to.
pub const MIN_RESIZE_HEIGHT: f32 = 20.0;

/// Offset applied to the copy when a spacer is duplicated.
pub const DUPLICATE_OFFSET: f32 = 20.0;

/// Visual pattern drawn inside a spacer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpacerStyle {
    /// Blank white block
    #[default]
    Plain,
    /// Horizontal writing lines
    Ruled,
    /// Regular grid of dots
    #[serde(alias = "dotGrid")]
    DotGrid,
    /// Squared (graph) paper
    Squared,
}

impl SpacerStyle {
    /// All styles in menu order.
    pub const ALL: [SpacerStyle; 4] = [
        SpacerStyle::Plain,
        SpacerStyle::Ruled,
        SpacerStyle::DotGrid,
        SpacerStyle::Squared,
    ];

    /// Wire name of the style.
    pub fn as_str(&self) -> &'static str {
        match self {
            SpacerStyle::Plain => "plain",
            SpacerStyle::Ruled => "ruled",
            SpacerStyle::DotGrid => "dot-grid",
            SpacerStyle::Squared => "squared",
        }
    }
}

impl fmt::Display for SpacerStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpacerStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "plain" => Ok(SpacerStyle::Plain),
            "ruled" => Ok(SpacerStyle::Ruled),
            "dot-grid" | "dotGrid" => Ok(SpacerStyle::DotGrid),
            "squared" => Ok(SpacerStyle::Squared),
            other => Err(Error::UnknownStyle(other.to_string())),
        }
    }
}

/// Style settings copied into every newly created spacer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpacerPreset {
    /// Pattern style
    pub style: SpacerStyle,
    /// Distance between rules for [`SpacerStyle::Ruled`]
    pub rule_spacing: f32,
    /// Distance between dots for [`SpacerStyle::DotGrid`]
    pub dot_pitch: f32,
    /// Cell size for [`SpacerStyle::Squared`]
    pub grid_size: f32,
}

impl Default for SpacerPreset {
    fn default() -> Self {
        Self {
            style: SpacerStyle::Plain,
            rule_spacing: 20.0,
            dot_pitch: 10.0,
            grid_size: 20.0,
        }
    }
}

impl SpacerPreset {
    /// Record a property edit if it is one the preset tracks.
    ///
    /// Returns `true` when the preset changed.
    pub fn remember(&mut self, property: &SpacerProperty) -> bool {
        match *property {
            SpacerProperty::Style(style) => self.style = style,
            SpacerProperty::RuleSpacing(v) => self.rule_spacing = v,
            SpacerProperty::DotPitch(v) => self.dot_pitch = v,
            SpacerProperty::GridSize(v) => self.grid_size = v,
            SpacerProperty::Height(_) | SpacerProperty::Y(_) => return false,
        }
        true
    }
}

/// A fixed-height block inserted into a page's vertical flow.
///
/// `y` is always in original, unreflowed page coordinates: moving or resizing
/// one spacer never changes the stored `y` of another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spacer {
    /// Stable unique identifier
    pub id: String,

    /// Insertion offset in source-page units
    pub y: f32,

    /// Block height in source-page units
    pub height: f32,

    /// Pattern style
    #[serde(default)]
    pub style: SpacerStyle,

    /// Rule distance for ruled spacers
    #[serde(default = "default_rule_spacing")]
    pub rule_spacing: f32,

    /// Dot distance for dot-grid spacers
    #[serde(default = "default_dot_pitch")]
    pub dot_pitch: f32,

    /// Cell size for squared spacers
    #[serde(default = "default_grid_size")]
    pub grid_size: f32,
}

fn default_rule_spacing() -> f32 {
    SpacerPreset::default().rule_spacing
}

fn default_dot_pitch() -> f32 {
    SpacerPreset::default().dot_pitch
}

fn default_grid_size() -> f32 {
    SpacerPreset::default().grid_size
}

impl Spacer {
    /// Create a spacer from a preset.
    pub fn new(id: impl Into<String>, y: f32, height: f32, preset: &SpacerPreset) -> Self {
        Self {
            id: id.into(),
            y,
            height,
            style: preset.style,
            rule_spacing: preset.rule_spacing,
            dot_pitch: preset.dot_pitch,
            grid_size: preset.grid_size,
        }
    }

    /// Create a plain spacer.
    pub fn plain(id: impl Into<String>, y: f32, height: f32) -> Self {
        Self::new(id, y, height, &SpacerPreset::default())
    }

    /// Builder-style style override.
    pub fn with_style(mut self, style: SpacerStyle) -> Self {
        self.style = style;
        self
    }

    /// Check the invariants every stored spacer must satisfy.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::InvalidSpacer("id must not be empty".into()));
        }
        if !self.y.is_finite() || self.y < 0.0 {
            return Err(Error::InvalidSpacer(format!(
                "{}: y must be a finite value >= 0 (got {})",
                self.id, self.y
            )));
        }
        if !self.height.is_finite() || self.height <= 0.0 {
            return Err(Error::InvalidSpacer(format!(
                "{}: height must be > 0 (got {})",
                self.id, self.height
            )));
        }
        for (name, value) in [
            ("ruleSpacing", self.rule_spacing),
            ("dotPitch", self.dot_pitch),
            ("gridSize", self.grid_size),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidSpacer(format!(
                    "{}: {} must be > 0 (got {})",
                    self.id, name, value
                )));
            }
        }
        Ok(())
    }

    /// Apply a property edit, leaving the spacer untouched if the result is invalid.
    pub fn apply(&mut self, property: &SpacerProperty) -> Result<()> {
        let mut edited = self.clone();
        match *property {
            SpacerProperty::Style(style) => edited.style = style,
            SpacerProperty::Height(v) => edited.height = v,
            SpacerProperty::Y(v) => edited.y = v,
            SpacerProperty::RuleSpacing(v) => edited.rule_spacing = v,
            SpacerProperty::DotPitch(v) => edited.dot_pitch = v,
            SpacerProperty::GridSize(v) => edited.grid_size = v,
        }
        edited.validate()?;
        *self = edited;
        Ok(())
    }

    /// Offset just below the spacer in original coordinates.
    pub fn end(&self) -> f32 {
        self.y + self.height
    }
}

/// A single editable spacer property, as produced by the properties panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpacerProperty {
    /// Pattern style
    Style(SpacerStyle),
    /// Block height
    Height(f32),
    /// Insertion offset
    Y(f32),
    /// Rule distance
    RuleSpacing(f32),
    /// Dot distance
    DotPitch(f32),
    /// Grid cell size
    GridSize(f32),
}

impl SpacerProperty {
    /// Parse a `name=value` pair using the persisted field names.
    pub fn parse(name: &str, value: &str) -> Result<Self> {
        let number = || {
            value
                .trim()
                .parse::<f32>()
                .map_err(|_| Error::InvalidSpacer(format!("{} expects a number, got {:?}", name, value)))
        };
        match name {
            "style" => Ok(SpacerProperty::Style(value.parse()?)),
            "height" => Ok(SpacerProperty::Height(number()?)),
            "y" => Ok(SpacerProperty::Y(number()?)),
            "ruleSpacing" => Ok(SpacerProperty::RuleSpacing(number()?)),
            "dotPitch" => Ok(SpacerProperty::DotPitch(number()?)),
            "gridSize" => Ok(SpacerProperty::GridSize(number()?)),
            other => Err(Error::InvalidSpacer(format!("unknown property {:?}", other))),
        }
    }
}
