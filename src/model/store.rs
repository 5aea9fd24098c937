//! Per-page spacer collections with an id index.

use super::spacer::{Spacer, SpacerPreset, SpacerProperty, DEFAULT_SPACER_HEIGHT, DUPLICATE_OFFSET};
use crate::error::{Error, Result};
use std::collections::{BTreeMap, HashMap};

/// Where a spacer lives inside the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpacerLocation {
    /// 1-indexed page number
    pub page: usize,
    /// Position in the page's insertion-ordered list
    pub position: usize,
}

/// Owner of every spacer in a document.
///
/// Each page keeps its spacers in insertion order; an `id -> location` side
/// table makes lookups independent of the number of pages. Consumers get
/// read-only views or copies, never mutable aliases.
#[derive(Debug, Clone)]
pub struct SpacerStore {
    pages: BTreeMap<usize, Vec<Spacer>>,
    index: HashMap<String, SpacerLocation>,
    next_id: u64,
}

impl SpacerStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from persisted per-page lists, validating every spacer.
    pub fn from_pages(pages: BTreeMap<usize, Vec<Spacer>>) -> Result<Self> {
        let mut store = Self::new();
        for (page, spacers) in pages {
            for spacer in spacers {
                store.insert(page, spacer)?;
            }
        }
        Ok(store)
    }

    /// Copy of the per-page lists for persistence.
    pub fn to_pages(&self) -> BTreeMap<usize, Vec<Spacer>> {
        self.pages.clone()
    }

    /// Total number of spacers.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the store holds no spacers.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Allocate the next id. Ids increase monotonically for the lifetime of the store.
    ///
    /// Fails once the numeric id space is used up.
    pub fn allocate_id(&mut self) -> Result<String> {
        loop {
            let id = self.next_id.to_string();
            self.next_id = self
                .next_id
                .checked_add(1)
                .ok_or_else(|| Error::InvalidSpacer("spacer ids exhausted".into()))?;
            if !self.index.contains_key(&id) {
                return Ok(id);
            }
        }
    }

    /// Insert an existing spacer at the end of a page's list.
    pub fn insert(&mut self, page: usize, spacer: Spacer) -> Result<&Spacer> {
        if page == 0 {
            return Err(Error::InvalidSpacer("page numbers start at 1".into()));
        }
        spacer.validate()?;
        if self.index.contains_key(&spacer.id) {
            return Err(Error::InvalidSpacer(format!("duplicate id {}", spacer.id)));
        }
        if let Ok(numeric) = spacer.id.parse::<u64>() {
            self.next_id = self.next_id.max(numeric.saturating_add(1));
        }

        let list = self.pages.entry(page).or_default();
        let position = list.len();
        self.index
            .insert(spacer.id.clone(), SpacerLocation { page, position });
        list.push(spacer);
        Ok(&list[position])
    }

    /// Create a spacer at original offset `y` with the default height and a preset.
    pub fn create(&mut self, page: usize, y: f32, preset: &SpacerPreset) -> Result<&Spacer> {
        let id = self.allocate_id()?;
        let spacer = Spacer::new(id, y.max(0.0), DEFAULT_SPACER_HEIGHT, preset);
        self.insert(page, spacer)
    }

    /// Location of a spacer.
    pub fn locate(&self, id: &str) -> Option<SpacerLocation> {
        self.index.get(id).copied()
    }

    /// Look up a spacer by id.
    pub fn get(&self, id: &str) -> Option<&Spacer> {
        let loc = self.index.get(id)?;
        self.pages.get(&loc.page).map(|list| &list[loc.position])
    }

    /// Spacers of one page in insertion order.
    pub fn spacers_on(&self, page: usize) -> &[Spacer] {
        self.pages.get(&page).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Spacers of one page ordered by `y`, ties kept in insertion order.
    pub fn sorted_on(&self, page: usize) -> Vec<&Spacer> {
        let mut sorted: Vec<&Spacer> = self.spacers_on(page).iter().collect();
        sorted.sort_by(|a, b| a.y.total_cmp(&b.y));
        sorted
    }

    /// Sum of spacer heights on a page.
    pub fn inserted_height(&self, page: usize) -> f32 {
        self.spacers_on(page).iter().map(|s| s.height).sum()
    }

    /// Pages that carry at least one spacer, with their spacers.
    pub fn pages(&self) -> impl Iterator<Item = (usize, &[Spacer])> {
        self.pages.iter().map(|(page, list)| (*page, list.as_slice()))
    }

    /// Edit one property of a spacer. Other spacers are never touched.
    pub fn update(&mut self, id: &str, property: &SpacerProperty) -> Result<&Spacer> {
        let loc = self
            .locate(id)
            .ok_or_else(|| Error::SpacerNotFound(id.to_string()))?;
        let list = self
            .pages
            .get_mut(&loc.page)
            .ok_or_else(|| Error::SpacerNotFound(id.to_string()))?;
        list[loc.position].apply(property)?;
        Ok(&list[loc.position])
    }

    /// Remove a spacer and return it.
    pub fn remove(&mut self, id: &str) -> Result<Spacer> {
        let loc = self
            .index
            .remove(id)
            .ok_or_else(|| Error::SpacerNotFound(id.to_string()))?;
        let list = self
            .pages
            .get_mut(&loc.page)
            .ok_or_else(|| Error::SpacerNotFound(id.to_string()))?;
        let removed = list.remove(loc.position);

        for later in &list[loc.position..] {
            if let Some(entry) = self.index.get_mut(&later.id) {
                entry.position -= 1;
            }
        }
        if list.is_empty() {
            self.pages.remove(&loc.page);
        }
        Ok(removed)
    }

    /// Copy a spacer onto the same page, slightly below the original.
    pub fn duplicate(&mut self, id: &str) -> Result<&Spacer> {
        let loc = self
            .locate(id)
            .ok_or_else(|| Error::SpacerNotFound(id.to_string()))?;
        let mut copy = self
            .get(id)
            .cloned()
            .ok_or_else(|| Error::SpacerNotFound(id.to_string()))?;
        copy.id = self.allocate_id()?;
        copy.y = (copy.y + DUPLICATE_OFFSET).max(0.0);
        self.insert(loc.page, copy)
    }

    /// Remove every spacer. Id allocation keeps counting upward.
    pub fn clear(&mut self) {
        self.pages.clear();
        self.index.clear();
    }
}

impl Default for SpacerStore {
    fn default() -> Self {
        Self {
            pages: BTreeMap::new(),
            index: HashMap::new(),
            next_id: 1,
        }
    }
}
