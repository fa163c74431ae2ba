use std::collections::BTreeSet;

use shared::domain::{
    AddonKind, BracketType, LineItem, MountSpec, SelectionField, SizeClass, WallType,
};

/// The TV currently being configured.
///
/// When `editing_index` is set the selection mirrors the committed line item at
/// that cart position instead of describing a new one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    size: Option<SizeClass>,
    bracket: Option<BracketType>,
    wall: Option<WallType>,
    addons: BTreeSet<AddonKind>,
    editing_index: Option<usize>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(
        size: Option<SizeClass>,
        bracket: Option<BracketType>,
        wall: Option<WallType>,
        addons: BTreeSet<AddonKind>,
        editing_index: Option<usize>,
    ) -> Self {
        Self {
            size,
            bracket,
            wall,
            addons,
            editing_index,
        }
    }

    pub fn size(&self) -> Option<SizeClass> {
        self.size
    }

    pub fn bracket(&self) -> Option<BracketType> {
        self.bracket
    }

    pub fn wall(&self) -> Option<WallType> {
        self.wall
    }

    pub fn addons(&self) -> &BTreeSet<AddonKind> {
        &self.addons
    }

    pub fn editing_index(&self) -> Option<usize> {
        self.editing_index
    }

    pub fn is_editing(&self) -> bool {
        self.editing_index.is_some()
    }

    pub fn set_size(&mut self, size: SizeClass) {
        self.size = Some(size);
    }

    pub fn set_bracket(&mut self, bracket: BracketType) {
        self.bracket = Some(bracket);
    }

    pub fn set_wall(&mut self, wall: WallType) {
        self.wall = Some(wall);
    }

    /// Returns whether the add-on is selected after the toggle.
    pub fn toggle_addon(&mut self, addon: AddonKind) -> bool {
        if self.addons.remove(&addon) {
            false
        } else {
            self.addons.insert(addon);
            true
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_complete(&self) -> bool {
        self.size.is_some() && self.bracket.is_some() && self.wall.is_some()
    }

    pub fn is_partial(&self) -> bool {
        !self.is_empty() && !self.is_complete()
    }

    /// Add-ons alone do not count as progress.
    pub fn is_empty(&self) -> bool {
        self.size.is_none() && self.bracket.is_none() && self.wall.is_none()
    }

    pub fn missing_fields(&self) -> Vec<SelectionField> {
        let mut missing = Vec::new();
        if self.size.is_none() {
            missing.push(SelectionField::Size);
        }
        if self.bracket.is_none() {
            missing.push(SelectionField::Bracket);
        }
        if self.wall.is_none() {
            missing.push(SelectionField::Wall);
        }
        missing
    }

    /// The mount this selection describes, if every required step is answered.
    pub fn spec(&self) -> Option<MountSpec> {
        Some(MountSpec {
            size: self.size?,
            bracket: self.bracket?,
            wall: self.wall?,
            addons: self.addons.clone(),
        })
    }

    pub(crate) fn load_item(&mut self, item: &LineItem, index: usize) {
        self.size = Some(item.size);
        self.bracket = Some(item.bracket);
        self.wall = Some(item.wall);
        self.addons = item.addons.clone();
        self.editing_index = Some(index);
    }

    pub(crate) fn set_editing_index(&mut self, editing_index: Option<usize>) {
        self.editing_index = editing_index;
    }
}

#[cfg(test)]
#[path = "tests/selection_tests.rs"]
mod tests;
