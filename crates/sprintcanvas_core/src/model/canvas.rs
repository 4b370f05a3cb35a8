//! Live canvas document tree.
//!
//! # Responsibility
//! - Hold the editable state: ordered sections of items plus the fixed
//!   header/intro/title blocks and mission cards.
//! - Provide bounds-checked mutation operations for the editor service.
//!
//! # Invariants
//! - Section order and item order are display order; every mutation
//!   preserves the order the caller established.
//! - `description` is stored as an explicit [`Description`] variant, never
//!   re-derived from rendered text.

use crate::format::Description;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Fixed number of mission cards on the canvas.
pub const MISSION_CARD_COUNT: usize = 4;

/// Page header: main title plus subtitle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderBlock {
    pub title: String,
    pub subtitle: String,
}

/// Introduction block above the canvas grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntroBlock {
    pub title: String,
    pub description: String,
    pub footer: String,
}

/// Canvas title bar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasTitleBlock {
    pub title: String,
    pub subtitle: String,
}

/// One mission card. Addressed by fixed index 0..4.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionCard {
    pub title: String,
    pub description: String,
}

/// One live content item inside a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionItem {
    title: String,
    description: Description,
}

impl SectionItem {
    /// Builds an item from a title and raw description text.
    pub fn new(title: impl Into<String>, description_raw: &str) -> Self {
        Self {
            title: title.into(),
            description: Description::from_raw(description_raw),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &Description {
        &self.description
    }

    /// Renders the description back to raw edit text, whichever encoding
    /// it currently uses.
    pub fn description_text(&self) -> String {
        self.description.to_raw()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_description(&mut self, description_raw: &str) {
        self.description = Description::from_raw(description_raw);
    }
}

/// Named ordered group of content items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    name: String,
    items: Vec<SectionItem>,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn items(&self) -> &[SectionItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Structural errors raised by document mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    DuplicateSection(String),
    UnknownSection(String),
    ItemOutOfRange {
        section: String,
        index: usize,
        len: usize,
    },
    MissionIndexOutOfRange(usize),
}

impl Display for DocumentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateSection(name) => write!(f, "duplicate section name: `{name}`"),
            Self::UnknownSection(name) => write!(f, "unknown section: `{name}`"),
            Self::ItemOutOfRange {
                section,
                index,
                len,
            } => write!(
                f,
                "item index {index} out of range for section `{section}` with {len} items"
            ),
            Self::MissionIndexOutOfRange(index) => write!(
                f,
                "mission card index {index} out of range (fixed length {MISSION_CARD_COUNT})"
            ),
        }
    }
}

impl Error for DocumentError {}

/// The editable canvas document; the single source of truth for all
/// capture, backup and publish paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasDocument {
    pub header: HeaderBlock,
    pub intro: IntroBlock,
    pub canvas_title: CanvasTitleBlock,
    pub mission_cards: [MissionCard; MISSION_CARD_COUNT],
    sections: Vec<Section>,
}

impl CanvasDocument {
    /// Creates a document with the given section names in display order.
    ///
    /// Section names identify sections across snapshots; duplicates are
    /// rejected.
    pub fn new<I, S>(section_names: I) -> Result<Self, DocumentError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut sections: Vec<Section> = Vec::new();
        for name in section_names {
            let name = name.into();
            if sections.iter().any(|section| section.name == name) {
                return Err(DocumentError::DuplicateSection(name));
            }
            sections.push(Section::new(name));
        }

        Ok(Self {
            header: HeaderBlock::default(),
            intro: IntroBlock::default(),
            canvas_title: CanvasTitleBlock::default(),
            mission_cards: Default::default(),
            sections,
        })
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.name == name)
    }

    /// Total item count across all sections.
    pub fn item_count(&self) -> usize {
        self.sections.iter().map(Section::len).sum()
    }

    /// Appends one item to the named section.
    pub fn add_item(
        &mut self,
        section_name: &str,
        title: impl Into<String>,
        description_raw: &str,
    ) -> Result<(), DocumentError> {
        let section = self.section_mut(section_name)?;
        section.items.push(SectionItem::new(title, description_raw));
        Ok(())
    }

    /// Replaces title and description of one item in place.
    pub fn edit_item(
        &mut self,
        section_name: &str,
        index: usize,
        title: impl Into<String>,
        description_raw: &str,
    ) -> Result<(), DocumentError> {
        let item = self.item_mut(section_name, index)?;
        item.set_title(title);
        item.set_description(description_raw);
        Ok(())
    }

    /// Removes one item, shifting later items up.
    pub fn delete_item(&mut self, section_name: &str, index: usize) -> Result<(), DocumentError> {
        let name = section_name.to_string();
        let section = self.section_mut(section_name)?;
        if index >= section.items.len() {
            return Err(DocumentError::ItemOutOfRange {
                section: name,
                index,
                len: section.items.len(),
            });
        }
        section.items.remove(index);
        Ok(())
    }

    /// Moves one item to a new position within the same section
    /// (drag-reorder semantics).
    pub fn move_item(
        &mut self,
        section_name: &str,
        from: usize,
        to: usize,
    ) -> Result<(), DocumentError> {
        let name = section_name.to_string();
        let section = self.section_mut(section_name)?;
        let len = section.items.len();
        if from >= len || to >= len {
            let index = if from >= len { from } else { to };
            return Err(DocumentError::ItemOutOfRange {
                section: name,
                index,
                len,
            });
        }
        let item = section.items.remove(from);
        section.items.insert(to, item);
        Ok(())
    }

    /// Replaces the full item sequence of one section (snapshot apply path).
    pub fn replace_section_items(
        &mut self,
        section_name: &str,
        items: Vec<SectionItem>,
    ) -> Result<(), DocumentError> {
        let section = self.section_mut(section_name)?;
        section.items = items;
        Ok(())
    }

    /// Overwrites one mission card by fixed index.
    pub fn set_mission_card(
        &mut self,
        index: usize,
        card: MissionCard,
    ) -> Result<(), DocumentError> {
        let slot = self
            .mission_cards
            .get_mut(index)
            .ok_or(DocumentError::MissionIndexOutOfRange(index))?;
        *slot = card;
        Ok(())
    }

    fn section_mut(&mut self, name: &str) -> Result<&mut Section, DocumentError> {
        self.sections
            .iter_mut()
            .find(|section| section.name == name)
            .ok_or_else(|| DocumentError::UnknownSection(name.to_string()))
    }

    fn item_mut(&mut self, name: &str, index: usize) -> Result<&mut SectionItem, DocumentError> {
        let section = self.section_mut(name)?;
        let len = section.items.len();
        section
            .items
            .get_mut(index)
            .ok_or(DocumentError::ItemOutOfRange {
                section: name.to_string(),
                index,
                len,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::{CanvasDocument, DocumentError, MissionCard};

    fn sample_document() -> CanvasDocument {
        CanvasDocument::new(["strengths", "goals"]).unwrap()
    }

    #[test]
    fn rejects_duplicate_section_names() {
        let err = CanvasDocument::new(["a", "b", "a"]).unwrap_err();
        assert_eq!(err, DocumentError::DuplicateSection("a".to_string()));
    }

    #[test]
    fn add_edit_delete_item_roundtrip() {
        let mut doc = sample_document();
        doc.add_item("strengths", "First", "one line").unwrap();
        doc.edit_item("strengths", 0, "Renamed", "- a\n- b").unwrap();

        let section = doc.section("strengths").unwrap();
        assert_eq!(section.items()[0].title(), "Renamed");
        assert_eq!(section.items()[0].description_text(), "- a\n- b");

        doc.delete_item("strengths", 0).unwrap();
        assert!(doc.section("strengths").unwrap().is_empty());
    }

    #[test]
    fn move_item_reorders_within_section() {
        let mut doc = sample_document();
        for title in ["a", "b", "c"] {
            doc.add_item("goals", title, "x").unwrap();
        }
        doc.move_item("goals", 2, 0).unwrap();

        let titles: Vec<&str> = doc
            .section("goals")
            .unwrap()
            .items()
            .iter()
            .map(|item| item.title())
            .collect();
        assert_eq!(titles, vec!["c", "a", "b"]);
    }

    #[test]
    fn unknown_section_and_bad_index_are_semantic_errors() {
        let mut doc = sample_document();
        assert_eq!(
            doc.add_item("missing", "t", "d").unwrap_err(),
            DocumentError::UnknownSection("missing".to_string())
        );
        assert!(matches!(
            doc.delete_item("goals", 0).unwrap_err(),
            DocumentError::ItemOutOfRange { .. }
        ));
    }

    #[test]
    fn mission_card_index_is_bounds_checked() {
        let mut doc = sample_document();
        doc.set_mission_card(3, MissionCard::default()).unwrap();
        assert_eq!(
            doc.set_mission_card(4, MissionCard::default()).unwrap_err(),
            DocumentError::MissionIndexOutOfRange(4)
        );
    }
}
