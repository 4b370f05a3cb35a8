//! Serializable canvas snapshot.
//!
//! # Responsibility
//! - Define the aggregate exchanged with device storage, backup files and
//!   imports.
//! - Validate incoming snapshots before they touch the live document.
//!
//! # Invariants
//! - JSON shape matches the original backup format: `header`, `intro`,
//!   `canvasTitle`, `missionCards` keys plus one key per section.
//! - An incompatible shape fails closed; it is never partially applied.

use crate::model::canvas::{
    CanvasTitleBlock, HeaderBlock, IntroBlock, MissionCard, MISSION_CARD_COUNT,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Snapshot encoding of one content item; the description is rendered
/// raw text, not tagged lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasItem {
    pub title: String,
    pub description: String,
}

/// Snapshot validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    TooManyMissionCards { count: usize },
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooManyMissionCards { count } => write!(
                f,
                "snapshot carries {count} mission cards, fixed length is {MISSION_CARD_COUNT}"
            ),
        }
    }
}

impl Error for SnapshotError {}

/// Complete serializable canvas state at one point in time.
///
/// Block fields are optional so older snapshots missing a block load
/// cleanly and leave the live block untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<HeaderBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intro: Option<IntroBlock>,
    #[serde(
        rename = "canvasTitle",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub canvas_title: Option<CanvasTitleBlock>,
    #[serde(
        rename = "missionCards",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub mission_cards: Option<Vec<MissionCard>>,
    /// Section name -> item sequence in display order.
    #[serde(flatten)]
    pub sections: BTreeMap<String, Vec<CanvasItem>>,
}

impl CanvasSnapshot {
    /// Checks structural constraints that cannot be expressed in serde.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if let Some(cards) = &self.mission_cards {
            if cards.len() > MISSION_CARD_COUNT {
                return Err(SnapshotError::TooManyMissionCards { count: cards.len() });
            }
        }
        Ok(())
    }
}
