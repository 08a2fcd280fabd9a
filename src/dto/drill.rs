//! Drill library payloads.

use serde::{Deserialize, Serialize};

use crate::plan::model::{Drill, DrillId};

/// A drill as served by the library endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrillDto {
    /// Library primary key.
    pub id: DrillId,
    /// Drill name.
    pub name: String,
    /// Coarse category.
    pub category: String,
    /// Difficulty label.
    pub difficulty: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Suggested duration in minutes.
    pub duration_minutes: u32,
    /// Optional demonstration video.
    #[serde(default)]
    pub video_url: String,
}

/// Request body for creating a coach-authored drill.
#[derive(Debug, Clone, Serialize)]
pub struct CreateDrillRequest {
    /// Drill name.
    pub name: String,
    /// Coarse category.
    pub category: String,
    /// Difficulty label.
    pub difficulty: String,
    /// Free-form description.
    pub description: String,
    /// Suggested duration in minutes.
    pub duration: u32,
    /// Optional demonstration video.
    pub video_url: String,
}

impl From<DrillDto> for Drill {
    fn from(value: DrillDto) -> Self {
        Self {
            id: value.id,
            name: value.name,
            category: value.category,
            difficulty: value.difficulty,
            description: value.description,
            duration_minutes: value.duration_minutes,
            video_url: value.video_url,
        }
    }
}
