//! Section rows, drafts and patches.

use super::{PlannerDomainError, SectionColor, SectionId};
use crate::identity::UserId;
use crate::sync::domain::{CanonicalOrder, Entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Named, colored grouping of tasks owned by one user.
///
/// Deleting a section never touches its tasks; they keep the dangling
/// `section_id` and read as unsectioned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    id: SectionId,
    user_id: UserId,
    name: String,
    #[serde(default, deserialize_with = "super::color::deserialize_stored")]
    color: Option<SectionColor>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a stored section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRecord {
    /// Stored identifier.
    pub id: SectionId,
    /// Owning user.
    pub user_id: UserId,
    /// Display name.
    pub name: String,
    /// Color token, if any.
    pub color: Option<SectionColor>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Section {
    /// Reconstructs a section from stored values.
    #[must_use]
    pub fn from_record(record: SectionRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            name: record.name,
            color: record.color,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    /// Returns the section identifier.
    #[must_use]
    pub const fn id(&self) -> SectionId {
        self.id
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the color token, if set.
    #[must_use]
    pub const fn color(&self) -> Option<SectionColor> {
        self.color
    }

    /// Returns the display hex color, falling back to the neutral gray.
    #[must_use]
    pub fn display_hex(&self) -> &'static str {
        self.color.map_or(super::NEUTRAL_HEX, SectionColor::hex)
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl Entity for Section {
    type Id = SectionId;
    type Draft = NewSection;
    type Patch = SectionPatch;

    const TABLE: &'static str = "sections";
    const ORDER: CanonicalOrder = CanonicalOrder::OldestFirst;

    fn id(&self) -> SectionId {
        self.id
    }

    fn owner(&self) -> UserId {
        self.user_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        Some(self.updated_at)
    }
}

/// Insert payload for a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewSection {
    name: String,
    color: SectionColor,
}

impl NewSection {
    /// Creates a draft with the default color.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerDomainError::EmptySectionName`] when the name is
    /// blank.
    pub fn new(name: impl Into<String>) -> Result<Self, PlannerDomainError> {
        Ok(Self {
            name: section_name(name)?,
            color: SectionColor::default(),
        })
    }

    /// Sets the color.
    #[must_use]
    pub const fn with_color(mut self, color: SectionColor) -> Self {
        self.color = color;
        self
    }

    /// Returns the trimmed name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the color.
    #[must_use]
    pub const fn color(&self) -> SectionColor {
        self.color
    }

    /// Builds the stored section the remote returns for this draft.
    #[must_use]
    pub fn into_section(self, id: SectionId, owner: UserId, at: DateTime<Utc>) -> Section {
        Section {
            id,
            user_id: owner,
            name: self.name,
            color: Some(self.color),
            created_at: at,
            updated_at: at,
        }
    }
}

/// Partial update for a section.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SectionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<SectionColor>,
}

impl SectionPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Renames the section.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerDomainError::EmptySectionName`] when the name is
    /// blank.
    pub fn with_name(mut self, name: impl Into<String>) -> Result<Self, PlannerDomainError> {
        self.name = Some(section_name(name)?);
        Ok(self)
    }

    /// Recolors the section.
    #[must_use]
    pub const fn with_color(mut self, color: SectionColor) -> Self {
        self.color = Some(color);
        self
    }

    /// Returns the new name, if set.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the new color, if set.
    #[must_use]
    pub const fn color(&self) -> Option<SectionColor> {
        self.color
    }

    /// Returns whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.color.is_none()
    }

    /// Applies the patch to `section`, stamping `at` as the update time.
    #[must_use]
    pub fn apply_to(&self, section: &Section, at: DateTime<Utc>) -> Section {
        let mut updated = section.clone();
        if let Some(name) = &self.name {
            updated.name.clone_from(name);
        }
        if let Some(color) = self.color {
            updated.color = Some(color);
        }
        updated.updated_at = at;
        updated
    }
}

fn section_name(name: impl Into<String>) -> Result<String, PlannerDomainError> {
    let raw = name.into();
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PlannerDomainError::EmptySectionName);
    }
    Ok(trimmed.to_owned())
}
