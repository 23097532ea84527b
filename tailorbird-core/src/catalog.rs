use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Subscription tier. Drives model selection and whether the cover-letter
/// refinement loop runs at all.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum UserTier {
    Free,
    Plus,
    Pro,
    Admin,
    Tester,
}

impl<'de> Deserialize<'de> for UserTier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(UserTier::parse(&raw))
    }
}

impl UserTier {
    /// Parses a stored tier string. Unrecognized values collapse to
    /// `Free`, mirroring the catalog's free-row fallback.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "plus" => UserTier::Plus,
            "pro" => UserTier::Pro,
            "admin" => UserTier::Admin,
            "tester" => UserTier::Tester,
            _ => UserTier::Free,
        }
    }

    /// Tiers that justify the extra inference cost of the self-critique
    /// refinement loop.
    pub fn refinement_enabled(&self) -> bool {
        matches!(self, UserTier::Pro | UserTier::Admin | UserTier::Tester)
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskClass {
    /// Cheap, low-temperature structured field pulls.
    Extraction,
    /// Expensive scored, nuanced output.
    Analysis,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ModelRow {
    pub extraction: String,
    pub analysis: String,
}

impl ModelRow {
    pub fn new(extraction: impl Into<String>, analysis: impl Into<String>) -> Self {
        Self {
            extraction: extraction.into(),
            analysis: analysis.into(),
        }
    }
}

/// Static tier-to-model table. Read-only after construction; `resolve`
/// is total and never fails.
#[derive(Clone, Debug)]
pub struct ModelCatalog {
    rows: HashMap<UserTier, ModelRow>,
}

impl Default for ModelCatalog {
    fn default() -> Self {
        let pro_row = ModelRow::new("gemini-2.5-flash", "gemini-2.5-pro");
        let mut rows = HashMap::new();
        rows.insert(
            UserTier::Free,
            ModelRow::new("gemini-2.0-flash-lite", "gemini-2.0-flash"),
        );
        rows.insert(
            UserTier::Plus,
            ModelRow::new("gemini-2.0-flash", "gemini-2.5-flash"),
        );
        rows.insert(UserTier::Pro, pro_row.clone());
        rows.insert(UserTier::Admin, pro_row.clone());
        rows.insert(UserTier::Tester, pro_row);
        Self { rows }
    }
}

impl ModelCatalog {
    pub fn with_row(mut self, tier: UserTier, row: ModelRow) -> Self {
        self.rows.insert(tier, row);
        self
    }

    pub fn resolve(&self, tier: UserTier, task: TaskClass) -> &str {
        let row = self
            .rows
            .get(&tier)
            .or_else(|| self.rows.get(&UserTier::Free))
            .expect("catalog always carries a free row");
        match task {
            TaskClass::Extraction => &row.extraction,
            TaskClass::Analysis => &row.analysis,
        }
    }
}
