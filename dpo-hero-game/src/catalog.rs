//! Mission catalog: static definitions, unlock rules, and load-time validation.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::session::MissionOutcome;

/// How the committed award for a mission is derived from its session outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RewardRule {
    /// Award the points accumulated across the session's items.
    #[default]
    SessionPoints,
    /// Award the definition's full point value upon completion.
    FixedOnComplete,
    /// Award the definition's point value scaled by the session score percent.
    ScaledByScore,
}

impl RewardRule {
    /// Points committed to the progress store for `outcome` under this rule.
    #[must_use]
    pub fn earned_points(self, definition_points: u32, outcome: &MissionOutcome) -> u32 {
        match self {
            Self::SessionPoints => outcome.accumulated_points,
            Self::FixedOnComplete => definition_points,
            Self::ScaledByScore => scale_by_percent(definition_points, outcome.score_percent),
        }
    }
}

/// `points * percent / 100`, rounded to nearest.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn scale_by_percent(points: u32, percent: f64) -> u32 {
    let clamped = percent.clamp(0.0, 100.0);
    (f64::from(points) * clamped / 100.0).round() as u32
}

/// A single mission available in the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionDefinition {
    pub id: String,
    pub name: String,
    pub desc: String,
    /// Headline reward for first-time completion.
    pub points: u32,
    /// Ids that must all be completed before this mission unlocks.
    #[serde(default)]
    pub required_missions: Vec<String>,
    #[serde(default)]
    pub reward: RewardRule,
}

impl MissionDefinition {
    /// True when every prerequisite id is in the completed set.
    ///
    /// A prerequisite referencing an id outside the catalog can never be
    /// satisfied, which leaves the mission permanently locked.
    #[must_use]
    pub fn is_unlocked(&self, completed: &[String]) -> bool {
        self.required_missions
            .iter()
            .all(|req| completed.iter().any(|done| done == req))
    }
}

/// Errors raised while loading or validating the catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate mission id: {id}")]
    DuplicateId { id: String },
    #[error("prerequisite cycle involving mission: {id}")]
    PrerequisiteCycle { id: String },
}

/// Complete mission catalog, validated at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MissionCatalog {
    pub missions: Vec<MissionDefinition>,
}

impl MissionCatalog {
    /// Create an empty catalog (useful for tests).
    #[must_use]
    pub fn empty() -> Self {
        Self {
            missions: Vec::new(),
        }
    }

    /// Load and validate the catalog from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed, a mission id appears
    /// twice, or the prerequisite graph contains a cycle.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Build and validate a catalog from pre-parsed definitions.
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate ids or prerequisite cycles.
    pub fn from_missions(missions: Vec<MissionDefinition>) -> Result<Self, CatalogError> {
        let catalog = Self { missions };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Find a mission by id.
    #[must_use]
    pub fn find(&self, mission_id: &str) -> Option<&MissionDefinition> {
        self.missions.iter().find(|m| m.id == mission_id)
    }

    /// All definitions as a flat map by id.
    #[must_use]
    pub fn missions_by_id(&self) -> HashMap<String, &MissionDefinition> {
        self.missions
            .iter()
            .map(|m| (m.id.clone(), m))
            .collect()
    }

    /// Ids whose prerequisites are satisfied, in catalog order.
    ///
    /// Already-completed missions remain in the result; replays stay
    /// startable.
    #[must_use]
    pub fn unlocked_ids(&self, completed: &[String]) -> Vec<String> {
        self.missions
            .iter()
            .filter(|m| m.is_unlocked(completed))
            .map(|m| m.id.clone())
            .collect()
    }

    /// Check the catalog for duplicate ids and prerequisite cycles.
    ///
    /// Prerequisites referencing ids outside the catalog are not an error;
    /// they are logged and the mission stays permanently locked.
    ///
    /// # Errors
    ///
    /// Returns the first duplicate id or cycle found.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut ids = HashSet::new();
        for mission in &self.missions {
            if !ids.insert(mission.id.as_str()) {
                return Err(CatalogError::DuplicateId {
                    id: mission.id.clone(),
                });
            }
        }

        for mission in &self.missions {
            for req in &mission.required_missions {
                if !ids.contains(req.as_str()) {
                    log::warn!(
                        "mission '{}' requires unknown mission '{req}' and can never unlock",
                        mission.id
                    );
                }
            }
        }

        let by_id: HashMap<&str, &MissionDefinition> = self
            .missions
            .iter()
            .map(|m| (m.id.as_str(), m))
            .collect();
        let mut states: HashMap<&str, VisitState> = HashMap::new();
        for mission in &self.missions {
            visit(mission, &by_id, &mut states)?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum VisitState {
    InStack,
    Done,
}

fn visit<'a>(
    mission: &'a MissionDefinition,
    by_id: &HashMap<&'a str, &'a MissionDefinition>,
    states: &mut HashMap<&'a str, VisitState>,
) -> Result<(), CatalogError> {
    match states.get(mission.id.as_str()) {
        Some(VisitState::Done) => return Ok(()),
        Some(VisitState::InStack) => {
            return Err(CatalogError::PrerequisiteCycle {
                id: mission.id.clone(),
            });
        }
        None => {}
    }
    states.insert(mission.id.as_str(), VisitState::InStack);
    for req in &mission.required_missions {
        if let Some(dep) = by_id.get(req.as_str()) {
            visit(dep, by_id, states)?;
        }
    }
    states.insert(mission.id.as_str(), VisitState::Done);
    Ok(())
}
