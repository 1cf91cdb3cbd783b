//! Static quiz and task content consumed by mission sessions.

use serde::{Deserialize, Serialize};

/// One unit of playable content within a mission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionItem {
    /// Multiple-choice quiz question.
    Question {
        prompt: String,
        options: Vec<String>,
        /// Index into `options` of the correct answer.
        answer: usize,
        points: u32,
    },
    /// Open-ended task completed by an explicit done signal.
    Task { description: String, points: u32 },
}

impl SessionItem {
    /// Point value awarded when this item is resolved correctly.
    #[must_use]
    pub const fn points(&self) -> u32 {
        match self {
            Self::Question { points, .. } | Self::Task { points, .. } => *points,
        }
    }

    /// Whether `response` satisfies this item's correct-answer predicate.
    #[must_use]
    pub fn accepts(&self, response: &Response) -> bool {
        match (self, response) {
            (Self::Question { answer, .. }, Response::Choice(picked)) => picked == answer,
            (Self::Task { .. }, Response::TaskDone) => true,
            _ => false,
        }
    }
}

/// Player response fed into a session's `answer` operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    /// Selected option index for a question.
    Choice(usize),
    /// Completion signal for an open-ended task.
    TaskDone,
}

/// All items for one mission, in play order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionContent {
    pub mission_id: String,
    #[serde(default)]
    pub items: Vec<SessionItem>,
}

impl MissionContent {
    /// Maximum points attainable across all items.
    #[must_use]
    pub fn max_points(&self) -> u32 {
        self.items
            .iter()
            .map(SessionItem::points)
            .fold(0, u32::saturating_add)
    }
}

/// Container for every mission's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ContentData {
    pub missions: Vec<MissionContent>,
}

impl ContentData {
    /// Create empty content data (useful for tests).
    #[must_use]
    pub fn empty() -> Self {
        Self {
            missions: Vec::new(),
        }
    }

    /// Load content data from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into valid content.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Find the content for one mission.
    #[must_use]
    pub fn find(&self, mission_id: &str) -> Option<&MissionContent> {
        self.missions.iter().find(|c| c.mission_id == mission_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_parses_tagged_items_from_json() {
        let json = r#"{
            "missions": [
                {
                    "missionId": "training",
                    "items": [
                        {
                            "type": "question",
                            "prompt": "What does LGPD regulate?",
                            "options": ["Traffic law", "Personal data processing"],
                            "answer": 1,
                            "points": 10
                        },
                        {
                            "type": "task",
                            "description": "Talk to the DPO",
                            "points": 5
                        }
                    ]
                }
            ]
        }"#;
        let data = ContentData::from_json(json).unwrap();
        let content = data.find("training").unwrap();
        assert_eq!(content.items.len(), 2);
        assert_eq!(content.max_points(), 15);
        assert!(data.find("missing").is_none());
    }

    #[test]
    fn question_accepts_only_the_correct_choice() {
        let item = SessionItem::Question {
            prompt: "q".to_string(),
            options: vec!["a".to_string(), "b".to_string()],
            answer: 1,
            points: 10,
        };
        assert!(item.accepts(&Response::Choice(1)));
        assert!(!item.accepts(&Response::Choice(0)));
        assert!(!item.accepts(&Response::TaskDone));
    }

    #[test]
    fn task_accepts_only_the_done_signal() {
        let item = SessionItem::Task {
            description: "t".to_string(),
            points: 5,
        };
        assert!(item.accepts(&Response::TaskDone));
        assert!(!item.accepts(&Response::Choice(0)));
    }
}
