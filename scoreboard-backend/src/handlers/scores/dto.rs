use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreCreatedResponse {
    pub message: String,
}

impl ScoreCreatedResponse {
    pub fn submitted() -> Self {
        Self {
            message: "Score submitted successfully".to_string(),
        }
    }
}
