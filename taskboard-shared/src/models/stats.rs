/// Dashboard task counters from `GET /tasks/stats`
///
/// Some backends return the counts as strings (straight from a SQL
/// `COUNT(*)`), so each field accepts a number or a numeric string. Anything
/// else reads as zero.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

use super::task::TaskStatus;

/// Task counts per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    #[serde(default, deserialize_with = "lenient_count")]
    pub todo: u64,

    #[serde(default, deserialize_with = "lenient_count")]
    pub working: u64,

    #[serde(default, deserialize_with = "lenient_count")]
    pub done: u64,

    #[serde(default, deserialize_with = "lenient_count")]
    pub total: u64,
}

impl TaskStats {
    /// Count for a single status
    pub fn count(&self, status: TaskStatus) -> u64 {
        match status {
            TaskStatus::Todo => self.todo,
            TaskStatus::Working => self.working,
            TaskStatus::Done => self.done,
        }
    }

    /// Share of finished tasks, 0.0 when there are none
    pub fn completion_ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.done as f64 / self.total as f64
    }
}

fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = JsonValue::deserialize(deserializer)?;
    let count = match value {
        JsonValue::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        JsonValue::String(s) => s.trim().parse::<u64>().unwrap_or(0),
        _ => 0,
    };
    Ok(count)
}
