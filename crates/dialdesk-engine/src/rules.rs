//! Disposition automation rules
//!
//! A disposition code may trigger one follow-up task. Codes with no rule
//! ("Not Interested", "Wrong Number") produce an activity record and
//! nothing else.

use std::collections::HashMap;

/// One automation rule: the task to create and how far out it is due when
/// the agent did not pick a date themselves.
#[derive(Debug, Clone)]
pub struct TaskRule {
    pub task_type: String,
    pub due_offset_days: i64,
}

/// Disposition code -> task rule table.
#[derive(Debug, Clone)]
pub struct DispositionRules {
    rules: HashMap<String, TaskRule>,
}

impl Default for DispositionRules {
    fn default() -> Self {
        let mut rules = HashMap::new();
        rules.insert(
            "Voicemail".to_string(),
            TaskRule {
                task_type: "Follow-up Call".to_string(),
                due_offset_days: 2,
            },
        );
        rules.insert(
            "No Answer".to_string(),
            TaskRule {
                task_type: "Retry Call".to_string(),
                due_offset_days: 1,
            },
        );
        rules.insert(
            "Interested".to_string(),
            TaskRule {
                task_type: "Send Offer Packet".to_string(),
                due_offset_days: 1,
            },
        );
        rules.insert(
            "Callback Requested".to_string(),
            TaskRule {
                task_type: "Scheduled Callback".to_string(),
                due_offset_days: 3,
            },
        );
        DispositionRules { rules }
    }
}

impl DispositionRules {
    pub fn empty() -> Self {
        DispositionRules {
            rules: HashMap::new(),
        }
    }

    pub fn with_rule(mut self, code: impl Into<String>, rule: TaskRule) -> Self {
        self.rules.insert(code.into(), rule);
        self
    }

    pub fn lookup(&self, disposition_code: &str) -> Option<&TaskRule> {
        self.rules.get(disposition_code)
    }
}
