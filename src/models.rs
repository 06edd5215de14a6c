use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::value::Value;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "first_name")]
    pub first_name: Option<String>,
    #[serde(default, alias = "last_name")]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl UserInfo {
    /// Full name if given, otherwise first and last name joined.
    pub fn display_name(&self) -> Option<String> {
        if let Some(name) = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            return Some(name.to_string());
        }
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(" "))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    #[serde(default, alias = "gad7_score", alias = "gad7")]
    pub gad7_score: Option<f64>,
    #[serde(default, alias = "phq9_score", alias = "phq9")]
    pub phq9_score: Option<f64>,
    #[serde(default, alias = "completed_at")]
    pub completed_at: Option<Value>,
    #[serde(default)]
    pub responses: Value,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyAssessment {
    pub week: u32,
    #[serde(flatten)]
    pub assessment: Assessment,
}

/// What the user did for one activity of a module.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ActivityProgress {
    #[serde(default)]
    pub completed: bool,
    #[serde(default, alias = "completed_at")]
    pub completed_at: Option<Value>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, alias = "reflection_data")]
    pub reflection_data: Value,
    #[serde(default, alias = "worksheet_data")]
    pub worksheet_data: Value,
    /// Any further per-activity fields, kept in payload order.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ActivityProgress {
    /// Activity type recorded alongside the progress, if the client sent one.
    pub fn activity_type(&self) -> Option<&str> {
        ACTIVITY_TYPE_KEYS.iter().find_map(|k| self.extra.get(*k)).and_then(|v| v.as_str())
    }
}

pub(crate) const ACTIVITY_TYPE_KEYS: [&str; 2] = ["type", "activityType"];

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ModuleProgress {
    pub week: u32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "started_at")]
    pub started_at: Option<Value>,
    #[serde(default, alias = "completed_at")]
    pub completed_at: Option<Value>,
    /// Keyed by activity id.
    #[serde(default, alias = "user_progress")]
    pub user_progress: BTreeMap<String, ActivityProgress>,
}

/// Input for the programme progress report.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    #[serde(default)]
    pub user: Option<UserInfo>,
    #[serde(default)]
    pub onboarding: Option<Assessment>,
    #[serde(default, alias = "weekly_assessments")]
    pub weekly_assessments: Vec<WeeklyAssessment>,
    #[serde(default)]
    pub modules: Vec<ModuleProgress>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntry {
    #[serde(default, alias = "created_at", alias = "createdAt")]
    pub date: Value,
    #[serde(default, alias = "moodScore", alias = "mood_score")]
    pub mood: Option<f64>,
    #[serde(default, alias = "anxietyLevel", alias = "anxiety_level")]
    pub anxiety: Option<f64>,
    #[serde(default, alias = "energyLevel", alias = "energy_level")]
    pub energy: Option<f64>,
    #[serde(default, alias = "sleep_hours")]
    pub sleep_hours: Option<f64>,
    #[serde(default)]
    pub activities: Vec<String>,
    #[serde(default)]
    pub triggers: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Thought-record answers and anything else attached to the entry.
    #[serde(default)]
    pub details: Value,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntriesReportData {
    #[serde(default)]
    pub user: Option<UserInfo>,
    #[serde(default)]
    pub entries: Vec<MoodEntry>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    #[serde(default, alias = "item", alias = "title")]
    pub label: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Input for the "moving on to NHS care" preparation sheet.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct NhsPrepData {
    #[serde(default)]
    pub user: Option<UserInfo>,
    #[serde(default, alias = "gp_name")]
    pub gp_name: Option<String>,
    #[serde(default, alias = "gp_practice")]
    pub gp_practice: Option<String>,
    #[serde(default, alias = "nhs_number")]
    pub nhs_number: Option<String>,
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
    #[serde(default)]
    pub questions: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub additional: Value,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ModuleProgressPayload {
    #[serde(default)]
    pub user: Option<UserInfo>,
    pub module: ModuleProgress,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ModuleCollectionPayload {
    #[serde(default)]
    pub user: Option<UserInfo>,
    #[serde(default)]
    pub modules: Vec<ModuleProgress>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn display_name_prefers_full_name() {
        let user = UserInfo { name: Some("Sam Jones".into()), first_name: Some("S".into()), ..Default::default() };
        assert_eq!(user.display_name().as_deref(), Some("Sam Jones"));
        let user = UserInfo { first_name: Some("Sam".into()), last_name: Some("Jones".into()), ..Default::default() };
        assert_eq!(user.display_name().as_deref(), Some("Sam Jones"));
        assert_eq!(UserInfo::default().display_name(), None);
    }

    #[test]
    fn progress_payload_accepts_camel_and_snake_case() {
        let camel: ModuleProgressPayload = serde_json::from_value(json!({
            "module": {"week": 1, "userProgress": {"anxiety-intro": {"completed": true, "notes": "felt better"}}}
        }))
        .unwrap();
        let snake: ModuleProgressPayload = serde_json::from_value(json!({
            "module": {"week": 1, "user_progress": {"anxiety-intro": {"completed": true, "notes": "felt better"}}}
        }))
        .unwrap();
        for payload in [camel, snake] {
            let progress = &payload.module.user_progress["anxiety-intro"];
            assert!(progress.completed);
            assert_eq!(progress.notes.as_deref(), Some("felt better"));
        }
    }

    #[test]
    fn unknown_activity_fields_are_kept() {
        let progress: ActivityProgress =
            serde_json::from_value(json!({"completed": false, "timeSpent": 12, "mood": "ok"})).unwrap();
        let keys: Vec<&str> = progress.extra.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["timeSpent", "mood"]);
        assert_eq!(progress.activity_type(), None);

        let typed: ActivityProgress = serde_json::from_value(json!({"activityType": "breathing"})).unwrap();
        assert_eq!(typed.activity_type(), Some("breathing"));
    }

    #[test]
    fn weekly_assessment_flattens_scores() {
        let weekly: WeeklyAssessment =
            serde_json::from_value(json!({"week": 2, "gad7Score": 9, "phq9Score": 6})).unwrap();
        assert_eq!(weekly.week, 2);
        assert_eq!(weekly.assessment.gad7_score, Some(9.0));
        assert_eq!(weekly.assessment.phq9_score, Some(6.0));
    }

    #[test]
    fn missing_or_null_fields_are_tolerated() {
        let data: MoodEntriesReportData =
            serde_json::from_value(json!({"entries": [{"date": "2024-03-01", "mood": null}, {"date": "2024-03-02"}]}))
                .unwrap();
        assert!(data.entries.iter().all(|e| e.mood.is_none()));

        let item: ChecklistItem = serde_json::from_value(json!({"completed": true})).unwrap();
        assert_eq!(item.label, "");
        assert!(item.completed);
    }

    #[test]
    fn mood_entry_aliases() {
        let entry: MoodEntry =
            serde_json::from_value(json!({"createdAt": "2024-03-05T09:30:00Z", "moodScore": 7, "anxietyLevel": 3}))
                .unwrap();
        assert_eq!(entry.mood, Some(7.0));
        assert_eq!(entry.anxiety, Some(3.0));
        assert!(matches!(entry.date, Value::Date(_)));
    }
}
