//! Derived figures shown in report summaries.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::{
    catalog::ModuleSummary,
    format::parse_date,
    models::{ModuleProgress, MoodEntry},
    value::Value,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub completed: usize,
    pub total: usize,
}

impl Completion {
    /// Catalogue activities drive the total when the week is known;
    /// otherwise every recorded activity counts.
    pub fn for_module(module: &ModuleProgress, summary: Option<&ModuleSummary>) -> Self {
        match summary {
            Some(summary) => Self {
                completed: summary
                    .activities
                    .iter()
                    .filter(|a| module.user_progress.get(a.id).is_some_and(|p| p.completed))
                    .count(),
                total: summary.activities.len(),
            },
            None => Self {
                completed: module.user_progress.values().filter(|p| p.completed).count(),
                total: module.user_progress.len(),
            },
        }
    }

    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.completed as f64 / self.total as f64) * 100.0).round() as u32
    }

    pub fn describe(&self) -> String {
        format!("{} of {} activities completed ({}%)", self.completed, self.total, self.percent())
    }
}

impl std::ops::Add for Completion {
    type Output = Completion;

    fn add(self, rhs: Self) -> Self::Output {
        Completion { completed: self.completed + rhs.completed, total: self.total + rhs.total }
    }
}

/// GAD-7 bands: 0-4 minimal, 5-9 mild, 10-14 moderate, 15+ severe.
pub fn gad7_severity(score: f64) -> &'static str {
    match score {
        s if s < 5.0 => "Minimal anxiety",
        s if s < 10.0 => "Mild anxiety",
        s if s < 15.0 => "Moderate anxiety",
        _ => "Severe anxiety",
    }
}

/// PHQ-9 bands: 0-4 minimal, 5-9 mild, 10-14 moderate, 15-19 moderately severe, 20+ severe.
pub fn phq9_severity(score: f64) -> &'static str {
    match score {
        s if s < 5.0 => "Minimal depression",
        s if s < 10.0 => "Mild depression",
        s if s < 15.0 => "Moderate depression",
        s if s < 20.0 => "Moderately severe depression",
        _ => "Severe depression",
    }
}

pub fn round1(n: f64) -> f64 { (n * 10.0).round() / 10.0 }

fn average(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| round1(sum / count as f64))
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoodSummary {
    pub entries: usize,
    pub average_mood: Option<f64>,
    pub average_anxiety: Option<f64>,
    pub first_date: Option<DateTime<Utc>>,
    pub last_date: Option<DateTime<Utc>>,
    pub top_activity: Option<(String, usize)>,
}

impl MoodSummary {
    pub fn from_entries(entries: &[MoodEntry]) -> Self {
        let dates: Vec<DateTime<Utc>> = entries
            .iter()
            .filter_map(|e| match &e.date {
                Value::Date(dt) => Some(*dt),
                Value::Text(s) => parse_date(s),
                _ => None,
            })
            .collect();

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for activity in entries.iter().flat_map(|e| e.activities.iter()) {
            let activity = activity.trim();
            if !activity.is_empty() {
                *counts.entry(activity).or_default() += 1;
            }
        }
        // BTreeMap order makes ties resolve alphabetically.
        let mut top_activity: Option<(String, usize)> = None;
        for (name, count) in counts {
            if top_activity.as_ref().map_or(true, |(_, best)| count > *best) {
                top_activity = Some((name.to_string(), count));
            }
        }

        Self {
            entries: entries.len(),
            average_mood: average(entries.iter().filter_map(|e| e.mood)),
            average_anxiety: average(entries.iter().filter_map(|e| e.anxiety)),
            first_date: dates.iter().min().copied(),
            last_date: dates.iter().max().copied(),
            top_activity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{catalog::module_summary, models::ActivityProgress};
    use pretty_assertions::assert_eq;

    fn progress(completed: bool) -> ActivityProgress { ActivityProgress { completed, ..Default::default() } }

    #[test]
    fn completion_counts_catalogue_activities_only() {
        let mut module = ModuleProgress { week: 1, ..Default::default() };
        module.user_progress.insert("anxiety-intro".into(), progress(true));
        module.user_progress.insert("anxiety-cycle".into(), progress(false));
        module.user_progress.insert("not-in-catalogue".into(), progress(true));
        let c = Completion::for_module(&module, module_summary(1));
        assert_eq!(c, Completion { completed: 1, total: 4 });
        assert_eq!(c.percent(), 25);
        assert_eq!(c.describe(), "1 of 4 activities completed (25%)");
    }

    #[test]
    fn completion_without_catalogue_uses_recorded_activities() {
        let mut module = ModuleProgress { week: 9, ..Default::default() };
        module.user_progress.insert("a".into(), progress(true));
        module.user_progress.insert("b".into(), progress(true));
        module.user_progress.insert("c".into(), progress(false));
        let c = Completion::for_module(&module, None);
        assert_eq!(c.percent(), 67);
        assert_eq!(Completion { completed: 0, total: 0 }.percent(), 0);
    }

    #[test]
    fn severity_bands() {
        assert_eq!(gad7_severity(4.0), "Minimal anxiety");
        assert_eq!(gad7_severity(10.0), "Moderate anxiety");
        assert_eq!(gad7_severity(21.0), "Severe anxiety");
        assert_eq!(phq9_severity(17.0), "Moderately severe depression");
    }

    #[test]
    fn mood_summary_averages_and_range() {
        let entries = vec![
            MoodEntry {
                date: Value::text("2024-03-02"),
                mood: Some(6.0),
                anxiety: Some(5.0),
                activities: vec!["walk".into(), "read".into()],
                ..Default::default()
            },
            MoodEntry {
                date: Value::text("2024-03-01"),
                mood: Some(7.0),
                anxiety: None,
                activities: vec!["walk".into()],
                ..Default::default()
            },
            MoodEntry { date: Value::text("yesterday"), mood: Some(4.0), ..Default::default() },
        ];
        let summary = MoodSummary::from_entries(&entries);
        assert_eq!(summary.entries, 3);
        assert_eq!(summary.average_mood, Some(5.7));
        assert_eq!(summary.average_anxiety, Some(5.0));
        assert_eq!(summary.first_date.map(|d| d.format("%F").to_string()).as_deref(), Some("2024-03-01"));
        assert_eq!(summary.last_date.map(|d| d.format("%F").to_string()).as_deref(), Some("2024-03-02"));
        assert_eq!(summary.top_activity, Some(("walk".to_string(), 2)));
    }

    #[test]
    fn entries_without_mood_are_left_out_of_the_average() {
        let entries = vec![
            MoodEntry { mood: Some(8.0), ..Default::default() },
            MoodEntry { mood: None, ..Default::default() },
        ];
        let summary = MoodSummary::from_entries(&entries);
        assert_eq!(summary.entries, 2);
        assert_eq!(summary.average_mood, Some(8.0));
    }

    #[test]
    fn empty_mood_summary() {
        let summary = MoodSummary::from_entries(&[]);
        assert_eq!(summary.average_mood, None);
        assert_eq!(summary.top_activity, None);
    }
}
