//! Report assemblers.
//!
//! Each `generate_*_pdf` function validates its payload, lays out a fixed
//! sequence of sections through a fresh [`LayoutWriter`] and hands back the
//! finished [`Document`]. Pagination is left to the writer, except that the
//! multi-module report starts every module on its own page.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    catalog::{module_summary, ModuleSummary},
    error::ReportError,
    format::{format_activity_type, format_date, format_date_value, format_key, format_number},
    layout::{Document, LayoutWriter, PageLayout, TextStyle},
    models::{
        ModuleCollectionPayload, ModuleProgress, ModuleProgressPayload, MoodEntriesReportData, MoodEntry, NhsPrepData,
        ReportData, UserInfo,
    },
    summary::{gad7_severity, phq9_severity, Completion, MoodSummary},
    tree::{render_key_value, render_progress_details, write_lines},
    value::Value,
};

const TITLE_SIZE: f32 = 18.0;
const SECTION_SIZE: f32 = 14.0;
const SUBSECTION_SIZE: f32 = 12.0;
const SMALL_SIZE: f32 = 9.0;
const SECTION_GAP: f32 = 6.0;
const ITEM_GAP: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    Module,
    Modules,
    Progress,
    MoodEntries,
    NhsPrep,
}

impl ReportKind {
    /// Name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            ReportKind::Module => "Module report",
            ReportKind::Modules => "Module collection report",
            ReportKind::Progress => "Progress report",
            ReportKind::MoodEntries => "Mood report",
            ReportKind::NhsPrep => "NHS transition report",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ReportKind::Module => "Module Progress Report",
            ReportKind::Modules => "Anxiety Programme Modules",
            ReportKind::Progress => "Anxiety Programme Progress Report",
            ReportKind::MoodEntries => "Mood Tracker Report",
            ReportKind::NhsPrep => "Preparing for NHS Care",
        }
    }

    fn file_prefix(self) -> &'static str {
        match self {
            ReportKind::Module => "module-progress-report",
            ReportKind::Modules => "anxiety-program-modules",
            ReportKind::Progress => "anxiety-program-progress-report",
            ReportKind::MoodEntries => "mood-tracker-report",
            ReportKind::NhsPrep => "nhs-transition-prep",
        }
    }

    /// `mood-tracker-report-2024-03-05.pdf`
    pub fn filename(self, date: NaiveDate) -> String { format!("{}-{}.pdf", self.file_prefix(), date.format("%Y-%m-%d")) }
}

/// Name of the JSON progress export for a given day.
pub fn progress_export_filename(date: NaiveDate) -> String {
    format!("anxiety-program-progress-{}.json", date.format("%Y-%m-%d"))
}

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub layout: PageLayout,
    pub generated_at: DateTime<Utc>,
}

impl RenderOptions {
    pub fn new(layout: PageLayout) -> Self { Self { layout, generated_at: Utc::now() } }

    pub fn at(mut self, generated_at: DateTime<Utc>) -> Self {
        self.generated_at = generated_at;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self { Self::new(PageLayout::default()) }
}

fn body() -> TextStyle { TextStyle::default() }

fn section(writer: &mut LayoutWriter, title: &str) {
    writer.add_gap(SECTION_GAP);
    writer.add_text(title, TextStyle::heading(SECTION_SIZE));
    writer.add_gap(1.0);
}

fn subsection(writer: &mut LayoutWriter, title: &str, indent: u16) {
    writer.add_gap(ITEM_GAP);
    writer.add_text(title, TextStyle::heading(SUBSECTION_SIZE).indent(indent));
}

fn field(writer: &mut LayoutWriter, label: &str, value: &str, indent: u16) {
    let value = value.trim();
    if !value.is_empty() {
        writer.add_text(&format!("{label}: {value}"), body().indent(indent));
    }
}

fn optional_field(writer: &mut LayoutWriter, label: &str, value: Option<&str>, indent: u16) {
    if let Some(value) = value {
        field(writer, label, value, indent);
    }
}

fn date_field(writer: &mut LayoutWriter, label: &str, value: Option<&Value>, indent: u16) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        field(writer, label, &format_date_value(value), indent);
    }
}

fn nested_block(writer: &mut LayoutWriter, label: &str, value: &Value, indent: u16) {
    if value.is_empty() {
        return;
    }
    writer.add_text(&format!("{label}:"), body().bold().indent(indent));
    write_lines(writer, &render_key_value(value, indent + 1), body());
}

/// Bold title, generation timestamp and whichever identity fields the
/// user record carries.
pub fn render_report_header(
    writer: &mut LayoutWriter,
    title: &str,
    user: Option<&UserInfo>,
    generated_at: DateTime<Utc>,
) {
    writer.add_text(title, TextStyle::heading(TITLE_SIZE));
    writer.add_text(&format!("Generated: {}", format_date(&generated_at)), body().size(SMALL_SIZE));
    if let Some(user) = user {
        writer.add_gap(ITEM_GAP);
        optional_field(writer, "Name", user.display_name().as_deref(), 0);
        optional_field(writer, "Email", user.email.as_deref(), 0);
    }
    writer.add_gap(SECTION_GAP);
}

fn module_heading(module: &ModuleProgress, summary: Option<&ModuleSummary>) -> String {
    let title = summary
        .map(|s| s.title.to_string())
        .or_else(|| module.title.clone().filter(|t| !t.trim().is_empty()));
    match title {
        Some(title) => format!("Week {}: {}", module.week, title),
        None => format!("Week {}", module.week),
    }
}

/// One module: catalogue description and objectives, completion figures,
/// then every activity with the user's recorded progress.
pub fn render_module_section(writer: &mut LayoutWriter, module: &ModuleProgress, summary: Option<&ModuleSummary>) {
    writer.add_text(&module_heading(module, summary), TextStyle::heading(SECTION_SIZE));
    if let Some(summary) = summary {
        writer.add_text(summary.description, body());
        writer.add_gap(ITEM_GAP);
        writer.add_text("Objectives:", body().bold());
        for objective in summary.objectives {
            writer.add_text(&format!("- {objective}"), body().indent(1));
        }
    }
    writer.add_gap(ITEM_GAP);
    field(writer, "Progress", &Completion::for_module(module, summary).describe(), 0);
    date_field(writer, "Started", module.started_at.as_ref(), 0);
    date_field(writer, "Completed", module.completed_at.as_ref(), 0);

    subsection(writer, "Activities", 0);
    let mut rendered_any = false;
    if let Some(summary) = summary {
        for activity in summary.activities {
            writer.add_gap(1.5);
            writer.add_text(&activity.label(), body().bold().indent(1));
            match module.user_progress.get(activity.id) {
                Some(progress) => write_lines(writer, &render_progress_details(progress, 2), body()),
                None => writer.add_text("Status: Not started", body().indent(2)),
            }
            rendered_any = true;
        }
    }
    for (id, progress) in &module.user_progress {
        if summary.is_some_and(|s| s.activity(id).is_some()) {
            continue;
        }
        writer.add_gap(1.5);
        let label = match progress.activity_type() {
            Some(kind) => format!("{} ({})", format_key(id), format_activity_type(kind)),
            None => format_key(id),
        };
        writer.add_text(&label, body().bold().indent(1));
        write_lines(writer, &render_progress_details(progress, 2), body());
        rendered_any = true;
    }
    if !rendered_any {
        writer.add_text("No activity recorded for this module.", body().indent(1));
    }
}

fn finish(writer: LayoutWriter, kind: ReportKind) -> Document {
    let document = writer.finish();
    info!(report = kind.name(), pages = document.page_count(), "📄 Report laid out");
    document
}

pub fn generate_module_pdf(payload: &ModuleProgressPayload, options: &RenderOptions) -> Result<Document, ReportError> {
    let kind = ReportKind::Module;
    let mut writer = LayoutWriter::new(kind.title(), options.layout);
    render_report_header(&mut writer, kind.title(), payload.user.as_ref(), options.generated_at);
    let summary = module_summary(payload.module.week);
    render_module_section(&mut writer, &payload.module, summary);
    Ok(finish(writer, kind))
}

pub fn generate_modules_pdf(payload: &ModuleCollectionPayload, options: &RenderOptions) -> Result<Document, ReportError> {
    build_modules_pdf(payload, options).map_err(|e| ReportError::generation_failed(ReportKind::Modules.name(), e))
}

fn build_modules_pdf(payload: &ModuleCollectionPayload, options: &RenderOptions) -> Result<Document, ReportError> {
    if payload.modules.is_empty() {
        return Err(ReportError::MissingInput("At least one module is required"));
    }
    let kind = ReportKind::Modules;
    let mut modules: Vec<&ModuleProgress> = payload.modules.iter().collect();
    modules.sort_by_key(|m| m.week);

    let mut writer = LayoutWriter::new(kind.title(), options.layout);
    render_report_header(&mut writer, kind.title(), payload.user.as_ref(), options.generated_at);
    section(&mut writer, "Overview");
    let mut overall = Completion { completed: 0, total: 0 };
    for module in &modules {
        let summary = module_summary(module.week);
        let completion = Completion::for_module(module, summary);
        overall = overall + completion;
        writer.add_text(&format!("{} - {}", module_heading(module, summary), completion.describe()), body());
    }
    writer.add_gap(ITEM_GAP);
    field(&mut writer, "Overall", &overall.describe(), 0);

    for module in modules {
        writer.add_page();
        render_module_section(&mut writer, module, module_summary(module.week));
    }
    Ok(finish(writer, kind))
}

pub fn generate_progress_report_pdf(data: &ReportData, options: &RenderOptions) -> Result<Document, ReportError> {
    build_progress_report(data, options).map_err(|e| ReportError::generation_failed(ReportKind::Progress.name(), e))
}

fn score_line(label: &str, score: f64, band: fn(f64) -> &'static str, baseline: Option<f64>) -> String {
    let mut line = format!("{label}: {} ({})", format_number(score), band(score));
    if let Some(baseline) = baseline {
        let change = score - baseline;
        let sign = if change > 0.0 { "+" } else { "" };
        line.push_str(&format!(", change from baseline: {sign}{}", format_number(change)));
    }
    line
}

fn build_progress_report(data: &ReportData, options: &RenderOptions) -> Result<Document, ReportError> {
    let user = data.user.as_ref().ok_or(ReportError::MissingInput("User data is required"))?;
    let onboarding = data.onboarding.as_ref().ok_or(ReportError::MissingInput("Onboarding data is required"))?;
    let kind = ReportKind::Progress;

    let mut writer = LayoutWriter::new(kind.title(), options.layout);
    render_report_header(&mut writer, kind.title(), Some(user), options.generated_at);

    section(&mut writer, "Baseline Assessment");
    date_field(&mut writer, "Completed", onboarding.completed_at.as_ref(), 0);
    if let Some(score) = onboarding.gad7_score {
        writer.add_text(&score_line("GAD-7 Score", score, gad7_severity, None), body());
    }
    if let Some(score) = onboarding.phq9_score {
        writer.add_text(&score_line("PHQ-9 Score", score, phq9_severity, None), body());
    }
    nested_block(&mut writer, "Responses", &onboarding.responses, 0);

    section(&mut writer, "Weekly Assessments");
    if data.weekly_assessments.is_empty() {
        writer.add_text("No weekly assessments completed yet.", body());
    }
    let mut weekly: Vec<_> = data.weekly_assessments.iter().collect();
    weekly.sort_by_key(|w| w.week);
    for entry in weekly {
        let assessment = &entry.assessment;
        subsection(&mut writer, &format!("Week {}", entry.week), 0);
        date_field(&mut writer, "Completed", assessment.completed_at.as_ref(), 1);
        if let Some(score) = assessment.gad7_score {
            writer.add_text(&score_line("GAD-7 Score", score, gad7_severity, onboarding.gad7_score), body().indent(1));
        }
        if let Some(score) = assessment.phq9_score {
            writer.add_text(&score_line("PHQ-9 Score", score, phq9_severity, onboarding.phq9_score), body().indent(1));
        }
        nested_block(&mut writer, "Responses", &assessment.responses, 1);
    }

    section(&mut writer, "Module Progress");
    if data.modules.is_empty() {
        writer.add_text("No modules started yet.", body());
    } else {
        let mut modules: Vec<_> = data.modules.iter().collect();
        modules.sort_by_key(|m| m.week);
        let mut overall = Completion { completed: 0, total: 0 };
        for module in modules {
            let summary = module_summary(module.week);
            let completion = Completion::for_module(module, summary);
            overall = overall + completion;
            writer.add_text(&format!("{} - {}", module_heading(module, summary), completion.describe()), body());
        }
        writer.add_gap(ITEM_GAP);
        field(&mut writer, "Overall", &overall.describe(), 0);
    }
    Ok(finish(writer, kind))
}

pub fn generate_mood_entries_pdf(data: &MoodEntriesReportData, options: &RenderOptions) -> Result<Document, ReportError> {
    build_mood_entries(data, options).map_err(|e| ReportError::generation_failed(ReportKind::MoodEntries.name(), e))
}

fn out_of_ten(n: f64) -> String { format!("{}/10", format_number(n)) }

fn render_mood_entry(writer: &mut LayoutWriter, entry: &MoodEntry) {
    let heading = match format_date_value(&entry.date) {
        date if date.is_empty() => "Undated entry".to_string(),
        date => date,
    };
    subsection(writer, &heading, 0);
    optional_field(writer, "Mood", entry.mood.map(out_of_ten).as_deref(), 1);
    optional_field(writer, "Anxiety", entry.anxiety.map(out_of_ten).as_deref(), 1);
    optional_field(writer, "Energy", entry.energy.map(out_of_ten).as_deref(), 1);
    optional_field(writer, "Sleep", entry.sleep_hours.map(|h| format!("{} hours", format_number(h))).as_deref(), 1);
    field(writer, "Activities", &entry.activities.join(", "), 1);
    field(writer, "Triggers", &entry.triggers.join(", "), 1);
    optional_field(writer, "Notes", entry.notes.as_deref(), 1);
    nested_block(writer, "Details", &entry.details, 1);
}

fn build_mood_entries(data: &MoodEntriesReportData, options: &RenderOptions) -> Result<Document, ReportError> {
    let user = data.user.as_ref().ok_or(ReportError::MissingInput("User data is required"))?;
    let kind = ReportKind::MoodEntries;

    let mut writer = LayoutWriter::new(kind.title(), options.layout);
    render_report_header(&mut writer, kind.title(), Some(user), options.generated_at);

    section(&mut writer, "Summary");
    if data.entries.is_empty() {
        writer.add_text("No mood entries recorded.", body());
        return Ok(finish(writer, kind));
    }
    let summary = MoodSummary::from_entries(&data.entries);
    field(&mut writer, "Entries", &summary.entries.to_string(), 0);
    if let (Some(first), Some(last)) = (summary.first_date, summary.last_date) {
        field(&mut writer, "Period", &format!("{} to {}", first.format("%-d %B %Y"), last.format("%-d %B %Y")), 0);
    }
    optional_field(&mut writer, "Average mood", summary.average_mood.map(out_of_ten).as_deref(), 0);
    optional_field(&mut writer, "Average anxiety", summary.average_anxiety.map(out_of_ten).as_deref(), 0);
    if let Some((activity, count)) = &summary.top_activity {
        let times = if *count == 1 { "time" } else { "times" };
        field(&mut writer, "Most frequent activity", &format!("{activity} ({count} {times})"), 0);
    }

    section(&mut writer, "Entries");
    for entry in &data.entries {
        render_mood_entry(&mut writer, entry);
    }
    Ok(finish(writer, kind))
}

pub fn generate_nhs_prep_pdf(data: &NhsPrepData, options: &RenderOptions) -> Result<Document, ReportError> {
    build_nhs_prep(data, options).map_err(|e| ReportError::generation_failed(ReportKind::NhsPrep.name(), e))
}

fn build_nhs_prep(data: &NhsPrepData, options: &RenderOptions) -> Result<Document, ReportError> {
    let user = data.user.as_ref().ok_or(ReportError::MissingInput("User data is required"))?;
    let kind = ReportKind::NhsPrep;

    let mut writer = LayoutWriter::new(kind.title(), options.layout);
    render_report_header(&mut writer, kind.title(), Some(user), options.generated_at);

    let has_details = [&data.nhs_number, &data.gp_name, &data.gp_practice]
        .into_iter()
        .any(|v| v.as_deref().is_some_and(|s| !s.trim().is_empty()));
    if has_details {
        section(&mut writer, "Your Details");
        optional_field(&mut writer, "NHS Number", data.nhs_number.as_deref(), 0);
        optional_field(&mut writer, "GP", data.gp_name.as_deref(), 0);
        optional_field(&mut writer, "GP Practice", data.gp_practice.as_deref(), 0);
    }

    section(&mut writer, "Checklist");
    if data.checklist.is_empty() {
        writer.add_text("No checklist items.", body());
    } else {
        let done = data.checklist.iter().filter(|i| i.completed).count();
        writer.add_text(&format!("{done} of {} items completed", data.checklist.len()), body().size(SMALL_SIZE));
        for item in &data.checklist {
            let status = if item.completed { "[Done]" } else { "[To do]" };
            let label = match item.label.trim() {
                "" => "Untitled item",
                label => label,
            };
            writer.add_text(&format!("{status} {label}"), body());
            optional_field(&mut writer, "Notes", item.notes.as_deref(), 1);
        }
    }

    if !data.questions.is_empty() {
        section(&mut writer, "Questions for Your GP");
        let questions = data.questions.iter().map(|q| q.trim()).filter(|q| !q.is_empty());
        for (i, question) in questions.enumerate() {
            writer.add_text(&format!("{}. {question}", i + 1), body());
        }
    }

    if let Some(notes) = data.notes.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        section(&mut writer, "Notes");
        writer.add_text(notes, body());
    }

    if !data.additional.is_empty() {
        section(&mut writer, "Additional Information");
        write_lines(&mut writer, &render_key_value(&data.additional, 0), body());
    }
    Ok(finish(writer, kind))
}
