//! The six-week programme catalogue.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Reading,
    Worksheet,
    Reflection,
    Exercise,
    Breathing,
    Assessment,
}

impl ActivityType {
    pub fn label(self) -> &'static str {
        match self {
            ActivityType::Reading => "Reading",
            ActivityType::Worksheet => "Worksheet",
            ActivityType::Reflection => "Reflection",
            ActivityType::Exercise => "Exercise",
            ActivityType::Breathing => "Breathing Exercise",
            ActivityType::Assessment => "Assessment",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownActivityType(pub String);

impl FromStr for ActivityType {
    type Err = UnknownActivityType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reading" => Ok(ActivityType::Reading),
            "worksheet" => Ok(ActivityType::Worksheet),
            "reflection" => Ok(ActivityType::Reflection),
            "exercise" => Ok(ActivityType::Exercise),
            "breathing" => Ok(ActivityType::Breathing),
            "assessment" => Ok(ActivityType::Assessment),
            _ => Err(UnknownActivityType(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: &'static str,
    pub title: &'static str,
    #[serde(rename = "type")]
    pub kind: ActivityType,
    pub estimated_minutes: u32,
}

impl Activity {
    /// "Understanding Anxiety (Reading, 10 min)"
    pub fn label(&self) -> String {
        format!("{} ({}, {} min)", self.title, self.kind.label(), self.estimated_minutes)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleSummary {
    pub week: u32,
    pub title: &'static str,
    pub description: &'static str,
    pub objectives: &'static [&'static str],
    pub activities: &'static [Activity],
}

impl ModuleSummary {
    pub fn activity(&self, id: &str) -> Option<&'static Activity> {
        self.activities.iter().find(|a| a.id == id)
    }

    pub fn total_minutes(&self) -> u32 { self.activities.iter().map(|a| a.estimated_minutes).sum() }
}

const fn activity(id: &'static str, title: &'static str, kind: ActivityType, estimated_minutes: u32) -> Activity {
    Activity { id, title, kind, estimated_minutes }
}

use ActivityType::*;

static MODULES: [ModuleSummary; 6] = [
    ModuleSummary {
        week: 1,
        title: "Understanding Anxiety",
        description: "What anxiety is, why it happens and how it keeps itself going.",
        objectives: &[
            "Recognise the physical, emotional and behavioural signs of anxiety",
            "Understand the fight-or-flight response",
            "Set personal goals for the programme",
        ],
        activities: &[
            activity("anxiety-intro", "Introduction to Anxiety", Reading, 10),
            activity("anxiety-cycle", "Mapping Your Anxiety Cycle", Worksheet, 15),
            activity("personal-goals", "Setting Personal Goals", Reflection, 10),
            activity("week1-breathing", "Calm Breathing", Breathing, 5),
        ],
    },
    ModuleSummary {
        week: 2,
        title: "Noticing Anxious Thoughts",
        description: "Catching automatic thoughts and the situations that trigger them.",
        objectives: &[
            "Identify automatic negative thoughts",
            "Link thoughts to feelings and behaviours",
            "Start a thought record",
        ],
        activities: &[
            activity("thoughts-feelings", "Thoughts, Feelings and Actions", Reading, 10),
            activity("thought-record-intro", "Your First Thought Record", Worksheet, 20),
            activity("trigger-reflection", "Reflecting on Triggers", Reflection, 10),
            activity("body-scan", "Body Scan", Exercise, 10),
        ],
    },
    ModuleSummary {
        week: 3,
        title: "Challenging Unhelpful Thinking",
        description: "Weighing the evidence and finding balanced alternatives.",
        objectives: &[
            "Recognise common thinking traps",
            "Examine evidence for and against a thought",
            "Develop balanced alternative thoughts",
        ],
        activities: &[
            activity("thinking-traps", "Common Thinking Traps", Reading, 15),
            activity("evidence-worksheet", "Examining the Evidence", Worksheet, 20),
            activity("balanced-thoughts", "Balanced Thinking", Reflection, 15),
            activity("box-breathing", "Box Breathing", Breathing, 5),
        ],
    },
    ModuleSummary {
        week: 4,
        title: "Facing Your Fears",
        description: "Reducing avoidance through planned, gradual exposure.",
        objectives: &[
            "Understand how avoidance maintains anxiety",
            "Build a fear ladder",
            "Plan and review a first exposure step",
        ],
        activities: &[
            activity("avoidance-cycle", "The Avoidance Trap", Reading, 10),
            activity("fear-ladder", "Building a Fear Ladder", Worksheet, 25),
            activity("exposure-practice", "Exposure Practice", Exercise, 20),
            activity("exposure-review", "Reviewing Your Exposure", Reflection, 10),
        ],
    },
    ModuleSummary {
        week: 5,
        title: "Managing Worry and Physical Symptoms",
        description: "Tools for worry time, problem solving and settling the body.",
        objectives: &[
            "Distinguish practical from hypothetical worries",
            "Use scheduled worry time",
            "Practise progressive muscle relaxation",
        ],
        activities: &[
            activity("worry-types", "Types of Worry", Reading, 10),
            activity("problem-solving", "Problem Solving Steps", Worksheet, 20),
            activity("muscle-relaxation", "Progressive Muscle Relaxation", Exercise, 15),
            activity("worry-time", "Worry Time Reflection", Reflection, 10),
        ],
    },
    ModuleSummary {
        week: 6,
        title: "Staying Well",
        description: "Consolidating progress and planning for setbacks.",
        objectives: &[
            "Review what has helped most",
            "Recognise early warning signs",
            "Write a relapse prevention plan",
        ],
        activities: &[
            activity("progress-review", "Looking Back on Your Progress", Reflection, 15),
            activity("warning-signs", "Early Warning Signs", Worksheet, 15),
            activity("relapse-plan", "Relapse Prevention Plan", Worksheet, 25),
            activity("final-assessment", "Final Assessment", Assessment, 10),
        ],
    },
];

/// Looks up a week of the programme. Weeks outside 1..=6 return `None`
/// rather than defaulting to week 1.
pub fn module_summary(week: u32) -> Option<&'static ModuleSummary> {
    MODULES.iter().find(|m| m.week == week)
}

pub fn all_modules() -> &'static [ModuleSummary] { &MODULES }
