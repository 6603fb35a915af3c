use serde::Deserialize;

use crate::error::GenerateError;

static PROMPT_TEMPLATE: &str = include_str!("prompt_template.md");

/// Lesson-plan parameters collected from the user.
///
/// Field names are snake_case in TOML; the camelCase names used by the web
/// form are accepted as aliases.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LessonInput {
    pub author: String,
    pub institution: String,
    #[serde(alias = "schoolLevel")]
    pub school_level: String,
    #[serde(alias = "classPhase")]
    pub class_phase: String,
    pub subject: String,
    #[serde(alias = "timeAllocation")]
    pub time_allocation: String,
    #[serde(alias = "learningOutcomes")]
    pub learning_outcomes: String,
    #[serde(alias = "learningObjectives")]
    pub learning_objectives: String,
}

impl LessonInput {
    /// Learning outcomes and objectives are required; everything else may be blank.
    pub fn validate(&self) -> Result<(), GenerateError> {
        if self.learning_outcomes.trim().is_empty() {
            return Err(GenerateError::MissingField("learning_outcomes"));
        }
        if self.learning_objectives.trim().is_empty() {
            return Err(GenerateError::MissingField("learning_objectives"));
        }
        Ok(())
    }
}

/// Fill the instruction template with the lesson parameters.
pub fn build_prompt(input: &LessonInput) -> String {
    let fields = [
        ("{{subject_upper}}", input.subject.to_uppercase()),
        ("{{author}}", input.author.clone()),
        ("{{institution}}", input.institution.clone()),
        ("{{school_level}}", input.school_level.clone()),
        ("{{class_phase}}", input.class_phase.clone()),
        ("{{subject}}", input.subject.clone()),
        ("{{time_allocation}}", input.time_allocation.clone()),
        ("{{learning_outcomes}}", input.learning_outcomes.clone()),
        ("{{learning_objectives}}", input.learning_objectives.clone()),
    ];

    // Single pass so user text containing "{{...}}" is never re-substituted
    let mut out = String::with_capacity(PROMPT_TEMPLATE.len() + 512);
    let mut rest = PROMPT_TEMPLATE;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match fields.iter().find(|(key, _)| tail.starts_with(key)) {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len()..];
            }
            None => {
                out.push_str("{{");
                rest = &tail[2..];
            }
        }
    }
    out.push_str(rest);
    out
}
