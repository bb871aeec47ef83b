use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SequenceStatus {
    #[default]
    Draft,
    Published,
}

impl SequenceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SequenceStatus::Draft => "DRAFT",
            SequenceStatus::Published => "PUBLISHED",
        }
    }
}

impl fmt::Display for SequenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SequenceStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DRAFT" => Ok(SequenceStatus::Draft),
            "PUBLISHED" => Ok(SequenceStatus::Published),
            other => Err(format!("unknown sequence status: {}", other)),
        }
    }
}

/// 步驟的外展管道
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepType {
    #[default]
    Email,
    Linkedin,
    Call,
}

impl std::str::FromStr for StepType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "email" => Ok(StepType::Email),
            "linkedin" => Ok(StepType::Linkedin),
            "call" => Ok(StepType::Call),
            other => Err(format!("unknown step type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    #[serde(default)]
    pub step_title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default = "default_delay_days")]
    pub delay_days: String,
    #[serde(rename = "type", default)]
    pub step_type: StepType,
    #[serde(with = "numeric_string")]
    pub step_number: u32,
    /// Soft-delete marker. Marked steps are dropped before any update is sent.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_deleted: bool,
}

impl Step {
    /// Empty email step with a one day delay, the shape a new campaign form starts from.
    pub fn blank(step_number: u32) -> Self {
        Self {
            step_title: String::new(),
            content: String::new(),
            delay_days: default_delay_days(),
            step_type: StepType::Email,
            step_number,
            is_deleted: false,
        }
    }
}

fn default_delay_days() -> String {
    "1".to_string()
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub status: SequenceStatus,
    #[serde(default)]
    pub is_active: bool,
}

impl Sequence {
    /// Rebuilds `content` from the step contents, separated by a blank line.
    pub fn refresh_content(&mut self) {
        self.content = joined_content(&self.steps);
    }
}

pub fn joined_content(steps: &[Step]) -> String {
    steps
        .iter()
        .map(|s| s.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSequenceData {
    pub title: String,
    pub description: String,
    pub content: String,
    pub steps: Vec<Step>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SequenceStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl CreateSequenceData {
    /// New inactive draft. Steps are renumbered 1..N in the given order.
    pub fn new(title: impl Into<String>, description: impl Into<String>, steps: Vec<Step>) -> Self {
        let steps: Vec<Step> = steps
            .into_iter()
            .enumerate()
            .map(|(i, mut step)| {
                step.step_number = i as u32 + 1;
                step
            })
            .collect();
        Self {
            title: title.into(),
            description: description.into(),
            content: joined_content(&steps),
            steps,
            status: Some(SequenceStatus::Draft),
            is_active: Some(false),
        }
    }
}

/// Partial update; absent fields are left untouched by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSequenceData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<Step>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SequenceStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl UpdateSequenceData {
    pub fn steps(steps: Vec<Step>) -> Self {
        Self {
            content: Some(joined_content(&steps)),
            steps: Some(steps),
            ..Default::default()
        }
    }

    pub fn active(is_active: bool) -> Self {
        Self {
            is_active: Some(is_active),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListSequencesParams {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub active_only: Option<bool>,
    pub status: Option<SequenceStatus>,
}

impl ListSequencesParams {
    /// Query pairs for the options that are set, in a fixed order.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(limit) = self.limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            query.push(("offset", offset.to_string()));
        }
        if let Some(active_only) = self.active_only {
            query.push(("active_only", active_only.to_string()));
        }
        if let Some(status) = self.status {
            query.push(("status", status.as_str().to_string()));
        }
        query
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SequenceList {
    #[serde(default)]
    pub sequences: Vec<Sequence>,
}

/// Changes to a single step coming from the step editor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepEdit {
    pub step_title: Option<String>,
    pub content: Option<String>,
    pub delay_days: Option<String>,
    pub step_type: Option<StepType>,
    pub delete: bool,
}

impl StepEdit {
    pub fn delete() -> Self {
        Self {
            delete: true,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.step_title.is_none()
            && self.content.is_none()
            && self.delay_days.is_none()
            && self.step_type.is_none()
            && !self.delete
    }

    pub fn apply_to(&self, step: &mut Step) {
        if let Some(title) = &self.step_title {
            step.step_title = title.clone();
        }
        if let Some(content) = &self.content {
            step.content = content.clone();
        }
        if let Some(delay) = &self.delay_days {
            step.delay_days = delay.clone();
        }
        if let Some(step_type) = self.step_type {
            step.step_type = step_type;
        }
        if self.delete {
            step.is_deleted = true;
        }
    }
}

/// 數字欄位在 API 上以字串傳遞，但讀取時也接受數字
mod numeric_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u32),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(n),
            Raw::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
        }
    }
}
