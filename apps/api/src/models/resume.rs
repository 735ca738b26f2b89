//! The structured resume produced by the rewrite model and consumed by the renderer.
//!
//! Validation happens once, when JSON is deserialized into `ResumeRecord`. Absent or `null`
//! fields become empty strings / empty lists so the renderer never has to re-check them.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeRecord {
    /// The only required field. Drives the download file name.
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub contact: ContactInfo,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(default, deserialize_with = "deserialize_skills")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub education: Vec<EducationEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub projects: Vec<ProjectEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(
        default,
        alias = "profile",
        alias = "profile_link",
        deserialize_with = "null_as_default"
    )]
    pub linkedin: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub github: String,
}

impl ContactInfo {
    /// Non-empty contact fields in display order.
    pub fn items(&self) -> Vec<&str> {
        [&self.email, &self.phone, &self.linkedin, &self.github]
            .into_iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    #[serde(default, alias = "position", deserialize_with = "null_as_default")]
    pub role: String,
    #[serde(default, alias = "company", deserialize_with = "null_as_default")]
    pub organization: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub duration: String,
    #[serde(
        default,
        alias = "duties",
        alias = "responsibilities",
        deserialize_with = "null_as_default"
    )]
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub degree: String,
    #[serde(
        default,
        alias = "university",
        alias = "school",
        deserialize_with = "null_as_default"
    )]
    pub institution: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub duration: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(
        default,
        alias = "tech_stack",
        alias = "technologies_used",
        deserialize_with = "null_as_default"
    )]
    pub technologies: Vec<String>,
}

impl ResumeRecord {
    /// Download name: trimmed name, whitespace replaced by `_`, header-unsafe characters dropped.
    pub fn output_file_name(&self) -> String {
        let stem: String = self
            .name
            .trim()
            .chars()
            .filter(|c| !matches!(c, '"' | '\\' | '/') && !(c.is_control() && !c.is_whitespace()))
            .map(|c| if c.is_whitespace() { '_' } else { c })
            .collect();

        if stem.is_empty() {
            "Resume.pdf".to_string()
        } else {
            format!("{stem}_Resume.pdf")
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Lenient field decoding
// ────────────────────────────────────────────────────────────────────────────

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Skills arrive as a flat list, as a grouped object keyed by category,
/// or occasionally as one comma-separated string.
#[derive(Deserialize)]
#[serde(untagged)]
enum SkillsField {
    List(Vec<String>),
    Grouped(SkillGroups),
    Csv(String),
}

#[derive(Deserialize)]
struct SkillGroups {
    #[serde(default, deserialize_with = "deserialize_skill_group")]
    languages: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_skill_group")]
    frameworks: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_skill_group")]
    databases: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_skill_group")]
    tools: Vec<String>,
    #[serde(flatten)]
    other: BTreeMap<String, SkillGroup>,
}

/// One category inside grouped skills. Values that are neither a list nor text are dropped.
#[derive(Deserialize)]
#[serde(untagged)]
enum SkillGroup {
    List(Vec<String>),
    Csv(String),
    Ignored(serde_json::Value),
}

impl SkillGroup {
    fn into_list(self) -> Vec<String> {
        match self {
            SkillGroup::List(list) => list,
            SkillGroup::Csv(raw) => split_csv(&raw),
            SkillGroup::Ignored(_) => Vec::new(),
        }
    }
}

impl SkillsField {
    fn into_list(self) -> Vec<String> {
        match self {
            SkillsField::List(list) => list,
            SkillsField::Grouped(groups) => groups
                .languages
                .into_iter()
                .chain(groups.frameworks)
                .chain(groups.databases)
                .chain(groups.tools)
                .chain(groups.other.into_values().flat_map(SkillGroup::into_list))
                .collect(),
            SkillsField::Csv(raw) => split_csv(&raw),
        }
    }
}

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn deserialize_skill_group<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<SkillGroup>::deserialize(deserializer)?
        .map(SkillGroup::into_list)
        .unwrap_or_default())
}

fn deserialize_skills<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<SkillsField>::deserialize(deserializer)?
        .map(SkillsField::into_list)
        .unwrap_or_default())
}
