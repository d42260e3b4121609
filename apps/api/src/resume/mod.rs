//! Resume Data Store — the structured record template bindings read from and
//! editable sections write back to.
//!
//! JSON keys follow the editor's data contract (`userInfo.headLine`,
//! `workExperience[0].isPresent`, ...), which is also the path grammar used
//! by `update_field` and `${...}` placeholders.

pub mod bindings;
pub mod template;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::template::{FieldPath, PathError, PathSegment};

pub use bindings::FieldBindings;
pub use template::default_template;

#[derive(Debug, Error)]
pub enum ResumeError {
    #[error("invalid path: {0}")]
    Path(#[from] PathError),

    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("index {index} out of range in '{path}'")]
    IndexOutOfRange { path: String, index: usize },

    #[error("invalid value for '{path}': {reason}")]
    InvalidValue { path: String, reason: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// ────────────────────────────────────────────────────────────────────────────
// Record types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserInfo {
    pub first_name: String,
    pub last_name: String,
    pub head_line: String,
    pub phone_number: String,
    pub email: String,
    #[serde(rename = "linkedInURL")]
    pub linked_in_url: String,
    #[serde(rename = "websiteOrOtherProfileURL")]
    pub website_or_other_profile_url: String,
    pub location: String,
    #[serde(rename = "githubURL")]
    pub github_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationEntry {
    pub university_name: String,
    pub university_location: String,
    pub university_major: String,
    pub degree: String,
    pub from_date: String,
    pub to_date: String,
    pub gpa: String,
    pub courses: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkExperienceEntry {
    pub company_name: String,
    pub job_title: String,
    pub city: String,
    pub country: String,
    pub from_date: String,
    pub to_date: String,
    pub is_present: bool,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectEntry {
    pub title: String,
    pub description: String,
    pub from_date: String,
    pub to_date: String,
    pub is_present: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AchievementEntry {
    pub title: String,
    pub description: String,
    pub from_date: String,
    pub to_date: String,
}

/// The whole structured record for one editing session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeData {
    pub user_info: UserInfo,
    pub education: Vec<EducationEntry>,
    pub work_experience: Vec<WorkExperienceEntry>,
    pub projects: Vec<ProjectEntry>,
    pub skills: Vec<String>,
    pub achievements: Vec<AchievementEntry>,
}

impl ResumeData {
    /// Sample values every new session starts from.
    pub fn sample() -> Self {
        Self {
            user_info: UserInfo {
                first_name: "Alex".to_string(),
                last_name: "Chen".to_string(),
                head_line: "Senior Frontend Engineer".to_string(),
                phone_number: "+1 555-010-8888".to_string(),
                email: "alex.chen@example.com".to_string(),
                linked_in_url: "linkedin.com/in/alexchen".to_string(),
                website_or_other_profile_url: "alexchen.dev".to_string(),
                location: "Seattle, WA".to_string(),
                github_url: "github.com/alexchen".to_string(),
            },
            education: vec![EducationEntry {
                university_name: "University of Washington".to_string(),
                university_location: "Seattle, WA".to_string(),
                university_major: "Computer Science".to_string(),
                degree: "B.S.".to_string(),
                from_date: "2018".to_string(),
                to_date: "2022".to_string(),
                gpa: "3.8/4.0".to_string(),
                courses: "Data Structures, Algorithms, Operating Systems, Networks".to_string(),
            }],
            work_experience: vec![WorkExperienceEntry {
                company_name: "Northwind".to_string(),
                job_title: "Frontend Engineer".to_string(),
                city: "Seattle".to_string(),
                country: "USA".to_string(),
                from_date: "2023-01".to_string(),
                to_date: String::new(),
                is_present: true,
                description: "Improved page load time by 30% through bundle splitting".to_string(),
            }],
            projects: vec![ProjectEntry {
                title: "Block Resume Editor".to_string(),
                description: "Drag-and-drop resume builder with templated sections".to_string(),
                from_date: "2024-03".to_string(),
                to_date: String::new(),
                is_present: true,
            }],
            skills: vec![
                "TypeScript".to_string(),
                "React".to_string(),
                "Rust".to_string(),
                "SQL".to_string(),
            ],
            achievements: vec![AchievementEntry {
                title: "Hackathon winner".to_string(),
                description: "First place out of 40 teams".to_string(),
                from_date: "2021".to_string(),
                to_date: "2021".to_string(),
            }],
        }
    }

    pub fn to_value(&self) -> Result<Value, ResumeError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Path-addressed update. Works on a deep copy, so `self` stays a valid
    /// snapshot for anyone still reading it.
    pub fn update_field(&self, path: &str, value: Value) -> Result<Self, ResumeError> {
        let path: FieldPath = path.parse()?;
        self.update_path(&path, value)
    }

    pub fn update_path(&self, path: &FieldPath, value: Value) -> Result<Self, ResumeError> {
        let mut root = self.to_value()?;
        set_at(&mut root, path, value)?;

        let mut next: ResumeData =
            serde_json::from_value(root).map_err(|e| ResumeError::InvalidValue {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        next.normalize();
        Ok(next)
    }

    /// Ongoing entries have no end date.
    fn normalize(&mut self) {
        for entry in self.work_experience.iter_mut().filter(|e| e.is_present) {
            entry.to_date.clear();
        }
        for entry in self.projects.iter_mut().filter(|e| e.is_present) {
            entry.to_date.clear();
        }
    }
}

/// Writes `value` at `path`. Every intermediate and the final field must
/// already exist; a final index may equal the array length to append.
fn set_at(root: &mut Value, path: &FieldPath, value: Value) -> Result<(), ResumeError> {
    let Some((last, parents)) = path.segments().split_last() else {
        return Err(ResumeError::Path(PathError::Empty));
    };

    let mut current = root;
    for segment in parents {
        current = match segment {
            PathSegment::Field(name) => current
                .get_mut(name.as_str())
                .ok_or_else(|| ResumeError::UnknownField(path.to_string()))?,
            PathSegment::Index(index) => {
                current
                    .get_mut(*index)
                    .ok_or_else(|| ResumeError::IndexOutOfRange {
                        path: path.to_string(),
                        index: *index,
                    })?
            }
        };
    }

    match last {
        PathSegment::Field(name) => {
            let slot = current
                .as_object_mut()
                .and_then(|object| object.get_mut(name))
                .ok_or_else(|| ResumeError::UnknownField(path.to_string()))?;
            *slot = value;
        }
        PathSegment::Index(index) => {
            let items = current
                .as_array_mut()
                .ok_or_else(|| ResumeError::InvalidValue {
                    path: path.to_string(),
                    reason: "not a list".to_string(),
                })?;
            match items.len() {
                len if *index < len => items[*index] = value,
                len if *index == len => items.push(value),
                _ => {
                    return Err(ResumeError::IndexOutOfRange {
                        path: path.to_string(),
                        index: *index,
                    })
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_json_keys_match_editor_contract() {
        let value = ResumeData::sample().to_value().unwrap();
        assert!(value["userInfo"]["headLine"].is_string());
        assert!(value["userInfo"]["linkedInURL"].is_string());
        assert!(value["userInfo"]["websiteOrOtherProfileURL"].is_string());
        assert!(value["userInfo"]["githubURL"].is_string());
        assert!(value["education"][0]["universityName"].is_string());
        assert_eq!(value["workExperience"][0]["isPresent"], json!(true));
        assert!(value["skills"].is_array());
    }

    #[test]
    fn test_update_field_sets_nested_value() {
        let before = ResumeData::sample();
        let after = before.update_field("userInfo.headLine", json!("Staff Engineer")).unwrap();
        assert_eq!(after.user_info.head_line, "Staff Engineer");
        // previous snapshot untouched
        assert_eq!(before.user_info.head_line, "Senior Frontend Engineer");
    }

    #[test]
    fn test_update_field_indexed_path() {
        let after = ResumeData::sample()
            .update_field("education[0].gpa", json!("3.9/4.0"))
            .unwrap();
        assert_eq!(after.education[0].gpa, "3.9/4.0");
    }

    #[test]
    fn test_update_field_appends_at_len() {
        let after = ResumeData::sample()
            .update_field("skills[4]", json!("Go"))
            .unwrap();
        assert_eq!(after.skills.last().map(String::as_str), Some("Go"));
    }

    #[test]
    fn test_update_field_replaces_whole_section() {
        let after = ResumeData::sample()
            .update_field("achievements", json!([]))
            .unwrap();
        assert!(after.achievements.is_empty());
    }

    #[test]
    fn test_update_field_errors() {
        let data = ResumeData::sample();
        assert!(matches!(
            data.update_field("userInfo.nickname", json!("x")),
            Err(ResumeError::UnknownField(_))
        ));
        assert!(matches!(
            data.update_field("education[3].gpa", json!("x")),
            Err(ResumeError::IndexOutOfRange { index: 3, .. })
        ));
        assert!(matches!(
            data.update_field("workExperience[0].isPresent", json!("yes")),
            Err(ResumeError::InvalidValue { .. })
        ));
        assert!(matches!(
            data.update_field("education[x]", json!({})),
            Err(ResumeError::Path(_))
        ));
    }

    #[test]
    fn test_is_present_clears_end_date() {
        let data = ResumeData::sample()
            .update_field("projects[0].isPresent", json!(false))
            .unwrap()
            .update_field("projects[0].toDate", json!("2024-12"))
            .unwrap();
        assert_eq!(data.projects[0].to_date, "2024-12");

        let data = data.update_field("projects[0].isPresent", json!(true)).unwrap();
        assert_eq!(data.projects[0].to_date, "");
    }

    #[test]
    fn test_partial_record_deserializes_with_defaults() {
        let data: ResumeData = serde_json::from_value(json!({
            "userInfo": { "firstName": "Sam" }
        }))
        .unwrap();
        assert_eq!(data.user_info.first_name, "Sam");
        assert!(data.education.is_empty());
    }
}
