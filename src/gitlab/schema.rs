//! Shape validation at the API boundary.
//!
//! Both directions go through serde: tool-style arguments are checked field by
//! field so every bad field is reported, and response bodies are checked
//! against [`MergeRequest`] as a whole.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::types::{MergeRequest, MergeRequestIid, ProjectId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Offending field, `None` when the value as a whole is wrong.
    pub field: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn single(field: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            issues: vec![ValidationIssue {
                field: field.map(str::to_string),
                message: message.into(),
            }],
        }
    }

    pub fn fields(&self) -> Vec<&str> {
        self.issues
            .iter()
            .filter_map(|issue| issue.field.as_deref())
            .collect()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            match &issue.field {
                Some(field) => write!(f, "{}: {}", field, issue.message)?,
                None => f.write_str(&issue.message)?,
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Arguments accepted by the approve action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApproveMergeRequestArgs {
    pub project_id: ProjectId,
    pub merge_request_iid: MergeRequestIid,
}

impl ApproveMergeRequestArgs {
    pub fn from_value(args: &Value) -> Result<Self, ValidationError> {
        let Some(object) = args.as_object() else {
            return Err(ValidationError::single(
                None,
                "arguments must be a JSON object",
            ));
        };

        let mut issues = Vec::new();
        let project_id = required_field::<ProjectId>(object, "project_id", &mut issues);
        let merge_request_iid =
            required_field::<MergeRequestIid>(object, "merge_request_iid", &mut issues);

        match (project_id, merge_request_iid) {
            (Some(project_id), Some(merge_request_iid)) => Ok(Self {
                project_id,
                merge_request_iid,
            }),
            _ => Err(ValidationError { issues }),
        }
    }
}

fn required_field<T: DeserializeOwned>(
    object: &Map<String, Value>,
    name: &str,
    issues: &mut Vec<ValidationIssue>,
) -> Option<T> {
    let Some(value) = object.get(name) else {
        issues.push(ValidationIssue {
            field: Some(name.to_string()),
            message: "required".to_string(),
        });
        return None;
    };

    match T::deserialize(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            issues.push(ValidationIssue {
                field: Some(name.to_string()),
                message: e.to_string(),
            });
            None
        }
    }
}

/// Validate a decoded response body as a merge request record.
pub fn parse_merge_request(body: Value) -> Result<MergeRequest, ValidationError> {
    serde_json::from_value(body).map_err(|e| ValidationError::single(None, e.to_string()))
}
