use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

/// A project reference: numeric ID or `namespace/project` path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectId {
    Id(u64),
    Path(String),
}

impl ProjectId {
    /// Form used inside an API path. Namespaced paths are percent-encoded,
    /// so `group/project` becomes `group%2Fproject`.
    pub fn encoded(&self) -> Cow<'_, str> {
        match self {
            ProjectId::Id(id) => Cow::Owned(id.to_string()),
            ProjectId::Path(path) => urlencoding::encode(path),
        }
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectId::Id(id) => write!(f, "{}", id),
            ProjectId::Path(path) => write!(f, "{}", path),
        }
    }
}

impl FromStr for ProjectId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("project ID must not be empty".to_string());
        }
        match trimmed.parse::<u64>() {
            // "007" stays a path so the request targets exactly what was given
            Ok(id) if id.to_string() == trimmed => Ok(ProjectId::Id(id)),
            _ => Ok(ProjectId::Path(trimmed.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for ProjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ProjectIdVisitor;

        impl<'de> Visitor<'de> for ProjectIdVisitor {
            type Value = ProjectId;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a project ID or a non-empty project path")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<ProjectId, E> {
                Ok(ProjectId::Id(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<ProjectId, E> {
                u64::try_from(v)
                    .map(ProjectId::Id)
                    .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<ProjectId, E> {
                v.parse()
                    .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
            }
        }

        deserializer.deserialize_any(ProjectIdVisitor)
    }
}

/// Project-scoped merge request number. Always ≥ 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "u64")]
pub struct MergeRequestIid(u64);

impl TryFrom<u64> for MergeRequestIid {
    type Error = String;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value == 0 {
            Err("merge request IID must be a positive integer".to_string())
        } else {
            Ok(MergeRequestIid(value))
        }
    }
}

impl fmt::Display for MergeRequestIid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated target of a single approval call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalRequest {
    pub project_id: ProjectId,
    pub merge_request_iid: MergeRequestIid,
}

impl ApprovalRequest {
    pub fn path(&self) -> String {
        format!(
            "/projects/{}/merge_requests/{}/approve",
            self.project_id.encoded(),
            self.merge_request_iid
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeRequestState {
    Opened,
    Closed,
    Locked,
    Merged,
}

impl fmt::Display for MergeRequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeRequestState::Opened => write!(f, "opened"),
            MergeRequestState::Closed => write!(f, "closed"),
            MergeRequestState::Locked => write!(f, "locked"),
            MergeRequestState::Merged => write!(f, "merged"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitLabUser {
    pub id: u64,
    pub username: String,
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRefs {
    pub base_sha: String,
    pub head_sha: String,
    pub start_sha: String,
}

/// Merge request as returned by the approve endpoint.
///
/// Fields wrapped with `nullable` must be present in the payload and may be
/// `null`; they are filled once the matching event (merge, close) happened.
/// Fields with `#[serde(default)]` are optional extras.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRequest {
    pub id: u64,
    pub iid: u64,
    pub project_id: u64,
    pub title: String,
    #[serde(deserialize_with = "nullable")]
    pub description: Option<String>,
    pub state: MergeRequestState,
    pub author: GitLabUser,
    pub source_branch: String,
    pub target_branch: String,
    pub web_url: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(deserialize_with = "nullable")]
    pub merged_at: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub closed_at: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub merge_commit_sha: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub merge_error: Option<String>,

    #[serde(default)]
    pub merged: Option<bool>,
    #[serde(default)]
    pub draft: Option<bool>,
    #[serde(default)]
    pub work_in_progress: Option<bool>,
    #[serde(default)]
    pub assignees: Vec<GitLabUser>,
    #[serde(default)]
    pub reviewers: Vec<GitLabUser>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub blocking_discussions_resolved: Option<bool>,
    #[serde(default)]
    pub should_remove_source_branch: Option<bool>,
    #[serde(default)]
    pub force_remove_source_branch: Option<bool>,
    #[serde(default)]
    pub allow_collaboration: Option<bool>,
    #[serde(default)]
    pub allow_maintainer_to_push: Option<bool>,
    #[serde(default)]
    pub changes_count: Option<String>,
    #[serde(default)]
    pub detailed_merge_status: Option<String>,
    #[serde(default)]
    pub merge_status: Option<String>,
    #[serde(default)]
    pub squash: Option<bool>,
    #[serde(default)]
    pub has_conflicts: Option<bool>,
    #[serde(default)]
    pub diff_refs: Option<DiffRefs>,
}

/// Present-but-nullable field. A `deserialize_with` field gets no implicit
/// default, so an absent key is a "missing field" error instead of `None`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)
}
