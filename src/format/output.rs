use deck_core::integrity::DanglingRef;
use deck_core::view::{Aggregate, AssigneeRow, StatusGroup};
use deck_core::{Issue, Priority, Snapshot, Status, Workspace};
use serde::Serialize;

/// Issue with resolved display names for list/board views.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRow {
    #[serde(flatten)]
    pub issue: Issue,
    /// `None` when unassigned; "Unknown user" when the assignee is gone.
    pub assignee_name: Option<String>,
    pub project_name: Option<String>,
    /// Names of labels that still exist, in issue order.
    pub label_names: Vec<String>,
}

impl IssueRow {
    #[must_use]
    pub fn resolve(issue: &Issue, snapshot: &Snapshot) -> Self {
        Self {
            assignee_name: issue
                .assignee_id
                .as_deref()
                .map(|id| snapshot.user_name_or_unknown(Some(id)).to_string()),
            project_name: issue
                .project_id
                .as_deref()
                .and_then(|id| snapshot.project(id))
                .map(|p| p.name.clone()),
            label_names: issue
                .labels
                .iter()
                .filter_map(|id| snapshot.label(id))
                .map(|l| l.name.clone())
                .collect(),
            issue: issue.clone(),
        }
    }
}

/// One board column.
#[derive(Debug, Clone, Serialize)]
pub struct BoardColumn {
    pub status: Status,
    pub title: &'static str,
    pub count: usize,
    pub issues: Vec<IssueRow>,
}

impl BoardColumn {
    #[must_use]
    pub fn from_group(group: &StatusGroup<'_>, snapshot: &Snapshot) -> Self {
        Self {
            status: group.status,
            title: group.status.title(),
            count: group.issues.len(),
            issues: group
                .issues
                .iter()
                .map(|issue| IssueRow::resolve(issue, snapshot))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusCount {
    pub status: Status,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PriorityCount {
    pub priority: Priority,
    pub count: usize,
}

/// Issue-derived completion for one project next to its stored progress.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectProgress {
    pub id: String,
    pub name: String,
    /// Caller-maintained `Project.progress`.
    pub progress: u8,
    pub issues: Aggregate,
}

/// Aggregate statistics.
#[derive(Debug, Clone, Serialize)]
pub struct Statistics {
    #[serde(flatten)]
    pub overall: Aggregate,
    pub by_status: Vec<StatusCount>,
    pub by_priority: Vec<PriorityCount>,
    pub by_assignee: Vec<AssigneeRow>,
    pub projects: Vec<ProjectProgress>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectionCounts {
    pub issues: usize,
    pub projects: usize,
    pub users: usize,
    pub teams: usize,
    pub labels: usize,
}

impl From<&Snapshot> for CollectionCounts {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            issues: snapshot.issues.len(),
            projects: snapshot.projects.len(),
            users: snapshot.users.len(),
            teams: snapshot.teams.len(),
            labels: snapshot.labels.len(),
        }
    }
}

/// Output of the `summary` command.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub workspace: Workspace,
    pub counts: CollectionCounts,
    pub completion: Aggregate,
    /// "restored" or "seed".
    pub source: &'static str,
    pub data_dir: String,
    pub integrity: String,
    pub numbering: String,
}

/// Output of the `check` command.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub ok: bool,
    pub dangling: Vec<DanglingRef>,
}
