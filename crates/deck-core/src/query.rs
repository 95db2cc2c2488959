//! Patch and filter types for store operations.
//!
//! Each entity kind has its own patch struct. `None` leaves a field alone;
//! for nullable fields `Some(None)` clears it. Store-owned fields such as
//! `Issue::updated_at` have no patch field at all.

use chrono::NaiveDate;
use std::str::FromStr;

use crate::error::DeckError;
use crate::model::{
    Issue, Label, Notifications, Priority, Project, ProjectStatus, Role, Status, Team, User,
    Workspace,
};

/// Fields to update on an issue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueUpdate {
    pub identifier: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub assignee_id: Option<Option<String>>,
    pub project_id: Option<Option<String>>,
    pub team_id: Option<String>,
    /// Replaces the label list; duplicates are dropped, first occurrence wins.
    pub labels: Option<Vec<String>>,
    pub due_date: Option<Option<NaiveDate>>,
    pub estimate: Option<Option<u32>>,
}

impl IssueUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.identifier.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.assignee_id.is_none()
            && self.project_id.is_none()
            && self.team_id.is_none()
            && self.labels.is_none()
            && self.due_date.is_none()
            && self.estimate.is_none()
    }

    /// Shallow-merge into `issue`. Does not touch `updated_at`.
    pub fn apply_to(&self, issue: &mut Issue) {
        if let Some(ref identifier) = self.identifier {
            issue.identifier.clone_from(identifier);
        }
        if let Some(ref title) = self.title {
            issue.title.clone_from(title);
        }
        if let Some(ref description) = self.description {
            issue.description.clone_from(description);
        }
        if let Some(status) = self.status {
            issue.status = status;
        }
        if let Some(priority) = self.priority {
            issue.priority = priority;
        }
        if let Some(ref assignee) = self.assignee_id {
            issue.assignee_id.clone_from(assignee);
        }
        if let Some(ref project) = self.project_id {
            issue.project_id.clone_from(project);
        }
        if let Some(ref team) = self.team_id {
            issue.team_id.clone_from(team);
        }
        if let Some(ref labels) = self.labels {
            issue.labels.clear();
            for label in labels {
                issue.push_label(label);
            }
        }
        if let Some(due) = self.due_date {
            issue.due_date = due;
        }
        if let Some(estimate) = self.estimate {
            issue.estimate = estimate;
        }
    }
}

/// Fields to update on a project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub description: Option<String>,
    pub team_id: Option<String>,
    pub status: Option<ProjectStatus>,
    /// Clamped to 100.
    pub progress: Option<u8>,
    pub start_date: Option<Option<NaiveDate>>,
    pub end_date: Option<Option<NaiveDate>>,
    pub lead: Option<Option<String>>,
}

impl ProjectUpdate {
    pub fn apply_to(&self, project: &mut Project) {
        if let Some(ref name) = self.name {
            project.name.clone_from(name);
        }
        if let Some(ref icon) = self.icon {
            project.icon.clone_from(icon);
        }
        if let Some(ref color) = self.color {
            project.color.clone_from(color);
        }
        if let Some(ref description) = self.description {
            project.description.clone_from(description);
        }
        if let Some(ref team) = self.team_id {
            project.team_id.clone_from(team);
        }
        if let Some(status) = self.status {
            project.status = status;
        }
        if let Some(progress) = self.progress {
            project.progress = progress.min(100);
        }
        if let Some(start) = self.start_date {
            project.start_date = start;
        }
        if let Some(end) = self.end_date {
            project.end_date = end;
        }
        if let Some(ref lead) = self.lead {
            project.lead.clone_from(lead);
        }
    }
}

/// Fields to update on a user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<Option<String>>,
    pub role: Option<Role>,
    /// Replaces team memberships. Does not touch `Team::member_count`.
    pub team_ids: Option<Vec<String>>,
}

impl UserUpdate {
    pub fn apply_to(&self, user: &mut User) {
        if let Some(ref name) = self.name {
            user.name.clone_from(name);
        }
        if let Some(ref email) = self.email {
            user.email.clone_from(email);
        }
        if let Some(ref avatar) = self.avatar {
            user.avatar.clone_from(avatar);
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(ref team_ids) = self.team_ids {
            user.team_ids.clear();
            for team in team_ids {
                if !user.team_ids.contains(team) {
                    user.team_ids.push(team.clone());
                }
            }
        }
    }
}

/// Fields to update on a team.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamUpdate {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub identifier: Option<String>,
    pub member_count: Option<u32>,
}

impl TeamUpdate {
    pub fn apply_to(&self, team: &mut Team) {
        if let Some(ref name) = self.name {
            team.name.clone_from(name);
        }
        if let Some(ref icon) = self.icon {
            team.icon.clone_from(icon);
        }
        if let Some(ref identifier) = self.identifier {
            team.identifier = identifier.to_uppercase();
        }
        if let Some(count) = self.member_count {
            team.member_count = count;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelUpdate {
    pub name: Option<String>,
    pub color: Option<String>,
}

impl LabelUpdate {
    pub fn apply_to(&self, label: &mut Label) {
        if let Some(ref name) = self.name {
            label.name.clone_from(name);
        }
        if let Some(ref color) = self.color {
            label.color.clone_from(color);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceUpdate {
    pub name: Option<String>,
    pub url: Option<String>,
    pub notifications: Option<Notifications>,
}

impl WorkspaceUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.url.is_none() && self.notifications.is_none()
    }

    pub fn apply_to(&self, workspace: &mut Workspace) {
        if let Some(ref name) = self.name {
            workspace.name.clone_from(name);
        }
        if let Some(ref url) = self.url {
            workspace.url.clone_from(url);
        }
        if let Some(notifications) = self.notifications {
            workspace.notifications = notifications;
        }
    }
}

/// Facet filters for issue lists and boards.
///
/// An empty facet is unconstrained. Facets combine with AND; values within
/// a facet combine with OR.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueFilters {
    pub statuses: Vec<Status>,
    pub priorities: Vec<Priority>,
    /// User IDs. Unassigned issues never match a non-empty assignee facet.
    pub assignees: Vec<String>,
    /// Project IDs. Issues without a project never match a non-empty facet.
    pub projects: Vec<String>,
}

impl IssueFilters {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
            && self.priorities.is_empty()
            && self.assignees.is_empty()
            && self.projects.is_empty()
    }

    /// Number of facets with at least one selected value.
    #[must_use]
    pub fn active_facets(&self) -> usize {
        [
            !self.statuses.is_empty(),
            !self.priorities.is_empty(),
            !self.assignees.is_empty(),
            !self.projects.is_empty(),
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }

    #[must_use]
    pub fn matches(&self, issue: &Issue) -> bool {
        fn facet<T: PartialEq>(selected: &[T], value: Option<&T>) -> bool {
            selected.is_empty() || value.is_some_and(|v| selected.contains(v))
        }

        facet(&self.statuses, Some(&issue.status))
            && facet(&self.priorities, Some(&issue.priority))
            && facet(&self.assignees, issue.assignee_id.as_ref())
            && facet(&self.projects, issue.project_id.as_ref())
    }
}

/// Sort field for issue lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Priority,
    Status,
    Updated,
    Created,
    Title,
    Identifier,
}

impl FromStr for SortKey {
    type Err = DeckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "priority" => Ok(Self::Priority),
            "status" => Ok(Self::Status),
            "updated" | "updated_at" | "updatedat" => Ok(Self::Updated),
            "created" | "created_at" | "createdat" => Ok(Self::Created),
            "title" => Ok(Self::Title),
            "identifier" | "id" => Ok(Self::Identifier),
            other => Err(DeckError::InvalidOption {
                option: "sort",
                value: other.to_string(),
            }),
        }
    }
}
