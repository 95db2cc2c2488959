//! Referential integrity between collections.
//!
//! The store does not cascade deletes by default, so references from issues
//! (and projects, users) to other entities may dangle. This module finds
//! them and implements the opt-in cascade used by `IntegrityMode::Cascade`.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::DeckError;
use crate::model::Snapshot;

/// How the store treats references when entities are added or deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IntegrityMode {
    /// No checks, no cascades. Deleted entities leave dangling references.
    #[default]
    Faithful,
    /// Reject duplicate IDs and unknown teams on add; clean up references
    /// on delete; refuse to delete a team that is still referenced.
    Cascade,
}

impl IntegrityMode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Faithful => "faithful",
            Self::Cascade => "cascade",
        }
    }
}

impl fmt::Display for IntegrityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for IntegrityMode {
    type Err = DeckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "faithful" => Ok(Self::Faithful),
            "cascade" | "checked" => Ok(Self::Cascade),
            other => Err(DeckError::InvalidOption {
                option: "integrity",
                value: other.to_string(),
            }),
        }
    }
}

/// Entity kinds, used in logs and integrity reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Issue,
    Project,
    User,
    Team,
    Label,
}

impl EntityKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Issue => "issue",
            Self::Project => "project",
            Self::User => "user",
            Self::Team => "team",
            Self::Label => "label",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One reference that does not resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingRef {
    /// Kind of the entity holding the reference.
    pub owner_kind: EntityKind,
    pub owner_id: String,
    /// Field name in the persisted (camelCase) format.
    pub field: &'static str,
    pub target_kind: EntityKind,
    pub target_id: String,
}

impl fmt::Display for DanglingRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {} -> missing {} {}",
            self.owner_kind, self.owner_id, self.field, self.target_kind, self.target_id
        )
    }
}

/// Every dangling reference in the snapshot, in collection order.
#[must_use]
pub fn dangling_references(snapshot: &Snapshot) -> Vec<DanglingRef> {
    let mut found = Vec::new();
    let mut check = |owner_kind: EntityKind,
                     owner_id: &str,
                     field: &'static str,
                     target_kind: EntityKind,
                     target: &str,
                     exists: bool| {
        if !exists {
            found.push(DanglingRef {
                owner_kind,
                owner_id: owner_id.to_string(),
                field,
                target_kind,
                target_id: target.to_string(),
            });
        }
    };

    for issue in &snapshot.issues {
        let id = issue.id.as_str();
        check(
            EntityKind::Issue,
            id,
            "teamId",
            EntityKind::Team,
            &issue.team_id,
            snapshot.team(&issue.team_id).is_some(),
        );
        if let Some(ref assignee) = issue.assignee_id {
            check(
                EntityKind::Issue,
                id,
                "assigneeId",
                EntityKind::User,
                assignee,
                snapshot.user(assignee).is_some(),
            );
        }
        if let Some(ref project) = issue.project_id {
            check(
                EntityKind::Issue,
                id,
                "projectId",
                EntityKind::Project,
                project,
                snapshot.project(project).is_some(),
            );
        }
        for label in &issue.labels {
            check(
                EntityKind::Issue,
                id,
                "labels",
                EntityKind::Label,
                label,
                snapshot.label(label).is_some(),
            );
        }
        check(
            EntityKind::Issue,
            id,
            "createdBy",
            EntityKind::User,
            &issue.created_by,
            snapshot.user(&issue.created_by).is_some(),
        );
    }

    for project in &snapshot.projects {
        check(
            EntityKind::Project,
            &project.id,
            "teamId",
            EntityKind::Team,
            &project.team_id,
            snapshot.team(&project.team_id).is_some(),
        );
        if let Some(ref lead) = project.lead {
            check(
                EntityKind::Project,
                &project.id,
                "lead",
                EntityKind::User,
                lead,
                snapshot.user(lead).is_some(),
            );
        }
    }

    for user in &snapshot.users {
        for team in &user.team_ids {
            check(
                EntityKind::User,
                &user.id,
                "teamIds",
                EntityKind::Team,
                team,
                snapshot.team(team).is_some(),
            );
        }
    }

    found
}

/// Whether any issue or project still points at `team_id`.
#[must_use]
pub fn team_in_use(snapshot: &Snapshot, team_id: &str) -> bool {
    snapshot.issues.iter().any(|i| i.team_id == team_id)
        || snapshot.projects.iter().any(|p| p.team_id == team_id)
}

/// Clear references to a deleted user. `createdBy` is left as history.
pub fn cascade_user(snapshot: &mut Snapshot, user_id: &str) -> usize {
    let mut touched = 0;
    for issue in &mut snapshot.issues {
        if issue.assignee_id.as_deref() == Some(user_id) {
            issue.assignee_id = None;
            touched += 1;
        }
    }
    for project in &mut snapshot.projects {
        if project.lead.as_deref() == Some(user_id) {
            project.lead = None;
            touched += 1;
        }
    }
    touched
}

/// Clear `projectId` on issues of a deleted project.
pub fn cascade_project(snapshot: &mut Snapshot, project_id: &str) -> usize {
    let mut touched = 0;
    for issue in &mut snapshot.issues {
        if issue.project_id.as_deref() == Some(project_id) {
            issue.project_id = None;
            touched += 1;
        }
    }
    touched
}

/// Remove a deleted label from every issue.
pub fn cascade_label(snapshot: &mut Snapshot, label_id: &str) -> usize {
    let mut touched = 0;
    for issue in &mut snapshot.issues {
        let before = issue.labels.len();
        issue.labels.retain(|l| l != label_id);
        if issue.labels.len() != before {
            touched += 1;
        }
    }
    touched
}

/// Remove a deleted team from user memberships.
pub fn cascade_team(snapshot: &mut Snapshot, team_id: &str) -> usize {
    let mut touched = 0;
    for user in &mut snapshot.users {
        let before = user.team_ids.len();
        user.team_ids.retain(|t| t != team_id);
        if user.team_ids.len() != before {
            touched += 1;
        }
    }
    touched
}
