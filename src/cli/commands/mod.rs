//! Command handlers.
//!
//! Handlers resolve user-supplied references (ids, identifiers, names) to
//! ids up front, so a missing entity is reported as an error here even
//! though the store itself treats unknown ids as silent no-ops.

pub mod board;
pub mod check;
pub mod completions;
pub mod issue;
pub mod label;
pub mod list;
pub mod project;
pub mod reset;
pub mod stats;
pub mod summary;
pub mod team;
pub mod user;
pub mod workspace;

use anyhow::Result;
use deck_core::{DeckError, IssueFilters, Snapshot};

use crate::cli::FilterArgs;

/// Issue id from an id or identifier (`ENG-7`, case-insensitive).
pub fn resolve_issue(snapshot: &Snapshot, reference: &str) -> Result<String> {
    snapshot
        .issue(reference)
        .or_else(|| snapshot.issue_by_identifier(reference))
        .map(|i| i.id.clone())
        .ok_or_else(|| DeckError::not_found("issue", reference).into())
}

/// Team id from an id or identifier prefix (`ENG`).
pub fn resolve_team(snapshot: &Snapshot, reference: &str) -> Result<String> {
    snapshot
        .team(reference)
        .or_else(|| {
            snapshot
                .teams
                .iter()
                .find(|t| t.identifier.eq_ignore_ascii_case(reference))
        })
        .map(|t| t.id.clone())
        .ok_or_else(|| DeckError::not_found("team", reference).into())
}

/// User id from an id, email or name (case-insensitive).
pub fn resolve_user(snapshot: &Snapshot, reference: &str) -> Result<String> {
    snapshot
        .user(reference)
        .or_else(|| {
            snapshot.users.iter().find(|u| {
                u.email.eq_ignore_ascii_case(reference) || u.name.eq_ignore_ascii_case(reference)
            })
        })
        .map(|u| u.id.clone())
        .ok_or_else(|| DeckError::not_found("user", reference).into())
}

/// Project id from an id or name (case-insensitive).
pub fn resolve_project(snapshot: &Snapshot, reference: &str) -> Result<String> {
    snapshot
        .project(reference)
        .or_else(|| {
            snapshot
                .projects
                .iter()
                .find(|p| p.name.eq_ignore_ascii_case(reference))
        })
        .map(|p| p.id.clone())
        .ok_or_else(|| DeckError::not_found("project", reference).into())
}

/// Label id from an id or name (case-insensitive).
pub fn resolve_label(snapshot: &Snapshot, reference: &str) -> Result<String> {
    snapshot
        .label(reference)
        .or_else(|| {
            snapshot
                .labels
                .iter()
                .find(|l| l.name.eq_ignore_ascii_case(reference))
        })
        .map(|l| l.id.clone())
        .ok_or_else(|| DeckError::not_found("label", reference).into())
}

/// Convert CLI facet args to store filters.
///
/// Assignee and project references that do not resolve are kept verbatim,
/// so filtering on a deleted user's id still matches its dangling issues.
pub fn build_filters(args: &FilterArgs, snapshot: &Snapshot) -> IssueFilters {
    IssueFilters {
        statuses: args.status.clone(),
        priorities: args.priority.clone(),
        assignees: args
            .assignee
            .iter()
            .map(|r| resolve_user(snapshot, r).unwrap_or_else(|_| r.clone()))
            .collect(),
        projects: args
            .project
            .iter()
            .map(|r| resolve_project(snapshot, r).unwrap_or_else(|_| r.clone()))
            .collect(),
    }
}
