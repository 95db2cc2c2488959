//! Entity schema for deck-core.
//!
//! Field names serialize in camelCase so the persisted snapshot keeps the
//! shape `{ issues, projects, users, teams, labels, workspace }` with
//! `assigneeId`, `teamId`, `updatedAt` and friends.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DeckError;

/// Current product name, used for the default workspace and legacy repair.
pub const PRODUCT_NAME: &str = "IssueDeck";

/// Default workspace URL.
pub const DEFAULT_WORKSPACE_URL: &str = "issuedeck.app/acme";

/// Issue workflow status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    Backlog,
    Todo,
    InProgress,
    Done,
    Canceled,
}

impl Status {
    /// Every status in board/list column order.
    pub const ALL: [Self; 5] = [
        Self::Backlog,
        Self::Todo,
        Self::InProgress,
        Self::Done,
        Self::Canceled,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Backlog => "backlog",
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::Done => "done",
            Self::Canceled => "canceled",
        }
    }

    /// Human label used by list headers and board columns.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Backlog => "Backlog",
            Self::Todo => "Todo",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
            Self::Canceled => "Canceled",
        }
    }

    /// Counts toward completion percentages.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Done)
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Done | Self::Canceled)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Status {
    type Err = DeckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "backlog" => Ok(Self::Backlog),
            "todo" => Ok(Self::Todo),
            "in-progress" | "in_progress" | "inprogress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            "canceled" | "cancelled" => Ok(Self::Canceled),
            other => Err(DeckError::InvalidStatus {
                status: other.to_string(),
            }),
        }
    }
}

/// Issue priority. Declaration order is urgency order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    Urgent,
    High,
    Medium,
    Low,
    #[default]
    #[serde(rename = "none")]
    NoPriority,
}

impl Priority {
    pub const ALL: [Self; 5] = [
        Self::Urgent,
        Self::High,
        Self::Medium,
        Self::Low,
        Self::NoPriority,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Urgent => "urgent",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::NoPriority => "none",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Priority {
    type Err = DeckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "urgent" | "p0" => Ok(Self::Urgent),
            "high" | "p1" => Ok(Self::High),
            "medium" | "p2" => Ok(Self::Medium),
            "low" | "p3" => Ok(Self::Low),
            "none" | "no-priority" | "p4" => Ok(Self::NoPriority),
            other => Err(DeckError::InvalidPriority {
                priority: other.to_string(),
            }),
        }
    }
}

/// Project lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Planned,
    Active,
    Completed,
}

impl ProjectStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = DeckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "planned" => Ok(Self::Planned),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            other => Err(DeckError::InvalidProjectStatus {
                status: other.to_string(),
            }),
        }
    }
}

/// Workspace role of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Member,
    Viewer,
}

impl Role {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
            Self::Viewer => "viewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = DeckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            "viewer" => Ok(Self::Viewer),
            other => Err(DeckError::InvalidRole {
                role: other.to_string(),
            }),
        }
    }
}

/// Workspace-wide notification preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Notifications {
    #[default]
    All,
    Mentions,
    #[serde(rename = "none")]
    Off,
}

impl Notifications {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Mentions => "mentions",
            Self::Off => "none",
        }
    }
}

impl fmt::Display for Notifications {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Notifications {
    type Err = DeckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "mentions" => Ok(Self::Mentions),
            "none" | "off" => Ok(Self::Off),
            other => Err(DeckError::InvalidNotifications {
                value: other.to_string(),
            }),
        }
    }
}

/// The primary issue entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// Opaque numeric-looking ID (e.g., "7").
    pub id: String,

    /// Human-facing code (e.g., "TASK-7").
    pub identifier: String,

    pub title: String,

    #[serde(default)]
    pub description: String,

    pub status: Status,

    pub priority: Priority,

    /// Assigned user, if any.
    #[serde(default)]
    pub assignee_id: Option<String>,

    /// Owning project, if any.
    #[serde(default)]
    pub project_id: Option<String>,

    /// Owning team (required).
    pub team_id: String,

    /// Label IDs in display order.
    #[serde(default)]
    pub labels: Vec<String>,

    #[serde(default)]
    pub due_date: Option<NaiveDate>,

    /// Estimate in points.
    #[serde(default)]
    pub estimate: Option<u32>,

    pub created_at: DateTime<Utc>,

    /// Refreshed by the store on every update.
    pub updated_at: DateTime<Utc>,

    /// Creator user ID.
    pub created_by: String,
}

impl Default for Issue {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            identifier: String::new(),
            title: String::new(),
            description: String::new(),
            status: Status::default(),
            priority: Priority::default(),
            assignee_id: None,
            project_id: None,
            team_id: String::new(),
            labels: Vec::new(),
            due_date: None,
            estimate: None,
            created_at: now,
            updated_at: now,
            created_by: String::new(),
        }
    }
}

impl Issue {
    /// Append a label unless it is already present.
    pub fn push_label(&mut self, label_id: &str) -> bool {
        if self.labels.iter().any(|l| l == label_id) {
            return false;
        }
        self.labels.push(label_id.to_string());
        true
    }
}

/// A project grouping issues within a team.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    /// Glyph shown next to the name.
    #[serde(default)]
    pub icon: String,
    /// Hex color (e.g., "#5e6ad2").
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub description: String,
    pub team_id: String,
    #[serde(default)]
    pub status: ProjectStatus,
    /// 0-100, caller-supplied.
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Lead user ID.
    #[serde(default)]
    pub lead: Option<String>,
}

/// A workspace member.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub team_ids: Vec<String>,
}

/// A team; its identifier prefixes issue identifiers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    /// Short uppercase code (e.g., "ENG"). Older snapshots call it `key`.
    #[serde(alias = "key")]
    pub identifier: String,
    /// Maintained by membership operations, not derived from users.
    #[serde(default)]
    pub member_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Label {
    pub id: String,
    pub name: String,
    pub color: String,
}

/// Workspace settings (singleton).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Workspace {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub notifications: Notifications,
}

impl Default for Workspace {
    fn default() -> Self {
        Self {
            name: PRODUCT_NAME.to_string(),
            url: DEFAULT_WORKSPACE_URL.to_string(),
            notifications: Notifications::default(),
        }
    }
}

/// Complete state of every collection at one instant.
///
/// `version` is not persisted; it counts changes within the process and is
/// ignored by equality.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Snapshot {
    #[serde(skip)]
    pub version: u64,
    pub issues: Vec<Issue>,
    pub projects: Vec<Project>,
    pub users: Vec<User>,
    pub teams: Vec<Team>,
    pub labels: Vec<Label>,
    pub workspace: Workspace,
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.issues == other.issues
            && self.projects == other.projects
            && self.users == other.users
            && self.teams == other.teams
            && self.labels == other.labels
            && self.workspace == other.workspace
    }
}

impl Eq for Snapshot {}

impl Snapshot {
    #[must_use]
    pub fn issue(&self, id: &str) -> Option<&Issue> {
        self.issues.iter().find(|i| i.id == id)
    }

    #[must_use]
    pub fn issue_by_identifier(&self, identifier: &str) -> Option<&Issue> {
        self.issues
            .iter()
            .find(|i| i.identifier.eq_ignore_ascii_case(identifier))
    }

    #[must_use]
    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    #[must_use]
    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    #[must_use]
    pub fn team(&self, id: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    #[must_use]
    pub fn label(&self, id: &str) -> Option<&Label> {
        self.labels.iter().find(|l| l.id == id)
    }

    /// Display name for an assignee, with a neutral fallback for dangling IDs.
    #[must_use]
    pub fn user_name_or_unknown(&self, id: Option<&str>) -> &str {
        match id {
            None => "Unassigned",
            Some(id) => self.user(id).map_or("Unknown user", |u| u.name.as_str()),
        }
    }
}
