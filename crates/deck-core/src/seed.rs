//! Seed dataset.
//!
//! Fixed, hand-authored sample data used for first-run state and as the
//! per-collection fallback during hydration. Every timestamp is a constant
//! so two initializations produce identical snapshots.

use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;

use crate::model::{
    Issue, Label, Priority, Project, ProjectStatus, Role, Snapshot, Status, Team, User, Workspace,
};

static SEED: Lazy<Snapshot> = Lazy::new(|| Snapshot {
    version: 0,
    issues: build_issues(),
    projects: build_projects(),
    users: build_users(),
    teams: build_teams(),
    labels: build_labels(),
    workspace: Workspace::default(),
});

/// The full seed snapshot (version 0).
#[must_use]
pub fn seed_snapshot() -> Snapshot {
    SEED.clone()
}

#[must_use]
pub fn seed_issues() -> Vec<Issue> {
    SEED.issues.clone()
}

#[must_use]
pub fn seed_projects() -> Vec<Project> {
    SEED.projects.clone()
}

#[must_use]
pub fn seed_users() -> Vec<User> {
    SEED.users.clone()
}

#[must_use]
pub fn seed_teams() -> Vec<Team> {
    SEED.teams.clone()
}

#[must_use]
pub fn seed_labels() -> Vec<Label> {
    SEED.labels.clone()
}

fn day(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

fn at(year: i32, month: u32, d: u32, hour: u32) -> DateTime<Utc> {
    day(year, month, d)
        .and_then(|date| date.and_hms_opt(hour, 0, 0))
        .map_or(DateTime::<Utc>::UNIX_EPOCH, |naive| naive.and_utc())
}

fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

fn build_teams() -> Vec<Team> {
    vec![
        Team {
            id: "1".into(),
            name: "Engineering".into(),
            icon: "⚙".into(),
            identifier: "ENG".into(),
            member_count: 4,
        },
        Team {
            id: "2".into(),
            name: "Design".into(),
            icon: "✎".into(),
            identifier: "DES".into(),
            member_count: 3,
        },
    ]
}

fn build_users() -> Vec<User> {
    let user = |id: &str, name: &str, email: &str, role: Role, teams: &[&str]| User {
        id: id.into(),
        name: name.into(),
        email: email.into(),
        avatar: None,
        role,
        team_ids: ids(teams),
    };
    vec![
        user("1", "Alex Morgan", "alex@acme.dev", Role::Admin, &["1", "2"]),
        user("2", "Priya Shah", "priya@acme.dev", Role::Member, &["1"]),
        user("3", "Jordan Lee", "jordan@acme.dev", Role::Member, &["1", "2"]),
        user("4", "Sam Rivera", "sam@acme.dev", Role::Member, &["2"]),
        user("5", "Casey Kim", "casey@acme.dev", Role::Viewer, &["1"]),
    ]
}

fn build_labels() -> Vec<Label> {
    [
        ("1", "Bug", "#eb5757"),
        ("2", "Feature", "#5e6ad2"),
        ("3", "Improvement", "#26b5ce"),
        ("4", "Documentation", "#0f783c"),
        ("5", "Design", "#bb87fc"),
        ("6", "Performance", "#f2994a"),
    ]
    .into_iter()
    .map(|(id, name, color)| Label {
        id: id.into(),
        name: name.into(),
        color: color.into(),
    })
    .collect()
}

fn build_projects() -> Vec<Project> {
    vec![
        Project {
            id: "1".into(),
            name: "Mobile Launch".into(),
            icon: "📱".into(),
            color: "#5e6ad2".into(),
            description: "Ship the first native mobile client.".into(),
            team_id: "1".into(),
            status: ProjectStatus::Active,
            progress: 45,
            start_date: day(2024, 1, 8),
            end_date: day(2024, 4, 30),
            lead: Some("1".into()),
        },
        Project {
            id: "2".into(),
            name: "Design System".into(),
            icon: "🎨".into(),
            color: "#bb87fc".into(),
            description: "Shared components, tokens and usage guidelines.".into(),
            team_id: "2".into(),
            status: ProjectStatus::Active,
            progress: 70,
            start_date: day(2023, 11, 1),
            end_date: day(2024, 3, 15),
            lead: Some("4".into()),
        },
        Project {
            id: "3".into(),
            name: "Public API v2".into(),
            icon: "🔌".into(),
            color: "#26b5ce".into(),
            description: "Versioned REST API with pagination and webhooks.".into(),
            team_id: "1".into(),
            status: ProjectStatus::Planned,
            progress: 0,
            start_date: day(2024, 5, 1),
            end_date: None,
            lead: Some("2".into()),
        },
    ]
}

#[allow(clippy::too_many_lines)]
fn build_issues() -> Vec<Issue> {
    struct Row {
        id: &'static str,
        identifier: &'static str,
        title: &'static str,
        description: &'static str,
        status: Status,
        priority: Priority,
        assignee: Option<&'static str>,
        project: Option<&'static str>,
        team: &'static str,
        labels: &'static [&'static str],
        due: Option<(i32, u32, u32)>,
        estimate: Option<u32>,
        created: (i32, u32, u32),
        updated: (i32, u32, u32),
        created_by: &'static str,
    }

    let rows = [
        Row {
            id: "1",
            identifier: "ENG-1",
            title: "Set up mobile CI pipeline",
            description: "Build and sign iOS and Android artifacts on every merge.",
            status: Status::Done,
            priority: Priority::High,
            assignee: Some("2"),
            project: Some("1"),
            team: "1",
            labels: &["3"],
            due: Some((2024, 1, 31)),
            estimate: Some(5),
            created: (2024, 1, 8),
            updated: (2024, 1, 29),
            created_by: "1",
        },
        Row {
            id: "2",
            identifier: "ENG-2",
            title: "Offline sync for issue lists",
            description: "Cache the last viewed lists and replay edits when back online.",
            status: Status::InProgress,
            priority: Priority::Urgent,
            assignee: Some("3"),
            project: Some("1"),
            team: "1",
            labels: &["2", "6"],
            due: Some((2024, 3, 1)),
            estimate: Some(8),
            created: (2024, 1, 10),
            updated: (2024, 2, 12),
            created_by: "1",
        },
        Row {
            id: "3",
            identifier: "DES-3",
            title: "Button component variants",
            description: "Primary, secondary, ghost and destructive variants with focus states.",
            status: Status::Done,
            priority: Priority::Medium,
            assignee: Some("4"),
            project: Some("2"),
            team: "2",
            labels: &["5"],
            due: None,
            estimate: Some(3),
            created: (2023, 11, 6),
            updated: (2023, 12, 1),
            created_by: "4",
        },
        Row {
            id: "4",
            identifier: "DES-4",
            title: "Color token audit",
            description: "Replace hard-coded hex values with semantic tokens.",
            status: Status::InProgress,
            priority: Priority::Medium,
            assignee: Some("3"),
            project: Some("2"),
            team: "2",
            labels: &["5", "3"],
            due: Some((2024, 2, 20)),
            estimate: Some(2),
            created: (2023, 12, 4),
            updated: (2024, 2, 2),
            created_by: "4",
        },
        Row {
            id: "5",
            identifier: "ENG-5",
            title: "Crash when opening empty project",
            description: "The project page panics when a project has no issues yet.",
            status: Status::Todo,
            priority: Priority::Urgent,
            assignee: Some("2"),
            project: Some("1"),
            team: "1",
            labels: &["1"],
            due: Some((2024, 2, 16)),
            estimate: Some(1),
            created: (2024, 2, 9),
            updated: (2024, 2, 9),
            created_by: "5",
        },
        Row {
            id: "6",
            identifier: "ENG-6",
            title: "Draft API v2 resource model",
            description: "Write the resource and pagination proposal for review.",
            status: Status::Backlog,
            priority: Priority::Low,
            assignee: None,
            project: Some("3"),
            team: "1",
            labels: &["4"],
            due: None,
            estimate: None,
            created: (2024, 2, 1),
            updated: (2024, 2, 1),
            created_by: "2",
        },
        Row {
            id: "7",
            identifier: "ENG-7",
            title: "Webhook delivery retries",
            description: "Exponential backoff and a dead-letter view for failed deliveries.",
            status: Status::Backlog,
            priority: Priority::Medium,
            assignee: Some("1"),
            project: Some("3"),
            team: "1",
            labels: &["2"],
            due: None,
            estimate: Some(5),
            created: (2024, 2, 3),
            updated: (2024, 2, 3),
            created_by: "2",
        },
        Row {
            id: "8",
            identifier: "DES-8",
            title: "Dark mode contrast pass",
            description: "Check all text/background pairs against WCAG AA.",
            status: Status::Todo,
            priority: Priority::High,
            assignee: Some("4"),
            project: Some("2"),
            team: "2",
            labels: &["5", "1"],
            due: Some((2024, 3, 8)),
            estimate: Some(3),
            created: (2024, 1, 22),
            updated: (2024, 2, 5),
            created_by: "1",
        },
        Row {
            id: "9",
            identifier: "ENG-9",
            title: "Slow board rendering with 500+ issues",
            description: "Profile and virtualize the board columns.",
            status: Status::Todo,
            priority: Priority::High,
            assignee: Some("1"),
            project: None,
            team: "1",
            labels: &["6", "1"],
            due: None,
            estimate: Some(5),
            created: (2024, 2, 6),
            updated: (2024, 2, 10),
            created_by: "3",
        },
        Row {
            id: "10",
            identifier: "ENG-10",
            title: "Remove legacy notification settings page",
            description: "Superseded by workspace settings.",
            status: Status::Canceled,
            priority: Priority::NoPriority,
            assignee: None,
            project: None,
            team: "1",
            labels: &[],
            due: None,
            estimate: None,
            created: (2023, 12, 12),
            updated: (2024, 1, 5),
            created_by: "1",
        },
    ];

    rows.into_iter()
        .map(|row| Issue {
            id: row.id.into(),
            identifier: row.identifier.into(),
            title: row.title.into(),
            description: row.description.into(),
            status: row.status,
            priority: row.priority,
            assignee_id: row.assignee.map(str::to_string),
            project_id: row.project.map(str::to_string),
            team_id: row.team.into(),
            labels: ids(row.labels),
            due_date: row.due.and_then(|(y, m, d)| day(y, m, d)),
            estimate: row.estimate,
            created_at: at(row.created.0, row.created.1, row.created.2, 9),
            updated_at: at(row.updated.0, row.updated.1, row.updated.2, 17),
            created_by: row.created_by.into(),
        })
        .collect()
}
