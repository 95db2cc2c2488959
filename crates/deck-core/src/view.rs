//! Derived views over issue lists.
//!
//! Everything here is a pure function of its arguments: inputs are borrowed
//! immutably and results are plain data, so any number of views can share
//! one snapshot.

use std::cmp::Ordering;

use serde::Serialize;

use crate::ids;
use crate::model::{Issue, Priority, Status, User};
use crate::query::{IssueFilters, SortKey};

/// Issues matching every non-empty facet, in input order.
#[must_use]
pub fn filter_issues<'a>(issues: &'a [Issue], filters: &IssueFilters) -> Vec<&'a Issue> {
    issues.iter().filter(|issue| filters.matches(issue)).collect()
}

/// One status bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusGroup<'a> {
    pub status: Status,
    pub issues: Vec<&'a Issue>,
}

/// Partition issues into one bucket per status, in `Status::ALL` order.
///
/// Empty buckets are kept so list and board layouts line up.
#[must_use]
pub fn group_by_status<'a, I>(issues: I) -> Vec<StatusGroup<'a>>
where
    I: IntoIterator<Item = &'a Issue>,
{
    let mut groups: Vec<StatusGroup<'a>> = Status::ALL
        .iter()
        .map(|&status| StatusGroup {
            status,
            issues: Vec::new(),
        })
        .collect();
    for issue in issues {
        if let Some(group) = groups.iter_mut().find(|g| g.status == issue.status) {
            group.issues.push(issue);
        }
    }
    groups
}

/// What an aggregate is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateTarget<'a> {
    All,
    /// `None` selects unassigned issues.
    Assignee(Option<&'a str>),
    Status(Status),
    Project(&'a str),
    Team(&'a str),
    Label(&'a str),
}

impl AggregateTarget<'_> {
    #[must_use]
    pub fn includes(&self, issue: &Issue) -> bool {
        match *self {
            Self::All => true,
            Self::Assignee(user) => issue.assignee_id.as_deref() == user,
            Self::Status(status) => issue.status == status,
            Self::Project(project) => issue.project_id.as_deref() == Some(project),
            Self::Team(team) => issue.team_id == team,
            Self::Label(label) => issue.labels.iter().any(|l| l == label),
        }
    }
}

/// Counts and completion for a set of issues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Aggregate {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    /// `completed / total` as a whole percent; 0 when `total` is 0.
    pub percent: u8,
}

/// Whole-percent completion, rounded half up. Zero when `total` is zero.
#[must_use]
pub fn completion_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let rounded = (completed.min(total) * 200 + total) / (2 * total);
    u8::try_from(rounded).unwrap_or(100)
}

/// Aggregate the issues selected by `target`.
#[must_use]
pub fn aggregate<'a, I>(issues: I, target: AggregateTarget<'_>) -> Aggregate
where
    I: IntoIterator<Item = &'a Issue>,
{
    let mut agg = Aggregate::default();
    for issue in issues.into_iter().filter(|i| target.includes(i)) {
        agg.total += 1;
        if issue.status.is_completed() {
            agg.completed += 1;
        }
        if issue.status == Status::InProgress {
            agg.in_progress += 1;
        }
    }
    agg.percent = completion_percent(agg.completed, agg.total);
    agg
}

/// Completion of a project's issues. Informational only: `Project.progress`
/// is caller-supplied and never derived from this.
#[must_use]
pub fn project_issue_progress(issues: &[Issue], project_id: &str) -> Aggregate {
    aggregate(issues, AggregateTarget::Project(project_id))
}

/// One row of the per-assignee breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssigneeRow {
    /// `None` for the unassigned row.
    pub user_id: Option<String>,
    pub name: String,
    #[serde(flatten)]
    pub stats: Aggregate,
}

pub const UNASSIGNED: &str = "Unassigned";
pub const UNKNOWN_USER: &str = "Unknown user";

/// Workload per user, in `users` order, followed by rows for assignees that
/// no longer resolve and finally the unassigned row.
///
/// Users without issues get a zero row.
#[must_use]
pub fn per_assignee(issues: &[Issue], users: &[User]) -> Vec<AssigneeRow> {
    let mut rows: Vec<AssigneeRow> = users
        .iter()
        .map(|user| AssigneeRow {
            user_id: Some(user.id.clone()),
            name: user.name.clone(),
            stats: aggregate(issues, AggregateTarget::Assignee(Some(user.id.as_str()))),
        })
        .collect();

    let mut dangling: Vec<&str> = Vec::new();
    for id in issues.iter().filter_map(|i| i.assignee_id.as_deref()) {
        if !users.iter().any(|u| u.id == id) && !dangling.contains(&id) {
            dangling.push(id);
        }
    }
    rows.extend(dangling.into_iter().map(|id| AssigneeRow {
        user_id: Some(id.to_string()),
        name: UNKNOWN_USER.to_string(),
        stats: aggregate(issues, AggregateTarget::Assignee(Some(id))),
    }));

    rows.push(AssigneeRow {
        user_id: None,
        name: UNASSIGNED.to_string(),
        stats: aggregate(issues, AggregateTarget::Assignee(None)),
    });
    rows
}

/// Issue count per priority, in `Priority::ALL` order, including zeros.
#[must_use]
pub fn count_by_priority<'a, I>(issues: I) -> Vec<(Priority, usize)>
where
    I: IntoIterator<Item = &'a Issue>,
{
    let mut counts: Vec<(Priority, usize)> = Priority::ALL.iter().map(|&p| (p, 0)).collect();
    for issue in issues {
        if let Some(slot) = counts.iter_mut().find(|(p, _)| *p == issue.priority) {
            slot.1 += 1;
        }
    }
    counts
}

fn compare_identifiers(a: &str, b: &str) -> Ordering {
    match (ids::parse_identifier(a), ids::parse_identifier(b)) {
        (Some((pa, na)), Some((pb, nb))) => pa.cmp(pb).then(na.cmp(&nb)),
        _ => a.cmp(b),
    }
}

/// Sort issues. Ties keep input order.
///
/// Natural directions: priority most urgent first, status in column order,
/// timestamps newest first, title case-insensitive A-Z, identifier by prefix
/// then number. `reverse` flips the natural direction.
#[must_use]
pub fn sort_issues<'a, I>(issues: I, key: SortKey, reverse: bool) -> Vec<&'a Issue>
where
    I: IntoIterator<Item = &'a Issue>,
{
    let mut sorted: Vec<&'a Issue> = issues.into_iter().collect();
    sorted.sort_by(|a, b| {
        let ord = match key {
            SortKey::Priority => a.priority.cmp(&b.priority),
            SortKey::Status => a.status.cmp(&b.status),
            SortKey::Updated => b.updated_at.cmp(&a.updated_at),
            SortKey::Created => b.created_at.cmp(&a.created_at),
            SortKey::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortKey::Identifier => compare_identifiers(&a.identifier, &b.identifier),
        };
        if reverse { ord.reverse() } else { ord }
    });
    sorted
}

/// Case-insensitive substring search over identifier, title and
/// description. A blank query matches everything.
#[must_use]
pub fn search_issues<'a>(issues: &'a [Issue], query: &str) -> Vec<&'a Issue> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return issues.iter().collect();
    }
    issues
        .iter()
        .filter(|issue| {
            issue.identifier.to_lowercase().contains(&needle)
                || issue.title.to_lowercase().contains(&needle)
                || issue.description.to_lowercase().contains(&needle)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;
    use proptest::prelude::*;

    fn ids_of(issues: &[&Issue]) -> Vec<String> {
        issues.iter().map(|i| i.id.clone()).collect()
    }

    #[test]
    fn test_priority_facet_alone() {
        let issues = seed::seed_issues();
        let filters = IssueFilters {
            priorities: vec![Priority::High],
            ..Default::default()
        };
        let matched = filter_issues(&issues, &filters);
        assert_eq!(ids_of(&matched), vec!["1", "8", "9"]);
        assert!(matched.iter().all(|i| i.priority == Priority::High));
    }

    #[test]
    fn test_group_by_status_keeps_empty_buckets() {
        let issues = seed::seed_issues();
        let todo_only: Vec<&Issue> = issues.iter().filter(|i| i.status == Status::Todo).collect();
        let groups = group_by_status(todo_only);
        assert_eq!(groups.len(), 5);
        assert_eq!(
            groups.iter().map(|g| g.status).collect::<Vec<_>>(),
            Status::ALL.to_vec()
        );
        assert_eq!(groups[1].issues.len(), 3);
        assert!(groups[0].issues.is_empty());
    }

    #[test]
    fn test_group_by_status_seed_counts() {
        let issues = seed::seed_issues();
        let counts: Vec<usize> = group_by_status(&issues).iter().map(|g| g.issues.len()).collect();
        assert_eq!(counts, vec![2, 3, 2, 2, 1]);
    }

    #[test]
    fn test_aggregate_empty_is_zero() {
        let agg = aggregate(&Vec::<Issue>::new(), AggregateTarget::Assignee(Some("1")));
        assert_eq!(agg, Aggregate::default());
        assert_eq!(agg.percent, 0);
    }

    #[test]
    fn test_completion_percent_rounding() {
        assert_eq!(completion_percent(1, 3), 33);
        assert_eq!(completion_percent(2, 3), 67);
        assert_eq!(completion_percent(1, 2), 50);
        assert_eq!(completion_percent(1, 8), 13);
        assert_eq!(completion_percent(5, 5), 100);
        assert_eq!(completion_percent(0, 0), 0);
    }

    #[test]
    fn test_aggregate_targets() {
        let issues = seed::seed_issues();
        let all = aggregate(&issues, AggregateTarget::All);
        assert_eq!((all.total, all.completed, all.percent), (10, 2, 20));

        let done = aggregate(&issues, AggregateTarget::Status(Status::Done));
        assert_eq!(done.percent, 100);

        let project = project_issue_progress(&issues, "1");
        assert_eq!((project.total, project.completed, project.in_progress), (3, 1, 1));
        assert_eq!(project.percent, 33);

        let bugs = aggregate(&issues, AggregateTarget::Label("1"));
        assert_eq!(bugs.total, 3);
    }

    #[test]
    fn test_per_assignee_rows() {
        let issues = seed::seed_issues();
        let users = seed::seed_users();
        let rows = per_assignee(&issues, &users);
        assert_eq!(rows.len(), users.len() + 1);

        let priya = &rows[1];
        assert_eq!(priya.name, "Priya Shah");
        assert_eq!((priya.stats.total, priya.stats.percent), (2, 50));

        let jordan = &rows[2];
        assert_eq!(jordan.stats.in_progress, 2);

        let casey = &rows[4];
        assert_eq!(casey.stats, Aggregate::default());

        let unassigned = rows.last().unwrap();
        assert_eq!(unassigned.user_id, None);
        assert_eq!(unassigned.stats.total, 2);
    }

    #[test]
    fn test_per_assignee_reports_unknown_users() {
        let issues = seed::seed_issues();
        let mut users = seed::seed_users();
        users.retain(|u| u.id != "3");
        let rows = per_assignee(&issues, &users);
        let ghost = rows
            .iter()
            .find(|r| r.user_id.as_deref() == Some("3"))
            .unwrap();
        assert_eq!(ghost.name, UNKNOWN_USER);
        assert_eq!(ghost.stats.total, 2);
    }

    #[test]
    fn test_count_by_priority() {
        let issues = seed::seed_issues();
        assert_eq!(
            count_by_priority(&issues),
            vec![
                (Priority::Urgent, 2),
                (Priority::High, 3),
                (Priority::Medium, 3),
                (Priority::Low, 1),
                (Priority::NoPriority, 1),
            ]
        );
    }

    #[test]
    fn test_sort_by_priority_is_stable() {
        let issues = seed::seed_issues();
        let sorted = sort_issues(&issues, SortKey::Priority, false);
        assert_eq!(
            ids_of(&sorted),
            vec!["2", "5", "1", "8", "9", "3", "4", "7", "6", "10"]
        );
        let reversed = sort_issues(&issues, SortKey::Priority, true);
        assert_eq!(reversed[0].id, "10");
    }

    #[test]
    fn test_sort_by_identifier_is_numeric() {
        let issues = seed::seed_issues();
        let sorted = sort_issues(&issues, SortKey::Identifier, false);
        let idents: Vec<&str> = sorted.iter().map(|i| i.identifier.as_str()).collect();
        assert_eq!(
            idents,
            vec!["DES-3", "DES-4", "DES-8", "ENG-1", "ENG-2", "ENG-5", "ENG-6", "ENG-7", "ENG-9", "ENG-10"]
        );
    }

    #[test]
    fn test_search() {
        let issues = seed::seed_issues();
        assert_eq!(ids_of(&search_issues(&issues, "API")), vec!["6"]);
        assert_eq!(ids_of(&search_issues(&issues, "eng-1")), vec!["1", "10"]);
        assert_eq!(search_issues(&issues, "  ").len(), 10);
        assert!(search_issues(&issues, "zzz").is_empty());
    }

    #[test]
    fn test_views_do_not_mutate_input() {
        let issues = seed::seed_issues();
        let before = issues.clone();
        let _ = sort_issues(&issues, SortKey::Title, true);
        let _ = group_by_status(&issues);
        let _ = filter_issues(&issues, &IssueFilters::default());
        assert_eq!(issues, before);
    }

    fn arb_status() -> impl Strategy<Value = Status> {
        prop::sample::select(Status::ALL.to_vec())
    }

    fn arb_priority() -> impl Strategy<Value = Priority> {
        prop::sample::select(Priority::ALL.to_vec())
    }

    fn arb_issues() -> impl Strategy<Value = Vec<Issue>> {
        prop::collection::vec(
            (
                arb_status(),
                arb_priority(),
                prop::option::of(prop::sample::select(vec!["1", "2", "3"])),
            ),
            0..40,
        )
        .prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(n, (status, priority, assignee))| Issue {
                    id: (n + 1).to_string(),
                    identifier: format!("ENG-{}", n + 1),
                    status,
                    priority,
                    assignee_id: assignee.map(str::to_string),
                    ..Default::default()
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_empty_filters_are_identity(issues in arb_issues()) {
            let matched = filter_issues(&issues, &IssueFilters::default());
            prop_assert_eq!(matched.len(), issues.len());
        }

        #[test]
        fn prop_filter_is_conjunction(
            issues in arb_issues(),
            statuses in prop::collection::vec(arb_status(), 0..3),
            priorities in prop::collection::vec(arb_priority(), 0..3),
        ) {
            let both = IssueFilters { statuses: statuses.clone(), priorities: priorities.clone(), ..Default::default() };
            let by_status = IssueFilters { statuses, ..Default::default() };
            let by_priority = IssueFilters { priorities, ..Default::default() };

            let expected: Vec<&Issue> = filter_issues(&issues, &by_status)
                .into_iter()
                .filter(|i| by_priority.matches(i))
                .collect();
            prop_assert_eq!(filter_issues(&issues, &both), expected);
        }

        #[test]
        fn prop_groups_partition_input(issues in arb_issues()) {
            let groups = group_by_status(&issues);
            let total: usize = groups.iter().map(|g| g.issues.len()).sum();
            prop_assert_eq!(total, issues.len());
            for group in &groups {
                prop_assert!(group.issues.iter().all(|i| i.status == group.status));
            }
        }

        #[test]
        fn prop_aggregate_bounds(issues in arb_issues()) {
            let agg = aggregate(&issues, AggregateTarget::All);
            prop_assert!(agg.completed <= agg.total);
            prop_assert!(agg.percent <= 100);
            if agg.total == 0 {
                prop_assert_eq!(agg.percent, 0);
            }
        }

        #[test]
        fn prop_per_assignee_covers_every_issue(issues in arb_issues()) {
            let users = seed::seed_users();
            let total: usize = per_assignee(&issues, &users).iter().map(|r| r.stats.total).sum();
            prop_assert_eq!(total, issues.len());
        }
    }
}
