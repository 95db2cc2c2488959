//! The entity store.
//!
//! Owns the canonical snapshot and exposes the typed mutation API. Every
//! applied mutation produces a new `Arc<Snapshot>` (so consumers can detect
//! changes by pointer identity), notifies subscribers and, once hydrated,
//! writes the full snapshot through the persistence adapter.
//!
//! Initialization runs `Uninitialized -> SeedLoaded -> Hydrated`. Nothing is
//! written before `Hydrated`; mutations made earlier are journaled and
//! replayed over the hydrated state.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::error::{DeckError, Result};
use crate::ids::{self, NumberingScope};
use crate::integrity::{self, EntityKind, IntegrityMode};
use crate::model::{Issue, Label, Project, Snapshot, Team, User};
use crate::persist::PersistenceAdapter;
use crate::query::{
    IssueUpdate, LabelUpdate, ProjectUpdate, TeamUpdate, UserUpdate, WorkspaceUpdate,
};
use crate::seed;

/// Initialization phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Empty state; nothing loaded yet.
    Uninitialized,
    /// Seed dataset in place; persisted snapshot not yet consulted.
    SeedLoaded,
    /// Persisted snapshot consulted; writes enabled.
    Hydrated,
}

/// Store behavior switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreOptions {
    pub integrity: IntegrityMode,
    pub numbering: NumberingScope,
}

/// Result of `Store::hydrate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrationOutcome {
    /// A persisted snapshot was merged; `collections` of six were usable.
    Restored { collections: usize, replayed: usize },
    /// Nothing persisted (or unreadable); the seed stays in effect.
    NoSnapshot { replayed: usize },
    /// `hydrate` had already run.
    AlreadyHydrated,
}

/// One state change, as recorded in the pre-hydration journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    AddIssue(Issue),
    UpdateIssue { id: String, update: IssueUpdate },
    DeleteIssue(String),
    DeleteIssues(Vec<String>),
    AddIssueLabel { issue_id: String, label_id: String },
    RemoveIssueLabel { issue_id: String, label_id: String },
    AddProject(Project),
    UpdateProject { id: String, update: ProjectUpdate },
    DeleteProject(String),
    AddUser(User),
    UpdateUser { id: String, update: UserUpdate },
    DeleteUser(String),
    AddTeam(Team),
    UpdateTeam { id: String, update: TeamUpdate },
    DeleteTeam(String),
    AddTeamMember { team_id: String, user_id: String },
    RemoveTeamMember { team_id: String, user_id: String },
    AddLabel(Label),
    UpdateLabel { id: String, update: LabelUpdate },
    DeleteLabel(String),
    UpdateWorkspace(WorkspaceUpdate),
    ResetToSeed,
}

impl Mutation {
    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AddIssue(_) => "add_issue",
            Self::UpdateIssue { .. } => "update_issue",
            Self::DeleteIssue(_) => "delete_issue",
            Self::DeleteIssues(_) => "delete_issues",
            Self::AddIssueLabel { .. } => "add_issue_label",
            Self::RemoveIssueLabel { .. } => "remove_issue_label",
            Self::AddProject(_) => "add_project",
            Self::UpdateProject { .. } => "update_project",
            Self::DeleteProject(_) => "delete_project",
            Self::AddUser(_) => "add_user",
            Self::UpdateUser { .. } => "update_user",
            Self::DeleteUser(_) => "delete_user",
            Self::AddTeam(_) => "add_team",
            Self::UpdateTeam { .. } => "update_team",
            Self::DeleteTeam(_) => "delete_team",
            Self::AddTeamMember { .. } => "add_team_member",
            Self::RemoveTeamMember { .. } => "remove_team_member",
            Self::AddLabel(_) => "add_label",
            Self::UpdateLabel { .. } => "update_label",
            Self::DeleteLabel(_) => "delete_label",
            Self::UpdateWorkspace(_) => "update_workspace",
            Self::ResetToSeed => "reset_to_seed",
        }
    }
}

/// Handle returned by `Store::subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&Arc<Snapshot>)>;

/// In-memory entity store.
pub struct Store {
    phase: Phase,
    snapshot: Arc<Snapshot>,
    options: StoreOptions,
    persistence: Option<PersistenceAdapter>,
    journal: Vec<Mutation>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("phase", &self.phase)
            .field("version", &self.snapshot.version)
            .field("options", &self.options)
            .field("persistence", &self.persistence)
            .field("journal", &self.journal.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Store {
    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Create a store with an empty snapshot.
    #[must_use]
    pub fn uninitialized(persistence: Option<PersistenceAdapter>, options: StoreOptions) -> Self {
        Self {
            phase: Phase::Uninitialized,
            snapshot: Arc::new(Snapshot::default()),
            options,
            persistence,
            journal: Vec::new(),
            listeners: Vec::new(),
            next_subscription: 1,
        }
    }

    /// Create a store and synchronously load the seed dataset.
    #[must_use]
    pub fn new(persistence: Option<PersistenceAdapter>, options: StoreOptions) -> Self {
        let mut store = Self::uninitialized(persistence, options);
        store.load_seed();
        store
    }

    /// Seeded store without persistence.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(None, StoreOptions::default())
    }

    /// `Uninitialized -> SeedLoaded`. No-op in later phases.
    pub fn load_seed(&mut self) {
        if self.phase != Phase::Uninitialized {
            return;
        }
        let mut next = seed::seed_snapshot();
        self.replay_journal(&mut next);
        self.phase = Phase::SeedLoaded;
        self.commit(next);
        tracing::debug!(version = self.snapshot.version, "Seed dataset loaded");
    }

    /// `SeedLoaded -> Hydrated`.
    ///
    /// Each collection comes from the persisted snapshot when present and
    /// well formed, otherwise from the seed. Journaled mutations are then
    /// replayed, the result is committed as one change, and writes are
    /// enabled. If anything was replayed the merged state is written back.
    pub fn hydrate(&mut self) -> HydrationOutcome {
        match self.phase {
            Phase::Hydrated => return HydrationOutcome::AlreadyHydrated,
            Phase::Uninitialized => self.load_seed(),
            Phase::SeedLoaded => {}
        }

        let persisted = self.persistence.as_ref().and_then(PersistenceAdapter::load);
        let replayed = self.journal.len();

        let outcome = if let Some(persisted) = persisted {
            let collections = persisted.present_count();
            let mut next = persisted.merge_over(seed::seed_snapshot());
            self.replay_journal(&mut next);
            self.commit(next);
            HydrationOutcome::Restored {
                collections,
                replayed,
            }
        } else {
            HydrationOutcome::NoSnapshot { replayed }
        };

        self.journal.clear();
        self.phase = Phase::Hydrated;
        tracing::debug!(?outcome, version = self.snapshot.version, "Store hydrated");

        if replayed > 0 {
            self.flush();
        }
        outcome
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn is_hydrated(&self) -> bool {
        self.phase == Phase::Hydrated
    }

    #[must_use]
    pub const fn options(&self) -> StoreOptions {
        self.options
    }

    #[must_use]
    pub fn persistence(&self) -> Option<&PersistenceAdapter> {
        self.persistence.as_ref()
    }

    /// Mutations waiting for hydration.
    #[must_use]
    pub fn pending(&self) -> &[Mutation] {
        &self.journal
    }

    /// Write the current snapshot. Returns false before hydration, without
    /// persistence, or when the write fails.
    pub fn flush(&self) -> bool {
        if self.phase != Phase::Hydrated {
            return false;
        }
        self.persistence
            .as_ref()
            .is_some_and(|adapter| adapter.save(&self.snapshot))
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Current snapshot. The `Arc` changes identity on every change.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot)
    }

    /// Borrow the current snapshot.
    #[must_use]
    pub fn state(&self) -> &Snapshot {
        &self.snapshot
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.snapshot.version
    }

    #[must_use]
    pub fn issue(&self, id: &str) -> Option<&Issue> {
        self.snapshot.issue(id)
    }

    #[must_use]
    pub fn issue_by_identifier(&self, identifier: &str) -> Option<&Issue> {
        self.snapshot.issue_by_identifier(identifier)
    }

    #[must_use]
    pub fn project(&self, id: &str) -> Option<&Project> {
        self.snapshot.project(id)
    }

    #[must_use]
    pub fn user(&self, id: &str) -> Option<&User> {
        self.snapshot.user(id)
    }

    #[must_use]
    pub fn team(&self, id: &str) -> Option<&Team> {
        self.snapshot.team(id)
    }

    #[must_use]
    pub fn label(&self, id: &str) -> Option<&Label> {
        self.snapshot.label(id)
    }

    /// Next free numeric ID for a collection.
    #[must_use]
    pub fn next_id(&self, kind: EntityKind) -> String {
        let s = &self.snapshot;
        match kind {
            EntityKind::Issue => ids::next_numeric_id(s.issues.iter().map(|e| e.id.as_str())),
            EntityKind::Project => ids::next_numeric_id(s.projects.iter().map(|e| e.id.as_str())),
            EntityKind::User => ids::next_numeric_id(s.users.iter().map(|e| e.id.as_str())),
            EntityKind::Team => ids::next_numeric_id(s.teams.iter().map(|e| e.id.as_str())),
            EntityKind::Label => ids::next_numeric_id(s.labels.iter().map(|e| e.id.as_str())),
        }
    }

    /// Next issue identifier for a team, or `None` if the team is unknown.
    #[must_use]
    pub fn next_issue_identifier(&self, team_id: &str) -> Option<String> {
        let team = self.snapshot.team(team_id)?;
        Some(ids::next_issue_identifier(
            &self.snapshot.issues,
            &team.identifier,
            self.options.numbering,
        ))
    }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    /// Call `listener` with the new snapshot after every change.
    pub fn subscribe(&mut self, listener: impl FnMut(&Arc<Snapshot>) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if the subscription was not found.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Apply a mutation. Returns true if the state changed.
    ///
    /// Unknown IDs are silent no-ops. Before hydration the mutation is
    /// journaled instead of written.
    pub fn dispatch(&mut self, mutation: Mutation) -> bool {
        let mut next = (*self.snapshot).clone();
        if !apply(self.options, &mut next, &mutation) {
            tracing::trace!(mutation = mutation.name(), "Mutation had no effect");
            return false;
        }

        if self.phase != Phase::Hydrated {
            tracing::debug!(mutation = mutation.name(), "Journaling pre-hydration mutation");
            self.journal.push(mutation);
        }
        self.commit(next);
        self.flush();
        true
    }

    pub fn add_issue(&mut self, issue: Issue) -> bool {
        self.dispatch(Mutation::AddIssue(issue))
    }

    /// Shallow-merge `update` and stamp `updated_at`.
    pub fn update_issue(&mut self, id: &str, update: IssueUpdate) -> bool {
        self.dispatch(Mutation::UpdateIssue {
            id: id.to_string(),
            update,
        })
    }

    pub fn delete_issue(&mut self, id: &str) -> bool {
        self.dispatch(Mutation::DeleteIssue(id.to_string()))
    }

    pub fn delete_issues<S: AsRef<str>>(&mut self, ids: &[S]) -> bool {
        self.dispatch(Mutation::DeleteIssues(
            ids.iter().map(|id| id.as_ref().to_string()).collect(),
        ))
    }

    pub fn add_issue_label(&mut self, issue_id: &str, label_id: &str) -> bool {
        self.dispatch(Mutation::AddIssueLabel {
            issue_id: issue_id.to_string(),
            label_id: label_id.to_string(),
        })
    }

    pub fn remove_issue_label(&mut self, issue_id: &str, label_id: &str) -> bool {
        self.dispatch(Mutation::RemoveIssueLabel {
            issue_id: issue_id.to_string(),
            label_id: label_id.to_string(),
        })
    }

    pub fn add_project(&mut self, project: Project) -> bool {
        self.dispatch(Mutation::AddProject(project))
    }

    pub fn update_project(&mut self, id: &str, update: ProjectUpdate) -> bool {
        self.dispatch(Mutation::UpdateProject {
            id: id.to_string(),
            update,
        })
    }

    pub fn delete_project(&mut self, id: &str) -> bool {
        self.dispatch(Mutation::DeleteProject(id.to_string()))
    }

    pub fn add_user(&mut self, user: User) -> bool {
        self.dispatch(Mutation::AddUser(user))
    }

    pub fn update_user(&mut self, id: &str, update: UserUpdate) -> bool {
        self.dispatch(Mutation::UpdateUser {
            id: id.to_string(),
            update,
        })
    }

    pub fn delete_user(&mut self, id: &str) -> bool {
        self.dispatch(Mutation::DeleteUser(id.to_string()))
    }

    pub fn add_team(&mut self, team: Team) -> bool {
        self.dispatch(Mutation::AddTeam(team))
    }

    pub fn update_team(&mut self, id: &str, update: TeamUpdate) -> bool {
        self.dispatch(Mutation::UpdateTeam {
            id: id.to_string(),
            update,
        })
    }

    pub fn delete_team(&mut self, id: &str) -> bool {
        self.dispatch(Mutation::DeleteTeam(id.to_string()))
    }

    /// Add `user_id` to `team_id` and bump the team's member counter.
    pub fn add_team_member(&mut self, team_id: &str, user_id: &str) -> bool {
        self.dispatch(Mutation::AddTeamMember {
            team_id: team_id.to_string(),
            user_id: user_id.to_string(),
        })
    }

    pub fn remove_team_member(&mut self, team_id: &str, user_id: &str) -> bool {
        self.dispatch(Mutation::RemoveTeamMember {
            team_id: team_id.to_string(),
            user_id: user_id.to_string(),
        })
    }

    pub fn add_label(&mut self, label: Label) -> bool {
        self.dispatch(Mutation::AddLabel(label))
    }

    pub fn update_label(&mut self, id: &str, update: LabelUpdate) -> bool {
        self.dispatch(Mutation::UpdateLabel {
            id: id.to_string(),
            update,
        })
    }

    pub fn delete_label(&mut self, id: &str) -> bool {
        self.dispatch(Mutation::DeleteLabel(id.to_string()))
    }

    pub fn update_workspace(&mut self, update: WorkspaceUpdate) -> bool {
        self.dispatch(Mutation::UpdateWorkspace(update))
    }

    /// Replace every collection and the workspace with the seed dataset.
    pub fn reset_to_seed(&mut self) -> bool {
        self.dispatch(Mutation::ResetToSeed)
    }

    // ========================================================================
    // Internal
    // ========================================================================

    fn replay_journal(&self, snapshot: &mut Snapshot) {
        for mutation in &self.journal {
            if !apply(self.options, snapshot, mutation) {
                tracing::debug!(mutation = mutation.name(), "Replayed mutation had no effect");
            }
        }
    }

    fn commit(&mut self, mut next: Snapshot) {
        next.version = self.snapshot.version + 1;
        self.snapshot = Arc::new(next);
        let current = Arc::clone(&self.snapshot);
        for (_, listener) in &mut self.listeners {
            listener(&current);
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::in_memory()
    }
}

/// Stamp `updated_at`, keeping it strictly increasing per issue.
fn touch(issue: &mut Issue) {
    let now = Utc::now();
    issue.updated_at = if now > issue.updated_at {
        now
    } else {
        issue.updated_at + Duration::milliseconds(1)
    };
}

fn remove_by_id<T>(items: &mut Vec<T>, id: &str, key: impl Fn(&T) -> &str) -> bool {
    let before = items.len();
    items.retain(|item| key(item) != id);
    items.len() != before
}

/// In cascade mode an add must not reuse an existing id.
fn check_unique(options: StoreOptions, kind: EntityKind, id: &str, exists: bool) -> Result<()> {
    if options.integrity == IntegrityMode::Cascade && exists {
        return Err(DeckError::IdCollision {
            kind: kind.as_str(),
            id: id.to_string(),
        });
    }
    Ok(())
}

fn rejects_duplicate(options: StoreOptions, kind: EntityKind, id: &str, exists: bool) -> bool {
    match check_unique(options, kind, id, exists) {
        Ok(()) => false,
        Err(e) => {
            tracing::warn!(error = %e, "Rejecting add");
            true
        }
    }
}

#[allow(clippy::too_many_lines)]
fn apply(options: StoreOptions, s: &mut Snapshot, mutation: &Mutation) -> bool {
    let cascade = options.integrity == IntegrityMode::Cascade;
    match mutation {
        Mutation::AddIssue(issue) => {
            if rejects_duplicate(options, EntityKind::Issue, &issue.id, s.issue(&issue.id).is_some())
            {
                return false;
            }
            if cascade && s.team(&issue.team_id).is_none() {
                tracing::warn!(id = %issue.id, team = %issue.team_id, "Rejecting add: unknown team");
                return false;
            }
            let mut issue = issue.clone();
            let labels = std::mem::take(&mut issue.labels);
            for label in &labels {
                issue.push_label(label);
            }
            s.issues.push(issue);
            true
        }
        Mutation::UpdateIssue { id, update } => {
            let Some(issue) = s.issues.iter_mut().find(|i| i.id == *id) else {
                return false;
            };
            update.apply_to(issue);
            touch(issue);
            true
        }
        Mutation::DeleteIssue(id) => remove_by_id(&mut s.issues, id, |i| &i.id),
        Mutation::DeleteIssues(ids) => {
            let doomed: HashSet<&str> = ids.iter().map(String::as_str).collect();
            let before = s.issues.len();
            s.issues.retain(|i| !doomed.contains(i.id.as_str()));
            s.issues.len() != before
        }
        Mutation::AddIssueLabel { issue_id, label_id } => {
            let Some(issue) = s.issues.iter_mut().find(|i| i.id == *issue_id) else {
                return false;
            };
            if !issue.push_label(label_id) {
                return false;
            }
            touch(issue);
            true
        }
        Mutation::RemoveIssueLabel { issue_id, label_id } => {
            let Some(issue) = s.issues.iter_mut().find(|i| i.id == *issue_id) else {
                return false;
            };
            let before = issue.labels.len();
            issue.labels.retain(|l| l != label_id);
            if issue.labels.len() == before {
                return false;
            }
            touch(issue);
            true
        }
        Mutation::AddProject(project) => {
            if rejects_duplicate(
                options,
                EntityKind::Project,
                &project.id,
                s.project(&project.id).is_some(),
            ) {
                return false;
            }
            s.projects.push(project.clone());
            true
        }
        Mutation::UpdateProject { id, update } => {
            let Some(project) = s.projects.iter_mut().find(|p| p.id == *id) else {
                return false;
            };
            update.apply_to(project);
            true
        }
        Mutation::DeleteProject(id) => {
            if !remove_by_id(&mut s.projects, id, |p| &p.id) {
                return false;
            }
            if cascade {
                let touched = integrity::cascade_project(s, id);
                tracing::debug!(project = %id, touched, "Cascaded project delete");
            }
            true
        }
        Mutation::AddUser(user) => {
            if rejects_duplicate(options, EntityKind::User, &user.id, s.user(&user.id).is_some()) {
                return false;
            }
            s.users.push(user.clone());
            true
        }
        Mutation::UpdateUser { id, update } => {
            let Some(user) = s.users.iter_mut().find(|u| u.id == *id) else {
                return false;
            };
            update.apply_to(user);
            true
        }
        Mutation::DeleteUser(id) => {
            if !remove_by_id(&mut s.users, id, |u| &u.id) {
                return false;
            }
            if cascade {
                let touched = integrity::cascade_user(s, id);
                tracing::debug!(user = %id, touched, "Cascaded user delete");
            }
            true
        }
        Mutation::AddTeam(team) => {
            if rejects_duplicate(options, EntityKind::Team, &team.id, s.team(&team.id).is_some()) {
                return false;
            }
            s.teams.push(team.clone());
            true
        }
        Mutation::UpdateTeam { id, update } => {
            let Some(team) = s.teams.iter_mut().find(|t| t.id == *id) else {
                return false;
            };
            update.apply_to(team);
            true
        }
        Mutation::DeleteTeam(id) => {
            if s.team(id).is_none() {
                return false;
            }
            if cascade && integrity::team_in_use(s, id) {
                tracing::warn!(team = %id, "Refusing to delete team still referenced by issues or projects");
                return false;
            }
            remove_by_id(&mut s.teams, id, |t| &t.id);
            if cascade {
                let touched = integrity::cascade_team(s, id);
                tracing::debug!(team = %id, touched, "Cascaded team delete");
            }
            true
        }
        Mutation::AddTeamMember { team_id, user_id } => {
            if s.team(team_id).is_none() {
                return false;
            }
            let Some(user) = s.users.iter_mut().find(|u| u.id == *user_id) else {
                return false;
            };
            if user.team_ids.contains(team_id) {
                return false;
            }
            user.team_ids.push(team_id.clone());
            if let Some(team) = s.teams.iter_mut().find(|t| t.id == *team_id) {
                team.member_count = team.member_count.saturating_add(1);
            }
            true
        }
        Mutation::RemoveTeamMember { team_id, user_id } => {
            let Some(user) = s.users.iter_mut().find(|u| u.id == *user_id) else {
                return false;
            };
            let before = user.team_ids.len();
            user.team_ids.retain(|t| t != team_id);
            if user.team_ids.len() == before {
                return false;
            }
            if let Some(team) = s.teams.iter_mut().find(|t| t.id == *team_id) {
                team.member_count = team.member_count.saturating_sub(1);
            }
            true
        }
        Mutation::AddLabel(label) => {
            if rejects_duplicate(options, EntityKind::Label, &label.id, s.label(&label.id).is_some())
            {
                return false;
            }
            s.labels.push(label.clone());
            true
        }
        Mutation::UpdateLabel { id, update } => {
            let Some(label) = s.labels.iter_mut().find(|l| l.id == *id) else {
                return false;
            };
            update.apply_to(label);
            true
        }
        Mutation::DeleteLabel(id) => {
            if !remove_by_id(&mut s.labels, id, |l| &l.id) {
                return false;
            }
            if cascade {
                let touched = integrity::cascade_label(s, id);
                tracing::debug!(label = %id, touched, "Cascaded label delete");
            }
            true
        }
        Mutation::UpdateWorkspace(update) => {
            update.apply_to(&mut s.workspace);
            true
        }
        Mutation::ResetToSeed => {
            let version = s.version;
            *s = seed::seed_snapshot();
            s.version = version;
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Priority, Status, Workspace};
    use crate::persist::{DEFAULT_STORAGE_KEY, MemorySlots};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn persisted_store(slots: &MemorySlots, options: StoreOptions) -> Store {
        Store::new(Some(PersistenceAdapter::in_memory(slots.clone())), options)
    }

    fn hydrated(slots: &MemorySlots) -> Store {
        let mut store = persisted_store(slots, StoreOptions::default());
        store.hydrate();
        store
    }

    fn make_issue(id: &str, identifier: &str) -> Issue {
        Issue {
            id: id.to_string(),
            identifier: identifier.to_string(),
            title: format!("Issue {id}"),
            team_id: "1".to_string(),
            created_by: "1".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_phases() {
        let slots = MemorySlots::new();
        let mut store = Store::uninitialized(
            Some(PersistenceAdapter::in_memory(slots.clone())),
            StoreOptions::default(),
        );
        assert_eq!(store.phase(), Phase::Uninitialized);
        assert!(store.state().issues.is_empty());

        store.load_seed();
        assert_eq!(store.phase(), Phase::SeedLoaded);
        assert_eq!(store.state().issues.len(), 10);

        assert_eq!(store.hydrate(), HydrationOutcome::NoSnapshot { replayed: 0 });
        assert!(store.is_hydrated());
        assert_eq!(store.hydrate(), HydrationOutcome::AlreadyHydrated);
    }

    #[test]
    fn test_seed_determinism() {
        let a = Store::in_memory();
        let b = Store::in_memory();
        assert_eq!(
            serde_json::to_string(a.state()).unwrap(),
            serde_json::to_string(b.state()).unwrap()
        );
    }

    #[test]
    fn test_no_writes_before_hydration() {
        let slots = MemorySlots::new();
        let mut store = persisted_store(&slots, StoreOptions::default());
        store.update_workspace(WorkspaceUpdate {
            name: Some("Early".into()),
            ..Default::default()
        });
        assert_eq!(slots.write_count(), 0);
        assert!(!store.flush());
        assert_eq!(store.pending().len(), 1);
    }

    #[test]
    fn test_seed_never_overwrites_persisted_snapshot() {
        let slots = MemorySlots::new();
        let mut custom = seed::seed_snapshot();
        custom.issues.truncate(2);
        slots
            .put(DEFAULT_STORAGE_KEY, serde_json::to_string(&custom).unwrap())
            .unwrap();

        let mut store = persisted_store(&slots, StoreOptions::default());
        assert_eq!(store.state().issues.len(), 10);
        assert_eq!(slots.write_count(), 0);

        let outcome = store.hydrate();
        assert_eq!(
            outcome,
            HydrationOutcome::Restored {
                collections: 6,
                replayed: 0
            }
        );
        assert_eq!(store.state().issues.len(), 2);
        assert_eq!(slots.write_count(), 0);
    }

    #[test]
    fn test_pre_hydration_mutation_survives_load() {
        let slots = MemorySlots::new();
        let mut custom = seed::seed_snapshot();
        custom.issues.truncate(3);
        slots
            .put(DEFAULT_STORAGE_KEY, serde_json::to_string(&custom).unwrap())
            .unwrap();

        let mut store = persisted_store(&slots, StoreOptions::default());
        store.add_issue(make_issue("50", "ENG-50"));
        let outcome = store.hydrate();

        assert_eq!(
            outcome,
            HydrationOutcome::Restored {
                collections: 6,
                replayed: 1
            }
        );
        assert_eq!(store.state().issues.len(), 4);
        assert!(store.issue("50").is_some());
        assert!(store.pending().is_empty());
        assert_eq!(slots.write_count(), 1);
    }

    #[test]
    fn test_per_collection_fallback() {
        let slots = MemorySlots::new();
        let mut custom = seed::seed_snapshot();
        custom.issues.truncate(1);
        let mut value = serde_json::to_value(&custom).unwrap();
        value.as_object_mut().unwrap().remove("teams");
        slots.put(DEFAULT_STORAGE_KEY, value.to_string()).unwrap();

        let store = hydrated(&slots);
        assert_eq!(store.state().issues, custom.issues);
        assert_eq!(store.state().teams, seed::seed_teams());
    }

    #[test]
    fn test_legacy_workspace_name_migrated_on_hydrate() {
        let slots = MemorySlots::new();
        let mut custom = seed::seed_snapshot();
        custom.workspace = Workspace {
            name: "Ferrero Rocher Inc".into(),
            url: "rocher.example/team".into(),
            notifications: crate::model::Notifications::Mentions,
        };
        slots
            .put(DEFAULT_STORAGE_KEY, serde_json::to_string(&custom).unwrap())
            .unwrap();

        let store = hydrated(&slots);
        let workspace = &store.state().workspace;
        assert_eq!(workspace.name, crate::model::PRODUCT_NAME);
        assert_eq!(workspace.url, "rocher.example/team");
        assert_eq!(workspace.notifications, crate::model::Notifications::Mentions);
    }

    #[test]
    fn test_update_issue_stamps_updated_at() {
        let mut store = Store::in_memory();
        let before = store.issue("1").unwrap().updated_at;
        assert!(store.update_issue(
            "1",
            IssueUpdate {
                priority: Some(Priority::High),
                ..Default::default()
            }
        ));
        assert!(store.issue("1").unwrap().updated_at > before);

        // Strictly increasing even for back-to-back updates.
        let mid = store.issue("1").unwrap().updated_at;
        store.update_issue("1", IssueUpdate::default());
        assert!(store.issue("1").unwrap().updated_at > mid);
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let mut store = Store::in_memory();
        let before = store.snapshot();
        assert!(!store.update_issue(
            "nope",
            IssueUpdate {
                title: Some("x".into()),
                ..Default::default()
            }
        ));
        assert!(!store.delete_label("nope"));
        assert!(Arc::ptr_eq(&before, &store.snapshot()));
    }

    #[test]
    fn test_every_mutation_replaces_snapshot() {
        let mut store = Store::in_memory();
        let before = store.snapshot();
        store.add_label(Label {
            id: "7".into(),
            name: "Ops".into(),
            color: "#000000".into(),
        });
        let after = store.snapshot();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(after.version, before.version + 1);
        assert_eq!(before.labels.len(), 6);
        assert_eq!(after.labels.len(), 7);
    }

    #[test]
    fn test_each_mutation_writes_after_hydration() {
        let slots = MemorySlots::new();
        let mut store = hydrated(&slots);
        store.delete_issue("1");
        store.delete_issue("2");
        store.delete_issue("3");
        assert_eq!(slots.write_count(), 3);
    }

    #[test]
    fn test_write_failure_keeps_memory_authoritative() {
        let slots = MemorySlots::new();
        let mut store = hydrated(&slots);
        slots.set_fail_writes(true);
        assert!(store.delete_issue("1"));
        assert!(store.issue("1").is_none());
        assert_eq!(slots.write_count(), 0);
    }

    #[test]
    fn test_no_cascade_on_label_delete() {
        let mut store = Store::in_memory();
        assert!(store.issue("5").unwrap().labels.contains(&"1".to_string()));
        assert!(store.delete_label("1"));
        assert!(store.label("1").is_none());
        assert!(store.issue("5").unwrap().labels.contains(&"1".to_string()));
    }

    #[test]
    fn test_bulk_delete_matches_single_deletes() {
        let mut bulk = Store::in_memory();
        bulk.delete_issues(&["2", "5", "9"]);
        assert_eq!(bulk.state().issues.len(), 7);

        let mut single = Store::in_memory();
        single.delete_issue("9");
        single.delete_issue("2");
        single.delete_issue("5");

        assert_eq!(bulk.state().issues, single.state().issues);
        for id in ["2", "5", "9"] {
            assert!(bulk.issue(id).is_none());
        }
    }

    #[test]
    fn test_add_does_not_check_uniqueness_by_default() {
        let mut store = Store::in_memory();
        assert!(store.add_issue(make_issue("1", "ENG-99")));
        assert_eq!(store.state().issues.iter().filter(|i| i.id == "1").count(), 2);
    }

    #[test]
    fn test_add_issue_dedupes_labels() {
        let mut store = Store::in_memory();
        let mut issue = make_issue("11", "ENG-11");
        issue.labels = vec!["1".into(), "2".into(), "1".into()];
        store.add_issue(issue);
        assert_eq!(store.issue("11").unwrap().labels, vec!["1", "2"]);
        assert!(!store.add_issue_label("11", "2"));
        assert!(store.remove_issue_label("11", "1"));
        assert_eq!(store.issue("11").unwrap().labels, vec!["2"]);
    }

    #[test]
    fn test_cascade_mode() {
        let options = StoreOptions {
            integrity: IntegrityMode::Cascade,
            ..Default::default()
        };
        let mut store = Store::new(None, options);

        assert!(!store.add_issue(make_issue("1", "ENG-99")));
        let mut orphan = make_issue("40", "ENG-40");
        orphan.team_id = "missing".into();
        assert!(!store.add_issue(orphan));

        assert!(store.delete_label("1"));
        assert!(store.state().issues.iter().all(|i| !i.labels.contains(&"1".to_string())));

        assert!(store.delete_project("1"));
        assert!(store.state().issues.iter().all(|i| i.project_id.as_deref() != Some("1")));

        assert!(store.delete_user("3"));
        assert!(store.state().issues.iter().all(|i| i.assignee_id.as_deref() != Some("3")));

        assert!(!store.delete_team("1"));
        assert!(store.team("1").is_some());
        // Only authorship history may point at the deleted user.
        assert!(
            integrity::dangling_references(store.state())
                .iter()
                .all(|d| d.field == "createdBy" && d.target_id == "3")
        );
    }

    #[test]
    fn test_duplicate_id_is_a_collision_in_cascade_mode() {
        let cascade = StoreOptions {
            integrity: IntegrityMode::Cascade,
            ..Default::default()
        };
        let err = check_unique(cascade, EntityKind::Label, "4", true).unwrap_err();
        assert_eq!(err.to_string(), "label ID collision: 4");
        assert!(check_unique(cascade, EntityKind::Label, "40", false).is_ok());
        assert!(check_unique(StoreOptions::default(), EntityKind::Label, "4", true).is_ok());
    }

    #[test]
    fn test_digit_led_team_prefix_keeps_counting() {
        let mut store = Store::new(
            None,
            StoreOptions {
                numbering: NumberingScope::PerTeam,
                ..Default::default()
            },
        );
        assert!(store.add_team(Team {
            id: "3".into(),
            name: "Platform".into(),
            icon: "P".into(),
            identifier: "9X".into(),
            member_count: 0,
        }));

        let first = store.next_issue_identifier("3").unwrap();
        let mut issue = make_issue(&store.next_id(EntityKind::Issue), &first);
        issue.team_id = "3".into();
        assert!(store.add_issue(issue));

        let second = store.next_issue_identifier("3").unwrap();
        assert_eq!(first, "9X-1");
        assert_eq!(second, "9X-2");
    }

    #[test]
    fn test_team_membership_counter() {
        let mut store = Store::in_memory();
        assert!(store.add_team_member("2", "2"));
        assert_eq!(store.team("2").unwrap().member_count, 4);
        assert!(!store.add_team_member("2", "2"));
        assert_eq!(store.team("2").unwrap().member_count, 4);

        assert!(store.remove_team_member("2", "2"));
        assert_eq!(store.team("2").unwrap().member_count, 3);
        assert!(!store.remove_team_member("2", "2"));

        // The counter is independent of user memberships.
        store.update_team(
            "2",
            TeamUpdate {
                member_count: Some(0),
                ..Default::default()
            },
        );
        assert!(store.remove_team_member("2", "1"));
        assert_eq!(store.team("2").unwrap().member_count, 0);
    }

    #[test]
    fn test_subscribers_see_every_change() {
        let mut store = Store::in_memory();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = store.subscribe(move |snapshot| sink.borrow_mut().push(snapshot.version));

        store.delete_issue("1");
        store.update_issue("2", IssueUpdate::default());
        assert_eq!(seen.borrow().len(), 2);

        assert!(store.unsubscribe(id));
        store.delete_issue("3");
        assert_eq!(seen.borrow().len(), 2);
        assert!(!store.unsubscribe(id));
    }

    #[test]
    fn test_next_ids() {
        let store = Store::in_memory();
        assert_eq!(store.next_id(EntityKind::Issue), "11");
        assert_eq!(store.next_id(EntityKind::Label), "7");
        assert_eq!(store.next_issue_identifier("2").as_deref(), Some("DES-11"));
        assert_eq!(store.next_issue_identifier("missing"), None);

        let per_team = Store::new(
            None,
            StoreOptions {
                numbering: NumberingScope::PerTeam,
                ..Default::default()
            },
        );
        assert_eq!(per_team.next_issue_identifier("2").as_deref(), Some("DES-9"));
    }

    #[test]
    fn test_reset_to_seed() {
        let slots = MemorySlots::new();
        let mut store = hydrated(&slots);
        store.delete_issues(&["1", "2"]);
        store.update_issue(
            "3",
            IssueUpdate {
                status: Some(Status::Canceled),
                ..Default::default()
            },
        );
        assert!(store.reset_to_seed());
        assert_eq!(*store.state(), seed::seed_snapshot());
        assert_eq!(slots.write_count(), 3);
    }
}
