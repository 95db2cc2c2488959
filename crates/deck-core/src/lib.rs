//! `deck-core` - In-process entity store for the IssueDeck tracker.
//!
//! Holds issues, projects, users, teams, labels and workspace settings in
//! memory, starts from a fixed seed dataset and persists the full snapshot
//! to a single key-value slot.
//!
//! # Quick Start
//!
//! ```no_run
//! use deck_core::{FileSlots, IssueUpdate, PersistenceAdapter, Priority, Store, StoreOptions};
//! use deck_core::persist::DEFAULT_STORAGE_KEY;
//!
//! let adapter = PersistenceAdapter::new(FileSlots::new(".deck"), DEFAULT_STORAGE_KEY);
//!
//! // Seed is loaded synchronously; hydration merges the persisted slot.
//! let mut store = Store::new(Some(adapter), StoreOptions::default());
//! store.hydrate();
//!
//! // Mutate; every applied change is written back.
//! store.update_issue("2", IssueUpdate { priority: Some(Priority::Low), ..Default::default() });
//!
//! // Derive views from the current snapshot.
//! let snapshot = store.snapshot();
//! let board = deck_core::view::group_by_status(&snapshot.issues);
//! assert_eq!(board.len(), 5);
//! ```

pub mod error;
pub mod ids;
pub mod integrity;
pub mod model;
pub mod persist;
pub mod query;
pub mod seed;
pub mod store;
pub mod view;

pub use error::{DeckError, Result};
pub use integrity::{EntityKind, IntegrityMode};
pub use ids::NumberingScope;
pub use model::{
    Issue, Label, Notifications, Priority, Project, ProjectStatus, Role, Snapshot, Status, Team,
    User, Workspace,
};
pub use persist::{FileSlots, MemorySlots, PersistenceAdapter, SlotStorage};
pub use query::{
    IssueFilters, IssueUpdate, LabelUpdate, ProjectUpdate, SortKey, TeamUpdate, UserUpdate,
    WorkspaceUpdate,
};
pub use store::{HydrationOutcome, Mutation, Phase, Store, StoreOptions, SubscriptionId};
