//! YAML snapshot of the whole lifecycle state.
//!
//! The sweep binary has no database: it reads a snapshot into the in-memory
//! adapters, runs, and writes the snapshot back.
//!
//! - `Snapshot` - Serializable state
//! - `SnapshotStore` - YAML file on disk
//! - `InMemoryBackend` - The in-memory adapters a snapshot is loaded into

mod backend;
mod file_store;

pub use backend::InMemoryBackend;
pub use file_store::{SnapshotError, SnapshotStore};

use serde::{Deserialize, Serialize};

use crate::domain::catalog::{PricingTier, SubscriptionProduct};
use crate::domain::change_request::ChangeRequest;
use crate::domain::member::MemberProfile;
use crate::domain::participation::{HistoryRecord, Participation};

/// Everything the core reads and writes, in one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub products: Vec<SubscriptionProduct>,
    #[serde(default)]
    pub tiers: Vec<PricingTier>,
    #[serde(default)]
    pub members: Vec<MemberProfile>,
    #[serde(default)]
    pub participations: Vec<Participation>,
    #[serde(default)]
    pub history: Vec<HistoryRecord>,
    #[serde(default)]
    pub change_requests: Vec<ChangeRequest>,
}
