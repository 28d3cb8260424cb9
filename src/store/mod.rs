//! Workspace state and saved versions
//!
//! - `state`: the editable workspace (mixes, catalog, totals, locks)
//! - `migration`: reading snapshots written in older layouts
//! - `persistence`: named versions behind a pluggable store
//!
//! The engine never reads from here; callers pass mixes and totals in.

pub mod migration;
pub mod persistence;
pub mod state;

pub use migration::{StoredProduct, StoredSnapshot};
pub use persistence::{JsonFileVersionStore, MemoryVersionStore, SavedVersion, VersionBook, VersionStore};
pub use state::{AppSnapshot, AppState};

use rand::distributions::Alphanumeric;
use rand::Rng;

const ID_LEN: usize = 7;

/// Short random id for products and saved versions ("k3x9q0a")
pub fn generate_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}
