//! Store configuration.

use recordkeep_core::IdScheme;

/// Configuration for a [`RecordStore`](crate::RecordStore) or
/// [`Database`](crate::Database).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Shape of generated identifiers.
    pub id_scheme: IdScheme,
    /// Pretty-print saved documents (4-space indent).
    pub pretty: bool,
    /// Fixed RNG seed for id generation. `None` seeds from OS entropy.
    pub id_seed: Option<u64>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            id_scheme: IdScheme::default(),
            pretty: true,
            id_seed: None,
        }
    }
}
