use serde::Deserialize;

/// Scaffold mode swaps every external adapter (store, identity, checkout) for
/// its in-memory counterpart so the service runs with no backing services.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScaffoldConfig {
    pub enabled: bool,
    /// Accounts created at startup, one per role, all sharing this password.
    pub seed_password: Option<String>,
}
