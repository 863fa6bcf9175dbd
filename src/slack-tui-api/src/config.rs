//! Team list configuration.
//!
//! The operator keeps one JSON file in their home directory that maps API
//! tokens to workspace display names. Two shapes exist:
//! - current: `~/.slack-tui.json`, an array of `{"name": ..., "token": ...}`
//! - legacy: `~/.teamlist.json`, an array of `[token, name]` pairs
//!
//! The current path wins when both exist. Either file may hold either shape.

use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{SlackError, SlackResult};

/// File name of the current-format team list under the home directory.
pub const CONFIG_FILE_NAME: &str = ".slack-tui.json";

/// File name of the legacy team list under the home directory.
pub const LEGACY_CONFIG_FILE_NAME: &str = ".teamlist.json";

/// One configured workspace.
#[derive(Clone)]
pub struct TeamConfigEntry {
    /// Display name, also the selector key in the team list.
    name: String,
    /// API token for the workspace.
    token: SecretString,
}

impl std::fmt::Debug for TeamConfigEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeamConfigEntry")
            .field("name", &self.name)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl TeamConfigEntry {
    /// Create a new entry.
    pub fn new(name: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            token: SecretString::new(token.into().into()),
        }
    }

    /// Workspace display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// API token.
    pub fn token(&self) -> &str {
        self.token.expose_secret()
    }
}

/// Where to look for the team list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    /// Preferred file (object array).
    pub current: PathBuf,
    /// Fallback file (pair array), if any.
    pub legacy: Option<PathBuf>,
}

impl ConfigPaths {
    /// The fixed locations under the operator's home directory.
    pub fn default_paths() -> SlackResult<Self> {
        let home = dirs::home_dir().ok_or_else(|| {
            SlackError::config(CONFIG_FILE_NAME, "could not determine home directory")
        })?;
        Ok(Self::in_dir(&home))
    }

    /// Both file names resolved against `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            current: dir.join(CONFIG_FILE_NAME),
            legacy: Some(dir.join(LEGACY_CONFIG_FILE_NAME)),
        }
    }

    /// A single explicit file (e.g. from `--config`).
    pub fn single(path: impl Into<PathBuf>) -> Self {
        Self {
            current: path.into(),
            legacy: None,
        }
    }

    /// The file that will be read, if one exists.
    pub fn resolve(&self) -> Option<&Path> {
        if self.current.is_file() {
            return Some(&self.current);
        }
        self.legacy.as_deref().filter(|p| p.is_file())
    }

    /// The path to mention in diagnostics.
    pub fn display_path(&self) -> &Path {
        self.resolve()
            .or(self.legacy.as_deref())
            .unwrap_or(&self.current)
    }
}

/// One element of the team list, in either on-disk shape.
///
/// `Legacy` must stay first: derived struct visitors also accept sequences,
/// so a pair would otherwise bind positionally as `{name, token}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Legacy(String, String),
    Current { name: String, token: String },
}

impl From<RawEntry> for TeamConfigEntry {
    fn from(raw: RawEntry) -> Self {
        match raw {
            RawEntry::Current { name, token } => TeamConfigEntry::new(name, token),
            // Legacy pairs are [token, name].
            RawEntry::Legacy(token, name) => TeamConfigEntry::new(name, token),
        }
    }
}

/// Load the configured workspaces.
///
/// Fails with [`SlackError::ConfigUnreadable`] when neither file exists or
/// the chosen file is not a valid team list.
pub fn load_team_tokens(paths: &ConfigPaths) -> SlackResult<Vec<TeamConfigEntry>> {
    let Some(path) = paths.resolve() else {
        return Err(SlackError::config(paths.display_path(), "file not found"));
    };

    debug!("Loading team list from {}", path.display());

    let contents =
        std::fs::read_to_string(path).map_err(|e| SlackError::config(path, e.to_string()))?;
    let entries = parse_team_list(&contents).map_err(|reason| SlackError::config(path, reason))?;

    debug!("Loaded {} team(s)", entries.len());
    Ok(entries)
}

/// Parse a team list body in either shape.
fn parse_team_list(contents: &str) -> Result<Vec<TeamConfigEntry>, String> {
    let raw: Vec<RawEntry> = serde_json::from_str(contents).map_err(|e| e.to_string())?;

    raw.into_iter()
        .enumerate()
        .map(|(idx, raw)| {
            let entry = TeamConfigEntry::from(raw);
            if entry.name.trim().is_empty() {
                return Err(format!("entry {} has an empty name", idx));
            }
            if entry.token().trim().is_empty() {
                return Err(format!("entry {} ({}) has an empty token", idx, entry.name));
            }
            if !entry.token().starts_with("xox") {
                warn!(
                    "Token for team '{}' doesn't start with 'xox', this may be incorrect",
                    entry.name
                );
            }
            Ok(entry)
        })
        .collect()
}
