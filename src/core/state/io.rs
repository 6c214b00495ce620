use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::{ClientState, STATE_FILE_NAME};

/// Errors that can occur while reading or writing the state file.
#[derive(Debug)]
pub enum StateError {
    /// The state file exists but could not be read.
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The state file is not valid TOML for [`ClientState`].
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// Serializing the state failed.
    Serialize(toml::ser::Error),
    /// Writing the state file (or its temporary sibling) failed.
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    /// No state directory could be determined for this platform.
    NoStateDir,
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::Read { path, source } => {
                write!(f, "Failed to read state at {}: {}", path.display(), source)
            }
            StateError::Parse { path, source } => {
                write!(f, "Failed to parse state at {}: {}", path.display(), source)
            }
            StateError::Serialize(source) => write!(f, "Failed to serialize state: {source}"),
            StateError::Write { path, source } => {
                write!(f, "Failed to write state at {}: {}", path.display(), source)
            }
            StateError::NoStateDir => write!(f, "Failed to determine state directory"),
        }
    }
}

impl StdError for StateError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            StateError::Read { source, .. } | StateError::Write { source, .. } => Some(source),
            StateError::Parse { source, .. } => Some(source),
            StateError::Serialize(source) => Some(source),
            StateError::NoStateDir => None,
        }
    }
}

/// Location of the state file plus load/save helpers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// State file inside the server-reported state directory.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(STATE_FILE_NAME))
    }

    /// Platform default when the server does not report a state directory.
    pub fn platform_default() -> Result<Self, StateError> {
        let dirs = ProjectDirs::from("org", "parley", "parley").ok_or(StateError::NoStateDir)?;
        let dir = dirs.state_dir().unwrap_or_else(|| dirs.data_local_dir());
        Ok(Self::in_dir(dir))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<ClientState, StateError> {
        let contents = fs::read_to_string(&self.path).map_err(|source| StateError::Read {
            path: self.path.clone(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| StateError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Load the state, or start fresh and persist the defaults immediately.
    ///
    /// A missing or unreadable file is not fatal. Failing to write the fresh
    /// defaults is logged and otherwise ignored.
    pub fn load_or_init(&self) -> ClientState {
        match self.load() {
            Ok(state) => state,
            Err(err) => {
                debug!(error = %err, "starting with fresh client state");
                let state = ClientState::default();
                if let Err(err) = self.save(&state) {
                    warn!(error = %err, "failed to persist fresh client state");
                }
                state
            }
        }
    }

    /// Write atomically through a temporary file in the same directory.
    pub fn save(&self, state: &ClientState) -> Result<(), StateError> {
        let write_err = |source: std::io::Error| StateError::Write {
            path: self.path.clone(),
            source,
        };
        let parent = self.path.parent().filter(|dir| !dir.as_os_str().is_empty());
        if let Some(dir) = parent {
            fs::create_dir_all(dir).map_err(write_err)?;
        }

        let contents = toml::to_string_pretty(state).map_err(StateError::Serialize)?;
        let mut temp_file = match parent {
            Some(dir) => NamedTempFile::new_in(dir),
            None => NamedTempFile::new(),
        }
        .map_err(write_err)?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(write_err)?;
        temp_file.as_file_mut().sync_all().map_err(write_err)?;
        temp_file
            .persist(&self.path)
            .map_err(|err| write_err(err.error))?;
        Ok(())
    }
}
