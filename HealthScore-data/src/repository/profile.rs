use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::models::ScoringProfile;
use super::errors::RepositoryError;
use super::in_memory::InMemoryStorage;

/// Repository trait for versioned scoring profiles
pub trait ProfileRepositoryTrait: Send + Sync {
    /// Get the profile currently used for scoring
    fn active_profile(&self) -> Result<Arc<ScoringProfile>, RepositoryError>;

    /// Get a profile by version
    fn get_by_version(&self, version: &str) -> Result<Option<Arc<ScoringProfile>>, RepositoryError>;

    /// List registered versions
    fn versions(&self) -> Result<Vec<String>, RepositoryError>;

    /// Validate and store a new profile version
    fn register(&self, profile: ScoringProfile) -> Result<Arc<ScoringProfile>, RepositoryError>;

    /// Switch the active profile
    fn activate(&self, version: &str) -> Result<Arc<ScoringProfile>, RepositoryError>;
}

/// Repository for scoring profiles, seeded with the built-in profile
#[derive(Debug, Clone)]
pub struct ProfileRepository {
    storage: InMemoryStorage,
}

impl Default for ProfileRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileRepository {
    /// Create a repository whose active profile is the built-in default
    pub fn new() -> Self {
        Self {
            storage: InMemoryStorage::new(ScoringProfile::default()),
        }
    }

    /// Create a repository and activate the profile stored at `path`
    ///
    /// A file may re-declare a built-in version only with identical content;
    /// a different profile under a taken version is rejected.
    pub fn with_profile_file(path: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let repository = Self::new();
        let profile = load_profile_file(path)?;
        let version = profile.version.clone();

        match repository.storage.get(&version)? {
            Some(stored) if *stored != profile => {
                return Err(RepositoryError::Validation(format!(
                    "Profile file redefines version {} with different content",
                    version
                )));
            }
            Some(_) => {}
            None => {
                repository.register(profile)?;
            }
        }
        repository.activate(&version)?;
        Ok(repository)
    }
}

impl ProfileRepositoryTrait for ProfileRepository {
    fn active_profile(&self) -> Result<Arc<ScoringProfile>, RepositoryError> {
        self.storage.active()
    }

    fn get_by_version(&self, version: &str) -> Result<Option<Arc<ScoringProfile>>, RepositoryError> {
        self.storage.get(version)
    }

    fn versions(&self) -> Result<Vec<String>, RepositoryError> {
        self.storage.versions()
    }

    fn register(&self, profile: ScoringProfile) -> Result<Arc<ScoringProfile>, RepositoryError> {
        profile.validate().map_err(RepositoryError::Validation)?;
        debug!("Registering scoring profile {}", profile.version);
        self.storage.insert(profile)
    }

    fn activate(&self, version: &str) -> Result<Arc<ScoringProfile>, RepositoryError> {
        let profile = self.storage.set_active(version)?;
        info!("Scoring profile {} is now active", version);
        Ok(profile)
    }
}

/// Read and validate a scoring profile from a JSON file
pub fn load_profile_file(path: impl AsRef<Path>) -> Result<ScoringProfile, RepositoryError> {
    let path = path.as_ref();
    debug!("Loading scoring profile from {}", path.display());

    let contents = std::fs::read_to_string(path)?;
    let profile: ScoringProfile = serde_json::from_str(&contents)?;
    profile.validate().map_err(RepositoryError::Validation)?;
    Ok(profile)
}
