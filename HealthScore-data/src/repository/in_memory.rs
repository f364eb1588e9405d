use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::models::ScoringProfile;
use super::errors::RepositoryError;

#[derive(Debug)]
struct ProfileStore {
    profiles: HashMap<String, Arc<ScoringProfile>>,
    active: String,
}

/// In-memory storage for scoring profiles
#[derive(Debug, Clone)]
pub struct InMemoryStorage {
    store: Arc<RwLock<ProfileStore>>,
}

impl InMemoryStorage {
    /// Create storage seeded with one profile, which becomes active
    pub fn new(initial: ScoringProfile) -> Self {
        let active = initial.version.clone();
        let mut profiles = HashMap::new();
        profiles.insert(active.clone(), Arc::new(initial));

        Self {
            store: Arc::new(RwLock::new(ProfileStore { profiles, active })),
        }
    }

    /// Store a profile under its version
    pub fn insert(&self, profile: ScoringProfile) -> Result<Arc<ScoringProfile>, RepositoryError> {
        let mut store = self.store.write()?;
        if store.profiles.contains_key(&profile.version) {
            return Err(RepositoryError::Validation(format!(
                "Profile version {} is already registered",
                profile.version
            )));
        }
        let profile = Arc::new(profile);
        store.profiles.insert(profile.version.clone(), profile.clone());
        Ok(profile)
    }

    pub fn get(&self, version: &str) -> Result<Option<Arc<ScoringProfile>>, RepositoryError> {
        let store = self.store.read()?;
        Ok(store.profiles.get(version).cloned())
    }

    pub fn active(&self) -> Result<Arc<ScoringProfile>, RepositoryError> {
        let store = self.store.read()?;
        store
            .profiles
            .get(&store.active)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(store.active.clone()))
    }

    /// Make a stored version the active one
    pub fn set_active(&self, version: &str) -> Result<Arc<ScoringProfile>, RepositoryError> {
        let mut store = self.store.write()?;
        let profile = store
            .profiles
            .get(version)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(version.to_string()))?;
        store.active = version.to_string();
        Ok(profile)
    }

    /// All stored versions, sorted
    pub fn versions(&self) -> Result<Vec<String>, RepositoryError> {
        let store = self.store.read()?;
        let mut versions: Vec<String> = store.profiles.keys().cloned().collect();
        versions.sort();
        Ok(versions)
    }
}
