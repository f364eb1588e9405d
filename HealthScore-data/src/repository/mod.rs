// Repository module structure
pub mod errors;
mod in_memory;
mod profile;

// Re-export commonly used types
pub use errors::RepositoryError;
pub use profile::{load_profile_file, ProfileRepository, ProfileRepositoryTrait};
