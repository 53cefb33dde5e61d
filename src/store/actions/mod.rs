mod auth;
mod load;
mod rating;
mod upload;

pub use upload::StoragePathPolicy;

/// Child collection holding upload records under a classname.
pub const FILES_COLLECTION: &str = "files";
/// Child collection holding ratings under a classname.
pub const RATINGS_COLLECTION: &str = "rating";
