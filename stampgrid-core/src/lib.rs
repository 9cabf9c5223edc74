pub mod catalog;
pub mod config;
pub mod error;
pub mod geometry;
pub mod minimap;
pub mod record;
pub mod search;
pub mod throttle;
pub mod viewport;

// Re-export primary types for convenience.
pub use catalog::{Catalog, CatalogSource, FileSource, InlineSource};
pub use config::{BrowserConfig, Capabilities, EnvironmentProfile};
pub use error::{CoreError, LoadError, RecordError};
pub use geometry::{Point, Rect, Size};
pub use minimap::Minimap;
pub use record::{natural_cmp, StampRecord};
pub use search::{search, MatchRole, SearchMatch, SearchState};
pub use throttle::Throttle;
pub use viewport::{ViewportController, ViewportTransform};

/// Convenience result type for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;
