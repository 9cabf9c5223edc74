pub mod browser;
pub mod cache;
pub mod error;
pub mod highlight;
pub mod images;
pub mod layout;
pub mod observer;
pub mod placeholder;
pub mod renderer;
pub mod surface;

pub use browser::{CatalogBrowser, FrameReport};
pub use cache::{decode_image, DecodedImage, ImageCache, ImageHandle, MAX_DECODED_SIDE};
pub use error::{ImageLoadError, RenderError};
pub use highlight::HighlightOverlay;
pub use images::{
    FetchRequest, FetchTicket, ImageFetcher, ImageLifecycleManager, ImageStats, SlotState,
};
pub use layout::{GridLayout, LayoutEntry, LayoutPlan};
pub use observer::{Visibility, VisibilityObserver};
pub use placeholder::{decade_color, PlaceholderVisual};
pub use renderer::{IncrementalRenderer, RenderPhase, RenderProgress, StepOutcome};
pub use surface::{Highlight, ImageView, MemorySurface, NodeId, RenderSurface};

/// Convenience result type for the render crate.
pub type Result<T> = std::result::Result<T, RenderError>;
