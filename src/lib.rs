//! folio - paged-document reading core
//!
//! Renders fixed-layout documents through a cancellable, content-cropping
//! raster pipeline, paginates reflowable text by measurement, classifies
//! touch input into reading intents, and persists reading positions. Hosts
//! supply the document source, the line measurer, and a surface to draw on;
//! everything here is UI-toolkit agnostic.

pub mod detect;
pub mod error;
pub mod gesture;
pub mod logging;
pub mod paginate;
pub mod render;
pub mod scale;
pub mod session;
pub mod settings;
pub mod source;
pub mod store;
pub mod types;

pub use error::{PaginateFault, RenderFault};
pub use gesture::{GestureConfig, GestureEngine, GestureIntent, PointerEvent, PointerPhase};
pub use paginate::{AvailableBox, LineMeasurer, StyleMetrics, TextPage, TextPaginator};
pub use render::{Command, FrameEvent, RenderService, RenderedPage};
pub use scale::{QualityTier, QualityTiers, ScaleCoordinator};
pub use session::ReadingSession;
pub use settings::{PageTurnMethod, PageTurnMode, Settings};
pub use source::{DocumentSource, OutlineEntry, OutlineTarget};
pub use store::{JsonPositionStore, PositionStore, SavedPosition};
pub use types::{Bitmap, CancelToken, PageSize, Point, ReadingPosition, Viewport};
