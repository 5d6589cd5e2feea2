//! Raster page rendering infrastructure

mod cache;
mod request;
mod service;
mod state;
mod worker;

pub use cache::{CacheKey, FrameCache};
pub use request::{RenderParams, RenderedPage, RequestId, WorkerRequest, WorkerResponse};
pub use service::{DEFAULT_CACHE_SIZE, FrameEvent, RenderService};
pub use state::{Command, Effect, RenderState};
pub use worker::{render_page, render_worker};
