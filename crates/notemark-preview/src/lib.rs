//! Live preview rendering for notemark.
//!
//! [`PreviewService`] pairs a [`FastRenderer`](notemark_renderer::FastRenderer)
//! with a parse cache so unchanged text is rendered once. [`PreviewWorker`]
//! runs a service on a background thread for editors that must not block
//! while typing: requests are numbered with a generation, queued requests
//! are coalesced, and stale responses are dropped.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use notemark_preview::{PreviewService, PreviewWorker};
//!
//! let mut worker = PreviewWorker::spawn(PreviewService::default()).unwrap();
//! worker.submit("# Draft");
//! let generation = worker.submit("# Final");
//!
//! let response = worker.wait_latest(Duration::from_secs(5)).unwrap();
//! assert_eq!(response.generation, generation);
//! assert_eq!(response.html, "<h1>Final</h1>");
//! ```

mod service;
mod worker;

pub use service::{PREVIEW_LANGUAGE, PreviewService};
pub use worker::{PreviewResponse, PreviewWorker};
