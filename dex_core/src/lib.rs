//! Core of the creature catalog viewer.
//!
//! Owns the navigation state machine and the fetch-and-render cycle. Hosts
//! supply a [`PresentationSurface`] and drive a [`Viewer`] from their input
//! handlers; retrievals run on a tokio runtime and never block the caller.

pub mod catalog;
pub mod config;
mod headless;
pub mod navigation;
pub mod presentation;
pub mod render;
mod viewer;

pub use catalog::{Catalog, HttpCatalog, RetrievalFailure};
pub use config::{
    load_viewer_config, load_viewer_config_from_env, ViewerConfig, ViewerConfigError,
    ViewerConfigMetadata,
};
pub use headless::{render_once, render_once_http};
pub use navigation::{NavigationState, DEFAULT_TOTAL_COUNT};
pub use presentation::{MemorySurface, PresentationSurface};
pub use render::{render_record, DisplayFields, ImageSource};
pub use viewer::{ViewPhase, Viewer};
