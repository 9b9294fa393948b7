//! Plot layout desk: persistence and session layer for the plot layout editor.
//!
//! The interactive editor lives in the `plot_canvas` crate. This crate
//! connects it to the layout service and to the native raster renderer:
//!
//! | Module | Role |
//! |--------|------|
//! | [`wire`] | Stored element shape and load-time normalization |
//! | [`service`] | [`service::LayoutService`] trait and its HTTP client |
//! | [`session`] | One open layout with save-in-flight tracking and notifications |
//! | [`config`] | Environment configuration for the layout service |
//! | [`fonts`] | System font lookup for raster label text |

pub mod config;
pub mod fonts;
pub mod service;
pub mod session;
pub mod wire;
