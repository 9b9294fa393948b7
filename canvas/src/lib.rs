//! Plot layout editor engine.
//!
//! This crate owns the interactive part of the subdivision layout editor:
//! the ordered scene of plots, roads, and text labels, the pan/zoom camera,
//! hit-testing, the pointer gesture state machine, and an immediate-mode
//! renderer that redraws the whole scene on every change. It performs no
//! I/O; loading and saving layouts is the job of the host (see the
//! `plotdesk` package), which feeds element lists in and reads them back out.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | [`engine::EditorCore`] session state and the browser [`engine::Engine`] |
//! | [`doc`] | Element schema and the ordered [`doc::Scene`] |
//! | [`camera`] | Pan/zoom camera and coordinate conversions |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`hit`] | Hit-testing against elements and the resize handle |
//! | [`render`] | Full-scene redraw onto any [`surface::Surface`] |
//! | [`surface`] | Drawing surface trait, tiny-skia raster and Canvas2D backends |
//! | [`color`] | Hex color parsing |
//! | [`consts`] | Shared numeric constants (zoom limits, grid unit, minimum sizes) |

pub mod camera;
pub mod color;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod hit;
pub mod input;
pub mod render;
pub mod surface;
