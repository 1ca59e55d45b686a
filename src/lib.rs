//! # svg-export
//!
//! Split an SVG drawing into one document per export marker.
//!
//! The drawing follows a two-layer convention: rectangles on a layer
//! labelled `Export` mark the regions to extract, and the artwork lives on a
//! layer labelled `Drawings`. Each drawing element is positioned by an anchor
//! point (its center, start point or `x`/`y`) moved through its own transform
//! and those of its enclosing groups; it is exported with every marker whose
//! window contains that point.
//!
//! ## Example
//!
//! ```rust,ignore
//! use svg_export::{Document, default_template, export_documents};
//!
//! let source = Document::load("drawing.svg").unwrap();
//! let template = default_template().unwrap();
//! for (id, doc) in export_documents(&source, &template).unwrap() {
//!     doc.save(format!("{}.svg", id)).unwrap();
//! }
//! ```

pub mod coords;
pub mod descent;
pub mod document;
pub mod error;
pub mod options;
pub mod output;
pub mod planner;
pub mod render;
pub mod transform;
pub mod types;

// Re-export commonly used items
pub use coords::anchor_point;
pub use descent::{TransformChain, descend};
pub use document::{Document, Element, ElementKind};
pub use error::{ExportError, Result};
pub use options::ExportOptions;
pub use output::{build_export_document, default_template, export_documents};
pub use planner::{PlannedExport, plan_exports, resolve_position};
pub use render::{InkscapeRenderer, Renderer, run_export};
pub use transform::{Transform, transform_point};
pub use types::{ExportWindow, Point};
