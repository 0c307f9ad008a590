//! # Canvas Core
//!
//! Document model for the vector drawing canvas: elements, the element
//! document, the selection set, and the geometry they are built from.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 canvas-core                 │
//! ├─────────────────────────────────────────────┤
//! │  Document        │  Selection               │
//! │  - Elements      │  - Selected IDs          │
//! │  - Versioning    │  - Versioning            │
//! ├─────────────────────────────────────────────┤
//! │  Geometry        │  Coordinate spaces       │
//! │  - Point / Rect  │  - Element frame         │
//! │  - Rotation math │  - Overlay frame         │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::float_cmp)]

pub mod document;
pub mod element;
pub mod error;
pub mod geometry;
pub mod selection;
pub mod space;

pub use document::Document;
pub use element::{ArrowData, ArrowRouting, Element, ElementId, ElementKind};
pub use error::{CanvasError, CanvasResult};
pub use geometry::{normalize_angle, shortest_angle_delta, Point, Rect, Vector, EPSILON};
pub use selection::Selection;
pub use space::{
    ElementFrame, ElementSpace, LocalPoint, LocalVector, OverlayFrame, OverlaySpace, RotatedSpace,
};

/// Canvas core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
