//! # Canvas Edit
//!
//! Edit operation engine for the vector canvas. Turns a stream of pointer
//! samples into move, resize, rotate and free-transform sessions without
//! writing the document until a session commits.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                      EditEngine                      │
//! │  dispatch(AppState, EditAction) -> AppState          │
//! ├──────────────────────────────────────────────────────┤
//! │  Operations (closed set, looked up by OperationId)   │
//! │  Move │ Resize │ Rotate │ FreeTransform              │
//! ├──────────────────────────────────────────────────────┤
//! │  EditContext (snapshot)  │  EditTransform (delta)    │
//! ├──────────────────────────────────────────────────────┤
//! │  Snap services │ Binding resolver │ History recorder │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Session lifecycle
//!
//! `StartEdit` snapshots the selection into an immutable context.
//! `UpdateEdit` replaces the session's transform and snap guides only.
//! `FinishEdit` applies the computed result in one replacement pass and
//! records history; `CancelEdit` returns to idle with the document
//! untouched. Previews are built from the same computation as commits.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::float_cmp)]
#![allow(clippy::similar_names)]

pub mod action;
pub mod binding;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod history;
pub mod operation;
pub mod overlay;
pub mod preview;
pub mod snap;
pub mod state;
pub mod transform;

pub use action::{EditAction, EditModifiers, EditParams, FreeTransformMode, PointerInput};
pub use binding::{ArrowBindingResolver, BindingResolver, ElementView, NoBindings};
pub use config::EditConfig;
pub use context::{EditContext, ElementSnapshot, SessionBase};
pub use engine::EditEngine;
pub use error::{EditError, EditResult};
pub use history::{HistoryEntry, HistoryLog, HistoryMetadata, HistoryRecorder};
pub use operation::{
    operation_for, EditComputedResult, EditEnv, EditOperation, OperationId, ResizeHandle,
    UpdateOutcome,
};
pub use overlay::{selection_geometry, MultiSelectOverlay, SelectionGeometry, SelectionOverlayState};
pub use preview::{EditPreview, SelectionPreview};
pub use snap::{
    EdgeObjectSnapper, GridSnapper, NoObjectSnap, ObjectSnapResult, ObjectSnapper,
    RoundingGridSnapper, SnapEdges, SnapGuide, SnapGuideKind, SnapMode,
};
pub use state::{AppState, EditSession, InteractionState};
pub use transform::{
    CompositeTransform, EditTransform, MoveTransform, ResizeTransform, ResolvedResize,
    RotateTransform, TransformKind,
};
