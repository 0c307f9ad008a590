//! Action dispatcher that drives edit sessions.
//!
//! The engine owns the collaborators (snap services, binding resolver,
//! history recorder) and turns [`EditAction`]s into new [`AppState`]s.
//! It never mutates the state it is given.

use std::sync::Arc;

use canvas_core::{Element, ElementId, Point};

use crate::action::{EditAction, EditParams, PointerInput};
use crate::binding::{ArrowBindingResolver, BindingResolver};
use crate::config::EditConfig;
use crate::error::{EditError, EditResult};
use crate::history::{HistoryEntry, HistoryLog, HistoryRecorder};
use crate::operation::{operation_for, EditEnv, OperationId};
use crate::preview::EditPreview;
use crate::snap::{EdgeObjectSnapper, GridSnapper, ObjectSnapper, RoundingGridSnapper};
use crate::state::{AppState, EditSession, InteractionState};

/// Drives edit sessions over immutable application state.
///
/// # Example
///
/// ```
/// use canvas_core::{Document, Element, ElementKind, Point, Rect};
/// use canvas_edit::{EditAction, EditEngine, EditParams, OperationId, PointerInput};
///
/// let element = Element::new(ElementKind::Rectangle, Rect::new(0.0, 0.0, 20.0, 20.0));
/// let id = element.id;
/// let mut engine = EditEngine::new();
/// let state = engine.select(&canvas_edit::AppState::new(Document::from_elements([element])), [id]);
///
/// let state = engine.dispatch(&state, EditAction::StartEdit {
///     operation: OperationId::Move,
///     position: Point::new(5.0, 5.0),
///     params: EditParams::default(),
/// })?;
/// let state = engine.dispatch(&state, EditAction::UpdateEdit(PointerInput::at(Point::new(15.0, 0.0))))?;
/// let state = engine.dispatch(&state, EditAction::FinishEdit)?;
///
/// assert_eq!(state.document.get_element(id).map(|e| e.bounds), Some(Rect::new(10.0, -5.0, 30.0, 15.0)));
/// assert_eq!(engine.history().len(), 1);
/// # Ok::<(), canvas_edit::EditError>(())
/// ```
pub struct EditEngine<H: HistoryRecorder = HistoryLog> {
    config: EditConfig,
    grid: Box<dyn GridSnapper>,
    objects: Box<dyn ObjectSnapper>,
    bindings: Box<dyn BindingResolver>,
    history: H,
}

impl EditEngine<HistoryLog> {
    /// An engine with default configuration and collaborators.
    #[must_use]
    pub fn new() -> Self {
        Self::with_history(HistoryLog::new())
    }
}

impl Default for EditEngine<HistoryLog> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: HistoryRecorder> EditEngine<H> {
    /// An engine recording into `history`.
    #[must_use]
    pub fn with_history(history: H) -> Self {
        Self {
            config: EditConfig::default(),
            grid: Box::new(RoundingGridSnapper),
            objects: Box::new(EdgeObjectSnapper),
            bindings: Box::new(ArrowBindingResolver),
            history,
        }
    }

    /// Replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: EditConfig) -> Self {
        self.config = config.validated();
        self
    }

    /// Replace the grid snap service.
    #[must_use]
    pub fn with_grid_snapper(mut self, grid: impl GridSnapper + 'static) -> Self {
        self.grid = Box::new(grid);
        self
    }

    /// Replace the object snap service.
    #[must_use]
    pub fn with_object_snapper(mut self, objects: impl ObjectSnapper + 'static) -> Self {
        self.objects = Box::new(objects);
        self
    }

    /// Replace the binding resolver.
    #[must_use]
    pub fn with_binding_resolver(mut self, bindings: impl BindingResolver + 'static) -> Self {
        self.bindings = Box::new(bindings);
        self
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &EditConfig {
        &self.config
    }

    /// The history recorder.
    #[must_use]
    pub fn history(&self) -> &H {
        &self.history
    }

    fn env(&self) -> EditEnv<'_> {
        EditEnv {
            config: &self.config,
            grid: self.grid.as_ref(),
            objects: self.objects.as_ref(),
            bindings: self.bindings.as_ref(),
        }
    }

    /// Apply one action and return the next state.
    ///
    /// # Errors
    ///
    /// - [`EditError::AlreadyEditing`] for `StartEdit` during a session.
    /// - [`EditError::NotEditing`] for the other actions while idle.
    /// - [`EditError::EmptySelection`] or [`EditError::MissingParameter`]
    ///   when a session cannot start.
    pub fn dispatch(&mut self, state: &AppState, action: EditAction) -> EditResult<AppState> {
        match action {
            EditAction::StartEdit {
                operation,
                position,
                params,
            } => self.start(state, operation, position, &params),
            EditAction::UpdateEdit(input) => self.update(state, &input),
            EditAction::FinishEdit => self.finish(state),
            EditAction::CancelEdit => Self::cancel(state),
        }
    }

    fn start(
        &self,
        state: &AppState,
        operation: OperationId,
        position: Point,
        params: &EditParams,
    ) -> EditResult<AppState> {
        if let Some(session) = state.session() {
            return Err(EditError::AlreadyEditing(session.operation));
        }
        let op = operation_for(operation);
        let context = op.create_context(state, position, params)?;
        let transform = op.initial_transform(&context)?;
        tracing::debug!(%operation, snap_mode = ?self.config.snap_mode, "edit session started");
        Ok(AppState {
            interaction: InteractionState::Editing(EditSession {
                operation,
                context: Arc::new(context),
                transform,
                guides: Vec::new(),
            }),
            ..state.clone()
        })
    }

    fn update(&self, state: &AppState, input: &PointerInput) -> EditResult<AppState> {
        let session = state.session().ok_or(EditError::NotEditing)?;
        let op = operation_for(session.operation);
        let outcome = op.update(
            &self.env(),
            &state.document,
            &session.context,
            &session.transform,
            input,
        )?;
        Ok(AppState {
            interaction: InteractionState::Editing(EditSession {
                transform: outcome.transform,
                guides: outcome.guides,
                ..session.clone()
            }),
            ..state.clone()
        })
    }

    fn finish(&mut self, state: &AppState) -> EditResult<AppState> {
        let session = state.session().ok_or(EditError::NotEditing)?;
        let op = operation_for(session.operation);
        let (next, metadata) = op.finish(&self.env(), state, &session.context, &session.transform)?;
        match metadata {
            Some(metadata) => {
                tracing::debug!(
                    operation = %session.operation,
                    description = %metadata.description,
                    "edit session committed"
                );
                self.history.record(HistoryEntry {
                    previous: state.to_idle(),
                    next: next.clone(),
                    metadata,
                });
            }
            None => {
                tracing::debug!(
                    operation = %session.operation,
                    "edit session ended without changes"
                );
            }
        }
        Ok(next)
    }

    fn cancel(state: &AppState) -> EditResult<AppState> {
        let session = state.session().ok_or(EditError::NotEditing)?;
        tracing::debug!(operation = %session.operation, "edit session cancelled");
        Ok(operation_for(session.operation).cancel(state, &session.context))
    }

    /// Change the selection; refused during a session.
    ///
    /// While editing, the state is returned unchanged so the session's
    /// snapshot stays valid.
    #[must_use]
    pub fn select(&self, state: &AppState, ids: impl IntoIterator<Item = ElementId>) -> AppState {
        if state.is_editing() {
            tracing::warn!("selection change ignored during edit session");
            return state.clone();
        }
        state.with_selection(ids)
    }

    /// Uncommitted geometry of the active session, empty when idle.
    #[must_use]
    pub fn preview(&self, state: &AppState) -> EditPreview {
        let Some(session) = state.session() else {
            return EditPreview::default();
        };
        operation_for(session.operation).build_preview(
            &self.env(),
            state,
            &session.context,
            &session.transform,
        )
    }

    /// The element as it should be drawn now: preview geometry during a
    /// session, document geometry otherwise.
    #[must_use]
    pub fn effective_element(&self, state: &AppState, id: ElementId) -> Option<Element> {
        self.preview(state).effective_element(state, id).cloned()
    }
}

impl<H: HistoryRecorder + std::fmt::Debug> std::fmt::Debug for EditEngine<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditEngine")
            .field("config", &self.config)
            .field("history", &self.history)
            .finish_non_exhaustive()
    }
}
