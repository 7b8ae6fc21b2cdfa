use glossa_core::Document;
use glossa_types::{NodeId, Size};

use crate::state::WidgetState;

pub fn handle_next_frame(state: &mut WidgetState, doc: &mut Document, popup: NodeId) {
    if !state.popups.activate(doc, popup) {
        tracing::debug!("Popup {:?} replaced before its first frame", popup);
    }
}

pub fn handle_remove_due(state: &mut WidgetState, doc: &mut Document, node: NodeId) {
    if !state.popups.dispose(doc, node) {
        tracing::debug!("Deferred removal of {:?} found nothing to remove", node);
    }
}

pub fn handle_grace_elapsed(state: &mut WidgetState, doc: &mut Document, generation: u64) {
    if state.timers.take_grace(generation) {
        tracing::debug!("Hover grace elapsed, hiding popup");
        state.hide(doc);
    }
}

pub fn handle_resize(state: &mut WidgetState, viewport: Size) {
    state.layout.set_viewport(viewport);
    let delay = state.config.resize_debounce();
    state.timers.debounce_resize(delay);
}

pub fn handle_resize_due(state: &mut WidgetState, doc: &mut Document, generation: u64) {
    if !state.timers.is_current_resize(generation) {
        return;
    }

    if let Some(position) = state.popups.reposition(doc, state.layout.as_ref()) {
        tracing::debug!(
            "Repositioned popup to {} at ({}, {})",
            position.placement.as_str(),
            position.left,
            position.top
        );
    }
}
