use glossa_core::{Document, styles};

use crate::state::WidgetState;

/// Put the page back the way it was. Returns the number of markers unwrapped.
pub fn handle_destroy(state: &mut WidgetState, doc: &mut Document) -> usize {
    state.timers.cancel_grace();
    state.popups.teardown(doc);

    let body = doc.body();
    let removed = state.scanner.unwrap_markers(doc, body);
    styles::remove(doc, state.namespace());
    state.timers.shutdown();

    tracing::info!(
        "Destroyed widget {}, unwrapped {} markers",
        state.namespace().as_str(),
        removed
    );
    removed
}
