use glossa_core::Document;
use glossa_types::{InputEvent, Key, NodeId};

use crate::state::WidgetState;

/// Route one host input event according to the enabled interaction modes
pub fn handle_input(state: &mut WidgetState, doc: &mut Document, event: InputEvent) {
    match event {
        InputEvent::PointerEnter(node) if state.config.enable_hover => {
            handle_pointer_enter(state, doc, node)
        }
        InputEvent::PointerLeave(node) if state.config.enable_hover => {
            handle_pointer_leave(state, doc, node)
        }
        InputEvent::Click(node) if state.config.enable_click => handle_click(state, doc, node),
        InputEvent::TouchStart(node) if state.config.enable_touch => handle_touch(state, doc, node),
        InputEvent::KeyDown { target, key } if state.config.enable_keyboard => {
            handle_key(state, doc, target, key)
        }
        other => tracing::debug!("Input mode disabled, dropping {:?}", other),
    }
}

fn handle_pointer_enter(state: &mut WidgetState, doc: &mut Document, node: NodeId) {
    if let Some(marker) = state.scanner.marker_of(doc, node) {
        state.timers.cancel_grace();
        if !state.is_active_trigger(marker) {
            state.show_marker(doc, marker);
        }
    } else if state.popups.contains(doc, node) {
        state.timers.cancel_grace();
    }
}

fn handle_pointer_leave(state: &mut WidgetState, doc: &mut Document, node: NodeId) {
    if state.popups.active().is_none() {
        return;
    }

    if state.scanner.marker_of(doc, node).is_some() || state.popups.contains(doc, node) {
        let grace = state.config.hover_grace();
        state.timers.start_grace(grace);
    }
}

fn handle_click(state: &mut WidgetState, doc: &mut Document, node: NodeId) {
    if state.popups.is_close_button(doc, node) {
        state.hide(doc);
    } else if state.popups.contains(doc, node) {
        // clicks inside the popup keep it open
    } else if let Some(marker) = state.scanner.marker_of(doc, node) {
        state.toggle(doc, marker);
    } else {
        state.hide(doc);
    }
}

fn handle_touch(state: &mut WidgetState, doc: &mut Document, node: NodeId) {
    if let Some(marker) = state.scanner.marker_of(doc, node) {
        state.toggle(doc, marker);
    } else if !state.popups.contains(doc, node) {
        state.hide(doc);
    }
}

fn handle_key(state: &mut WidgetState, doc: &mut Document, target: NodeId, key: Key) {
    match key {
        Key::Escape => {
            let Some(trigger) = state.popups.active().map(|a| a.trigger) else {
                return;
            };
            state.hide(doc);
            doc.focus(trigger);
        }
        Key::Enter | Key::Space => {
            if let Some(marker) = state.scanner.marker_of(doc, target) {
                state.toggle(doc, marker);
            }
        }
        _ => {}
    }
}
