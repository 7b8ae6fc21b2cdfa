use glossa_core::{Document, ScanReport, TermIndex};
use glossa_types::Term;

use crate::state::WidgetState;

/// Content changed under the widget; (re)start the debounce window
pub fn handle_content_changed(state: &mut WidgetState) {
    let delay = state.config.scan_debounce();
    state.timers.debounce_scan(delay);
}

pub fn handle_scan_due(state: &mut WidgetState, doc: &mut Document, generation: u64) {
    if !state.timers.is_current_scan(generation) {
        tracing::debug!("Skipping superseded scan {}", generation);
        return;
    }

    let report = state.rescan(doc);
    if report.markers > 0 {
        tracing::debug!("Mutation scan added {} markers", report.markers);
    }
}

pub fn handle_refresh(state: &mut WidgetState, doc: &mut Document) -> ScanReport {
    let report = state.rescan(doc);
    tracing::info!(
        "Refresh: {} text nodes scanned, {} markers added",
        report.scanned,
        report.markers
    );
    report
}

/// Swap the glossary and rescan everything outside existing markers
pub fn handle_update_terms(
    state: &mut WidgetState,
    doc: &mut Document,
    terms: Vec<Term>,
) -> ScanReport {
    let index = TermIndex::build(terms, state.config.case_sensitive);
    tracing::info!("Replacing glossary with {} enabled terms", index.len());

    state.scanner.replace_index(index);
    state.rescan(doc)
}
