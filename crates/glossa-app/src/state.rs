use std::sync::Arc;

use glossa_config::Config;
use glossa_core::scanner::TERM_ID_ATTR;
use glossa_core::{Document, Layout, Namespace, PopupController, PopupState, ScanReport, Scanner};
use glossa_types::{NodeId, Term};
use tokio::sync::RwLock;

use crate::timers::Timers;

/// Snapshot of widget internals, for hosts and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetStats {
    pub scan_passes: u64,
    pub terms: usize,
    pub processed_nodes: usize,
    pub popup: PopupState,
}

/// Everything the event loop owns
pub struct WidgetState {
    pub config: Config,
    pub document: Arc<RwLock<Document>>,
    pub layout: Box<dyn Layout>,
    pub scanner: Scanner,
    pub popups: PopupController,
    pub timers: Timers,
    pub scan_passes: u64,
}

impl WidgetState {
    pub fn namespace(&self) -> &Namespace {
        self.scanner.namespace()
    }

    pub fn stats(&self) -> WidgetStats {
        WidgetStats {
            scan_passes: self.scan_passes,
            terms: self.scanner.index().len(),
            processed_nodes: self.scanner.processed().len(),
            popup: self.popups.state(),
        }
    }

    /// Scan the whole body for unprocessed text
    pub fn rescan(&mut self, doc: &mut Document) -> ScanReport {
        self.scan_passes += 1;
        let body = doc.body();
        self.scanner.scan(doc, body)
    }

    pub fn show(&mut self, doc: &mut Document, trigger: NodeId, term: &Term) {
        self.timers.cancel_grace();
        let work = self.popups.show(doc, self.layout.as_ref(), trigger, term);
        self.timers.schedule(work);
    }

    /// Show the popup for the term `marker` wraps
    pub fn show_marker(&mut self, doc: &mut Document, marker: NodeId) -> bool {
        let term = doc
            .attr(marker, TERM_ID_ATTR)
            .and_then(|id| self.scanner.index().find_by_id(id))
            .cloned();

        match term {
            Some(term) => {
                self.show(doc, marker, &term);
                true
            }
            None => {
                tracing::debug!("Marker {:?} has no term in the current index", marker);
                false
            }
        }
    }

    pub fn hide(&mut self, doc: &mut Document) {
        self.timers.cancel_grace();
        let work = self.popups.hide(doc);
        self.timers.schedule(work);
    }

    pub fn is_active_trigger(&self, marker: NodeId) -> bool {
        self.popups.active().is_some_and(|a| a.trigger == marker)
    }

    /// Re-activating the current trigger hides, anything else shows
    pub fn toggle(&mut self, doc: &mut Document, marker: NodeId) {
        if self.is_active_trigger(marker) {
            self.hide(doc);
        } else {
            self.show_marker(doc, marker);
        }
    }
}
