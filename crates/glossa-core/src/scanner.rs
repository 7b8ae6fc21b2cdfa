//! Walks document text and wraps term hits in marker elements.

use std::collections::HashSet;

use glossa_config::Config;
use glossa_types::{NodeId, Term};

use crate::dom::Document;
use crate::matcher::{Segment, TermIndex};
use crate::namespace::Namespace;
use crate::selector::Selector;

/// Elements whose text is never annotated
const SKIPPED_TAGS: &[&str] = &["script", "style", "code", "pre", "textarea", "noscript"];

/// Present on every element any widget instance injects
pub const WIDGET_ATTR: &str = "data-glossa-widget";
/// Hosts can put this on a subtree to keep it unannotated
pub const SKIP_ATTR: &str = "data-glossa-skip";
pub const TERM_ID_ATTR: &str = "data-term-id";

/// Text shorter than this (trimmed, in chars) is not worth scanning
const MIN_TEXT_CHARS: usize = 2;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanReport {
    /// Text nodes run through the matcher
    pub scanned: usize,
    /// Text nodes marked processed without matching
    pub skipped: usize,
    pub markers: usize,
}

/// Text nodes that have been looked at once and must not be looked at again
#[derive(Debug, Default)]
pub struct ProcessedNodes {
    nodes: HashSet<NodeId>,
}

impl ProcessedNodes {
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    pub fn insert(&mut self, node: NodeId) {
        self.nodes.insert(node);
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Forget nodes that no longer exist
    pub fn prune(&mut self, doc: &Document) {
        self.nodes.retain(|node| doc.contains(*node));
    }
}

pub struct Scanner {
    ns: Namespace,
    index: TermIndex,
    processed: ProcessedNodes,
    exclusions: Vec<Selector>,
    focusable: bool,
}

impl Scanner {
    pub fn new(ns: Namespace, index: TermIndex, config: &Config) -> Self {
        let exclusions = config
            .exclude_selectors
            .iter()
            .filter_map(|source| match Selector::parse(source) {
                Ok(selector) => Some(selector),
                Err(e) => {
                    // an unusable rule excludes nothing
                    tracing::warn!("Ignoring exclude selector '{}': {}", source, e);
                    None
                }
            })
            .collect();

        Self {
            ns,
            index,
            processed: ProcessedNodes::default(),
            exclusions,
            focusable: config.enable_keyboard,
        }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.ns
    }

    pub fn index(&self) -> &TermIndex {
        &self.index
    }

    pub fn processed(&self) -> &ProcessedNodes {
        &self.processed
    }

    /// Swap in a new index and forget what was scanned, so the next
    /// scan revisits every text node outside existing markers
    pub fn replace_index(&mut self, index: TermIndex) {
        self.index = index;
        self.processed.clear();
    }

    fn is_excluded_element(&self, doc: &Document, element: NodeId) -> bool {
        let Some(tag) = doc.tag(element) else {
            return false;
        };

        SKIPPED_TAGS.contains(&tag)
            || doc.has_attr(element, WIDGET_ATTR)
            || doc.has_attr(element, SKIP_ATTR)
            || doc.has_class(element, &self.ns.term_class())
            || doc.has_class(element, &self.ns.popup_class())
            || doc.has_class(element, &self.ns.live_region_class())
            || self.exclusions.iter().any(|s| s.matches(doc, element))
    }

    /// Whether `node` or one of its ancestors is off limits
    pub fn is_excluded(&self, doc: &Document, node: NodeId) -> bool {
        doc.closest(node, |el| self.is_excluded_element(doc, el)).is_some()
    }

    /// Marker element containing `node`, if any
    pub fn marker_of(&self, doc: &Document, node: NodeId) -> Option<NodeId> {
        let class = self.ns.term_class();
        doc.closest(node, |el| doc.has_class(el, &class))
    }

    /// Annotate every unprocessed text node below `root`
    pub fn scan(&mut self, doc: &mut Document, root: NodeId) -> ScanReport {
        let mut report = ScanReport::default();

        for node in doc.text_nodes(root) {
            if self.processed.contains(node) {
                continue;
            }
            self.processed.insert(node);

            let Some(text) = doc.text(node) else {
                continue;
            };
            if text.trim().chars().count() < MIN_TEXT_CHARS || self.is_excluded(doc, node) {
                report.skipped += 1;
                continue;
            }

            report.scanned += 1;
            if self.index.is_empty() {
                continue;
            }

            let segments = self.index.segments(text);
            if !segments.iter().any(|s| matches!(s, Segment::Term { .. })) {
                continue;
            }

            let mut replacements = Vec::with_capacity(segments.len());
            for segment in segments {
                match segment {
                    Segment::Text(text) => {
                        let fresh = doc.create_text(&text);
                        // fragments of a matched node count as scanned
                        self.processed.insert(fresh);
                        replacements.push(fresh);
                    }
                    Segment::Term { index, surface } => {
                        let Some(term) = self.index.get(index) else {
                            continue;
                        };
                        let marker = build_marker(doc, &self.ns, term, &surface, self.focusable);
                        replacements.push(marker);
                        report.markers += 1;
                    }
                }
            }

            doc.replace_with(node, &replacements);
        }

        self.processed.prune(doc);

        tracing::debug!(
            "Scan pass: {} scanned, {} skipped, {} markers",
            report.scanned,
            report.skipped,
            report.markers
        );
        report
    }

    /// Replace every marker below `root` with its text and merge the
    /// resulting text runs. Returns the number of markers removed.
    pub fn unwrap_markers(&mut self, doc: &mut Document, root: NodeId) -> usize {
        let markers = doc.elements_with_class(root, &self.ns.term_class());
        let mut parents = Vec::new();

        for marker in &markers {
            if let Some(parent) = doc.parent(*marker)
                && !parents.contains(&parent)
            {
                parents.push(parent);
            }
            doc.unwrap(*marker);
        }

        for parent in parents {
            doc.normalize(parent);
        }

        self.processed.prune(doc);
        markers.len()
    }
}

fn build_marker(
    doc: &mut Document,
    ns: &Namespace,
    term: &Term,
    surface: &str,
    focusable: bool,
) -> NodeId {
    let marker = doc.create_element("span");
    doc.add_class(marker, &ns.term_class());
    doc.set_attr(marker, WIDGET_ATTR, ns.as_str());
    doc.set_attr(marker, TERM_ID_ATTR, &term.id);
    doc.set_attr(marker, "role", "button");
    if focusable {
        doc.set_attr(marker, "tabindex", "0");
    }
    doc.set_attr(marker, "aria-label", &format!("{surface}: {}", term.definition));
    doc.set_attr(marker, "aria-describedby", &ns.popup_id(&term.id));
    doc.set_attr(marker, "aria-haspopup", "dialog");
    doc.set_attr(marker, "aria-expanded", "false");

    let text = doc.create_text(surface);
    doc.append_child(marker, text);
    marker
}
