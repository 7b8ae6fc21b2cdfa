use std::sync::Arc;

use glossa_config::Config;
use glossa_core::{
    Document, Layout, Namespace, PopupController, ScanReport, Scanner, TermIndex, styles,
};
use glossa_loader::GlossarySource;
use glossa_types::{InputEvent, NodeId, Size, Term};
use kanal::{AsyncReceiver, AsyncSender};
use tokio::sync::{RwLock, oneshot};
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::error::WidgetError;
use crate::events::{WidgetEvent, event_loop};
use crate::state::{WidgetState, WidgetStats};
use crate::telemetry;
use crate::timers::Timers;

/// Channel into the widget's event loop
pub struct ChannelSet {
    pub host_to_widget: (AsyncSender<WidgetEvent>, AsyncReceiver<WidgetEvent>),
}

impl ChannelSet {
    pub fn new() -> Self {
        Self {
            host_to_widget: kanal::bounded_async(256), // mutation and pointer bursts
        }
    }
}

impl Default for ChannelSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Load the glossary named by `config.data_url` and start a widget on `document`
pub async fn initialize(
    config: Config,
    document: Arc<RwLock<Document>>,
    layout: Box<dyn Layout>,
) -> Result<Widget, WidgetError> {
    let source = glossa_loader::source_for(&config.data_url);
    initialize_with_source(config, document, layout, source.as_ref()).await
}

/// Like [`initialize`], reading the glossary from `source`
pub async fn initialize_with_source(
    config: Config,
    document: Arc<RwLock<Document>>,
    layout: Box<dyn Layout>,
    source: &dyn GlossarySource,
) -> Result<Widget, WidgetError> {
    config.validate()?;

    if config.debug_mode {
        telemetry::init(true);
        tracing::debug!("Debug diagnostics enabled");
    }

    let terms = match glossa_loader::load(source).await {
        Ok(terms) => terms,
        Err(e) => {
            tracing::error!("Glossary load failed, widget stays inert: {}", e);
            return Err(e.into());
        }
    };

    let ns = Namespace::generate(&config.instance_prefix);
    let index = TermIndex::build(terms, config.case_sensitive);
    tracing::info!("Widget {} indexing {} enabled terms", ns.as_str(), index.len());

    let mut scanner = Scanner::new(ns.clone(), index, &config);
    let popups = PopupController::new(ns.clone(), &config);

    let initial = {
        let mut doc = document.write().await;
        styles::inject(&mut doc, &ns, &config);
        let body = doc.body();
        scanner.scan(&mut doc, body)
    };
    tracing::info!(
        "Initial scan: {} text nodes, {} markers",
        initial.scanned,
        initial.markers
    );

    let channels = ChannelSet::new();
    let (tx, rx) = channels.host_to_widget;
    let cancel_token = CancellationToken::new();

    let state = WidgetState {
        config,
        document: Arc::clone(&document),
        layout,
        scanner,
        popups,
        timers: Timers::new(tx.clone(), cancel_token.child_token()),
        scan_passes: 1,
    };

    tokio::spawn(event_loop(state, rx, cancel_token.clone()));

    Ok(Widget {
        tx,
        _shutdown: Arc::new(cancel_token.clone().drop_guard()),
        cancel_token,
        namespace: ns,
        document,
    })
}

/// Handle to a running widget. Cheap to clone.
///
/// Dropping the last handle stops the event loop, as `destroy` does, but
/// leaves the markers in place.
#[derive(Clone)]
pub struct Widget {
    tx: AsyncSender<WidgetEvent>,
    cancel_token: CancellationToken,
    _shutdown: Arc<DropGuard>,
    namespace: Namespace,
    document: Arc<RwLock<Document>>,
}

impl Widget {
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn document(&self) -> &Arc<RwLock<Document>> {
        &self.document
    }

    pub fn is_running(&self) -> bool {
        !self.cancel_token.is_cancelled() && !self.tx.is_closed()
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> WidgetEvent,
    ) -> Result<T, WidgetError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| WidgetError::Closed)?;
        response.await.map_err(|_| WidgetError::Closed)
    }

    /// Scan content added since the last pass
    pub async fn refresh(&self) -> Result<ScanReport, WidgetError> {
        self.request(WidgetEvent::Refresh).await
    }

    /// Replace the glossary. Existing markers stay; new content matches the new terms.
    pub async fn update_terms(&self, terms: Vec<Term>) -> Result<ScanReport, WidgetError> {
        self.request(|reply| WidgetEvent::UpdateTerms { terms, reply })
            .await
    }

    pub async fn show_popup(&self, trigger: NodeId, term: Term) -> Result<(), WidgetError> {
        self.request(|reply| WidgetEvent::ShowPopup {
            trigger,
            term,
            reply,
        })
        .await
    }

    pub async fn hide_popup(&self) -> Result<(), WidgetError> {
        self.request(WidgetEvent::HidePopup).await
    }

    /// Restore the page and stop the widget. Returns the number of markers removed.
    pub async fn destroy(&self) -> Result<usize, WidgetError> {
        let removed = self.request(WidgetEvent::Destroy).await?;
        self.cancel_token.cancel();
        Ok(removed)
    }

    pub async fn stats(&self) -> Result<WidgetStats, WidgetError> {
        self.request(WidgetEvent::Stats).await
    }

    /// Content observer entry point: something under the body changed
    pub async fn notify_mutation(&self) -> Result<(), WidgetError> {
        self.request(WidgetEvent::ContentChanged).await
    }

    pub async fn dispatch(&self, event: InputEvent) -> Result<(), WidgetError> {
        self.request(|reply| WidgetEvent::Input { event, reply })
            .await
    }

    pub async fn resize(&self, viewport: Size) -> Result<(), WidgetError> {
        self.request(|reply| WidgetEvent::Resize { viewport, reply })
            .await
    }
}
