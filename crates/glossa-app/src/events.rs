use std::ops::ControlFlow;
use std::sync::Arc;

use glossa_core::ScanReport;
use glossa_types::{InputEvent, NodeId, Size, Term};
use kanal::AsyncReceiver;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::state::{WidgetState, WidgetStats};

pub mod content;
pub mod input;
pub mod lifecycle;
pub mod popup;

use content::{handle_content_changed, handle_refresh, handle_scan_due, handle_update_terms};
use input::handle_input;
use lifecycle::handle_destroy;
use popup::{
    handle_grace_elapsed, handle_next_frame, handle_remove_due, handle_resize,
    handle_resize_due,
};

type Ack = oneshot::Sender<()>;

#[derive(Debug)]
pub enum WidgetEvent {
    // Host API
    Refresh(oneshot::Sender<ScanReport>),
    UpdateTerms {
        terms: Vec<Term>,
        reply: oneshot::Sender<ScanReport>,
    },
    ShowPopup {
        trigger: NodeId,
        term: Term,
        reply: Ack,
    },
    HidePopup(Ack),
    Destroy(oneshot::Sender<usize>),
    Stats(oneshot::Sender<WidgetStats>),

    // Environment plumbing
    ContentChanged(Ack),
    Input { event: InputEvent, reply: Ack },
    Resize { viewport: Size, reply: Ack },

    // Timers
    ScanDue(u64),
    ResizeDue(u64),
    GraceElapsed(u64),
    NextFrame(NodeId),
    RemoveDue(NodeId),
}

/// Widget's main loop
pub async fn event_loop(
    mut state: WidgetState,
    rx: AsyncReceiver<WidgetEvent>,
    cancel: CancellationToken,
) {
    tracing::info!("[EVENT_LOOP] Widget {} running", state.namespace().as_str());

    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("[EVENT_LOOP] Cancelled");
                break;
            }
            event = rx.recv() => match event {
                Ok(event) => event,
                Err(e) => {
                    tracing::debug!("[EVENT_LOOP] Channel closed: {}", e);
                    break;
                }
            },
        };

        tracing::debug!("[EVENT_LOOP] {:?}", event);
        if handle_event(&mut state, event).await.is_break() {
            break;
        }
    }

    state.timers.shutdown();
    tracing::info!("[EVENT_LOOP] Widget {} stopped", state.namespace().as_str());
}

async fn handle_event(state: &mut WidgetState, event: WidgetEvent) -> ControlFlow<()> {
    // one event, one write guard
    let document = Arc::clone(&state.document);
    let mut doc = document.write().await;

    match event {
        WidgetEvent::Refresh(reply) => {
            let report = handle_refresh(state, &mut doc);
            let _ = reply.send(report);
        }
        WidgetEvent::UpdateTerms { terms, reply } => {
            let report = handle_update_terms(state, &mut doc, terms);
            let _ = reply.send(report);
        }
        WidgetEvent::ShowPopup {
            trigger,
            term,
            reply,
        } => {
            if doc.is_attached(trigger) {
                state.show(&mut doc, trigger, &term);
            } else {
                tracing::warn!("Ignoring show request for detached trigger {:?}", trigger);
            }
            let _ = reply.send(());
        }
        WidgetEvent::HidePopup(reply) => {
            state.hide(&mut doc);
            let _ = reply.send(());
        }
        WidgetEvent::Destroy(reply) => {
            let removed = handle_destroy(state, &mut doc);
            let _ = reply.send(removed);
            return ControlFlow::Break(());
        }
        WidgetEvent::Stats(reply) => {
            let _ = reply.send(state.stats());
        }
        WidgetEvent::ContentChanged(reply) => {
            handle_content_changed(state);
            let _ = reply.send(());
        }
        WidgetEvent::Input { event, reply } => {
            handle_input(state, &mut doc, event);
            let _ = reply.send(());
        }
        WidgetEvent::Resize { viewport, reply } => {
            handle_resize(state, viewport);
            let _ = reply.send(());
        }
        WidgetEvent::ScanDue(generation) => handle_scan_due(state, &mut doc, generation),
        WidgetEvent::ResizeDue(generation) => handle_resize_due(state, &mut doc, generation),
        WidgetEvent::GraceElapsed(generation) => handle_grace_elapsed(state, &mut doc, generation),
        WidgetEvent::NextFrame(popup) => handle_next_frame(state, &mut doc, popup),
        WidgetEvent::RemoveDue(node) => handle_remove_due(state, &mut doc, node),
    }

    ControlFlow::Continue(())
}
