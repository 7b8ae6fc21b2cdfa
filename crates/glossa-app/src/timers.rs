use std::time::Duration;

use glossa_core::Deferred;
use kanal::AsyncSender;
use tokio_util::sync::CancellationToken;

use crate::events::WidgetEvent;

/// One paint frame
pub const FRAME: Duration = Duration::from_millis(16);

/// Timer bookkeeping for the event loop.
///
/// Every timer fires by posting an event back into the loop. Restartable
/// timers carry a generation; only the latest generation is honored, which
/// both debounces and cancels.
pub struct Timers {
    tx: AsyncSender<WidgetEvent>,
    cancel: CancellationToken,
    scan_generation: u64,
    resize_generation: u64,
    grace_generation: u64,
    grace_pending: bool,
}

impl Timers {
    pub fn new(tx: AsyncSender<WidgetEvent>, cancel: CancellationToken) -> Self {
        Self {
            tx,
            cancel,
            scan_generation: 0,
            resize_generation: 0,
            grace_generation: 0,
            grace_pending: false,
        }
    }

    fn after(&self, delay: Duration, event: WidgetEvent) {
        let tx = self.tx.clone();
        let cancel = self.cancel.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    if let Err(e) = tx.send(event).await {
                        tracing::debug!("Timer fired after event loop closed: {}", e);
                    }
                }
            }
        });
    }

    /// Restart the mutation debounce window
    pub fn debounce_scan(&mut self, delay: Duration) {
        self.scan_generation += 1;
        self.after(delay, WidgetEvent::ScanDue(self.scan_generation));
    }

    pub fn is_current_scan(&self, generation: u64) -> bool {
        generation == self.scan_generation
    }

    pub fn debounce_resize(&mut self, delay: Duration) {
        self.resize_generation += 1;
        self.after(delay, WidgetEvent::ResizeDue(self.resize_generation));
    }

    pub fn is_current_resize(&self, generation: u64) -> bool {
        generation == self.resize_generation
    }

    /// (Re)start the hover-exit grace period
    pub fn start_grace(&mut self, delay: Duration) {
        self.grace_generation += 1;
        self.grace_pending = true;
        self.after(delay, WidgetEvent::GraceElapsed(self.grace_generation));
    }

    pub fn cancel_grace(&mut self) {
        if self.grace_pending {
            // any in-flight timer now carries a stale generation
            self.grace_generation += 1;
            self.grace_pending = false;
        }
    }

    /// Consumes the grace timer if `generation` is the live one
    pub fn take_grace(&mut self, generation: u64) -> bool {
        if self.grace_pending && generation == self.grace_generation {
            self.grace_pending = false;
            true
        } else {
            false
        }
    }

    /// Run popup follow-up work on the clock
    pub fn schedule(&self, work: Vec<Deferred>) {
        for item in work {
            match item {
                Deferred::Activate(popup) => self.after(FRAME, WidgetEvent::NextFrame(popup)),
                Deferred::Remove { node, after } => self.after(after, WidgetEvent::RemoveDue(node)),
            }
        }
    }

    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}
