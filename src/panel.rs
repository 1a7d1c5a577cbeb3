//! Chat panel bound to one event.
//!
//! DESIGN
//! ======
//! `Panel` is a cheap handle (`Arc` inside) shared by the scheduler task and
//! whatever host code forwards user actions. The operations live next to
//! their concern: `refresh` in `fetch.rs`, `submit` in `submit.rs`, `delete`
//! and `toggle_highlight` in `delete.rs`, polling in `scheduler.rs`.
//!
//! CONCURRENCY
//! ===========
//! The rendered content and the displayed count have exactly one writer, the
//! fetch path, which updates both under the render lock so two completing
//! refreshes cannot interleave. The state lock is only ever held briefly and
//! never across a `PanelView` call, so a view may read `Panel::state`. Sends and deletes only ever trigger a
//! refresh. In-flight bookkeeping uses drop guards, so a cancelled or
//! aborted operation still releases its slot.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::api::ChatApi;
use crate::config::{EventId, PanelConfig};
use crate::scheduler::{SchedulerHandle, spawn_scheduler};
use crate::view::PanelView;

/// Alert shown when no anti-forgery token can be read from the host.
pub const SECURITY_ERROR: &str = "Security error. Reload the page.";
/// Alert shown when a mutating request fails below the application layer.
pub const CONNECTION_ERROR: &str = "Connection error with the server";

// =============================================================================
// PANEL STATE
// =============================================================================

/// Snapshot of the panel's bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelState {
    pub event_id: EventId,
    /// Count currently displayed; untouched by failed fetches.
    pub last_message_count: usize,
    /// A send is in flight and the submit control is disabled.
    pub send_pending: bool,
    pub deletes_in_flight: usize,
    pub refreshes_in_flight: usize,
}

impl PanelState {
    fn new(event_id: EventId) -> Self {
        Self { event_id, last_message_count: 0, send_pending: false, deletes_in_flight: 0, refreshes_in_flight: 0 }
    }

    #[must_use]
    pub fn delete_pending(&self) -> bool {
        self.deletes_in_flight > 0
    }
}

// =============================================================================
// PANEL
// =============================================================================

#[derive(Clone)]
pub struct Panel {
    inner: Arc<PanelInner>,
}

struct PanelInner {
    event_id: EventId,
    max_message_chars: usize,
    api: Arc<dyn ChatApi>,
    view: Arc<dyn PanelView>,
    state: Mutex<PanelState>,
    /// Serializes view writes from completing fetches.
    render: Mutex<()>,
}

impl Panel {
    #[must_use]
    pub fn new(config: &PanelConfig, api: Arc<dyn ChatApi>, view: Arc<dyn PanelView>) -> Self {
        let inner = PanelInner {
            event_id: config.event_id.clone(),
            max_message_chars: config.max_message_chars,
            api,
            view,
            state: Mutex::new(PanelState::new(config.event_id.clone())),
            render: Mutex::new(()),
        };
        Self { inner: Arc::new(inner) }
    }

    /// Build the panel and start polling at the configured interval.
    ///
    /// The first refresh is issued immediately. Polling lasts until the
    /// returned handle is stopped or dropped.
    #[must_use]
    pub fn start(config: &PanelConfig, api: Arc<dyn ChatApi>, view: Arc<dyn PanelView>) -> (Self, SchedulerHandle) {
        let panel = Self::new(config, api, view);
        let handle = spawn_scheduler(panel.clone(), config.poll_interval, config.refresh_policy);
        (panel, handle)
    }

    #[must_use]
    pub fn event_id(&self) -> &EventId {
        &self.inner.event_id
    }

    #[must_use]
    pub fn max_message_chars(&self) -> usize {
        self.inner.max_message_chars
    }

    #[must_use]
    pub fn state(&self) -> PanelState {
        self.lock_state().clone()
    }

    pub(crate) fn api(&self) -> &dyn ChatApi {
        self.inner.api.as_ref()
    }

    pub(crate) fn view(&self) -> &dyn PanelView {
        self.inner.view.as_ref()
    }

    pub(crate) fn lock_state(&self) -> MutexGuard<'_, PanelState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn lock_render(&self) -> MutexGuard<'_, ()> {
        self.inner
            .render
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Count one in-flight operation until the guard drops.
    pub(crate) fn track(&self, counter: fn(&mut PanelState) -> &mut usize) -> InFlight {
        *counter(&mut self.lock_state()) += 1;
        InFlight { panel: self.clone(), counter }
    }

    /// Like [`Panel::track`], but refuses when `busy` holds. Check and
    /// increment happen under one lock.
    pub(crate) fn track_unless(
        &self,
        counter: fn(&mut PanelState) -> &mut usize,
        busy: impl FnOnce(&PanelState) -> bool,
    ) -> Option<InFlight> {
        let mut state = self.lock_state();
        if busy(&state) {
            return None;
        }
        *counter(&mut state) += 1;
        drop(state);
        Some(InFlight { panel: self.clone(), counter })
    }
}

// =============================================================================
// IN-FLIGHT GUARD
// =============================================================================

pub(crate) struct InFlight {
    panel: Panel,
    counter: fn(&mut PanelState) -> &mut usize,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let mut state = self.panel.lock_state();
        let slot = (self.counter)(&mut state);
        *slot = slot.saturating_sub(1);
    }
}

pub(crate) fn refreshes(state: &mut PanelState) -> &mut usize {
    &mut state.refreshes_in_flight
}

pub(crate) fn deletes(state: &mut PanelState) -> &mut usize {
    &mut state.deletes_in_flight
}

#[cfg(test)]
#[path = "panel_helpers_test.rs"]
pub(crate) mod test_helpers;

#[cfg(test)]
#[path = "panel_test.rs"]
mod tests;
