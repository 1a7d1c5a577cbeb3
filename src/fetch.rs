//! Fetcher: the only path that writes the rendered message list.

use tracing::{debug, warn};

use crate::config::RefreshPolicy;
use crate::panel::{Panel, refreshes};
use crate::render::{FetchOutcome, PanelContent, render};

impl Panel {
    /// Fetch the event's messages and re-render the panel from them.
    ///
    /// Never fails: a failed fetch renders the inline error notice, leaves
    /// the displayed count as it was, and waits for the next refresh.
    pub async fn refresh(&self) {
        let _in_flight = self.track(refreshes);
        self.fetch_and_render().await;
    }

    /// Refresh on behalf of the scheduler. Returns `false` when the tick was
    /// skipped under [`RefreshPolicy::SkipWhileInFlight`].
    pub(crate) async fn scheduled_refresh(&self, policy: RefreshPolicy) -> bool {
        let skip_if_busy = policy == RefreshPolicy::SkipWhileInFlight;
        let Some(_in_flight) = self.track_unless(refreshes, |s| skip_if_busy && s.refreshes_in_flight > 0) else {
            debug!(event_id = %self.event_id(), "refresh already in flight; skipping tick");
            return false;
        };
        self.fetch_and_render().await;
        true
    }

    async fn fetch_and_render(&self) {
        let outcome = match self.api().list_messages(self.event_id()).await {
            Ok(messages) => {
                debug!(event_id = %self.event_id(), count = messages.len(), "messages fetched");
                FetchOutcome::Loaded(messages)
            }
            Err(e) => {
                warn!(event_id = %self.event_id(), error = %e, "message refresh failed");
                FetchOutcome::Failed
            }
        };
        self.apply(&outcome);
    }

    /// Render `outcome` wholesale. Last completed fetch wins.
    fn apply(&self, outcome: &FetchOutcome) {
        let content = render(outcome);
        let view = self.view();

        let _render = self.lock_render();
        view.replace_content(&content);
        if let Some(count) = content.count() {
            self.lock_state().last_message_count = count;
            view.set_count(count);
        }
        if matches!(content, PanelContent::Messages(_)) {
            view.scroll_to_end();
        }
    }
}
