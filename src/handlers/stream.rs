//! Per-entity refresh stream: a `refresh` event whenever the entity changes,
//! and periodically, until the client goes away.

use crate::error::AppError;
use crate::handlers::lookup;
use crate::notify::ChangeNotice;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
};
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast::{error::RecvError, Receiver};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

pub const REFRESH_EVENT: &str = "refresh";

struct Watch {
    entity: String,
    rx: Receiver<ChangeNotice>,
    tick: Interval,
}

fn refresh_event(entity: &str, reason: &str) -> Event {
    Event::default()
        .event(REFRESH_EVENT)
        .data(serde_json::json!({ "entity": entity, "reason": reason }).to_string())
}

impl Watch {
    fn new(entity: String, rx: Receiver<ChangeNotice>, period: Duration) -> Self {
        let period = period.max(Duration::from_millis(100));
        let mut tick = interval_at(Instant::now() + period, period);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Watch { entity, rx, tick }
    }

    /// Next event, or `None` once the notifier is gone.
    async fn next(&mut self) -> Option<Event> {
        loop {
            tokio::select! {
                msg = self.rx.recv() => match msg {
                    Ok(notice) if notice.entity == self.entity => {
                        return Some(refresh_event(&self.entity, notice.kind.verb()));
                    }
                    Ok(_) => continue,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(entity = %self.entity, skipped, "stream lagged");
                        return Some(refresh_event(&self.entity, "lagged"));
                    }
                    Err(RecvError::Closed) => return None,
                },
                _ = self.tick.tick() => return Some(refresh_event(&self.entity, "interval")),
            }
        }
    }
}

/// GET /:module/:collection/stream
pub async fn stream(
    State(state): State<AppState>,
    Path((module, collection)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let entity = lookup(&state, &module, &collection)?;
    let watch = Watch::new(
        entity.name.clone(),
        state.notifier.subscribe(),
        state.settings.stream_interval,
    );
    tracing::debug!(entity = %entity.name, "stream opened");
    let events = futures::stream::unfold(watch, |mut w| async move {
        w.next().await.map(|ev| (Ok::<_, Infallible>(ev), w))
    });
    Ok(Sse::new(events).keep_alive(KeepAlive::default()).into_response())
}
