use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::Stream;
use tokio::sync::broadcast::error::RecvError;

use crate::state::AppState;

/// GET /api/v1/events
/// Push channel as Server-Sent Events. Delivery is best effort: a slow
/// listener skips what it missed rather than stalling the publisher.
pub async fn handle_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut events = state.broadcaster.subscribe();

    let stream = async_stream::stream! {
        loop {
            match events.recv().await {
                Ok(event) => {
                    let sse = Event::default()
                        .event(event.name())
                        .json_data(&event)
                        .unwrap_or_else(|_| Event::default().comment("unserializable event"));
                    yield Ok::<_, Infallible>(sse);
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "push listener lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}
