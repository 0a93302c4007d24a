use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use lobianco_core::events::ContentEvent;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/events", get(stream))
}

/// Server-sent change events. Opens with `welcome`; a subscriber that falls
/// behind gets `reconnect` and should refetch everything.
async fn stream(State(state): State<AppState>) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.service().events().subscribe();
    tracing::debug!(
        subscribers = state.service().events().subscriber_count(),
        "event stream opened"
    );

    let changes = BroadcastStream::new(receiver).map(|message| match message {
        Ok(event) => Ok(to_sse(&event)),
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(skipped, "event stream lagged");
            Ok(to_sse(&ContentEvent::Reconnect))
        }
    });
    let events = tokio_stream::once(Ok(to_sse(&ContentEvent::Welcome))).chain(changes);

    Sse::new(events).keep_alive(KeepAlive::default())
}

fn to_sse(event: &ContentEvent) -> Event {
    let name = match event {
        ContentEvent::Welcome => "welcome",
        ContentEvent::Changed(_) => "changed",
        ContentEvent::Reconnect => "reconnect",
    };
    Event::default().event(name).json_data(event).unwrap_or_else(|e| {
        tracing::error!("failed to encode event: {e}");
        Event::default().event(name)
    })
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use lobianco_core::events::{ChangeAction, ChangeEvent, Resource};
    use tower::ServiceExt;

    use super::*;
    use crate::routes::test_support::TestApp;

    async fn next_chunk<S>(stream: &mut S) -> String
    where
        S: Stream<Item = Result<axum::body::Bytes, axum::Error>> + Unpin,
    {
        let chunk = stream.next().await.unwrap().unwrap();
        String::from_utf8(chunk.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn stream_opens_with_welcome_then_relays_changes() {
        let app = TestApp::new();
        let res = app
            .router()
            .oneshot(Request::get("/api/events").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[header::CONTENT_TYPE], "text/event-stream");

        let mut body = res.into_body().into_data_stream();
        let first = next_chunk(&mut body).await;
        assert!(first.contains("event: welcome"));

        app.state.service().events().publish(ContentEvent::Changed(ChangeEvent::now(
            Resource::Carousel,
            ChangeAction::Created,
            Some(1),
        )));
        let second = next_chunk(&mut body).await;
        assert!(second.contains("event: changed"));
        assert!(second.contains(r#""resource":"carousel""#));
    }
}
