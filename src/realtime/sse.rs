//! Server-sent event streams driven by broker signals

use std::convert::Infallible;
use std::future::Future;
use std::time::Duration;

use axum::response::sse::{Event, KeepAlive, KeepAliveStream, Sse};
use futures::stream::{self, Stream};
use serde::Serialize;

use crate::{constants::SSE_KEEP_ALIVE_SECS, error::AppResult};

use super::broker::Subscription;

/// Emit `snapshot()` once immediately and again after every signal
///
/// A snapshot that fails to load or serialize is logged and skipped; the
/// stream ends only when the subscription closes or the client disconnects.
pub fn snapshot_stream<F, Fut, T>(
    subscription: Subscription,
    snapshot: F,
) -> impl Stream<Item = Result<Event, Infallible>> + Send
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = AppResult<T>> + Send,
    T: Serialize + Send,
{
    stream::unfold(
        (subscription, snapshot, true),
        |(mut subscription, mut snapshot, first)| async move {
            if !first {
                subscription.recv().await?;
            }

            loop {
                match snapshot().await.map(|value| Event::default().json_data(value)) {
                    Ok(Ok(event)) => return Some((Ok(event), (subscription, snapshot, false))),
                    Ok(Err(e)) => {
                        tracing::warn!(topic = %subscription.topic(), error = %e, "Snapshot serialization failed");
                    }
                    Err(e) => {
                        tracing::warn!(topic = %subscription.topic(), error = %e, "Snapshot refresh failed");
                    }
                }
                subscription.recv().await?;
            }
        },
    )
}

/// Wrap a snapshot stream in an SSE response with periodic keep-alives
pub fn into_sse<S>(stream: S) -> Sse<KeepAliveStream<S>>
where
    S: Stream<Item = Result<Event, Infallible>> + Send + 'static,
{
    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(SSE_KEEP_ALIVE_SECS)))
}
