use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::warn;

#[derive(Clone)]
pub struct SseSender {
    tx: mpsc::UnboundedSender<Result<Event, Infallible>>,
}

impl SseSender {
    /// Returns false when the client side of the stream is gone.
    pub fn send_json(&self, value: &serde_json::Value) -> bool {
        let event = Event::default().data(value.to_string());
        if let Err(err) = self.tx.send(Ok(event)) {
            warn!(error = %err, "sse send_json failed");
            return false;
        }
        true
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

pub fn sse_channel() -> (
    Sse<impl Stream<Item = Result<Event, Infallible>>>,
    SseSender,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let stream = UnboundedReceiverStream::new(rx);
    let sse = Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text(crate::utils::events::Events::HEARTBEAT),
    );
    (sse, SseSender { tx })
}
