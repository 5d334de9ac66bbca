use tokio::sync::broadcast;
use tracing::{error, info};

/// Lifecycle transitions of a [`Connection`](super::Connection).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// The store answered and the catalog is ready.
    Connected { database: String },
    /// Opening failed, or the collection task died.
    Error { message: String },
    /// The collection task has stopped.
    Disconnected,
}

/// Logs `event` and forwards it to every subscriber.
///
/// Having no subscribers is not an error.
pub(crate) fn emit(events: &broadcast::Sender<ConnectionEvent>, event: ConnectionEvent) {
    match &event {
        ConnectionEvent::Connected { database } => info!(%database, "Store connected"),
        ConnectionEvent::Error { message } => error!(error = %message, "Store connection error"),
        ConnectionEvent::Disconnected => info!("Store disconnected"),
    }
    let _ = events.send(event);
}
