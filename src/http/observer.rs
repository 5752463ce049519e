//! Error observers
//!
//! Receive a summary of every failed exchange. Injected at client
//! construction instead of a global response hook.

use reqwest::{Method, StatusCode};

/// Summary of a failed exchange
#[derive(Debug, Clone)]
pub struct ApiErrorEvent {
    pub method: Method,
    pub url: String,
    /// `None` when no response was received
    pub status: Option<StatusCode>,
    pub message: String,
}

/// Callback for failed exchanges
pub trait ErrorObserver: Send + Sync {
    fn on_error(&self, event: &ApiErrorEvent);
}

impl<F> ErrorObserver for F
where
    F: Fn(&ApiErrorEvent) + Send + Sync,
{
    fn on_error(&self, event: &ApiErrorEvent) {
        self(event)
    }
}

/// Observer that logs every failure through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct LogErrors;

impl ErrorObserver for LogErrors {
    fn on_error(&self, event: &ApiErrorEvent) {
        tracing::error!(
            method = %event.method,
            url = %event.url,
            status = ?event.status.map(|s| s.as_u16()),
            message = %event.message,
            "API error"
        );
    }
}
