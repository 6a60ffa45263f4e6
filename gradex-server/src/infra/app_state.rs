use std::{fmt, sync::Arc};

use gradex_core::{Dispatcher, ExecutorStore, RequestCrypto};

/// Shared state handed to every handler.
///
/// Everything in here is an `Arc` to cheap-to-clone services; no ambient
/// globals, the store and dispatcher are injected at startup.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ExecutorStore>,
    pub dispatcher: Arc<Dispatcher>,
    pub crypto: Arc<RequestCrypto>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(
        store: Arc<dyn ExecutorStore>,
        dispatcher: Arc<Dispatcher>,
        crypto: Arc<RequestCrypto>,
    ) -> Self {
        Self {
            store,
            dispatcher,
            crypto,
        }
    }
}
