//! Request lifecycle coordination
//!
//! Owns the one-live-request-per-kind discipline: issuing a new request of a
//! given kind aborts the previous one before anything from it can render.
//! Each spawned request carries a generation number; the engine only applies
//! events whose generation is still current, so a response that races its
//! own cancellation is discarded on delivery.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::client::{ClientError, SearchClient};
use crate::types::{CallHierarchy, FileContext, SearchResponse};

/// Completion events delivered to the engine loop.
#[derive(Debug)]
pub enum AppEvent {
    SearchFinished {
        generation: u64,
        full: bool,
        pattern: String,
        result: Result<SearchResponse, ClientError>,
    },
    ContextLoaded {
        generation: u64,
        file_path: String,
        line_number: u64,
        result: Result<FileContext, ClientError>,
    },
    HierarchyLoaded {
        generation: u64,
        function_name: String,
        result: Result<CallHierarchy, ClientError>,
    },
}

/// The three independent request kinds tracked by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Search,
    Context,
    Hierarchy,
}

#[derive(Debug, Default)]
struct RequestSlot {
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

impl RequestSlot {
    /// Abort the outstanding request (if any) and hand out the next
    /// generation number.
    fn supersede(&mut self) -> u64 {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.generation += 1;
        self.generation
    }
}

impl Drop for RequestSlot {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// Issues server requests and tracks which response generation is allowed
/// to reach the UI.
pub struct RequestCoordinator {
    client: SearchClient,
    events: mpsc::UnboundedSender<AppEvent>,
    search: RequestSlot,
    context: RequestSlot,
    hierarchy: RequestSlot,
}

impl RequestCoordinator {
    pub fn new(client: SearchClient, events: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self {
            client,
            events,
            search: RequestSlot::default(),
            context: RequestSlot::default(),
            hierarchy: RequestSlot::default(),
        }
    }

    /// Whether an event generation is still the live one for its kind.
    pub fn is_current(&self, kind: RequestKind, generation: u64) -> bool {
        let slot = match kind {
            RequestKind::Search => &self.search,
            RequestKind::Context => &self.context,
            RequestKind::Hierarchy => &self.hierarchy,
        };
        slot.generation == generation
    }

    /// Cancel the in-flight search, if any, without starting a new one.
    /// Used when the input fields empty out and the views are cleared.
    pub fn cancel_search(&mut self) {
        self.search.supersede();
    }

    pub fn start_search(&mut self, path: String, pattern: String, full: bool, limit: u64) {
        let generation = self.search.supersede();
        let client = self.client.clone();
        let events = self.events.clone();
        let limit = if full { 0 } else { limit };
        log::debug!("search gen {}: pattern={:?} limit={}", generation, pattern, limit);

        self.search.handle = Some(tokio::spawn(async move {
            let result = client.search(&path, &pattern, limit).await;
            let _ = events.send(AppEvent::SearchFinished {
                generation,
                full,
                pattern,
                result,
            });
        }));
    }

    pub fn load_context(&mut self, file_path: String, line_number: u64, base_path: String) {
        let generation = self.context.supersede();
        let client = self.client.clone();
        let events = self.events.clone();
        log::debug!("context gen {}: {}:{}", generation, file_path, line_number);

        self.context.handle = Some(tokio::spawn(async move {
            let result = client.file_content(&file_path, line_number, &base_path).await;
            let _ = events.send(AppEvent::ContextLoaded {
                generation,
                file_path,
                line_number,
                result,
            });
        }));
    }

    pub fn load_hierarchy(&mut self, function_name: String, base_path: String) {
        let generation = self.hierarchy.supersede();
        let client = self.client.clone();
        let events = self.events.clone();
        log::debug!("hierarchy gen {}: {}", generation, function_name);

        self.hierarchy.handle = Some(tokio::spawn(async move {
            let result = client.call_hierarchy(&function_name, &base_path).await;
            let _ = events.send(AppEvent::HierarchyLoaded {
                generation,
                function_name,
                result,
            });
        }));
    }
}
