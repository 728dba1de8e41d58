pub mod client;
pub mod coordinator;
pub mod hierarchy;
pub mod highlight;
pub mod identifier;
pub mod markdown;
pub mod tui;
pub mod types;

pub use client::{ClientError, SearchClient, CONTEXT_LINES, MAX_HIERARCHY_DEPTH};
pub use coordinator::{AppEvent, RequestCoordinator, RequestKind};
pub use tui::{DetailSurface, Engine, EngineConfig};
pub use types::{CallHierarchy, FileContext, SearchResponse, SearchResultLine};
