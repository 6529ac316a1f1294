// Sentinel Core Library
// Controller for the multi-node operations dashboard: log-stream pause/resume,
// auto-scroll, node switching and the node registry modal.

pub mod config;
pub mod console;
pub mod host;
pub mod modal;
pub mod node;
pub mod page;
pub mod poller;
pub mod refresh;
pub mod registry;
pub mod runtime;
pub mod scroll;
pub mod selection;
pub mod stream;
pub mod transport;

// Export core types
pub use config::{ConsoleConfig, Endpoints, PageContract};
pub use console::{Console, Key, SubmitEvent, UiEvent};
pub use host::Host;
pub use modal::{ModalMode, ModalVisibility, NodeDraft, NodeModal};
pub use node::{normalize_token, IdGenerator, NodeRecord};
pub use page::{memory::MemoryPage, ElementHandle, Page, SwapStyle};
pub use poller::{Poller, Trigger};
pub use refresh::{FetchRequest, RefreshIntent, RegionKey, RequestLedger, Ticket};
pub use registry::{HttpNodeStore, NodeStore};
pub use runtime::{Command, Completion, PersistOp, Runtime};
pub use scroll::AutoScroll;
pub use selection::NodeSelection;
pub use stream::{StreamControl, StreamState, StreamTransition};
pub use transport::{Fetcher, HttpFetcher};

// Error types
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("Markup error: {0}")]
    MarkupError(#[from] page::markup::MarkupError),

    #[error("Swap error: {0}")]
    SwapError(String),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Unexpected status {0} from {1}")]
    StatusError(u16, String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
pub type Result<T> = std::result::Result<T, ConsoleError>;
