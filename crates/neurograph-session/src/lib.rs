//! Session controller for NeuroGraph.
//!
//! Three panels share one [`Session`]:
//!
//! - the **code panel** edits the source text and uploaded files, and
//!   triggers [`Session::generate`];
//! - the **graph canvas** renders [`Session::graph`] and re-renders on
//!   [`SessionEvent::GraphReplaced`];
//! - the **chat panel** runs [`Session::send_chat`] turns that may replace the
//!   graph.
//!
//! Analysis and chat are each single-flight: while one is outstanding a
//! second request of the same kind is skipped, not queued.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use neurograph_llm::OpenAiService;
//! use neurograph_session::Session;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let service = Arc::new(OpenAiService::from_env()?);
//! let session = Session::new(service);
//!
//! session.generate().await?;
//! session.send_chat("What does conv2 do?").await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod events;
mod graph_state;
mod layout;
mod session;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{SessionError, SessionResult};
pub use events::{Operation, SessionEvent};
pub use graph_state::GraphState;
pub use layout::LayoutState;
pub use session::{
    ChatOutcome, FileInfo, GenerateOutcome, Session, SessionConfig, SessionSnapshot, SkipReason,
    DEFAULT_CODE,
};
