//! Quill
//!
//! The editing core of a collaborative code editor.
//!
//! # Architecture
//!
//! - **Editor Module**: versioned ropey text buffer, editing session with
//!   commands, cursor/selection and time-batched undo/redo
//! - **Collab Module**: remote operation reconciler, snapshot diff and the
//!   JSON wire protocol
//! - **Syntax Module**: per-language line tokenizers, incremental line
//!   cache, debounce scheduler and background worker
//! - **Store Module**: document persistence by id
//!
//! # Usage
//!
//! ```
//! use quill::editor::EditSession;
//! use quill::editor::command::Command;
//! use quill::syntax::{Language, LineCache};
//!
//! let mut session = EditSession::new();
//! session.execute_command(Command::Insert { text: "let x = 1;".into() });
//!
//! let mut cache = LineCache::new(Language::JavaScript);
//! let tokens = cache.tokenize(&session.content());
//! assert!(!tokens.is_empty());
//! ```

// Clippy configuration - allow common patterns
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::should_implement_trait)]

pub mod clock;
pub mod collab;
pub mod config;
pub mod editor;
pub mod logging;
pub mod store;
pub mod syntax;

// Re-export main types
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use editor::EditSession;
pub use editor::command::Command;
pub use editor::edit::{Operation, Position, Selection};
pub use store::{DocumentStore, FileStore, MemoryStore};
pub use syntax::{Language, LineCache, TokenizeScheduler, TokenizeWorker};
