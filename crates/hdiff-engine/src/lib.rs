//! Diff engines for hdiff.
//!
//! - [`DiffEngine`]: the capability every backend implements
//! - [`DiffDispatcher`]: registry that routes requests to engines by name
//! - [`CaxyHtmlDiff`]: reference token-level HTML diff engine
//! - [`ListDiffPostProcessor`]: annotates ordered lists in diff output
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use hdiff_engine::{CaxyHtmlDiff, DiffDispatcher, DiffEngine};
//!
//! let engines: Vec<Arc<dyn DiffEngine>> = vec![Arc::new(CaxyHtmlDiff::new())];
//! let dispatcher = DiffDispatcher::with_engines(engines);
//!
//! let html = dispatcher
//!     .dispatch("caxy_htmldiff", "<ol><li>A</li><li>B</li></ol>", "<ol><li>B</li></ol>")
//!     .unwrap();
//! assert!(html.contains(r#"<li class="removed"><del class="diffdel">A</del></li>"#));
//! ```

mod caxy;
mod dispatcher;
pub mod encoding;
mod engine;
mod error;
mod lists;
mod options;

pub use caxy::{CAXY_ENGINE_NAME, CaxyHtmlDiff, DiffSettings, MATCH_THRESHOLD, USE_TABLE_DIFFING};
pub use dispatcher::{DiffDispatcher, EngineRef};
pub use engine::DiffEngine;
pub use error::{DispatchError, EngineError};
pub use lists::{
    LIST_CLASS, ListDiffPostProcessor, NORMAL_CLASS, REMOVED_CLASS, REPLACEMENT_CLASS,
};
pub use options::{
    DiffOptions, DiffRequest, DiffResponse, EngineMetadata, OptionKind, OptionSpec,
};
