//! # mojira
//!
//! A viewer for the public Mojira issue tracker.
//!
//! Issue descriptions arrive as Atlassian document trees. This crate
//! classifies them into a closed [`Node`] model, renders them to HTML or to
//! styled terminal lines, and highlights code blocks through an injected
//! [`CodeRenderer`]. Around that sit the search API client, JQL building, a
//! deduplicating page cache, the table state and persisted preferences.
//!
//! ## Example
//!
//! ```rust
//! use mojira::document::Node;
//! use mojira::render::{PlainCode, html};
//! use serde_json::json;
//!
//! let doc = Node::from_value(&json!({
//!     "type": "doc",
//!     "content": [{
//!         "type": "paragraph",
//!         "content": [{"type": "text", "text": "Fish <despawn>"}]
//!     }]
//! }));
//!
//! let markup = html::render(&doc, &PlainCode);
//! assert_eq!(markup.as_str(), "<p>Fish &lt;despawn&gt;</p>");
//! ```

pub mod api;
pub mod config;
pub mod detail;
pub mod document;
pub mod error;
pub mod highlight;
pub mod keybindings;
pub mod logger;
pub mod query;
pub mod render;
pub mod table;
pub mod tui;

pub use config::Config;
pub use document::Node;
pub use error::{Error, Result};
pub use render::{CodeRenderer, Markup};
