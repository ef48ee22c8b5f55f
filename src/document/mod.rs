//! Rich-text documents attached to issues.
//!
//! Issue descriptions arrive as a recursive JSON tree of typed nodes
//! (`{"type": "paragraph", "content": [...]}`). This module classifies that
//! JSON once into [`Node`]. Every structural assumption (heading levels,
//! code block contents, panel arity, required attributes) is checked here,
//! so renderers can walk the tree without guarding indices.
//!
//! Classification never fails as a whole: a node that breaks its shape
//! becomes [`Node::Malformed`] and a kind the tracker introduced after this
//! code was written becomes [`Node::Unknown`]. Both keep the raw JSON so it
//! can be shown for debugging, and their siblings are unaffected.
//!
//! ## Example
//!
//! ```
//! use mojira::document::Node;
//! use serde_json::json;
//!
//! let node = Node::from_value(&json!({
//!     "type": "heading",
//!     "attrs": {"level": 7},
//!     "content": [{"type": "text", "text": "Too deep"}]
//! }));
//! assert!(matches!(node, Node::Malformed { .. }));
//! ```

mod marks;

pub use marks::{Mark, SubSup, is_safe_href};

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// A heading level, always within `1..=6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadingLevel(u8);

impl HeadingLevel {
    pub fn new(level: u64) -> Option<Self> {
        u8::try_from(level)
            .ok()
            .filter(|level| (1..=6).contains(level))
            .map(Self)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

/// An attachment reference. Attachments are never fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Media {
    pub id: Option<String>,
    pub alt: Option<String>,
    pub media_type: Option<String>,
}

impl Media {
    /// Human readable label: alt text, then id, then a generic word.
    pub fn label(&self) -> &str {
        self.alt
            .as_deref()
            .filter(|alt| !alt.is_empty())
            .or(self.id.as_deref())
            .unwrap_or("attachment")
    }
}

/// One classified document node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Doc {
        content: Vec<Node>,
    },
    Paragraph {
        content: Vec<Node>,
    },
    Heading {
        level: HeadingLevel,
        content: Vec<Node>,
    },
    BulletList {
        content: Vec<Node>,
    },
    OrderedList {
        /// Starting number, when the document asks for one.
        order: Option<u64>,
        content: Vec<Node>,
    },
    ListItem {
        content: Vec<Node>,
    },
    CodeBlock {
        language: Option<String>,
        source: String,
    },
    HardBreak,
    Text {
        text: String,
        marks: Vec<Mark>,
    },
    Emoji {
        short_name: Option<String>,
        text: Option<String>,
    },
    Mention {
        text: String,
    },
    InlineCard {
        url: String,
    },
    Media(Media),
    MediaSingle {
        content: Vec<Node>,
    },
    Panel {
        panel_type: Option<String>,
        title: Box<Node>,
        body: Box<Node>,
    },
    /// A recognised kind whose shape is wrong.
    Malformed {
        kind: String,
        reason: String,
        raw: Value,
    },
    /// A kind this viewer does not know.
    Unknown {
        kind: String,
        raw: Value,
    },
}

/// Borrowed view of one JSON node while it is being classified.
struct RawNode<'a> {
    kind: &'a str,
    object: &'a Map<String, Value>,
    value: &'a Value,
}

impl<'a> RawNode<'a> {
    fn malformed(&self, reason: impl Into<String>) -> Node {
        Node::Malformed {
            kind: self.kind.to_string(),
            reason: reason.into(),
            raw: self.value.clone(),
        }
    }

    fn attr(&self, name: &str) -> Option<&'a Value> {
        self.object.get("attrs")?.get(name)
    }

    fn attr_str(&self, name: &str) -> Option<&'a str> {
        self.attr(name).and_then(Value::as_str)
    }

    fn content_values(&self) -> Result<&'a [Value], Node> {
        match self.object.get("content") {
            None | Some(Value::Null) => Ok(<&[Value]>::default()),
            Some(Value::Array(values)) => Ok(values.as_slice()),
            Some(_) => Err(self.malformed("`content` is not an array")),
        }
    }

    fn children(&self) -> Result<Vec<Node>, Node> {
        Ok(self.content_values()?.iter().map(Node::from_value).collect())
    }
}

impl Node {
    /// Classify a JSON value into a node tree.
    pub fn from_value(value: &Value) -> Node {
        let Some(object) = value.as_object() else {
            return Node::Malformed {
                kind: "<invalid>".to_string(),
                reason: "node is not a JSON object".to_string(),
                raw: value.clone(),
            };
        };
        let Some(kind) = object.get("type").and_then(Value::as_str) else {
            return Node::Malformed {
                kind: "<missing>".to_string(),
                reason: "node has no string `type`".to_string(),
                raw: value.clone(),
            };
        };

        let raw = RawNode {
            kind,
            object,
            value,
        };
        match Self::classify(&raw) {
            Ok(node) | Err(node) => node,
        }
    }

    fn classify(raw: &RawNode<'_>) -> Result<Node, Node> {
        let node = match raw.kind {
            "doc" => Node::Doc {
                content: raw.children()?,
            },
            "paragraph" => Node::Paragraph {
                content: raw.children()?,
            },
            "heading" => {
                let level = raw
                    .attr("level")
                    .and_then(Value::as_u64)
                    .and_then(HeadingLevel::new)
                    .ok_or_else(|| raw.malformed("heading level must be between 1 and 6"))?;
                Node::Heading {
                    level,
                    content: raw.children()?,
                }
            }
            "bulletList" => Node::BulletList {
                content: raw.children()?,
            },
            "orderedList" => Node::OrderedList {
                order: raw.attr("order").and_then(Value::as_u64),
                content: raw.children()?,
            },
            "listItem" => Node::ListItem {
                content: raw.children()?,
            },
            "codeBlock" => Node::CodeBlock {
                language: raw
                    .attr_str("language")
                    .filter(|language| !language.is_empty())
                    .map(str::to_string),
                source: Self::code_source(raw)?,
            },
            "hardBreak" => Node::HardBreak,
            "text" => {
                let text = raw
                    .object
                    .get("text")
                    .and_then(Value::as_str)
                    .ok_or_else(|| raw.malformed("text node has no `text`"))?;
                let marks = raw
                    .object
                    .get("marks")
                    .and_then(Value::as_array)
                    .map(|marks| marks.iter().filter_map(Mark::from_value).collect())
                    .unwrap_or_default();
                Node::Text {
                    text: text.to_string(),
                    marks,
                }
            }
            "emoji" => {
                let short_name = raw.attr_str("shortName").map(str::to_string);
                let text = raw.attr_str("text").map(str::to_string);
                if short_name.is_none() && text.is_none() {
                    return Err(raw.malformed("emoji has neither `text` nor `shortName`"));
                }
                Node::Emoji { short_name, text }
            }
            "mention" => Node::Mention {
                text: raw
                    .attr_str("text")
                    .ok_or_else(|| raw.malformed("mention has no `text`"))?
                    .to_string(),
            },
            "inlineCard" => {
                let url = raw
                    .attr_str("url")
                    .ok_or_else(|| raw.malformed("inlineCard has no `url`"))?;
                if !is_safe_href(url) {
                    return Err(raw.malformed("inlineCard url has an unsupported scheme"));
                }
                Node::InlineCard {
                    url: url.to_string(),
                }
            }
            "media" => Node::Media(Media {
                id: raw.attr_str("id").map(str::to_string),
                alt: raw.attr_str("alt").map(str::to_string),
                media_type: raw.attr_str("type").map(str::to_string),
            }),
            "mediaSingle" => Node::MediaSingle {
                content: raw.children()?,
            },
            "panel" => {
                let [title, body] = raw.content_values()? else {
                    return Err(raw.malformed("panel must contain exactly a title and a body"));
                };
                Node::Panel {
                    panel_type: raw.attr_str("panelType").map(str::to_string),
                    title: Box::new(Node::from_value(title)),
                    body: Box::new(Node::from_value(body)),
                }
            }
            other => Node::Unknown {
                kind: other.to_string(),
                raw: raw.value.clone(),
            },
        };
        Ok(node)
    }

    /// Code blocks carry their source in text children. Several text runs are
    /// joined; no text child, or any non-text child, is malformed.
    fn code_source(raw: &RawNode<'_>) -> Result<String, Node> {
        let values = raw.content_values()?;
        if values.is_empty() {
            return Err(raw.malformed("codeBlock has no text child"));
        }

        let mut source = String::new();
        for value in values {
            let is_text = value.get("type").and_then(Value::as_str) == Some("text");
            let text = value.get("text").and_then(Value::as_str);
            match (is_text, text) {
                (true, Some(text)) => source.push_str(text),
                _ => return Err(raw.malformed("codeBlock child is not a text node")),
            }
        }
        Ok(source)
    }

    /// The node's `type` name as it appeared in the JSON.
    pub fn kind(&self) -> &str {
        match self {
            Node::Doc { .. } => "doc",
            Node::Paragraph { .. } => "paragraph",
            Node::Heading { .. } => "heading",
            Node::BulletList { .. } => "bulletList",
            Node::OrderedList { .. } => "orderedList",
            Node::ListItem { .. } => "listItem",
            Node::CodeBlock { .. } => "codeBlock",
            Node::HardBreak => "hardBreak",
            Node::Text { .. } => "text",
            Node::Emoji { .. } => "emoji",
            Node::Mention { .. } => "mention",
            Node::InlineCard { .. } => "inlineCard",
            Node::Media(_) => "media",
            Node::MediaSingle { .. } => "mediaSingle",
            Node::Panel { .. } => "panel",
            Node::Malformed { kind, .. } | Node::Unknown { kind, .. } => kind.as_str(),
        }
    }

    /// Whether this node flows inside a line of text.
    pub fn is_inline(&self) -> bool {
        matches!(
            self,
            Node::Text { .. }
                | Node::HardBreak
                | Node::Emoji { .. }
                | Node::Mention { .. }
                | Node::InlineCard { .. }
        )
    }

    /// Pretty-printed raw JSON for nodes that could not be interpreted.
    pub fn diagnostic(&self) -> Option<String> {
        match self {
            Node::Malformed { raw, .. } | Node::Unknown { raw, .. } => {
                Some(serde_json::to_string_pretty(raw).unwrap_or_else(|_| raw.to_string()))
            }
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(|value| Node::from_value(&value))
    }
}
