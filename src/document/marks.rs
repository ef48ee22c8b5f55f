//! Inline formatting marks carried by text nodes.

use serde_json::Value;

/// Formatting applied to a run of text.
///
/// Only marks the renderers know how to express are kept; anything else the
/// tracker sends (text colours, annotations, ...) is dropped while the text
/// itself survives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mark {
    Strong,
    Em,
    Code,
    Strike,
    Underline,
    Link { href: String },
    SubSup(SubSup),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubSup {
    Sub,
    Sup,
}

impl Mark {
    /// Parse one entry of a text node's `marks` array.
    pub fn from_value(value: &Value) -> Option<Self> {
        let kind = value.get("type")?.as_str()?;
        let attrs = value.get("attrs");
        let attr = |name: &str| attrs.and_then(|a| a.get(name)).and_then(Value::as_str);

        match kind {
            "strong" => Some(Mark::Strong),
            "em" => Some(Mark::Em),
            "code" => Some(Mark::Code),
            "strike" => Some(Mark::Strike),
            "underline" => Some(Mark::Underline),
            "link" => attr("href").map(|href| Mark::Link {
                href: href.to_string(),
            }),
            "subsup" => match attr("type") {
                Some("sub") => Some(Mark::SubSup(SubSup::Sub)),
                Some("sup") => Some(Mark::SubSup(SubSup::Sup)),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Whether a URL is safe to place in an `href`.
pub fn is_safe_href(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    lower.starts_with("https://") || lower.starts_with("http://") || lower.starts_with("mailto:")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_known_marks() {
        assert_eq!(Mark::from_value(&json!({"type": "strong"})), Some(Mark::Strong));
        assert_eq!(
            Mark::from_value(&json!({"type": "link", "attrs": {"href": "https://x.y"}})),
            Some(Mark::Link {
                href: "https://x.y".to_string()
            })
        );
        assert_eq!(
            Mark::from_value(&json!({"type": "subsup", "attrs": {"type": "sup"}})),
            Some(Mark::SubSup(SubSup::Sup))
        );
    }

    #[test]
    fn test_unknown_or_incomplete_marks_are_dropped() {
        assert_eq!(Mark::from_value(&json!({"type": "textColor", "attrs": {"color": "#ff0000"}})), None);
        assert_eq!(Mark::from_value(&json!({"type": "link"})), None);
        assert_eq!(Mark::from_value(&json!("strong")), None);
    }

    #[test]
    fn test_safe_href() {
        assert!(is_safe_href("https://bugs.mojang.com/browse/MC-1"));
        assert!(is_safe_href("HTTP://example.com"));
        assert!(is_safe_href("mailto:someone@example.com"));
        assert!(!is_safe_href("javascript:alert(1)"));
        assert!(!is_safe_href("data:text/html,hi"));
    }
}
