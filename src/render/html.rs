//! HTML rendering of document trees.
//!
//! Every node kind maps to a fixed element. Text is always escaped; the only
//! place raw markup enters the output is the code renderer's return value.
//! Nodes that failed classification render a visible diagnostic block with
//! their raw JSON, and rendering carries on with their siblings.

use super::{CodeRenderer, Markup, escape_html};
use crate::document::{Mark, Node, SubSup, is_safe_href};

/// Render a node and its subtree to HTML.
pub fn render(node: &Node, code: &dyn CodeRenderer<Markup>) -> Markup {
    let mut out = String::new();
    write_node(&mut out, node, code);
    Markup(out)
}

fn write_children(out: &mut String, nodes: &[Node], code: &dyn CodeRenderer<Markup>) {
    for node in nodes {
        write_node(out, node, code);
    }
}

fn write_wrapped(out: &mut String, tag: &str, nodes: &[Node], code: &dyn CodeRenderer<Markup>) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    write_children(out, nodes, code);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn write_node(out: &mut String, node: &Node, code: &dyn CodeRenderer<Markup>) {
    match node {
        Node::Doc { content } => write_children(out, content, code),
        Node::Paragraph { content } => write_wrapped(out, "p", content, code),
        Node::Heading { level, content } => {
            write_wrapped(out, &format!("h{}", level.get()), content, code);
        }
        Node::BulletList { content } => write_wrapped(out, "ul", content, code),
        Node::OrderedList { order, content } => match order {
            Some(start) if *start > 1 => {
                out.push_str(&format!("<ol start=\"{start}\">"));
                write_children(out, content, code);
                out.push_str("</ol>");
            }
            _ => write_wrapped(out, "ol", content, code),
        },
        Node::ListItem { content } => write_wrapped(out, "li", content, code),
        Node::CodeBlock { language, source } => {
            out.push_str(code.render_code(source, language.as_deref()).as_str());
        }
        Node::HardBreak => out.push_str("<br>"),
        Node::Text { text, marks } => write_text(out, text, marks),
        Node::Emoji { short_name, text } => {
            let glyph = text.as_deref().or(short_name.as_deref()).unwrap_or_default();
            out.push_str(&escape_html(glyph));
        }
        Node::Mention { text } => {
            out.push_str("<span class=\"mention\">");
            out.push_str(&escape_html(text));
            out.push_str("</span>");
        }
        Node::InlineCard { url } => {
            let url = escape_html(url);
            out.push_str(&format!("<a href=\"{url}\">{url}</a>"));
        }
        Node::Media(media) => {
            out.push_str("<span class=\"media\">[attachment: ");
            out.push_str(&escape_html(media.label()));
            out.push_str("]</span>");
        }
        Node::MediaSingle { content } => {
            out.push_str("<figure class=\"media-single\">");
            write_children(out, content, code);
            out.push_str("</figure>");
        }
        Node::Panel {
            panel_type,
            title,
            body,
        } => {
            let panel_type = escape_html(panel_type.as_deref().unwrap_or("info"));
            out.push_str(&format!("<div class=\"panel panel-{panel_type}\">"));
            out.push_str("<div class=\"panel-title\">");
            write_node(out, title, code);
            out.push_str("</div><div class=\"panel-body\">");
            write_node(out, body, code);
            out.push_str("</div></div>");
        }
        Node::Malformed { reason, .. } => write_diagnostic(out, node, Some(reason)),
        Node::Unknown { .. } => write_diagnostic(out, node, None),
    }
}

fn write_text(out: &mut String, text: &str, marks: &[Mark]) {
    let mut closing = Vec::with_capacity(marks.len());
    for mark in marks {
        let (open, close) = match mark {
            Mark::Strong => ("<strong>".to_string(), "</strong>"),
            Mark::Em => ("<em>".to_string(), "</em>"),
            Mark::Code => ("<code>".to_string(), "</code>"),
            Mark::Strike => ("<s>".to_string(), "</s>"),
            Mark::Underline => ("<u>".to_string(), "</u>"),
            Mark::SubSup(SubSup::Sub) => ("<sub>".to_string(), "</sub>"),
            Mark::SubSup(SubSup::Sup) => ("<sup>".to_string(), "</sup>"),
            Mark::Link { href } if is_safe_href(href) => {
                (format!("<a href=\"{}\">", escape_html(href)), "</a>")
            }
            Mark::Link { .. } => continue,
        };
        out.push_str(&open);
        closing.push(close);
    }
    out.push_str(&escape_html(text));
    for close in closing.iter().rev() {
        out.push_str(close);
    }
}

fn write_diagnostic(out: &mut String, node: &Node, reason: Option<&str>) {
    let dump = node.diagnostic().unwrap_or_default();
    out.push_str("<div class=\"adf-diagnostic\" data-kind=\"");
    out.push_str(&escape_html(node.kind()));
    out.push('"');
    if let Some(reason) = reason {
        out.push_str(" title=\"");
        out.push_str(&escape_html(reason));
        out.push('"');
    }
    out.push_str("><pre>");
    out.push_str(&escape_html(&dump));
    out.push_str("</pre></div>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::PlainCode;
    use serde_json::{Value, json};
    use std::cell::RefCell;

    fn html(value: Value) -> String {
        render(&Node::from_value(&value), &PlainCode).into_string()
    }

    fn text(s: &str) -> Value {
        json!({"type": "text", "text": s})
    }

    #[test]
    fn test_paragraph_preserves_order() {
        let out = html(json!({"type": "paragraph", "content": [text("A"), text("B")]}));
        assert_eq!(out, "<p>AB</p>");
    }

    #[test]
    fn test_doc_has_no_wrapper() {
        let out = html(json!({
            "type": "doc",
            "version": 1,
            "content": [
                {"type": "paragraph", "content": [text("one")]},
                {"type": "paragraph", "content": [text("two")]}
            ]
        }));
        assert_eq!(out, "<p>one</p><p>two</p>");
    }

    #[test]
    fn test_heading_levels() {
        assert_eq!(
            html(json!({"type": "heading", "attrs": {"level": 3}, "content": [text("X")]})),
            "<h3>X</h3>"
        );
        assert_eq!(
            html(json!({"type": "heading", "attrs": {"level": 1}, "content": [text("X")]})),
            "<h1>X</h1>"
        );
        assert_eq!(
            html(json!({"type": "heading", "attrs": {"level": 6}, "content": [text("X")]})),
            "<h6>X</h6>"
        );

        for level in [0, 7] {
            let out = html(json!({"type": "heading", "attrs": {"level": level}, "content": [text("X")]}));
            assert!(out.starts_with("<div class=\"adf-diagnostic\""), "{out}");
            assert!(!out.contains("<h0>") && !out.contains("<h7>"));
        }
    }

    #[test]
    fn test_lists() {
        let item = |s: &str| json!({"type": "listItem", "content": [{"type": "paragraph", "content": [text(s)]}]});
        assert_eq!(
            html(json!({"type": "bulletList", "content": [item("a"), item("b")]})),
            "<ul><li><p>a</p></li><li><p>b</p></li></ul>"
        );
        assert_eq!(
            html(json!({"type": "orderedList", "attrs": {"order": 1}, "content": [item("a")]})),
            "<ol><li><p>a</p></li></ol>"
        );
        assert_eq!(
            html(json!({"type": "orderedList", "attrs": {"order": 4}, "content": [item("a")]})),
            "<ol start=\"4\"><li><p>a</p></li></ol>"
        );
    }

    #[test]
    fn test_code_block_calls_renderer_once() {
        let calls = RefCell::new(Vec::new());
        let renderer = |source: &str, language: Option<&str>| {
            calls
                .borrow_mut()
                .push((source.to_string(), language.map(str::to_string)));
            Markup::trusted("<pre class=\"hl\">highlighted</pre>")
        };

        let node = Node::from_value(&json!({
            "type": "codeBlock",
            "attrs": {"language": "java"},
            "content": [{"type": "text", "text": "int x = 1;"}]
        }));
        let out = render(&node, &renderer);

        assert_eq!(out.as_str(), "<pre class=\"hl\">highlighted</pre>");
        assert_eq!(
            calls.into_inner(),
            vec![("int x = 1;".to_string(), Some("java".to_string()))]
        );
    }

    #[test]
    fn test_empty_code_block_skips_renderer() {
        let calls = RefCell::new(0);
        let renderer = |_: &str, _: Option<&str>| {
            *calls.borrow_mut() += 1;
            Markup::default()
        };

        for value in [
            json!({"type": "codeBlock", "attrs": {"language": "java"}, "content": []}),
            json!({"type": "codeBlock", "attrs": {"language": "java"}}),
        ] {
            let out = render(&Node::from_value(&value), &renderer);
            assert!(out.as_str().contains("adf-diagnostic"));
        }
        assert_eq!(calls.into_inner(), 0);
    }

    #[test]
    fn test_unknown_type_is_visible_and_siblings_render() {
        let out = html(json!({
            "type": "doc",
            "content": [
                {"type": "paragraph", "content": [text("before")]},
                {"type": "sillyNewNodeKind"},
                {"type": "paragraph", "content": [text("after")]}
            ]
        }));
        assert!(out.starts_with("<p>before</p>"));
        assert!(out.contains("adf-diagnostic"));
        assert!(out.contains("sillyNewNodeKind"));
        assert!(out.ends_with("<p>after</p>"));
    }

    #[test]
    fn test_mention_and_inline_card() {
        assert_eq!(
            html(json!({"type": "mention", "attrs": {"id": "x", "text": "@alice", "accessLevel": ""}})),
            "<span class=\"mention\">@alice</span>"
        );
        assert_eq!(
            html(json!({"type": "inlineCard", "attrs": {"url": "https://example.com/x"}})),
            "<a href=\"https://example.com/x\">https://example.com/x</a>"
        );
    }

    #[test]
    fn test_text_is_escaped() {
        assert_eq!(
            html(text("<script>alert('x')</script>")),
            "&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"
        );
    }

    #[test]
    fn test_marks_nest_in_order() {
        let out = html(json!({
            "type": "text",
            "text": "MC-1",
            "marks": [
                {"type": "link", "attrs": {"href": "https://bugs.mojang.com/browse/MC-1"}},
                {"type": "strong"}
            ]
        }));
        assert_eq!(
            out,
            "<a href=\"https://bugs.mojang.com/browse/MC-1\"><strong>MC-1</strong></a>"
        );
    }

    #[test]
    fn test_unsafe_link_mark_renders_plain_text() {
        let out = html(json!({
            "type": "text",
            "text": "click",
            "marks": [{"type": "link", "attrs": {"href": "javascript:alert(1)"}}]
        }));
        assert_eq!(out, "click");
    }

    #[test]
    fn test_emoji_uses_literal_text() {
        assert_eq!(
            html(json!({"type": "emoji", "attrs": {"shortName": ":smile:", "id": "1f604", "text": "😄"}})),
            "😄"
        );
        assert_eq!(
            html(json!({"type": "emoji", "attrs": {"shortName": ":custom:"}})),
            ":custom:"
        );
    }

    #[test]
    fn test_panel() {
        let out = html(json!({
            "type": "panel",
            "attrs": {"panelType": "warning"},
            "content": [
                {"type": "paragraph", "content": [text("Title")]},
                {"type": "paragraph", "content": [text("Body")]}
            ]
        }));
        assert_eq!(
            out,
            "<div class=\"panel panel-warning\"><div class=\"panel-title\"><p>Title</p></div>\
             <div class=\"panel-body\"><p>Body</p></div></div>"
        );

        let broken = html(json!({"type": "panel", "content": [{"type": "paragraph"}]}));
        assert!(broken.contains("adf-diagnostic"));
    }

    #[test]
    fn test_media_placeholder() {
        let out = html(json!({
            "type": "mediaSingle",
            "attrs": {"layout": "center"},
            "content": [{"type": "media", "attrs": {"id": "abc", "type": "file", "collection": "", "alt": "crash.png"}}]
        }));
        assert_eq!(
            out,
            "<figure class=\"media-single\"><span class=\"media\">[attachment: crash.png]</span></figure>"
        );
    }

    #[test]
    fn test_hard_break() {
        assert_eq!(
            html(json!({"type": "paragraph", "content": [text("a"), {"type": "hardBreak"}, text("b")]})),
            "<p>a<br>b</p>"
        );
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let value = json!({
            "type": "doc",
            "content": [
                {"type": "heading", "attrs": {"level": 2}, "content": [text("Steps")]},
                {"type": "orderedList", "content": [
                    {"type": "listItem", "content": [{"type": "paragraph", "content": [
                        text("Open "), {"type": "emoji", "attrs": {"text": "🙂"}},
                        {"type": "mention", "attrs": {"text": "@bob"}},
                        {"type": "inlineCard", "attrs": {"url": "https://example.com"}}
                    ]}]}
                ]}
            ]
        });
        let node = Node::from_value(&value);
        let first = render(&node, &PlainCode);
        let second = render(&node, &PlainCode);
        assert_eq!(first, second);
    }
}
