use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use mojira::api::Issue;
use mojira::detail::render_page;
use mojira::highlight::{Highlighter, SharedHighlighter, render_lazy};
use mojira::render::text::{self, PlainLines, to_plain_text};
use mojira::render::{Markup, PlainCode, html};

fn fixture_issue() -> Issue {
    serde_json::from_str(include_str!("fixtures/issue.json")).expect("fixture parses")
}

#[test]
fn test_fixture_html_structure() {
    let issue = fixture_issue();
    let doc = issue.description().expect("fixture has a description");
    let out = html::render(&doc, &PlainCode).into_string();

    assert!(out.starts_with("<p>Dropped items render <strong>behind</strong>"));
    assert!(out.contains("<a href=\"https://minecraft.wiki/w/Item\">the wiki</a>"));
    assert!(out.contains(" and this.</p>"));
    assert!(!out.contains("javascript:"));
    assert!(out.contains("<h2>Steps to reproduce</h2>"));
    assert!(out.contains("<ol><li><p>Place stained glass</p></li>"));
    assert!(out.contains(
        "<pre><code class=\"language-java\">List&lt;ItemEntity&gt; items = level.getEntities();</code></pre>"
    ));
    assert!(out.contains(
        "<div class=\"panel panel-warning\"><div class=\"panel-title\"><p>Note</p></div>"
    ));
    assert!(out.contains("<div class=\"adf-diagnostic\" data-kind=\"extension\">"));
    assert!(out.ends_with("<p><span class=\"mention\">@Helper</span> confirmed 👍</p>"));
}

#[test]
fn test_fixture_text_rendering() {
    let issue = fixture_issue();
    let doc = issue.description().expect("fixture has a description");
    let out = to_plain_text(&text::render(&doc, &PlainLines));

    assert!(out.contains("Dropped items render behind transparent blocks."));
    assert!(out.contains("## Steps to reproduce"));
    assert!(out.contains("1. Place stained glass"));
    assert!(out.contains("2. Drop an item behind it"));
    assert!(out.contains("╭─ java"));
    assert!(out.contains("│ List<ItemEntity> items = level.getEntities();"));
    assert!(out.contains("┃ Only with Fabulous graphics"));
    assert!(out.contains("⚠ unsupported node `extension`"));
}

#[test]
fn test_injected_renderer_sees_every_code_block() {
    let issue = fixture_issue();
    let doc = issue.description().expect("fixture has a description");
    let seen = std::cell::RefCell::new(Vec::new());
    let renderer = |source: &str, language: Option<&str>| {
        seen.borrow_mut()
            .push((source.to_string(), language.map(str::to_string)));
        Markup::trusted("<pre>code</pre>")
    };

    let out = html::render(&doc, &renderer).into_string();
    assert!(out.contains("<pre>code</pre>"));
    assert_eq!(
        seen.into_inner(),
        vec![(
            "List<ItemEntity> items = level.getEntities();".to_string(),
            Some("java".to_string())
        )]
    );
}

#[test]
fn test_highlighted_page() {
    let issue = fixture_issue();
    let highlighter = Highlighter::new(None);
    let description = issue
        .description()
        .map(|doc| html::render(&doc, &highlighter));
    let page = render_page(
        &issue,
        description.as_ref(),
        highlighter.background_css().as_deref(),
    )
    .into_string();

    assert!(page.starts_with("<!DOCTYPE html>"));
    assert!(page.contains("<title>[MC-4] Item drops appear &lt;behind&gt; blocks</title>"));
    assert!(page.contains("<a href=\"https://bugs.mojang.com/browse/MC-4\">MC-4</a>"));
    assert!(page.contains("<article class=\"description\">"));
    assert!(page.contains("<pre style="));
    assert!(!page.contains("List<ItemEntity>"));
}

#[tokio::test]
async fn test_lazy_rendering_matches_eager() {
    let issue = fixture_issue();
    let doc = issue.description().expect("fixture has a description");
    let loads = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&loads);
    let shared = SharedHighlighter::with_loader(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Highlighter::new(None))
    });

    let lazy = render_lazy(&doc, &shared).await.expect("lazy render");
    let again = render_lazy(&doc, &shared).await.expect("second lazy render");
    let eager = html::render(&doc, &Highlighter::new(None));

    assert_eq!(lazy, eager);
    assert_eq!(again, eager);
    assert_eq!(loads.load(Ordering::SeqCst), 1);
}
