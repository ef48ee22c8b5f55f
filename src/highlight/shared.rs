//! The lazily initialised, process-wide highlighter.

use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::debug;

use super::Highlighter;
use crate::document::Node;
use crate::error::{Error, Result};
use crate::render::{CodeRenderer, Markup, html};

type Loader = Arc<dyn Fn() -> Result<Highlighter> + Send + Sync>;

/// Cloneable handle to one lazily loaded [`Highlighter`].
///
/// The first [`get`](Self::get) loads syntaxes and themes on a blocking
/// thread. Callers arriving while that runs wait for the same load; later
/// callers get the stored instance. A failed load is not stored, so the next
/// caller tries again.
#[derive(Clone)]
pub struct SharedHighlighter {
    cell: Arc<OnceCell<Arc<Highlighter>>>,
    loader: Loader,
}

impl fmt::Debug for SharedHighlighter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedHighlighter")
            .field("ready", &self.is_ready())
            .finish()
    }
}

impl SharedHighlighter {
    pub fn new(theme: Option<String>) -> Self {
        Self::with_loader(move || Ok(Highlighter::new(theme.as_deref())))
    }

    pub fn with_loader<F>(loader: F) -> Self
    where
        F: Fn() -> Result<Highlighter> + Send + Sync + 'static,
    {
        Self {
            cell: Arc::new(OnceCell::new()),
            loader: Arc::new(loader),
        }
    }

    /// Get the highlighter, loading it if nobody has yet.
    pub async fn get(&self) -> Result<Arc<Highlighter>> {
        self.cell
            .get_or_try_init(|| async {
                debug!("loading shared highlighter");
                let loader = Arc::clone(&self.loader);
                let highlighter = tokio::task::spawn_blocking(move || loader())
                    .await
                    .map_err(|err| Error::Highlighter(err.to_string()))??;
                Ok::<_, Error>(Arc::new(highlighter))
            })
            .await
            .cloned()
    }

    /// The highlighter if it has finished loading.
    pub fn try_get(&self) -> Option<Arc<Highlighter>> {
        self.cell.get().cloned()
    }

    pub fn is_ready(&self) -> bool {
        self.cell.initialized()
    }
}

struct PendingBlock {
    source: String,
    language: Option<String>,
}

/// A [`CodeRenderer`] that records code blocks instead of highlighting them.
///
/// Each block becomes an HTML comment placeholder during the synchronous
/// walk. [`resolve`](Self::resolve) then waits for the shared highlighter
/// and swaps every placeholder for its highlighted markup. Escaped text can
/// never contain `<!--`, so placeholders cannot collide with content.
#[derive(Default)]
pub struct DeferredCode {
    blocks: RefCell<Vec<PendingBlock>>,
}

fn placeholder(index: usize) -> String {
    format!("<!--mojira-code-{index}-->")
}

impl CodeRenderer<Markup> for DeferredCode {
    fn render_code(&self, source: &str, language: Option<&str>) -> Markup {
        let mut blocks = self.blocks.borrow_mut();
        let index = blocks.len();
        blocks.push(PendingBlock {
            source: source.to_string(),
            language: language.map(str::to_string),
        });
        Markup::trusted(placeholder(index))
    }
}

impl DeferredCode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of code blocks waiting for highlighting.
    pub fn pending(&self) -> usize {
        self.blocks.borrow().len()
    }

    /// Replace placeholders in `markup` with highlighted code.
    ///
    /// Documents without code blocks never touch the shared highlighter.
    pub async fn resolve(self, markup: Markup, shared: &SharedHighlighter) -> Result<Markup> {
        let blocks = self.blocks.into_inner();
        if blocks.is_empty() {
            return Ok(markup);
        }

        let highlighter = shared.get().await?;
        let mut html = markup.into_string();
        for (index, block) in blocks.iter().enumerate() {
            let highlighted = highlighter.highlight_html(&block.source, block.language.as_deref());
            html = html.replacen(&placeholder(index), highlighted.as_str(), 1);
        }
        Ok(Markup::trusted(html))
    }
}

/// Render a document to HTML with the lazily shared highlighter.
pub async fn render_lazy(node: &Node, shared: &SharedHighlighter) -> Result<Markup> {
    let deferred = DeferredCode::new();
    let markup = html::render(node, &deferred);
    debug!(blocks = deferred.pending(), "document walked");
    deferred.resolve(markup, shared).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn counting(count: Arc<AtomicUsize>) -> SharedHighlighter {
        SharedHighlighter::with_loader(move || {
            count.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(50));
            Ok(Highlighter::new(None))
        })
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_share_one_initialisation() {
        let count = Arc::new(AtomicUsize::new(0));
        let shared = counting(Arc::clone(&count));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let shared = shared.clone();
                tokio::spawn(async move { shared.get().await })
            })
            .collect();

        let mut instances = Vec::new();
        for task in tasks {
            instances.push(task.await.unwrap().unwrap());
        }

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(instances.iter().all(|h| Arc::ptr_eq(h, &instances[0])));

        let later = shared.get().await.unwrap();
        assert!(Arc::ptr_eq(&later, &instances[0]));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_load_is_retried() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let shared = SharedHighlighter::with_loader(move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(Error::Highlighter("first attempt fails".to_string()))
            } else {
                Ok(Highlighter::new(None))
            }
        });

        assert!(shared.get().await.is_err());
        assert!(!shared.is_ready());
        assert!(shared.get().await.is_ok());
        assert!(shared.is_ready());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_render_lazy_injects_highlighted_code() {
        let shared = SharedHighlighter::new(None);
        let node = Node::from_value(&json!({
            "type": "doc",
            "content": [
                {"type": "paragraph", "content": [{"type": "text", "text": "before"}]},
                {"type": "codeBlock", "attrs": {"language": "java"}, "content": [{"type": "text", "text": "int x = 1;"}]},
                {"type": "codeBlock", "content": [{"type": "text", "text": "plain"}]}
            ]
        }));

        let markup = render_lazy(&node, &shared).await.unwrap();
        let html = markup.as_str();
        assert!(html.starts_with("<p>before</p><pre"));
        assert!(!html.contains("mojira-code"));
        assert!(html.contains("plain"));
        assert!(shared.is_ready());
    }

    #[test]
    fn test_deferred_code_leaves_placeholders() {
        let deferred = DeferredCode::new();
        let node = Node::from_value(&json!({
            "type": "doc",
            "content": [
                {"type": "codeBlock", "attrs": {"language": "java"}, "content": [{"type": "text", "text": "a"}]},
                {"type": "paragraph", "content": [{"type": "text", "text": "<!--mojira-code-1-->"}]},
                {"type": "codeBlock", "content": [{"type": "text", "text": "b"}]}
            ]
        }));

        let markup = html::render(&node, &deferred);
        assert_eq!(deferred.pending(), 2);
        assert_eq!(
            markup.as_str(),
            "<!--mojira-code-0--><p>&lt;!--mojira-code-1--&gt;</p><!--mojira-code-1-->"
        );
    }

    #[tokio::test]
    async fn test_documents_without_code_skip_loading() {
        let count = Arc::new(AtomicUsize::new(0));
        let shared = counting(Arc::clone(&count));
        let node = Node::from_value(&json!({"type": "paragraph", "content": [{"type": "text", "text": "x"}]}));

        let markup = render_lazy(&node, &shared).await.unwrap();
        assert_eq!(markup.as_str(), "<p>x</p>");
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
