//! Build-wide tag index for nbcookbook.
//!
//! Tags recorded for each document during the read phase accumulate in a
//! single [`TagIndex`]; when the engine renders the dedicated index page,
//! [`render_context`] turns the accumulated mapping into the template
//! context for that page. The index lives for one build and is discarded
//! afterwards.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, PoisonError};

use serde::Serialize;

use nbcookbook_shared::Docname;

/// Name of the page whose template context receives the tag index.
pub const INDEX_PAGE: &str = "genindex";

/// Context key the index data is injected under.
pub const CONTEXT_KEY: &str = "indexdata";

/// Known document titles, keyed by docname.
pub type DocTitles = BTreeMap<Docname, String>;

// ---------------------------------------------------------------------------
// Accumulation
// ---------------------------------------------------------------------------

/// Tag → documents mapping accumulated across one build.
///
/// A single owned, mutex-guarded aggregate: document-read hooks may record
/// from multiple threads, and the engine reads the result once at index
/// render time.
#[derive(Debug, Default)]
pub struct TagIndex {
    inner: Mutex<BTreeMap<String, BTreeSet<Docname>>>,
}

impl TagIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a document's tags. Repeated records for the same document
    /// are idempotent.
    pub fn record(&self, docname: &Docname, tags: &[String]) {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        for tag in tags {
            map.entry(tag.clone())
                .or_default()
                .insert(docname.clone());
        }
    }

    /// A point-in-time copy of the accumulated mapping.
    pub fn snapshot(&self) -> BTreeMap<String, BTreeSet<Docname>> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_empty(&self) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

// ---------------------------------------------------------------------------
// Index page context
// ---------------------------------------------------------------------------

/// One document listed under a tag on the index page.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct IndexDoc {
    /// Display title: the document's known title, else its last docname
    /// segment.
    pub title: String,
    /// URL relative to the index page.
    pub url: String,
}

/// All documents carrying one tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexGroup {
    pub tag: String,
    pub entries: Vec<IndexDoc>,
}

/// Build the index page's template context data.
///
/// Returns `None` for every page except [`INDEX_PAGE`]. Groups are sorted
/// by tag; entries within a group are sorted by title then URL.
pub fn render_context(
    page_name: &str,
    index: &TagIndex,
    titles: &DocTitles,
) -> Option<Vec<IndexGroup>> {
    if page_name != INDEX_PAGE {
        return None;
    }

    let groups: Vec<IndexGroup> = index
        .snapshot()
        .into_iter()
        .map(|(tag, docnames)| {
            let mut entries: Vec<IndexDoc> = docnames
                .iter()
                .map(|docname| IndexDoc {
                    title: titles
                        .get(docname)
                        .cloned()
                        .unwrap_or_else(|| docname.last_segment().to_string()),
                    url: relative_uri(INDEX_PAGE, docname.as_str()),
                })
                .collect();
            entries.sort();
            IndexGroup { tag, entries }
        })
        .collect();

    tracing::debug!(tags = groups.len(), "built tag index context");
    Some(groups)
}

/// Populate a page's template context with the tag index.
///
/// Inserts [`CONTEXT_KEY`] into `context` when `page_name` is the index
/// page; any other page is left untouched. This is the body of the
/// engine's page-context hook.
pub fn populate_context(
    page_name: &str,
    index: &TagIndex,
    titles: &DocTitles,
    context: &mut serde_json::Map<String, serde_json::Value>,
) -> nbcookbook_shared::Result<()> {
    let Some(groups) = render_context(page_name, index, titles) else {
        return Ok(());
    };

    let value = serde_json::to_value(&groups).map_err(|e| {
        nbcookbook_shared::NbcookbookError::validation(format!(
            "tag index context serialization failed: {e}"
        ))
    })?;
    context.insert(CONTEXT_KEY.to_string(), value);
    Ok(())
}

/// The URI of `to_doc`'s rendered page relative to `from_page`'s.
///
/// Both arguments are docnames. Shared leading directories are dropped,
/// one `../` is emitted per remaining directory of `from_page`, and the
/// render suffix is appended.
pub fn relative_uri(from_page: &str, to_doc: &str) -> String {
    let from_dirs: Vec<&str> = {
        let mut parts: Vec<&str> = from_page.split('/').collect();
        parts.pop();
        parts
    };
    let to_parts: Vec<&str> = to_doc.split('/').collect();

    let common = from_dirs
        .iter()
        .zip(to_parts.iter().take(to_parts.len().saturating_sub(1)))
        .take_while(|(a, b)| a == b)
        .count();

    let mut uri = "../".repeat(from_dirs.len() - common);
    uri.push_str(&to_parts[common..].join("/"));
    uri.push_str(".html");
    uri
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(name: &str) -> Docname {
        Docname::new(name)
    }

    #[test]
    fn record_accumulates_across_documents() {
        let index = TagIndex::new();
        index.record(&doc("sims/intro"), &["protein".into(), "md".into()]);
        index.record(&doc("sims/advanced"), &["protein".into()]);
        index.record(&doc("sims/intro"), &["protein".into()]);

        let snapshot = index.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot["protein"].len(), 2);
        assert_eq!(snapshot["md"].len(), 1);
    }

    #[test]
    fn render_context_only_fires_for_the_index_page() {
        let index = TagIndex::new();
        index.record(&doc("intro"), &["md".into()]);
        assert!(render_context("intro", &index, &DocTitles::new()).is_none());
        assert!(render_context(INDEX_PAGE, &index, &DocTitles::new()).is_some());
    }

    #[test]
    fn groups_sorted_by_tag_entries_by_title() {
        let index = TagIndex::new();
        index.record(&doc("z_doc"), &["water".into()]);
        index.record(&doc("a_doc"), &["water".into(), "protein".into()]);

        let mut titles = DocTitles::new();
        titles.insert(doc("z_doc"), "An early title".into());

        let groups =
            render_context(INDEX_PAGE, &index, &titles).expect("index context");
        assert_eq!(groups[0].tag, "protein");
        assert_eq!(groups[1].tag, "water");

        // "An early title" sorts before the fallback title "a_doc".
        let water = &groups[1];
        assert_eq!(water.entries[0].title, "An early title");
        assert_eq!(water.entries[0].url, "z_doc.html");
        assert_eq!(water.entries[1].title, "a_doc");
    }

    #[test]
    fn fallback_title_is_last_docname_segment() {
        let index = TagIndex::new();
        index.record(&doc("sims/protein_in_water"), &["md".into()]);

        let groups = render_context(INDEX_PAGE, &index, &DocTitles::new())
            .expect("index context");
        assert_eq!(groups[0].entries[0].title, "protein_in_water");
        assert_eq!(groups[0].entries[0].url, "sims/protein_in_water.html");
    }

    #[test]
    fn relative_uri_paths() {
        assert_eq!(relative_uri("genindex", "sims/intro"), "sims/intro.html");
        assert_eq!(relative_uri("genindex", "intro"), "intro.html");
        assert_eq!(relative_uri("sims/page", "intro"), "../intro.html");
        assert_eq!(relative_uri("sims/page", "sims/intro"), "intro.html");
        assert_eq!(relative_uri("a/b/c", "a/x/y"), "../x/y.html");
    }

    #[test]
    fn populate_context_inserts_only_on_index_page() {
        let index = TagIndex::new();
        index.record(&doc("intro"), &["md".into()]);
        let titles = DocTitles::new();

        let mut context = serde_json::Map::new();
        populate_context("intro", &index, &titles, &mut context).expect("populate");
        assert!(context.is_empty());

        populate_context(INDEX_PAGE, &index, &titles, &mut context).expect("populate");
        let data = context.get(CONTEXT_KEY).expect("indexdata present");
        assert_eq!(data[0]["tag"], "md");
        assert_eq!(data[0]["entries"][0]["url"], "intro.html");
    }

    #[test]
    fn concurrent_records_are_safe() {
        let index = std::sync::Arc::new(TagIndex::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let index = index.clone();
                std::thread::spawn(move || {
                    index.record(&doc(&format!("doc{i}")), &["shared".into()]);
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("thread");
        }
        assert_eq!(index.snapshot()["shared"].len(), 8);
    }
}
