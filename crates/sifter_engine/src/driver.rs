use std::collections::VecDeque;

use async_trait::async_trait;
use sifter_core::{PageCounts, ProductSnapshot, Verdict};

use crate::error::SiftError;
use crate::page::ProductPage;

/// What "clicking the load-more control" produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadMoreReport {
    /// The control existed and was invoked.
    pub clicked: bool,
    /// The merged chunk inserted category container markers.
    pub category_changed: bool,
}

/// Injectable source of additional listing chunks — the "fetch more"
/// capability behind the load-more control.
#[async_trait]
pub trait MoreSource: Send {
    /// The next chunk of listing HTML, or `None` when the listing is
    /// exhausted.
    async fn next_chunk(&mut self) -> Result<Option<String>, SiftError>;
}

/// Pre-scripted chunks for tests and offline runs.
pub struct ScriptedMoreSource {
    chunks: VecDeque<String>,
}

impl ScriptedMoreSource {
    pub fn new(chunks: Vec<String>) -> Self {
        Self {
            chunks: chunks.into(),
        }
    }

    /// A source that never produces anything.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl MoreSource for ScriptedMoreSource {
    async fn next_chunk(&mut self) -> Result<Option<String>, SiftError> {
        Ok(self.chunks.pop_front())
    }
}

/// Page access seam for the monitor runtime: count observation, verdict
/// application and the load-more capability.
#[async_trait]
pub trait PageDriver: Send {
    /// Current page counts.
    fn counts(&self) -> PageCounts;

    /// Snapshots of every product not yet highlighted.
    fn pending_products(&self) -> Vec<ProductSnapshot>;

    /// Apply a classification verdict to one product.
    fn apply(&mut self, id: &str, verdict: &Verdict);

    /// Clear all visual state at session start.
    fn reset_display(&mut self, optimize_memory: bool);

    /// Force every product visible.
    fn show_all(&mut self);

    /// Replace the label on currently highlighted products.
    fn relabel_highlighted(&mut self, label: &str);

    /// Try to invoke the load-more control.
    async fn trigger_load_more(&mut self) -> Result<LoadMoreReport, SiftError>;
}

/// The standard driver: a [`ProductPage`] model plus a [`MoreSource`].
pub struct HtmlPageDriver {
    page: ProductPage,
    more: Box<dyn MoreSource>,
}

impl HtmlPageDriver {
    pub fn new(page: ProductPage, more: Box<dyn MoreSource>) -> Self {
        Self { page, more }
    }

    /// Parse the initial listing and wire up the chunk source.
    pub fn from_html(html: &str, more: Box<dyn MoreSource>) -> Self {
        Self::new(ProductPage::parse(html), more)
    }

    /// The underlying page model.
    pub fn page(&self) -> &ProductPage {
        &self.page
    }
}

#[async_trait]
impl PageDriver for HtmlPageDriver {
    fn counts(&self) -> PageCounts {
        self.page.counts()
    }

    fn pending_products(&self) -> Vec<ProductSnapshot> {
        self.page.pending_products()
    }

    fn apply(&mut self, id: &str, verdict: &Verdict) {
        self.page.apply(id, verdict);
    }

    fn reset_display(&mut self, optimize_memory: bool) {
        self.page.reset_display(optimize_memory);
    }

    fn show_all(&mut self) {
        self.page.show_all();
    }

    fn relabel_highlighted(&mut self, label: &str) {
        self.page.relabel_highlighted(label);
    }

    async fn trigger_load_more(&mut self) -> Result<LoadMoreReport, SiftError> {
        if !self.page.has_load_more() {
            return Ok(LoadMoreReport::default());
        }

        match self.more.next_chunk().await? {
            Some(chunk) => {
                let merged = self.page.merge(&chunk);
                Ok(LoadMoreReport {
                    clicked: true,
                    category_changed: merged.category_changed,
                })
            }
            None => {
                // The control is still rendered but the source is dry;
                // treat it as the control disappearing so the session can
                // complete instead of clicking forever.
                self.page.set_load_more(false);
                Ok(LoadMoreReport::default())
            }
        }
    }
}
