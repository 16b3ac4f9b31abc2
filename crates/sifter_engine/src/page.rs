//! In-memory model of the rendered listing.
//!
//! Parsed from listing HTML with the site's own selectors; visibility,
//! highlight and label state live on the model since the real DOM is not
//! available here.

use scraper::{ElementRef, Html, Selector};
use sift_logging::sift_warn;
use sifter_core::{PageCounts, ProductSnapshot, Verdict};

const PRODUCT_SELECTOR: &str = ".box.browsingitem";
const COUPON_SELECTOR: &str = ".coupon-block__label--code";
const TOTAL_LABEL_SELECTOR: &str = "#lblNumberItem";
const LOAD_MORE_ANY_SELECTOR: &str = ".js-button-more.button-more";
const LOAD_MORE_ACTIVE_SELECTOR: &str = ".js-button-more.button-more:not(.hdn)";
// Elements the site inserts when a category is swapped in without a
// navigation. Only top-level elements of a chunk count, matching what a
// mutation watcher sees as inserted nodes; markers nested inside a
// pagination fragment are ordinary content.
const CATEGORY_MARKER_SELECTOR: &str = "body > .container, body > .boxes";

// All selectors above are static and known valid.
fn sel(selector: &str) -> Selector {
    Selector::parse(selector).expect("static selector")
}

/// One tracked product element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductEntry {
    id: String,
    coupons: Vec<String>,
    visible: bool,
    highlighted: bool,
    discount_label: Option<String>,
}

impl ProductEntry {
    /// Stable identifier from the element's `data-id`.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Coupon code texts found under the element.
    pub fn coupons(&self) -> &[String] {
        &self.coupons
    }

    /// Whether the element is currently displayed.
    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Whether the element carries the highlight marker.
    pub fn highlighted(&self) -> bool {
        self.highlighted
    }

    /// The attached discount label, if any.
    pub fn discount_label(&self) -> Option<&str> {
        self.discount_label.as_deref()
    }

    fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot::new(self.id.clone(), self.coupons.clone())
    }
}

/// What a merged HTML chunk changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeReport {
    /// Products that were not tracked before.
    pub new_products: usize,
    /// The chunk inserted category container markers.
    pub category_changed: bool,
}

/// The page model: products, the reported total and the load-more control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPage {
    products: Vec<ProductEntry>,
    total: Option<u32>,
    load_more_present: bool,
}

impl ProductPage {
    /// Parse an initial listing document.
    pub fn parse(html: &str) -> Self {
        let mut page = Self {
            products: Vec::new(),
            total: None,
            load_more_present: false,
        };
        page.absorb(html);
        page
    }

    /// Merge an additional chunk (the result of a load-more click or an
    /// external DOM mutation) into the model.
    pub fn merge(&mut self, html: &str) -> MergeReport {
        self.absorb(html)
    }

    /// The counts the monitor polls every tick. Hidden products still count
    /// as pending; removed ones are gone.
    pub fn counts(&self) -> PageCounts {
        PageCounts {
            pending: self.products.iter().filter(|p| !p.highlighted).count(),
            highlighted: self.products.iter().filter(|p| p.highlighted).count(),
            total: self.total,
        }
    }

    /// Snapshots of every product not yet highlighted, in page order.
    pub fn pending_products(&self) -> Vec<ProductSnapshot> {
        self.products
            .iter()
            .filter(|p| !p.highlighted)
            .map(ProductEntry::snapshot)
            .collect()
    }

    /// All tracked products.
    pub fn products(&self) -> &[ProductEntry] {
        &self.products
    }

    /// Look up one product by identifier.
    pub fn product(&self, id: &str) -> Option<&ProductEntry> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Whether the active load-more control is present.
    pub fn has_load_more(&self) -> bool {
        self.load_more_present
    }

    pub(crate) fn set_load_more(&mut self, present: bool) {
        self.load_more_present = present;
    }

    /// Apply a classification verdict to one product.
    pub fn apply(&mut self, id: &str, verdict: &Verdict) {
        match verdict {
            Verdict::AlreadyProcessed => {}
            Verdict::Highlight {
                label,
                force_visible,
            } => {
                if let Some(product) = self.products.iter_mut().find(|p| p.id == id) {
                    if *force_visible {
                        product.visible = true;
                    }
                    product.highlighted = true;
                    product.discount_label = Some(label.clone());
                }
            }
            Verdict::Hide { remove } => {
                if *remove {
                    self.products.retain(|p| p.id != id);
                } else if let Some(product) = self.products.iter_mut().find(|p| p.id == id) {
                    product.visible = false;
                }
            }
        }
    }

    /// Clear the visual state of every product at session start: drop the
    /// highlight marker, and restore visibility unless memory optimization
    /// is active. Labels linger, as they do on the real page.
    pub fn reset_display(&mut self, optimize_memory: bool) {
        for product in &mut self.products {
            product.highlighted = false;
            if !optimize_memory {
                product.visible = true;
            }
        }
    }

    /// Force every product visible (threshold change undoing prior hides).
    pub fn show_all(&mut self) {
        for product in &mut self.products {
            product.visible = true;
        }
    }

    /// Replace the label on currently highlighted products.
    pub fn relabel_highlighted(&mut self, label: &str) {
        for product in &mut self.products {
            if product.highlighted {
                product.discount_label = Some(label.to_string());
            }
        }
    }

    fn absorb(&mut self, html: &str) -> MergeReport {
        let doc = Html::parse_document(html);

        let mut report = MergeReport {
            new_products: 0,
            category_changed: doc.select(&sel(CATEGORY_MARKER_SELECTOR)).next().is_some(),
        };

        for element in doc.select(&sel(PRODUCT_SELECTOR)) {
            let Some(id) = element.value().attr("data-id") else {
                sift_warn!("product element without data-id skipped");
                continue;
            };
            if self.products.iter().any(|p| p.id == id) {
                continue;
            }
            self.products.push(ProductEntry {
                id: id.to_string(),
                coupons: coupon_codes(element),
                visible: true,
                highlighted: false,
                discount_label: None,
            });
            report.new_products += 1;
        }

        if let Some(total) = parse_total_label(&doc) {
            self.total = Some(total);
        }

        // Only chunks that mention the control change its presence; other
        // mutations leave the current state alone.
        if doc.select(&sel(LOAD_MORE_ANY_SELECTOR)).next().is_some() {
            self.load_more_present = doc.select(&sel(LOAD_MORE_ACTIVE_SELECTOR)).next().is_some();
        }

        report
    }
}

fn coupon_codes(product: ElementRef<'_>) -> Vec<String> {
    product
        .select(&sel(COUPON_SELECTOR))
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|code| !code.is_empty())
        .collect()
}

/// The page-reported total: the leading digit run of the label text,
/// whitespace separators stripped, trailing text ignored. `None` when the
/// label is absent or starts with no digit; the caller reports it as
/// cosmetic.
fn parse_total_label(doc: &Html) -> Option<u32> {
    let element = doc.select(&sel(TOTAL_LABEL_SELECTOR)).next()?;
    let text: String = element
        .text()
        .collect::<String>()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    text[..end].parse().ok()
}
