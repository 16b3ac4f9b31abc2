use std::collections::HashSet;

use crate::coupon::best_discount;
use crate::status::discount_label;

/// Everything classification needs to know about one rendered product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSnapshot {
    /// Stable identifier from the product element.
    pub id: String,
    /// Coupon code texts found under the element.
    pub coupons: Vec<String>,
}

impl ProductSnapshot {
    /// Convenience constructor, mostly for tests.
    pub fn new(id: impl Into<String>, coupons: Vec<String>) -> Self {
        Self {
            id: id.into(),
            coupons,
        }
    }
}

/// Outcome of classifying one product against the current threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The identifier was already classified in this epoch; do nothing.
    AlreadyProcessed,
    /// The product qualifies: mark it and attach the label. Visibility is
    /// only forced when memory optimization is off; otherwise hidden
    /// qualifiers are assumed to have left the page already.
    Highlight { label: String, force_visible: bool },
    /// The product does not qualify: hide it, or remove it entirely when
    /// memory optimization is active.
    Hide { remove: bool },
}

/// Classify a product, recording its identifier in the processed set.
///
/// Idempotent per identifier within one epoch: the second call for the same
/// id yields [`Verdict::AlreadyProcessed`]. The id is recorded regardless of
/// the outcome.
pub fn verdict(
    threshold: u8,
    optimize_memory: bool,
    processed: &mut HashSet<String>,
    product: &ProductSnapshot,
) -> Verdict {
    if !processed.insert(product.id.clone()) {
        return Verdict::AlreadyProcessed;
    }

    let best = best_discount(product.coupons.iter().map(String::as_str));
    if best >= u32::from(threshold) {
        Verdict::Highlight {
            label: discount_label(threshold),
            force_visible: !optimize_memory,
        }
    } else {
        Verdict::Hide {
            remove: optimize_memory,
        }
    }
}
