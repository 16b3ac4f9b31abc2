use pretty_assertions::assert_eq;
use sifter_core::{PageCounts, Verdict};
use sifter_engine::ProductPage;

fn product(id: &str, coupons: &[&str]) -> String {
    let coupon_html: String = coupons
        .iter()
        .map(|c| format!(r#"<span class="coupon-block__label--code"> {c} </span>"#))
        .collect();
    format!(r#"<div class="box browsingitem" data-id="{id}">{coupon_html}</div>"#)
}

fn listing(body: &str) -> String {
    format!("<html><body>{body}</body></html>")
}

#[test]
fn parses_products_and_coupon_texts() {
    let html = listing(&format!(
        "{}{}",
        product("p1", &["ALZADNY60", "ALZADNI40"]),
        product("p2", &[]),
    ));

    let page = ProductPage::parse(&html);

    assert_eq!(page.products().len(), 2);
    let first = page.product("p1").unwrap();
    assert_eq!(first.coupons(), ["ALZADNY60", "ALZADNI40"]);
    assert!(first.visible());
    assert!(!first.highlighted());
    assert!(page.product("p2").unwrap().coupons().is_empty());
}

#[test]
fn products_without_an_id_are_skipped() {
    let html = listing(r#"<div class="box browsingitem"></div>"#);

    let page = ProductPage::parse(&html);

    assert!(page.products().is_empty());
}

#[test]
fn total_label_tolerates_thousands_spacing() {
    let html = listing(&format!(
        r#"<span id="lblNumberItem"> 1 234 </span>{}"#,
        product("p1", &[])
    ));

    let page = ProductPage::parse(&html);

    assert_eq!(page.counts().total, Some(1234));
}

#[test]
fn total_label_ignores_trailing_text() {
    let html = listing(r#"<span id="lblNumberItem">1 234 items</span>"#);

    let page = ProductPage::parse(&html);

    assert_eq!(page.counts().total, Some(1234));
}

#[test]
fn unparseable_total_label_is_none() {
    let html = listing(r#"<span id="lblNumberItem">many</span>"#);

    let page = ProductPage::parse(&html);

    assert_eq!(page.counts().total, None);
}

#[test]
fn load_more_presence_respects_the_hidden_class() {
    let active = listing(r#"<a class="js-button-more button-more" href="/p2">more</a>"#);
    assert!(ProductPage::parse(&active).has_load_more());

    let hidden = listing(r#"<a class="js-button-more button-more hdn" href="/p2">more</a>"#);
    assert!(!ProductPage::parse(&hidden).has_load_more());

    let absent = listing("");
    assert!(!ProductPage::parse(&absent).has_load_more());
}

#[test]
fn merge_appends_new_products_and_skips_known_ids() {
    let mut page = ProductPage::parse(&listing(&product("p1", &[])));

    let report = page.merge(&listing(&format!(
        "{}{}",
        product("p1", &[]),
        product("p2", &["ALZADNY55"])
    )));

    assert_eq!(report.new_products, 1);
    assert_eq!(page.products().len(), 2);
}

#[test]
fn merge_detects_category_markers() {
    let mut page = ProductPage::parse(&listing(&product("p1", &[])));

    let plain = page.merge(&listing(&product("p2", &[])));
    assert!(!plain.category_changed);

    let swapped = page.merge(&listing(r#"<div class="container"><div class="boxes"></div></div>"#));
    assert!(swapped.category_changed);
}

#[test]
fn markers_nested_inside_a_fragment_do_not_count_as_a_category_change() {
    let mut page = ProductPage::parse(&listing(&product("p1", &[])));

    // A pagination chunk whose wrapper is plain content; the marker class
    // only appears deeper inside.
    let report = page.merge(&listing(&format!(
        r#"<div class="grid-wrap"><div class="boxes">{}</div></div>"#,
        product("p2", &[])
    )));

    assert!(!report.category_changed);
    assert_eq!(report.new_products, 1);
}

#[test]
fn counts_track_visibility_and_highlighting() {
    let mut page = ProductPage::parse(&listing(&format!(
        "{}{}{}",
        product("p1", &["ALZADNY60"]),
        product("p2", &["ALZADNI40"]),
        product("p3", &[]),
    )));

    page.apply(
        "p1",
        &Verdict::Highlight {
            label: "50%+ OFF".to_string(),
            force_visible: true,
        },
    );
    page.apply("p2", &Verdict::Hide { remove: false });

    // Hidden products still count as pending; highlighted ones do not.
    assert_eq!(
        page.counts(),
        PageCounts {
            pending: 2,
            highlighted: 1,
            total: None,
        }
    );
    assert!(!page.product("p2").unwrap().visible());
    assert_eq!(page.product("p1").unwrap().discount_label(), Some("50%+ OFF"));

    page.apply("p3", &Verdict::Hide { remove: true });
    assert!(page.product("p3").is_none());
    assert_eq!(page.counts().pending, 1);
}

#[test]
fn pending_products_exclude_highlighted_but_not_hidden() {
    let mut page = ProductPage::parse(&listing(&format!(
        "{}{}",
        product("p1", &["ALZADNY60"]),
        product("p2", &["ALZADNI40"]),
    )));
    page.apply(
        "p1",
        &Verdict::Highlight {
            label: "50%+ OFF".to_string(),
            force_visible: true,
        },
    );
    page.apply("p2", &Verdict::Hide { remove: false });

    let pending = page.pending_products();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, "p2");
}

#[test]
fn reset_display_clears_highlights_and_restores_visibility() {
    let mut page = ProductPage::parse(&listing(&format!(
        "{}{}",
        product("p1", &["ALZADNY60"]),
        product("p2", &["ALZADNI40"]),
    )));
    page.apply(
        "p1",
        &Verdict::Highlight {
            label: "50%+ OFF".to_string(),
            force_visible: true,
        },
    );
    page.apply("p2", &Verdict::Hide { remove: false });

    page.reset_display(false);

    assert!(page.products().iter().all(|p| !p.highlighted()));
    assert!(page.products().iter().all(|p| p.visible()));
}

#[test]
fn reset_display_under_memory_optimization_leaves_visibility_alone() {
    let mut page = ProductPage::parse(&listing(&format!(
        "{}{}",
        product("p1", &[]),
        product("p2", &[]),
    )));
    page.apply("p2", &Verdict::Hide { remove: false });

    page.reset_display(true);

    assert!(!page.product("p2").unwrap().visible());
}

#[test]
fn relabel_only_touches_highlighted_products() {
    let mut page = ProductPage::parse(&listing(&format!(
        "{}{}",
        product("p1", &["ALZADNY60"]),
        product("p2", &["ALZADNI40"]),
    )));
    page.apply(
        "p1",
        &Verdict::Highlight {
            label: "50%+ OFF".to_string(),
            force_visible: true,
        },
    );

    page.relabel_highlighted("30%+ OFF");

    assert_eq!(page.product("p1").unwrap().discount_label(), Some("30%+ OFF"));
    assert_eq!(page.product("p2").unwrap().discount_label(), None);
}
