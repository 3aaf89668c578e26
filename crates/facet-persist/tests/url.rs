//! Query-string shapes produced by the URL builder.

use facet_model::{RankedEntry, SortDirection};
use indexmap::IndexMap;
use facet_persist::{QueryParams, UrlOverrides, build_url};

#[test]
fn scalar_override_appends_after_existing_params() {
    let overrides = UrlOverrides::new().value("minPrice", &10.0_f64).unwrap();
    let url = build_url("/catalog", &QueryParams::parse("page=2"), &overrides);
    insta::assert_snapshot!(url, @"/catalog?page=2&minPrice=10.0");
}

#[test]
fn selection_and_sort_are_percent_encoded() {
    let mut sort = IndexMap::new();
    sort.insert("price", RankedEntry::active(SortDirection::Ascending, 0));
    let overrides = UrlOverrides::new()
        .value("tags", &vec!["red", "blue"])
        .unwrap()
        .value("sort", &sort)
        .unwrap();
    let url = build_url("/catalog", &QueryParams::new(), &overrides);
    insta::assert_snapshot!(
        url,
        @"/catalog?tags=%5B%22red%22%2C%22blue%22%5D&sort=%7B%22price%22%3A%7B%22direction%22%3A%22ascending%22%2C%22rank%22%3A0%7D%7D"
    );
}

#[test]
fn admin_deep_link_overrides_keep_the_rest() {
    let current = QueryParams::parse("q=%22smith%22&status=%5B%22open%22%5D&page=4");
    let overrides = UrlOverrides::new()
        .value("status", &vec!["refunded"])
        .unwrap()
        .clear("q");
    let url = build_url("/admin/orders", &current, &overrides);
    insta::assert_snapshot!(url, @"/admin/orders?q=&status=%5B%22refunded%22%5D&page=4");
}
