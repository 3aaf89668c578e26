//! Resolution tiers and URL round-trips.

use facet_model::{RankedEntry, SortDirection, StoreKind};
use indexmap::IndexMap;
use facet_persist::{
    KeyValueStore, QueryParams, ResolveOptions, ResolvedFrom, Sinks, UrlOverrides, build_url,
    split_url,
};

fn sinks_with(url: &str, tab: &[(&str, &str)]) -> Sinks {
    let mut sinks = Sinks::in_memory(url);
    for (key, value) in tab {
        sinks.tab.set(key, value).unwrap();
    }
    sinks
}

#[test]
fn query_string_wins_over_store() {
    let sinks = sinks_with("/catalog?minPrice=10", &[("minPrice", "20")]);
    let resolver = sinks.resolver(ResolveOptions::default());
    let resolved = resolver.resolve_where("minPrice", 0.0_f64, None, |_| true);
    assert_eq!(resolved.value, 10.0);
    assert_eq!(resolved.source, ResolvedFrom::Url);
}

#[test]
fn store_is_second_tier() {
    let sinks = sinks_with("/catalog", &[("minPrice", "20")]);
    let resolver = sinks.resolver(ResolveOptions::default());
    assert_eq!(resolver.resolve("minPrice", 0.0_f64), 20.0);
}

#[test]
fn prefer_store_when_url_not_preferred() {
    let sinks = sinks_with("/catalog?minPrice=10", &[("minPrice", "20")]);
    let resolver = sinks.resolver(ResolveOptions::default().with_prefer_url(false));
    assert_eq!(resolver.resolve("minPrice", 0.0_f64), 20.0);

    let sinks = sinks_with("/catalog?minPrice=10", &[]);
    let resolver = sinks.resolver(ResolveOptions::default().with_prefer_url(false));
    let resolved = resolver.resolve_where("minPrice", 0.0_f64, None, |_| true);
    assert_eq!(resolved.value, 10.0);
    assert_eq!(resolved.source, ResolvedFrom::Url);
}

#[test]
fn malformed_entries_fall_through_silently() {
    let sinks = sinks_with("/catalog?tags=%5Bbroken", &[("tags", "{\"not\":\"a list\"}")]);
    let resolver = sinks.resolver(ResolveOptions::default());
    let resolved = resolver.resolve_where("tags", Vec::<String>::new(), None, |_| true);
    assert!(resolved.value.is_empty());
    assert_eq!(resolved.source, ResolvedFrom::Default);
}

#[test]
fn fallback_beats_default_only_when_absent() {
    let sinks = sinks_with("/catalog", &[]);
    let resolver = sinks.resolver(ResolveOptions::default());
    assert_eq!(resolver.resolve_or("page", 1_u32, Some(3)), 3);

    let sinks = sinks_with("/catalog?page=5", &[]);
    let resolver = sinks.resolver(ResolveOptions::default());
    assert_eq!(resolver.resolve_or("page", 1_u32, Some(3)), 5);
}

#[test]
fn shape_check_rejects_then_falls_to_store() {
    let sinks = sinks_with("/catalog?minPrice=-5", &[("minPrice", "7")]);
    let resolver = sinks.resolver(ResolveOptions::default());
    let resolved = resolver.resolve_where("minPrice", 0.0_f64, None, |v| *v >= 0.0);
    assert_eq!(resolved.value, 7.0);
    assert_eq!(resolved.source, ResolvedFrom::Store);
}

#[test]
fn local_store_is_selected_by_options() {
    let mut sinks = Sinks::in_memory("/catalog");
    sinks.local.set("view", "\"grid\"").unwrap();
    let tab = sinks.resolver(ResolveOptions::default());
    assert_eq!(tab.resolve("view", String::from("list")), "list");
    let local = sinks.resolver(ResolveOptions::default().with_store(StoreKind::Local));
    assert_eq!(local.resolve("view", String::from("list")), "grid");
}

#[test]
fn resolution_is_idempotent() {
    let sinks = sinks_with("/catalog?tags=%5B%22red%22%5D", &[("minPrice", "4")]);
    let resolver = sinks.resolver(ResolveOptions::default());
    let first = (
        resolver.resolve("tags", Vec::<String>::new()),
        resolver.resolve("minPrice", 0.0_f64),
    );
    let second = (
        resolver.resolve("tags", Vec::<String>::new()),
        resolver.resolve("minPrice", 0.0_f64),
    );
    assert_eq!(first, second);
}

#[test]
fn build_url_then_resolve_round_trips() {
    let mut sort = IndexMap::new();
    sort.insert("title".to_string(), RankedEntry::active(SortDirection::Descending, 0));
    let tags = vec!["red".to_string(), "blue sky".to_string()];
    let overrides = UrlOverrides::new()
        .value("sort", &sort)
        .unwrap()
        .value("tags", &tags)
        .unwrap()
        .value("q", "50% off & more")
        .unwrap();

    let url = build_url("/catalog", &QueryParams::parse("page=3"), &overrides);
    let (_, query) = split_url(&url);
    let sinks = Sinks::in_memory(&url);
    let resolver = sinks.resolver(ResolveOptions::default().with_recover_null(true));

    assert_eq!(QueryParams::parse(query).get("page"), Some("3"));
    assert_eq!(resolver.resolve("sort", IndexMap::<String, RankedEntry>::new()), sort);
    assert_eq!(resolver.resolve("tags", Vec::<String>::new()), tags);
    assert_eq!(resolver.resolve("q", String::new()), "50% off & more");
}

#[test]
fn cleared_entry_resolves_to_default() {
    let overrides = UrlOverrides::new().clear("minPrice");
    let url = build_url("/catalog", &QueryParams::parse("minPrice=10"), &overrides);
    assert_eq!(url, "/catalog?minPrice=");

    let sinks = Sinks::in_memory(&url);
    let resolver = sinks.resolver(ResolveOptions::default());
    let resolved = resolver.resolve_where("minPrice", 0.0_f64, None, |_| true);
    assert_eq!(resolved.source, ResolvedFrom::Default);
    assert!(sinks.location.query().contains_key("minPrice"));
}
