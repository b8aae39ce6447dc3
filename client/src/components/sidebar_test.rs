use super::*;

#[test]
fn nav_items_are_fixed_and_ordered() {
    let titles: Vec<_> = NAV_ITEMS.iter().map(|i| i.title).collect();
    assert_eq!(titles, ["Home", "Popular", "All"]);
}

#[test]
fn render_lists_each_item() {
    assert_eq!(render(), ["- Home", "- Popular", "- All"]);
}
