//! Fixed navigation sidebar.

#[cfg(test)]
#[path = "sidebar_test.rs"]
mod sidebar_test;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NavItem {
    pub title: &'static str,
    pub url: &'static str,
}

pub const NAV_ITEMS: [NavItem; 3] = [
    NavItem { title: "Home", url: "#" },
    NavItem { title: "Popular", url: "#" },
    NavItem { title: "All", url: "#" },
];

pub fn render() -> Vec<String> {
    NAV_ITEMS.iter().map(|item| format!("- {}", item.title)).collect()
}
