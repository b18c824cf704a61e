use super::patterns::normalize_headers;
use crate::config::MergeConfig;
use crate::types::Exhibit;

/// Separator placed between the texts of two contributing pages.
pub const PAGE_BREAK: &str = "\n\n--- PAGE BREAK ---\n\n";

/// Fragments of one exhibit accumulated so far.
struct FragmentGroup {
    exhibit: Exhibit,
    /// Page of the most recently absorbed fragment
    last_page: u32,
    normalized_headers: Vec<String>,
}

impl FragmentGroup {
    fn start(fragment: Exhibit) -> Self {
        Self {
            last_page: fragment.first_page(),
            normalized_headers: normalize_headers(&fragment.headers),
            exhibit: fragment,
        }
    }

    fn accepts(&self, fragment: &Exhibit, page_tolerance: u32) -> bool {
        let page = fragment.first_page();
        self.exhibit.exhibit_name == fragment.exhibit_name
            && page.saturating_sub(self.last_page) <= page_tolerance
            && self.normalized_headers == normalize_headers(&fragment.headers)
    }

    fn absorb(&mut self, fragment: Exhibit) {
        let page = fragment.first_page();
        self.exhibit.rows.extend(fragment.rows);

        // Two tables on one page share that page's text
        if page != self.last_page {
            self.exhibit.page_range.push(page);
            self.exhibit.page_text.push_str(PAGE_BREAK);
            self.exhibit.page_text.push_str(&fragment.page_text);
        }
        self.last_page = page;
    }
}

/// Merge page fragments of the same exhibit within one document.
///
/// Fragments are visited in page order. A fragment joins the most recent
/// group when the exhibit name matches, its page is at most
/// `page_tolerance` pages after the group's last fragment, and the
/// normalized headers are identical. Otherwise it starts a new group, so a
/// header change splits one name into two exhibits.
pub fn merge_fragments(mut fragments: Vec<Exhibit>, config: &MergeConfig) -> Vec<Exhibit> {
    // Stable: same-page tables keep their on-page order
    fragments.sort_by_key(Exhibit::first_page);

    if !config.enabled {
        return fragments;
    }

    let fragment_count = fragments.len();
    let mut groups: Vec<FragmentGroup> = Vec::new();

    for fragment in fragments {
        match groups.last_mut() {
            Some(group) if group.accepts(&fragment, config.page_tolerance) => group.absorb(fragment),
            _ => groups.push(FragmentGroup::start(fragment)),
        }
    }

    if groups.len() < fragment_count {
        tracing::debug!(
            "   🔗 Merged {fragment_count} fragments into {} exhibits",
            groups.len()
        );
    }

    groups.into_iter().map(|g| g.exhibit).collect()
}
