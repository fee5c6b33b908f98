//! Quick search: incremental substring filtering with keyboard selection.
//!
//! A `QuickSearch` holds a query and a window into the items that match it.
//! Typing narrows the list, Up/Down (or Tab/Shift-Tab) move the selection
//! with wraparound, and Return picks the selected item. When a display
//! `limit` is set and more items match than fit, only a scrolling window of
//! `limit` rows is shown together with a footer summary.
//!
//! # API
//!
//! - `handle_key(&KeyPress) -> SearchAction` - the state machine
//! - `filtered()` - items matching the current query, in original order
//! - `set_items(items)` - replace the item list; resets only on real change
//! - `view()` / `render(glyph)` - pure projections of the current state
//!
//! # Example
//!
//! ```
//! use slashline::config::QuickSearchConfig;
//! use slashline::input::KeyPress;
//! use slashline::search::{QuickSearch, SearchAction};
//! use slashline::types::Item;
//!
//! let items = vec![Item::labeled("save"), Item::labeled("send"), Item::labeled("exit")];
//! let mut search = QuickSearch::new(QuickSearchConfig::default(), items);
//! search.handle_key(&KeyPress::char('s'));
//! search.handle_key(&KeyPress::char('e'));
//! let labels: Vec<_> = search.filtered().iter().map(|i| i.label.as_str()).collect();
//! assert_eq!(labels, ["save", "send"]);
//! ```

use crate::config::QuickSearchConfig;
use crate::input::{KeyName, KeyPress};
use crate::render::{Line, Span, Style};
use crate::types::{Item, Rgba, WindowIndices};

const NO_MATCHES: &str = "No matches";
const SELECTED_MARKER: &str = "> ";
const UNSELECTED_MARKER: &str = "  ";

// =============================================================================
// Types
// =============================================================================

/// Outcome of a key press in quick search.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchAction {
    /// Return was pressed. Carries the selected item, or the sentinel
    /// (`Item::sentinel()`) when nothing matches.
    Select(Item),
    QueryChanged,
    /// The keystroke would have left no item matching; nothing changed.
    Rejected,
    Moved,
    Ignored,
}

/// One visible row, with the label split around the matched text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRow {
    pub pre: String,
    pub matched: String,
    pub post: String,
    pub selected: bool,
}

impl SearchRow {
    pub fn label(&self) -> String {
        format!("{}{}{}", self.pre, self.matched, self.post)
    }
}

/// Everything needed to draw the quick search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchView {
    pub query: String,
    pub rows: Vec<SearchRow>,
    pub footer: Option<String>,
}

// =============================================================================
// QuickSearch
// =============================================================================

#[derive(Debug, Clone)]
pub struct QuickSearch {
    config: QuickSearchConfig,
    items: Vec<Item>,
    query: String,
    window: WindowIndices,
    focused: bool,
}

impl QuickSearch {
    pub fn new(config: QuickSearchConfig, items: Vec<Item>) -> Self {
        Self {
            config,
            items,
            query: String::new(),
            window: WindowIndices::default(),
            focused: true,
        }
    }

    pub fn config(&self) -> &QuickSearchConfig {
        &self.config
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn window(&self) -> WindowIndices {
        self.window
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn set_focus(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// Replace the item list. A list equal to the current one (same labels
    /// and values in the same order) is a no-op; any other list resets the
    /// query and window. Returns whether a reset happened.
    pub fn set_items(&mut self, items: Vec<Item>) -> bool {
        if items == self.items {
            return false;
        }
        self.items = items;
        self.reset();
        true
    }

    /// Clear query and window.
    pub fn reset(&mut self) {
        self.query.clear();
        self.window = WindowIndices::default();
    }

    // -------------------------------------------------------------------------
    // Matching
    // -------------------------------------------------------------------------

    /// Char index of the first occurrence of `query` in `label`.
    pub fn match_index(&self, label: &str, query: &str) -> Option<usize> {
        let fold = |ch: char| {
            if self.config.case_sensitive {
                ch
            } else {
                fold_case(ch)
            }
        };
        let label: Vec<char> = label.chars().map(fold).collect();
        let query: Vec<char> = query.chars().map(fold).collect();

        if query.is_empty() {
            return Some(0);
        }
        if query.len() > label.len() {
            return None;
        }
        label.windows(query.len()).position(|window| window == query.as_slice())
    }

    /// Items matching `query`, in their original order.
    pub fn filter(&self, query: &str) -> Vec<&Item> {
        if query.is_empty() {
            return self.items.iter().collect();
        }
        self.items
            .iter()
            .filter(|item| self.match_index(&item.label, query).is_some())
            .collect()
    }

    /// Items matching the current query.
    pub fn filtered(&self) -> Vec<&Item> {
        self.filter(&self.query)
    }

    /// Whether `count` matches are shown through a window of `limit` rows.
    fn uses_limited_view_for(&self, count: usize) -> bool {
        self.config.limit != 0 && count > self.config.limit
    }

    /// The selected item, or the sentinel when nothing matches.
    pub fn selected_item(&self) -> Item {
        self.filtered()
            .get(self.window.selection)
            .map(|item| (*item).clone())
            .unwrap_or_else(Item::sentinel)
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    pub fn handle_key(&mut self, key: &KeyPress) -> SearchAction {
        if !self.focused {
            return SearchAction::Ignored;
        }

        if self.is_clear_key(key) {
            self.query.clear();
            self.clamp_window();
            return SearchAction::QueryChanged;
        }

        if key.is_printable() {
            return self.push_query(&key.input);
        }

        match key.name {
            Some(KeyName::Return) => SearchAction::Select(self.selected_item()),
            Some(KeyName::Backspace) => {
                if self.query.pop().is_none() {
                    return SearchAction::Ignored;
                }
                self.clamp_window();
                SearchAction::QueryChanged
            }
            Some(KeyName::Up) => {
                self.select_up();
                SearchAction::Moved
            }
            Some(KeyName::Down) => {
                self.select_down();
                SearchAction::Moved
            }
            Some(KeyName::Tab) if key.shift => {
                self.select_up();
                SearchAction::Moved
            }
            Some(KeyName::Tab) => {
                self.select_down();
                SearchAction::Moved
            }
            _ => SearchAction::Ignored,
        }
    }

    fn is_clear_key(&self, key: &KeyPress) -> bool {
        !key.paste
            && self
                .config
                .clear_query_chars
                .iter()
                .any(|seq| *seq == key.sequence)
    }

    fn push_query(&mut self, text: &str) -> SearchAction {
        let candidate = format!("{}{}", self.query, text);
        if self.config.force_matching_query && self.filter(&candidate).is_empty() {
            tracing::trace!(query = %candidate, "rejected query with no matches");
            return SearchAction::Rejected;
        }
        self.query = candidate;
        self.window = WindowIndices::default();
        SearchAction::QueryChanged
    }

    /// Move the selection up one row, wrapping to the last item.
    pub fn select_up(&mut self) {
        let count = self.filtered().len();
        if count == 0 {
            return;
        }
        let limited = self.uses_limited_view_for(count);
        let WindowIndices { selection, start } = self.window;

        self.window = if selection == 0 {
            WindowIndices {
                selection: count - 1,
                start: if limited { count - self.config.limit } else { start },
            }
        } else {
            let scroll = limited && selection.saturating_sub(start) <= 1 && start > 0;
            WindowIndices {
                selection: selection - 1,
                start: if scroll { start - 1 } else { start },
            }
        };
    }

    /// Move the selection down one row, wrapping to the first item.
    pub fn select_down(&mut self) {
        let count = self.filtered().len();
        if count == 0 {
            return;
        }
        let limited = self.uses_limited_view_for(count);
        let WindowIndices { selection, start } = self.window;

        self.window = if selection + 1 >= count {
            WindowIndices::default()
        } else {
            let selection = selection + 1;
            let scroll = limited && selection.saturating_sub(start) + 1 >= self.config.limit;
            WindowIndices {
                selection,
                start: if scroll { start + 1 } else { start },
            }
        };
    }

    /// Keep `start <= selection < len` after the filtered list changed size.
    fn clamp_window(&mut self) {
        let count = self.filtered().len();
        if count == 0 {
            self.window = WindowIndices::default();
            return;
        }
        let selection = self.window.selection.min(count - 1);
        let start = self.window.start.min(selection);
        self.window = WindowIndices { selection, start };
    }

    // -------------------------------------------------------------------------
    // Projection
    // -------------------------------------------------------------------------

    /// Visible range `[begin, end)` into the filtered list. `end` is bounded
    /// by the full item count, so it can run past the filtered list.
    pub fn visible_range(&self) -> (usize, usize) {
        let begin = self.window.start;
        let end = if self.config.limit != 0 {
            (begin + self.config.limit).min(self.items.len())
        } else {
            self.items.len()
        };
        (begin, end)
    }

    pub fn view(&self) -> SearchView {
        let filtered = self.filtered();
        let (begin, end) = self.visible_range();
        let first = begin.min(filtered.len());
        let last = end.min(filtered.len()).max(first);

        let rows = filtered[first..last]
            .iter()
            .enumerate()
            .map(|(offset, item)| {
                let (pre, matched, post) = self.split_label(&item.label);
                SearchRow {
                    pre,
                    matched,
                    post,
                    selected: first + offset == self.window.selection,
                }
            })
            .collect();

        let footer = self.uses_limited_view_for(filtered.len()).then(|| {
            format!(
                "Viewing {}-{} of {} matching items ({} items overall)",
                begin,
                end,
                filtered.len(),
                self.items.len()
            )
        });

        SearchView {
            query: self.query.clone(),
            rows,
            footer,
        }
    }

    /// Split a label around the first match of the query.
    fn split_label(&self, label: &str) -> (String, String, String) {
        let Some(start) = self.match_index(label, &self.query) else {
            return (label.to_string(), String::new(), String::new());
        };
        let query_len = self.query.chars().count();
        let pre = label.chars().take(start).collect();
        let matched = label.chars().skip(start).take(query_len).collect();
        let post = label.chars().skip(start + query_len).collect();
        (pre, matched, post)
    }

    /// Draw the status line (glyph plus query) followed by the rows and the
    /// optional footer.
    pub fn render(&self, glyph: &str) -> Vec<Line> {
        let view = self.view();
        let mut lines = Vec::with_capacity(view.rows.len() + 2);

        let mut status = Line::raw(glyph);
        status.push(Span::styled(view.query.clone(), Style::new().fg(Rgba::QUERY)));
        lines.push(status);

        if view.rows.is_empty() {
            lines.push(Line::raw(NO_MATCHES));
        }

        let green = Style::new().fg(Rgba::GREEN);
        for row in &view.rows {
            let label_style = if row.selected { green } else { Style::new() };
            let marker = if row.selected {
                SELECTED_MARKER
            } else {
                UNSELECTED_MARKER
            };
            let mut line = Line::new();
            line.push(Span::styled(marker, green));
            line.push(Span::styled(row.pre.clone(), label_style));
            line.push(Span::styled(
                row.matched.clone(),
                label_style.bg(Rgba::MATCH_HIGHLIGHT),
            ));
            line.push(Span::styled(row.post.clone(), label_style));
            lines.push(line);
        }

        if let Some(footer) = view.footer {
            lines.push(Line::raw(footer));
        }
        lines
    }
}

/// Single-char lowercase mapping, so char indices line up between the
/// folded and original label.
fn fold_case(ch: char) -> char {
    let mut lower = ch.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(folded), None) => folded,
        _ => ch,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ItemValue;

    fn labeled(labels: &[&str]) -> Vec<Item> {
        labels.iter().map(|label| Item::labeled(*label)).collect()
    }

    fn search(labels: &[&str]) -> QuickSearch {
        QuickSearch::new(QuickSearchConfig::default(), labeled(labels))
    }

    fn limited(labels: &[&str], limit: usize) -> QuickSearch {
        let config = QuickSearchConfig {
            limit,
            ..QuickSearchConfig::default()
        };
        QuickSearch::new(config, labeled(labels))
    }

    fn type_query(search: &mut QuickSearch, query: &str) {
        for ch in query.chars() {
            search.handle_key(&KeyPress::char(ch));
        }
    }

    fn labels(items: &[&Item]) -> Vec<String> {
        items.iter().map(|item| item.label.clone()).collect()
    }

    #[test]
    fn test_filter_keeps_original_order() {
        let mut s = search(&["save", "send", "exit"]);
        type_query(&mut s, "se");
        assert_eq!(labels(&s.filtered()), ["save", "send"]);
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let s = search(&["b", "a", "c"]);
        assert_eq!(labels(&s.filtered()), ["b", "a", "c"]);
    }

    #[test]
    fn test_case_folding() {
        let mut s = search(&["Save", "exit"]);
        type_query(&mut s, "SA");
        assert_eq!(labels(&s.filtered()), ["Save"]);

        let config = QuickSearchConfig {
            case_sensitive: true,
            force_matching_query: false,
            ..QuickSearchConfig::default()
        };
        let mut s = QuickSearch::new(config, labeled(&["Save", "exit"]));
        type_query(&mut s, "sa");
        assert!(s.filtered().is_empty());
    }

    #[test]
    fn test_select_down_scrolls_window() {
        let mut s = limited(&["a1", "a2", "a3", "a4", "a5"], 2);
        s.window = WindowIndices { selection: 1, start: 0 };
        s.select_down();
        assert_eq!(s.window(), WindowIndices { selection: 2, start: 1 });
    }

    #[test]
    fn test_select_up_wraps_to_last_window() {
        let mut s = limited(&["a1", "a2", "a3", "a4", "a5"], 2);
        s.select_up();
        assert_eq!(s.window(), WindowIndices { selection: 4, start: 3 });
    }

    #[test]
    fn test_select_down_wraps_to_top() {
        let mut s = limited(&["a1", "a2", "a3", "a4", "a5"], 2);
        s.window = WindowIndices { selection: 4, start: 3 };
        s.select_down();
        assert_eq!(s.window(), WindowIndices::default());
    }

    #[test]
    fn test_select_up_scrolls_window_back() {
        let mut s = limited(&["a1", "a2", "a3", "a4", "a5"], 2);
        s.window = WindowIndices { selection: 3, start: 2 };
        s.select_up();
        assert_eq!(s.window(), WindowIndices { selection: 2, start: 1 });
    }

    #[test]
    fn test_unlimited_navigation_keeps_start() {
        let mut s = search(&["a", "b", "c"]);
        s.select_down();
        s.select_down();
        assert_eq!(s.window(), WindowIndices { selection: 2, start: 0 });
        s.select_down();
        assert_eq!(s.window(), WindowIndices::default());
        s.select_up();
        assert_eq!(s.window(), WindowIndices { selection: 2, start: 0 });
    }

    #[test]
    fn test_tab_and_shift_tab_navigate() {
        let mut s = search(&["a", "b", "c"]);
        s.handle_key(&KeyPress::named(KeyName::Tab));
        assert_eq!(s.window().selection, 1);
        s.handle_key(&KeyPress::named(KeyName::Tab).with_shift());
        s.handle_key(&KeyPress::named(KeyName::Tab).with_shift());
        assert_eq!(s.window().selection, 2);
    }

    #[test]
    fn test_rejected_keystroke_changes_nothing() {
        let mut s = search(&["save", "send"]);
        s.select_down();
        let before = s.window();
        assert_eq!(s.handle_key(&KeyPress::char('z')), SearchAction::Rejected);
        assert_eq!(s.query(), "");
        assert_eq!(s.window(), before);
    }

    #[test]
    fn test_unforced_query_may_match_nothing() {
        let config = QuickSearchConfig {
            force_matching_query: false,
            ..QuickSearchConfig::default()
        };
        let mut s = QuickSearch::new(config, labeled(&["save"]));
        assert_eq!(s.handle_key(&KeyPress::char('z')), SearchAction::QueryChanged);
        assert_eq!(s.handle_key(&KeyPress::named(KeyName::Return)), SearchAction::Select(Item::sentinel()));
    }

    #[test]
    fn test_query_change_resets_window() {
        let mut s = search(&["save", "send", "exit"]);
        s.select_down();
        s.select_down();
        type_query(&mut s, "e");
        assert_eq!(s.window(), WindowIndices::default());
    }

    #[test]
    fn test_clear_query_chars() {
        let mut s = search(&["save", "send", "exit"]);
        type_query(&mut s, "sav");
        assert_eq!(s.handle_key(&KeyPress::ctrl('u')), SearchAction::QueryChanged);
        assert_eq!(s.query(), "");
        type_query(&mut s, "ex");
        s.handle_key(&KeyPress::ctrl('w'));
        assert_eq!(s.query(), "");
    }

    #[test]
    fn test_backspace_drops_last_char() {
        let mut s = search(&["save", "send"]);
        type_query(&mut s, "sa");
        s.handle_key(&KeyPress::named(KeyName::Backspace));
        assert_eq!(s.query(), "s");
        s.handle_key(&KeyPress::named(KeyName::Backspace));
        assert_eq!(
            s.handle_key(&KeyPress::named(KeyName::Backspace)),
            SearchAction::Ignored
        );
    }

    #[test]
    fn test_return_selects_item() {
        let mut s = QuickSearch::new(
            QuickSearchConfig::default(),
            vec![Item::new("save", 1), Item::new("exit", 2)],
        );
        s.select_down();
        match s.handle_key(&KeyPress::named(KeyName::Return)) {
            SearchAction::Select(item) => assert_eq!(item.value, ItemValue::Number(2.0)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_return_on_empty_list_selects_sentinel() {
        let mut s = search(&[]);
        assert_eq!(
            s.handle_key(&KeyPress::named(KeyName::Return)),
            SearchAction::Select(Item::sentinel())
        );
    }

    #[test]
    fn test_escape_sequences_are_ignored() {
        let mut s = search(&["a", "b"]);
        assert_eq!(
            s.handle_key(&KeyPress::named(KeyName::F(1))),
            SearchAction::Ignored
        );
        assert_eq!(s.query(), "");
    }

    #[test]
    fn test_unfocused_ignores_keys() {
        let mut s = search(&["a", "b"]);
        s.set_focus(false);
        assert_eq!(s.handle_key(&KeyPress::named(KeyName::Down)), SearchAction::Ignored);
        assert_eq!(s.window(), WindowIndices::default());
    }

    #[test]
    fn test_set_items_resets_only_on_structural_change() {
        let mut s = search(&["save", "send"]);
        type_query(&mut s, "se");
        s.select_down();

        assert!(!s.set_items(labeled(&["save", "send"])));
        assert_eq!(s.query(), "se");
        assert_eq!(s.window().selection, 1);

        assert!(s.set_items(labeled(&["save", "exit"])));
        assert_eq!(s.query(), "");
        assert_eq!(s.window(), WindowIndices::default());
    }

    #[test]
    fn test_view_splits_labels() {
        let mut s = search(&["Ubuntu", "Debian"]);
        type_query(&mut s, "bu");
        let view = s.view();
        assert_eq!(view.rows.len(), 1);
        let row = &view.rows[0];
        assert_eq!((row.pre.as_str(), row.matched.as_str(), row.post.as_str()), ("U", "bu", "ntu"));
        assert!(row.selected);
        assert_eq!(row.label(), "Ubuntu");
        assert_eq!(view.footer, None);
    }

    #[test]
    fn test_view_footer_only_when_limited() {
        let mut s = limited(&["a1", "a2", "a3", "a4", "a5"], 2);
        let view = s.view();
        assert_eq!(view.rows.len(), 2);
        assert_eq!(
            view.footer.as_deref(),
            Some("Viewing 0-2 of 5 matching items (5 items overall)")
        );

        type_query(&mut s, "a1");
        assert_eq!(s.view().footer, None);
    }

    #[test]
    fn test_render_marks_selected_row() {
        let mut s = search(&["save", "send"]);
        type_query(&mut s, "se");
        let text: Vec<String> = s.render("/").iter().map(Line::text).collect();
        assert_eq!(text, ["/se", "> save", "  send"]);
    }

    #[test]
    fn test_render_no_matches() {
        let s = search(&[]);
        let text: Vec<String> = s.render("/").iter().map(Line::text).collect();
        assert_eq!(text, ["/", "No matches"]);
    }

    #[test]
    fn test_match_index_counts_chars() {
        let s = search(&[]);
        assert_eq!(s.match_index("héllo", "LL"), Some(2));
        assert_eq!(s.match_index("abc", ""), Some(0));
        assert_eq!(s.match_index("ab", "abc"), None);
    }
}
