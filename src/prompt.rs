//! Mode routing between free text and quick search.
//!
//! `Prompt` owns the input buffer. While the buffer starts with the
//! trigger character (`/` by default) key presses go to the quick search
//! over the command list; otherwise they go to the line editor. The mode
//! is never stored: it is recomputed from the buffer on every key.
//!
//! The surrounding application hooks in through [`PromptHandler`]. Prompt
//! state is always updated before a handler method runs, so a handler that
//! fails or bails out leaves the prompt consistent.

use crate::config::PromptConfig;
use crate::editor::{EditorAction, LineEditor};
use crate::input::{KeyName, KeyPress};
use crate::render::{Frame, Line, Span, string_width};
use crate::search::{QuickSearch, SearchAction};
use crate::types::Item;

// =============================================================================
// Handler seam
// =============================================================================

/// What to do with the buffer after a command was picked.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CommandAction {
    /// Put the item's value in the buffer.
    #[default]
    Insert,
    Replace(String),
    Clear,
    /// Leave the buffer alone (quick search stays open).
    Keep,
    /// End the session.
    Exit,
}

/// Callbacks from the prompt into the application.
pub trait PromptHandler {
    /// The buffer changed, by typing or by a command.
    fn on_change(&mut self, _value: &str) {}

    /// Return was pressed in free-text mode. The buffer is cleared by the
    /// caller afterwards, not by the prompt.
    fn on_submit(&mut self, value: &str);

    /// An item was picked in quick search.
    fn on_command(&mut self, _item: &Item) -> CommandAction {
        CommandAction::Insert
    }

    /// Lines to print above the prompt before the next redraw.
    fn drain_messages(&mut self) -> Vec<String> {
        Vec::new()
    }
}

/// What a key press did, as seen from outside the prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptEvent {
    None,
    Changed,
    Submitted(String),
    Command(Item),
    Exit,
}

// =============================================================================
// Prompt
// =============================================================================

#[derive(Debug, Clone)]
pub struct Prompt {
    value: String,
    trigger: char,
    glyph: String,
    editor: LineEditor,
    search: QuickSearch,
}

impl Prompt {
    pub fn new(config: PromptConfig) -> Self {
        let mut editor = LineEditor::new();
        editor.set_highlight_pasted_text(config.highlight_pasted_text);
        Self {
            value: String::new(),
            trigger: config.trigger_char(),
            glyph: config.prompt,
            editor,
            search: QuickSearch::new(config.quick_search, config.commands),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn editor(&self) -> &LineEditor {
        &self.editor
    }

    pub fn search(&self) -> &QuickSearch {
        &self.search
    }

    /// Whether key presses currently go to the quick search.
    pub fn is_quick_search(&self) -> bool {
        self.value.starts_with(self.trigger)
    }

    pub fn is_focused(&self) -> bool {
        self.editor.is_focused()
    }

    pub fn set_focus(&mut self, focused: bool) {
        self.editor.set_focus(focused);
        self.search.set_focus(focused);
    }

    /// Replace the command list. Resets the quick search only when the list
    /// actually differs.
    pub fn set_commands(&mut self, commands: Vec<Item>) {
        if self.search.set_items(commands) {
            tracing::debug!(count = self.search.items().len(), "command list replaced");
        }
    }

    /// Overwrite the buffer from outside.
    pub fn set_value(&mut self, value: impl Into<String>) {
        let was_search = self.is_quick_search();
        self.value = value.into();
        self.editor.set_value(&self.value);
        self.sync_mode(was_search);
    }

    /// Route one key press.
    pub fn handle_key(&mut self, key: &KeyPress, handler: &mut impl PromptHandler) -> PromptEvent {
        if key.is_raw_escape() {
            tracing::trace!(sequence = ?key.sequence, "dropped escape sequence");
            return PromptEvent::None;
        }

        if self.is_focused() && is_interrupt(key) {
            tracing::debug!("interrupt");
            return PromptEvent::Exit;
        }

        if self.is_quick_search() {
            self.handle_search_key(key, handler)
        } else {
            self.handle_editor_key(key, handler)
        }
    }

    fn handle_editor_key(&mut self, key: &KeyPress, handler: &mut impl PromptHandler) -> PromptEvent {
        match self.editor.handle_key(&self.value, key) {
            EditorAction::Changed(next) => {
                self.value = next;
                self.sync_mode(false);
                handler.on_change(&self.value);
                PromptEvent::Changed
            }
            EditorAction::Submit(value) => {
                tracing::debug!(len = value.len(), "submitted");
                handler.on_submit(&value);
                PromptEvent::Submitted(value)
            }
            EditorAction::Moved | EditorAction::Ignored => PromptEvent::None,
        }
    }

    fn handle_search_key(&mut self, key: &KeyPress, handler: &mut impl PromptHandler) -> PromptEvent {
        if self.search.is_focused() && key.is(KeyName::Escape) {
            self.set_value("");
            handler.on_change(&self.value);
            return PromptEvent::Changed;
        }

        let SearchAction::Select(item) = self.search.handle_key(key) else {
            return PromptEvent::None;
        };

        tracing::debug!(label = %item.label, "command selected");
        self.search.reset();

        match handler.on_command(&item) {
            CommandAction::Insert => self.replace_buffer(item.value.as_text(), handler),
            CommandAction::Replace(text) => self.replace_buffer(text, handler),
            CommandAction::Clear => self.replace_buffer(String::new(), handler),
            CommandAction::Keep => {}
            CommandAction::Exit => return PromptEvent::Exit,
        }
        PromptEvent::Command(item)
    }

    fn replace_buffer(&mut self, value: String, handler: &mut impl PromptHandler) {
        let changed = value != self.value;
        self.set_value(value);
        if changed {
            handler.on_change(&self.value);
        }
    }

    /// Reset whichever widget the buffer just switched to.
    fn sync_mode(&mut self, was_search: bool) {
        match (was_search, self.is_quick_search()) {
            (false, true) => {
                tracing::debug!("entering quick search");
                self.search.reset();
            }
            (true, false) => {
                tracing::debug!("leaving quick search");
                self.search.reset();
                self.editor.reset(&self.value);
            }
            _ => {}
        }
    }

    /// Project the prompt into drawable lines.
    pub fn frame(&self) -> Frame {
        if self.is_quick_search() {
            let glyph = self.trigger.to_string();
            let indent = " ".repeat(string_width(&self.glyph));
            let lines = self
                .search
                .render(&glyph)
                .into_iter()
                .enumerate()
                .map(|(i, line)| {
                    let lead = if i == 0 { self.glyph.clone() } else { indent.clone() };
                    let mut prefixed = Line::from_spans(vec![Span::raw(lead)]);
                    prefixed.extend(line);
                    prefixed
                })
                .collect();
            return Frame::from_lines(lines);
        }

        let mut line = Line::raw(self.glyph.clone());
        line.extend(self.editor.render(&self.value));
        Frame::from_lines(vec![line])
    }
}

/// Ctrl-C ends the session from either mode.
fn is_interrupt(key: &KeyPress) -> bool {
    key.ctrl && key.name.is_none() && key.input == "c"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ItemValue;

    #[derive(Default)]
    struct Recorder {
        changes: Vec<String>,
        submits: Vec<String>,
        commands: Vec<String>,
        answer: CommandAction,
    }

    impl PromptHandler for Recorder {
        fn on_change(&mut self, value: &str) {
            self.changes.push(value.to_string());
        }

        fn on_submit(&mut self, value: &str) {
            self.submits.push(value.to_string());
        }

        fn on_command(&mut self, item: &Item) -> CommandAction {
            self.commands.push(item.label.clone());
            self.answer.clone()
        }
    }

    fn prompt() -> Prompt {
        let config = PromptConfig {
            commands: vec![
                Item::labeled("save"),
                Item::new("example", "Hi there! How are you doing?"),
                Item::labeled("exit"),
            ],
            ..PromptConfig::default()
        };
        Prompt::new(config)
    }

    fn type_text(prompt: &mut Prompt, handler: &mut Recorder, text: &str) {
        for ch in text.chars() {
            prompt.handle_key(&KeyPress::char(ch), handler);
        }
    }

    fn press(prompt: &mut Prompt, handler: &mut Recorder, name: KeyName) -> PromptEvent {
        prompt.handle_key(&KeyPress::named(name), handler)
    }

    #[test]
    fn test_free_text_submit_leaves_buffer() {
        let mut p = prompt();
        let mut h = Recorder::default();
        type_text(&mut p, &mut h, "hi");
        let event = press(&mut p, &mut h, KeyName::Return);
        assert_eq!(event, PromptEvent::Submitted("hi".to_string()));
        assert_eq!(h.submits, ["hi"]);
        assert_eq!(p.value(), "hi");
        assert_eq!(h.changes, ["h", "hi"]);
    }

    #[test]
    fn test_trigger_switches_mode() {
        let mut p = prompt();
        let mut h = Recorder::default();
        assert!(!p.is_quick_search());
        type_text(&mut p, &mut h, "/");
        assert!(p.is_quick_search());
        assert_eq!(p.value(), "/");

        type_text(&mut p, &mut h, "sa");
        assert_eq!(p.value(), "/");
        assert_eq!(p.search().query(), "sa");
    }

    #[test]
    fn test_trigger_only_counts_at_start() {
        let mut p = prompt();
        let mut h = Recorder::default();
        type_text(&mut p, &mut h, "a/b");
        assert!(!p.is_quick_search());
        assert_eq!(p.value(), "a/b");
    }

    #[test]
    fn test_selection_inserts_value() {
        let mut p = prompt();
        let mut h = Recorder::default();
        type_text(&mut p, &mut h, "/ex");
        press(&mut p, &mut h, KeyName::Return);
        assert_eq!(h.commands, ["example"]);
        assert_eq!(p.value(), "Hi there! How are you doing?");
        assert!(!p.is_quick_search());
        assert_eq!(p.editor().cursor_offset(), p.value().chars().count());
    }

    #[test]
    fn test_intercepted_command_clears() {
        let mut p = prompt();
        let mut h = Recorder {
            answer: CommandAction::Clear,
            ..Recorder::default()
        };
        type_text(&mut p, &mut h, "/sa");
        let event = press(&mut p, &mut h, KeyName::Return);
        assert_eq!(event, PromptEvent::Command(Item::labeled("save")));
        assert_eq!(p.value(), "");
        assert_eq!(h.changes.last().map(String::as_str), Some(""));
    }

    #[test]
    fn test_keep_stays_in_search_with_fresh_query() {
        let mut p = prompt();
        let mut h = Recorder {
            answer: CommandAction::Keep,
            ..Recorder::default()
        };
        type_text(&mut p, &mut h, "/sa");
        press(&mut p, &mut h, KeyName::Return);
        assert!(p.is_quick_search());
        assert_eq!(p.search().query(), "");
    }

    #[test]
    fn test_exit_command() {
        let mut p = prompt();
        let mut h = Recorder {
            answer: CommandAction::Exit,
            ..Recorder::default()
        };
        type_text(&mut p, &mut h, "/exi");
        assert_eq!(press(&mut p, &mut h, KeyName::Return), PromptEvent::Exit);
    }

    #[test]
    fn test_number_value_becomes_text() {
        let config = PromptConfig {
            commands: vec![Item::new("answer", 42)],
            ..PromptConfig::default()
        };
        let mut p = Prompt::new(config);
        let mut h = Recorder::default();
        type_text(&mut p, &mut h, "/");
        press(&mut p, &mut h, KeyName::Return);
        assert_eq!(p.value(), ItemValue::from(42).as_text());
    }

    #[test]
    fn test_escape_leaves_quick_search() {
        let mut p = prompt();
        let mut h = Recorder::default();
        type_text(&mut p, &mut h, "/sa");
        assert_eq!(press(&mut p, &mut h, KeyName::Escape), PromptEvent::Changed);
        assert_eq!(p.value(), "");
        assert!(!p.is_quick_search());
        assert_eq!(p.search().query(), "");
    }

    #[test]
    fn test_ctrl_c_exits_free_text() {
        let mut p = prompt();
        let mut h = Recorder::default();
        assert_eq!(p.handle_key(&KeyPress::ctrl('c'), &mut h), PromptEvent::Exit);
    }

    #[test]
    fn test_ctrl_c_exits_quick_search() {
        let mut p = prompt();
        let mut h = Recorder::default();
        type_text(&mut p, &mut h, "/sa");
        assert!(p.is_quick_search());
        assert_eq!(p.handle_key(&KeyPress::ctrl('c'), &mut h), PromptEvent::Exit);
        assert!(h.commands.is_empty());
        assert_eq!(p.value(), "/");
    }

    #[test]
    fn test_raw_escape_is_dropped() {
        let mut p = prompt();
        let mut h = Recorder::default();
        type_text(&mut p, &mut h, "ab");
        let event = p.handle_key(&KeyPress::named(KeyName::F(2)), &mut h);
        assert_eq!(event, PromptEvent::None);
        assert_eq!(p.value(), "ab");
    }

    #[test]
    fn test_set_value_reenters_editor_at_end() {
        let mut p = prompt();
        let mut h = Recorder::default();
        type_text(&mut p, &mut h, "/");
        p.set_value("hello");
        assert!(!p.is_quick_search());
        assert_eq!(p.editor().cursor_offset(), 5);
    }

    #[test]
    fn test_set_commands_resets_on_change() {
        let mut p = prompt();
        let mut h = Recorder::default();
        type_text(&mut p, &mut h, "/sa");
        let same = p.search().items().to_vec();
        p.set_commands(same);
        assert_eq!(p.search().query(), "sa");
        p.set_commands(vec![Item::labeled("quit")]);
        assert_eq!(p.search().query(), "");
    }

    #[test]
    fn test_frame_free_text() {
        let mut p = prompt();
        let mut h = Recorder::default();
        type_text(&mut p, &mut h, "hi");
        assert_eq!(p.frame().text_lines(), ["> hi "]);
    }

    #[test]
    fn test_frame_quick_search_indents_rows() {
        let mut p = prompt();
        let mut h = Recorder::default();
        type_text(&mut p, &mut h, "/ex");
        assert_eq!(
            p.frame().text_lines(),
            ["> /ex", "  > example", "    exit"]
        );
    }
}
