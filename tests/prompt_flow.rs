//! End-to-end prompt flows: raw terminal bytes in, handler calls and drawn
//! frames out. The session writes into a `Vec<u8>` instead of stdout.

use slashline::{
    CommandAction, Item, Prompt, PromptConfig, PromptEvent, PromptHandler, PromptSession,
    QuickSearchConfig,
};

#[derive(Default)]
struct Chat {
    submitted: Vec<String>,
    changes: Vec<String>,
    commands: Vec<String>,
    outbox: Vec<String>,
}

impl PromptHandler for Chat {
    fn on_change(&mut self, value: &str) {
        self.changes.push(value.to_string());
    }

    fn on_submit(&mut self, value: &str) {
        self.submitted.push(value.to_string());
        self.outbox.push(format!("user: {value}"));
    }

    fn on_command(&mut self, item: &Item) -> CommandAction {
        self.commands.push(item.label.clone());
        match item.label.as_str() {
            "save" => {
                self.outbox.push("conversation saved".to_string());
                CommandAction::Clear
            }
            "exit" => CommandAction::Exit,
            _ => CommandAction::Insert,
        }
    }

    fn drain_messages(&mut self) -> Vec<String> {
        std::mem::take(&mut self.outbox)
    }
}

fn commands() -> Vec<Item> {
    vec![
        Item::labeled("save"),
        Item::new("example", "Hi there! How are you doing?"),
        Item::new("intuition", "Help me build my intuition about "),
        Item::labeled("exit"),
    ]
}

fn setup(limit: usize) -> (PromptSession<Vec<u8>>, Prompt, Chat) {
    let config = PromptConfig {
        commands: commands(),
        quick_search: QuickSearchConfig {
            limit,
            ..QuickSearchConfig::default()
        },
        ..PromptConfig::default()
    };
    (
        PromptSession::with_writer(Vec::new()),
        Prompt::new(config),
        Chat::default(),
    )
}

fn output(session: &PromptSession<Vec<u8>>) -> String {
    String::from_utf8_lossy(session.renderer().writer()).into_owned()
}

#[test]
fn chat_line_is_submitted_and_echoed() {
    let (mut session, mut prompt, mut chat) = setup(0);

    let events = session.feed(&mut prompt, &mut chat, b"hello world\r");
    assert_eq!(
        events.last(),
        Some(&PromptEvent::Submitted("hello world".to_string()))
    );
    assert_eq!(chat.submitted, ["hello world"]);
    assert_eq!(chat.changes.last().map(String::as_str), Some("hello world"));
    assert_eq!(prompt.value(), "");

    session.redraw(&prompt, &mut chat).unwrap();
    assert!(output(&session).contains("user: hello world"));
}

#[test]
fn example_command_fills_buffer_for_editing() {
    let (mut session, mut prompt, mut chat) = setup(0);

    session.feed(&mut prompt, &mut chat, b"/ex");
    assert!(prompt.is_quick_search());
    assert_eq!(prompt.search().query(), "ex");
    // "example" and "exit" both match; the first is selected.
    let events = session.feed(&mut prompt, &mut chat, b"\r");
    assert_eq!(events, [PromptEvent::Command(commands()[1].clone())]);

    assert!(!prompt.is_quick_search());
    assert_eq!(prompt.value(), "Hi there! How are you doing?");
    assert_eq!(
        prompt.editor().cursor_offset(),
        "Hi there! How are you doing?".chars().count()
    );

    // Keep editing the inserted text, then send it.
    session.feed(&mut prompt, &mut chat, b"\x7f\x7f\x7f\x7f\x7f\x7fgoing?\r");
    assert_eq!(chat.submitted, ["Hi there! How are you going?"]);
}

#[test]
fn arrow_keys_pick_the_next_match() {
    let (mut session, mut prompt, mut chat) = setup(0);

    session.feed(&mut prompt, &mut chat, b"/ex\x1b[B\r");
    assert_eq!(chat.commands, ["exit"]);
}

#[test]
fn exit_command_ends_dispatch() {
    let (mut session, mut prompt, mut chat) = setup(0);

    let events = session.feed(&mut prompt, &mut chat, b"/exi\rtrailing");
    assert_eq!(events, [PromptEvent::Exit]);
    assert_eq!(chat.commands, ["exit"]);
    assert!(chat.submitted.is_empty());
}

#[test]
fn save_command_clears_and_reports() {
    let (mut session, mut prompt, mut chat) = setup(0);

    session.feed(&mut prompt, &mut chat, b"/sa\r");
    assert_eq!(prompt.value(), "");
    assert!(!prompt.is_quick_search());

    session.redraw(&prompt, &mut chat).unwrap();
    let out = output(&session);
    assert!(out.contains("conversation saved"));
}

#[test]
fn non_matching_keystrokes_are_swallowed() {
    let (mut session, mut prompt, mut chat) = setup(0);

    session.feed(&mut prompt, &mut chat, b"/sxqa");
    assert_eq!(prompt.search().query(), "sa");
    assert_eq!(prompt.value(), "/");
}

#[test]
fn escape_leaves_quick_search() {
    let (mut session, mut prompt, mut chat) = setup(0);

    session.feed(&mut prompt, &mut chat, b"/in\x1b");
    let events = session.flush_pending(&mut prompt, &mut chat);
    assert_eq!(events, [PromptEvent::Changed]);
    assert_eq!(prompt.value(), "");
    assert_eq!(prompt.search().query(), "");

    session.feed(&mut prompt, &mut chat, b"ok\r");
    assert_eq!(chat.submitted, ["ok"]);
}

#[test]
fn limited_list_draws_footer() {
    let (mut session, mut prompt, mut chat) = setup(2);

    session.feed(&mut prompt, &mut chat, b"/");
    session.redraw(&prompt, &mut chat).unwrap();
    let out = output(&session);
    assert!(out.contains("Viewing 0-2 of 4 matching items (4 items overall)"));
    assert!(out.contains("save"));
    assert!(!out.contains("intuition"));
    // Prompt line, two rows and the footer.
    assert_eq!(session.renderer().previous_height(), 4);
}

#[test]
fn redraw_replaces_previous_frame() {
    let (mut session, mut prompt, mut chat) = setup(0);

    session.feed(&mut prompt, &mut chat, b"/");
    session.redraw(&prompt, &mut chat).unwrap();
    let tall = session.renderer().previous_height();
    assert!(tall > 1);

    session.feed(&mut prompt, &mut chat, b"\x1b");
    session.flush_pending(&mut prompt, &mut chat);
    session.redraw(&prompt, &mut chat).unwrap();
    assert_eq!(session.renderer().previous_height(), 1);
    let out = output(&session);
    // Moved back up over the old frame before drawing the new one.
    assert!(out.contains(&format!("\x1b[{}A", tall - 1)));
}
