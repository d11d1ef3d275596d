//! Integration tests for the session state machine.
//!
//! Lines are parsed and resolved the way the transport does, then fed to the
//! session directly. Outbound lines land in an in-memory sink.

mod common;

use std::sync::Arc;

use common::{TestSession, resolve, session_config};
use slirc_client::config::ConfigError;
use slirc_client::session::{Invite, Session, SessionEvent};
use slirc_client::state::{ChannelSnapshot, MessageKind};
use slirc_client::transport::TransportEvent;
use slirc_client::SessionError;

fn last_channel_line(t: &TestSession, channel: &str) -> String {
    t.session
        .channel(channel)
        .and_then(|chan| chan.messages().last().map(|m| m.message.clone()))
        .unwrap_or_default()
}

fn last_session_line(t: &TestSession) -> String {
    t.session.logs().last().map(|m| m.message.clone()).unwrap_or_default()
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_construction_requires_name() {
    let mut config = session_config();
    config.name.clear();
    assert!(matches!(Session::new(config), Err(ConfigError::MissingName)));
}

#[test]
fn test_restores_channels_and_queries_by_kind() {
    let mut config = session_config();
    config.channels = vec![ChannelSnapshot::new("#rust"), ChannelSnapshot::new("#ops")];
    config.queries = vec![ChannelSnapshot::new("alice")];

    let session = Session::new(config).unwrap();
    let names: Vec<_> = session.channels().map(|c| c.name().to_string()).collect();
    assert_eq!(names, vec!["#ops", "#rust"]);

    let alice = session.query("Alice").unwrap();
    assert!(alice.has_user("alice"));
    assert!(alice.has_user("evan"));
}

#[test]
fn test_restored_queries_whois_once_connected() {
    let mut config = session_config();
    config.queries = vec![ChannelSnapshot::new("alice"), ChannelSnapshot::new("bob")];
    let mut t = TestSession::with_config(config);
    assert!(t.written().is_empty());

    t.session.handle_transport_event(TransportEvent::Connected);
    assert_eq!(t.written(), vec!["WHOIS alice", "WHOIS bob"]);
}

// ============================================================================
// Membership
// ============================================================================

#[test]
fn test_own_join_creates_channel_once() {
    let mut t = TestSession::new();
    t.feed(":evan!evan@host JOIN #rust");
    t.feed(":evan!evan@host JOIN :#rust");

    assert!(t.session.channel("#RUST").unwrap().is_joined());
    let added = t
        .events()
        .into_iter()
        .filter(|e| matches!(e, SessionEvent::ChannelAdded { .. }))
        .count();
    assert_eq!(added, 1);
}

#[test]
fn test_other_join_part_and_quit_are_logged() {
    let mut t = TestSession::new();
    t.joined("#rust");

    t.feed(":bob!bob@bob.host JOIN #rust");
    let bob = t.session.channel("#rust").unwrap().user("bob").unwrap();
    assert_eq!(bob.username, "bob");
    assert_eq!(bob.address, "bob.host");
    assert_eq!(last_channel_line(&t, "#rust"), "bob joined #rust");

    t.feed(":bob!bob@bob.host PART #rust :later");
    assert!(!t.session.channel("#rust").unwrap().has_user("bob"));
    assert_eq!(last_channel_line(&t, "#rust"), "bob left #rust (later)");

    t.feed(":carol!c@h JOIN #rust");
    t.feed(":carol!c@h QUIT :Ping timeout");
    assert!(!t.session.channel("#rust").unwrap().has_user("carol"));
    assert_eq!(last_channel_line(&t, "#rust"), "carol quit (Ping timeout)");
}

#[test]
fn test_join_without_event_logging() {
    let mut config = session_config();
    config.settings.log_events = false;
    let mut t = TestSession::with_config(config);
    t.joined("#rust");

    t.feed(":bob!b@h JOIN #rust");
    let chan = t.session.channel("#rust").unwrap();
    assert!(chan.has_user("bob"));
    assert_eq!(chan.messages().len(), 0);
    assert!(t
        .events()
        .contains(&SessionEvent::ChannelUpdated { name: "#rust".into() }));
}

#[test]
fn test_own_part_removes_channel() {
    let mut t = TestSession::new();
    t.joined("#rust");

    t.session.part("#rust");
    assert!(t.session.channel("#rust").is_none());
    let part_message = t.session.settings().part_message.clone();
    assert_eq!(t.written(), vec![format!("PART #rust :{part_message}")]);
    assert!(t
        .events()
        .contains(&SessionEvent::ChannelRemoved { name: "#rust".into() }));
}

#[test]
fn test_kicked_from_channel() {
    let mut t = TestSession::new();
    t.joined("#rust");

    t.feed(":op!o@h KICK #rust evan :bye");
    assert!(t.session.channel("#rust").is_none());
    assert_eq!(last_session_line(&t), "You were kicked from #rust by op (bye)");
}

#[test]
fn test_other_kicked() {
    let mut t = TestSession::new();
    t.joined("#rust");
    t.feed(":bob!b@h JOIN #rust");

    t.feed(":op!o@h KICK #rust bob :spam");
    assert!(!t.session.channel("#rust").unwrap().has_user("bob"));
    assert_eq!(last_channel_line(&t, "#rust"), "op kicked bob (spam)");
}

// ============================================================================
// Rosters
// ============================================================================

#[test]
fn test_names_reply_builds_sorted_roster() {
    let mut t = TestSession::new();
    t.joined("#rust");

    t.feed(":irc.example.net 353 evan = #rust :carol +bob @alice");
    let chan = t.session.channel("#rust").unwrap();
    let names: Vec<_> = chan
        .names()
        .iter()
        .map(|n| format!("{}{}", n.mode, n.name))
        .collect();
    assert_eq!(names, vec!["@alice", "+bob", "carol"]);
    assert_eq!(t.written(), vec!["WHO #rust"]);
}

#[test]
fn test_who_reply_updates_member_and_keeps_color() {
    let mut t = TestSession::new();
    t.joined("#rust");
    t.feed(":irc.example.net 353 evan = #rust :carol");
    let color = t.session.channel("#rust").unwrap().user("carol").unwrap().color.clone();
    let before = t.session.channel("#rust").unwrap().messages().len();

    t.feed(":irc.example.net 352 evan #rust ~Carol carol.host irc.example.net carol H@ :0 Carol Real");
    let chan = t.session.channel("#rust").unwrap();
    let carol = chan.user("carol").unwrap();
    assert_eq!(carol.username, "~carol");
    assert_eq!(carol.address, "carol.host");
    assert_eq!(carol.realname, "Carol Real");
    assert_eq!(carol.mode, "@");
    assert_eq!(carol.color, color);
    assert_eq!(chan.messages().len(), before);
}

#[test]
fn test_who_reply_for_new_member_logs_join() {
    let mut t = TestSession::new();
    t.joined("#rust");

    t.feed(":irc.example.net 352 evan #rust dave dave.host irc.example.net dave G :3 Dave");
    assert!(t.session.channel("#rust").unwrap().has_user("dave"));
    assert_eq!(last_channel_line(&t, "#rust"), "dave joined #rust");
}

#[test]
fn test_rename_member_and_query() {
    let mut t = TestSession::new();
    t.joined("#rust");
    t.feed(":alice!a@h JOIN #rust");
    t.feed(":alice!a@h PRIVMSG evan :psst");
    let color = t.session.channel("#rust").unwrap().user("alice").unwrap().color.clone();

    t.feed(":alice!a@h NICK :alicia");

    let chan = t.session.channel("#rust").unwrap();
    assert!(!chan.has_user("alice"));
    assert_eq!(chan.user("alicia").unwrap().color, color);
    assert_eq!(last_channel_line(&t, "#rust"), "alice is now known as alicia");

    assert!(t.session.query("alice").is_none());
    let query = t.session.query("alicia").unwrap();
    assert_eq!(query.name(), "alicia");
    assert_eq!(query.peer(), "alicia");
    assert!(query.has_user("alicia"));
    assert!(query.messages().any(|m| m.message == "psst"));
}

#[test]
fn test_rename_onto_existing_query_merges_logs() {
    let mut t = TestSession::new();
    t.feed(":alice!a@h PRIVMSG evan :from alice");
    t.feed(":bob!b@h PRIVMSG evan :from bob");
    t.events();

    t.feed(":alice!a@h NICK :bob");

    assert_eq!(t.session.queries().count(), 1);
    assert!(t.session.query("alice").is_none());
    let query = t.session.query("bob").unwrap();
    let texts: Vec<&str> = query.messages().map(|m| m.message.as_str()).collect();
    assert!(texts.contains(&"from bob"));
    assert!(texts.contains(&"from alice"));
    assert_eq!(texts.last(), Some(&"alice is now known as bob"));
    assert!(query.messages().all(|m| m.channel.as_deref() == Some("bob")));
    assert!(t.events().contains(&SessionEvent::QueryRemoved { name: "alice".into() }));
}

#[test]
fn test_rename_onto_existing_member_keeps_one_entry() {
    let mut t = TestSession::new();
    t.joined("#rust");
    t.feed(":irc.example.net 353 evan = #rust :evan alice @bob");
    let bob = t.session.channel("#rust").unwrap().user("bob").unwrap().clone();

    t.feed(":alice!a@h NICK :bob");

    let chan = t.session.channel("#rust").unwrap();
    assert!(!chan.has_user("alice"));
    assert_eq!(chan.user("bob").unwrap().color, bob.color);
    assert_eq!(chan.user("bob").unwrap().mode, "@");
    let names: Vec<&str> = chan.names().iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["bob", "evan"]);
}

#[test]
fn test_own_nick_change() {
    let mut t = TestSession::new();
    t.joined("#rust");

    t.feed(":evan!evan@host NICK :evan2");
    assert_eq!(t.session.nick(), "evan2");
    assert_eq!(t.session.channel("#rust").unwrap().nick(), "evan2");
    assert_eq!(last_channel_line(&t, "#rust"), "You are now known as evan2");
    assert_eq!(last_session_line(&t), "You are now known as evan2");
}

// ============================================================================
// WHOIS
// ============================================================================

#[test]
fn test_whois_sequence_emits_record() {
    let mut t = TestSession::new();

    t.feed(":irc.example.net 311 evan alice ~alice alice.host * :Alice A");
    t.feed(":irc.example.net 319 evan alice :#rust @#ops");
    t.feed(":irc.example.net 312 evan alice irc.example.net :Example server");
    t.feed(":irc.example.net 313 evan alice :is an IRC operator");
    t.feed(":irc.example.net 301 evan alice :gone fishing");
    t.feed(":irc.example.net 317 evan alice 42 1450000000 :seconds idle, signon time");
    assert!(t.session.whois_book().is_pending("alice"));

    t.feed(":irc.example.net 318 evan alice :End of /WHOIS list.");
    assert!(!t.session.whois_book().is_pending("alice"));

    let record = t
        .events()
        .into_iter()
        .find_map(|e| match e {
            SessionEvent::Whois(record) => Some(record),
            _ => None,
        })
        .unwrap();
    assert_eq!(record.nickname, "alice");
    assert_eq!(record.username, "~alice");
    assert_eq!(record.hostname, "alice.host");
    assert_eq!(record.realname, "Alice A");
    assert_eq!(record.channels, vec!["#rust", "@#ops"]);
    assert_eq!(record.server.as_deref(), Some("irc.example.net"));
    assert_eq!(record.away.as_deref(), Some("gone fishing"));
    assert_eq!(record.idle.as_deref(), Some("42"));
    assert!(record.oper);
}

#[test]
fn test_end_of_whois_without_record_is_ignored() {
    let mut t = TestSession::new();
    t.feed(":irc.example.net 301 evan bob :away");
    t.feed(":irc.example.net 318 evan bob :End of /WHOIS list.");
    assert!(!t.events().iter().any(|e| matches!(e, SessionEvent::Whois(_))));
}

// ============================================================================
// Messaging
// ============================================================================

#[test]
fn test_channel_message_and_mention() {
    let mut t = TestSession::new();
    t.joined("#rust");

    t.feed(":bob!b@h PRIVMSG #rust :morning all");
    t.feed(":bob!b@h PRIVMSG #rust :hey Evan, ping");

    let chan = t.session.channel("#rust").unwrap();
    assert_eq!(chan.unread(), 2);
    let last = chan.messages().last().unwrap();
    assert_eq!(last.kind, MessageKind::Message);
    assert_eq!(last.from, "bob");
    assert_eq!(last.hostmask.as_deref(), Some("bob!b@h"));
    assert!(last.mention);

    let events = t.events();
    let mentions = events
        .iter()
        .filter(|e| matches!(e, SessionEvent::Mention { .. }))
        .count();
    assert_eq!(mentions, 1);
}

#[test]
fn test_channel_action() {
    let mut t = TestSession::new();
    t.joined("#rust");

    t.feed(":bob!b@h PRIVMSG #rust :\u{1}ACTION waves\u{1}");
    let last = t.session.channel("#rust").unwrap().messages().last().cloned().unwrap();
    assert_eq!(last.kind, MessageKind::Action);
    assert_eq!(last.message, "waves");
}

#[test]
fn test_private_message_opens_query() {
    let mut t = TestSession::new();

    t.feed(":alice!a@h PRIVMSG evan :hi there");

    let query = t.session.query("alice").unwrap();
    assert_eq!(query.topic(), "Conversation with alice");
    assert!(query.has_user("alice"));
    assert!(query.has_user("evan"));
    let last = query.messages().last().unwrap();
    assert_eq!(last.message, "hi there");
    assert!(last.mention);
    assert_eq!(query.unread(), 1);
    assert_eq!(t.written(), vec!["WHOIS alice"]);

    let events = t.events();
    assert!(events.contains(&SessionEvent::QueryAdded { name: "alice".into() }));
    assert!(events.iter().any(|e| matches!(e, SessionEvent::Mention { channel, .. } if channel == "alice")));

    // A second message reuses the query without another WHOIS.
    t.feed(":alice!a@h PRIVMSG evan :still there?");
    assert!(t.written().is_empty());
    assert_eq!(t.session.queries().count(), 1);
}

#[test]
fn test_message_for_unknown_channel_is_dropped() {
    let mut t = TestSession::new();
    t.feed(":bob!b@h PRIVMSG #elsewhere :hello");
    assert_eq!(t.session.channels().count(), 0);
    assert!(t.events().is_empty());
}

#[test]
fn test_lines_without_origin_touch_no_conversation() {
    let mut t = TestSession::new();

    t.feed("PRIVMSG evan :hello");
    t.feed("JOIN #rust");
    assert_eq!(t.session.queries().count(), 0);
    assert_eq!(t.session.channels().count(), 0);
    assert!(t.written().is_empty());

    t.feed("NOTICE * :*** Looking up your hostname");
    assert_eq!(t.session.queries().count(), 0);
    let logged = t.session.logs().last().unwrap();
    assert_eq!(logged.kind, MessageKind::Notice);
    assert_eq!(logged.from, "irc.example.net");
    assert_eq!(logged.message, "*** Looking up your hostname");
}

#[test]
fn test_nickserv_notice_lands_in_query() {
    let mut t = TestSession::new();

    t.feed(":NickServ!NickServ@services. NOTICE evan :This nickname is registered");

    let query = t.session.query("NickServ").unwrap();
    let last = query.messages().last().unwrap();
    assert_eq!(last.kind, MessageKind::Notice);
    assert_eq!(last.from, "NickServ");
    assert_eq!(last.to, "evan");
    assert_eq!(last.message, "This nickname is registered");

    let logged = t.session.logs().last().unwrap();
    assert_eq!(logged.kind, MessageKind::Notice);
    assert_eq!(logged.from, "NickServ");
}

#[test]
fn test_send_message_and_action() {
    let mut t = TestSession::new();
    t.joined("#rust");

    t.session.send_message("#rust", "hello").unwrap();
    t.session.send_action("#RUST", "waves").unwrap();
    assert_eq!(
        t.written(),
        vec!["PRIVMSG #rust :hello", "PRIVMSG #rust :\u{1}ACTION waves\u{1}"]
    );

    let chan = t.session.channel("#rust").unwrap();
    let logged: Vec<_> = chan.messages().map(|m| (m.kind, m.from.as_str(), m.message.as_str())).collect();
    assert_eq!(
        logged,
        vec![
            (MessageKind::Message, "evan", "hello"),
            (MessageKind::Action, "evan", "waves"),
        ]
    );

    assert!(matches!(
        t.session.send_message("#nowhere", "hi"),
        Err(SessionError::UnknownTarget(_))
    ));
}

#[test]
fn test_channel_log_is_bounded() {
    let mut config = session_config();
    config.settings.message_limit = 3;
    let mut t = TestSession::with_config(config);
    t.joined("#rust");

    for i in 0..5 {
        t.feed(&format!(":bob!b@h PRIVMSG #rust :m{i}"));
    }
    let kept: Vec<_> = t
        .session
        .channel("#rust")
        .unwrap()
        .messages()
        .map(|m| m.message.clone())
        .collect();
    assert_eq!(kept, vec!["m2", "m3", "m4"]);
}

// ============================================================================
// Topic and mode
// ============================================================================

#[test]
fn test_topic_change() {
    let mut t = TestSession::new();
    t.joined("#rust");

    t.feed(":alice!a@h TOPIC #rust :Release day");
    assert_eq!(t.session.channel("#rust").unwrap().topic(), "Release day");
    assert_eq!(last_channel_line(&t, "#rust"), "alice changed the topic to Release day");
    let logged = t.session.logs().last().unwrap();
    assert_eq!(logged.kind, MessageKind::Topic);
    assert_eq!(logged.message, "#rust: alice changed the topic to Release day");
    assert_eq!(t.written(), vec!["MODE #rust"]);

    // Unchanged topic: nothing logged, mode still refreshed.
    let before = t.session.channel("#rust").unwrap().messages().len();
    t.feed(":irc.example.net 332 evan #rust :Release day");
    assert_eq!(t.session.channel("#rust").unwrap().messages().len(), before);
    assert_eq!(t.written(), vec!["MODE #rust"]);
}

#[test]
fn test_topic_reply_and_metadata() {
    let mut t = TestSession::new();
    t.joined("#rust");

    t.feed(":irc.example.net 332 evan #rust :Welcome");
    assert_eq!(last_channel_line(&t, "#rust"), "Topic: Welcome");

    t.feed(":irc.example.net 333 evan #rust alice!a@h 1450000000");
    let chan = t.session.channel("#rust").unwrap();
    assert_eq!(chan.topic_set_by(), "alice");
    assert_eq!(chan.topic_set_at(), "Sun, 13 Dec 2015 09:46:40 GMT");
    assert_eq!(
        last_channel_line(&t, "#rust"),
        "Set by alice on Sun, 13 Dec 2015 09:46:40 GMT"
    );
}

#[test]
fn test_channel_mode_reply() {
    let mut t = TestSession::new();
    t.joined("#rust");

    t.feed(":irc.example.net 324 evan #rust +nt");
    assert_eq!(t.session.channel("#rust").unwrap().mode(), "+nt");
    assert_eq!(last_channel_line(&t, "#rust"), "Mode is +nt");
}

#[test]
fn test_mode_change_updates_roster() {
    let mut t = TestSession::new();
    t.joined("#rust");
    t.feed(":irc.example.net 353 evan = #rust :evan carol");

    t.feed(":op!o@h MODE #rust +o carol");
    let chan = t.session.channel("#rust").unwrap();
    assert_eq!(chan.user("carol").unwrap().mode, "@");
    assert_eq!(chan.names()[0].name, "carol");
    let last = chan.messages().last().unwrap();
    assert_eq!(last.message, "op sets mode +o carol");
    assert!(!last.mention);

    t.events();
    t.feed(":op!o@h MODE #rust +v evan");
    assert_eq!(t.session.channel("#rust").unwrap().user("evan").unwrap().mode, "+");
    assert!(t.events().iter().any(|e| matches!(e, SessionEvent::Mention { .. })));
}

#[test]
fn test_invite_is_passed_through() {
    let mut t = TestSession::new();
    t.feed(":alice!a@h INVITE Evan :#secret");
    assert_eq!(
        t.events(),
        vec![SessionEvent::Invite(Invite {
            hostmask: "alice!a@h".into(),
            from: "alice".into(),
            to: "evan".into(),
            channel: "#secret".into(),
        })]
    );
}

// ============================================================================
// Registration
// ============================================================================

#[test]
fn test_ping_is_answered() {
    let mut t = TestSession::new();
    t.feed("PING :irc.example.net");
    assert_eq!(t.written(), vec!["PONG :irc.example.net"]);
}

#[test]
fn test_welcome_adopts_nick_and_auto_joins() {
    let mut config = session_config();
    config.channels = vec![ChannelSnapshot::new("#rust"), ChannelSnapshot::new("#ops")];
    config.settings.auto_join = true;
    let mut t = TestSession::with_config(config);

    t.feed(":irc.example.net 001 evan_ :Welcome to the network evan_");
    assert_eq!(t.session.nick(), "evan_");
    assert!(t.session.logs().any(|m| m.message == "Welcome to the network evan_"));
    assert_eq!(t.written(), vec!["JOIN #ops", "JOIN #rust"]);
}

#[test]
fn test_motd_and_away_status_are_logged() {
    let mut t = TestSession::new();
    t.feed(":irc.example.net 372 evan :- be excellent");
    let motd = t.session.logs().last().unwrap();
    assert_eq!(motd.kind, MessageKind::Motd);
    assert_eq!(motd.message, "- be excellent");

    t.feed(":irc.example.net 306 evan :You have been marked as being away");
    assert_eq!(last_session_line(&t), "away: You have been marked as being away");
}

// ============================================================================
// Panels and export
// ============================================================================

#[test]
fn test_panels_cycle_channels_then_queries() {
    let mut t = TestSession::new();
    t.joined("#b");
    t.joined("#a");
    t.feed(":zed!z@h PRIVMSG evan :yo");

    assert_eq!(t.session.current_panel().unwrap().name(), "#a");
    assert_eq!(t.session.next_panel().unwrap().name(), "#b");
    assert_eq!(t.session.next_panel().unwrap().name(), "zed");
    assert_eq!(t.session.next_panel().unwrap().name(), "#a");
    assert_eq!(t.session.previous_panel().unwrap().name(), "zed");
}

#[test]
fn test_snapshot_restores_into_new_session() {
    let mut config = session_config();
    config.user.password = Some("hunter2".into());
    let mut t = TestSession::with_config(config);
    t.joined("#rust");
    t.feed(":alice!a@h TOPIC #rust :Release day");
    t.feed(":alice!a@h PRIVMSG evan :hi");

    let snapshot = t.session.snapshot();
    assert!(snapshot.user.password.is_none());
    let json = snapshot.to_json().unwrap();
    assert!(json.contains("\"messages.limit\""));
    assert!(!json.contains("hunter2"));

    let restored = Session::new(snapshot.into_config()).unwrap();
    let chan = restored.channel("#rust").unwrap();
    assert_eq!(chan.topic(), "Release day");
    assert!(!chan.is_joined());
    assert_eq!(chan.messages().len(), t.session.channel("#rust").unwrap().messages().len());
    assert!(restored.query("alice").unwrap().messages().any(|m| m.message == "hi"));
}

#[test]
fn test_close_is_final() {
    let mut t = TestSession::new();
    t.session.close();
    t.session.close();
    assert!(t.session.is_closed());
    assert!(matches!(t.session.connect(), Err(SessionError::Closed)));
}

#[test]
fn test_closed_session_ignores_late_events() {
    let mut t = TestSession::new();
    t.session.close();
    let logged = t.session.logs().count();

    t.session.handle_transport_event(TransportEvent::Connected);
    let join = Arc::new(resolve(":evan!evan@host JOIN #late"));
    t.session.handle_transport_event(TransportEvent::Message(join));
    t.feed(":alice!a@h PRIVMSG evan :still there?");

    assert!(t.session.is_closed());
    assert!(!t.session.is_connected());
    assert!(t.session.channel("#late").is_none());
    assert_eq!(t.session.queries().count(), 0);
    assert_eq!(t.session.logs().count(), logged);
    assert!(t.written().is_empty());
}
