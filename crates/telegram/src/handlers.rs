use std::sync::Arc;

use {
    teloxide::types::Message,
    tracing::{debug, warn},
};

use relaygram_relay::{LinkMode, OutputSink};

use crate::{outbound::TelegramSink, state::BotState};

const START_TEXT: &str =
    "👋 Send me a message link and I'll relay its media back to you.\nTry /dl <link>, or see /help.";

const HELP_TEXT: &str = "Available commands:\n\
    /dl <link> — relay media from a message link\n\
    /ping — check that I'm alive\n\
    /help — show this help\n\
    \n\
    Or just send a t.me message link directly.";

/// Handle a single inbound message from the polling loop.
///
/// Never returns an error for user mistakes; those end as replies. An
/// `Err` here means the surrounding loop should log and move on.
pub async fn handle_message(msg: Message, state: &Arc<BotState>) -> anyhow::Result<()> {
    let Some(text) = extract_text(&msg) else {
        debug!(chat_id = msg.chat.id.0, "ignoring non-text message");
        return Ok(());
    };

    debug!(
        chat_id = msg.chat.id.0,
        user_id = ?msg.from.as_ref().map(|u| u.id.0),
        text,
        "inbound message"
    );

    let sink = TelegramSink::new(state.bot.clone(), msg.chat.id, Some(msg.id));

    if let Some(command) = parse_command(text, state.bot_username.as_deref()) {
        match command.name {
            "start" => safe_reply(&sink, START_TEXT).await,
            "ping" => safe_reply(&sink, "🏓 Pong!").await,
            "help" => safe_reply(&sink, HELP_TEXT).await,
            "dl" => {
                state
                    .pipeline
                    .relay(command.arg, &sink, LinkMode::Required)
                    .await;
            },
            other => {
                debug!(command = other, "unknown command");
                safe_reply(&sink, "Unknown command. See /help.").await;
            },
        }
        return Ok(());
    }

    // Plain text: treat the whole message as a candidate link. The
    // pipeline answers non-links with the usage hint.
    state.pipeline.relay(text, &sink, LinkMode::Required).await;
    Ok(())
}

/// Message text, falling back to a media caption.
fn extract_text(msg: &Message) -> Option<&str> {
    msg.text().or_else(|| msg.caption())
}

struct Command<'a> {
    name: &'a str,
    arg: &'a str,
}

/// Parse `/name[@bot] [arg…]`. Returns `None` for non-commands and for
/// commands addressed to a different bot.
fn parse_command<'a>(text: &'a str, bot_username: Option<&str>) -> Option<Command<'a>> {
    let rest = text.trim().strip_prefix('/')?;
    if rest.is_empty() {
        return None;
    }

    let (word, arg) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    let (name, target) = word.split_once('@').unwrap_or((word, ""));
    if name.is_empty() {
        return None;
    }
    if !target.is_empty() && bot_username.is_some_and(|u| !u.eq_ignore_ascii_case(target)) {
        return None;
    }

    Some(Command {
        name,
        arg: arg.trim(),
    })
}

/// Reply without crashing the handler when the user blocked the bot or the
/// chat is otherwise unreachable.
async fn safe_reply(sink: &TelegramSink, text: &str) {
    if let Err(e) = sink.send_text(text).await {
        warn!(error = %e, "reply failed");
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_not_a_command() {
        assert!(parse_command("hello there", None).is_none());
        assert!(parse_command("https://t.me/c/1/2", None).is_none());
        assert!(parse_command("/", None).is_none());
    }

    #[test]
    fn command_with_argument() {
        let cmd = parse_command("/dl https://t.me/c/1/2", None).unwrap();
        assert_eq!(cmd.name, "dl");
        assert_eq!(cmd.arg, "https://t.me/c/1/2");
    }

    #[test]
    fn bare_command_has_empty_argument() {
        let cmd = parse_command("  /ping  ", None).unwrap();
        assert_eq!(cmd.name, "ping");
        assert_eq!(cmd.arg, "");
    }

    #[test]
    fn command_addressed_to_this_bot_is_accepted() {
        let cmd = parse_command("/dl@relay_bot link", Some("Relay_Bot")).unwrap();
        assert_eq!(cmd.name, "dl");
        assert_eq!(cmd.arg, "link");
    }

    #[test]
    fn command_addressed_to_another_bot_is_ignored() {
        assert!(parse_command("/dl@other_bot link", Some("relay_bot")).is_none());
    }

    #[test]
    fn command_with_target_but_unknown_own_name_is_accepted() {
        // Without a known username there is nothing to compare against.
        assert!(parse_command("/dl@whoever link", None).is_some());
    }
}
