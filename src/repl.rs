//! Line-oriented terminal front-end. Reads state snapshots from a
//! [`ChatSessionHandle`] and only talks back through its methods.

use std::error::Error;
use std::io::Write;
use tokio::io::{ AsyncBufReadExt, BufReader };
use crate::conversation::SendOutcome;
use crate::credential::CredentialError;
use crate::models::chat::{ ChatMessage, ConversationState };
use crate::session::{ ChatSessionHandle, SessionError };
use crate::validator::SUGGESTIONS;

pub const FEATURE_HIGHLIGHTS: [(&str, &str); 4] = [
    ("Trend Analysis", "Identify emerging market trends and patterns to stay ahead of the competition."),
    ("Competitive Research", "Analyze competitors' strengths and weaknesses to find your market advantage."),
    ("Consumer Insights", "Understand customer behavior, preferences, and purchase decisions."),
    ("Growth Opportunities", "Discover untapped market segments and expansion possibilities."),
];

const ERROR_HINT: &str = "Please try asking a question related to market research or analysis.";
const SUGGESTION_DISPLAY_LEN: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Ask(String),
    SetKey(String),
    ClearKey,
    Suggest(usize),
    Help,
    Quit,
    Empty,
    Unknown(String),
}

pub fn parse_command(line: &str) -> ReplCommand {
    let line = line.trim();
    if line.is_empty() {
        return ReplCommand::Empty;
    }
    if !line.starts_with('/') {
        return ReplCommand::Ask(line.to_string());
    }

    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };
    match name {
        "/key" => ReplCommand::SetKey(rest.to_string()),
        "/clear-key" => ReplCommand::ClearKey,
        "/suggest" =>
            match rest.parse::<usize>() {
                Ok(n) if n >= 1 && n <= SUGGESTIONS.len() => ReplCommand::Suggest(n - 1),
                _ => ReplCommand::Unknown(line.to_string()),
            }
        "/help" => ReplCommand::Help,
        "/quit" | "/exit" => ReplCommand::Quit,
        _ => ReplCommand::Unknown(line.to_string()),
    }
}

pub fn truncate_suggestion(text: &str) -> String {
    if text.chars().count() > SUGGESTION_DISPLAY_LEN {
        let head: String = text.chars().take(SUGGESTION_DISPLAY_LEN).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

pub fn render_message(message: &ChatMessage) -> String {
    format!("[{}] {}:\n{}\n", message.timestamp.format("%H:%M"), message.role, message.content)
}

pub fn render_error(error: &str) -> String {
    format!("! {}\n  {}\n", error, ERROR_HINT)
}

pub fn render_intro(state: &ConversationState) -> String {
    let mut out = String::new();
    for message in &state.messages {
        out.push_str(&render_message(message));
    }
    if state.shows_feature_highlights() {
        out.push_str("\nWhat Market Mind Spark can do for you:\n");
        for (title, description) in FEATURE_HIGHLIGHTS {
            out.push_str(&format!("  * {}: {}\n", title, description));
        }
    }
    if state.shows_suggestions() {
        out.push_str("\nTry asking about:\n");
        for (i, suggestion) in SUGGESTIONS.iter().enumerate() {
            out.push_str(&format!("  {}. {}\n", i + 1, truncate_suggestion(suggestion)));
        }
    }
    out
}

fn help_text() -> &'static str {
    "Commands:\n  /key <api key>   save the provider API key\n  /clear-key       forget the saved API key\n  /suggest <n>     ask suggestion number n\n  /help            show this help\n  /quit            leave\nAnything else is sent as a question.\n"
}

async fn ask(session: &ChatSessionHandle, text: &str) -> Result<(), SessionError> {
    match session.send_message(text).await? {
        SendOutcome::Accepted { .. } => {
            println!("Analyzing your market query...");
            let state = session.settled().await?;
            match (&state.error, state.last_message()) {
                (Some(error), _) => print!("{}", render_error(error)),
                (None, Some(message)) => print!("{}", render_message(message)),
                (None, None) => {}
            }
        }
        SendOutcome::Rejected { reason, .. } => print!("{}", render_error(&reason)),
        SendOutcome::CredentialRequired => {
            println!("An API key is required before I can answer. Save one with /key <your key>.");
        }
        SendOutcome::Busy => println!("Still working on the previous question."),
    }
    Ok(())
}

pub async fn run_repl(session: ChatSessionHandle) -> Result<(), Box<dyn Error + Send + Sync>> {
    print!("{}", render_intro(&session.state()));
    println!("\nType /help for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_command(&line) {
            ReplCommand::Empty => {}
            ReplCommand::Ask(text) => ask(&session, &text).await?,
            ReplCommand::Suggest(index) => {
                if let Some(suggestion) = SUGGESTIONS.get(index) {
                    println!("{}", suggestion);
                    ask(&session, suggestion).await?;
                }
            }
            ReplCommand::SetKey(key) =>
                match session.submit_credential(key).await {
                    Ok(()) => println!("API key saved."),
                    Err(SessionError::Credential(CredentialError::Empty)) => {
                        println!("Please enter a valid API key");
                    }
                    Err(e) => println!("Could not save API key: {}", e),
                }
            ReplCommand::ClearKey =>
                match session.clear_credential().await {
                    Ok(()) => println!("API key removed."),
                    Err(e) => println!("Could not remove API key: {}", e),
                }
            ReplCommand::Help => print!("{}", help_text()),
            ReplCommand::Quit => break,
            ReplCommand::Unknown(command) => {
                println!("Unknown command '{}'. Type /help for commands.", command);
            }
        }
    }

    session.shutdown();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Conversation;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("   "), ReplCommand::Empty);
        assert_eq!(parse_command(" market size? "), ReplCommand::Ask("market size?".to_string()));
        assert_eq!(parse_command("/key  abc-123 "), ReplCommand::SetKey("abc-123".to_string()));
        assert_eq!(parse_command("/key"), ReplCommand::SetKey(String::new()));
        assert_eq!(parse_command("/clear-key"), ReplCommand::ClearKey);
        assert_eq!(parse_command("/suggest 1"), ReplCommand::Suggest(0));
        assert_eq!(parse_command("/suggest 6"), ReplCommand::Suggest(5));
        assert_eq!(parse_command("/help"), ReplCommand::Help);
        assert_eq!(parse_command("/exit"), ReplCommand::Quit);
    }

    #[test]
    fn test_parse_rejects_bad_suggestion_numbers() {
        for line in ["/suggest", "/suggest 0", "/suggest 7", "/suggest two"] {
            assert!(matches!(parse_command(line), ReplCommand::Unknown(_)), "{}", line);
        }
        assert_eq!(parse_command("/frobnicate"), ReplCommand::Unknown("/frobnicate".to_string()));
    }

    #[test]
    fn test_truncate_suggestion() {
        assert_eq!(truncate_suggestion("short"), "short");
        let long = "What are the current trends in the smartphone market?";
        let shown = truncate_suggestion(long);
        assert!(shown.ends_with("..."));
        assert_eq!(shown.chars().count(), SUGGESTION_DISPLAY_LEN + 3);
    }

    #[test]
    fn test_intro_shows_cards_and_suggestions_before_first_send() {
        let intro = render_intro(&Conversation::new().snapshot());
        assert!(intro.contains("Market Mind Spark"));
        assert!(intro.contains("Trend Analysis"));
        assert!(intro.contains("Try asking about:"));
        assert!(intro.contains("6. Conduct a SWOT analysis"));
    }

    #[test]
    fn test_intro_hides_extras_after_first_send() {
        let mut conv = Conversation::new();
        conv.send("market trend", true);
        let intro = render_intro(&conv.snapshot());
        assert!(!intro.contains("Try asking about:"));
        assert!(!intro.contains("Trend Analysis:"));
    }

    #[test]
    fn test_render_error_carries_hint() {
        let text = render_error("boom");
        assert!(text.contains("boom"));
        assert!(text.contains(ERROR_HINT));
    }
}
