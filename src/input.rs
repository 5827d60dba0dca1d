use crate::model::Asset;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedCommand {
    SwitchAsset(Asset),
    Analyze,
    Status,
    Help,
    Quit,
}

/// Parse one line typed on stdin. Asset names and aliases switch the feed.
pub fn parse_command(line: &str) -> Option<FeedCommand> {
    let word = line.split_whitespace().next()?.to_ascii_lowercase();
    match word.as_str() {
        "a" | "analyze" | "signal" => Some(FeedCommand::Analyze),
        "s" | "status" => Some(FeedCommand::Status),
        "h" | "help" | "?" => Some(FeedCommand::Help),
        "q" | "quit" | "exit" => Some(FeedCommand::Quit),
        other => other.parse::<Asset>().ok().map(FeedCommand::SwitchAsset),
    }
}

pub const HELP_TEXT: &str =
    "commands: btc | gold | oil (switch asset), analyze, status, help, quit";
