//! Command Parsing
//!
//! The verb table is a closed enum: an unrecognized verb is rejected at the
//! parse step with a correction hint, and no network call happens until a
//! command has validated argument shape.

use yieldbot_core::{BotError, Result, RiskPreference};

/// Default and maximum counts for `top_yields`
pub const DEFAULT_TOP_COUNT: usize = 10;
pub const MAX_TOP_COUNT: usize = 50;

/// Every command the bot understands
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    TopYields { count: usize },
    YieldByProtocol { protocol: String },
    YieldByChain { chain: String },
    CompareYields { protocols: Vec<String> },
    RecommendYields { preference: RiskPreference },
    TokenPrice { symbol: String },
    MarketSentiment,
    TokenSentiment { symbol: String },
    TradingSignals { symbol: String },
    YieldEntry { subject: String },
}

/// Verb + description table, used by the help reply
pub const COMMAND_TABLE: &[(&str, &str)] = &[
    ("start", "Welcome message"),
    ("help", "Show available commands"),
    ("top_yields", "Top yield opportunities (e.g. top_yields 10)"),
    ("yield_by_protocol", "Yields for one protocol (e.g. yield_by_protocol aave)"),
    ("yield_by_chain", "Yields on one chain (e.g. yield_by_chain ethereum)"),
    ("compare_yields", "Compare protocols (e.g. compare_yields aave,compound)"),
    ("recommend_yields", "Recommendations by risk preference (stable | balanced | aggressive)"),
    ("token_price", "Current token price (e.g. token_price bitcoin)"),
    ("market_sentiment", "Overall market sentiment"),
    ("token_sentiment", "Sentiment for one token (e.g. token_sentiment ethereum)"),
    ("trading_signals", "Trading signals for one token (e.g. trading_signals bitcoin)"),
    ("yield_entry", "Is now a good time to enter a yield position (e.g. yield_entry ethereum)"),
];

impl Command {
    /// Parse raw command text into a validated command.
    ///
    /// Accepts an optional leading slash; verbs are case-insensitive.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let trimmed = trimmed.strip_prefix('/').unwrap_or(trimmed);
        let mut parts = trimmed.split_whitespace();

        let verb = parts
            .next()
            .ok_or_else(|| {
                BotError::invalid_argument("Empty command", "Send 'help' to list available commands")
            })?
            .to_lowercase();
        let args: Vec<&str> = parts.collect();

        match verb.as_str() {
            "start" => Ok(Self::Start),
            "help" => Ok(Self::Help),
            "top_yields" => parse_top_yields(&args),
            "yield_by_protocol" => {
                let protocol = required_arg(&args, "a protocol name", "yield_by_protocol aave")?;
                Ok(Self::YieldByProtocol { protocol })
            }
            "yield_by_chain" => {
                let chain = required_arg(&args, "a chain name", "yield_by_chain ethereum")?;
                Ok(Self::YieldByChain { chain })
            }
            "compare_yields" => parse_compare(&args),
            "recommend_yields" => parse_recommend(&args),
            "token_price" => {
                let symbol = required_arg(&args, "a token", "token_price bitcoin")?;
                Ok(Self::TokenPrice { symbol })
            }
            "market_sentiment" => Ok(Self::MarketSentiment),
            "token_sentiment" => {
                let symbol = required_arg(&args, "a token", "token_sentiment ethereum")?;
                Ok(Self::TokenSentiment { symbol })
            }
            "trading_signals" => {
                let symbol = required_arg(&args, "a token", "trading_signals bitcoin")?;
                Ok(Self::TradingSignals { symbol })
            }
            "yield_entry" => {
                let subject = required_arg(&args, "a token or protocol", "yield_entry ethereum")?;
                Ok(Self::YieldEntry { subject })
            }
            other => Err(BotError::invalid_argument(
                format!("Unknown command '{other}'"),
                "Send 'help' to list available commands",
            )),
        }
    }
}

/// Names end up in upstream query strings, so only plain identifier
/// characters are accepted
fn valid_name(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn required_arg(args: &[&str], what: &str, example: &str) -> Result<String> {
    match args.first() {
        Some(value) if valid_name(value) => Ok(value.to_lowercase()),
        Some(value) => Err(BotError::invalid_argument(
            format!("'{value}' contains unsupported characters"),
            "Use letters, digits, hyphens and underscores only",
        )),
        None => Err(BotError::invalid_argument(
            format!("Please specify {what}"),
            format!("Example: {example}"),
        )),
    }
}

fn parse_top_yields(args: &[&str]) -> Result<Command> {
    let count = match args.first() {
        None => DEFAULT_TOP_COUNT,
        Some(raw) => {
            let count: usize = raw.parse().map_err(|_| {
                BotError::invalid_argument(
                    format!("Count must be a whole number, got '{raw}'"),
                    "Example: top_yields 10",
                )
            })?;
            if count == 0 || count > MAX_TOP_COUNT {
                return Err(BotError::invalid_argument(
                    format!("Count must be between 1 and {MAX_TOP_COUNT}"),
                    "Example: top_yields 10",
                ));
            }
            count
        }
    };
    Ok(Command::TopYields { count })
}

fn parse_compare(args: &[&str]) -> Result<Command> {
    // Comma-separated list, possibly with spaces after the commas
    let joined = args.join(" ");
    let mut protocols: Vec<String> = Vec::new();
    for part in joined.split(',') {
        let trimmed = part.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !valid_name(trimmed) {
            return Err(BotError::invalid_argument(
                format!("'{trimmed}' contains unsupported characters"),
                "Use letters, digits, hyphens and underscores only",
            ));
        }
        let name = trimmed.to_lowercase();
        if !protocols.contains(&name) {
            protocols.push(name);
        }
    }

    if protocols.len() < 2 {
        return Err(BotError::invalid_argument(
            "Please specify at least two protocols to compare",
            "Example: compare_yields aave,compound",
        ));
    }
    Ok(Command::CompareYields { protocols })
}

fn parse_recommend(args: &[&str]) -> Result<Command> {
    let raw = args.first().copied().unwrap_or("balanced");
    let preference = RiskPreference::parse(raw).ok_or_else(|| {
        BotError::invalid_argument(
            format!("Unknown preference '{raw}'"),
            "Choose one of: stable, balanced, aggressive",
        )
    })?;
    Ok(Command::RecommendYields { preference })
}
