//! Intent parser: terminal line → surface intent
//!
//! Commands are case-insensitive. Label text is kept verbatim (no trimming)
//! so the coordinator sees exactly what was typed.

use lazy_static::lazy_static;
use regex::Regex;
use crate::types::{CoinMode, Intent, Side};

lazy_static! {
    // mode standard | mode custom (aliases: std, ab)
    static ref RE_MODE: Regex = Regex::new(
        r"(?i)^\s*(?:mode|m)\s+(standard|std|custom|ab)\s*$"
    ).unwrap();

    // label a <text>   (text may be empty, which clears the label)
    static ref RE_LABEL: Regex = Regex::new(
        r"(?i)^\s*label\s+([ab])(?:\s(.*))?$"
    ).unwrap();

    // A: <text>   shorthand for label a <text>
    static ref RE_SIDE_PREFIX: Regex = Regex::new(
        r"(?i)^\s*([ab])\s*:\s?(.*)$"
    ).unwrap();
}

/// Help text listing every command
pub const HELP: &str = "\
commands:
  <enter> | f | flip       flip the coin
  r | reset                clear the displayed result
  mode standard|custom     switch faces (Heads/Tails or A/B)
  label a|b <text>         set a custom label (also: A: <text>)
  h | history              show the last 10 flips
  clear                    clear history
  s | status               show current state
  ? | help                 this help
  q | quit                 exit";

/// Parser for terminal intents
#[derive(Debug, Default)]
pub struct IntentParser;

fn side_of(s: &str) -> Side {
    if s.eq_ignore_ascii_case("a") {
        Side::A
    } else {
        Side::B
    }
}

impl IntentParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse one input line (line terminator already stripped).
    /// Returns `None` for unknown input.
    pub fn parse(&self, line: &str) -> Option<Intent> {
        let line = line.trim_end_matches(['\r', '\n']);

        if let Some(caps) = RE_LABEL.captures(line).or_else(|| RE_SIDE_PREFIX.captures(line)) {
            let side = side_of(&caps[1]);
            let text = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
            return Some(Intent::SetLabel { side, text: text.to_string() });
        }

        if let Some(caps) = RE_MODE.captures(line) {
            let mode = caps[1].parse::<CoinMode>().ok()?;
            return Some(Intent::SetMode { mode });
        }

        let intent = match line.trim().to_ascii_lowercase().as_str() {
            "" | "f" | "flip" | "tap" => Intent::Flip,
            "r" | "reset" => Intent::Reset,
            "h" | "history" => Intent::OpenHistory,
            "clear" | "clear history" => Intent::ClearHistory,
            "s" | "status" => Intent::Status,
            "?" | "help" => Intent::Help,
            "q" | "quit" | "exit" => Intent::Quit,
            _ => return None,
        };
        Some(intent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip_aliases() {
        let p = IntentParser::new();
        for line in ["", "f", "FLIP", "  tap  ", "\n"] {
            assert_eq!(p.parse(line), Some(Intent::Flip), "line {:?}", line);
        }
    }

    #[test]
    fn test_mode() {
        let p = IntentParser::new();
        assert_eq!(p.parse("mode custom"), Some(Intent::SetMode { mode: CoinMode::Custom }));
        assert_eq!(p.parse("M Std"), Some(Intent::SetMode { mode: CoinMode::Standard }));
        assert_eq!(p.parse("mode dice"), None);
    }

    #[test]
    fn test_label_keeps_text_verbatim() {
        let p = IntentParser::new();
        assert_eq!(
            p.parse("label a  Pizza  night "),
            Some(Intent::SetLabel { side: Side::A, text: " Pizza  night ".to_string() })
        );
        assert_eq!(
            p.parse("LABEL B"),
            Some(Intent::SetLabel { side: Side::B, text: String::new() })
        );
    }

    #[test]
    fn test_side_prefix() {
        let p = IntentParser::new();
        assert_eq!(
            p.parse("b: Sushi"),
            Some(Intent::SetLabel { side: Side::B, text: "Sushi".to_string() })
        );
    }

    #[test]
    fn test_other_commands() {
        let p = IntentParser::new();
        assert_eq!(p.parse("reset"), Some(Intent::Reset));
        assert_eq!(p.parse("History"), Some(Intent::OpenHistory));
        assert_eq!(p.parse("clear"), Some(Intent::ClearHistory));
        assert_eq!(p.parse("exit"), Some(Intent::Quit));
        assert_eq!(p.parse("?"), Some(Intent::Help));
        assert_eq!(p.parse("launch rockets"), None);
    }
}
