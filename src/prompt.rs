// PROMPT: line-oriented console and the re-prompt-until-valid loop

use crate::error::PromptError;
use crate::types::OrderSide;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::io::Write;
use std::str::FromStr;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// The interactive surface. `read_line` yields `None` once input is exhausted.
#[async_trait]
pub trait Console: Send {
    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>, PromptError>;
    fn say(&mut self, line: &str);
}

pub struct TerminalConsole {
    lines: Lines<BufReader<Stdin>>,
}

impl TerminalConsole {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

impl Default for TerminalConsole {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Console for TerminalConsole {
    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>, PromptError> {
        let mut stdout = std::io::stdout();
        write!(stdout, "{prompt}")?;
        stdout.flush()?;
        Ok(self.lines.next_line().await?)
    }

    fn say(&mut self, line: &str) {
        println!("{line}");
    }
}

/// Replays fixed input lines and records everything written.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    inputs: VecDeque<String>,
    pub prompts: Vec<String>,
    pub output: Vec<String>,
}

impl ScriptedConsole {
    pub fn new<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
            output: Vec::new(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.inputs.len()
    }

    /// Whether any output line contains `needle`.
    pub fn printed(&self, needle: &str) -> bool {
        self.output.iter().any(|line| line.contains(needle))
    }
}

#[async_trait]
impl Console for ScriptedConsole {
    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>, PromptError> {
        self.prompts.push(prompt.to_string());
        Ok(self.inputs.pop_front())
    }

    fn say(&mut self, line: &str) {
        self.output.push(line.to_string());
    }
}

/// Ask until `predicate` accepts the trimmed input, printing `error_text`
/// after every rejection. There is no retry limit; only end of input stops it.
pub async fn prompt_until_valid<C, P>(
    console: &mut C,
    prompt_text: &str,
    predicate: P,
    error_text: &str,
) -> Result<String, PromptError>
where
    C: Console + ?Sized,
    P: Fn(&str) -> bool,
{
    prompt_until_valid_with(console, prompt_text, predicate, |_| error_text.to_string()).await
}

/// Like [`prompt_until_valid`], with the rejection message derived from the input.
pub async fn prompt_until_valid_with<C, P, R>(
    console: &mut C,
    prompt_text: &str,
    predicate: P,
    rejection: R,
) -> Result<String, PromptError>
where
    C: Console + ?Sized,
    P: Fn(&str) -> bool,
    R: Fn(&str) -> String,
{
    loop {
        let line = console
            .read_line(prompt_text)
            .await?
            .ok_or(PromptError::InputClosed)?;
        let value = line.trim();
        if predicate(value) {
            return Ok(value.to_string());
        }
        console.say(&rejection(value));
    }
}

pub fn is_valid_side(value: &str) -> bool {
    OrderSide::parse(value).is_some()
}

pub fn is_positive_decimal(value: &str) -> bool {
    parse_positive_decimal(value).is_some()
}

/// Plain or scientific notation, strictly greater than zero.
pub fn parse_positive_decimal(value: &str) -> Option<Decimal> {
    let value = value.trim();
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .ok()
        .filter(|d| *d > Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn positive_decimal_forms() {
        assert_eq!(parse_positive_decimal("5"), Some(dec!(5)));
        assert_eq!(parse_positive_decimal(" 0.001 "), Some(dec!(0.001)));
        assert_eq!(parse_positive_decimal("1e-3"), Some(dec!(0.001)));
        assert_eq!(parse_positive_decimal("2.5e2"), Some(dec!(250)));
        assert_eq!(parse_positive_decimal("0"), None);
        assert_eq!(parse_positive_decimal("-1"), None);
        assert_eq!(parse_positive_decimal("abc"), None);
        assert_eq!(parse_positive_decimal("NaN"), None);
        assert_eq!(parse_positive_decimal(""), None);
    }

    #[test]
    fn side_predicate_ignores_case() {
        assert!(is_valid_side("buy"));
        assert!(is_valid_side("SELL"));
        assert!(!is_valid_side("hold"));
        assert!(!is_valid_side(""));
    }

    #[tokio::test]
    async fn loops_until_predicate_holds() {
        let mut console = ScriptedConsole::new(["abc", "-1", "5"]);
        let value = prompt_until_valid(
            &mut console,
            "Quantity: ",
            is_positive_decimal,
            "Must be a positive number.",
        )
        .await
        .unwrap();

        assert_eq!(value, "5");
        assert_eq!(console.prompts.len(), 3);
        assert_eq!(
            console.output,
            vec!["Must be a positive number.", "Must be a positive number."]
        );
    }

    #[tokio::test]
    async fn end_of_input_closes_the_prompt() {
        let mut console = ScriptedConsole::new(["nope"]);
        let err = prompt_until_valid(&mut console, "Side: ", is_valid_side, "BUY or SELL")
            .await
            .unwrap_err();
        assert!(matches!(err, PromptError::InputClosed));
        assert!(console.printed("BUY or SELL"));
    }

    #[tokio::test]
    async fn input_is_trimmed() {
        let mut console = ScriptedConsole::new(["  sell  "]);
        let value = prompt_until_valid(&mut console, "Side: ", is_valid_side, "BUY or SELL")
            .await
            .unwrap();
        assert_eq!(value, "sell");
    }
}
