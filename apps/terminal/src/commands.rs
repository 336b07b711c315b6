//! # Terminal Commands
//!
//! One line of input, one command.
//!
//! ## Command Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Line Commands → Register                             │
//! │                                                                         │
//! │  4901234567894        ─┐                                               │
//! │  scan 4901234567894    ├──► set_input(code) + lookup()                 │
//! │  lookup 4901234567894 ─┘                                               │
//! │  add                  ────► add_staged()                               │
//! │  rm 2                 ────► remove_line(line at position 2)            │
//! │  buy                  ────► checkout()                                 │
//! │  cart                 ────► (redraw only)                              │
//! │  operator E042        ────► set_operator("E042")                       │
//! │  help / quit                                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Anything that is not a keyword is treated as a product code, so a
//! scanner that types the code and presses Enter just works.

use thiserror::Error;

use till_client::{PosBackend, Register};

pub const HELP: &str = "\
Commands:
  <code>            look up a product code (also: scan <code>, lookup <code>)
  add               add the looked-up product to the cart
  rm <n>            remove line n from the cart
  buy               submit the cart as a purchase
  cart              redraw the screen
  operator [code]   set the operator code (empty: backend default)
  help              show this list
  quit              exit";

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Lookup(String),
    Add,
    /// 1-based display position.
    Remove(usize),
    Buy,
    Cart,
    Operator(String),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Usage: rm <line number>")]
    MissingLineNumber,

    #[error("'{0}' is not a line number")]
    InvalidLineNumber(String),

    #[error("There is no line {n} (the cart has {len})")]
    NoSuchLine { n: usize, len: usize },

    #[error("{0}")]
    InvalidOperator(String),

    #[error("'{0}' takes no arguments")]
    UnexpectedArgument(String),
}

/// What the loop should do after a command ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Redraw,
    Help,
    Quit,
}

/// Parses one input line.
pub fn parse(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let keyword = word.to_ascii_lowercase();
    let bare = |command: Command| {
        if rest.is_empty() {
            Ok(command)
        } else {
            Err(CommandError::UnexpectedArgument(keyword.clone()))
        }
    };

    let command = match keyword.as_str() {
        "scan" | "lookup" => Command::Lookup(rest.to_string()),
        "add" => bare(Command::Add)?,
        "rm" | "remove" => {
            if rest.is_empty() {
                return Err(CommandError::MissingLineNumber);
            }
            match rest.parse::<usize>() {
                Ok(n) if n > 0 => Command::Remove(n),
                _ => return Err(CommandError::InvalidLineNumber(rest.to_string())),
            }
        }
        "buy" | "purchase" => bare(Command::Buy)?,
        "cart" => bare(Command::Cart)?,
        "operator" => Command::Operator(rest.to_string()),
        "help" | "?" => bare(Command::Help)?,
        "quit" | "exit" => bare(Command::Quit)?,
        _ => Command::Lookup(line.to_string()),
    };

    Ok(command)
}

/// Runs a command against the register.
pub async fn execute<B: PosBackend>(
    register: &mut Register<B>,
    command: Command,
) -> Result<Step, CommandError> {
    match command {
        Command::Lookup(code) => {
            register.set_input(code);
            register.lookup().await;
        }
        Command::Add => register.add_staged(),
        Command::Remove(n) => {
            let cart = register.session().cart();
            let line = cart.line_at(n - 1).ok_or(CommandError::NoSuchLine {
                n,
                len: cart.len(),
            })?;
            register.remove_line(line);
        }
        Command::Buy => register.checkout().await,
        Command::Cart => {}
        Command::Operator(code) => register
            .set_operator(code)
            .map_err(|e| CommandError::InvalidOperator(e.to_string()))?,
        Command::Help => return Ok(Step::Help),
        Command::Quit => return Ok(Step::Quit),
    }
    Ok(Step::Redraw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use till_core::{CheckoutError, CheckoutRequest, LookupError, Money, Product, Receipt};

    /// Knows one product and accepts every checkout.
    struct OneProductBackend;

    #[async_trait]
    impl PosBackend for OneProductBackend {
        async fn lookup(&self, code: &str) -> Result<Product, LookupError> {
            if code == "4901234567894" {
                Ok(Product {
                    id: 1,
                    name: "Tea".into(),
                    code: code.into(),
                    price: Money::from_amount(150),
                })
            } else {
                Err(LookupError::NotFound)
            }
        }

        async fn checkout(&self, request: &CheckoutRequest) -> Result<Receipt, CheckoutError> {
            let total = request.items.iter().map(|p| p.price).sum();
            Ok(Receipt::new(total, request.items.len()))
        }
    }

    #[test]
    fn test_parse_keywords() {
        assert_eq!(parse("add"), Ok(Command::Add));
        assert_eq!(parse("  BUY "), Ok(Command::Buy));
        assert_eq!(parse("cart"), Ok(Command::Cart));
        assert_eq!(parse("rm 2"), Ok(Command::Remove(2)));
        assert_eq!(parse("operator E042"), Ok(Command::Operator("E042".into())));
        assert_eq!(parse("operator"), Ok(Command::Operator(String::new())));
        assert_eq!(parse("quit"), Ok(Command::Quit));
        assert_eq!(parse("help"), Ok(Command::Help));
    }

    #[test]
    fn test_parse_codes() {
        assert_eq!(
            parse("4901234567894"),
            Ok(Command::Lookup("4901234567894".into()))
        );
        assert_eq!(
            parse("scan 4901234567894"),
            Ok(Command::Lookup("4901234567894".into()))
        );
        assert_eq!(parse("lookup"), Ok(Command::Lookup(String::new())));
        assert_eq!(parse(""), Ok(Command::Lookup(String::new())));
    }

    #[test]
    fn test_parse_bad_line_numbers() {
        assert_eq!(parse("rm"), Err(CommandError::MissingLineNumber));
        assert_eq!(
            parse("rm 0"),
            Err(CommandError::InvalidLineNumber("0".into()))
        );
        assert_eq!(
            parse("rm two"),
            Err(CommandError::InvalidLineNumber("two".into()))
        );
    }

    #[test]
    fn test_parse_keyword_with_stray_argument() {
        assert_eq!(
            parse("add 3"),
            Err(CommandError::UnexpectedArgument("add".into()))
        );
        assert_eq!(
            parse("Cart x"),
            Err(CommandError::UnexpectedArgument("cart".into()))
        );
        assert_eq!(
            parse("buy now"),
            Err(CommandError::UnexpectedArgument("buy".into()))
        );
    }

    #[tokio::test]
    async fn test_execute_scan_add_buy() {
        let mut register = Register::new(OneProductBackend, "");

        assert_eq!(
            execute(&mut register, Command::Lookup("4901234567894".into())).await,
            Ok(Step::Redraw)
        );
        execute(&mut register, Command::Add).await.unwrap();
        assert_eq!(register.session().cart().len(), 1);

        execute(&mut register, Command::Buy).await.unwrap();
        assert!(register.session().cart().is_empty());
        assert_eq!(
            register.session().last_receipt().unwrap().total.amount(),
            150
        );
    }

    #[tokio::test]
    async fn test_execute_remove_uses_display_position() {
        let mut register = Register::new(OneProductBackend, "");
        for _ in 0..2 {
            execute(&mut register, Command::Lookup("4901234567894".into()))
                .await
                .unwrap();
            execute(&mut register, Command::Add).await.unwrap();
        }

        assert_eq!(
            execute(&mut register, Command::Remove(3)).await,
            Err(CommandError::NoSuchLine { n: 3, len: 2 })
        );

        let second = register.session().cart().line_at(1).unwrap();
        execute(&mut register, Command::Remove(1)).await.unwrap();
        assert_eq!(register.session().cart().line_at(0), Some(second));
    }

    #[tokio::test]
    async fn test_execute_rejects_bad_operator() {
        let mut register = Register::new(OneProductBackend, "");
        let err = execute(&mut register, Command::Operator("E 042".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::InvalidOperator(_)));
        assert_eq!(register.session().operator_code(), "");
    }
}
