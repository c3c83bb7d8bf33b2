//! Log line parser.
//!
//! Converts one whitespace-separated line of the session log into an
//! `Event`:
//!
//! ```text
//! <time:int> <op:"I"|"E"> <order_id:int> [<price:float>]
//! ```
//!
//! `price` is required for `I`. Tokens after the last required field are
//! ignored.

use std::str::SplitWhitespace;

use crate::command::{Event, Op, OrderId, Price, Timestamp};
use crate::error::{Field, ParseError};

/// Parse one log line.
///
/// Unknown op tokens are reported as `ParseError::UnknownOp`; use
/// `parse_line_lenient` to turn them into `Op::Noop` instead.
pub fn parse_line(line: &str) -> Result<Event, ParseError> {
    let mut tokens = line.split_whitespace();
    let time = parse_time(&mut tokens)?;
    let op = next_token(&mut tokens, Field::Op)?;

    match op {
        "I" => {
            let order_id = parse_order_id(&mut tokens)?;
            let price = parse_price(&mut tokens)?;
            Ok(Event::new(time, Op::insert(order_id, price)))
        }
        "E" => {
            let order_id = parse_order_id(&mut tokens)?;
            Ok(Event::new(time, Op::erase(order_id)))
        }
        other => Err(ParseError::UnknownOp(other.to_string())),
    }
}

/// Parse one log line, mapping unknown ops to `Op::Noop`.
///
/// The time and order id must still parse; the order id is then dropped.
pub fn parse_line_lenient(line: &str) -> Result<Event, ParseError> {
    match parse_line(line) {
        Err(ParseError::UnknownOp(_)) => {
            let mut tokens = line.split_whitespace();
            let time = parse_time(&mut tokens)?;
            next_token(&mut tokens, Field::Op)?;
            parse_order_id(&mut tokens)?;
            Ok(Event::new(time, Op::Noop))
        }
        result => result,
    }
}

fn next_token<'a>(tokens: &mut SplitWhitespace<'a>, field: Field) -> Result<&'a str, ParseError> {
    tokens.next().ok_or(ParseError::MissingField(field))
}

fn parse_time(tokens: &mut SplitWhitespace<'_>) -> Result<Timestamp, ParseError> {
    let token = next_token(tokens, Field::Time)?;
    token.parse().map_err(|_| ParseError::InvalidInt {
        field: Field::Time,
        token: token.to_string(),
    })
}

fn parse_order_id(tokens: &mut SplitWhitespace<'_>) -> Result<OrderId, ParseError> {
    let token = next_token(tokens, Field::OrderId)?;
    token.parse().map_err(|_| ParseError::InvalidInt {
        field: Field::OrderId,
        token: token.to_string(),
    })
}

/// Prices must be finite: `f64::from_str` also accepts `inf` and `NaN`,
/// which would break the ladder's ordering assumptions.
fn parse_price(tokens: &mut SplitWhitespace<'_>) -> Result<Price, ParseError> {
    let token = next_token(tokens, Field::Price)?;
    match token.parse::<Price>() {
        Ok(price) if price.is_finite() => Ok(price),
        _ => Err(ParseError::InvalidPrice(token.to_string())),
    }
}
