//! Path grammar parser
//!
//! Turns a raw identifier string into the [`Identifier`] structure.
//!
//! Grammar:
//! ```text
//! identifier  = "identifier(" body ")"
//! body        = part ("!" part)*
//! part        = ("/" step)+
//! step        = digits? ["[" nodeID "]"] [sublocation]
//! ```
//!
//! `!` and `/` are reserved as separators by the format and never
//! appear escaped, so both levels split on the plain character. Only
//! the outer wrapper is a hard error; malformed steps and empty parts
//! are dropped silently so minor grammar deviations still resolve.

use thiserror::Error;

use crate::sublocation::parse_sub_location;
use crate::types::{Identifier, Part, Step};

/// Identifier parsing errors
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("input is not wrapped in identifier(...)")]
    MalformedIdentifier,
}

/// Parse a raw identifier string
///
/// Fails only when the `identifier(...)` wrapper is missing. An empty
/// body yields an identifier with zero parts.
pub fn parse(input: &str) -> Result<Identifier, ParseError> {
    let input = input.trim();
    let body = input
        .strip_prefix("identifier(")
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or(ParseError::MalformedIdentifier)?;

    let part_strs: Vec<&str> = body.split('!').collect();
    let last = part_strs.len() - 1;

    let mut parts = Vec::new();
    for (i, part_str) in part_strs.iter().enumerate() {
        if let Some(part) = parse_part(part_str, i == last) {
            parts.push(part);
        }
    }

    Ok(Identifier { parts })
}

/// Parse an identifier string, discarding the error on failure
pub fn try_parse(input: &str) -> Option<Identifier> {
    parse(input).ok()
}

impl std::str::FromStr for Identifier {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// Parse one `!`-separated part into its steps
///
/// Returns `None` when the part contributes no steps at all; such
/// parts are omitted from the identifier rather than raised as errors.
fn parse_part(text: &str, is_last_part: bool) -> Option<Part> {
    // the first `/`-segment is always empty since every part starts
    // with a slash
    let step_strs: Vec<&str> = text.split('/').skip(1).collect();
    if step_strs.is_empty() {
        return None;
    }
    let last = step_strs.len() - 1;

    let mut steps = Vec::new();
    for (i, step_str) in step_strs.iter().enumerate() {
        if let Some(step) = parse_step(step_str, is_last_part && i == last) {
            steps.push(step);
        }
    }

    if steps.is_empty() {
        None
    } else {
        Some(Part { steps })
    }
}

/// Parse a single step: `<digits>["[" id "]"][trailing]`
///
/// A step with no leading digits does not match the grammar and yields
/// `None`. An index of zero is equivalent to no index: the step is
/// kept but carries no ordinal constraint, so resolution must reach it
/// through its ID anchor.
fn parse_step(text: &str, is_last_step: bool) -> Option<Step> {
    let digits_end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    if digits_end == 0 {
        return None;
    }

    let node_index = match text[..digits_end].parse::<u32>() {
        Ok(0) | Err(_) => None,
        Ok(n) => Some(n),
    };

    let mut rest = &text[digits_end..];
    let mut node_id = None;
    if let Some(inner) = rest.strip_prefix('[') {
        // the ID may not contain brackets; a nested or unclosed
        // bracket leaves the whole remainder as trailing text
        if let Some(end) = inner.find(|c| c == '[' || c == ']') {
            if inner.as_bytes()[end] == b']' && end > 0 {
                node_id = Some(inner[..end].to_string());
                rest = &inner[end + 1..];
            }
        }
    }

    let mut sub_location = None;
    if is_last_step && !rest.is_empty() {
        let sub = parse_sub_location(rest);
        if !sub.is_empty() {
            sub_location = Some(sub);
        }
    }

    Some(Step {
        node_index,
        node_id,
        sub_location,
    })
}
