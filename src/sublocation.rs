//! Sub-location scanner
//!
//! Parses the trailing text of the final step — character offset, side
//! bias, spatial range, temporal offset — with a single left-to-right
//! pass over the input.
//!
//! ```text
//! sublocation = (":" digits ["[" assertion "]"]) | ("@" spatial) | ("~" temporal)
//! assertion   = text [";s=" ("a" | "b")]     ; "^" escapes the next char
//! spatial     = number ":" number
//! temporal    = number ["." number]
//! ```
//!
//! A virtual `/` is appended as terminator so whichever state is still
//! active at the end of the input flushes through the same close rule
//! as mid-string.

use tracing::trace;

use crate::types::{SideBias, SpatialRange, SubLocation};

/// Scanner state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Seeking a trigger character
    None,
    /// After `:`, accumulating offset digits
    Offset,
    /// After `@`, accumulating a `from:to` range
    Spatial,
    /// After `~`, accumulating a float
    Temporal,
    /// Inside `[...]` following an offset, accumulating assertion text
    Assertion,
}

/// Scan the trailing text of a step into a [`SubLocation`]
///
/// Unmatched input never fails; fields that were not seen stay unset.
/// The caret is a one-character escape: it is discarded and strips the
/// following character of its trigger meaning, which is how a literal
/// `]` or `^` gets into the bracketed assertion.
pub(crate) fn parse_sub_location(text: &str) -> SubLocation {
    let mut out = SubLocation::default();
    let mut state = State::None;
    let mut prev = State::None;
    let mut buf = String::new();
    let mut escape = false;
    let mut seen_colon = false;

    for cur in text.chars().chain(std::iter::once('/')) {
        if cur == '^' && !escape {
            escape = true;
            continue;
        }

        if state == State::Offset {
            if cur.is_ascii_digit() {
                buf.push(cur);
                escape = false;
                continue;
            }
            // offset closes on the first non-digit; an empty
            // accumulator still records offset 0
            out.offset = Some(buf.parse().unwrap_or(0));
            buf.clear();
            prev = state;
            state = State::None;
        }

        if state == State::Spatial {
            let mut done = false;
            if cur.is_ascii_digit() || cur == '.' || cur == ':' {
                if cur == ':' {
                    if seen_colon {
                        // at most one internal colon
                        done = true;
                    } else {
                        seen_colon = true;
                    }
                }
            } else {
                done = true;
            }
            if !done {
                buf.push(cur);
                escape = false;
                continue;
            }
            prev = state;
            state = State::None;
            if !buf.is_empty() && seen_colon {
                out.spatial = parse_range(&buf);
            }
            buf.clear();
        }

        if state == State::Temporal {
            if cur.is_ascii_digit() || cur == '.' {
                buf.push(cur);
                escape = false;
                continue;
            }
            if !buf.is_empty() {
                out.temporal = parse_float_prefix(&buf);
            }
            prev = state;
            state = State::None;
            buf.clear();
        }

        if state == State::None {
            if !escape && (cur == ':' || cur == '~' || cur == '@') {
                prev = State::None;
                state = match cur {
                    ':' => State::Offset,
                    '~' => State::Temporal,
                    _ => State::Spatial,
                };
                seen_colon = false;
                escape = false;
                continue;
            }

            // a bracket opens an assertion only right after an offset
            if cur == '[' && !escape && prev == State::Offset {
                prev = State::None;
                state = State::Assertion;
                escape = false;
                continue;
            }
        }

        if state == State::Assertion {
            if cur == ']' && !escape {
                prev = state;
                state = State::None;
                let assertion = parse_side_bias(&buf);
                if let Some(location) = &assertion.location {
                    // the location text is not checked against the
                    // resolved node's content
                    trace!(%location, "ignoring text assertion content");
                }
                out.side_bias = assertion.side_bias;
                buf.clear();
            } else {
                buf.push(cur);
            }
            escape = false;
            continue;
        }

        escape = false;
    }

    out
}

/// Assertion text split into its location content and side-bias marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SideBiasAssertion {
    /// Content before the marker; currently a placeholder for a text
    /// assertion check, unused by resolution
    pub(crate) location: Option<String>,
    pub(crate) side_bias: Option<SideBias>,
}

/// Extract a `;s=a` / `;s=b` marker anchored at the end of the text
///
/// Without a marker the whole text becomes the location and no bias is
/// set.
pub(crate) fn parse_side_bias(text: &str) -> SideBiasAssertion {
    let trimmed = text.trim();

    let no_bias = || SideBiasAssertion {
        location: if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        },
        side_bias: None,
    };

    let Some((location, marker)) = trimmed.rsplit_once(";s=") else {
        return no_bias();
    };
    let side_bias = match marker {
        "a" => SideBias::After,
        "b" => SideBias::Before,
        _ => return no_bias(),
    };

    SideBiasAssertion {
        location: if location.is_empty() {
            None
        } else {
            Some(location.to_string())
        },
        side_bias: Some(side_bias),
    }
}

/// Parse a `from:to` spatial range
///
/// Each bound may carry digits and dots, but is truncated at the
/// decimal point when stored; `0.5:0.75` yields `{from: 0, to: 0}`.
/// Anything else (extra colons, stray characters, a bound with no
/// leading digits) yields no range.
pub(crate) fn parse_range(text: &str) -> Option<SpatialRange> {
    let trimmed = text.trim();
    let (from, to) = trimmed.split_once(':')?;
    if from.is_empty() || to.is_empty() {
        return None;
    }
    if !is_decimal(from) || !is_decimal(to) {
        return None;
    }

    Some(SpatialRange {
        from: parse_int_prefix(from)?,
        to: parse_int_prefix(to)?,
    })
}

fn is_decimal(text: &str) -> bool {
    text.chars().all(|c| c.is_ascii_digit() || c == '.')
}

/// Leading digit run as an integer, absent when there is none
fn parse_int_prefix(text: &str) -> Option<u32> {
    let end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    text[..end].parse().ok()
}

/// Longest leading `digits[.digits]` prefix as a float
fn parse_float_prefix(text: &str) -> Option<f64> {
    let mut end = 0;
    let mut seen_dot = false;
    for c in text.chars() {
        if c.is_ascii_digit() {
            end += 1;
        } else if c == '.' && !seen_dot {
            seen_dot = true;
            end += 1;
        } else {
            break;
        }
    }
    text[..end].trim_end_matches('.').parse().ok()
}
