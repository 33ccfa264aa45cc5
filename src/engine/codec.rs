//! Shareable selection fragments: `topic=<int>&lambda=<real>&term=<string>`.

use std::fmt::Write as _;

use log::warn;
use thiserror::Error;

use super::state::{DEFAULT_LAMBDA, SelectionState};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum FragmentProblem {
    #[error("not a number")]
    NotNumeric,
    #[error("out of range")]
    OutOfRange,
    #[error("unknown field")]
    UnknownField,
    #[error("bad percent-encoding")]
    BadEncoding,
}

/// A fragment field that could not be taken as-is. Decoding recovers from every one of these.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("invalid selection fragment field `{field}` = `{value}`: {problem}")]
pub struct InvalidSelectionFragment {
    pub field: String,
    pub value: String,
    pub problem: FragmentProblem,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DecodedFragment {
    pub state: SelectionState,
    pub issues: Vec<InvalidSelectionFragment>,
}

/// How a new fragment enters the session history.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NavigationMode {
    #[default]
    Replace,
    Push,
}

pub fn encode(state: &SelectionState) -> String {
    format!(
        "topic={}&lambda={}&term={}",
        state.topic,
        state.lambda,
        encode_component(&state.term)
    )
}

/// Decodes a fragment against a model with `topic_count` topics. Bad values are clamped or
/// replaced by defaults and reported in `issues`.
pub fn decode(fragment: &str, topic_count: usize) -> DecodedFragment {
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
    let mut state = SelectionState::default();
    let mut issues = Vec::new();

    for pair in fragment.split('&').filter(|pair| !pair.is_empty()) {
        let (field, value) = pair.split_once('=').unwrap_or((pair, ""));
        let issue = |problem| InvalidSelectionFragment {
            field: field.to_owned(),
            value: value.to_owned(),
            problem,
        };

        match field {
            "topic" => match parse_number(value) {
                Some(number) => {
                    let rounded = number.round();
                    if rounded < 0.0 || rounded > topic_count as f64 {
                        issues.push(issue(FragmentProblem::OutOfRange));
                    }
                    state.topic = rounded.clamp(0.0, topic_count as f64) as usize;
                }
                None => {
                    issues.push(issue(FragmentProblem::NotNumeric));
                    state.topic = 0;
                }
            },
            "lambda" => match parse_number(value) {
                Some(number) => {
                    if !(0.0..=1.0).contains(&number) {
                        issues.push(issue(FragmentProblem::OutOfRange));
                    }
                    state.lambda = number.clamp(0.0, 1.0);
                }
                None => {
                    issues.push(issue(FragmentProblem::NotNumeric));
                    state.lambda = DEFAULT_LAMBDA;
                }
            },
            "term" => match decode_component(value) {
                Some(term) => state.term = term,
                None => {
                    issues.push(issue(FragmentProblem::BadEncoding));
                    state.term = value.to_owned();
                }
            },
            _ => issues.push(issue(FragmentProblem::UnknownField)),
        }
    }

    for issue in &issues {
        warn!("{issue}");
    }

    DecodedFragment { state, issues }
}

fn parse_number(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

fn needs_escape(byte: u8) -> bool {
    matches!(byte, b'&' | b'=' | b'%' | b'#' | b' ' | b'+') || !byte.is_ascii_graphic()
}

pub fn encode_component(raw: &str) -> String {
    let mut encoded = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        if needs_escape(byte) {
            let _ = write!(encoded, "%{byte:02X}");
        } else {
            encoded.push(byte as char);
        }
    }
    encoded
}

pub fn decode_component(encoded: &str) -> Option<String> {
    let bytes = encoded.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut index = 0;
    while index < bytes.len() {
        if bytes[index] == b'%' {
            let hex = encoded.get(index + 1..index + 3)?;
            if !hex.bytes().all(|digit| digit.is_ascii_hexdigit()) {
                return None;
            }
            decoded.push(u8::from_str_radix(hex, 16).ok()?);
            index += 3;
        } else {
            decoded.push(bytes[index]);
            index += 1;
        }
    }
    String::from_utf8(decoded).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(topic: usize, lambda: f64, term: &str) -> SelectionState {
        SelectionState {
            topic,
            lambda,
            term: term.to_owned(),
        }
    }

    #[test]
    fn encodes_all_fields_in_order() {
        assert_eq!(encode(&state(2, 0.6, "bank")), "topic=2&lambda=0.6&term=bank");
        assert_eq!(encode(&SelectionState::default()), "topic=0&lambda=1&term=");
    }

    #[test]
    fn reachable_states_survive_a_round_trip() {
        let states = [
            SelectionState::default(),
            state(3, 0.0, ""),
            state(1, 0.35, "river"),
            state(2, 0.1 + 0.2, "new york & co"),
            state(2, 1.0, "100%=#done"),
            state(1, 0.5, "café"),
        ];
        for original in states {
            let decoded = decode(&encode(&original), 3);
            assert_eq!(decoded.state, original);
            assert!(decoded.issues.is_empty());
        }
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let decoded = decode("topic=-5&lambda=2&term=x", 3);
        assert_eq!(decoded.state, state(0, 1.0, "x"));

        let problems = decoded
            .issues
            .iter()
            .map(|issue| (issue.field.as_str(), issue.problem))
            .collect::<Vec<_>>();
        assert_eq!(
            problems,
            [
                ("topic", FragmentProblem::OutOfRange),
                ("lambda", FragmentProblem::OutOfRange),
            ]
        );
    }

    #[test]
    fn topic_is_rounded_and_capped() {
        assert_eq!(decode("topic=1.6", 3).state.topic, 2);
        assert_eq!(decode("topic=12", 3).state.topic, 3);
    }

    #[test]
    fn non_numeric_values_fall_back_to_defaults() {
        let decoded = decode("#topic=two&lambda=&term=bank", 3);
        assert_eq!(decoded.state, state(0, 1.0, "bank"));
        assert!(
            decoded
                .issues
                .iter()
                .all(|issue| issue.problem == FragmentProblem::NotNumeric)
        );
        assert_eq!(decoded.issues.len(), 2);
    }

    #[test]
    fn fields_are_order_insensitive_and_optional() {
        assert_eq!(
            decode("term=water&topic=2", 3).state,
            state(2, 1.0, "water")
        );
        assert_eq!(decode("", 3).state, SelectionState::default());
    }

    #[test]
    fn unknown_fields_and_bad_escapes_are_reported() {
        let decoded = decode("topic=1&color=red&term=ba%zz", 3);
        assert_eq!(decoded.state, state(1, 1.0, "ba%zz"));

        let problems = decoded
            .issues
            .iter()
            .map(|issue| issue.problem)
            .collect::<Vec<_>>();
        assert_eq!(
            problems,
            [FragmentProblem::UnknownField, FragmentProblem::BadEncoding]
        );
        assert_eq!(
            decoded.issues[0].to_string(),
            "invalid selection fragment field `color` = `red`: unknown field"
        );
    }

    #[test]
    fn component_escaping() {
        assert_eq!(encode_component("a b&c"), "a%20b%26c");
        assert_eq!(encode_component("é"), "%C3%A9");
        assert_eq!(decode_component("%C3%A9").as_deref(), Some("é"));
        assert_eq!(decode_component("%4"), None);
        assert_eq!(decode_component("%+1"), None);
        assert_eq!(decode_component("%FF"), None);
    }
}
