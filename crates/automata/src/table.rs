#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use thiserror::Error;

use crate::StateLabel;
use crate::Symbol;

/// The marker in front of a state label designating the initial state.
pub const INITIAL_MARKER: char = '>';

/// The marker in front of a state label designating an accepting state.
pub const ACCEPTING_MARKER: char = '*';

/// A DFA transition table: state label (possibly marked) to the targets per
/// symbol. A missing symbol entry means the transition is undefined.
pub type DfaTable = BTreeMap<String, BTreeMap<Symbol, String>>;

/// An NFA transition table: state label (possibly marked) to the target lists
/// per symbol. The epsilon symbol is a legal key.
pub type NfaTable = BTreeMap<String, BTreeMap<Symbol, Vec<String>>>;

/// The errors that can occur while constructing an automaton from a table or
/// from CSV input. Construction is all-or-nothing, simulation itself never
/// fails.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum BuildError {
    #[error("Duplicate row for state '{state}'")]
    DuplicateStateRow { state: StateLabel },

    #[error("No state is marked '>' as the initial state")]
    MissingInitialState,

    #[error("Malformed header: {reason}")]
    MalformedHeader { reason: String },

    #[error("Malformed row '{line}': {reason}")]
    MalformedRow { line: String, reason: String },
}

/// A state label with the markers stripped and turned into explicit flags.
#[derive(Debug, PartialEq, Eq)]
pub struct ParsedLabel {
    pub label: StateLabel,
    pub initial: bool,
    pub accepting: bool,
}

/// Strips the `>` and `*` markers off the front of a state label. The markers
/// may appear in either order and repeat, repetition carries no extra meaning.
pub fn parse_marked_label(marked: &str) -> ParsedLabel {
    let mut initial = false;
    let mut accepting = false;
    let mut rest = marked;

    loop {
        if let Some(stripped) = rest.strip_prefix(INITIAL_MARKER) {
            initial = true;
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix(ACCEPTING_MARKER) {
            accepting = true;
            rest = stripped;
        } else {
            break;
        }
    }

    ParsedLabel {
        label: rest.to_string(),
        initial,
        accepting,
    }
}
