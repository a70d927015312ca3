#![forbid(unsafe_code)]

use std::fmt;

use itertools::Itertools;

use crate::Alphabet;
use crate::Automaton;
use crate::Dfa;
use crate::Nfa;
use crate::StateLabel;
use crate::StateSet;

/// A summary of an automaton for diagnostics and logging.
#[derive(Debug, Clone)]
pub struct AutomatonSummary<'a> {
    /// The kind tag, `DFA` or `NFA`.
    pub kind: &'static str,
    pub states: &'a StateSet,
    pub alphabet: &'a Alphabet,
    pub initial_state: &'a StateLabel,
    pub accepting_states: &'a StateSet,
    /// The number of transitions, counting every target of a
    /// non-deterministic entry separately.
    pub num_of_transitions: usize,
}

impl<'a> AutomatonSummary<'a> {
    /// Collects the summary of the given automaton.
    pub fn new(automaton: &'a impl Automaton) -> Self {
        Self {
            kind: automaton.kind(),
            states: automaton.states(),
            alphabet: automaton.alphabet(),
            initial_state: automaton.initial_state(),
            accepting_states: automaton.accepting_states(),
            num_of_transitions: automaton.num_of_transitions(),
        }
    }
}

impl fmt::Display for AutomatonSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Kind: {}", self.kind)?;
        writeln!(f, "Number of states: {}", self.states.len())?;
        writeln!(f, "Alphabet: {{{}}}", self.alphabet.iter().format(", "))?;
        writeln!(f, "Initial state: {}", self.initial_state)?;
        writeln!(f, "Accepting states: {}", self.accepting_states)?;
        write!(f, "Number of transitions: {}", self.num_of_transitions)
    }
}

impl Dfa {
    /// Returns a summary of the DFA for diagnostics.
    pub fn summary(&self) -> AutomatonSummary<'_> {
        AutomatonSummary::new(self)
    }
}

impl Nfa {
    /// Returns a summary of the NFA for diagnostics.
    pub fn summary(&self) -> AutomatonSummary<'_> {
        AutomatonSummary::new(self)
    }
}

impl fmt::Display for Dfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.summary().fmt(f)
    }
}

impl fmt::Display for Nfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.summary().fmt(f)
    }
}
