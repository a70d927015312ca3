#![forbid(unsafe_code)]

use crate::Alphabet;
use crate::StateLabel;
use crate::StateSet;

/// The common read-only surface of the two automaton models.
///
/// Everything here is observational. Models are immutable once built, so a
/// borrow of an automaton can be shared freely between simulators.
pub trait Automaton {
    /// The kind tag of the automaton, as it appears in the CSV header.
    fn kind(&self) -> &'static str;

    /// Returns the set of declared states.
    fn states(&self) -> &StateSet;

    /// Returns the input alphabet. It never contains the epsilon symbol.
    fn alphabet(&self) -> &Alphabet;

    /// Returns the label of the initial state.
    fn initial_state(&self) -> &StateLabel;

    /// Returns the set of accepting states, which may be empty.
    fn accepting_states(&self) -> &StateSet;

    /// Returns the number of transitions in the model.
    fn num_of_transitions(&self) -> usize;

    /// Runs the automaton on the given input from the initial state and
    /// returns true iff it halts in an accepting configuration.
    fn accepts(&self, input: &str) -> bool;
}

/// Enumerates every string over the given alphabet up to the given length,
/// starting with the empty string. For testing purposes.
#[cfg(test)]
pub fn enumerate_strings(alphabet: &Alphabet, max_length: usize) -> Vec<String> {
    use itertools::Itertools;

    use crate::Symbol;

    let symbols: Vec<Symbol> = alphabet.iter().copied().collect();

    let mut result = vec![String::new()];
    for length in 1..=max_length {
        for product in std::iter::repeat_n(symbols.iter().copied(), length).multi_cartesian_product() {
            result.push(product.into_iter().collect());
        }
    }

    result
}

/// Checks that two automata accept exactly the same strings up to the given
/// length over the union of their alphabets, for testing purposes.
#[cfg(test)]
pub fn check_equivalent(left: &impl Automaton, right: &impl Automaton, max_length: usize) {
    let mut alphabet = left.alphabet().clone();
    alphabet.insert_all(right.alphabet());

    for input in enumerate_strings(&alphabet, max_length) {
        assert_eq!(
            left.accepts(&input),
            right.accepts(&input),
            "The automata disagree on input '{input}'"
        );
    }
}
