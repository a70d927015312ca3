#![forbid(unsafe_code)]

use rand::Rng;

use crate::Nfa;
use crate::NfaBuilder;
use crate::StateLabel;
use crate::Symbol;

/// Generates a random NFA with the given number of states and symbols, the
/// desired maximum out degree per state, and an epsilon move per state with
/// the given probability.
///
/// States are single base-36 characters and symbols are single digits, so the
/// canonical compound-state names of the subset construction stay
/// unambiguous. State 0 is the initial state; every state is accepting with
/// probability 1/4.
pub fn random_nfa(
    rng: &mut impl Rng,
    num_of_states: usize,
    num_of_symbols: u32,
    outdegree: usize,
    epsilon_probability: f64,
) -> Nfa {
    assert!(
        (1..=36).contains(&num_of_states),
        "Only 1 to 36 states are supported, we use single-character labels."
    );
    assert!(
        (1..=10).contains(&num_of_symbols),
        "Only 1 to 10 symbols are supported, we use digit symbols."
    );

    let labels: Vec<StateLabel> = (0..num_of_states).map(state_label).collect();
    let symbols: Vec<Symbol> = (0..num_of_symbols)
        .map(|index| char::from_digit(index, 10).expect("The index is below 10, so should not panic"))
        .collect();

    let mut builder = NfaBuilder::new();
    builder.set_initial(&labels[0]);
    for &symbol in &symbols {
        builder.require_symbol(symbol);
    }

    for label in &labels {
        builder.add_state(label);
        if rng.random_bool(0.25) {
            builder.add_accepting(label);
        }

        for _ in 0..rng.random_range(0..=outdegree) {
            let symbol = symbols[rng.random_range(0..symbols.len())];
            let to = labels[rng.random_range(0..num_of_states)].as_str();
            builder.add_transition(label, symbol, to);
        }

        if rng.random_bool(epsilon_probability) {
            let to = labels[rng.random_range(0..num_of_states)].as_str();
            builder.add_epsilon_transition(label, to);
        }
    }

    builder
        .build()
        .expect("The generated automaton always has an initial state")
}

/// The label of the state with the given index, a single base-36 character.
fn state_label(index: usize) -> StateLabel {
    char::from_digit(index as u32, 36)
        .expect("Radix is less than 37, so should not panic")
        .to_string()
}
