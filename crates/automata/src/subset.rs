#![forbid(unsafe_code)]

use std::collections::VecDeque;

use log::debug;
use log::info;
use rustc_hash::FxHashSet;

use crate::Automaton;
use crate::Dfa;
use crate::DfaBuilder;
use crate::Nfa;
use crate::NfaSimulator;
use crate::StateSet;

/// Converts the NFA into a DFA accepting the same language via the subset
/// construction.
///
/// Every reachable set of NFA states becomes one DFA state, labelled with the
/// canonical name of the set. Compound states are explored breadth-first and
/// processed once each; at most 2^k of them exist for k NFA states, so the
/// construction always terminates. An empty successor set records no
/// transition, those inputs fall into the implicit dead state of the
/// resulting DFA.
pub fn subset_construction(nfa: &Nfa) -> Dfa {
    info!("Converting an NFA with {} states to a DFA...", nfa.states().len());

    let mut builder = DfaBuilder::new();
    let mut simulator = NfaSimulator::new(nfa);

    // The DFA keeps the NFA alphabet even when a symbol never has a
    // successor anywhere.
    for &symbol in nfa.alphabet() {
        builder.require_symbol(symbol);
    }

    // The initial compound state is the closure of the NFA initial state,
    // which the fresh simulator is already positioned at.
    let initial = simulator.current_states().clone();
    let initial_name = initial.canonical_name();
    builder.set_initial(&initial_name);
    if initial.intersects(nfa.accepting_states()) {
        builder.add_accepting(&initial_name);
    }

    let mut discovered: FxHashSet<String> = FxHashSet::default();
    discovered.insert(initial_name);

    let mut queue: VecDeque<StateSet> = VecDeque::new();
    queue.push_back(initial);

    while let Some(current) = queue.pop_front() {
        let current_name = current.canonical_name();

        for &symbol in nfa.alphabet() {
            simulator.set_states(current.clone());
            simulator.step(symbol);
            let successors = simulator.current_states();

            if successors.is_empty() {
                continue;
            }

            let successor_name = successors.canonical_name();
            if discovered.insert(successor_name.clone()) {
                debug!("Discovered the compound state {successors}");

                if successors.intersects(nfa.accepting_states()) {
                    builder.add_accepting(&successor_name);
                }
                queue.push_back(successors.clone());
            }

            builder.add_transition(&current_name, symbol, successor_name);
        }
    }

    let dfa = builder
        .build()
        .expect("The initial compound state is always designated");

    info!(
        "Subset construction produced a DFA with {} states and {} transitions",
        dfa.states().len(),
        dfa.num_of_transitions()
    );
    dfa
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use test_log::test;

    use forma_utilities::random_test;

    use super::*;
    use crate::DfaPosition;
    use crate::NfaBuilder;
    use crate::NfaTable;
    use crate::check_equivalent;
    use crate::random_nfa;

    /// The NFA over {0, 1} accepting the empty string and every string that
    /// ends in 0.
    fn example_nfa() -> Nfa {
        let table = NfaTable::from([
            (
                ">*f".to_string(),
                BTreeMap::from([
                    ('0', vec!["f".to_string(), "n".to_string()]),
                    ('1', vec!["n".to_string()]),
                ]),
            ),
            (
                "n".to_string(),
                BTreeMap::from([('0', vec!["f".to_string()]), ('1', vec!["n".to_string()])]),
            ),
        ]);

        Nfa::from_table(table).unwrap()
    }

    #[test]
    fn test_subset_construction_example() {
        let nfa = example_nfa();
        let dfa = subset_construction(&nfa);

        assert_eq!(dfa.states(), &["f", "fn", "n"].into_iter().collect());
        assert_eq!(dfa.alphabet(), nfa.alphabet());
        assert_eq!(dfa.initial_state(), "f");
        assert_eq!(dfa.accepting_states(), &["f", "fn"].into_iter().collect());

        assert_eq!(dfa.transition("f", '0'), Some(&"fn".to_string()));
        assert_eq!(dfa.transition("f", '1'), Some(&"n".to_string()));
        assert_eq!(dfa.transition("fn", '0'), Some(&"fn".to_string()));
        assert_eq!(dfa.transition("fn", '1'), Some(&"n".to_string()));
        assert_eq!(dfa.transition("n", '0'), Some(&"f".to_string()));
        assert_eq!(dfa.transition("n", '1'), Some(&"n".to_string()));
        assert_eq!(dfa.num_of_transitions(), 6);
    }

    #[test]
    fn test_subset_construction_matches_nfa_step_by_step() {
        let nfa = example_nfa();
        let dfa = subset_construction(&nfa);

        let mut nfa_simulator = nfa.simulator();
        let mut dfa_simulator = dfa.simulator();

        for symbol in "0100101".chars() {
            nfa_simulator.step(symbol);
            dfa_simulator.step(symbol);
            assert_eq!(
                nfa_simulator.is_accepted(),
                dfa_simulator.is_accepted(),
                "the automata must agree after every symbol"
            );
            assert_eq!(
                nfa_simulator.current_states().canonical_name(),
                match dfa_simulator.position() {
                    DfaPosition::State(label) => label.clone(),
                    DfaPosition::Dead => String::new(),
                },
                "the DFA position is the canonical name of the NFA state set"
            );
        }
        assert!(!nfa_simulator.is_accepted());

        nfa_simulator.step('0');
        dfa_simulator.step('0');
        assert!(nfa_simulator.is_accepted());
        assert!(dfa_simulator.is_accepted());
    }

    #[test]
    fn test_subset_construction_with_epsilon_moves() {
        let mut builder = NfaBuilder::new();
        builder.set_initial("a");
        builder.add_epsilon_transition("a", "b");
        builder.add_transition("b", '0', "c");
        builder.add_accepting("c");

        let nfa = builder.build().unwrap();
        let dfa = subset_construction(&nfa);

        // The compound states collapse the epsilon moves away.
        assert_eq!(dfa.states(), &["ab", "c"].into_iter().collect());
        assert_eq!(dfa.initial_state(), "ab");
        assert_eq!(dfa.accepting_states(), &StateSet::singleton("c"));
        assert_eq!(dfa.transition("ab", '0'), Some(&"c".to_string()));

        assert!(dfa.accepts("0"));
        assert!(!dfa.accepts(""));
        assert!(!dfa.accepts("00"));
    }

    #[test]
    fn test_subset_construction_skips_empty_successor_sets() {
        // State a only moves on 0, the 1 column exists but is empty.
        let table = NfaTable::from([(
            ">*a".to_string(),
            BTreeMap::from([('0', vec!["a".to_string()]), ('1', vec![])]),
        )]);

        let nfa = Nfa::from_table(table).unwrap();
        let dfa = subset_construction(&nfa);

        assert_eq!(
            dfa.alphabet(),
            nfa.alphabet(),
            "the alphabet survives even for symbols without successors"
        );
        assert_eq!(dfa.transition("a", '0'), Some(&"a".to_string()));
        assert_eq!(dfa.transition("a", '1'), None, "no empty compound state is materialized");

        assert!(dfa.accepts("00"));
        assert!(!dfa.accepts("01"));
    }

    #[test]
    #[cfg_attr(miri, ignore)] // Too slow with miri
    fn test_subset_construction_random_equivalence() {
        random_test(50, |rng| {
            let nfa = random_nfa(rng, 6, 2, 3, 0.2);
            let dfa = subset_construction(&nfa);

            // The construction can at most produce the power set of the NFA
            // states.
            let bound = 1 << nfa.states().len();
            assert!(dfa.states().len() <= bound);
            assert!(dfa.num_of_transitions() <= bound * dfa.alphabet().len());

            check_equivalent(&nfa, &dfa, 5);
        })
    }
}
