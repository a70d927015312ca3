#![forbid(unsafe_code)]

use log::info;
use rustc_hash::FxHashMap;
use rustc_hash::FxHashSet;

use crate::Alphabet;
use crate::Automaton;
use crate::BuildError;
use crate::EPSILON;
use crate::NfaTable;
use crate::StateLabel;
use crate::StateSet;
use crate::Symbol;
use crate::is_epsilon;
use crate::parse_marked_label;

/// A validated, immutable non-deterministic finite automaton with epsilon
/// moves.
///
/// Transitions map a (state, symbol) pair to a set of targets. The reserved
/// [EPSILON] symbol carries the spontaneous moves; it is a legal transition
/// symbol but never part of the alphabet. Use [NfaBuilder] or
/// [Nfa::from_table] to construct one.
#[derive(Debug)]
pub struct Nfa {
    states: StateSet,
    alphabet: Alphabet,
    initial: StateLabel,
    accepting: StateSet,
    transitions: FxHashMap<StateLabel, FxHashMap<Symbol, StateSet>>,
}

impl Nfa {
    /// Builds an NFA from a transition table. Row keys may carry the `>` and
    /// `*` markers; the alphabet is derived as the union of the row symbols,
    /// excluding epsilon.
    pub fn from_table(table: NfaTable) -> Result<Nfa, BuildError> {
        let mut builder = NfaBuilder::new();
        for (marked_label, row) in table {
            builder.add_row(&marked_label, row)?;
        }

        builder.build()
    }

    /// Returns the targets of the transitions from the given state on the
    /// given symbol, or None when there are none.
    pub fn targets(&self, from: &str, symbol: Symbol) -> Option<&StateSet> {
        self.transitions.get(from)?.get(&symbol)
    }

    /// Returns true iff the automaton has at least one epsilon move.
    pub fn has_epsilon_moves(&self) -> bool {
        self.transitions.values().any(|row| row.contains_key(&EPSILON))
    }

    /// Returns the epsilon closure of the given set: the least superset
    /// closed under epsilon moves. Computed as a worklist fixpoint, so
    /// epsilon chains and cycles of any length are followed.
    pub fn epsilon_closure(&self, set: &StateSet) -> StateSet {
        let mut closure = set.clone();
        let mut worklist: Vec<StateLabel> = set.iter().cloned().collect();

        while let Some(state) = worklist.pop() {
            if let Some(targets) = self.targets(&state, EPSILON) {
                for target in targets.iter() {
                    if closure.insert(target.clone()) {
                        worklist.push(target.clone());
                    }
                }
            }
        }

        closure
    }

    /// Returns a fresh simulator positioned at the epsilon closure of the
    /// initial state.
    pub fn simulator(&self) -> NfaSimulator<'_> {
        NfaSimulator::new(self)
    }
}

impl Automaton for Nfa {
    fn kind(&self) -> &'static str {
        "NFA"
    }

    fn states(&self) -> &StateSet {
        &self.states
    }

    fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    fn initial_state(&self) -> &StateLabel {
        &self.initial
    }

    fn accepting_states(&self) -> &StateSet {
        &self.accepting
    }

    fn num_of_transitions(&self) -> usize {
        self.transitions
            .values()
            .flat_map(|row| row.values())
            .map(|targets| targets.len())
            .sum()
    }

    fn accepts(&self, input: &str) -> bool {
        let mut simulator = self.simulator();
        for symbol in input.chars() {
            simulator.step(symbol);
        }

        simulator.is_accepted()
    }
}

/// Accumulates states and transitions and finally validates them into an
/// [Nfa].
///
/// Transition targets are declared as states automatically, and target sets
/// accumulate: adding the same transition twice has no effect.
#[derive(Default)]
pub struct NfaBuilder {
    states: StateSet,
    alphabet: Alphabet,
    initial: Option<StateLabel>,
    accepting: StateSet,
    transitions: FxHashMap<StateLabel, FxHashMap<Symbol, StateSet>>,

    // The stripped labels of the rows added so far, for duplicate detection.
    rows: FxHashSet<StateLabel>,
}

impl NfaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a state without any transitions.
    pub fn add_state(&mut self, label: &str) {
        self.states.insert(label);
    }

    /// Ensures the symbol is part of the alphabet even when no transition
    /// uses it. Epsilon never enters the alphabet.
    pub fn require_symbol(&mut self, symbol: Symbol) {
        if !is_epsilon(symbol) {
            self.alphabet.insert(symbol);
        }
    }

    /// Designates the initial state, declaring it as a state. A later call
    /// overrides an earlier one.
    pub fn set_initial(&mut self, label: &str) {
        self.add_state(label);
        self.initial = Some(label.to_string());
    }

    /// Marks the given state as accepting, declaring it as a state. Marking a
    /// state twice has no effect.
    pub fn add_accepting(&mut self, label: &str) {
        self.add_state(label);
        self.accepting.insert(label);
    }

    /// Adds a transition, declaring both states. The symbol may be [EPSILON].
    pub fn add_transition(&mut self, from: &str, symbol: Symbol, to: impl Into<StateLabel>) {
        let to = to.into();
        self.add_state(from);
        self.add_state(&to);
        self.require_symbol(symbol);

        self.transitions
            .entry(from.to_string())
            .or_default()
            .entry(symbol)
            .or_default()
            .insert(to);
    }

    /// Adds a spontaneous move that consumes no input.
    pub fn add_epsilon_transition(&mut self, from: &str, to: impl Into<StateLabel>) {
        self.add_transition(from, EPSILON, to);
    }

    /// Adds one table row: the state's marked label and the target list per
    /// symbol. An empty target list still extends the alphabet with the
    /// symbol. Returns an error when a row for the same state was already
    /// added.
    pub fn add_row<I>(&mut self, marked_label: &str, entries: I) -> Result<(), BuildError>
    where
        I: IntoIterator<Item = (Symbol, Vec<StateLabel>)>,
    {
        let parsed = parse_marked_label(marked_label);
        if !self.rows.insert(parsed.label.clone()) {
            return Err(BuildError::DuplicateStateRow { state: parsed.label });
        }

        self.add_state(&parsed.label);
        if parsed.initial {
            self.set_initial(&parsed.label);
        }
        if parsed.accepting {
            self.add_accepting(&parsed.label);
        }

        for (symbol, targets) in entries {
            self.require_symbol(symbol);
            for target in targets {
                self.add_transition(&parsed.label, symbol, target);
            }
        }

        Ok(())
    }

    /// Validates the accumulated automaton and returns it. Fails iff no
    /// initial state was designated.
    pub fn build(self) -> Result<Nfa, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;

        let nfa = Nfa {
            states: self.states,
            alphabet: self.alphabet,
            initial,
            accepting: self.accepting,
            transitions: self.transitions,
        };

        info!(
            "Built an NFA with {} states and {} transitions",
            nfa.states.len(),
            nfa.num_of_transitions()
        );
        Ok(nfa)
    }
}

/// Simulates a borrowed [Nfa] symbol by symbol.
///
/// The cursor is the set of states the automaton can currently be in, kept
/// closed under epsilon moves. The empty set means the input has died; it is
/// absorbing, the NFA counterpart of the DFA dead position.
pub struct NfaSimulator<'a> {
    nfa: &'a Nfa,
    current: StateSet,
}

impl<'a> NfaSimulator<'a> {
    pub fn new(nfa: &'a Nfa) -> Self {
        let mut simulator = Self {
            nfa,
            current: StateSet::new(),
        };
        simulator.reset();
        simulator
    }

    /// Moves the simulator back to the epsilon closure of the initial state.
    pub fn reset(&mut self) {
        self.current = self
            .nfa
            .epsilon_closure(&StateSet::singleton(self.nfa.initial.clone()));
    }

    /// Takes every transition for the given symbol from every current state
    /// and closes the result under epsilon moves. Epsilon itself is not
    /// input.
    pub fn step(&mut self, symbol: Symbol) {
        debug_assert!(!is_epsilon(symbol), "Epsilon is not a valid input symbol");

        let mut successors = StateSet::new();
        for state in self.current.iter() {
            if let Some(targets) = self.nfa.targets(state, symbol) {
                successors.insert_all(targets);
            }
        }

        self.current = self.nfa.epsilon_closure(&successors);
    }

    /// Returns true iff some current state is accepting.
    pub fn is_accepted(&self) -> bool {
        self.current.intersects(&self.nfa.accepting)
    }

    /// Returns the set of states the automaton can currently be in.
    pub fn current_states(&self) -> &StateSet {
        &self.current
    }

    /// Replaces the cursor. The caller provides a set that is already closed
    /// under epsilon moves, [Nfa::epsilon_closure] does that.
    pub fn set_states(&mut self, states: StateSet) {
        self.current = states;
    }
}
