#![forbid(unsafe_code)]

use log::info;
use log::trace;
use rustc_hash::FxHashMap;
use rustc_hash::FxHashSet;

use crate::Alphabet;
use crate::Automaton;
use crate::BuildError;
use crate::DfaTable;
use crate::StateLabel;
use crate::StateSet;
use crate::Symbol;
use crate::is_epsilon;
use crate::parse_marked_label;

/// A validated, immutable deterministic finite automaton.
///
/// The transition function is partial: a missing entry means the input falls
/// into the implicit dead state and can no longer be accepted. Use
/// [DfaBuilder] or [Dfa::from_table] to construct one.
#[derive(Debug)]
pub struct Dfa {
    states: StateSet,
    alphabet: Alphabet,
    initial: StateLabel,
    accepting: StateSet,
    transitions: FxHashMap<StateLabel, FxHashMap<Symbol, StateLabel>>,
}

impl Dfa {
    /// Builds a DFA from a transition table. Row keys may carry the `>` and
    /// `*` markers; the alphabet is derived as the union of the row symbols.
    pub fn from_table(table: DfaTable) -> Result<Dfa, BuildError> {
        let mut builder = DfaBuilder::new();
        for (marked_label, row) in table {
            builder.add_row(
                &marked_label,
                row.into_iter().map(|(symbol, target)| (symbol, Some(target))),
            )?;
        }

        builder.build()
    }

    /// Returns the target of the transition from the given state on the given
    /// symbol, or None when the transition is undefined.
    pub fn transition(&self, from: &str, symbol: Symbol) -> Option<&StateLabel> {
        self.transitions.get(from)?.get(&symbol)
    }

    /// Returns a fresh simulator positioned at the initial state.
    pub fn simulator(&self) -> DfaSimulator<'_> {
        DfaSimulator::new(self)
    }
}

impl Automaton for Dfa {
    fn kind(&self) -> &'static str {
        "DFA"
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
        self.transitions.values().map(|row| row.len()).sum()
    }

    fn accepts(&self, input: &str) -> bool {
        let mut simulator = self.simulator();
        for symbol in input.chars() {
            simulator.step(symbol);
        }

        simulator.is_accepted()
    }
}

/// Accumulates states and transitions and finally validates them into a [Dfa].
///
/// Transition targets are declared as states automatically, so every target
/// names a declared state by construction. The last written target per
/// (state, symbol) pair wins.
#[derive(Default)]
pub struct DfaBuilder {
    states: StateSet,
    alphabet: Alphabet,
    initial: Option<StateLabel>,
    accepting: StateSet,
    transitions: FxHashMap<StateLabel, FxHashMap<Symbol, StateLabel>>,

    // The stripped labels of the rows added so far, for duplicate detection.
    rows: FxHashSet<StateLabel>,
}

impl DfaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a state without any transitions.
    pub fn add_state(&mut self, label: &str) {
        self.states.insert(label);
    }

    /// Ensures the symbol is part of the alphabet even when no transition
    /// uses it.
    pub fn require_symbol(&mut self, symbol: Symbol) {
        debug_assert!(!is_epsilon(symbol), "A DFA alphabet cannot contain epsilon");

        self.alphabet.insert(symbol);
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

    /// Adds a transition, declaring both states and extending the alphabet
    /// with the symbol.
    pub fn add_transition(&mut self, from: &str, symbol: Symbol, to: impl Into<StateLabel>) {
        debug_assert!(!is_epsilon(symbol), "A DFA cannot have epsilon transitions");

        let to = to.into();
        self.add_state(from);
        self.add_state(&to);
        self.alphabet.insert(symbol);

        if let Some(previous) = self
            .transitions
            .entry(from.to_string())
            .or_default()
            .insert(symbol, to)
        {
            trace!("Overwrote the transition of ({from}, {symbol}), was {previous}");
        }
    }

    /// Adds one table row: the state's marked label and one optional target
    /// per symbol, where None means the transition is undefined. Returns an
    /// error when a row for the same state was already added.
    pub fn add_row<I>(&mut self, marked_label: &str, entries: I) -> Result<(), BuildError>
    where
        I: IntoIterator<Item = (Symbol, Option<StateLabel>)>,
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

        for (symbol, target) in entries {
            match target {
                Some(target) => self.add_transition(&parsed.label, symbol, target),
                None => self.require_symbol(symbol),
            }
        }

        Ok(())
    }

    /// Validates the accumulated automaton and returns it. Fails iff no
    /// initial state was designated.
    pub fn build(self) -> Result<Dfa, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;

        let dfa = Dfa {
            states: self.states,
            alphabet: self.alphabet,
            initial,
            accepting: self.accepting,
            transitions: self.transitions,
        };

        info!(
            "Built a DFA with {} states and {} transitions",
            dfa.states.len(),
            dfa.num_of_transitions()
        );
        Ok(dfa)
    }
}

/// The position of a [DfaSimulator]: a state, or the implicit dead state
/// after an undefined transition was taken.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DfaPosition {
    State(StateLabel),
    Dead,
}

/// Simulates a borrowed [Dfa] symbol by symbol.
///
/// The simulator owns only its position, so any number of simulators can run
/// over the same automaton. Stepping is total: a symbol without a transition
/// moves to the dead position, and the dead position absorbs every further
/// symbol.
pub struct DfaSimulator<'a> {
    dfa: &'a Dfa,
    position: DfaPosition,
}

impl<'a> DfaSimulator<'a> {
    pub fn new(dfa: &'a Dfa) -> Self {
        Self {
            dfa,
            position: DfaPosition::State(dfa.initial.clone()),
        }
    }

    /// Moves the simulator back to the initial state.
    pub fn reset(&mut self) {
        self.position = DfaPosition::State(self.dfa.initial.clone());
    }

    /// Takes the transition for the given symbol.
    pub fn step(&mut self, symbol: Symbol) {
        if let DfaPosition::State(state) = &self.position {
            self.position = match self.dfa.transition(state, symbol) {
                Some(target) => DfaPosition::State(target.clone()),
                None => DfaPosition::Dead,
            };
        }
    }

    /// Returns true iff the simulator is at an accepting state. The dead
    /// position is never accepting.
    pub fn is_accepted(&self) -> bool {
        match &self.position {
            DfaPosition::State(state) => self.dfa.accepting.contains(state),
            DfaPosition::Dead => false,
        }
    }

    /// Returns the current position.
    pub fn position(&self) -> &DfaPosition {
        &self.position
    }
}
