#![forbid(unsafe_code)]

use forma_collections::VecSet;

/// A single input symbol. Multi-character symbols are out of scope.
pub type Symbol = char;

/// The sorted set of input symbols of an automaton, excluding [EPSILON].
pub type Alphabet = VecSet<Symbol>;

/// The reserved symbol for spontaneous NFA moves. It can appear as a
/// transition symbol and as a CSV column, but never as simulation input.
pub const EPSILON: Symbol = 'ε';

/// Returns true iff the given symbol is the reserved epsilon symbol.
pub fn is_epsilon(symbol: Symbol) -> bool {
    symbol == EPSILON
}
