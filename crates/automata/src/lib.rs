#![doc = include_str!("../README.md")]

mod alphabet;
mod automaton;
mod dfa;
mod io_csv;
mod nfa;
mod random_automaton;
mod state_set;
mod subset;
mod summary;
mod table;

pub use alphabet::*;
pub use automaton::*;
pub use dfa::*;
pub use io_csv::*;
pub use nfa::*;
pub use random_automaton::*;
pub use state_set::*;
pub use subset::*;
pub use summary::*;
pub use table::*;
