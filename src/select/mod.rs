// src/select/mod.rs
// =============================================================================
// Operator selection: parsing "1-3, 8" style answers and obtaining them.
//
// Submodules:
// - parse: turns a selection string into validated 1-based IDs
// - prompt: the SelectionProvider trait and where answers come from
// =============================================================================

mod parse;
mod prompt;

pub use parse::parse_selection;
#[cfg(test)]
pub use prompt::CannedSelections;
pub use prompt::{FixedSelection, SelectionProvider, TerminalPrompt};
