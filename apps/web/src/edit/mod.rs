// Edit model: the working copy of a résumé, its update commands, and debounced commits.

pub mod command;
pub mod debounce;
pub mod model;

pub use command::EditCommand;
pub use model::{EditError, EditModel};
