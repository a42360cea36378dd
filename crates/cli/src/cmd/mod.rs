mod inspect;
mod reorganize;

pub use inspect::cmd_inspect;
pub use reorganize::{Mode, cmd_reorganize};
