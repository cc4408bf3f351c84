//! Reading and writing compatibility table files.

pub mod prior_table;
pub mod writer;

pub use prior_table::{load, load_file, load_reader, LoadedTable};
pub use writer::{serialize, write_atomically, HEADER};
