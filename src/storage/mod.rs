//! Result persistence.

mod result_store;

pub use result_store::{RawRecord, ResultStore};
