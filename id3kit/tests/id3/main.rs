#![allow(missing_docs)]

mod read;
mod recovery;
pub(crate) mod util;
mod write;
