//! Low level helpers shared across the crate

pub(crate) mod alloc;
pub mod io;
pub mod synchsafe;
pub(crate) mod text;
