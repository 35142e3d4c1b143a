//! Signal conditioning for control decisions.

pub mod window;
