//! Pipeline scenario tests driven by in-crate fakes.

mod fakes;
