#[macro_use]
pub mod md;
pub mod git;
pub mod sys;
