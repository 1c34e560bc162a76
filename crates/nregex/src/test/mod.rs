pub mod test_execute;
pub mod test_lookaround;
pub mod test_program;
pub mod test_search;
pub mod test_substitute;
