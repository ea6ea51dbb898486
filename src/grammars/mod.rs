//! Ready-made grammars used by the `rdparse` binary and the test suite.

pub mod arith;
pub mod list;
