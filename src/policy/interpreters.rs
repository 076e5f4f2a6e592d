//! Script interpreters.
//!
//! Arbitrary interpreter invocations are opaque, so they get no decision.
//! The one exception is the repo's own gate driver, `test_gate.py`, which
//! only shells back into this binary.

use crate::evaluator::Verdict;
use crate::parse::command_name;

pub fn python(tokens: &[String]) -> Verdict {
    Verdict::allow_if(tokens.len() == 2 && command_name(&tokens[1]) == "test_gate.py")
}
