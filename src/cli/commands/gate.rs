//! Print the release gate decision without running anything.

use crate::cli::OutputManager;
use crate::config::CiEnvironment;
use crate::gate::{self, GateDecision};

pub(super) fn execute_gate_check(env: &CiEnvironment, output: &OutputManager) {
    match gate::evaluate(env) {
        GateDecision::Eligible { tag } => {
            output.success(&format!("Eligible release build for tag {}", tag));
        }
        GateDecision::Skip(reason) => {
            output.info(&format!("Not a release build: {}", reason));
        }
    }
}
