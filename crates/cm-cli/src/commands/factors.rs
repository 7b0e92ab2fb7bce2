use cm_engine::Calculator;

use crate::cli::GlobalFlags;
use crate::output::output;

/// Handle `cmtr factors`.
pub fn handle(flags: &GlobalFlags) -> anyhow::Result<()> {
    let calculator = Calculator::default();
    output(&calculator.factors().entries(), flags.format)
}
