use crate::{lexer, pipeline, prelude::*};

use super::{builtin, pipeline::launch};

/// Runs one command line.
///
/// A lone foreground builtin without redirections runs inside the shell; everything else
/// is launched as a job.
pub fn exec_input(input: &str, shell: &mut Shell) -> JcshResult<()> {
	let command = input.trim();
	if command.is_empty() {
		return Ok(())
	}
	shell.reap();

	let pipeline = pipeline::parse(lexer::tokenize(command));
	debug!("parsed `{}`: {:?}", command, pipeline);
	if pipeline.is_empty() {
		trace!("nothing to run");
		return Ok(())
	}

	if let Some(stage) = pipeline.as_shell_builtin() {
		return builtin::exec_builtin(stage.argv(), shell)
	}

	launch(shell, &pipeline, command)?;
	Ok(())
}
