use crate::{builtin, prelude::*};

pub fn exec_builtin(argv: &[String], shell: &mut Shell) -> JcshResult<()> {
	let name = argv.first().map(|arg| arg.as_str()).unwrap_or_default();
	trace!("builtin `{}`", name);
	match name {
		"cd" => builtin::cd::execute(argv),
		"exit" => builtin::control::exit(),
		"jobs" => builtin::job::jobs(argv, shell, io::stdout()),
		"fg" => builtin::job::continue_job(argv, shell, true),
		"bg" => builtin::job::continue_job(argv, shell, false),
		_ => Err(JcshErr::usage(format!("Have not implemented builtin `{}`",name)))
	}
}
