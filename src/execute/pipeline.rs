use std::convert::Infallible;

use nix::{sys::{signal::killpg, wait::waitpid}, unistd::execvp};

use crate::{builtin::is_builtin, jobs::{JobBuilder, JobState}, pipeline::{Pipeline, Stage}, prelude::*, signal, terminal};

use super::{builtin::exec_builtin, redir::{self, PipeChain}};

/// Forks one process per stage into a single new process group and records it as a job.
///
/// A foreground pipeline is waited on until it stops or finishes; a background one is
/// acknowledged with `[<id>] <pgid>` and left running. Returns the new job id.
pub fn launch(shell: &mut Shell, pipeline: &Pipeline, command: &str) -> JcshResult<usize> {
	let background = pipeline.is_background();
	let chain = PipeChain::new(pipeline.len())?;
	let mut pgid: Option<Pid> = None;
	let mut pids: Vec<Pid> = vec![];

	for (i,stage) in pipeline.stages().iter().enumerate() {
		// Anything still buffered would otherwise be written twice
		let _ = io::stdout().flush();
		let _ = io::stderr().flush();

		match unsafe { fork() } {
			Ok(ForkResult::Child) => {
				exec_stage(shell, stage, i, chain, pgid, background)
			}
			Ok(ForkResult::Parent { child }) => {
				let group = *pgid.get_or_insert(child);
				// Same call as in the child; whichever runs first wins
				if let Err(e) = setpgid(child, group) {
					trace!("setpgid({}, {}) from parent: {}", child, group, e);
				}
				trace!("stage {} `{}` is pid {}", i, stage.name().unwrap_or_default(), child);
				pids.push(child);
			}
			Err(errno) => {
				abort_partial(pgid, &pids);
				return Err(JcshErr::Sys { op: "fork", errno })
			}
		}
	}
	drop(chain);

	// The stage loop ran at least once, so the group exists
	let Some(pgid) = pgid else {
		return Err(JcshErr::usage("empty pipeline"))
	};
	let job = JobBuilder::new()
		.with_pgid(pgid)
		.with_members(pids)
		.with_command(command)
		.with_state(JobState::Running)
		.build();
	let id = shell.jobs_mut().insert(job);

	if background {
		let mut stdout = io::stdout();
		writeln!(stdout, "[{}] {}", id, pgid)?;
		stdout.flush()?;
	} else {
		let stopped = shell.wait_fg(pgid)?;
		debug!("foreground job [{}] returned, stopped={}", id, stopped);
	}
	Ok(id)
}

/// Runs in the forked child and never returns
fn exec_stage(shell: &mut Shell, stage: &Stage, i: usize, chain: PipeChain, pgid: Option<Pid>, background: bool) -> ! {
	let group = pgid.unwrap_or(Pid::from_raw(0));
	if let Err(e) = setpgid(Pid::from_raw(0), group) {
		trace!("setpgid from child: {}", e);
	}
	if !background && shell.job_control() {
		// Races with the parent doing the same; both name the same group
		let _ = terminal::tcsetpgrp(shell.term().fd(), getpgrp());
	}

	if let Err(e) = chain.wire(i) {
		eprintln!("jcsh: {}",e);
		std::process::exit(1)
	}
	if let Err(e) = redir::apply_file_redirs(stage) {
		eprintln!("jcsh: {}",e);
		std::process::exit(1)
	}

	let Some(name) = stage.name() else {
		std::process::exit(0)
	};

	if is_builtin(name) {
		if let Err(e) = exec_builtin(stage.argv(), shell) {
			if !e.is_clean_exit() {
				eprintln!("jcsh: {}",e);
			}
		}
		let _ = io::stdout().flush();
		std::process::exit(0)
	}

	if let Err(e) = signal::reset_job_signals() {
		eprintln!("jcsh: {}",e);
	}
	let e = match exec_external(stage.argv()) {
		Ok(never) => match never {},
		Err(e) => e,
	};
	eprintln!("jcsh: {}: {}",name,e);
	let code = match e {
		JcshErr::Sys { errno: Errno::ENOENT, .. } => 127,
		_ => 126,
	};
	std::process::exit(code)
}

fn exec_external(argv: &[String]) -> JcshResult<Infallible> {
	let argv = argv.iter()
		.map(|arg| CString::new(arg.as_str()))
		.collect::<Result<Vec<_>,_>>()
		.map_err(|_| JcshErr::usage("argument contains a nul byte"))?;
	execvp(&argv[0], &argv).map_err(JcshErr::sys("exec"))
}

/// A fork failed partway through: kill and reap what was already started so no
/// untracked group is left behind
fn abort_partial(pgid: Option<Pid>, pids: &[Pid]) {
	let Some(pgid) = pgid else {
		return
	};
	warn!("killing partial pipeline pgid {} ({} processes)", pgid, pids.len());
	if let Err(e) = killpg(pgid, Signal::SIGKILL) {
		warn!("could not kill pgid {}: {}", pgid, e);
	}
	for pid in pids {
		let _ = waitpid(*pid, None);
	}
}
