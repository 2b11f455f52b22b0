use crate::{jobs::{JobCmdFlags, JobState}, prelude::*};

pub fn jobs(argv: &[String], shell: &mut Shell, mut stdout: impl Write) -> JcshResult<()> {
	let mut flags = JobCmdFlags::empty();
	for arg in argv.iter().skip(1) {
		let mut chars = arg.chars().peekable();
		if chars.peek() != Some(&'-') {
			return Err(JcshErr::usage(format!("Invalid flag in `jobs' call: {}",arg)))
		}

		chars.next(); // Ignore the hyphen
		for ch in chars {
			let flag = match ch {
				'p' => JobCmdFlags::PIDS,
				'r' => JobCmdFlags::RUNNING,
				's' => JobCmdFlags::STOPPED,
				_ => return Err(JcshErr::usage(format!("Invalid flag in `jobs' call: -{}",ch)))
			};
			flags |= flag;
		}
	}

	shell.reap();
	let filtered = flags.intersects(JobCmdFlags::RUNNING | JobCmdFlags::STOPPED);
	for job in shell.jobs_mut().list() {
		let shown = !filtered || match job.state() {
			JobState::Running => flags.contains(JobCmdFlags::RUNNING),
			JobState::Stopped => flags.contains(JobCmdFlags::STOPPED),
			JobState::Done => false,
		};
		if shown {
			writeln!(stdout, "{}", job.display(flags))?;
		}
	}
	stdout.flush()?;

	Ok(())
}

/// `fg` and `bg`. Both wake the job's group with SIGCONT; `fg` also hands it the terminal
/// and waits for it to stop or finish.
pub fn continue_job(argv: &[String], shell: &mut Shell, fg: bool) -> JcshResult<()> {
	let cmd = if fg { "fg" } else { "bg" };
	let Some(arg) = argv.get(1) else {
		return Err(JcshErr::usage(format!("Usage: {} <jobid>",cmd)))
	};
	let id = parse_job_id(cmd, arg)?;

	shell.reap();
	let job = shell.jobs().find_by_id(id).cloned().ok_or_else(|| JcshErr::no_such_job(cmd, arg.as_str()))?;
	if !job.is_alive() {
		return Err(JcshErr::usage(format!("{}: job {} has terminated",cmd,id)))
	}
	let pgid = job.pgid();

	if fg {
		if let Err(e) = shell.term_mut().foreground(pgid) {
			warn!("could not foreground pgid {}: {}", pgid, e);
		}
	}
	if let Err(e) = job.killpg(Signal::SIGCONT) {
		if fg {
			shell.term_mut().reclaim()?;
		}
		return Err(e)
	}
	if let Some(job) = shell.jobs_mut().find_by_id_mut(id) {
		job.set_state(JobState::Running);
	}

	if fg {
		shell.wait_group(pgid)?;
	}
	Ok(())
}

/// Accepts `N` and `%N`
fn parse_job_id(cmd: &str, arg: &str) -> JcshResult<usize> {
	let digits = arg.strip_prefix('%').unwrap_or(arg);
	match digits.parse::<usize>() {
		Ok(id) if id > 0 => Ok(id),
		_ => Err(JcshErr::usage(format!("{}: {}: invalid job id",cmd,arg)))
	}
}
