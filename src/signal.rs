use std::sync::{atomic::{AtomicBool, Ordering}, Arc};

use nix::sys::{signal::{signal, SigHandler, Signal}, wait::{waitpid, WaitPidFlag, WaitStatus}};

use crate::{jobs::JobTable, prelude::*};

/// Signals the interactive shell ignores for the whole session. SIGTTOU and SIGTTIN
/// would otherwise stop the shell whenever it hands the terminal around.
const SHELL_IGNORED: [Signal; 5] = [
	Signal::SIGTTOU,
	Signal::SIGTTIN,
	Signal::SIGINT,
	Signal::SIGQUIT,
	Signal::SIGTSTP,
];

/// Restored to their default action in every child before exec
const CHILD_RESET: [Signal; 6] = [
	Signal::SIGINT,
	Signal::SIGTSTP,
	Signal::SIGQUIT,
	Signal::SIGTTIN,
	Signal::SIGTTOU,
	Signal::SIGCHLD,
];

pub fn ignore_job_signals() -> JcshResult<()> {
	for sig in SHELL_IGNORED {
		unsafe { signal(sig, SigHandler::SigIgn) }.map_err(JcshErr::sys("signal"))?;
	}
	Ok(())
}

pub fn reset_job_signals() -> JcshResult<()> {
	for sig in CHILD_RESET {
		unsafe { signal(sig, SigHandler::SigDfl) }.map_err(JcshErr::sys("signal"))?;
	}
	Ok(())
}

/// Collects child state changes without ever blocking.
///
/// The SIGCHLD handler installed by `install` only raises a flag. The flag is drained by
/// `reap` at fixed points of the main flow (before each prompt, before each command line,
/// before the job builtins read the table), so the job table only ever has one writer.
/// Between drains the table may lag behind reality.
#[derive(Debug,Clone)]
pub struct Reaper {
	pending: Arc<AtomicBool>,
}

impl Reaper {
	pub fn install() -> JcshResult<Self> {
		let pending = Arc::new(AtomicBool::new(false));
		signal_hook::flag::register(signal_hook::consts::SIGCHLD, Arc::clone(&pending))?;
		debug!("SIGCHLD handler installed");
		Ok(Self { pending })
	}

	/// A reaper with no handler behind it; `reap` only runs after `notify`
	pub fn detached() -> Self {
		Self { pending: Arc::new(AtomicBool::new(false)) }
	}

	/// Marks a notification as pending, as the SIGCHLD handler does
	pub fn notify(&self) {
		self.pending.store(true, Ordering::SeqCst);
	}

	/// Harvests every available child status and applies it to `jobs`.
	/// Returns the ids of the jobs that changed.
	pub fn reap(&self, jobs: &mut JobTable) -> Vec<usize> {
		let mut changed = vec![];
		if !self.pending.swap(false, Ordering::SeqCst) {
			return changed
		}
		let flags = WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED | WaitPidFlag::WCONTINUED;
		loop {
			match waitpid(None, Some(flags)) {
				Ok(WaitStatus::StillAlive) => break, // Nothing more to reap right now
				Ok(status) => {
					if let Some(id) = jobs.apply(status) {
						if !changed.contains(&id) {
							changed.push(id);
						}
					} else {
						trace!("reaped untracked child: {:?}", status);
					}
				}
				Err(Errno::EINTR) => continue,
				Err(Errno::ECHILD) => break,
				Err(e) => {
					warn!("waitpid failed while reaping: {}", e);
					break
				}
			}
		}
		changed
	}
}

/// Blocks until the process group `pgid` stops or every member has exited.
///
/// Each status goes through `JobTable::apply`, same as the reaper. Returns true if the
/// group stopped.
pub fn wait_for_group(pgid: Pid, jobs: &mut JobTable) -> bool {
	let group = Pid::from_raw(-pgid.as_raw());
	loop {
		match waitpid(group, Some(WaitPidFlag::WUNTRACED)) {
			Ok(status) => {
				jobs.apply(status);
				if let WaitStatus::Stopped(pid, sig) = status {
					debug!("pgid {} stopped by {} (pid {})", pgid, sig, pid);
					return true
				}
			}
			Err(Errno::EINTR) => continue,
			Err(Errno::ECHILD) => {
				trace!("pgid {} has no children left", pgid);
				return false
			}
			Err(e) => {
				warn!("waitpid on pgid {} failed: {}", pgid, e);
				return false
			}
		}
	}
}
