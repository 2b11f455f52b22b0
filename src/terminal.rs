use crate::prelude::*;

/// Tracks and transfers ownership of the controlling terminal.
///
/// Exactly one process group is the foreground group at a time: the shell's own or the
/// group of one live job. When the shell is not interactive there is no terminal to hand
/// around, and only the logical foreground group is recorded.
#[derive(Debug,Clone)]
pub struct Terminal {
	fd: RawFd,
	shell_pgid: Pid,
	foreground: Pid,
	enabled: bool,
}

impl Terminal {
	/// Puts the shell in its own process group and takes the terminal when job control is
	/// wanted and stdin is a terminal
	pub fn init(job_control: bool) -> JcshResult<Self> {
		let fd = STDIN_FILENO;
		let enabled = job_control && unsafe { libc::isatty(fd) } == 1;
		if !enabled {
			let shell_pgid = getpgrp();
			debug!("job control disabled, shell pgid={}", shell_pgid);
			return Ok(Self::detached(shell_pgid))
		}

		// Wait until we are in the foreground before grabbing anything
		loop {
			let owner = tcgetpgrp(fd)?;
			let ours = getpgrp();
			if owner == ours {
				break
			}
			trace!("terminal owned by {}, stopping until we are foregrounded", owner);
			nix::sys::signal::killpg(ours, Signal::SIGTTIN).map_err(JcshErr::sys("kill"))?;
		}

		crate::signal::ignore_job_signals()?;

		let pid = getpid();
		if let Err(e) = setpgid(pid, pid) {
			// A session leader already leads its own group
			debug!("setpgid on shell: {}", e);
		}
		let shell_pgid = getpgrp();
		tcsetpgrp(fd, shell_pgid)?;
		info!("job control enabled, shell pgid={}", shell_pgid);

		Ok(Self { fd, shell_pgid, foreground: shell_pgid, enabled: true })
	}

	/// A controller that never touches a terminal
	pub fn detached(shell_pgid: Pid) -> Self {
		Self { fd: STDIN_FILENO, shell_pgid, foreground: shell_pgid, enabled: false }
	}

	pub fn is_enabled(&self) -> bool {
		self.enabled
	}

	pub fn shell_pgid(&self) -> Pid {
		self.shell_pgid
	}

	/// The group currently allowed to use the terminal
	pub fn current(&self) -> Pid {
		self.foreground
	}

	pub fn fd(&self) -> RawFd {
		self.fd
	}

	/// Makes `pgid` the terminal's foreground group
	pub fn foreground(&mut self, pgid: Pid) -> JcshResult<()> {
		if self.enabled {
			tcsetpgrp(self.fd, pgid)?;
		}
		trace!("foreground pgid {} -> {}", self.foreground, pgid);
		self.foreground = pgid;
		Ok(())
	}

	/// Hands the terminal back to the shell
	pub fn reclaim(&mut self) -> JcshResult<()> {
		self.foreground(self.shell_pgid)
	}
}

pub fn tcsetpgrp(fd: RawFd, pgid: Pid) -> JcshResult<()> {
	Errno::result(unsafe { libc::tcsetpgrp(fd, pgid.as_raw()) })
		.map(drop)
		.map_err(JcshErr::sys("tcsetpgrp"))
}

pub fn tcgetpgrp(fd: RawFd) -> JcshResult<Pid> {
	Errno::result(unsafe { libc::tcgetpgrp(fd) })
		.map(Pid::from_raw)
		.map_err(JcshErr::sys("tcgetpgrp"))
}
