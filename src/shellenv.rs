use crate::{jobs::JobTable, prelude::*, shopt::ShOpts, signal::Reaper, terminal::Terminal};

/// Everything the shell carries between command lines.
///
/// The job table is shared by the main flow and the reaper; both reach it through here.
#[derive(Debug)]
pub struct Shell {
	jobs: JobTable,
	term: Terminal,
	reaper: Reaper,
	opts: ShOpts,
	interactive: bool,
	notices: Vec<usize>,
}

impl Shell {
	/// Sets up the terminal, the SIGCHLD reaper and the job table for a session
	pub fn new(opts: ShOpts, interactive: bool) -> JcshResult<Self> {
		let term = Terminal::init(opts.core.job_control && interactive)?;
		let reaper = Reaper::install()?;
		Ok(Self { jobs: JobTable::new(), term, reaper, opts, interactive, notices: vec![] })
	}

	/// A shell that leaves the terminal and signal dispositions alone
	pub fn detached(opts: ShOpts) -> Self {
		Self {
			jobs: JobTable::new(),
			term: Terminal::detached(getpgrp()),
			reaper: Reaper::detached(),
			opts,
			interactive: false,
			notices: vec![],
		}
	}

	pub fn jobs(&self) -> &JobTable {
		&self.jobs
	}

	pub fn jobs_mut(&mut self) -> &mut JobTable {
		&mut self.jobs
	}

	pub fn term(&self) -> &Terminal {
		&self.term
	}

	pub fn term_mut(&mut self) -> &mut Terminal {
		&mut self.term
	}

	pub fn opts(&self) -> &ShOpts {
		&self.opts
	}

	pub fn is_interactive(&self) -> bool {
		self.interactive
	}

	pub fn job_control(&self) -> bool {
		self.term.is_enabled()
	}

	/// Drains pending child notifications into the job table
	pub fn reap(&mut self) -> Vec<usize> {
		let changed = self.reaper.reap(&mut self.jobs);
		for id in &changed {
			if !self.notices.contains(id) {
				self.notices.push(*id);
			}
		}
		changed
	}

	/// Ids of jobs the reaper has touched since the last call
	pub fn take_notices(&mut self) -> Vec<usize> {
		std::mem::take(&mut self.notices)
	}

	pub fn reaper(&self) -> &Reaper {
		&self.reaper
	}

	/// Gives the terminal to `pgid`, waits for the group to stop or finish, then takes the
	/// terminal back. Returns true if the group stopped.
	pub fn wait_fg(&mut self, pgid: Pid) -> JcshResult<bool> {
		if let Err(e) = self.term.foreground(pgid) {
			// The group may already be gone; waiting still collects it
			warn!("could not foreground pgid {}: {}", pgid, e);
		}
		self.wait_group(pgid)
	}

	/// Like `wait_fg`, for a group that already owns the terminal.
	///
	/// A job that finishes in the foreground leaves the table right away; only stopped
	/// ones stay behind.
	pub fn wait_group(&mut self, pgid: Pid) -> JcshResult<bool> {
		let stopped = crate::signal::wait_for_group(pgid, &mut self.jobs);
		if !stopped {
			self.jobs.retire(pgid);
		}
		self.term.reclaim()?;
		Ok(stopped)
	}
}
