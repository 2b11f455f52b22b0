use crate::prelude::*;

bitflags::bitflags! {
	#[derive(Debug,Clone,Copy,PartialEq,Eq)]
	pub struct JobCmdFlags: u8 {
		const PIDS    = 0b0001; // Print pgids only
		const RUNNING = 0b0010; // Only running jobs
		const STOPPED = 0b0100; // Only stopped jobs
	}
}

#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum JobState {
	Running,
	Stopped,
	Done,
}

impl Display for JobState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			JobState::Running => write!(f,"Running"),
			JobState::Stopped => write!(f,"Stopped"),
			JobState::Done => write!(f,"Done"),
		}
	}
}

/// The shell's record of one launched pipeline.
///
/// The pgid is a back-reference only: the processes themselves belong to the OS.
#[derive(Debug,Clone,PartialEq,Eq)]
pub struct Job {
	id: usize,
	pgid: Pid,
	command: String,
	state: JobState,
	members: Vec<Pid>,
}

impl Job {
	pub fn id(&self) -> usize {
		self.id
	}
	pub fn pgid(&self) -> Pid {
		self.pgid
	}
	pub fn command(&self) -> &str {
		&self.command
	}
	pub fn state(&self) -> JobState {
		self.state
	}
	pub fn set_state(&mut self, state: JobState) {
		if self.state != state {
			debug!("job [{}] {} -> {}", self.id, self.state, state);
			self.state = state;
		}
	}
	pub fn members(&self) -> &[Pid] {
		&self.members
	}
	pub fn is_member(&self, pid: Pid) -> bool {
		self.members.contains(&pid) || (self.members.is_empty() && pid == self.pgid)
	}
	pub fn is_alive(&self) -> bool {
		self.state != JobState::Done
	}

	/// Sends `sig` to every process in the job's group
	pub fn killpg(&self, sig: Signal) -> JcshResult<()> {
		trace!("sending {} to pgid {}", sig, self.pgid);
		nix::sys::signal::killpg(self.pgid, sig).map_err(JcshErr::sys("kill"))
	}

	/// `[<id>] <State> <command> (pgid=<pgid>)`
	pub fn display(&self, flags: JobCmdFlags) -> String {
		if flags.contains(JobCmdFlags::PIDS) {
			format!("{}",self.pgid)
		} else {
			format!("[{}] {} {} (pgid={})",self.id,self.state,self.command,self.pgid)
		}
	}

	fn member_gone(&mut self, pid: Pid) {
		self.members.retain(|member| *member != pid);
		if self.members.is_empty() {
			self.set_state(JobState::Done);
		}
	}
}

#[derive(Debug,Default)]
pub struct JobBuilder {
	pgid: Option<Pid>,
	command: String,
	state: Option<JobState>,
	members: Vec<Pid>,
}

impl JobBuilder {
	pub fn new() -> Self {
		Self::default()
	}
	pub fn with_pgid(self, pgid: Pid) -> Self {
		Self { pgid: Some(pgid), ..self }
	}
	pub fn with_command(self, command: &str) -> Self {
		Self { command: command.to_string(), ..self }
	}
	pub fn with_state(self, state: JobState) -> Self {
		Self { state: Some(state), ..self }
	}
	pub fn with_members(self, members: Vec<Pid>) -> Self {
		Self { members, ..self }
	}
	/// The id is assigned when the job is inserted into a table
	pub fn build(self) -> Job {
		let pgid = self.pgid
			.or_else(|| self.members.first().copied())
			.unwrap_or_else(|| Pid::from_raw(0));
		Job {
			id: 0,
			pgid,
			command: self.command,
			state: self.state.unwrap_or(JobState::Running),
			members: self.members,
		}
	}
}

#[derive(Debug)]
pub struct JobTable {
	jobs: Vec<Job>,
	next_id: usize,
}

impl Default for JobTable {
	fn default() -> Self {
		Self::new()
	}
}

impl JobTable {
	pub fn new() -> Self {
		Self { jobs: vec![], next_id: 1 }
	}

	pub fn add(&mut self, pgid: Pid, command: &str, state: JobState) -> usize {
		let job = JobBuilder::new()
			.with_pgid(pgid)
			.with_command(command)
			.with_state(state)
			.build();
		self.insert(job)
	}

	/// Stores `job` under the next id and returns that id
	pub fn insert(&mut self, mut job: Job) -> usize {
		// A lingering Done job may share the pgid of a recycled process group
		self.jobs.retain(|old| old.pgid != job.pgid || old.is_alive());
		job.id = self.next_id;
		self.next_id += 1;
		debug!("new job [{}] pgid={} `{}`", job.id, job.pgid, job.command);
		self.jobs.push(job);
		self.next_id - 1
	}

	pub fn find_by_id(&self, id: usize) -> Option<&Job> {
		self.jobs.iter().find(|job| job.id == id)
	}

	pub fn find_by_id_mut(&mut self, id: usize) -> Option<&mut Job> {
		self.jobs.iter_mut().find(|job| job.id == id)
	}

	pub fn find_by_pgid(&self, pgid: Pid) -> Option<&Job> {
		self.jobs.iter().find(|job| job.pgid == pgid)
	}

	/// Drops the job for `pgid` if it has finished, returning it
	pub fn retire(&mut self, pgid: Pid) -> Option<Job> {
		let pos = self.jobs.iter().position(|job| job.pgid == pgid && !job.is_alive())?;
		debug!("retiring job [{}]", self.jobs[pos].id);
		Some(self.jobs.remove(pos))
	}

	pub fn prune_done(&mut self) {
		self.jobs.retain(Job::is_alive);
	}

	/// Every job in insertion order. Done jobs are part of this listing and are pruned
	/// right after, so each one is seen exactly once.
	pub fn list(&mut self) -> impl Iterator<Item = Job> {
		let listing = self.jobs.clone();
		self.prune_done();
		listing.into_iter()
	}

	pub fn len(&self) -> usize {
		self.jobs.len()
	}

	pub fn is_empty(&self) -> bool {
		self.jobs.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &Job> {
		self.jobs.iter()
	}

	/// Applies one reaped child status to the job owning that child.
	///
	/// Exit or death by signal removes the process from its job, and the job is Done once
	/// no members remain. Stop and continue apply to the whole job. Returns the affected
	/// job id, or None for a process the table does not know about.
	pub fn apply(&mut self, status: WaitStatus) -> Option<usize> {
		let pid = status.pid()?;
		let job = self.jobs.iter_mut().find(|job| job.is_alive() && job.is_member(pid))?;
		trace!("job [{}]: {:?}", job.id, status);
		match status {
			WaitStatus::Exited(..) | WaitStatus::Signaled(..) => job.member_gone(pid),
			WaitStatus::Stopped(..) => job.set_state(JobState::Stopped),
			WaitStatus::Continued(..) => job.set_state(JobState::Running),
			_ => { /* Ptrace events are not job state changes */ }
		}
		Some(job.id)
	}
}
