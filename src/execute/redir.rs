use std::{fs::{File, OpenOptions}, os::{fd::{FromRawFd, IntoRawFd}, unix::fs::OpenOptionsExt}};

use nix::fcntl::{fcntl, FcntlArg, FdFlag};

use crate::{pipeline::{Stage, WriteMode}, prelude::*};

/// `rw-r--r--`
pub const OUTPUT_MODE: u32 = 0o644;

/// The `N-1` pipes joining the `N` stages of a pipeline, all created before the first fork
/// so that every child can see and close the whole set.
#[derive(Debug)]
pub struct PipeChain {
	pipes: Vec<(OwnedFd,OwnedFd)>,
}

impl PipeChain {
	pub fn new(stages: usize) -> JcshResult<Self> {
		let mut pipes = Vec::with_capacity(stages.saturating_sub(1));
		for _ in 1..stages {
			pipes.push(pipe()?);
		}
		trace!("created {} pipes", pipes.len());
		Ok(Self { pipes })
	}

	pub fn len(&self) -> usize {
		self.pipes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.pipes.is_empty()
	}

	/// Read end feeding stage `i`
	pub fn stdin_for(&self, i: usize) -> Option<RawFd> {
		i.checked_sub(1)
			.and_then(|prev| self.pipes.get(prev))
			.map(|(r_pipe,_)| r_pipe.as_raw_fd())
	}

	/// Write end stage `i` writes into
	pub fn stdout_for(&self, i: usize) -> Option<RawFd> {
		self.pipes.get(i).map(|(_,w_pipe)| w_pipe.as_raw_fd())
	}

	/// Child side: points stdin/stdout of stage `i` at its neighbours, then closes every
	/// pipe descriptor
	pub fn wire(self, i: usize) -> JcshResult<()> {
		if let Some(r_pipe) = self.stdin_for(i) {
			dup2(r_pipe, STDIN_FILENO)?;
		}
		if let Some(w_pipe) = self.stdout_for(i) {
			dup2(w_pipe, STDOUT_FILENO)?;
		}
		drop(self);
		Ok(())
	}
}

/// Applies a stage's `<`, `>` and `>>` targets to the current process
pub fn apply_file_redirs(stage: &Stage) -> JcshResult<()> {
	if let Some(path) = stage.input() {
		let file = File::open(path)
			.map_err(|source| JcshErr::Open { path: path.clone(), source })?;
		redirect(file, STDIN_FILENO)?;
	}
	if let Some(path) = stage.output() {
		let mut options = OpenOptions::new();
		options.create(true).mode(OUTPUT_MODE);
		match stage.write_mode() {
			WriteMode::Truncate => options.write(true).truncate(true),
			WriteMode::Append => options.append(true),
		};
		let file = options.open(path)
			.map_err(|source| JcshErr::Open { path: path.clone(), source })?;
		redirect(file, STDOUT_FILENO)?;
	}
	Ok(())
}

/// Moves `file` onto `dst`, leaving `dst` open across exec
pub fn redirect(file: File, dst: RawFd) -> JcshResult<()> {
	let fd = OwnedFd::from(file);
	if fd.as_raw_fd() == dst {
		// Landed in the closed slot directly; std opened it with O_CLOEXEC
		let fd = fd.into_raw_fd();
		fcntl(fd, FcntlArg::F_SETFD(FdFlag::empty())).map_err(JcshErr::sys("fcntl"))?;
		return Ok(())
	}
	dup2(fd.as_raw_fd(), dst)
}

pub fn pipe() -> JcshResult<(OwnedFd,OwnedFd)> {
	let mut fds = [0;2];
	Errno::result(unsafe { libc::pipe(fds.as_mut_ptr()) }).map_err(JcshErr::sys("pipe"))?;
	// Both descriptors are fresh and owned by nobody else
	Ok(unsafe { (OwnedFd::from_raw_fd(fds[0]), OwnedFd::from_raw_fd(fds[1])) })
}

pub fn dup2(src: RawFd, dst: RawFd) -> JcshResult<()> {
	if src == dst {
		return Ok(())
	}
	Errno::result(unsafe { libc::dup2(src, dst) }).map_err(JcshErr::sys("dup2"))?;
	Ok(())
}
