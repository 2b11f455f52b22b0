use std::path::PathBuf;

use nix::errno::Errno;
use thiserror::Error;

pub type JcshResult<T> = Result<T, JcshErr>;

#[derive(Debug, Error)]
pub enum JcshErr {
	/// A syscall failed. `op` names the operation for the user, e.g. `fork` or `pipe`
	#[error("{op}: {errno}")]
	Sys { op: &'static str, errno: Errno },

	#[error("I/O Error: {0}")]
	Io(#[from] std::io::Error),

	#[error("{0}")]
	Usage(String),

	#[error("{cmd}: {id}: no such job")]
	NoSuchJob { cmd: &'static str, id: String },

	#[error("{}: {source}", .path.display())]
	Open { path: PathBuf, source: std::io::Error },

	#[error("cd: {}: {source}", .path.display())]
	Cd { path: PathBuf, source: std::io::Error },

	#[error("config: {0}")]
	Config(#[from] serde_json::Error),

	// Not an actual error, used to unwind from `exit` to the main loop
	#[error("")]
	CleanExit(i32),
}

impl JcshErr {
	/// Builds a mapper for `Result::map_err` that tags an errno with the failing operation
	pub fn sys(op: &'static str) -> impl FnOnce(Errno) -> Self {
		move |errno| Self::Sys { op, errno }
	}

	pub fn usage(msg: impl Into<String>) -> Self {
		Self::Usage(msg.into())
	}

	pub fn no_such_job(cmd: &'static str, id: impl Into<String>) -> Self {
		Self::NoSuchJob { cmd, id: id.into() }
	}

	pub fn is_clean_exit(&self) -> bool {
		matches!(self, Self::CleanExit(_))
	}
}
