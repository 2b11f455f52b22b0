pub use std::{
	collections::VecDeque,
	env,
	ffi::CString,
	fmt::{
		self,
		Display
	},
	io::{
		self,
		Write
	},
	os::fd::{
		AsRawFd,
		OwnedFd,
		RawFd
	},
	path::{
		Path,
		PathBuf
	}
};

pub use libc::{
	STDIN_FILENO,
	STDOUT_FILENO,
	STDERR_FILENO
};
pub use nix::{
	errno::Errno,
	sys::{
		signal::Signal,
		wait::{
			WaitPidFlag,
			WaitStatus
		}
	},
	unistd::{
		setpgid,
		getpgrp,
		getpid,
		fork,
		ForkResult,
		Pid
	}
};
pub use log::{
	trace,
	debug,
	info,
	warn
};
pub use crate::{
	shellenv::Shell,
	error::{
		JcshResult,
		JcshErr
	},
};
