use std::io::BufRead;

use crate::{execute::dispatch::exec_input, jobs::JobState, prelude::*, prompt};

/// The read-eval loop: one command line per iteration until EOF or `exit`
pub struct EventLoop<R: BufRead> {
	input: R,
}

impl<R: BufRead> EventLoop<R> {
	pub fn new(input: R) -> Self {
		Self { input }
	}

	/// Returns the status the shell should exit with
	pub fn listen(&mut self, shell: &mut Shell) -> JcshResult<i32> {
		debug!("Event loop started.");
		loop {
			shell.reap();
			let changed = shell.take_notices();
			if shell.opts().core.notify {
				announce_done(shell, &changed)?;
			}

			if shell.is_interactive() {
				prompt::print_prompt(&shell.opts().prompt)?;
			}

			let mut line = String::new();
			match self.input.read_line(&mut line) {
				Ok(0) => {
					if shell.is_interactive() {
						println!();
					}
					debug!("EOF on input");
					return Ok(0)
				}
				Ok(_) => {}
				Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
				Err(e) => return Err(e.into())
			}

			match exec_input(&line, shell) {
				Ok(()) => {}
				Err(JcshErr::CleanExit(code)) => return Ok(code),
				Err(e) => eprintln!("jcsh: {}",e),
			}
		}
	}
}

/// `[<id>] Done <command>` for each job among `changed` that has finished. The jobs stay
/// in the table until the next `jobs` listing.
fn announce_done(shell: &Shell, changed: &[usize]) -> io::Result<()> {
	let mut stdout = io::stdout();
	for job in shell.jobs().iter().filter(|job| changed.contains(&job.id())) {
		if job.state() == JobState::Done {
			writeln!(stdout, "[{}] {} {}", job.id(), job.state(), job.command())?;
		}
	}
	stdout.flush()
}
