use std::{io, path::PathBuf};

use clap::Parser;
use log::debug;

use jcsh::{event::EventLoop, execute::dispatch::exec_input, shellenv::Shell, shopt::ShOpts, JcshErr, JcshResult};

#[derive(Parser, Debug)]
#[command(name = "jcsh", version, about = "A job-control shell")]
struct Args {
	/// Run one command line and exit
	#[arg(short = 'c', value_name = "COMMAND")]
	command: Option<String>,

	/// Options file, defaults to $JCSH_CONFIG or ~/.jcshrc.json
	#[arg(long, value_name = "PATH")]
	config: Option<PathBuf>,

	/// Set an option, e.g. `-o core.notify=true`
	#[arg(short = 'o', value_name = "KEY=VALUE")]
	options: Vec<String>,

	/// Never create process groups or hand the terminal to jobs
	#[arg(long)]
	no_job_control: bool,
}

fn main() {
	env_logger::init();
	let args = Args::parse();

	let code = match run(args) {
		Ok(code) => code,
		Err(e) => {
			eprintln!("jcsh: {}", e);
			1
		}
	};
	std::process::exit(code)
}

fn run(args: Args) -> JcshResult<i32> {
	let mut opts = ShOpts::load(args.config)?;
	for assignment in &args.options {
		opts.set_assignment(assignment)?;
	}
	if args.no_job_control {
		opts.core.job_control = false;
	}

	let interactive = args.command.is_none() && unsafe { libc::isatty(libc::STDIN_FILENO) } == 1;
	let mut shell = Shell::new(opts, interactive)?;

	if let Some(command) = args.command {
		return match exec_input(&command, &mut shell) {
			Ok(()) => Ok(0),
			Err(JcshErr::CleanExit(code)) => Ok(code),
			Err(e) => {
				eprintln!("jcsh: {}", e);
				Ok(1)
			}
		}
	}

	debug!("Starting event loop");
	EventLoop::new(io::stdin().lock()).listen(&mut shell)
}
