#[cfg(test)]
pub mod lexer_tests {
	use crate::lexer::*;

	#[test]
	fn simple() {
		let tokens = tokenize("ls -l | grep foo > out.txt &");
		insta::assert_debug_snapshot!(tokens, @r#"
		[
		    Word(
		        "ls",
		    ),
		    Word(
		        "-l",
		    ),
		    Pipe,
		    Word(
		        "grep",
		    ),
		    Word(
		        "foo",
		    ),
		    RedirOut,
		    Word(
		        "out.txt",
		    ),
		    Background,
		]
		"#);
	}

	#[test]
	fn operators_without_spaces() {
		let tokens = tokenize("cat<in>>out|wc");
		assert_eq!(tokens, vec![
			Tk::Word("cat".into()),
			Tk::RedirIn,
			Tk::Word("in".into()),
			Tk::RedirAppend,
			Tk::Word("out".into()),
			Tk::Pipe,
			Tk::Word("wc".into()),
		]);
	}

	#[test]
	fn quotes_group_words() {
		let tokens = tokenize(r#"sh -c 'kill -STOP $$' "a | b""#);
		assert_eq!(tokens, vec![
			Tk::Word("sh".into()),
			Tk::Word("-c".into()),
			Tk::Word("kill -STOP $$".into()),
			Tk::Word("a | b".into()),
		]);
	}

	#[test]
	fn unterminated_quote_is_literal() {
		let tokens = tokenize("echo it's");
		assert_eq!(tokens, vec![Tk::Word("echo".into()), Tk::Word("it's".into())]);
	}

	#[test]
	fn blank_line() {
		assert!(tokenize("  \t ").is_empty());
	}
}

#[cfg(test)]
pub mod parser_tests {
	use crate::{lexer::tokenize, pipeline::*};

	fn parse_str(input: &str) -> Pipeline {
		parse(tokenize(input))
	}

	#[test]
	fn single_stage() {
		let pipeline = parse_str("ls -la /tmp");
		assert_eq!(pipeline.len(), 1);
		assert!(!pipeline.is_background());
		assert_eq!(pipeline.stages()[0].argv(), ["ls", "-la", "/tmp"]);
	}

	#[test]
	fn pipeline_with_redirs() {
		let pipeline = parse_str("sort < in.txt | uniq -c >> out.txt &");
		insta::assert_debug_snapshot!(pipeline, @r#"
		Pipeline {
		    stages: [
		        Stage {
		            argv: [
		                "sort",
		            ],
		            input: Some(
		                "in.txt",
		            ),
		            output: None,
		            write_mode: Truncate,
		        },
		        Stage {
		            argv: [
		                "uniq",
		                "-c",
		            ],
		            input: None,
		            output: Some(
		                "out.txt",
		            ),
		            write_mode: Append,
		        },
		    ],
		    background: true,
		}
		"#);
	}

	#[test]
	fn last_redirection_wins() {
		let pipeline = parse_str("echo hi > a >> b > c");
		let stage = &pipeline.stages()[0];
		assert_eq!(stage.output().unwrap().to_str(), Some("c"));
		assert_eq!(stage.write_mode(), WriteMode::Truncate);

		let pipeline = parse_str("cat < a < b");
		assert_eq!(pipeline.stages()[0].input().unwrap().to_str(), Some("b"));
	}

	#[test]
	fn dangling_redirection_is_dropped() {
		let pipeline = parse_str("echo hi >");
		let stage = &pipeline.stages()[0];
		assert_eq!(stage.argv(), ["echo", "hi"]);
		assert!(stage.output().is_none());

	}

	#[test]
	fn operator_after_redirection_is_the_target() {
		let pipeline = parse_str("cat < | wc");
		assert_eq!(pipeline.len(), 1);
		let stage = &pipeline.stages()[0];
		assert_eq!(stage.input().unwrap().to_str(), Some("|"));
		assert_eq!(stage.argv(), ["cat", "wc"]);

		// A consumed `&` does not background the line
		let pipeline = parse_str("echo hi > &");
		assert!(!pipeline.is_background());
		assert_eq!(pipeline.stages()[0].output().unwrap().to_str(), Some("&"));

		let pipeline = parse_str("sort >> > out");
		assert_eq!(pipeline.stages()[0].output().unwrap().to_str(), Some(">"));
		assert_eq!(pipeline.stages()[0].write_mode(), WriteMode::Append);
		assert_eq!(pipeline.stages()[0].argv(), ["sort", "out"]);
	}

	#[test]
	fn redirection_alone_is_not_empty() {
		let pipeline = parse_str("> out.txt");
		assert!(!pipeline.is_empty());
		assert!(pipeline.stages()[0].argv().is_empty());
		assert!(pipeline.as_shell_builtin().is_none());
	}

	#[test]
	fn ampersand_only_counts_at_the_end() {
		let pipeline = parse_str("sleep 1 & echo hi");
		assert!(!pipeline.is_background());
		assert_eq!(pipeline.stages()[0].argv(), ["sleep", "1", "echo", "hi"]);

		assert!(parse_str("sleep 1 &").is_background());
	}

	#[test]
	fn empty_stages_are_kept() {
		let pipeline = parse_str("ls | | wc");
		assert_eq!(pipeline.len(), 3);
		assert!(pipeline.stages()[1].argv().is_empty());
		assert!(!pipeline.is_empty());

		assert!(parse_str("&").is_empty());
		assert!(parse_str("|").is_empty());
	}

	#[test]
	fn lone_builtin_runs_in_shell() {
		assert!(parse_str("fg 1").as_shell_builtin().is_some());
		assert!(parse_str("cd /tmp").as_shell_builtin().is_some());
		assert!(parse_str("jobs > out").as_shell_builtin().is_none());
		assert!(parse_str("jobs &").as_shell_builtin().is_none());
		assert!(parse_str("jobs | cat").as_shell_builtin().is_none());
		assert!(parse_str("ls").as_shell_builtin().is_none());
	}
}

#[cfg(test)]
pub mod job_table_tests {
	use nix::{sys::{signal::Signal, wait::WaitStatus}, unistd::Pid};

	use crate::jobs::*;

	fn pid(raw: i32) -> Pid {
		Pid::from_raw(raw)
	}

	fn table_with_pipeline() -> (JobTable, usize) {
		let mut table = JobTable::new();
		let job = JobBuilder::new()
			.with_pgid(pid(100))
			.with_members(vec![pid(100), pid(101), pid(102)])
			.with_command("yes | head -n 3 | wc -l")
			.build();
		let id = table.insert(job);
		(table, id)
	}

	#[test]
	fn ids_are_monotonic() {
		let mut table = JobTable::new();
		let first = table.add(pid(10), "sleep 1 &", JobState::Running);
		let second = table.add(pid(20), "sleep 2 &", JobState::Running);
		assert_eq!((first, second), (1, 2));

		table.find_by_id_mut(first).unwrap().set_state(JobState::Done);
		table.prune_done();
		let third = table.add(pid(30), "sleep 3 &", JobState::Running);
		assert_eq!(third, 3);
	}

	#[test]
	fn lookup() {
		let (table, id) = table_with_pipeline();
		assert_eq!(table.find_by_pgid(pid(100)).map(Job::id), Some(id));
		assert_eq!(table.find_by_id(id).map(Job::pgid), Some(pid(100)));
		assert!(table.find_by_id(999).is_none());
		assert!(table.find_by_pgid(pid(999)).is_none());
	}

	#[test]
	fn display_format() {
		let mut table = JobTable::new();
		let id = table.add(pid(4242), "sleep 10 &", JobState::Running);
		let job = table.find_by_id(id).unwrap();
		insta::assert_snapshot!(job.display(JobCmdFlags::empty()), @"[1] Running sleep 10 & (pgid=4242)");
		insta::assert_snapshot!(job.display(JobCmdFlags::PIDS), @"4242");
	}

	#[test]
	fn done_only_after_every_member_exits() {
		let (mut table, id) = table_with_pipeline();
		assert_eq!(table.apply(WaitStatus::Exited(pid(102), 0)), Some(id));
		assert_eq!(table.find_by_id(id).unwrap().state(), JobState::Running);

		table.apply(WaitStatus::Signaled(pid(100), Signal::SIGPIPE, false));
		assert_eq!(table.find_by_id(id).unwrap().state(), JobState::Running);

		table.apply(WaitStatus::Exited(pid(101), 0));
		assert_eq!(table.find_by_id(id).unwrap().state(), JobState::Done);
	}

	#[test]
	fn stop_and_continue() {
		let (mut table, id) = table_with_pipeline();
		table.apply(WaitStatus::Stopped(pid(101), Signal::SIGTSTP));
		assert_eq!(table.find_by_id(id).unwrap().state(), JobState::Stopped);

		table.apply(WaitStatus::Continued(pid(101)));
		assert_eq!(table.find_by_id(id).unwrap().state(), JobState::Running);
	}

	#[test]
	fn unknown_pid_is_ignored() {
		let (mut table, id) = table_with_pipeline();
		assert_eq!(table.apply(WaitStatus::Exited(pid(7), 1)), None);
		assert_eq!(table.apply(WaitStatus::StillAlive), None);
		assert_eq!(table.find_by_id(id).unwrap().state(), JobState::Running);
	}

	#[test]
	fn job_without_members_tracks_its_leader() {
		let mut table = JobTable::new();
		let id = table.add(pid(500), "sleep 5 &", JobState::Running);
		table.apply(WaitStatus::Exited(pid(500), 0));
		assert_eq!(table.find_by_id(id).unwrap().state(), JobState::Done);
	}

	#[test]
	fn done_jobs_are_listed_once() {
		let mut table = JobTable::new();
		let done = table.add(pid(10), "true &", JobState::Running);
		let running = table.add(pid(20), "sleep 9 &", JobState::Running);
		table.apply(WaitStatus::Exited(pid(10), 0));

		let first = table.list().map(|job| (job.id(), job.state())).collect::<Vec<_>>();
		assert_eq!(first, vec![(done, JobState::Done), (running, JobState::Running)]);

		let second = table.list().map(|job| job.id()).collect::<Vec<_>>();
		assert_eq!(second, vec![running]);
	}

	#[test]
	fn retire_only_takes_finished_jobs() {
		let mut table = JobTable::new();
		let id = table.add(pid(10), "true", JobState::Running);
		assert!(table.retire(pid(10)).is_none());

		table.apply(WaitStatus::Exited(pid(10), 0));
		assert_eq!(table.retire(pid(10)).map(|job| job.id()), Some(id));
		assert!(table.is_empty());
		assert!(table.retire(pid(10)).is_none());
	}

	#[test]
	fn recycled_pgid_evicts_done_job() {
		let mut table = JobTable::new();
		let old = table.add(pid(10), "true &", JobState::Done);
		let new = table.add(pid(10), "sleep 1 &", JobState::Running);
		assert!(table.find_by_id(old).is_none());
		assert_eq!(table.find_by_pgid(pid(10)).map(Job::id), Some(new));
		assert_eq!(table.len(), 1);
	}

	#[test]
	fn finished_job_ignores_late_statuses() {
		let mut table = JobTable::new();
		let id = table.add(pid(10), "true &", JobState::Running);
		table.apply(WaitStatus::Exited(pid(10), 0));
		assert_eq!(table.apply(WaitStatus::Continued(pid(10))), None);
		assert_eq!(table.find_by_id(id).unwrap().state(), JobState::Done);
	}
}

#[cfg(test)]
pub mod shopt_tests {
	use serde_json::Value;

	use crate::shopt::*;

	#[test]
	fn defaults() {
		let opts = ShOpts::default();
		assert!(opts.core.job_control);
		assert!(!opts.core.notify);
		assert_eq!(opts.prompt.format, "jcsh:\\w$ ");
	}

	#[test]
	fn partial_json_keeps_defaults() {
		let opts = ShOpts::from_json(r#"{ "core": { "notify": true } }"#).unwrap();
		assert!(opts.core.notify);
		assert!(opts.core.job_control);
		assert_eq!(opts.prompt, ShOptsPrompt::default());
	}

	#[test]
	fn bad_json_is_a_config_error() {
		let err = ShOpts::from_json("{ core: ").unwrap_err();
		assert!(err.to_string().starts_with("config: "));
	}

	#[test]
	fn set_by_dotted_key() {
		let mut opts = ShOpts::default();
		opts.set("core.job_control", Value::Bool(false)).unwrap();
		opts.set_assignment("prompt.format=> ").unwrap();
		opts.set_assignment("prompt.trunc_prompt_path=2").unwrap();
		assert!(!opts.core.job_control);
		assert_eq!(opts.prompt.format, "> ");
		assert_eq!(opts.prompt.trunc_prompt_path, 2);
	}

	#[test]
	fn set_rejects_bad_keys_and_values() {
		let mut opts = ShOpts::default();
		assert!(opts.set("core.nope", Value::Bool(true)).is_err());
		assert!(opts.set("nope.notify", Value::Bool(true)).is_err());
		assert!(opts.set_assignment("core.notify=yes").is_err());
		assert!(opts.set_assignment("core.notify").is_err());
		assert_eq!(opts, ShOpts::default());
	}

	#[test]
	fn missing_file_gives_defaults() {
		let dir = tempfile::tempdir().unwrap();
		let opts = ShOpts::load(Some(dir.path().join("absent.json"))).unwrap();
		assert_eq!(opts, ShOpts::default());
	}

	#[test]
	fn load_from_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("jcshrc.json");
		std::fs::write(&path, r#"{ "prompt": { "format": "% " } }"#).unwrap();
		let opts = ShOpts::load(Some(path)).unwrap();
		assert_eq!(opts.prompt.format, "% ");
	}
}

#[cfg(test)]
pub mod redir_tests {
	use std::{fs::File, io::Write, os::fd::{AsRawFd, FromRawFd, IntoRawFd, OwnedFd}};

	use nix::fcntl::{fcntl, FcntlArg};

	use crate::execute::redir::{redirect, PipeChain};

	fn cloexec(fd: i32) -> bool {
		fcntl(fd, FcntlArg::F_GETFD).unwrap() & libc::FD_CLOEXEC != 0
	}

	#[test]
	fn redirect_into_its_own_slot_stays_open_across_exec() {
		let dir = tempfile::tempdir().unwrap();
		let file = File::create(dir.path().join("out")).unwrap();
		let fd = file.as_raw_fd();
		assert!(cloexec(fd));

		redirect(file, fd).unwrap();
		assert!(!cloexec(fd));
		drop(unsafe { OwnedFd::from_raw_fd(fd) });
	}

	#[test]
	fn redirect_onto_another_descriptor() {
		let dir = tempfile::tempdir().unwrap();
		let source = dir.path().join("source");
		let replaced = dir.path().join("replaced");
		let target = File::create(&replaced).unwrap().into_raw_fd();

		redirect(File::create(&source).unwrap(), target).unwrap();
		assert!(!cloexec(target));
		let mut out = unsafe { File::from_raw_fd(target) };
		out.write_all(b"moved").unwrap();
		drop(out);

		assert_eq!(std::fs::read_to_string(&source).unwrap(), "moved");
		assert_eq!(std::fs::read_to_string(&replaced).unwrap(), "");
	}

	#[test]
	fn pipe_chain_neighbours() {
		let chain = PipeChain::new(3).unwrap();
		assert_eq!(chain.len(), 2);
		assert!(chain.stdin_for(0).is_none());
		assert!(chain.stdout_for(2).is_none());
		// Stage 1 reads what stage 0 writes
		assert!(chain.stdout_for(0).is_some());
		assert!(chain.stdin_for(1).is_some());
		assert_ne!(chain.stdin_for(1), chain.stdout_for(0));
		assert!(chain.stdin_for(2).is_some());
	}

	#[test]
	fn single_stage_needs_no_pipes() {
		let chain = PipeChain::new(1).unwrap();
		assert!(chain.is_empty());
		assert!(chain.stdin_for(0).is_none());
		assert!(chain.stdout_for(0).is_none());
	}
}
