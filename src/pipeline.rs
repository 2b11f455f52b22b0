use std::path::PathBuf;

use crate::lexer::Tk;

#[derive(Debug,Clone,Copy,PartialEq,Eq,Default)]
pub enum WriteMode {
	#[default]
	Truncate,
	Append,
}

/// One command in a pipeline
#[derive(Debug,Clone,PartialEq,Eq,Default)]
pub struct Stage {
	argv: Vec<String>,
	input: Option<PathBuf>,
	output: Option<PathBuf>,
	write_mode: WriteMode,
}

impl Stage {
	pub fn argv(&self) -> &[String] {
		&self.argv
	}
	pub fn name(&self) -> Option<&str> {
		self.argv.first().map(|arg| arg.as_str())
	}
	pub fn input(&self) -> Option<&PathBuf> {
		self.input.as_ref()
	}
	pub fn output(&self) -> Option<&PathBuf> {
		self.output.as_ref()
	}
	pub fn write_mode(&self) -> WriteMode {
		self.write_mode
	}
	pub fn has_redirs(&self) -> bool {
		self.input.is_some() || self.output.is_some()
	}
}

#[derive(Debug,Clone,PartialEq,Eq)]
pub struct Pipeline {
	stages: Vec<Stage>,
	background: bool,
}

impl Pipeline {
	pub fn stages(&self) -> &[Stage] {
		&self.stages
	}
	pub fn len(&self) -> usize {
		self.stages.len()
	}
	/// Nothing to run and nothing to open
	pub fn is_empty(&self) -> bool {
		self.stages.iter().all(|stage| stage.argv.is_empty() && !stage.has_redirs())
	}
	pub fn is_background(&self) -> bool {
		self.background
	}

	/// The builtin to run inside the shell process itself, if this pipeline is a lone
	/// foreground builtin call with no redirections
	pub fn as_shell_builtin(&self) -> Option<&Stage> {
		match self.stages.as_slice() {
			[stage] if !self.background && !stage.has_redirs() => {
				stage.name()
					.filter(|name| crate::builtin::is_builtin(name))
					.map(|_| stage)
			}
			_ => None
		}
	}
}

/// Builds a pipeline from lexer tokens.
///
/// Parsing never fails. A redirection operator takes the next token as its target even
/// when that token is an operator, and is dropped at the end of the line. An empty stage
/// stays empty, and `&` only counts as the last token.
pub fn parse(tokens: Vec<Tk>) -> Pipeline {
	let mut stages = vec![Stage::default()];
	let mut background = false;
	let last = tokens.len().saturating_sub(1);
	let mut tokens = tokens.into_iter().enumerate();

	while let Some((i,tk)) = tokens.next() {
		// `stages` always holds at least one stage
		let current = stages.last_mut().unwrap();
		match tk {
			Tk::Pipe => stages.push(Stage::default()),
			Tk::RedirIn | Tk::RedirOut | Tk::RedirAppend => {
				let Some((_,next)) = tokens.next() else {
					continue
				};
				let target = next.as_text();
				match tk {
					Tk::RedirIn => current.input = Some(target.into()),
					Tk::RedirOut => {
						current.output = Some(target.into());
						current.write_mode = WriteMode::Truncate;
					}
					_ => {
						current.output = Some(target.into());
						current.write_mode = WriteMode::Append;
					}
				}
			}
			Tk::Background => {
				if i == last {
					background = true;
				}
			}
			Tk::Word(word) => current.argv.push(word),
		}
	}

	Pipeline { stages, background }
}
