use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;

use crate::prelude::*;

pub const CONFIG_ENV: &str = "JCSH_CONFIG";
pub const CONFIG_FILE: &str = ".jcshrc.json";

#[derive(Serialize, Clone, Deserialize, Debug, Default, PartialEq)]
#[serde(default)]
pub struct ShOpts {
	pub core: ShOptsCore,
	pub prompt: ShOptsPrompt,
}

impl ShOpts {
	/// Loads options from `path`, then `$JCSH_CONFIG`, then `~/.jcshrc.json`.
	/// A config file that does not exist is not an error.
	pub fn load(path: Option<PathBuf>) -> JcshResult<Self> {
		let path = path
			.or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from))
			.or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(CONFIG_FILE)));
		let Some(path) = path else {
			return Ok(Self::default())
		};
		match std::fs::read_to_string(&path) {
			Ok(raw) => {
				debug!("loading options from {}", path.display());
				Self::from_json(&raw)
			}
			Err(e) if e.kind() == io::ErrorKind::NotFound => {
				trace!("no config at {}, using defaults", path.display());
				Ok(Self::default())
			}
			Err(e) => Err(e.into())
		}
	}

	pub fn from_json(raw: &str) -> JcshResult<Self> {
		Ok(serde_json::from_str(raw)?)
	}

	/// Sets one option by dotted key, e.g. `core.notify`
	pub fn set(&mut self, query: &str, value: Value) -> JcshResult<()> {
		let mut query = query.split('.').map(|seg| seg.to_string()).collect::<VecDeque<String>>();
		let key = query.pop_front().unwrap_or_default();
		match key.as_str() {
			"core" => self.core.set(query, value),
			"prompt" => self.prompt.set(query, value),
			_ => Err(JcshErr::usage(format!("Invalid shopt key: {}",key)))
		}
	}

	/// Parses a `key=value` assignment. Values that are not valid JSON are taken as strings.
	pub fn set_assignment(&mut self, assignment: &str) -> JcshResult<()> {
		let Some((key,raw)) = assignment.split_once('=') else {
			return Err(JcshErr::usage(format!("Expected key=value, got `{}`",assignment)))
		};
		let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.into()));
		self.set(key, value)
	}
}

#[derive(Serialize, Clone, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct ShOptsCore {
	/// Process groups and terminal handoff; only honored when stdin is a terminal
	pub job_control: bool,
	/// Announce finished background jobs before the next prompt
	pub notify: bool,
}

impl Default for ShOptsCore {
	fn default() -> Self {
		Self { job_control: true, notify: false }
	}
}

impl ShOptsCore {
	pub fn set(&mut self, mut query: VecDeque<String>, value: Value) -> JcshResult<()> {
		let key = query.pop_front().unwrap_or_default();
		let slot = match key.as_str() {
			"job_control" => &mut self.job_control,
			"notify" => &mut self.notify,
			_ => return Err(JcshErr::usage(format!("Invalid core opts key: {}", key)))
		};
		*slot = value.as_bool().ok_or_else(|| {
			JcshErr::usage(format!("Invalid value for core.{}: {}", key, value))
		})?;
		Ok(())
	}
}

#[derive(Serialize, Clone, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct ShOptsPrompt {
	/// `\w` expands to the working directory
	pub format: String,
	/// Keep only this many trailing components of the working directory, 0 keeps all
	pub trunc_prompt_path: usize,
}

impl Default for ShOptsPrompt {
	fn default() -> Self {
		Self { format: "jcsh:\\w$ ".into(), trunc_prompt_path: 0 }
	}
}

impl ShOptsPrompt {
	pub fn set(&mut self, mut query: VecDeque<String>, value: Value) -> JcshResult<()> {
		let key = query.pop_front().unwrap_or_default();
		match key.as_str() {
			"format" => {
				self.format = value.as_str().map(|s| s.to_string()).ok_or_else(|| {
					JcshErr::usage(format!("Invalid value for prompt.format: {}", value))
				})?;
			}
			"trunc_prompt_path" => {
				self.trunc_prompt_path = value.as_u64().ok_or_else(|| {
					JcshErr::usage(format!("Invalid value for prompt.trunc_prompt_path: {}", value))
				})? as usize;
			}
			_ => return Err(JcshErr::usage(format!("Invalid prompt opts key: {}", key)))
		}
		Ok(())
	}
}
