use crate::{prelude::*, shopt::ShOptsPrompt};

/// Expands the prompt format. `\w` is the working directory.
pub fn render(opts: &ShOptsPrompt) -> String {
	let cwd = env::current_dir().unwrap_or_default();
	opts.format.replace("\\w", &trunc_path(&cwd, opts.trunc_prompt_path))
}

fn trunc_path(path: &Path, keep: usize) -> String {
	let components = path.components().collect::<Vec<_>>();
	if keep == 0 || components.len() <= keep {
		return path.display().to_string()
	}
	components[components.len() - keep..]
		.iter()
		.collect::<PathBuf>()
		.display()
		.to_string()
}

pub fn print_prompt(opts: &ShOptsPrompt) -> io::Result<()> {
	let mut stdout = io::stdout();
	write!(stdout, "{}", render(opts))?;
	stdout.flush()
}
