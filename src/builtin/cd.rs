use crate::prelude::*;

pub fn execute(argv: &[String]) -> JcshResult<()> {
	let new_pwd = match argv.get(1) {
		Some(arg) => PathBuf::from(arg),
		None => PathBuf::from(env::var("HOME").unwrap_or("/".into())),
	};
	env::set_current_dir(&new_pwd).map_err(|source| JcshErr::Cd { path: new_pwd.clone(), source })?;
	debug!("cwd is now {}", new_pwd.display());
	Ok(())
}
