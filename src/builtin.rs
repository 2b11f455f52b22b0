pub mod cd;
pub mod control;
pub mod job;

pub const BUILTINS: [&str; 5] = [
	"cd", "exit", "jobs", "fg", "bg",
];

pub fn is_builtin(name: &str) -> bool {
	BUILTINS.contains(&name)
}
