use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

pub static REGEX: Lazy<HashMap<&'static str, Regex>> = Lazy::new(|| {
	let mut regex = HashMap::new();
	regex.insert("token",Regex::new(r#"(?P<operator>>>|[<>|&])|(?P<word>(?:'[^']*'|"[^"]*"|[^\s<>|&])+)"#).unwrap());
	regex.insert("quoted",Regex::new(r#"'(?P<sng>[^']*)'|"(?P<dub>[^"]*)""#).unwrap());
	regex
});

#[derive(Debug,Clone,PartialEq,Eq)]
pub enum Tk {
	Word(String),
	Pipe,
	RedirIn,
	RedirOut,
	RedirAppend,
	Background,
}

impl Tk {
	/// The token as it was written, with quotes already removed from words
	pub fn as_text(&self) -> &str {
		match self {
			Tk::Word(word) => word,
			Tk::Pipe => "|",
			Tk::RedirIn => "<",
			Tk::RedirOut => ">",
			Tk::RedirAppend => ">>",
			Tk::Background => "&",
		}
	}

	fn from_operator(op: &str) -> Self {
		match op {
			"|" => Tk::Pipe,
			"<" => Tk::RedirIn,
			">" => Tk::RedirOut,
			">>" => Tk::RedirAppend,
			"&" => Tk::Background,
			_ => unreachable!("operator pattern matched `{}`", op),
		}
	}
}

/// Splits a command line into words and the operators `|`, `<`, `>`, `>>` and `&`.
///
/// Quoted sections keep their whitespace and lose their quotes. A quote with no partner
/// is kept as a literal character.
pub fn tokenize(line: &str) -> Vec<Tk> {
	REGEX["token"]
		.captures_iter(line)
		.map(|caps| {
			if let Some(op) = caps.name("operator") {
				Tk::from_operator(op.as_str())
			} else {
				Tk::Word(unquote(&caps["word"]))
			}
		})
		.collect()
}

fn unquote(word: &str) -> String {
	REGEX["quoted"].replace_all(word, "${sng}${dub}").into_owned()
}
