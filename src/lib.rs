use std::fmt;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

/// Path value meaning "use the standard input/output stream".
pub const STDIO: &str = "-";

pub const DEFAULT_TMPL_TOKEN: &str = ".tmpl";

/// Where data or template text is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Stdin,
    File(PathBuf),
}

impl Source {
    /// An empty argument or the `-` sentinel both mean stdin.
    pub fn from_arg(arg: &str) -> Source {
        if arg.is_empty() || arg == STDIO {
            Source::Stdin
        } else {
            Source::File(PathBuf::from(arg))
        }
    }

    pub fn read(&self) -> io::Result<Vec<u8>> {
        match self {
            Source::Stdin => {
                let mut buf = Vec::new();
                io::stdin().read_to_end(&mut buf)?;
                Ok(buf)
            }
            Source::File(path) => fs::read(path),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Stdin => write!(f, "<stdin>"),
            Source::File(path) => write!(f, "'{}'", path.display()),
        }
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct TemplateContext {
    pub data: Source,
    pub template_path: String,
    pub output_path: String,
    pub template_token: String,
    pub strict: bool,
}

pub mod cli;
pub mod error;
pub mod hbs;
pub mod json;
pub mod output;
pub mod paths;
