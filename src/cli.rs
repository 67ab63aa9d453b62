use std::io::{self, Write};

use clap::{crate_version, CommandFactory, Parser};
use log::warn;

use crate::error::ConfigError;
use crate::{Source, TemplateContext, DEFAULT_TMPL_TOKEN};

const AFTER_HELP: &str = "Examples:
  [...] | uhandles <json-data-file> | [...]
  uhandles -d data.json -t templates/ -o rendered/

NOTE: You cannot specify \"-\"/stdin as a source for both template and data.";

#[derive(Parser, Debug)]
#[clap(
    name = "uhandles",
    about = "Command line tool to render 'Handlebars' templates with values from a JSON file.",
    version = crate_version!(),
    after_help = AFTER_HELP
)]
pub struct Opts {
    /// JSON data file containing substitution values (file path or "-" for stdin)
    #[clap(short, long, env = "UHANDLES_DATA", value_name = "FILE|-")]
    pub data: Option<String>,

    /// Handlebars template file to render, or directory of template files [default: "-", stdin]
    #[clap(short, long, env = "UHANDLES_TEMPLATE", value_name = "FILE|DIR|-")]
    pub template: Option<String>,

    /// File to concat rendered templates to, or directory to place rendered templates within [default: "-", stdout]
    #[clap(short, long, env = "UHANDLES_OUTPUT", value_name = "FILE|DIR|-")]
    pub output: Option<String>,

    /// Token to use to detect template files in input-directory mode [default: ".tmpl"]
    #[clap(long, env = "UHANDLES_TMPL_TOKEN", value_name = "TOKEN")]
    pub tmpl_token: Option<String>,

    /// Fail on references to missing fields instead of rendering them empty
    #[clap(short, long, env = "UHANDLES_STRICT")]
    pub strict: bool,

    /// Log what is being read, rendered and written to stderr
    #[clap(short, long, env = "UHANDLES_VERBOSE")]
    pub verbose: bool,

    /// JSON data file, when not given with -d|--data
    #[clap(value_name = "JSON_DATA_FILE")]
    pub args: Vec<String>,
}

/// What the resolved command line asks for.
#[derive(Debug)]
pub enum Invocation {
    Usage,
    Render(TemplateContext),
}

impl Opts {
    /// Applies defaults and the positional data fallback. `bare` is true when
    /// the program was started without any arguments.
    pub fn resolve(self, bare: bool) -> Result<Invocation, ConfigError> {
        let data = non_empty(self.data);
        let template = non_empty(self.template);
        let output = non_empty(self.output);

        if bare && data.is_none() && template.is_none() && output.is_none() {
            return Ok(Invocation::Usage);
        }

        let data = match data {
            Some(data) => {
                if !self.args.is_empty() {
                    warn!("Ignoring positional arguments {:?}, data file is {}", self.args, data);
                }
                data
            }
            None if self.args.len() == 1 => self.args.into_iter().next().unwrap_or_default(),
            None => return Err(ConfigError::MissingData),
        };

        let data = Source::from_arg(&data);
        let template_path = template.unwrap_or_default();
        if data == Source::Stdin && Source::from_arg(&template_path) == Source::Stdin {
            return Err(ConfigError::StdinConflict);
        }

        Ok(Invocation::Render(TemplateContext {
            data,
            template_path,
            output_path: output.unwrap_or_default(),
            template_token: non_empty(self.tmpl_token)
                .unwrap_or_else(|| DEFAULT_TMPL_TOKEN.to_string()),
            strict: self.strict,
        }))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

pub fn usage<W: Write>(out: &mut W) -> io::Result<()> {
    Opts::command().write_help(out)?;
    writeln!(out)
}
