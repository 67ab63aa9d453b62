use std::io;
use std::process;

use anyhow::Error;
use clap::Parser;
use log::debug;

use uhandles::cli::{usage, Invocation, Opts};
use uhandles::error::ConfigError;
use uhandles::hbs;

fn init_logger(verbose: bool) {
    env_logger::Builder::new()
        .filter_level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .parse_default_env()
        .init();
}

fn fail(e: Error) -> ! {
    eprintln!("{:#}", e);
    if e.downcast_ref::<ConfigError>().is_some() {
        let _ = usage(&mut io::stderr());
    }
    process::exit(1)
}

fn main() {
    let bare = std::env::args_os().len() <= 1;
    let opts: Opts = Opts::parse();
    init_logger(opts.verbose);

    let ctx = match opts.resolve(bare) {
        Ok(Invocation::Usage) => {
            if let Err(e) = usage(&mut io::stdout()) {
                fail(e.into())
            }
            return;
        }
        Ok(Invocation::Render(ctx)) => ctx,
        Err(e) => fail(e.into()),
    };
    debug!("{:?}", ctx);

    if let Err(e) = hbs::run(&ctx) {
        fail(e)
    }
}
