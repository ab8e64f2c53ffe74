//! `evdash`, terminal dashboard for electric vehicles telemetry.
//!

use std::io;

use clap::{crate_authors, crate_description, crate_version, CommandFactory, Parser};
use clap_complete::generate;
use eyre::Result;
use tracing::{info, trace};

use evdashctl::{
    init_runtime, resolve_one, run_dashboard, show_vehicles, Context, Opts, SubCommand,
};

/// Binary name, using a different binary name
pub const NAME: &str = env!("CARGO_BIN_NAME");
/// Binary version
pub const VERSION: &str = crate_version!();
/// Authors
pub const AUTHORS: &str = crate_authors!();

#[tokio::main]
async fn main() -> Result<()> {
    let opts = Opts::parse();

    // These two do not need anything else
    //
    match &opts.subcmd {
        // NOTE: you can generate UNIX shells completion on Windows and vice-versa.  Not worth
        //       trying to limit depending on the OS.
        //
        SubCommand::Completion(copts) => {
            let generator = copts.shell;
            generate(generator, &mut Opts::command(), NAME, &mut io::stdout());
            return Ok(());
        }
        SubCommand::Version => {
            println!("{}", version());
            println!("Modules: ");
            println!("\t{}", evdash_common::version());
            return Ok(());
        }
        _ => (),
    }

    let ctx = init_runtime(NAME, &opts)?;

    // Banner
    //
    if opts.verbose > 0 {
        banner()?;
    }

    handle_subcmd(&ctx, &opts.subcmd).await?;
    ctx.finish()
}

pub async fn handle_subcmd(ctx: &Context, subcmd: &SubCommand) -> Result<()> {
    match subcmd {
        // Handle `vehicles`
        //
        SubCommand::Vehicles(vopts) => {
            trace!("vehicles");

            show_vehicles(ctx, vopts, &mut io::stdout()).await?;
        }

        // Handle `dashboard`
        //
        SubCommand::Dashboard(dopts) => {
            trace!("dashboard");

            let stdin = io::stdin();
            let mut stdout = io::stdout();
            run_dashboard(ctx, dopts, stdin.lock(), &mut stdout).await?;
            info!("dashboard closed");
        }

        // Handle `resolve lat lon`
        //
        SubCommand::Resolve(ropts) => {
            trace!("resolve");

            println!("{}", resolve_one(ctx, ropts).await?);
        }

        // Already done
        //
        SubCommand::Completion(_) | SubCommand::Version => (),
    }
    Ok(())
}

/// Return our version number
///
#[inline]
pub fn version() -> String {
    format!("{}/{}", NAME, VERSION)
}

/// Display banner
///
fn banner() -> Result<()> {
    Ok(eprintln!(
        r##"
{}/{} by {}
{}
"##,
        NAME,
        VERSION,
        AUTHORS,
        crate_description!()
    ))
}
