//! `permdoc check` - diagnose access to a path or command.

use anyhow::Result;
use permdoc::{AccessPolicy, AccessRequest, Diagnostics, SystemHost, TargetHint};
use tracing::debug;

use super::{expand, Context};
use crate::cli::args::CheckArgs;
use crate::education::Explain;
use crate::output::print_report;

pub fn execute(ctx: &Context, args: CheckArgs) -> Result<i32> {
    let hint = if args.command {
        Some(TargetHint::AsCommand)
    } else if args.path {
        Some(TargetHint::AsPath)
    } else {
        None
    };

    // Empty input is rejected before anything is expanded or inspected.
    let request = AccessRequest::new(args.target.as_str(), hint)?;
    let request = AccessRequest::new(expand(request.target())?, hint)?;

    if ctx.show_explanation() {
        Explain::check(request.target(), request.effective_hint()).print();
    }

    let options = ctx.config.engine_options()?;
    let policy = ctx.config.policy(options.platform);
    let host = SystemHost::new();
    debug!(?options, policy = policy.name(), "engine configured");

    let report = Diagnostics::new(&host, &policy)
        .with_options(options)
        .diagnose(&request);

    print_report(&report, ctx.output_format)?;
    Ok(report.exit_code())
}
