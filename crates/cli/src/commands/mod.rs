pub(crate) mod compliance;
pub(crate) mod density;
pub(crate) mod roster;
pub(crate) mod status;

use std::future::Future;
use std::process;

use cadence_source::SourceError;
use serde::Serialize;
use time::{Date, OffsetDateTime};

use crate::{report_error, Context};

/// Run a record fetch to completion, exiting with the error on failure.
pub(crate) fn fetch<T>(ctx: &Context, future: impl Future<Output = Result<T, SourceError>>) -> T {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            let msg = format!("failed to start runtime: {}", e);
            report_error(&msg, ctx.output, ctx.quiet);
            process::exit(1);
        }
    };
    match runtime.block_on(future) {
        Ok(value) => value,
        Err(e) => {
            report_error(&e.to_string(), ctx.output, ctx.quiet);
            process::exit(1);
        }
    }
}

/// Today in the reference offset.
pub(crate) fn today(ctx: &Context) -> Date {
    cadence_engine::clock::today_in(OffsetDateTime::now_utc(), ctx.tz)
}

pub(crate) fn print_json(value: &impl Serialize) {
    let pretty = serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("serialization error: {}", e));
    println!("{}", pretty);
}
