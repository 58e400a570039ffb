use std::path::Path;

use cadence_engine::{active_roster, RosterSource};
use cadence_source::{RecordSource, SnapshotSource, SourceError};
use time::Date;

use super::{fetch, print_json, today};
use crate::{Context, OutputFormat};

pub(crate) fn cmd_roster(
    snapshot: &Path,
    today_override: Option<Date>,
    recent_dates: Option<usize>,
    ctx: &Context,
) {
    let (assignments, profiles) = fetch(ctx, async {
        let source = SnapshotSource::from_path(snapshot).await?;
        Ok::<_, SourceError>((source.assignments().await?, source.profiles().await?))
    });

    let mut policy = ctx.settings.roster_policy();
    if let Some(n) = recent_dates {
        policy.recent_dates = n;
    }
    let day = today_override.unwrap_or_else(|| today(ctx));
    let roster = active_roster(&assignments, &profiles, day, &policy);

    match ctx.output {
        OutputFormat::Json => print_json(&roster),
        OutputFormat::Text => {
            for (entity_id, entries) in &roster {
                println!("{}", entity_id);
                if entries.is_empty() && !ctx.quiet {
                    println!("  (nobody)");
                }
                for entry in entries {
                    let origin = match entry.source {
                        RosterSource::Schedule => format!("{} shifts", entry.shift_count),
                        RosterSource::Profile => "profile".to_string(),
                    };
                    println!(
                        "  {} {} {} ({})",
                        entry.subject_id,
                        entry.name.as_deref().unwrap_or("-"),
                        entry.role.as_deref().unwrap_or("-"),
                        origin
                    );
                }
            }
        }
    }
}
