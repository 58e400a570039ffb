use std::path::Path;

use cadence_engine::clock::format_day;
use cadence_engine::{last_change, status_calendar, StatusAction, StatusEvent};
use cadence_source::{RecordSource, SnapshotSource};
use time::format_description::well_known::Rfc3339;
use time::Date;

use super::{fetch, print_json, today};
use crate::{Context, OutputFormat};

pub(crate) fn cmd_status(
    snapshot: &Path,
    entity_id: &str,
    range: Option<(Date, Date)>,
    ctx: &Context,
) {
    let entity = fetch(ctx, async {
        let source = SnapshotSource::from_path(snapshot).await?;
        source.entity(entity_id).await
    });

    let (from, to) = range.unwrap_or_else(|| {
        let day = today(ctx);
        (day, day)
    });
    let days = status_calendar(&entity, from, to, ctx.tz);
    let changed = last_change(&entity);

    match ctx.output {
        OutputFormat::Json => {
            print_json(&serde_json::json!({
                "entity_id": entity.id,
                "current_status": entity.current_status,
                "days": days,
                "last_change": changed.map(|event| serde_json::json!({
                    "action": event.action,
                    "occurred_at": format_instant(event),
                    "actor": event.actor,
                })),
            }));
        }
        OutputFormat::Text => {
            for row in &days {
                println!("{} {} {}", entity.id, format_day(row.day), row.status);
            }
            if ctx.quiet {
                return;
            }
            match changed {
                Some(event) => {
                    let actor = if event.actor.is_empty() {
                        "unknown"
                    } else {
                        event.actor.as_str()
                    };
                    println!(
                        "last change: {} by {} at {}",
                        action_label(event.action),
                        actor,
                        format_instant(event)
                    );
                }
                None => println!("last change: none recorded"),
            }
        }
    }
}

fn format_instant(event: &StatusEvent) -> String {
    event
        .occurred_at
        .format(&Rfc3339)
        .unwrap_or_else(|_| event.occurred_at.to_string())
}

fn action_label(action: StatusAction) -> &'static str {
    match action {
        StatusAction::Activated => "activated",
        StatusAction::Deactivated => "deactivated",
    }
}
