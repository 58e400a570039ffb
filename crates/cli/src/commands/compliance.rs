use std::path::Path;

use cadence_engine::{classify_shifts, compliance_summary};
use cadence_source::{RecordSource, SnapshotSource, SourceError};

use super::{fetch, print_json};
use crate::{Context, OutputFormat};

pub(crate) fn cmd_compliance(snapshot: &Path, ctx: &Context) {
    let (shifts, policies) = fetch(ctx, async {
        let source = SnapshotSource::from_path(snapshot).await?;
        Ok::<_, SourceError>((source.shifts().await?, source.policies().await?))
    });

    let classified = classify_shifts(&shifts, &policies, ctx.tz);
    let summary = compliance_summary(&shifts, &policies, ctx.tz);

    match ctx.output {
        OutputFormat::Json => {
            print_json(&serde_json::json!({
                "shifts": classified,
                "summary": summary,
            }));
        }
        OutputFormat::Text => {
            for shift in &classified {
                match shift.result.late_by {
                    Some(late_by) => println!(
                        "{} {} {} by {}",
                        shift.entity_id, shift.subject_id, shift.result.status, late_by
                    ),
                    None => println!(
                        "{} {} {}",
                        shift.entity_id, shift.subject_id, shift.result.status
                    ),
                }
            }
            if ctx.quiet {
                return;
            }
            for (entity_id, tally) in &summary {
                println!(
                    "{}: {} shifts, {} on time, {} late ({}m), {} unknown",
                    entity_id,
                    tally.total(),
                    tally.on_time,
                    tally.late,
                    tally.late_minutes,
                    tally.unknown
                );
            }
        }
    }
}
