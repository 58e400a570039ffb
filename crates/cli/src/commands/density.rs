use std::path::Path;

use cadence_engine::{density_report, peak_windows_by, TimestampedRecord};
use cadence_source::{RecordSource, SnapshotSource, SourceError};

use super::{fetch, print_json};
use crate::{Context, OutputFormat, RecordKind};

pub(crate) fn cmd_density(
    snapshot: &Path,
    group_by: Option<&str>,
    window: Option<usize>,
    kind: RecordKind,
    ctx: &Context,
) {
    let records = fetch(ctx, async {
        let source = SnapshotSource::from_path(snapshot).await?;
        let records: Vec<TimestampedRecord> = match kind {
            RecordKind::Sales => source.sales().await?,
            RecordKind::Shifts => source
                .shifts()
                .await?
                .iter()
                .map(TimestampedRecord::from)
                .collect(),
        };
        Ok::<_, SourceError>(records)
    });
    let window_slots = window.unwrap_or(ctx.settings.density.window_slots);

    if let Some(attribute) = group_by {
        let peaks = peak_windows_by(&records, ctx.tz, attribute, window_slots);
        match ctx.output {
            OutputFormat::Json => print_json(&peaks),
            OutputFormat::Text => {
                if peaks.is_empty() && !ctx.quiet {
                    println!("no records carry '{}'", attribute);
                }
                for (group, peak) in &peaks {
                    println!("{} {} ({} records)", group, peak.label(), peak.sum);
                }
            }
        }
        return;
    }

    let report = density_report(&records, ctx.tz, window_slots);
    match ctx.output {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Text => {
            for segment in &report.segments {
                println!(
                    "{} {} {}",
                    segment.label(),
                    segment.tier,
                    segment.total_count
                );
            }
            if ctx.quiet {
                return;
            }
            println!(
                "peak: {} ({} records)",
                report.peak.label(),
                report.peak.sum
            );
            println!(
                "total: {} records, amount {}",
                report.total_count, report.total_amount
            );
        }
    }
}
