use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use tracing::{debug, info_span, warn};

use exposure_cli::logging::redact_value;
use exposure_cli::pipeline::{
    RowFormat, compute, event_duration, ingest, load_timelines, write_rows,
};
use exposure_ingest::{ColumnNames, OutputOptions};
use exposure_timeline::{ErrorPolicy, SplitMode, TimelineOptions};

use crate::cli::{ColumnArgs, CumulativeArgs, FormatArg, ModeArg, TimelineArgs};
use crate::summary::{print_timelines, write_rows_table};
use crate::types::CumulativeOutcome;

pub fn run_cumulative(args: &CumulativeArgs) -> Result<CumulativeOutcome> {
    let mode = split_mode(args.mode);
    let span = info_span!("cumulative", mode = %mode);
    let _guard = span.enter();

    let event_duration = event_duration(args.duration.duration, args.duration.units)?;
    let columns = column_names(&args.columns);
    let input = ingest(&args.events, &args.queries, &columns)?;
    let entity_count = input
        .events
        .iter()
        .map(|event| event.entity.as_str())
        .collect::<BTreeSet<_>>()
        .len();

    let on_error = if args.skip_invalid {
        ErrorPolicy::Skip
    } else {
        ErrorPolicy::Halt
    };
    let options = TimelineOptions::new()
        .with_mode(mode)
        .with_error_policy(on_error);
    let result = compute(&input, event_duration, options)?;

    let mut rejected = Vec::with_capacity(result.rejected.len());
    for error in &result.rejected {
        let patient = error
            .index()
            .and_then(|index| input.queries.get(index))
            .map_or("-", |query| query.entity.as_str());
        warn!(patient_id = %redact_value(patient), error = %error, "query skipped");
        rejected.push(error.to_string());
    }

    let output_options = OutputOptions::new().with_timedelta(args.include_timedelta);
    let mut writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("create {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };
    match args.format {
        FormatArg::Csv => write_rows(&mut writer, &result.rows, RowFormat::Csv, output_options)?,
        FormatArg::Json => {
            write_rows(&mut writer, &result.rows, RowFormat::Json, output_options)?;
            writeln!(writer).context("write output")?;
        }
        FormatArg::Table => write_rows_table(&mut writer, &result.rows, args.include_timedelta)
            .context("write table")?,
    }
    writer.flush().context("flush output")?;
    debug!(row_count = result.rows.len(), "output written");

    Ok(CumulativeOutcome {
        rows: result.rows,
        rejected,
        output: args.output.clone(),
        event_count: input.events.len(),
        entity_count,
    })
}

pub fn run_timeline(args: &TimelineArgs) -> Result<()> {
    let span = info_span!("timeline");
    let _guard = span.enter();

    let event_duration = event_duration(args.duration.duration, args.duration.units)?;
    let columns = ColumnNames::new()
        .with_patient(&args.patient_col)
        .with_event_datetime(&args.event_col);
    let timelines = load_timelines(&args.events, &columns, event_duration)?;
    for (patient, store) in timelines.iter() {
        debug!(
            patient_id = %redact_value(patient),
            interval_count = store.len(),
            "timeline"
        );
    }
    print_timelines(&timelines);
    Ok(())
}

fn split_mode(mode: ModeArg) -> SplitMode {
    match mode {
        ModeArg::Exposure => SplitMode::Exposure,
        ModeArg::TreatmentCourse => SplitMode::TreatmentCourse,
    }
}

fn column_names(args: &ColumnArgs) -> ColumnNames {
    ColumnNames::new()
        .with_patient(&args.patient_col)
        .with_event_datetime(&args.event_col)
        .with_start(&args.start_col)
        .with_when(&args.when_col)
}
