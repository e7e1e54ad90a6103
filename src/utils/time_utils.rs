use chrono::{Local, NaiveDateTime};
use std::time::Duration;

/// Timestamp layout used in output file names, e.g. `20260206_201530`.
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Returns the current local time formatted for output file names.
pub fn file_timestamp() -> String
{
	format_file_timestamp(&Local::now().naive_local())
}

/// Format a timestamp for output file names.
pub fn format_file_timestamp(datetime: &NaiveDateTime) -> String
{
	datetime.format(FILE_TIMESTAMP_FORMAT).to_string()
}

/// Format an elapsed duration for the run summary.
pub fn format_duration(elapsed: Duration) -> String
{
	let secs: f64 = elapsed.as_secs_f64();
	if secs < 60.0
	{
		format!("{:.2}s", secs)
	}
	else
	{
		let whole: u64 = elapsed.as_secs();
		format!("{}m {:02}s", whole / 60, whole % 60)
	}
}
