//! Index name templating.
//!
//! Renders the destination index name for one record from the configured
//! template, the stream name, precomputed current-time variables and the
//! values extracted through the index field mapping. Rendering failures are
//! fatal configuration errors for that record's index computation.

use std::collections::HashMap;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde_json::Value;
use tera::{Context, Tera};

use crate::error::SinkResult;
use crate::types::Document;

/// Daily index granularity, e.g. `2022.12.25`.
pub const DAILY_FORMAT: &str = "%Y.%m.%d";
/// Monthly index granularity, e.g. `2022.12`.
pub const MONTHLY_FORMAT: &str = "%Y.%m";
/// Yearly index granularity, e.g. `2022`.
pub const YEARLY_FORMAT: &str = "%Y";

/// Renders the destination index name for one record.
///
/// The template context contains `stream_name`, the precomputed
/// `current_timestamp_daily|monthly|yearly` variables and the
/// `to_daily`/`to_monthly`/`to_yearly` helper functions (called as
/// `{{ to_daily(date=timestamp) }}`). The `extra` fields are inserted last
/// so user-supplied values win on key collision.
///
/// The rendered name is lowercased, underscores become hyphens, and any
/// remaining character outside `[a-z0-9-]` is stripped.
pub fn template_index(stream_name: &str, index_format: &str, extra: &Document) -> SinkResult<String> {
    let today = Utc::now().date_naive();

    let mut context = Context::new();
    context.insert("stream_name", stream_name);
    context.insert(
        "current_timestamp_daily",
        &today.format(DAILY_FORMAT).to_string(),
    );
    context.insert(
        "current_timestamp_monthly",
        &today.format(MONTHLY_FORMAT).to_string(),
    );
    context.insert(
        "current_timestamp_yearly",
        &today.format(YEARLY_FORMAT).to_string(),
    );
    for (key, value) in extra {
        context.insert(key, value);
    }

    let mut tera = Tera::default();
    tera.register_function("to_daily", reformat_date_fn(DAILY_FORMAT));
    tera.register_function("to_monthly", reformat_date_fn(MONTHLY_FORMAT));
    tera.register_function("to_yearly", reformat_date_fn(YEARLY_FORMAT));
    tera.add_raw_template("index", index_format)?;

    let rendered = tera.render("index", &context)?;

    Ok(sanitize_index_name(&rendered))
}

/// Parses a free-form date string, accepting RFC 3339 plus the common
/// timestamp shapes seen in record fields.
fn parse_loose_date(input: &str) -> Result<NaiveDate, chrono::ParseError> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(input) {
        return Ok(datetime.date_naive());
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(datetime.date());
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(datetime.date());
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
}

/// Builds a tera function reformatting a date string argument to the given
/// granularity.
fn reformat_date_fn(
    format: &'static str,
) -> impl tera::Function + 'static {
    move |args: &HashMap<String, Value>| -> tera::Result<Value> {
        let date = args
            .get("date")
            .and_then(|value| value.as_str())
            .ok_or_else(|| tera::Error::msg("missing string argument `date`"))?;
        let parsed = parse_loose_date(date)
            .map_err(|err| tera::Error::msg(format!("unparsable date `{date}`: {err}")))?;
        Ok(Value::String(parsed.format(format).to_string()))
    }
}

fn sanitize_index_name(rendered: &str) -> String {
    static INVALID_CHARS: OnceLock<Regex> = OnceLock::new();
    let invalid_chars = INVALID_CHARS
        .get_or_init(|| Regex::new(r"[^a-z0-9-]+").expect("static pattern is valid"));

    let lowered = rendered.replace('_', "-").to_lowercase();
    invalid_chars.replace_all(&lowered, "").into_owned()
}
