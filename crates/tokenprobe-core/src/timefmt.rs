use chrono::{DateTime, Duration, Local, SecondsFormat, TimeZone, Utc};

pub fn format_timestamp(value: DateTime<Utc>) -> String {
    value
        .with_timezone(&Local)
        .to_rfc3339_opts(SecondsFormat::Secs, false)
}

pub fn timestamp_from_epoch(seconds: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(seconds, 0).single()
}

/// Renders a duration rounded to whole seconds, e.g. `35s`, `1m5s`, `-10s`.
pub fn format_duration(value: Duration) -> String {
    let millis = value.num_milliseconds();
    let rounded = if millis >= 0 {
        (millis + 500) / 1000
    } else {
        (millis - 500) / 1000
    };
    if rounded == 0 {
        return "0s".to_string();
    }
    let sign = if rounded < 0 { "-" } else { "" };
    let total = rounded.unsigned_abs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{sign}{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{sign}{minutes}m{seconds}s")
    } else {
        format!("{sign}{seconds}s")
    }
}

/// Renders an elapsed time rounded to milliseconds, e.g. `87ms`, `1.25s`.
pub fn format_elapsed(value: std::time::Duration) -> String {
    let millis = (value.as_micros() + 500) / 1000;
    if millis < 1000 {
        return format!("{millis}ms");
    }
    if millis >= 60_000 {
        return format_duration(Duration::milliseconds(millis as i64));
    }
    let whole = millis / 1000;
    let fraction = millis % 1000;
    if fraction == 0 {
        return format!("{whole}s");
    }
    let fraction = format!("{fraction:03}");
    format!("{whole}.{}s", fraction.trim_end_matches('0'))
}
