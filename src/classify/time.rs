use ::time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime,
    PrimitiveDateTime, UtcOffset,
};

/// Parse an ISO-8601 date or date-time and render it as UTC timestamp with milliseconds.
///
/// Date-times without an offset, and plain dates, are taken as UTC.
pub fn normalize_date(token: &str) -> Option<String> {
    let timestamp = if let Ok(timestamp) = OffsetDateTime::parse(token, &Rfc3339) {
        timestamp
    } else if let Ok(timestamp) = PrimitiveDateTime::parse(
        token,
        format_description!(
            "[year]-[month]-[day]T[hour]:[minute][optional [:[second][optional [.[subsecond]]]]]"
        ),
    ) {
        timestamp.assume_utc()
    } else if let Ok(date) = Date::parse(token, format_description!("[year]-[month]-[day]")) {
        date.midnight().assume_utc()
    } else {
        return None;
    };

    timestamp
        .to_offset(UtcOffset::UTC)
        .format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
        ))
        .ok()
}
