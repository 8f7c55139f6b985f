//! Validation of the source API's JSON body.
//!
//! The source reports `tps` and `mspt` either as JSON numbers or as numeric
//! strings, and `lastUpdated` as a timestamp string. A payload becomes a
//! [`Sample`] only if all three parse; there is no partial sample.

use crate::InvalidPayload;
use chrono::{
    DateTime,
    NaiveDate,
    NaiveDateTime,
    SubsecRound,
    Utc,
};
use serde_json::Value;
use tps_history_store::Sample;

pub const TPS: &str = "tps";
pub const MSPT: &str = "mspt";
pub const LAST_UPDATED: &str = "lastUpdated";

// Accepted in addition to RFC 3339 and RFC 2822, read as UTC.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];
const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_sample(payload: &Value) -> Result<Sample, InvalidPayload> {
    let object = payload
        .as_object()
        .ok_or_else(|| InvalidPayload::NotAnObject(payload.to_string()))?;

    let tps = parse_number(TPS, object.get(TPS))?;
    let mspt = parse_number(MSPT, object.get(MSPT))?;
    // Stored with millisecond precision
    let record_timestamp = parse_timestamp(LAST_UPDATED, object.get(LAST_UPDATED))?.trunc_subsecs(3);

    Ok(Sample {
        record_timestamp,
        tps,
        mspt,
    })
}

fn parse_number(field: &'static str, value: Option<&Value>) -> Result<f64, InvalidPayload> {
    let not_a_number = |value: &Value| InvalidPayload::NotANumber {
        field,
        value: value.to_string(),
    };

    let parsed = match value {
        None | Some(Value::Null) => return Err(InvalidPayload::Missing { field }),
        Some(value @ Value::Number(number)) => number.as_f64().ok_or_else(|| not_a_number(value))?,
        Some(value @ Value::String(raw)) => raw.trim().parse::<f64>().map_err(|_| not_a_number(value))?,
        Some(value) => return Err(not_a_number(value)),
    };

    if parsed.is_finite() {
        Ok(parsed)
    } else {
        Err(InvalidPayload::NotANumber {
            field,
            value: parsed.to_string(),
        })
    }
}

fn parse_timestamp(field: &'static str, value: Option<&Value>) -> Result<DateTime<Utc>, InvalidPayload> {
    let not_a_timestamp = |value: &Value| InvalidPayload::NotATimestamp {
        field,
        value: value.to_string(),
    };

    match value {
        None | Some(Value::Null) => Err(InvalidPayload::Missing { field }),
        Some(value @ Value::String(raw)) => parse_timestamp_str(raw.trim()).ok_or_else(|| not_a_timestamp(value)),
        // Epoch milliseconds
        Some(value @ Value::Number(number)) => number
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .ok_or_else(|| not_a_timestamp(value)),
        Some(value) => Err(not_a_timestamp(value)),
    }
}

fn parse_timestamp_str(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw).or_else(|_| DateTime::parse_from_rfc2822(raw)) {
        return Some(ts.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{
        TimeDelta,
        TimeZone,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn five_past_midnight() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 5).unwrap()
    }

    #[test]
    fn numeric_strings() {
        let sample = parse_sample(&json!({
            "tps": "19.98",
            "mspt": "2.1",
            "lastUpdated": "2024-01-01T00:00:05Z",
        }))
        .unwrap();

        assert_eq!(
            sample,
            Sample {
                record_timestamp: five_past_midnight(),
                tps: 19.98,
                mspt: 2.1,
            }
        );
    }

    #[test]
    fn plain_numbers_and_extra_fields() {
        let sample = parse_sample(&json!({
            "tps": 20,
            "mspt": 0.75,
            "lastUpdated": "2024-01-01T00:00:05Z",
            "players": 12,
        }))
        .unwrap();

        assert_eq!(sample.tps, 20.0);
        assert_eq!(sample.mspt, 0.75);
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let sample = parse_sample(&json!({
            "tps": " 18.5 ",
            "mspt": "3\n",
            "lastUpdated": " 2024-01-01T00:00:05Z ",
        }))
        .unwrap();

        assert_eq!(sample.tps, 18.5);
        assert_eq!(sample.mspt, 3.0);
    }

    #[test]
    fn timestamp_forms() {
        let with_offset = json!({"tps": 1, "mspt": 1, "lastUpdated": "2024-01-01T02:00:05+02:00"});
        assert_eq!(parse_sample(&with_offset).unwrap().record_timestamp, five_past_midnight());

        let naive = json!({"tps": 1, "mspt": 1, "lastUpdated": "2024-01-01 00:00:05"});
        assert_eq!(parse_sample(&naive).unwrap().record_timestamp, five_past_midnight());

        let naive_t = json!({"tps": 1, "mspt": 1, "lastUpdated": "2024-01-01T00:00:05.250"});
        assert_eq!(
            parse_sample(&naive_t).unwrap().record_timestamp,
            five_past_midnight() + TimeDelta::milliseconds(250)
        );

        let epoch_millis = json!({"tps": 1, "mspt": 1, "lastUpdated": 1_704_067_205_000_i64});
        assert_eq!(parse_sample(&epoch_millis).unwrap().record_timestamp, five_past_midnight());

        let utc_string = json!({"tps": 1, "mspt": 1, "lastUpdated": "Mon, 01 Jan 2024 00:00:05 GMT"});
        assert_eq!(parse_sample(&utc_string).unwrap().record_timestamp, five_past_midnight());

        let midnight = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let whole_minute = json!({"tps": 1, "mspt": 1, "lastUpdated": "2024-01-01T00:00"});
        assert_eq!(parse_sample(&whole_minute).unwrap().record_timestamp, midnight);

        let date_only = json!({"tps": 1, "mspt": 1, "lastUpdated": "2024-01-01"});
        assert_eq!(parse_sample(&date_only).unwrap().record_timestamp, midnight);
    }

    #[test]
    fn sub_millisecond_precision_is_truncated() {
        let sample = parse_sample(&json!({
            "tps": 20,
            "mspt": 1,
            "lastUpdated": "2024-01-01T00:00:05.123456789Z",
        }))
        .unwrap();

        assert_eq!(sample.record_timestamp, five_past_midnight() + TimeDelta::milliseconds(123));
        assert_eq!(sample.record_timestamp.timestamp_subsec_nanos(), 123_000_000);
    }

    #[test]
    fn nan_tps_is_rejected() {
        let err = parse_sample(&json!({
            "tps": "NaN",
            "mspt": "2.1",
            "lastUpdated": "2024-01-01T00:00:05Z",
        }))
        .unwrap_err();

        assert_eq!(
            err,
            InvalidPayload::NotANumber {
                field: TPS,
                value: "NaN".to_string(),
            }
        );
    }

    #[test]
    fn infinity_is_rejected() {
        let err = parse_sample(&json!({"tps": "20", "mspt": "inf", "lastUpdated": "2024-01-01T00:00:05Z"})).unwrap_err();
        assert!(matches!(err, InvalidPayload::NotANumber { field: MSPT, .. }), "{err:?}");
    }

    #[test]
    fn garbage_numbers_are_rejected() {
        for tps in [json!("fast"), json!(""), json!("19.98abc"), json!(true), json!([20]), json!({"v": 20})] {
            let err = parse_sample(&json!({"tps": tps, "mspt": 1, "lastUpdated": "2024-01-01T00:00:05Z"})).unwrap_err();
            assert!(matches!(err, InvalidPayload::NotANumber { field: TPS, .. }), "{tps}: {err:?}");
        }
    }

    #[test]
    fn missing_or_null_fields_are_rejected() {
        let err = parse_sample(&json!({"tps": 20, "lastUpdated": "2024-01-01T00:00:05Z"})).unwrap_err();
        assert_eq!(err, InvalidPayload::Missing { field: MSPT });

        let err = parse_sample(&json!({"tps": 20, "mspt": 1, "lastUpdated": null})).unwrap_err();
        assert_eq!(err, InvalidPayload::Missing { field: LAST_UPDATED });
    }

    #[test]
    fn bad_timestamps_are_rejected() {
        for last_updated in [json!("yesterday"), json!("2024-13-01T00:00:00Z"), json!(""), json!(false)] {
            let err = parse_sample(&json!({"tps": 20, "mspt": 1, "lastUpdated": last_updated})).unwrap_err();
            assert!(
                matches!(err, InvalidPayload::NotATimestamp { field: LAST_UPDATED, .. }),
                "{last_updated}: {err:?}"
            );
        }
    }

    #[test]
    fn non_objects_are_rejected() {
        assert!(matches!(
            parse_sample(&json!([1, 2, 3])),
            Err(InvalidPayload::NotAnObject(_))
        ));
        assert!(matches!(parse_sample(&json!("20")), Err(InvalidPayload::NotAnObject(_))));
    }
}
