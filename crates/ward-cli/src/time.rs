//! Wall-clock rendering of time codes.
//!
//! A time code counts minutes since 2000-01-01 00:00. Code 0 means "unset",
//! so that instant itself cannot be booked.

use chrono::{DateTime, NaiveDateTime};
use ward_core::appointment::TimeCode;

const FORMAT: &str = "%Y-%m-%d %H:%M";

/// Minutes between the Unix epoch and 2000-01-01 00:00.
const EPOCH_MINUTES: i64 = 10_957 * 24 * 60;

/// Accept either `YYYY-MM-DD HH:MM` or a raw positive time code.
pub fn parse_time(input: &str) -> Result<TimeCode, String> {
  let input = input.trim();
  if let Ok(code) = input.parse::<u32>() {
    return if code == 0 {
      Err("time code 0 means unset".to_string())
    } else {
      Ok(TimeCode::new(code))
    };
  }

  let at = NaiveDateTime::parse_from_str(input, FORMAT)
    .map_err(|_| format!("expected `YYYY-MM-DD HH:MM` or a time code, got {input:?}"))?;
  let minutes = at.and_utc().timestamp().div_euclid(60) - EPOCH_MINUTES;
  match u32::try_from(minutes) {
    Ok(code) if code > 0 => Ok(TimeCode::new(code)),
    _ => Err(format!("{input} is outside the bookable range")),
  }
}

pub fn format_time(time: TimeCode) -> String {
  if !time.is_set() {
    return "-".to_string();
  }
  let seconds = (i64::from(time.get()) + EPOCH_MINUTES) * 60;
  match DateTime::from_timestamp(seconds, 0) {
    Some(at) => format!("{} ({})", at.format(FORMAT), time),
    None => format!("({time})"),
  }
}
