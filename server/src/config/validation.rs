//! Setting value validation.

use std::net::IpAddr;

use chrono_tz::Tz;

/// Validate a setting value. Returns `Ok(())` if valid, or an error message.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        "SERVER_HOST" => {
            value
                .parse::<IpAddr>()
                .map_err(|_| "must be an IP address")?;
        }
        "SERVER_PORT" => validate_int_range(value, 1, 65535)?,
        "DITHER_LEVELS" => validate_int_range(value, 2, 256)?,
        "TIMEZONE" => {
            value
                .parse::<Tz>()
                .map_err(|_| format!("unknown timezone '{value}'"))?;
        }
        "MAX_UPLOAD_MB" => validate_int_range(value, 1, 200)?,
        _ => {}
    }
    Ok(())
}

fn validate_int_range(value: &str, min: i64, max: i64) -> Result<(), String> {
    let v: i64 = value.parse().map_err(|_| "must be an integer")?;
    if !(min..=max).contains(&v) {
        return Err(format!("must be between {min} and {max}"));
    }
    Ok(())
}
