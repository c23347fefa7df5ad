// src/common/duration.rs

// Durações no formato "2h", "1h30m", "45s", "1.5h" (mesma gramática usada pelo
// frontend para o campo snoozed_until).

use chrono::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DurationError {
    #[error("duração vazia")]
    Empty,
    #[error("número ausente em '{0}'")]
    MissingNumber(String),
    #[error("unidade ausente em '{0}'")]
    MissingUnit(String),
    #[error("unidade desconhecida '{0}'")]
    UnknownUnit(String),
    #[error("duração fora do intervalo")]
    Overflow,
}

fn unit_nanos(unit: &str) -> Option<f64> {
    let nanos = match unit {
        "ns" => 1.0,
        "us" | "µs" | "μs" => 1_000.0,
        "ms" => 1_000_000.0,
        "s" => 1_000_000_000.0,
        "m" => 60.0 * 1_000_000_000.0,
        "h" => 3_600.0 * 1_000_000_000.0,
        _ => return None,
    };
    Some(nanos)
}

pub fn parse_duration(input: &str) -> Result<Duration, DurationError> {
    let raw = input.trim();
    if raw.is_empty() {
        return Err(DurationError::Empty);
    }

    let (negative, mut rest) = match raw.as_bytes()[0] {
        b'-' => (true, &raw[1..]),
        b'+' => (false, &raw[1..]),
        _ => (false, raw),
    };

    // "0" sozinho é válido e não precisa de unidade
    if rest == "0" {
        return Ok(Duration::zero());
    }
    if rest.is_empty() {
        return Err(DurationError::MissingNumber(raw.to_string()));
    }

    let mut total_nanos = 0f64;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let number = &rest[..number_len];
        if number.is_empty() || number == "." {
            return Err(DurationError::MissingNumber(raw.to_string()));
        }
        let value: f64 = number
            .parse()
            .map_err(|_| DurationError::MissingNumber(raw.to_string()))?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit = &rest[..unit_len];
        if unit.is_empty() {
            return Err(DurationError::MissingUnit(raw.to_string()));
        }
        let scale = unit_nanos(unit).ok_or_else(|| DurationError::UnknownUnit(unit.to_string()))?;
        rest = &rest[unit_len..];

        total_nanos += value * scale;
    }

    if !total_nanos.is_finite() || total_nanos > i64::MAX as f64 {
        return Err(DurationError::Overflow);
    }
    let nanos = total_nanos.round() as i64;
    Ok(Duration::nanoseconds(if negative { -nanos } else { nanos }))
}
