//! Arithmétique temporelle : (jour, "HH:MM") → instant, chevauchement, durée.
//!
//! Dates naïves locales uniquement, aucun fuseau horaire.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeError {
    #[error("invalid time format: {0:?} (expected HH:MM)")]
    InvalidTime(String),
    #[error("invalid date: {0:?} (expected YYYY-MM-DD)")]
    InvalidDate(String),
}

/// Parse "HH:MM" (24 h, zéro initial facultatif) en heure murale, secondes à zéro.
pub fn parse_time(raw: &str) -> Result<NaiveTime, TimeError> {
    let invalid = || TimeError::InvalidTime(raw.to_string());
    let (hh, mm) = raw.trim().split_once(':').ok_or_else(invalid)?;
    let number = |part: &str| -> Result<u32, TimeError> {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        part.parse().map_err(|_| invalid())
    };
    let (hh, mm) = (number(hh)?, number(mm)?);
    if hh > 23 || mm > 59 {
        return Err(invalid());
    }
    NaiveTime::from_hms_opt(hh, mm, 0).ok_or_else(invalid)
}

/// Combine un jour et une heure "HH:MM" en instant absolu.
pub fn to_instant(date: NaiveDate, time: &str) -> Result<NaiveDateTime, TimeError> {
    Ok(date.and_time(parse_time(time)?))
}

/// Forme canonique "HH:MM" (zéro initial) d'une heure valide.
pub fn canonical_time(raw: &str) -> Result<String, TimeError> {
    Ok(parse_time(raw)?.format("%H:%M").to_string())
}

/// Intervalles semi-ouverts : des bornes qui se touchent ne se chevauchent pas.
pub fn intervals_overlap<T: PartialOrd>(a_start: T, a_end: T, b_start: T, b_end: T) -> bool {
    a_start < b_end && b_start < a_end
}

/// Durée en heures (négative si les bornes sont inversées).
pub fn duration_hours(start: NaiveDateTime, end: NaiveDateTime) -> f64 {
    (end - start).num_milliseconds() as f64 / 3_600_000.0
}

/// Ramène une date (éventuellement horodatée) au jour calendaire.
///
/// Accepte `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM[:SS]` et RFC 3339.
pub fn parse_day(raw: &str) -> Result<NaiveDate, TimeError> {
    let raw = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(dt.date());
        }
    }
    Err(TimeError::InvalidDate(raw.to_string()))
}
