//! UTC datetimes and temporal intervals.

use chrono::{DateTime, NaiveDate, Utc};

/// A temporal interval, where `None` is an open bound.
pub type Interval = [Option<DateTime<Utc>>; 2];

/// Parses a UTC-based ISO 8601 datetime.
///
/// STAC datetimes are always in UTC, so the only offsets accepted are `Z`
/// and `±00:00`. A missing offset is treated as UTC. Anything else is `None`.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use stac_entity::datetime::iso_to_date;
///
/// assert_eq!(
///     iso_to_date("2020-01-01T12:13:14Z"),
///     Some(Utc.with_ymd_and_hms(2020, 1, 1, 12, 13, 14).unwrap())
/// );
/// assert!(iso_to_date("2020-01-01T12:13:14.5+07:00").is_none());
/// assert!(iso_to_date("2020-01-01").is_none());
/// ```
pub fn iso_to_date(s: &str) -> Option<DateTime<Utc>> {
    if s.len() < 10 {
        return None;
    }
    let (negative, rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let year_end = rest.find(|c: char| !c.is_ascii_digit())?;
    if year_end == 0 {
        return None;
    }
    let year: i32 = rest[..year_end].parse().ok()?;
    let year = if negative { -year } else { year };
    let rest = expect(&rest[year_end..], &['-'])?;
    let (month, rest) = two_digits(rest)?;
    let rest = expect(rest, &['-'])?;
    let (day, rest) = two_digits(rest)?;
    let rest = expect(rest, &['T', 't', ' '])?;
    let (hour, rest) = two_digits(rest)?;
    let rest = expect(rest, &[':'])?;
    let (minute, rest) = two_digits(rest)?;
    let rest = expect(rest, &[':'])?;
    let (second, rest) = two_digits(rest)?;
    let (nanos, rest) = match rest.strip_prefix('.') {
        Some(rest) => fraction(rest),
        None => (0, rest),
    };
    if !matches!(rest, "" | "Z" | "z" | "+00:00" | "-00:00") {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)?
        .and_hms_nano_opt(hour, minute, second, nanos)
        .map(|datetime| datetime.and_utc())
}

/// Computes the datetime halfway between two datetimes.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use stac_entity::datetime::center_date_time;
///
/// let start = Utc.with_ymd_and_hms(2022, 2, 1, 0, 0, 0).unwrap();
/// let end = Utc.with_ymd_and_hms(2022, 2, 3, 0, 0, 0).unwrap();
/// assert_eq!(center_date_time(start, end), Utc.with_ymd_and_hms(2022, 2, 2, 0, 0, 0).unwrap());
/// ```
pub fn center_date_time(start: DateTime<Utc>, end: DateTime<Utc>) -> DateTime<Utc> {
    start + (end - start) / 2
}

/// Computes a single interval covering all of the given intervals.
///
/// An open bound in any interval makes that bound of the union open.
/// Returns `None` if there are no intervals.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use stac_entity::datetime::union_date_time;
///
/// let day = |d| Some(Utc.with_ymd_and_hms(2022, 2, d, 0, 0, 0).unwrap());
/// assert_eq!(union_date_time(&[[day(1), day(3)], [day(2), day(4)]]), Some([day(1), day(4)]));
/// assert_eq!(union_date_time(&[[day(2), day(3)], [None, day(4)]]), Some([None, day(4)]));
/// assert_eq!(union_date_time(&[]), None);
/// ```
pub fn union_date_time(intervals: &[Interval]) -> Option<Interval> {
    let (first, rest) = intervals.split_first()?;
    let mut union = *first;
    for [start, end] in rest {
        union[0] = match (union[0], start) {
            (Some(a), Some(b)) => Some(a.min(*b)),
            _ => None,
        };
        union[1] = match (union[1], end) {
            (Some(a), Some(b)) => Some(a.max(*b)),
            _ => None,
        };
    }
    Some(union)
}

fn expect<'a>(s: &'a str, allowed: &[char]) -> Option<&'a str> {
    let c = s.chars().next()?;
    if allowed.contains(&c) {
        Some(&s[c.len_utf8()..])
    } else {
        None
    }
}

fn two_digits(s: &str) -> Option<(u32, &str)> {
    let digits = s.get(..2)?;
    if digits.bytes().all(|b| b.is_ascii_digit()) {
        Some((digits.parse().ok()?, &s[2..]))
    } else {
        None
    }
}

fn fraction(s: &str) -> (u32, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (digits, rest) = s.split_at(end);
    let nanos = digits
        .bytes()
        .take(9)
        .chain(std::iter::repeat(b'0'))
        .take(9)
        .fold(0, |nanos, b| nanos * 10 + u32::from(b - b'0'));
    (nanos, rest)
}
