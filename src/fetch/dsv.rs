//! Delimited text parsing with per-field type inference.

use std::sync::{Arc, LazyLock};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use regex::Regex;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

static DECIMAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?$").expect("valid decimal pattern")
});

static RADIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^0(?:[xX](?P<hex>[0-9a-fA-F]+)|[oO](?P<oct>[0-7]+)|[bB](?P<bin>[01]+))$")
        .expect("valid radix pattern")
});

static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<year>\d{4})(?:-(?P<month>\d{2})(?:-(?P<day>\d{2}))?)?(?:T(?P<hour>\d{2}):(?P<minute>\d{2})(?::(?P<second>\d{2})(?:\.(?P<millis>\d{3}))?)?(?P<zone>Z|[-+]\d{2}:\d{2})?)?$",
    )
    .expect("valid date pattern")
});

/// A typed field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    /// A date, or a date-time with an explicit offset.
    Date(DateTime<Utc>),
    /// A date-time without an offset, in the reader's local time.
    LocalDateTime(NaiveDateTime),
    String(String),
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

/// One row, with values in header order.
///
/// When the header repeats a name, the rightmost column wins.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Record {
    fn null(columns: &Arc<[String]>) -> Self {
        Self {
            columns: Arc::clone(columns),
            values: vec![Value::Null; columns.len()],
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        let index = self.columns.iter().rposition(|c| c == column)?;
        self.values.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (i, (column, value)) in self.iter().enumerate() {
            if self.columns[i + 1..].iter().any(|c| c == column) {
                continue;
            }
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Parsed rows together with the header's column order.
#[derive(Debug, Clone, PartialEq)]
pub struct DsvTable {
    pub columns: Arc<[String]>,
    pub rows: Vec<Record>,
}

impl DsvTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.rows.iter()
    }

    /// Values of one column, `Null` where a row lacks it.
    pub fn column<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.rows
            .iter()
            .map(move |row| row.get(name).unwrap_or(&Value::Null))
    }
}

impl Serialize for DsvTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.rows)
    }
}

/// Parses comma-separated text with a header row, typing each field with [`auto_type`].
///
/// Short rows are padded with `Null`; fields beyond the header are dropped.
/// Every blank line after the header is an all-`Null` row, except the single
/// line break that ends the text.
pub fn parse_csv(text: &str) -> Result<DsvTable, csv::Error> {
    let bytes = text.as_bytes();
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);

    let columns: Arc<[String]> = reader.headers()?.iter().map(str::to_string).collect();
    let mut consumed = offset(&reader);

    let mut rows = Vec::new();
    let mut record = csv::StringRecord::new();
    while reader.read_record(&mut record)? {
        let end = offset(&reader);
        let skipped = blank_lines(bytes, consumed, end);
        rows.extend((0..skipped).map(|_| Record::null(&columns)));
        consumed = end;

        let values = (0..columns.len())
            .map(|i| record.get(i).map_or(Value::Null, auto_type))
            .collect();
        rows.push(Record {
            columns: Arc::clone(&columns),
            values,
        });
    }
    if !columns.is_empty() {
        let trailing = blank_lines(bytes, consumed, bytes.len());
        rows.extend((0..trailing).map(|_| Record::null(&columns)));
    }

    Ok(DsvTable { columns, rows })
}

fn offset(reader: &csv::Reader<&[u8]>) -> usize {
    usize::try_from(reader.position().byte()).unwrap_or(usize::MAX)
}

/// Counts the empty lines the reader stepped over between `start` and `end`.
///
/// The reader stops right after the first byte of a record terminator, so a
/// `\n` following a consumed `\r` still belongs to the previous record.
fn blank_lines(bytes: &[u8], start: usize, end: usize) -> usize {
    let start = start.min(bytes.len());
    let end = end.clamp(start, bytes.len());
    let mut gap = bytes[start..end]
        .iter()
        .take_while(|b| matches!(b, b'\r' | b'\n'))
        .peekable();
    if start > 0 && bytes[start - 1] == b'\r' {
        gap.next_if_eq(&&b'\n');
    }

    let mut count = 0;
    while let Some(b) = gap.next() {
        if *b == b'\r' {
            gap.next_if_eq(&&b'\n');
        }
        count += 1;
    }
    count
}

/// Infers the type of a single field.
///
/// In order: empty is null, `true`/`false` are booleans, `NaN` and numeric
/// literals are numbers, ISO 8601 dates are dates, anything else is the
/// trimmed string.
pub fn auto_type(field: &str) -> Value {
    let value = field.trim();
    match value {
        "" => return Value::Null,
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        "NaN" => return Value::Number(f64::NAN),
        _ => {}
    }

    if let Some(number) = parse_number(value) {
        return Value::Number(number);
    }
    if let Some(date) = parse_date(value) {
        return date;
    }
    Value::String(value.to_string())
}

fn parse_number(value: &str) -> Option<f64> {
    match value {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }

    if DECIMAL.is_match(value) {
        return value.parse().ok();
    }

    let caps = RADIX.captures(value)?;
    let (digits, radix) = if let Some(hex) = caps.name("hex") {
        (hex.as_str(), 16)
    } else if let Some(oct) = caps.name("oct") {
        (oct.as_str(), 8)
    } else {
        (caps.name("bin")?.as_str(), 2)
    };
    digits.chars().try_fold(0.0, |acc, c| {
        c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
    })
}

fn parse_date(value: &str) -> Option<Value> {
    let caps = ISO_DATE.captures(value)?;
    let field = |name: &str, default: u32| -> Option<u32> {
        caps.name(name).map_or(Some(default), |m| m.as_str().parse().ok())
    };

    let year: i32 = caps.name("year")?.as_str().parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, field("month", 1)?, field("day", 1)?)?;
    let time = NaiveTime::from_hms_milli_opt(
        field("hour", 0)?,
        field("minute", 0)?,
        field("second", 0)?,
        field("millis", 0)?,
    )?;
    let naive = NaiveDateTime::new(date, time);

    let has_time = caps.name("hour").is_some();
    match caps.name("zone").map(|m| m.as_str()) {
        Some("Z") => Some(Value::Date(Utc.from_utc_datetime(&naive))),
        Some(zone) => {
            let offset = parse_offset(zone)?;
            let local = offset.from_local_datetime(&naive).single()?;
            Some(Value::Date(local.with_timezone(&Utc)))
        }
        None if has_time => Some(Value::LocalDateTime(naive)),
        None => Some(Value::Date(Utc.from_utc_datetime(&naive))),
    }
}

/// Parses `+HH:MM` / `-HH:MM`.
fn parse_offset(zone: &str) -> Option<FixedOffset> {
    let sign = if zone.starts_with('-') { -1 } else { 1 };
    let (hours, minutes) = zone.get(1..)?.split_once(':')?;
    let seconds = hours.parse::<i32>().ok()? * 3600 + minutes.parse::<i32>().ok()? * 60;
    FixedOffset::east_opt(sign * seconds)
}
