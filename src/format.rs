//! Number formatting for labels.

/// Ordinal suffix picked from the last digit alone.
///
/// Unlike [`english_suffix`] there is no teens exception, so `11` gives
/// `"st"`. Chart labels have always been produced this way; use
/// [`english_suffix`] where grammatical ordinals are needed.
pub fn suffixer(integer: i64) -> &'static str {
    match integer % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

/// Grammatical English ordinal suffix: 11, 12 and 13 take `"th"`.
pub fn english_suffix(integer: i64) -> &'static str {
    let n = integer.unsigned_abs();
    if (11..=13).contains(&(n % 100)) {
        return "th";
    }
    match n % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

/// `integer` followed by its [`suffixer`] suffix, e.g. `21st`.
pub fn ordinal(integer: i64) -> String {
    format!("{integer}{}", suffixer(integer))
}
