// src/extract/period.rs
// Guesses the reporting period (year and quarter) a dataset covers from its
// filename, so the candidate list is easier to scan.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

static YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:19[5-9]\d|20[0-2]\d)").expect("valid year pattern"));

static QUARTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Quarter[_\s](\d)|Q(\d)").expect("valid quarter pattern")
});

/// Year and quarter found in a filename. Either part may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Period {
    pub year: Option<String>,
    pub quarter: Option<String>,
}

/// First plausible year (1950-2029) and first quarter marker in `filename`.
pub fn period_of(filename: &str) -> Period {
    let year = YEAR.find(filename).map(|m| m.as_str().to_string());
    let quarter = QUARTER.captures(filename).and_then(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|d| format!("Q{}", d.as_str()))
    });
    Period { year, quarter }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            self.year.as_deref().unwrap_or("."),
            self.quarter.as_deref().unwrap_or(".")
        )
    }
}
