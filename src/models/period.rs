use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Inclusive range of fiscal years, e.g. one administration's term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Period {
    pub first: i32,
    pub last: i32,
}

impl Period {
    /// A range given in either order is normalized to `first <= last`.
    pub fn new(a: i32, b: i32) -> Self {
        Self {
            first: a.min(b),
            last: a.max(b),
        }
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.first..=self.last).contains(&year)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.first == self.last {
            write!(f, "{}", self.first)
        } else {
            write!(f, "{}-{}", self.first, self.last)
        }
    }
}

impl FromStr for Period {
    type Err = String;

    /// Accepts `113` or `105-112`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |part: &str| {
            part.trim()
                .parse::<i32>()
                .map_err(|_| format!("Invalid period: {}", s))
        };
        match s.split_once('-') {
            Some((a, b)) => Ok(Self::new(parse(a)?, parse(b)?)),
            None => parse(s).map(|y| Self::new(y, y)),
        }
    }
}
