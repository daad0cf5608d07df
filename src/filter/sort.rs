use crate::error::Error;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(Error::invalid_setting(
                "sort",
                other,
                "direction must be 'asc' or 'desc'",
            )),
        }
    }
}

/// The single active sort column
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortState {
    pub column: String,
    pub direction: SortDirection,
}

impl SortState {
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }

    /// Server ordering parameter: `-column` when descending, `column` otherwise.
    #[must_use]
    pub fn ordering(&self) -> String {
        match self.direction {
            SortDirection::Asc => self.column.clone(),
            SortDirection::Desc => format!("-{}", self.column),
        }
    }
}

impl fmt::Display for SortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.ordering())
    }
}

/// Accepts `column`, `-column`, `column:asc` and `column:desc`.
impl FromStr for SortState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (column, direction) = match s.split_once(':') {
            Some((column, direction)) => (column, direction.parse()?),
            None => s
                .strip_prefix('-')
                .map_or((s, SortDirection::Asc), |column| (column, SortDirection::Desc)),
        };
        if column.is_empty() {
            return Err(Error::invalid_setting("sort", s, "missing column name"));
        }
        Ok(Self::new(column, direction))
    }
}
