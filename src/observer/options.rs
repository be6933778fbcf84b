use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::indicator::IndicatorKind;
use crate::targets::ScheduleOptions;

/// Which non-dominated solutions are written to the archive file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LogNondominated {
    /// No archive file.
    None,
    /// Every solution at the time it enters the archive.
    #[default]
    All,
    /// The final archive, once, at teardown.
    Final,
}

/// Whether decision vectors are written next to the objectives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LogVariables {
    /// Objectives only.
    Never,
    /// Only for problems with at most [`LogVariables::LOW_DIMENSION`] variables.
    #[default]
    LowDim,
    /// Always.
    Always,
}

impl LogVariables {
    /// Largest dimension logged under [`LogVariables::LowDim`].
    pub const LOW_DIMENSION: usize = 5;

    /// Whether variables are logged for a problem of `dimension`.
    #[must_use]
    pub fn applies_to(self, dimension: usize) -> bool {
        match self {
            LogVariables::Never => false,
            LogVariables::LowDim => dimension <= Self::LOW_DIMENSION,
            LogVariables::Always => true,
        }
    }
}

impl fmt::Display for LogNondominated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogNondominated::None => "none",
            LogNondominated::All => "all",
            LogNondominated::Final => "final",
        })
    }
}

impl FromStr for LogNondominated {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(LogNondominated::None),
            "all" => Ok(LogNondominated::All),
            "final" => Ok(LogNondominated::Final),
            other => Err(invalid("log_nondominated", format!("expected none, all or final, got '{other}'"))),
        }
    }
}

impl fmt::Display for LogVariables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogVariables::Never => "none",
            LogVariables::LowDim => "low_dim",
            LogVariables::Always => "all",
        })
    }
}

impl FromStr for LogVariables {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(LogVariables::Never),
            "low_dim" => Ok(LogVariables::LowDim),
            "all" => Ok(LogVariables::Always),
            other => Err(invalid(
                "log_decision_variables",
                format!("expected none, low_dim or all, got '{other}'"),
            )),
        }
    }
}

/// Settings shared by every logger an [`Observer`](super::Observer) creates.
///
/// Parsed from the whitespace-separated `key: value` form used on the
/// command line of benchmark drivers:
///
/// ```
/// use biobj_logger::observer::{LogNondominated, LogVariables, ObserverOptions};
///
/// let options: ObserverOptions =
///     "log_nondominated: final log_decision_variables: all precision_f: 10"
///         .parse()
///         .unwrap();
/// assert_eq!(options.log_nondominated, LogNondominated::Final);
/// assert_eq!(options.log_variables, LogVariables::Always);
/// assert_eq!(options.precision_f, 10);
/// assert_eq!(options.precision_x, 8);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ObserverOptions {
    /// Archive file mode.
    pub log_nondominated: LogNondominated,
    /// Decision-variable logging.
    pub log_variables: LogVariables,
    /// Tracked indicators. Empty disables indicator logging.
    pub indicators: Vec<IndicatorKind>,
    /// Digits after the decimal point of decision variables.
    pub precision_x: usize,
    /// Digits after the decimal point of objective and indicator values.
    pub precision_f: usize,
    /// Periodic evaluation triggers of the indicator logs.
    pub schedule: ScheduleOptions,
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            log_nondominated: LogNondominated::All,
            log_variables: LogVariables::LowDim,
            indicators: vec![IndicatorKind::Hypervolume],
            precision_x: 8,
            precision_f: 15,
            schedule: ScheduleOptions::default(),
        }
    }
}

impl FromStr for ObserverOptions {
    type Err = Error;

    /// Starts from the defaults and applies every `key: value` pair.
    ///
    /// Recognized keys: `log_nondominated`, `log_decision_variables`,
    /// `compute_indicators` (`0` or `1`), `precision_x`, `precision_f`,
    /// `number_evaluation_triggers` and `base_evaluation_triggers`
    /// (comma-separated, e.g. `1,2,5`).
    fn from_str(s: &str) -> Result<Self> {
        let mut options = Self::default();
        let mut tokens = s.split_whitespace();
        while let Some(token) = tokens.next() {
            let Some(key) = token.strip_suffix(':') else {
                return Err(invalid(token, "expected 'key:' followed by a value".to_string()));
            };
            let value = tokens
                .next()
                .ok_or_else(|| invalid(key, "missing value".to_string()))?;
            options.apply(key, value)?;
        }
        Ok(options)
    }
}

impl ObserverOptions {
    fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "log_nondominated" => self.log_nondominated = value.parse()?,
            "log_decision_variables" => self.log_variables = value.parse()?,
            "compute_indicators" => {
                self.indicators = match value {
                    "0" => Vec::new(),
                    "1" => vec![IndicatorKind::Hypervolume],
                    other => return Err(invalid(key, format!("expected 0 or 1, got '{other}'"))),
                };
            }
            "precision_x" => self.precision_x = parse_number(key, value)?,
            "precision_f" => self.precision_f = parse_number(key, value)?,
            "number_evaluation_triggers" => self.schedule.per_decade = parse_number(key, value)?,
            "base_evaluation_triggers" => {
                self.schedule.base = value
                    .split(',')
                    .map(|b| parse_number(key, b))
                    .collect::<Result<_>>()?;
            }
            _ => return Err(invalid(key, "unknown option".to_string())),
        }
        Ok(())
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| invalid(key, format!("expected a non-negative integer, got '{value}'")))
}

fn invalid(key: &str, reason: String) -> Error {
    Error::InvalidOption {
        key: key.to_string(),
        reason,
    }
}
