//! Row filters applied before plotting
//!
//! A `ConditioningSet` holds at most one predicate per variable. Continuous
//! variables are conditioned on a closed interval and discrete variables on a
//! single category code. A row passes when every predicate holds; a missing
//! value in any conditioning column fails the row.

use std::fmt;

use serde::{Deserialize, Serialize};
use tetplot_data::{TabularData, Variable, VariableKind};
use tetplot_stats::{non_missing, ntile_interval, ntile_name, SummaryStats, StatsError};
use tracing::debug;

use crate::error::{PlotError, PlotResult};

/// What a single condition tests
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Predicate {
    /// `low <= value <= high`
    Interval { low: f64, high: f64 },
    /// `value == code`
    Category { code: i32 },
}

impl Predicate {
    /// The variable kind this predicate applies to
    pub fn kind(&self) -> VariableKind {
        match self {
            Predicate::Interval { .. } => VariableKind::Continuous,
            Predicate::Category { .. } => VariableKind::Discrete,
        }
    }
}

/// How a continuous condition's interval was chosen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContinuousRule {
    /// Explicit bounds
    Range { low: f64, high: f64 },
    /// `[mean, max]`
    AboveAverage,
    /// `[min, mean]`
    BelowAverage,
    /// Bucket `index` (1-based) of `ntile` equal-sized buckets
    Ntile { ntile: usize, index: usize },
}

impl ContinuousRule {
    /// Resolve the rule to `(low, high)` over a sample
    pub fn resolve(&self, sample: &[f64]) -> Result<(f64, f64), StatsError> {
        match *self {
            ContinuousRule::Range { low, high } => Ok((low, high)),
            ContinuousRule::AboveAverage => {
                let stats = summarize(sample)?;
                Ok((stats.mean, stats.max))
            }
            ContinuousRule::BelowAverage => {
                let stats = summarize(sample)?;
                Ok((stats.min, stats.mean))
            }
            ContinuousRule::Ntile { ntile, index } => ntile_interval(sample, ntile, index),
        }
    }
}

fn summarize(sample: &[f64]) -> Result<SummaryStats, StatsError> {
    let stats = SummaryStats::from_data(sample);
    if stats.is_empty() {
        Err(StatsError::EmptySample)
    } else {
        Ok(stats)
    }
}

/// One entry of a conditioning set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub variable: String,
    pub predicate: Predicate,
    /// Human-readable summary, e.g. "x = Above Average"
    pub label: String,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Ordered set of conditions, one per variable
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditioningSet {
    conditions: Vec<Condition>,
}

impl ConditioningSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Condition a continuous variable on `[low, high]`
    pub fn add_interval(
        &mut self,
        data: &dyn TabularData,
        variable: &str,
        low: f64,
        high: f64,
    ) -> PlotResult<()> {
        self.add_continuous(data, variable, ContinuousRule::Range { low, high })
    }

    /// Condition a continuous variable on an interval chosen by `rule`
    pub fn add_continuous(
        &mut self,
        data: &dyn TabularData,
        variable: &str,
        rule: ContinuousRule,
    ) -> PlotResult<()> {
        self.check_new(data, variable, VariableKind::Continuous)?;
        let sample = non_missing(&data.continuous_column(variable)?);

        let (low, high) = rule.resolve(&sample).map_err(|e| PlotError::InvalidCondition {
            variable: variable.to_string(),
            message: e.to_string(),
        })?;
        if !(low.is_finite() && high.is_finite()) {
            return Err(invalid(variable, "bounds must be finite"));
        }
        if matches!(rule, ContinuousRule::Range { .. }) && low >= high {
            return Err(invalid(variable, "Low >= high."));
        }
        if low > high {
            return Err(invalid(variable, "Low > high."));
        }

        let label = match rule {
            ContinuousRule::Range { .. } => format!("{} = ({:.4}, {:.4})", variable, low, high),
            ContinuousRule::AboveAverage => format!("{} = Above Average", variable),
            ContinuousRule::BelowAverage => format!("{} = Below Average", variable),
            ContinuousRule::Ntile { ntile, index } => format!(
                "{} = {} {}",
                variable,
                ntile_name(ntile).unwrap_or("n-tile"),
                index
            ),
        };

        self.push(Condition {
            variable: variable.to_string(),
            predicate: Predicate::Interval { low, high },
            label,
        });
        Ok(())
    }

    /// Condition a discrete variable on a category code
    pub fn add_category(
        &mut self,
        data: &dyn TabularData,
        variable: &str,
        code: i32,
    ) -> PlotResult<()> {
        let var = self.check_new(data, variable, VariableKind::Discrete)?;
        let label = var
            .category_label(code)
            .map(|name| format!("{} = {}", variable, name))
            .ok_or_else(|| {
                invalid(
                    variable,
                    &format!("no category with code {} ({} categories)", code, var.categories.len()),
                )
            })?;

        self.push(Condition {
            variable: variable.to_string(),
            predicate: Predicate::Category { code },
            label,
        });
        Ok(())
    }

    /// Condition a discrete variable on a category label
    pub fn add_category_label(
        &mut self,
        data: &dyn TabularData,
        variable: &str,
        label: &str,
    ) -> PlotResult<()> {
        let var = lookup(data, variable)?;
        if !var.is_discrete() {
            return Err(PlotError::InvalidVariableKind {
                variable: variable.to_string(),
                expected: VariableKind::Discrete,
                actual: var.kind,
            });
        }
        let code = var
            .category_code(label)
            .ok_or_else(|| invalid(variable, &format!("unknown category '{}'", label)))?;
        self.add_category(data, variable, code)
    }

    /// Remove the condition on a variable; returns whether one existed
    pub fn remove(&mut self, variable: &str) -> bool {
        let before = self.conditions.len();
        self.conditions.retain(|c| c.variable != variable);
        let removed = self.conditions.len() != before;
        if removed {
            debug!(variable, remaining = self.conditions.len(), "removed condition");
        }
        removed
    }

    /// Drop every condition; returns how many there were
    pub fn clear(&mut self) -> usize {
        let removed = self.conditions.len();
        self.conditions.clear();
        if removed > 0 {
            debug!(removed, "cleared conditions");
        }
        removed
    }

    pub fn contains(&self, variable: &str) -> bool {
        self.conditions.iter().any(|c| c.variable == variable)
    }

    pub fn get(&self, variable: &str) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.variable == variable)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Condition> {
        self.conditions.iter()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Resolve variable names against a dataset
    ///
    /// Fails when a variable is absent or its kind no longer matches the
    /// predicate.
    pub fn bind<'a>(&self, data: &'a dyn TabularData) -> PlotResult<BoundConditions<'a>> {
        let mut bound = Vec::with_capacity(self.conditions.len());
        for condition in &self.conditions {
            let index = data
                .variable_index(&condition.variable)
                .ok_or_else(|| PlotError::VariableNotFound(condition.variable.clone()))?;
            let var = lookup(data, &condition.variable)?;
            let expected = condition.predicate.kind();
            if var.kind != expected {
                return Err(PlotError::InvalidVariableKind {
                    variable: condition.variable.clone(),
                    expected,
                    actual: var.kind,
                });
            }
            bound.push((index, condition.predicate));
        }
        Ok(BoundConditions {
            data,
            conditions: bound,
        })
    }

    /// Indices of rows passing every condition
    pub fn matching_rows(&self, data: &dyn TabularData) -> PlotResult<Vec<usize>> {
        let bound = self.bind(data)?;
        Ok((0..data.num_rows()).filter(|&r| bound.passes(r)).collect())
    }

    fn check_new<'d>(
        &self,
        data: &'d dyn TabularData,
        variable: &str,
        expected: VariableKind,
    ) -> PlotResult<&'d Variable> {
        if self.contains(variable) {
            return Err(PlotError::DuplicateCondition(variable.to_string()));
        }
        let var = lookup(data, variable)?;
        if var.kind != expected {
            return Err(PlotError::InvalidVariableKind {
                variable: variable.to_string(),
                expected,
                actual: var.kind,
            });
        }
        Ok(var)
    }

    fn push(&mut self, condition: Condition) {
        debug!(condition = %condition, "added condition");
        self.conditions.push(condition);
    }
}

/// Conditions with their column indices resolved
pub struct BoundConditions<'a> {
    data: &'a dyn TabularData,
    conditions: Vec<(usize, Predicate)>,
}

impl BoundConditions<'_> {
    /// Whether a row satisfies every condition
    pub fn passes(&self, row: usize) -> bool {
        self.conditions.iter().all(|&(column, predicate)| {
            if self.data.is_missing(row, column) {
                return false;
            }
            match predicate {
                Predicate::Interval { low, high } => {
                    let value = self.data.double(row, column);
                    value >= low && value <= high
                }
                Predicate::Category { code } => self.data.code(row, column) == Some(code),
            }
        })
    }
}

pub(crate) fn lookup<'d>(data: &'d dyn TabularData, variable: &str) -> PlotResult<&'d Variable> {
    data.variable_named(variable)
        .ok_or_else(|| PlotError::VariableNotFound(variable.to_string()))
}

fn invalid(variable: &str, message: &str) -> PlotError {
    PlotError::InvalidCondition {
        variable: variable.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tetplot_data::{DataSet, DISCRETE_MISSING};

    fn data() -> DataSet {
        DataSet::builder()
            .continuous("x", vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, f64::NAN])
            .continuous("y", vec![1.0; 8])
            .discrete(
                "g",
                ["lo", "hi"],
                vec![0, 0, 1, 1, 0, 1, DISCRETE_MISSING, 1],
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_interval_filter() {
        let data = data();
        let mut set = ConditioningSet::new();
        set.add_interval(&data, "x", 2.0, 4.0).unwrap();
        assert_eq!(set.matching_rows(&data).unwrap(), vec![1, 2, 3]);
        assert_eq!(set.get("x").unwrap().label, "x = (2.0000, 4.0000)");
    }

    #[test]
    fn test_category_filter_skips_missing() {
        let data = data();
        let mut set = ConditioningSet::new();
        set.add_category_label(&data, "g", "hi").unwrap();
        assert_eq!(set.matching_rows(&data).unwrap(), vec![2, 3, 5, 7]);
        assert_eq!(set.get("g").unwrap().label, "g = hi");
    }

    #[test]
    fn test_conditions_combine() {
        let data = data();
        let mut set = ConditioningSet::new();
        set.add_interval(&data, "x", 3.0, 10.0).unwrap();
        set.add_category(&data, "g", 1).unwrap();
        // Row 7 has g = hi but x missing.
        assert_eq!(set.matching_rows(&data).unwrap(), vec![2, 3, 5]);
    }

    #[test]
    fn test_average_rules() {
        let data = data();
        let mut above = ConditioningSet::new();
        above
            .add_continuous(&data, "x", ContinuousRule::AboveAverage)
            .unwrap();
        // Mean of 1..=7 is 4
        assert_eq!(
            above.get("x").unwrap().predicate,
            Predicate::Interval { low: 4.0, high: 7.0 }
        );

        let mut below = ConditioningSet::new();
        below
            .add_continuous(&data, "x", ContinuousRule::BelowAverage)
            .unwrap();
        assert_eq!(below.matching_rows(&data).unwrap(), vec![0, 1, 2, 3]);
        assert_eq!(below.get("x").unwrap().label, "x = Below Average");
    }

    #[test]
    fn test_ntile_rule() {
        let data = data();
        let mut set = ConditioningSet::new();
        set.add_continuous(&data, "x", ContinuousRule::Ntile { ntile: 2, index: 2 })
            .unwrap();
        assert_eq!(set.get("x").unwrap().label, "x = 2-tile 2");
        assert!(matches!(
            ConditioningSet::new().add_continuous(
                &data,
                "x",
                ContinuousRule::Ntile { ntile: 12, index: 1 }
            ),
            Err(PlotError::InvalidCondition { .. })
        ));
    }

    #[test]
    fn test_rejects_duplicates_and_bad_bounds() {
        let data = data();
        let mut set = ConditioningSet::new();
        set.add_interval(&data, "x", 1.0, 2.0).unwrap();
        assert!(matches!(
            set.add_interval(&data, "x", 3.0, 4.0),
            Err(PlotError::DuplicateCondition(_))
        ));
        assert!(matches!(
            set.add_interval(&data, "y", 2.0, 2.0),
            Err(PlotError::InvalidCondition { .. })
        ));
        assert!(matches!(
            set.add_interval(&data, "y", 0.0, f64::INFINITY),
            Err(PlotError::InvalidCondition { .. })
        ));
    }

    #[test]
    fn test_rejects_wrong_kind() {
        let data = data();
        let mut set = ConditioningSet::new();
        assert!(matches!(
            set.add_interval(&data, "g", 0.0, 1.0),
            Err(PlotError::InvalidVariableKind { .. })
        ));
        assert!(matches!(
            set.add_category(&data, "x", 0),
            Err(PlotError::InvalidVariableKind { .. })
        ));
        assert!(matches!(
            set.add_category(&data, "g", 5),
            Err(PlotError::InvalidCondition { .. })
        ));
        assert!(matches!(
            set.add_interval(&data, "missing", 0.0, 1.0),
            Err(PlotError::VariableNotFound(_))
        ));
        assert!(set.is_empty());
    }

    #[test]
    fn test_bind_against_other_dataset() {
        let data = data();
        let mut set = ConditioningSet::new();
        set.add_category(&data, "g", 0).unwrap();

        let other = DataSet::builder()
            .continuous("g", vec![0.0, 1.0])
            .build()
            .unwrap();
        assert!(matches!(
            set.matching_rows(&other),
            Err(PlotError::InvalidVariableKind { .. })
        ));
    }

    #[test]
    fn test_remove_and_clear() {
        let data = data();
        let mut set = ConditioningSet::new();
        set.add_interval(&data, "x", 1.0, 2.0).unwrap();
        set.add_category(&data, "g", 0).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.remove("x"));
        assert!(!set.remove("x"));
        assert_eq!(set.iter().count(), 1);
        assert_eq!(set.clear(), 1);
        assert!(set.is_empty());
        assert_eq!(set.clear(), 0);
        assert_eq!(set.matching_rows(&data).unwrap().len(), 8);
    }
}
