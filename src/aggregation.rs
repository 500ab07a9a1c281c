// src/aggregation.rs

use std::collections::HashSet;

use strum_macros::{Display, EnumIter};

use crate::data_loader::is_missing;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, Display, PartialOrd, Ord)]
pub enum AggregationFunction {
    Count,
    UniqueCount,
    Sum,
    Mean,
    Min,
    Max,
}

impl AggregationFunction {
    /// `None` when the function does not apply to the column, e.g. a sum over
    /// text.
    pub fn apply(self, values: &[&str]) -> Option<String> {
        match self {
            AggregationFunction::Count => Some(values.len().to_string()),
            AggregationFunction::UniqueCount => {
                let unique_count = values.iter().collect::<HashSet<_>>().len();
                Some(unique_count.to_string())
            }
            AggregationFunction::Sum => {
                numbers(values).map(|nums| format_number(nums.iter().sum()))
            }
            AggregationFunction::Mean => numbers(values)
                .map(|nums| format_number(nums.iter().sum::<f64>() / nums.len() as f64)),
            AggregationFunction::Min => {
                numbers(values).map(|nums| format_number(nums.iter().copied().fold(f64::INFINITY, f64::min)))
            }
            AggregationFunction::Max => numbers(values)
                .map(|nums| format_number(nums.iter().copied().fold(f64::NEG_INFINITY, f64::max))),
        }
    }
}

// Every present cell must parse; missing cells are skipped.
fn numbers(values: &[&str]) -> Option<Vec<f64>> {
    let present: Vec<&str> = values.iter().copied().filter(|v| !is_missing(v)).collect();
    let parsed: Vec<f64> = present
        .iter()
        .filter_map(|v| v.trim().parse::<f64>().ok())
        .collect();

    if parsed.len() == present.len() && !parsed.is_empty() {
        Some(parsed)
    } else {
        None
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{:.3}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn numeric_aggregations_skip_missing_cells() {
        let values = ["39.5", "NA", "40.5", ""];
        assert_eq!(AggregationFunction::Count.apply(&values).as_deref(), Some("4"));
        assert_eq!(AggregationFunction::Sum.apply(&values).as_deref(), Some("80"));
        assert_eq!(AggregationFunction::Mean.apply(&values).as_deref(), Some("40"));
        assert_eq!(AggregationFunction::Min.apply(&values).as_deref(), Some("39.500"));
        assert_eq!(AggregationFunction::Max.apply(&values).as_deref(), Some("40.500"));
    }

    #[test]
    fn numeric_aggregations_reject_text() {
        let values = ["Adelie", "Gentoo", "Adelie"];
        assert_eq!(AggregationFunction::UniqueCount.apply(&values).as_deref(), Some("2"));
        for agg in [
            AggregationFunction::Sum,
            AggregationFunction::Mean,
            AggregationFunction::Min,
            AggregationFunction::Max,
        ] {
            assert_eq!(agg.apply(&values), None, "{agg}");
        }
    }

    #[test]
    fn empty_column() {
        let values: [&str; 0] = [];
        assert_eq!(AggregationFunction::Count.apply(&values).as_deref(), Some("0"));
        assert_eq!(AggregationFunction::Mean.apply(&values), None);
    }

    #[test]
    fn iteration_order_matches_declaration() {
        let names: Vec<String> = AggregationFunction::iter().map(|a| a.to_string()).collect();
        assert_eq!(names, ["Count", "UniqueCount", "Sum", "Mean", "Min", "Max"]);
    }
}
