//! Group-by over labelled records.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// How the values of one measure are folded within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reducer {
    Sum,
    Mean,
    Min,
    Max,
    Count,
}

/// Order of the groups in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupOrder {
    /// Order in which each label first appears in the input.
    #[default]
    FirstSeen,
    /// Lexicographic by label.
    Label,
}

/// A numeric column to reduce per group.
pub struct Measure<'a, R> {
    pub name: &'a str,
    pub value: fn(&R) -> f64,
    pub reducer: Reducer,
}

impl<'a, R> Measure<'a, R> {
    pub fn new(name: &'a str, value: fn(&R) -> f64, reducer: Reducer) -> Self {
        Self {
            name,
            value,
            reducer,
        }
    }

    pub fn sum(name: &'a str, value: fn(&R) -> f64) -> Self {
        Self::new(name, value, Reducer::Sum)
    }
}

/// One group of an aggregation: its label and the reduced measures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub label: String,
    /// Number of input records that fell into this group.
    pub rows: usize,
    pub measures: BTreeMap<String, f64>,
}

impl CategoryRecord {
    pub fn measure(&self, name: &str) -> Option<f64> {
        self.measures.get(name).copied()
    }
}

#[derive(Debug, Clone, Copy)]
struct Accumulator {
    sum: f64,
    min: f64,
    max: f64,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self {
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl Accumulator {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    fn finish(&self, reducer: Reducer, rows: usize) -> f64 {
        match reducer {
            Reducer::Sum => self.sum,
            Reducer::Mean => self.sum / rows as f64,
            Reducer::Min => self.min,
            Reducer::Max => self.max,
            Reducer::Count => rows as f64,
        }
    }
}

/// Groups `records` by `group_key` and reduces every measure within each group.
///
/// Groups are never empty, so every reducer is well defined.
pub fn aggregate_by_category<R, K>(
    records: &[R],
    group_key: K,
    measures: &[Measure<'_, R>],
    order: GroupOrder,
) -> Vec<CategoryRecord>
where
    K: Fn(&R) -> &str,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, usize, Vec<Accumulator>)> = Vec::new();

    for record in records {
        let label = group_key(record);
        let slot = *index.entry(label).or_insert_with(|| {
            groups.push((label, 0, vec![Accumulator::default(); measures.len()]));
            groups.len() - 1
        });

        let (_, rows, accumulators) = &mut groups[slot];
        *rows += 1;
        for (acc, measure) in accumulators.iter_mut().zip(measures) {
            acc.push((measure.value)(record));
        }
    }

    let mut output: Vec<CategoryRecord> = groups
        .into_iter()
        .map(|(label, rows, accumulators)| CategoryRecord {
            label: label.to_string(),
            rows,
            measures: measures
                .iter()
                .zip(&accumulators)
                .map(|(m, acc)| (m.name.to_string(), acc.finish(m.reducer, rows)))
                .collect(),
        })
        .collect();

    if order == GroupOrder::Label {
        output.sort_by(|a, b| a.label.cmp(&b.label));
    }
    output
}

/// Sum of one measure across every group.
pub fn total(groups: &[CategoryRecord], measure: &str) -> f64 {
    groups.iter().filter_map(|g| g.measure(measure)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Order {
        status: &'static str,
        orders: f64,
    }

    fn orders() -> Vec<Order> {
        vec![
            Order { status: "Delivered", orders: 450.0 },
            Order { status: "In Transit", orders: 120.0 },
            Order { status: "Cancelled", orders: 30.0 },
        ]
    }

    fn by_status(order: &Order) -> &str {
        order.status
    }

    #[test]
    fn totals_do_not_depend_on_grouping_order() {
        let measures = [Measure::sum("orders", |o: &Order| o.orders)];
        let first_seen = aggregate_by_category(&orders(), by_status, &measures, GroupOrder::FirstSeen);
        let by_label = aggregate_by_category(&orders(), by_status, &measures, GroupOrder::Label);

        assert_eq!(total(&first_seen, "orders"), 600.0);
        assert_eq!(total(&by_label, "orders"), 600.0);

        let labels: Vec<&str> = first_seen.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["Delivered", "In Transit", "Cancelled"]);
        let labels: Vec<&str> = by_label.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["Cancelled", "Delivered", "In Transit"]);
    }

    #[test]
    fn repeated_labels_are_reduced_together() {
        let mut records = orders();
        records.push(Order { status: "Delivered", orders: 50.0 });
        records.push(Order { status: "Cancelled", orders: 10.0 });

        let measures = [
            Measure::sum("total", |o: &Order| o.orders),
            Measure::new("mean", |o: &Order| o.orders, Reducer::Mean),
            Measure::new("min", |o: &Order| o.orders, Reducer::Min),
            Measure::new("max", |o: &Order| o.orders, Reducer::Max),
            Measure::new("n", |o: &Order| o.orders, Reducer::Count),
        ];
        let groups = aggregate_by_category(&records, by_status, &measures, GroupOrder::FirstSeen);
        assert_eq!(groups.len(), 3);

        let delivered = &groups[0];
        assert_eq!(delivered.rows, 2);
        assert_eq!(delivered.measure("total"), Some(500.0));
        assert_eq!(delivered.measure("mean"), Some(250.0));
        assert_eq!(delivered.measure("min"), Some(50.0));
        assert_eq!(delivered.measure("max"), Some(450.0));
        assert_eq!(delivered.measure("n"), Some(2.0));
        assert_eq!(delivered.measure("missing"), None);
    }

    #[test]
    fn no_records_means_no_groups() {
        let measures = [Measure::sum("orders", |o: &Order| o.orders)];
        let none: Vec<Order> = Vec::new();
        let groups = aggregate_by_category(&none, by_status, &measures, GroupOrder::FirstSeen);
        assert!(groups.is_empty());
    }
}
