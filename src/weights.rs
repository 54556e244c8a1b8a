//! Weight Computer (spec.md §4.5). Two-pass algorithm computing per-backend
//! traffic weights when multiple backends share a path.

use std::collections::BTreeMap;

/// One rule sharing a path, as seen by the weight computer. `weight`/`noop_count`
/// are written by `compute`; callers read them back after the call.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightEntry {
    pub service_name: String,
    pub weight: f64,
    pub noop_count: u32,
}

impl WeightEntry {
    pub fn new(service_name: impl Into<String>) -> Self {
        WeightEntry {
            service_name: service_name.into(),
            weight: 0.0,
            noop_count: 0,
        }
    }
}

/// Mutates `rules` in place per spec.md §4.5. `rules` must already be grouped
/// to a single path, in declaration order.
pub fn compute(backend_weights: &BTreeMap<String, f64>, rules: &mut [WeightEntry]) {
    // Pass 1.
    let mut sum = 0.0_f64;
    let mut count = 0_u32;
    let mut weights_count = 0_u32;
    let mut last_active: Option<usize> = None;

    for (i, rule) in rules.iter().enumerate() {
        match backend_weights.get(&rule.service_name) {
            Some(w) => {
                sum += w;
                if *w != 0.0 {
                    weights_count += 1;
                    last_active = Some(i);
                }
            }
            None => count += 1,
        }
    }

    // Pass 2.
    for (i, rule) in rules.iter_mut().enumerate() {
        match backend_weights.get(&rule.service_name) {
            Some(w) => {
                if Some(i) == last_active {
                    rule.weight = 1.0;
                    continue;
                }
                rule.weight = if sum > 0.0 { w / sum } else { 0.0 };
                sum -= w;
                if weights_count > 2 {
                    rule.noop_count = weights_count - 2;
                    weights_count -= 1;
                }
            }
            None => {
                if sum == 0.0 && count > 0 {
                    rule.weight = 1.0 / count as f64;
                }
                count -= 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entries(names: &[&str]) -> Vec<WeightEntry> {
        names.iter().map(|n| WeightEntry::new(*n)).collect()
    }

    #[test]
    fn s4_four_weighted_backends() {
        let mut rules = entries(&["foo", "bar", "baz", "qux"]);
        let weights = BTreeMap::from([
            ("foo".to_string(), 25.0),
            ("bar".to_string(), 45.0),
            ("baz".to_string(), 3.0),
            ("qux".to_string(), 27.0),
        ]);
        compute(&weights, &mut rules);
        let got: Vec<(f64, u32)> = rules.iter().map(|r| (r.weight, r.noop_count)).collect();
        assert_eq!(got, vec![(0.25, 2), (0.6, 1), (0.1, 0), (1.0, 0)]);
    }

    #[test]
    fn unweighted_equal_split() {
        // Equal shares under the sequential Traffic() chain semantics: each
        // rule takes 1/remaining of what's left, so an even 3-way split
        // renders as 1/3, 1/2, 1.0 rather than a flat 1/3 each.
        let mut rules = entries(&["a", "b", "c"]);
        compute(&BTreeMap::new(), &mut rules);
        let got: Vec<f64> = rules.iter().map(|r| r.weight).collect();
        assert_eq!(got, vec![1.0 / 3.0, 1.0 / 2.0, 1.0]);
    }

    #[test]
    fn single_weighted_backend_gets_full_weight() {
        let mut rules = entries(&["only"]);
        let weights = BTreeMap::from([("only".to_string(), 7.0)]);
        compute(&weights, &mut rules);
        assert_eq!(rules[0].weight, 1.0);
    }

    #[test]
    fn all_zero_weights_weighted_get_zero_unweighted_splits() {
        let mut rules = entries(&["w1", "w2", "u1", "u2"]);
        let weights = BTreeMap::from([("w1".to_string(), 0.0), ("w2".to_string(), 0.0)]);
        compute(&weights, &mut rules);
        assert_eq!(rules[0].weight, 0.0);
        assert_eq!(rules[1].weight, 0.0);
        assert_eq!(rules[2].weight, 0.5);
        assert_eq!(rules[3].weight, 1.0);
    }
}
