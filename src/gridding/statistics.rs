use itertools::{Itertools, MinMaxResult};

/// Summary of the finite values in a grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridStatistics {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64, // population standard deviation
}

impl GridStatistics {
    /// NaN and infinite entries are skipped; `None` if no finite value remains
    pub fn from_values(values: &[f64]) -> Option<GridStatistics> {
        let values = finite(values);
        let (min, max) = match values.iter().copied().minmax_by(|a, b| a.total_cmp(b)) {
            MinMaxResult::NoElements => return None,
            MinMaxResult::OneElement(x) => (x, x),
            MinMaxResult::MinMax(lo, hi) => (lo, hi),
        };

        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;

        Some(GridStatistics {
            count,
            min,
            max,
            mean,
            std_dev: variance.sqrt(),
        })
    }
}

/// Equal-width histogram of the finite values; the last bin includes its right edge
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn from_values(values: &[f64], bins: usize) -> Option<Histogram> {
        if bins == 0 {
            return None;
        }
        let values = finite(values);
        let (mut lo, mut hi) = match values.iter().copied().minmax_by(|a, b| a.total_cmp(b)) {
            MinMaxResult::NoElements => return None,
            MinMaxResult::OneElement(x) => (x, x),
            MinMaxResult::MinMax(lo, hi) => (lo, hi),
        };
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bins as f64;
        let edges: Vec<f64> = (0..=bins).map(|i| lo + i as f64 * width).collect();
        let mut counts = vec![0; bins];
        for &v in values.iter() {
            let bin = (((v - lo) / width).floor() as usize).min(bins - 1);
            counts[bin] += 1;
        }
        Some(Histogram { edges, counts })
    }

    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    /// Bins as (left edge, right edge, count)
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64, usize)> + '_ {
        self.edges
            .iter()
            .tuple_windows()
            .zip(self.counts.iter())
            .map(|((&left, &right), &count)| (left, right, count))
    }
}

fn finite(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| v.is_finite()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn summary() {
        let stats = GridStatistics::from_values(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(stats.count, 8);
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 9.0);
        assert_abs_diff_eq!(stats.mean, 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(stats.std_dev, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn single_and_empty() {
        let stats = GridStatistics::from_values(&[-3.0]).unwrap();
        assert_eq!((stats.min, stats.max, stats.std_dev), (-3.0, -3.0, 0.0));
        assert!(GridStatistics::from_values(&[]).is_none());
    }

    #[test]
    fn histogram_counts() {
        let hist = Histogram::from_values(&[0.0, 1.0, 2.0, 3.0, 4.0, 10.0], 5).unwrap();
        assert_eq!(hist.bins(), 5);
        assert_eq!(hist.edges, vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(hist.counts, vec![2, 2, 1, 0, 1]);
        assert_eq!(hist.counts.iter().sum::<usize>(), 6);

        let (left, right, count) = hist.iter().next().unwrap();
        assert_eq!((left, right, count), (0.0, 2.0, 2));
    }

    #[test]
    fn non_finite_values_are_skipped() {
        let values = [1.0, f64::NAN, 3.0, f64::INFINITY, f64::NEG_INFINITY];
        let stats = GridStatistics::from_values(&values).unwrap();
        assert_eq!(stats.count, 2);
        assert_eq!((stats.min, stats.max, stats.mean), (1.0, 3.0, 2.0));

        let hist = Histogram::from_values(&values, 2).unwrap();
        assert_eq!(hist.edges, vec![1.0, 2.0, 3.0]);
        assert_eq!(hist.counts, vec![1, 1]);

        assert!(GridStatistics::from_values(&[f64::NAN]).is_none());
        assert!(Histogram::from_values(&[f64::NAN, f64::INFINITY], 4).is_none());
    }

    #[test]
    fn histogram_of_constant_values() {
        let hist = Histogram::from_values(&[7.0; 4], 2).unwrap();
        assert_eq!(hist.edges, vec![6.5, 7.0, 7.5]);
        assert_eq!(hist.counts, vec![0, 4]);
        assert!(Histogram::from_values(&[1.0], 0).is_none());
        assert!(Histogram::from_values(&[], 10).is_none());
    }
}
