//! Descriptive statistics and scales for chart layout
//!
//! Everything here ignores non-finite input and returns `None` (or an empty
//! result) for empty input, so layout code never has to guard against NaN.

/// One histogram bin covering `[x0, x1)` (the last bin also includes `x1`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    pub x0: f64,
    pub x1: f64,
    pub count: usize,
}

/// Copy of `values` without NaN or infinities
pub fn finite_values(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| v.is_finite()).collect()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    let finite = finite_values(values);
    if finite.is_empty() {
        return None;
    }
    Some(finite.iter().sum::<f64>() / finite.len() as f64)
}

pub fn median(values: &[f64]) -> Option<f64> {
    let mut sorted = finite_values(values);
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Minimum and maximum of the finite values
pub fn extent(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Count values into `bins` equal-width bins over `domain`.
///
/// Values outside the domain are dropped. A zero or inverted domain yields no
/// bins.
pub fn bin_counts(values: &[f64], domain: (f64, f64), bins: usize) -> Vec<Bin> {
    let (lo, hi) = domain;
    if bins == 0 || !(hi > lo) || !lo.is_finite() || !hi.is_finite() {
        return Vec::new();
    }
    let width = (hi - lo) / bins as f64;
    let mut out: Vec<Bin> = (0..bins)
        .map(|i| Bin {
            x0: lo + i as f64 * width,
            x1: if i + 1 == bins { hi } else { lo + (i + 1) as f64 * width },
            count: 0,
        })
        .collect();

    for v in values.iter().copied().filter(|v| v.is_finite()) {
        if v < lo || v > hi {
            continue;
        }
        let index = (((v - lo) / width).floor() as usize).min(bins - 1);
        out[index].count += 1;
    }
    out
}

/// Epanechnikov kernel with bandwidth `k`
pub fn epanechnikov(k: f64) -> impl Fn(f64) -> f64 {
    move |v: f64| {
        let u = v / k;
        if u.abs() <= 1.0 {
            0.75 * (1.0 - u * u) / k
        } else {
            0.0
        }
    }
}

/// Kernel density estimate of `values` evaluated at each of `xs`
pub fn kernel_density(values: &[f64], bandwidth: f64, xs: &[f64]) -> Vec<(f64, f64)> {
    let finite = finite_values(values);
    if finite.is_empty() || !(bandwidth > 0.0) {
        return xs.iter().map(|&x| (x, 0.0)).collect();
    }
    let kernel = epanechnikov(bandwidth);
    let n = finite.len() as f64;
    xs.iter()
        .map(|&x| (x, finite.iter().map(|v| kernel(x - v)).sum::<f64>() / n))
        .collect()
}

/// `n` evenly spaced samples from `lo` to `hi` inclusive
pub fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![lo],
        _ => {
            let step = (hi - lo) / (n - 1) as f64;
            (0..n).map(|i| lo + i as f64 * step).collect()
        }
    }
}

/// Linear mapping from a data domain to an output range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn apply(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return (r0 + r1) / 2.0;
        }
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }
}

/// Square-root mapping from `[0, max]` to an output range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SqrtScale {
    pub max: f64,
    pub range: (f64, f64),
}

impl SqrtScale {
    pub fn new(max: f64, range: (f64, f64)) -> Self {
        Self { max, range }
    }

    pub fn apply(&self, value: f64) -> f64 {
        let (r0, r1) = self.range;
        if self.max <= 0.0 {
            return r0;
        }
        r0 + (value.max(0.0) / self.max).sqrt() * (r1 - r0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mean_median_extent() {
        let data = [3.0, 1.0, 4.0, 1.0, 5.0, f64::NAN];
        assert_eq!(mean(&data), Some(2.8));
        assert_eq!(median(&data), Some(3.0));
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), Some(2.5));
        assert_eq!(extent(&data), Some((1.0, 5.0)));
    }

    #[test]
    fn test_empty_input_yields_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(median(&[f64::NAN]), None);
        assert_eq!(extent(&[]), None);
    }

    #[test]
    fn test_bin_counts_includes_upper_edge() {
        let bins = bin_counts(&[0.0, 0.5, 1.0, 9.9, 10.0, 11.0, -1.0], (0.0, 10.0), 10);
        assert_eq!(bins.len(), 10);
        assert_eq!(bins[0].count, 2);
        assert_eq!(bins[1].count, 1);
        assert_eq!(bins[9].count, 2);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 5);
        assert_eq!(bins[9].x1, 10.0);
    }

    #[test]
    fn test_bin_counts_degenerate_domain() {
        assert!(bin_counts(&[1.0], (1.0, 1.0), 5).is_empty());
        assert!(bin_counts(&[1.0], (0.0, 1.0), 0).is_empty());
    }

    #[test]
    fn test_epanechnikov_integrates_to_one() {
        let xs = linspace(-2.0, 2.0, 4001);
        let density = kernel_density(&[0.0], 1.0, &xs);
        let step = xs[1] - xs[0];
        let area: f64 = density.iter().map(|(_, d)| d * step).sum();
        assert!((area - 1.0).abs() < 1e-3);
        assert_eq!(density[0].1, 0.0);
    }

    #[test]
    fn test_kernel_density_empty_is_flat_zero() {
        let density = kernel_density(&[], 0.5, &[0.0, 1.0]);
        assert_eq!(density, vec![(0.0, 0.0), (1.0, 0.0)]);
    }

    #[test]
    fn test_scales() {
        let linear = LinearScale::new((80.0, 200.0), (0.0, 320.0));
        assert_eq!(linear.apply(80.0), 0.0);
        assert_eq!(linear.apply(140.0), 160.0);
        let inverted = LinearScale::new((0.0, 10.0), (100.0, 0.0));
        assert_eq!(inverted.apply(10.0), 0.0);

        let sqrt = SqrtScale::new(100.0, (3.0, 15.0));
        assert_eq!(sqrt.apply(0.0), 3.0);
        assert_eq!(sqrt.apply(25.0), 9.0);
        assert_eq!(sqrt.apply(100.0), 15.0);
    }
}
