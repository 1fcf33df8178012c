use serde::Serialize;

/// Population moments of an annual return series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnStatistics {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub skewness: f64,
    /// Excess kurtosis; a normal distribution reads 0.
    pub kurtosis: f64,
}

impl ReturnStatistics {
    /// `None` for an empty series. A constant series has zero skewness and
    /// kurtosis rather than NaN.
    pub fn from_returns(returns: &[f64]) -> Option<Self> {
        if returns.is_empty() {
            return None;
        }

        let n = returns.len() as f64;
        let mean = returns.iter().sum::<f64>() / n;
        let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
        let std_dev = variance.sqrt();
        let min = returns.iter().copied().fold(f64::INFINITY, f64::min);
        let max = returns.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let (skewness, kurtosis) = if std_dev > 0.0 {
            let skew = returns
                .iter()
                .map(|r| ((r - mean) / std_dev).powi(3))
                .sum::<f64>()
                / n;
            let kurt = returns
                .iter()
                .map(|r| ((r - mean) / std_dev).powi(4))
                .sum::<f64>()
                / n
                - 3.0;
            (skew, kurt)
        } else {
            (0.0, 0.0)
        };

        Some(Self {
            mean,
            std_dev,
            min,
            max,
            skewness,
            kurtosis,
        })
    }
}

/// Linear-interpolated percentile, `p` in [0, 100]. Sorts `values` in place.
pub fn percentile(values: &mut [f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    values.sort_by(|a, b| a.total_cmp(b));
    percentile_sorted(values, p)
}

/// Same as [`percentile`] for input that is already sorted ascending.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    match n {
        0 => return 0.0,
        1 => return sorted[0],
        _ => {}
    }

    let rank = (p.clamp(0.0, 100.0) / 100.0) * (n as f64 - 1.0);
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;

    if lower == upper {
        sorted[lower]
    } else {
        let (a, b) = (sorted[lower], sorted[upper]);
        let w = rank - lower as f64;
        // Stays inside [a, b], and exactly `a` on ties.
        (a + (b - a) * w).max(a).min(b)
    }
}

/// Lower-triangular `L` with `A = L·Lᵀ`, or `None` when `matrix` is not
/// symmetric positive definite.
pub fn cholesky(matrix: &[Vec<f64>]) -> Option<Vec<Vec<f64>>> {
    let n = matrix.len();
    if matrix.iter().any(|row| row.len() != n) {
        return None;
    }

    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let sum: f64 = (0..j).map(|k| l[i][k] * l[j][k]).sum();
            if i == j {
                let diag = matrix[i][i] - sum;
                if !diag.is_finite() || diag <= 1e-12 {
                    return None;
                }
                l[i][j] = diag.sqrt();
            } else {
                if (matrix[i][j] - matrix[j][i]).abs() > 1e-12 {
                    return None;
                }
                l[i][j] = (matrix[i][j] - sum) / l[j][j];
            }
        }
    }
    Some(l)
}
