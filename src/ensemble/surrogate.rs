//! The surrogate model of the parameter search:
//! a standard scaler followed by kernel ridge regression
//! with a degree-1 polynomial kernel.
use crate::constants::{
    NUMERIC_TOLERANCE,
    SURROGATE_ALPHA,
    SURROGATE_COEF0,
    SURROGATE_DEGREE,
};
use crate::error::{Result, TdeError};


/// Centers each feature and scales it to unit variance.
/// Constant features keep a scale of `1`.
#[derive(Debug, Clone)]
pub(crate) struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}


impl StandardScaler {
    pub(crate) fn fit(rows: &[Vec<f64>]) -> Self {
        let n_features = rows.first().map_or(0, |r| r.len());
        let n = rows.len() as f64;

        let mut mean = vec![0f64; n_features];
        for row in rows {
            mean.iter_mut().zip(row).for_each(|(m, x)| *m += x);
        }
        mean.iter_mut().for_each(|m| *m /= n);

        let mut scale = vec![0f64; n_features];
        for row in rows {
            scale.iter_mut()
                .zip(row.iter().zip(&mean))
                .for_each(|(s, (x, m))| *s += (x - m).powi(2));
        }
        scale.iter_mut()
            .for_each(|s| {
                let std = (*s / n).sqrt();
                *s = if std > NUMERIC_TOLERANCE { std } else { 1.0 };
            });

        Self { mean, scale }
    }


    pub(crate) fn transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| (x - m) / s)
            .collect()
    }
}


/// Kernel ridge regression with the kernel
/// `k(a, b) = (gamma <a, b> + coef0)^degree`,
/// `gamma = 1 / n_features`.
#[derive(Debug, Clone)]
pub(crate) struct KernelRidge {
    gamma: f64,
    train: Vec<Vec<f64>>,
    dual: Vec<f64>,
}


impl KernelRidge {
    /// Solves `(K + alpha I) dual = y`.
    pub(crate) fn fit(rows: Vec<Vec<f64>>, y: &[f64]) -> Result<Self> {
        let n = rows.len();
        let n_features = rows.first().map_or(1, |r| r.len().max(1));
        let gamma = 1.0 / n_features as f64;

        let mut gram = vec![vec![0f64; n]; n];
        for i in 0..n {
            for j in 0..=i {
                let k = kernel(gamma, &rows[i], &rows[j]);
                gram[i][j] = k;
                gram[j][i] = k;
            }
            gram[i][i] += SURROGATE_ALPHA;
        }

        let dual = cholesky_solve(&gram, y)?;
        Ok(Self { gamma, train: rows, dual })
    }


    pub(crate) fn predict(&self, row: &[f64]) -> f64 {
        self.train.iter()
            .zip(&self.dual)
            .map(|(t, a)| a * kernel(self.gamma, t, row))
            .sum()
    }
}


/// Predicts the MAE of unseen parameter vectors
/// from the ones evaluated so far.
#[derive(Debug, Clone)]
pub(crate) struct Surrogate {
    scaler: StandardScaler,
    ridge: KernelRidge,
}


impl Surrogate {
    /// Fits on the encoded parameter vectors and their MAEs.
    pub(crate) fn fit(features: &[[f64; 5]], maes: &[f64]) -> Result<Self> {
        let rows = features.iter()
            .map(|f| f.to_vec())
            .collect::<Vec<_>>();
        let scaler = StandardScaler::fit(&rows);
        let scaled = rows.iter()
            .map(|r| scaler.transform(r))
            .collect();
        let ridge = KernelRidge::fit(scaled, maes)?;
        Ok(Self { scaler, ridge })
    }


    pub(crate) fn predict(&self, features: &[f64; 5]) -> f64 {
        self.ridge.predict(&self.scaler.transform(features))
    }
}


#[inline]
fn kernel(gamma: f64, a: &[f64], b: &[f64]) -> f64 {
    let dot = a.iter().zip(b).map(|(x, y)| x * y).sum::<f64>();
    (gamma * dot + SURROGATE_COEF0).powi(SURROGATE_DEGREE)
}


/// Solves `a x = b` for a symmetric positive definite `a`
/// by Cholesky factorization `a = L L^T`.
fn cholesky_solve(a: &[Vec<f64>], b: &[f64]) -> Result<Vec<f64>> {
    let n = a.len();

    let mut l = vec![vec![0f64; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let sum = (0..j).map(|k| l[i][k] * l[j][k]).sum::<f64>();
            if i == j {
                let val = a[i][i] - sum;
                if val <= 0.0 {
                    return Err(TdeError::Numerical(
                        "surrogate kernel matrix is not positive definite".into()
                    ));
                }
                l[i][j] = val.sqrt();
            } else {
                l[i][j] = (a[i][j] - sum) / l[j][j];
            }
        }
    }

    // L y = b
    let mut y = vec![0f64; n];
    for i in 0..n {
        let sum = (0..i).map(|j| l[i][j] * y[j]).sum::<f64>();
        y[i] = (b[i] - sum) / l[i][i];
    }

    // L^T x = y
    let mut x = vec![0f64; n];
    for i in (0..n).rev() {
        let sum = (i + 1..n).map(|j| l[j][i] * x[j]).sum::<f64>();
        x[i] = (y[i] - sum) / l[i][i];
    }
    Ok(x)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaler() {
        let rows = vec![vec![1.0, 5.0], vec![3.0, 5.0]];
        let scaler = StandardScaler::fit(&rows);
        assert_eq!(scaler.transform(&[1.0, 5.0]), vec![-1.0, 0.0]);
        assert_eq!(scaler.transform(&[3.0, 7.0]), vec![1.0, 2.0]);
    }

    #[test]
    fn test_cholesky_solve() {
        let a = vec![
            vec![4.0, 2.0, 0.0],
            vec![2.0, 5.0, 1.0],
            vec![0.0, 1.0, 3.0],
        ];
        let x = vec![1.0, -2.0, 0.5];
        let b = a.iter()
            .map(|row| row.iter().zip(&x).map(|(r, v)| r * v).sum::<f64>())
            .collect::<Vec<_>>();
        let solved = cholesky_solve(&a, &b).unwrap();
        for (s, v) in solved.iter().zip(&x) {
            assert!((s - v).abs() < 1e-9);
        }
    }

    #[test]
    fn test_not_positive_definite() {
        let a = vec![vec![0.0, 1.0], vec![1.0, 0.0]];
        assert!(matches!(
            cholesky_solve(&a, &[1.0, 1.0]),
            Err(TdeError::Numerical(_))
        ));
    }

    #[test]
    fn test_surrogate_ranks_a_linear_trend() {
        // MAE grows with the window size.
        let features = (1..=8)
            .map(|w| [w as f64 * 4.0, 8.0, 1.0, 1.0, 1.0])
            .collect::<Vec<_>>();
        let maes = (1..=8).map(|w| 0.1 * w as f64).collect::<Vec<_>>();
        let surrogate = Surrogate::fit(&features, &maes).unwrap();

        let small = surrogate.predict(&[4.0, 8.0, 1.0, 1.0, 1.0]);
        let large = surrogate.predict(&[32.0, 8.0, 1.0, 1.0, 1.0]);
        assert!(small < large);
    }
}
