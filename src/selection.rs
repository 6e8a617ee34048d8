//! Univariate feature ranking against a numeric target.
//!
//! - [`f_regression`] scores each column by the F statistic of a one-feature
//!   linear regression, `F = r^2 / (1 - r^2) * (n - 2)` with `r` the Pearson
//!   correlation. [`select_k_best`] keeps the top `k`.
//! - [`spearman_correlation`] is the Pearson correlation of average ranks.

use crate::error::WrangleError;
use crate::frame::Frame;
use serde::{Deserialize, Serialize};

/// A column name with its score.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureScore {
    pub name: String,
    pub score: f64,
}

/// Pearson correlation of `x` and `y`; `NaN` if either is constant.
pub fn pearson(x: &[f64], y: &[f64]) -> Result<f64, WrangleError> {
    check_pair(x, y)?;
    let n = x.len() as f64;
    let mx = x.iter().sum::<f64>() / n;
    let my = y.iter().sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (&a, &b) in x.iter().zip(y) {
        sxy += (a - mx) * (b - my);
        sxx += (a - mx).powi(2);
        syy += (b - my).powi(2);
    }
    if sxx == 0.0 || syy == 0.0 {
        return Ok(f64::NAN);
    }
    Ok(sxy / (sxx * syy).sqrt())
}

/// Spearman rank correlation; tied values share their average rank.
pub fn spearman_correlation(x: &[f64], y: &[f64]) -> Result<f64, WrangleError> {
    check_pair(x, y)?;
    pearson(&average_ranks(x), &average_ranks(y))
}

/// F statistic of every numeric column except `target`, in column order.
///
/// Constant columns score 0.
pub fn f_regression(frame: &Frame, target: &str) -> Result<Vec<FeatureScore>, WrangleError> {
    let y = frame.numeric(target)?;
    let n = y.len();
    if n < 3 {
        return Err(WrangleError::InvalidParameter(format!(
            "f_regression needs at least 3 rows, got {}",
            n
        )));
    }

    let mut scores = Vec::new();
    for name in frame.numeric_names() {
        if name == target {
            continue;
        }
        let r = pearson(frame.numeric(&name)?, y)?;
        let r2 = r * r;
        let score = if r.is_nan() {
            0.0
        } else if r2 >= 1.0 {
            f64::INFINITY
        } else {
            r2 / (1.0 - r2) * (n - 2) as f64
        };
        scores.push(FeatureScore { name, score });
    }
    Ok(scores)
}

/// The `k` numeric columns with the highest [`f_regression`] score, best first.
///
/// # Errors
/// `InvalidParameter` if `k` exceeds the number of candidate columns.
pub fn select_k_best(
    frame: &Frame,
    target: &str,
    k: usize,
) -> Result<Vec<FeatureScore>, WrangleError> {
    let mut scores = f_regression(frame, target)?;
    if k > scores.len() {
        return Err(WrangleError::InvalidParameter(format!(
            "k = {} but only {} candidate columns",
            k,
            scores.len()
        )));
    }
    scores.sort_by(|a, b| b.score.total_cmp(&a.score));
    scores.truncate(k);
    tracing::debug!(?scores, "selected k best features");
    Ok(scores)
}

/// Spearman correlation of every numeric column except `target` with `target`.
pub fn spearman_scores(frame: &Frame, target: &str) -> Result<Vec<FeatureScore>, WrangleError> {
    let y = frame.numeric(target)?;
    frame
        .numeric_names()
        .into_iter()
        .filter(|name| name != target)
        .map(|name| {
            let score = spearman_correlation(frame.numeric(&name)?, y)?;
            Ok(FeatureScore { name, score })
        })
        .collect()
}

fn check_pair(x: &[f64], y: &[f64]) -> Result<(), WrangleError> {
    if x.len() != y.len() {
        return Err(WrangleError::FeatureMismatch {
            expected_features: x.len(),
            got_features: y.len(),
        });
    }
    if x.len() < 2 {
        return Err(WrangleError::InvalidParameter(
            "correlation needs at least 2 values".to_string(),
        ));
    }
    Ok(())
}

/// 1-based ranks, ties averaged.
fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // positions start..end share the mean of ranks start+1..=end
        let rank = (start + end + 1) as f64 / 2.0;
        for &i in &order[start..end] {
            ranks[i] = rank;
        }
        start = end;
    }
    ranks
}
