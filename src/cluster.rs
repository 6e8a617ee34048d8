//! K-means cluster labels as an engineered feature.
//!
//! [`KMeans`] is plain Lloyd's algorithm over the rows of an `Array2<f64>`,
//! seeded with k-means++ and restarted `n_init` times; the run with the lowest
//! inertia wins. Everything random is drawn from one [`StdRng`] seeded from
//! the configuration, so a fixed seed gives identical labels.
//!
//! [`attach_clusters`] is the table-level entry point: min-max scale the chosen
//! columns over the whole input table, cluster, and add the labels as a
//! categorical column. The scaling is fitted on the full table rather than the
//! training partition, so cluster labels carry information from every row.

use crate::error::WrangleError;
use crate::frame::{Column, Frame};
use crate::preprocessing::{ColumnSelection, FittedTransformer, MinMaxScaler, Transformer};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// K-means hyperparameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KMeans {
    pub n_clusters: usize,
    /// Independent k-means++ restarts.
    pub n_init: usize,
    pub max_iter: usize,
    /// Convergence threshold on the total squared centroid shift.
    pub tol: f64,
    pub seed: u64,
}

impl Default for KMeans {
    fn default() -> Self {
        Self {
            n_clusters: 3,
            n_init: 10,
            max_iter: 300,
            tol: 1e-4,
            seed: 42,
        }
    }
}

impl KMeans {
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Cluster the rows of `data`.
    ///
    /// # Errors
    /// - `EmptyData` if `data` has no rows or no columns
    /// - `InvalidParameter` if `n_clusters` is 0 or exceeds the row count, or
    ///   `n_init` is 0
    pub fn fit(&self, data: &Array2<f64>) -> Result<FittedKMeans, WrangleError> {
        let (n, d) = data.dim();
        if n == 0 || d == 0 {
            return Err(WrangleError::EmptyData(
                "Cannot fit KMeans on empty data".to_string(),
            ));
        }
        if self.n_clusters == 0 || self.n_clusters > n {
            return Err(WrangleError::InvalidParameter(format!(
                "n_clusters must be in 1..={}, got {}",
                n, self.n_clusters
            )));
        }
        if self.n_init == 0 {
            return Err(WrangleError::InvalidParameter(
                "n_init must be at least 1".to_string(),
            ));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut best: Option<FittedKMeans> = None;
        for run in 0..self.n_init {
            let centroids = self.init_plus_plus(data, &mut rng);
            let fitted = self.lloyd(data, centroids);
            tracing::trace!(run, inertia = fitted.inertia, n_iter = fitted.n_iter, "kmeans run");
            if best.as_ref().map_or(true, |b| fitted.inertia < b.inertia) {
                best = Some(fitted);
            }
        }
        best.ok_or_else(|| WrangleError::InvalidParameter("no k-means run completed".to_string()))
    }

    fn init_plus_plus(&self, data: &Array2<f64>, rng: &mut StdRng) -> Array2<f64> {
        let n = data.nrows();
        let mut centroids = Array2::zeros((self.n_clusters, data.ncols()));
        let first = rng.random_range(0..n);
        centroids.row_mut(0).assign(&data.row(first));

        let mut closest: Vec<f64> = data
            .rows()
            .into_iter()
            .map(|row| squared_distance(row, centroids.row(0)))
            .collect();

        for c in 1..self.n_clusters {
            let total: f64 = closest.iter().sum();
            let chosen = if total > 0.0 {
                let mut target = rng.random::<f64>() * total;
                let mut pick = n - 1;
                for (i, &w) in closest.iter().enumerate() {
                    if target < w {
                        pick = i;
                        break;
                    }
                    target -= w;
                }
                pick
            } else {
                // Every row coincides with a chosen centroid
                rng.random_range(0..n)
            };
            centroids.row_mut(c).assign(&data.row(chosen));
            for (i, row) in data.rows().into_iter().enumerate() {
                closest[i] = closest[i].min(squared_distance(row, centroids.row(c)));
            }
        }
        centroids
    }

    fn lloyd(&self, data: &Array2<f64>, mut centroids: Array2<f64>) -> FittedKMeans {
        let k = self.n_clusters;
        let mut labels = assign(data, &centroids);
        let mut n_iter = 0;

        for _ in 0..self.max_iter {
            n_iter += 1;
            let mut sums = Array2::<f64>::zeros(centroids.dim());
            let mut counts = vec![0usize; k];
            for (row, &label) in data.rows().into_iter().zip(&labels) {
                let mut sum = sums.row_mut(label);
                sum += &row;
                counts[label] += 1;
            }

            let mut shift = 0.0;
            for c in 0..k {
                // An empty cluster keeps its previous centroid.
                if counts[c] == 0 {
                    continue;
                }
                let updated = &sums.row(c) / counts[c] as f64;
                shift += squared_distance(updated.view(), centroids.row(c));
                centroids.row_mut(c).assign(&updated);
            }

            labels = assign(data, &centroids);
            if shift <= self.tol {
                break;
            }
        }

        let inertia = data
            .rows()
            .into_iter()
            .zip(&labels)
            .map(|(row, &label)| squared_distance(row, centroids.row(label)))
            .sum();
        FittedKMeans {
            centroids,
            labels,
            inertia,
            n_iter,
        }
    }
}

/// Result of a k-means fit.
#[derive(Clone, Debug, PartialEq)]
pub struct FittedKMeans {
    /// `(n_clusters, n_features)` cluster centres.
    pub centroids: Array2<f64>,
    /// Cluster index of each fitted row.
    pub labels: Vec<usize>,
    /// Sum of squared distances of rows to their centroid.
    pub inertia: f64,
    /// Lloyd iterations of the winning run.
    pub n_iter: usize,
}

impl FittedKMeans {
    /// Nearest centroid for each row of `data`.
    pub fn predict(&self, data: &Array2<f64>) -> Result<Vec<usize>, WrangleError> {
        if data.ncols() != self.centroids.ncols() {
            return Err(WrangleError::FeatureMismatch {
                expected_features: self.centroids.ncols(),
                got_features: data.ncols(),
            });
        }
        Ok(assign(data, &self.centroids))
    }

    /// Rows per cluster.
    pub fn cluster_sizes(&self) -> Array1<usize> {
        let mut sizes = Array1::zeros(self.centroids.len_of(Axis(0)));
        for &label in &self.labels {
            sizes[label] += 1;
        }
        sizes
    }
}

fn squared_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}

/// Nearest centroid per row; ties go to the lower index.
fn assign(data: &Array2<f64>, centroids: &Array2<f64>) -> Vec<usize> {
    data.rows()
        .into_iter()
        .map(|row| {
            let mut nearest = 0;
            let mut min_distance = f64::INFINITY;
            for (i, centroid) in centroids.rows().into_iter().enumerate() {
                let distance = squared_distance(row, centroid);
                if distance < min_distance {
                    min_distance = distance;
                    nearest = i;
                }
            }
            nearest
        })
        .collect()
}

/// Which columns to cluster on and where to put the labels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClusterSpec {
    pub columns: Vec<String>,
    /// Name of the label column to add.
    pub output: String,
    #[serde(default)]
    pub kmeans: KMeans,
}

impl ClusterSpec {
    pub fn new(columns: Vec<String>, output: impl Into<String>, kmeans: KMeans) -> Self {
        Self {
            columns,
            output: output.into(),
            kmeans,
        }
    }

    /// `alcohol` and `density` into `alc_dens_cluster`, three clusters.
    pub fn alc_dens() -> Self {
        Self::new(
            vec!["alcohol".to_string(), "density".to_string()],
            "alc_dens_cluster",
            KMeans::new(3).with_n_init(1),
        )
    }

    /// `total_acidity` and `alcohol_by_density` into `cluster_labels`, three clusters.
    pub fn two() -> Self {
        Self::new(
            vec!["total_acidity".to_string(), "alcohol_by_density".to_string()],
            "cluster_labels",
            KMeans::new(3).with_seed(42),
        )
    }
}

/// Add a categorical column of k-means labels (`"0"`, `"1"`, ...) to `frame`.
///
/// # Errors
/// - `ColumnNotFound` / `TypeMismatch` for a missing or non-numeric column
/// - `NonFiniteValues` if a clustered column holds `NaN` or infinities
/// - `InvalidParameter` if the number of clusters exceeds the row count
pub fn attach_clusters(frame: &Frame, spec: &ClusterSpec) -> Result<Frame, WrangleError> {
    if spec.columns.is_empty() {
        return Err(WrangleError::InvalidParameter(
            "clustering needs at least one column".to_string(),
        ));
    }
    for name in &spec.columns {
        let count = frame.numeric(name)?.iter().filter(|v| !v.is_finite()).count();
        if count > 0 {
            return Err(WrangleError::NonFiniteValues {
                column: name.clone(),
                count,
            });
        }
    }

    let selected = frame.select(&spec.columns)?;
    let scaled = MinMaxScaler::new()
        .with_columns(ColumnSelection::Named(spec.columns.clone()))
        .fit(&selected)?
        .transform(&selected)?;
    let fitted = spec.kmeans.fit(&scaled.to_array()?)?;

    tracing::info!(
        output = %spec.output,
        k = spec.kmeans.n_clusters,
        inertia = fitted.inertia,
        sizes = ?fitted.cluster_sizes().to_vec(),
        "attached cluster labels"
    );

    let mut out = frame.clone();
    let labels = fitted.labels.iter().map(|l| l.to_string()).collect();
    out.set_column(&spec.output, Column::Categorical(labels))?;
    Ok(out)
}
