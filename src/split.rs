//! Deterministic train / validate / test partitioning.
//!
//! A three-way split is two chained two-way splits with the same seed. The
//! two-way split shuffles row positions with a seeded [`StdRng`] and sends the
//! first `floor(n * fraction)` of them to the first side. With a
//! stratification column the split is done per class instead, allocating each
//! class by largest remainder so both sides keep the class mix of the input.
//!
//! Row ids travel with their rows, so the partitions of a table always cover
//! its row ids exactly once.

use crate::error::WrangleError;
use crate::frame::Frame;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which partition the first two-way split carves out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitOrder {
    /// `table -> {train_plus_validate, test}`, then
    /// `train_plus_validate -> {train, validate}`.
    #[default]
    TestFirst,
    /// `table -> {train, validate_plus_test}`, then
    /// `validate_plus_test -> {validate, test}`.
    TrainFirst,
}

/// Fractions, seed and stratification for a three-way split.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Share of the table sent to the first side of the first split.
    pub primary_fraction: f64,
    /// Share of the first split's carried side sent to the first side of the second split.
    pub secondary_fraction: f64,
    pub seed: u64,
    /// Column whose values define the classes to stratify on.
    pub stratify: Option<String>,
    pub order: SplitOrder,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self::seventy_fifteen_fifteen()
    }
}

impl SplitConfig {
    /// 70% train, then the remaining 30% halved into validate and test. Seed 42.
    pub fn seventy_fifteen_fifteen() -> Self {
        Self {
            primary_fraction: 0.7,
            secondary_fraction: 0.5,
            seed: 42,
            stratify: None,
            order: SplitOrder::TrainFirst,
        }
    }

    /// 80% train+validate vs 20% test, then 70/30 train/validate. Seed 1349.
    pub fn eighty_twenty() -> Self {
        Self {
            primary_fraction: 0.8,
            secondary_fraction: 0.7,
            seed: 1349,
            stratify: None,
            order: SplitOrder::TestFirst,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_stratify(mut self, column: impl Into<String>) -> Self {
        self.stratify = Some(column.into());
        self
    }

    pub fn with_fractions(mut self, primary: f64, secondary: f64) -> Self {
        self.primary_fraction = primary;
        self.secondary_fraction = secondary;
        self
    }

    pub fn with_order(mut self, order: SplitOrder) -> Self {
        self.order = order;
        self
    }
}

/// The three disjoint partitions of a table.
#[derive(Clone, Debug, PartialEq)]
pub struct Partitions {
    pub train: Frame,
    pub validate: Frame,
    pub test: Frame,
}

impl Partitions {
    /// Apply `f` to every partition.
    pub fn try_map<F>(&self, mut f: F) -> Result<Partitions, WrangleError>
    where
        F: FnMut(&Frame) -> Result<Frame, WrangleError>,
    {
        Ok(Partitions {
            train: f(&self.train)?,
            validate: f(&self.validate)?,
            test: f(&self.test)?,
        })
    }

    /// Total rows across the partitions.
    pub fn n_rows(&self) -> usize {
        self.train.n_rows() + self.validate.n_rows() + self.test.n_rows()
    }
}

/// Split `frame` in two, sending `fraction` of its rows to the first side.
///
/// # Errors
/// - `InvalidParameter` if `fraction` is outside `[0, 1]`
/// - `ColumnNotFound` if `stratify` names a missing column
/// - `UnderpopulatedClass` if a stratification class cannot reach every
///   non-empty side
pub fn train_test_split(
    frame: &Frame,
    fraction: f64,
    seed: u64,
    stratify: Option<&str>,
) -> Result<(Frame, Frame), WrangleError> {
    if !(0.0..=1.0).contains(&fraction) {
        return Err(WrangleError::InvalidParameter(format!(
            "split fraction must lie in [0, 1], got {}",
            fraction
        )));
    }

    let n = frame.n_rows();
    let n_first = first_side_len(n, fraction);
    let mut rng = StdRng::seed_from_u64(seed);

    let (first, second) = match stratify {
        None => {
            let mut positions: Vec<usize> = (0..n).collect();
            positions.shuffle(&mut rng);
            let second = positions.split_off(n_first);
            (positions, second)
        }
        Some(column) => stratified_positions(frame, column, n_first, &mut rng)?,
    };

    Ok((frame.take_rows(&first), frame.take_rows(&second)))
}

/// Split `frame` into train, validate and test partitions.
pub fn train_validate_test_split(
    frame: &Frame,
    config: &SplitConfig,
) -> Result<Partitions, WrangleError> {
    let stratify = config.stratify.as_deref();
    let (first, carried) = train_test_split(frame, config.primary_fraction, config.seed, stratify)?;

    let partitions = match config.order {
        SplitOrder::TestFirst => {
            let (train, validate) =
                train_test_split(&first, config.secondary_fraction, config.seed, stratify)?;
            Partitions {
                train,
                validate,
                test: carried,
            }
        }
        SplitOrder::TrainFirst => {
            let (validate, test) =
                train_test_split(&carried, config.secondary_fraction, config.seed, stratify)?;
            Partitions {
                train: first,
                validate,
                test,
            }
        }
    };

    tracing::info!(
        train = partitions.train.n_rows(),
        validate = partitions.validate.n_rows(),
        test = partitions.test.n_rows(),
        seed = config.seed,
        stratify = ?config.stratify,
        "split table"
    );
    Ok(partitions)
}

fn first_side_len(n: usize, fraction: f64) -> usize {
    // Tolerance keeps 0.57 * 100 from flooring to 56.
    (((n as f64) * fraction + 1e-9).floor() as usize).min(n)
}

fn stratified_positions(
    frame: &Frame,
    column: &str,
    n_first: usize,
    rng: &mut StdRng,
) -> Result<(Vec<usize>, Vec<usize>), WrangleError> {
    let values = frame.column(column)?;
    let n = frame.n_rows();

    let mut classes: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for row in 0..n {
        classes.entry(values.class_key(row)).or_default().push(row);
    }

    let required = usize::from(n_first > 0) + usize::from(n - n_first > 0);
    for (class, members) in &classes {
        if members.len() < required {
            return Err(WrangleError::UnderpopulatedClass {
                column: column.to_string(),
                class: class.clone(),
                count: members.len(),
                required,
            });
        }
    }

    let n_second = n - n_first;
    for (side, len) in [("first", n_first), ("second", n_second)] {
        if len > 0 && classes.len() > len {
            return Err(WrangleError::InvalidParameter(format!(
                "stratifying on '{}' needs at least {} rows on the {} side, got {}",
                column,
                classes.len(),
                side,
                len
            )));
        }
    }

    let counts: Vec<usize> = classes.values().map(Vec::len).collect();
    let allocation = allocate(&counts, n_first, n);

    let mut first = Vec::with_capacity(n_first);
    let mut second = Vec::with_capacity(n_second);
    for (members, take) in classes.values_mut().zip(allocation) {
        members.shuffle(rng);
        first.extend_from_slice(&members[..take]);
        second.extend_from_slice(&members[take..]);
    }
    first.shuffle(rng);
    second.shuffle(rng);
    Ok((first, second))
}

/// Rows of each class sent to the first side.
///
/// Largest-remainder apportionment of `n_first` over `counts`, then adjusted
/// so every class has at least one row on each non-empty side. Each result
/// stays within one row of `count * n_first / n`.
///
/// Callers guarantee that every class fits on each non-empty side and that
/// no side has fewer rows than there are classes.
fn allocate(counts: &[usize], n_first: usize, n: usize) -> Vec<usize> {
    if n == 0 {
        return vec![0; counts.len()];
    }
    let ideal: Vec<f64> = counts
        .iter()
        .map(|&c| c as f64 * n_first as f64 / n as f64)
        .collect();
    let mut take: Vec<usize> = ideal.iter().map(|q| q.floor() as usize).collect();

    let assigned: usize = take.iter().sum();
    let mut by_remainder: Vec<usize> = (0..counts.len()).collect();
    by_remainder.sort_by(|&a, &b| {
        let ra = ideal[a] - ideal[a].floor();
        let rb = ideal[b] - ideal[b].floor();
        rb.total_cmp(&ra).then(a.cmp(&b))
    });
    for &i in by_remainder.iter().take(n_first.saturating_sub(assigned)) {
        take[i] += 1;
    }

    let n_second = n - n_first;
    for i in 0..counts.len() {
        if n_first > 0 && take[i] == 0 {
            take[i] = 1;
            // Give the row back from the class most above its ideal share.
            if let Some(donor) = (0..counts.len())
                .filter(|&k| k != i && take[k] > 1)
                .max_by(|&a, &b| {
                    (take[a] as f64 - ideal[a]).total_cmp(&(take[b] as f64 - ideal[b]))
                })
            {
                take[donor] -= 1;
            }
        }
        if n_second > 0 && take[i] == counts[i] {
            take[i] -= 1;
            if let Some(receiver) = (0..counts.len())
                .filter(|&k| k != i && take[k] + 1 < counts[k])
                .min_by(|&a, &b| {
                    (take[a] as f64 - ideal[a]).total_cmp(&(take[b] as f64 - ideal[b]))
                })
            {
                take[receiver] += 1;
            }
        }
    }
    debug_assert_eq!(take.iter().sum::<usize>(), n_first);
    take
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{apply_filters, RangeFilter};
    use crate::frame::Column;
    use std::collections::HashSet;

    fn table(n: usize) -> Frame {
        let quality: Vec<f64> = (0..n).map(|i| [5.0, 6.0, 7.0][i % 3]).collect();
        let kind: Vec<String> = (0..n)
            .map(|i| if i % 4 == 0 { "red" } else { "white" }.to_string())
            .collect();
        Frame::new(vec![
            ("alcohol".to_string(), Column::Numeric((0..n).map(|i| i as f64).collect())),
            ("quality".to_string(), Column::Numeric(quality)),
            ("type".to_string(), Column::Categorical(kind)),
        ])
        .unwrap()
    }

    fn ids(frame: &Frame) -> Vec<usize> {
        frame.row_ids().to_vec()
    }

    #[test]
    fn test_split_is_deterministic() {
        let t = table(100);
        let config = SplitConfig::default();
        let a = train_validate_test_split(&t, &config).unwrap();
        let b = train_validate_test_split(&t, &config).unwrap();
        assert_eq!(a, b);

        let c = train_validate_test_split(&t, &config.clone().with_seed(7)).unwrap();
        assert_ne!(ids(&a.train), ids(&c.train));
    }

    #[test]
    fn test_split_is_complete_and_disjoint() {
        let t = table(101);
        for config in [SplitConfig::seventy_fifteen_fifteen(), SplitConfig::eighty_twenty()] {
            let p = train_validate_test_split(&t, &config).unwrap();
            let mut all: Vec<usize> = ids(&p.train);
            all.extend(ids(&p.validate));
            all.extend(ids(&p.test));
            assert_eq!(all.len(), 101);
            let unique: HashSet<usize> = all.iter().copied().collect();
            assert_eq!(unique.len(), 101);
        }
    }

    #[test]
    fn test_split_sizes() {
        let t = table(100);
        let p = train_validate_test_split(&t, &SplitConfig::seventy_fifteen_fifteen()).unwrap();
        assert_eq!(p.train.n_rows(), 70);
        assert_eq!(p.validate.n_rows(), 15);
        assert_eq!(p.test.n_rows(), 15);

        let p = train_validate_test_split(&t, &SplitConfig::eighty_twenty()).unwrap();
        assert_eq!(p.test.n_rows(), 20);
        assert_eq!(p.train.n_rows(), 56);
        assert_eq!(p.validate.n_rows(), 24);
    }

    #[test]
    fn test_split_full_primary_fraction_on_five_rows() {
        let t = table(5);
        let config = SplitConfig::default()
            .with_order(SplitOrder::TestFirst)
            .with_fractions(1.0, 0.5);
        let a = train_validate_test_split(&t, &config).unwrap();
        let b = train_validate_test_split(&t, &config).unwrap();
        assert_eq!(a.test.n_rows(), 0);
        assert_eq!(a.train.n_rows(), 2);
        assert_eq!(a.validate.n_rows(), 3);
        assert_eq!(ids(&a.train), ids(&b.train));
        assert_eq!(ids(&a.validate), ids(&b.validate));
    }

    #[test]
    fn test_split_rejects_bad_fraction() {
        let t = table(10);
        assert!(matches!(
            train_test_split(&t, 1.5, 0, None),
            Err(WrangleError::InvalidParameter(_))
        ));
        assert!(matches!(
            train_test_split(&t, -0.1, 0, None),
            Err(WrangleError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_stratified_split_preserves_class_mix() {
        let t = table(300);
        let config = SplitConfig::eighty_twenty().with_stratify("quality");
        let p = train_validate_test_split(&t, &config).unwrap();

        for part in [&p.train, &p.validate, &p.test] {
            let q = part.numeric("quality").unwrap();
            let n = q.len() as f64;
            for class in [5.0, 6.0, 7.0] {
                let count = q.iter().filter(|&&v| v == class).count() as f64;
                // each class is a third of the table
                assert!((count - n / 3.0).abs() <= 1.0, "class {} count {} of {}", class, count, n);
            }
        }
    }

    #[test]
    fn test_stratified_split_on_categorical_column() {
        let t = table(40);
        let (a, b) = train_test_split(&t, 0.5, 3, Some("type")).unwrap();
        let reds = |f: &Frame| {
            f.categorical("type")
                .unwrap()
                .iter()
                .filter(|v| v.as_str() == "red")
                .count()
        };
        assert_eq!(reds(&a), 5);
        assert_eq!(reds(&b), 5);
    }

    #[test]
    fn test_stratified_split_underpopulated_class() {
        let t = Frame::new(vec![(
            "quality".to_string(),
            Column::Numeric(vec![5.0, 5.0, 5.0, 5.0, 9.0]),
        )])
        .unwrap();
        match train_test_split(&t, 0.6, 1, Some("quality")) {
            Err(WrangleError::UnderpopulatedClass { class, count, required, .. }) => {
                assert_eq!(class, "9");
                assert_eq!(count, 1);
                assert_eq!(required, 2);
            }
            other => panic!("expected UnderpopulatedClass, got {:?}", other),
        }

        // A single non-empty side needs only one member per class.
        assert!(train_test_split(&t, 1.0, 1, Some("quality")).is_ok());
    }

    #[test]
    fn test_stratify_missing_column() {
        let t = table(10);
        assert!(matches!(
            train_test_split(&t, 0.5, 0, Some("colour")),
            Err(WrangleError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_allocate_gives_every_class_both_sides() {
        // Largest remainder alone would put both first-side rows in class 0.
        let take = allocate(&[10, 2], 2, 12);
        assert_eq!(take, vec![1, 1]);

        let take = allocate(&[30, 30, 40], 70, 100);
        assert_eq!(take, vec![21, 21, 28]);
    }

    #[test]
    fn test_stratified_split_more_classes_than_side_rows() {
        // Four classes of two rows; a 0.25 first side holds only two rows.
        let t = Frame::new(vec![(
            "quality".to_string(),
            Column::Numeric(vec![4.0, 4.0, 5.0, 5.0, 6.0, 6.0, 7.0, 7.0]),
        )])
        .unwrap();
        assert!(matches!(
            train_test_split(&t, 0.25, 42, Some("quality")),
            Err(WrangleError::InvalidParameter(_))
        ));
        assert!(matches!(
            train_test_split(&t, 0.75, 42, Some("quality")),
            Err(WrangleError::InvalidParameter(_))
        ));

        // Exactly one row per class on each side is still feasible.
        let (first, second) = train_test_split(&t, 0.5, 42, Some("quality")).unwrap();
        assert_eq!(first.n_rows(), 4);
        assert_eq!(second.n_rows(), 4);
        let classes: HashSet<String> = first
            .numeric("quality")
            .unwrap()
            .iter()
            .map(|q| q.to_string())
            .collect();
        assert_eq!(classes.len(), 4);
    }

    #[test]
    fn test_toy_table_filter_then_split_is_reproducible() {
        let t = Frame::new(vec![
            (
                "alcohol".to_string(),
                Column::Numeric(vec![9.0, 10.0, 11.0, 12.0, 8.0, 13.0]),
            ),
            (
                "density".to_string(),
                Column::Numeric(vec![0.99, 0.995, 1.0, 1.005, 0.98, 1.02]),
            ),
            (
                "quality".to_string(),
                Column::Numeric(vec![5.0, 6.0, 7.0, 5.0, 6.0, 4.0]),
            ),
            (
                "type".to_string(),
                Column::Categorical(
                    ["red", "red", "white", "white", "red", "white"]
                        .iter()
                        .map(|s| s.to_string())
                        .collect(),
                ),
            ),
        ])
        .unwrap();

        let filtered = apply_filters(&t, &[RangeFilter::at_most("density", 1.01)]).unwrap();
        assert_eq!(filtered.n_rows(), 5);
        assert_eq!(filtered.row_ids(), &[0, 1, 2, 3, 4]);

        let config = SplitConfig::default()
            .with_order(SplitOrder::TestFirst)
            .with_fractions(1.0, 0.5)
            .with_seed(7);
        let a = train_validate_test_split(&filtered, &config).unwrap();
        let b = train_validate_test_split(&filtered, &config).unwrap();
        assert_eq!(a.test.n_rows(), 0);
        assert_eq!(a.train.n_rows(), 2);
        assert_eq!(a.validate.n_rows(), 3);
        assert_eq!(ids(&a.train), ids(&b.train));
        assert_eq!(ids(&a.validate), ids(&b.validate));

        let mut all: Vec<usize> = ids(&a.train).into_iter().chain(ids(&a.validate)).collect();
        all.sort_unstable();
        assert_eq!(all, vec![0, 1, 2, 3, 4]);
        assert_eq!(a.train.names(), t.names());
    }
}
