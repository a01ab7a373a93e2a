//! Bagged Gini decision trees.
//!
//! Each tree is grown on a bootstrap sample and considers a random subset of
//! `sqrt(n_features)` features at every split. Feature importance is the
//! impurity decrease a feature produces, normalized per tree and averaged over
//! the forest.

use ndarray::{Array2, ArrayView1, ArrayView2};
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use prep_model::{PrepError, Result, SelectorConfig};

/// Growth limits of a single tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeOptions {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Features drawn as split candidates at each node.
    pub max_features: usize,
}

/// Forest settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForestOptions {
    pub n_trees: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub seed: u64,
}

impl Default for ForestOptions {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            seed: 42,
        }
    }
}

impl ForestOptions {
    pub fn from_config(config: &SelectorConfig, seed: u64) -> Self {
        Self {
            n_trees: config.n_trees,
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
            seed,
        }
    }

    #[must_use]
    pub fn with_trees(mut self, n_trees: usize) -> Self {
        self.n_trees = n_trees;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn tree_options(&self, n_features: usize) -> TreeOptions {
        TreeOptions {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split.max(2),
            max_features: ((n_features as f64).sqrt() as usize).clamp(1, n_features.max(1)),
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        class: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 0,
            Node::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

struct Candidate {
    feature: usize,
    threshold: f64,
    /// `n_left * gini_left + n_right * gini_right`
    child_impurity: f64,
}

fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&count| (count as f64 / total).powi(2))
        .sum::<f64>()
}

/// Index of the largest count; the lowest index wins ties.
fn majority(counts: &[usize]) -> usize {
    counts
        .iter()
        .enumerate()
        .fold((0, 0), |best, (class, &count)| {
            if count > best.1 { (class, count) } else { best }
        })
        .0
}

/// A Gini classification tree over class indices.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    root: Node,
    importances: Vec<f64>,
}

struct Grower<'a, 'r> {
    x: ArrayView2<'a, f64>,
    y: &'a [usize],
    n_classes: usize,
    options: TreeOptions,
    rng: &'r mut ChaCha8Rng,
    importances: Vec<f64>,
}

impl Grower<'_, '_> {
    fn counts(&self, rows: &[usize]) -> Vec<usize> {
        let mut counts = vec![0; self.n_classes];
        for &row in rows {
            counts[self.y[row]] += 1;
        }
        counts
    }

    fn grow(&mut self, rows: Vec<usize>, depth: usize) -> Node {
        let counts = self.counts(&rows);
        let class = majority(&counts);
        let impurity = gini(&counts, rows.len());
        let depth_reached = self.options.max_depth.is_some_and(|max| depth >= max);
        if depth_reached || rows.len() < self.options.min_samples_split || impurity <= 0.0 {
            return Node::Leaf { class };
        }
        let Some(candidate) = self.best_split(&rows, &counts) else {
            return Node::Leaf { class };
        };

        self.importances[candidate.feature] +=
            rows.len() as f64 * impurity - candidate.child_impurity;
        let (left, right): (Vec<usize>, Vec<usize>) = rows
            .into_iter()
            .partition(|&row| self.x[[row, candidate.feature]] <= candidate.threshold);
        Node::Split {
            feature: candidate.feature,
            threshold: candidate.threshold,
            left: Box::new(self.grow(left, depth + 1)),
            right: Box::new(self.grow(right, depth + 1)),
        }
    }

    /// Lowest weighted child impurity over a random subset of features.
    fn best_split(&mut self, rows: &[usize], counts: &[usize]) -> Option<Candidate> {
        let n_features = self.x.ncols();
        let features = index::sample(&mut *self.rng, n_features, self.options.max_features).into_vec();
        let mut best: Option<Candidate> = None;

        for feature in features {
            let mut order = rows.to_vec();
            order.sort_by(|&a, &b| self.x[[a, feature]].total_cmp(&self.x[[b, feature]]));

            let mut left = vec![0; self.n_classes];
            let mut right = counts.to_vec();
            for pos in 0..order.len() - 1 {
                let class = self.y[order[pos]];
                left[class] += 1;
                right[class] -= 1;

                let value = self.x[[order[pos], feature]];
                let next = self.x[[order[pos + 1], feature]];
                if value >= next {
                    continue;
                }
                let n_left = pos + 1;
                let n_right = order.len() - n_left;
                let child_impurity =
                    n_left as f64 * gini(&left, n_left) + n_right as f64 * gini(&right, n_right);
                if best
                    .as_ref()
                    .is_none_or(|current| child_impurity < current.child_impurity)
                {
                    let mut threshold = value + (next - value) / 2.0;
                    // adjacent floats can round the midpoint up to `next`
                    if threshold >= next {
                        threshold = value;
                    }
                    best = Some(Candidate {
                        feature,
                        threshold,
                        child_impurity,
                    });
                }
            }
        }
        best
    }
}

impl DecisionTree {
    /// Grow a tree on `rows` of `x`, where `y[row]` is a class index below
    /// `n_classes`. Rows may repeat, as in a bootstrap sample.
    pub fn fit<'a>(
        x: ArrayView2<'a, f64>,
        y: &'a [usize],
        n_classes: usize,
        rows: Vec<usize>,
        options: TreeOptions,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let mut grower = Grower {
            x,
            y,
            n_classes,
            options,
            rng,
            importances: vec![0.0; x.ncols()],
        };
        let root = grower.grow(rows, 0);
        let mut importances = grower.importances;
        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            importances.iter_mut().for_each(|value| *value /= total);
        }
        Self { root, importances }
    }

    /// Class index for one feature row.
    pub fn predict_row(&self, row: ArrayView1<'_, f64>) -> usize {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { class } => return *class,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }

    /// Impurity decrease per feature, summing to 1 unless the tree is a single leaf.
    pub fn feature_importances(&self) -> &[f64] {
        &self.importances
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }
}

/// Bootstrap-aggregated decision trees over string class labels.
#[derive(Debug, Clone)]
pub struct BaggedForest {
    trees: Vec<DecisionTree>,
    classes: Vec<String>,
    importances: Vec<f64>,
}

impl BaggedForest {
    /// Fit `options.n_trees` trees. Tree `i` draws its bootstrap sample and
    /// split candidates from a generator seeded with `seed + i`.
    pub fn fit(x: &Array2<f64>, labels: &[String], options: &ForestOptions) -> Result<Self> {
        let (n_rows, n_features) = x.dim();
        if n_rows == 0 || n_features == 0 {
            return Err(PrepError::numeric(
                "feature matrix",
                format!("cannot fit a forest on {n_rows} rows and {n_features} features"),
            ));
        }
        if labels.len() != n_rows {
            return Err(PrepError::numeric(
                "target",
                format!("{} labels for {n_rows} rows", labels.len()),
            ));
        }
        if options.n_trees == 0 {
            return Err(PrepError::config("forest needs at least one tree"));
        }

        let mut classes: Vec<String> = labels.to_vec();
        classes.sort();
        classes.dedup();
        let y: Vec<usize> = labels
            .iter()
            .map(|label| classes.binary_search(label).unwrap_or_default())
            .collect();

        let tree_options = options.tree_options(n_features);
        let mut trees = Vec::with_capacity(options.n_trees);
        for tree_idx in 0..options.n_trees {
            let mut rng = ChaCha8Rng::seed_from_u64(options.seed.wrapping_add(tree_idx as u64));
            let sample: Vec<usize> = (0..n_rows).map(|_| rng.gen_range(0..n_rows)).collect();
            let tree = DecisionTree::fit(
                x.view(),
                &y,
                classes.len(),
                sample,
                tree_options,
                &mut rng,
            );
            debug!(tree = tree_idx, depth = tree.depth(), "tree grown");
            trees.push(tree);
        }

        let mut importances = vec![0.0; n_features];
        for tree in &trees {
            for (total, value) in importances.iter_mut().zip(tree.feature_importances()) {
                *total += value;
            }
        }
        let n_trees = trees.len() as f64;
        importances.iter_mut().for_each(|value| *value /= n_trees);

        Ok(Self {
            trees,
            classes,
            importances,
        })
    }

    /// Mean per-tree importance of each feature column.
    pub fn feature_importances(&self) -> &[f64] {
        &self.importances
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Majority vote of the trees for every row; ties go to the lower class.
    pub fn predict(&self, x: &Array2<f64>) -> Vec<String> {
        x.rows()
            .into_iter()
            .map(|row| {
                let mut votes = vec![0; self.classes.len()];
                for tree in &self.trees {
                    votes[tree.predict_row(row)] += 1;
                }
                self.classes[majority(&votes)].clone()
            })
            .collect()
    }
}
