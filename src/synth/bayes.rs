//! Bayesian-network synthesizers.
//!
//! Both families share one core: columns are discretized, a network is
//! learned greedily by pairwise mutual information (each node keeps at most
//! `degree` parents among earlier columns), and conditional probability
//! tables drive ancestral sampling. `PrivBayes` differs only in perturbing
//! the CPT counts with Laplace noise at scale `4(d − k)/(n·ε)` before
//! normalization, giving the differentially-private variant.

use crate::data::{ColumnKind, Dataset, Metadata, Record, RecordId, Value};
use crate::models::{LinkriskError, Result};
use crate::synth::GenerativeModel;
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::HashMap;

/// Discretization width for continuous columns.
const NUM_BINS: usize = 20;

/// General Bayesian-network synthesizer (no privacy noise).
pub struct BayesianNet {
    metadata: Metadata,
    degree: usize,
    fitted: Option<FittedNet>,
}

impl BayesianNet {
    pub fn new(metadata: Metadata, degree: usize) -> Self {
        Self {
            metadata,
            degree,
            fitted: None,
        }
    }
}

impl GenerativeModel for BayesianNet {
    fn label(&self) -> String {
        format!("BayesianNet({})", self.degree)
    }

    fn fit(&mut self, data: &Dataset, rng: &mut StdRng) -> Result<()> {
        self.fitted = Some(FittedNet::learn(&self.metadata, data, self.degree, None, rng)?);
        Ok(())
    }

    fn generate(&self, n: usize, rng: &mut StdRng) -> Result<Dataset> {
        let net = self
            .fitted
            .as_ref()
            .ok_or_else(|| LinkriskError::Internal("generate() before fit()".to_string()))?;
        net.sample(&self.metadata, n, rng)
    }
}

/// Differentially-private Bayesian-network synthesizer.
pub struct PrivBayes {
    metadata: Metadata,
    degree: usize,
    epsilon: f64,
    fitted: Option<FittedNet>,
}

impl PrivBayes {
    pub fn new(metadata: Metadata, degree: usize, epsilon: f64) -> Self {
        Self {
            metadata,
            degree,
            epsilon,
            fitted: None,
        }
    }
}

impl GenerativeModel for PrivBayes {
    fn label(&self) -> String {
        format!("PrivBayes({}, {})", self.degree, self.epsilon)
    }

    fn fit(&mut self, data: &Dataset, rng: &mut StdRng) -> Result<()> {
        let d = self.metadata.len() as f64;
        let k = self.degree as f64;
        // Laplace scale for the noisy conditional counts.
        let scale = 4.0 * (d - k).max(1.0) / (self.epsilon * data.len().max(1) as f64);
        self.fitted = Some(FittedNet::learn(
            &self.metadata,
            data,
            self.degree,
            Some(scale),
            rng,
        )?);
        Ok(())
    }

    fn generate(&self, n: usize, rng: &mut StdRng) -> Result<Dataset> {
        let net = self
            .fitted
            .as_ref()
            .ok_or_else(|| LinkriskError::Internal("generate() before fit()".to_string()))?;
        net.sample(&self.metadata, n, rng)
    }
}

/// One network node: a column, its parent columns, and its distributions.
struct Node {
    col: usize,
    parents: Vec<usize>,
    /// Child distribution per observed parent-bin configuration
    cpt: HashMap<Vec<usize>, Vec<f64>>,
    /// Fallback distribution for unseen parent configurations
    marginal: Vec<f64>,
}

/// A fitted network over discretized columns, in schema order.
struct FittedNet {
    nodes: Vec<Node>,
}

impl FittedNet {
    /// Learn structure and distributions from a population sample.
    ///
    /// `noise_scale` perturbs every count with Laplace noise when set.
    fn learn(
        metadata: &Metadata,
        data: &Dataset,
        degree: usize,
        noise_scale: Option<f64>,
        rng: &mut StdRng,
    ) -> Result<Self> {
        if data.is_empty() {
            return Err(LinkriskError::data(
                "cannot fit a generative model to an empty population sample",
            ));
        }
        let declared = metadata.column_names();
        if data.columns() != declared.as_slice() {
            return Err(LinkriskError::data(format!(
                "fit data columns {:?} do not match model metadata columns {declared:?}",
                data.columns()
            )));
        }

        let cards: Vec<usize> = metadata.columns.iter().map(|c| cardinality(&c.kind)).collect();
        let rows = discretize(metadata, data)?;

        let mut nodes = Vec::with_capacity(metadata.len());
        for col in 0..metadata.len() {
            let parents = pick_parents(&rows, &cards, col, degree);
            let (cpt, marginal) =
                fit_distributions(&rows, &cards, col, &parents, noise_scale, rng);
            nodes.push(Node {
                col,
                parents,
                cpt,
                marginal,
            });
        }

        Ok(Self { nodes })
    }

    /// Ancestral sampling of `n` synthetic records.
    fn sample(&self, metadata: &Metadata, n: usize, rng: &mut StdRng) -> Result<Dataset> {
        let mut records = Vec::with_capacity(n);
        for i in 0..n {
            let mut bins = vec![0usize; self.nodes.len()];
            for node in &self.nodes {
                let key: Vec<usize> = node.parents.iter().map(|&p| bins[p]).collect();
                let dist = node.cpt.get(&key).unwrap_or(&node.marginal);
                bins[node.col] = sample_categorical(dist, rng);
            }

            let values = metadata
                .columns
                .iter()
                .zip(&bins)
                .map(|(column, &bin)| unbin(&column.kind, bin, rng))
                .collect();
            records.push(Record {
                id: RecordId::from(format!("synth_{i}")),
                values,
            });
        }

        Dataset::new(
            metadata.column_names().iter().map(|s| s.to_string()).collect(),
            records,
        )
    }
}

/// Number of discrete states for a column.
fn cardinality(kind: &ColumnKind) -> usize {
    match kind {
        ColumnKind::Categorical { categories } => categories.len().max(1),
        ColumnKind::Integer { .. } | ColumnKind::Float { .. } => NUM_BINS,
    }
}

/// Discretize the whole dataset into bin indices, row-major.
fn discretize(metadata: &Metadata, data: &Dataset) -> Result<Vec<Vec<usize>>> {
    data.records()
        .iter()
        .map(|record| {
            metadata
                .columns
                .iter()
                .zip(&record.values)
                .map(|(column, value)| bin(column, value))
                .collect()
        })
        .collect()
}

fn bin(column: &crate::data::ColumnMeta, value: &Value) -> Result<usize> {
    match (&column.kind, value) {
        (ColumnKind::Categorical { categories }, Value::Text(s)) => categories
            .iter()
            .position(|c| c == s)
            .ok_or_else(|| {
                LinkriskError::data(format!(
                    "value '{s}' not in declared domain of column '{}'",
                    column.name
                ))
            }),
        (ColumnKind::Integer { min, max }, Value::Int(v)) => {
            let span = (max - min + 1) as f64;
            let offset = (v - min) as f64;
            Ok(((offset / span * NUM_BINS as f64) as usize).min(NUM_BINS - 1))
        }
        (ColumnKind::Float { min, max }, Value::Float(v)) => {
            let span = max - min;
            if span <= 0.0 {
                return Ok(0);
            }
            Ok((((v - min) / span * NUM_BINS as f64) as usize).min(NUM_BINS - 1))
        }
        (_, other) => Err(LinkriskError::data(format!(
            "value '{other}' has the wrong type for column '{}'",
            column.name
        ))),
    }
}

/// Map a bin index back to a concrete value, uniform within the bin.
fn unbin(kind: &ColumnKind, bin: usize, rng: &mut StdRng) -> Value {
    match kind {
        ColumnKind::Categorical { categories } => {
            let idx = bin.min(categories.len().saturating_sub(1));
            Value::Text(categories[idx].clone())
        }
        ColumnKind::Integer { min, max } => {
            let span = (max - min + 1) as f64;
            let width = span / NUM_BINS as f64;
            let lo = min + (bin as f64 * width) as i64;
            let hi = (min + ((bin + 1) as f64 * width) as i64 - 1).min(*max).max(lo);
            Value::Int(rng.gen_range(lo..=hi))
        }
        ColumnKind::Float { min, max } => {
            let span = max - min;
            if span <= 0.0 {
                return Value::Float(*min);
            }
            let width = span / NUM_BINS as f64;
            let lo = min + bin as f64 * width;
            Value::Float(rng.gen_range(lo..lo + width).min(*max))
        }
    }
}

/// Greedy parent selection: the `degree` earlier columns with highest
/// pairwise mutual information to `col`.
fn pick_parents(rows: &[Vec<usize>], cards: &[usize], col: usize, degree: usize) -> Vec<usize> {
    if col == 0 || degree == 0 {
        return Vec::new();
    }
    let mut scored: Vec<(usize, f64)> = (0..col)
        .map(|p| (p, mutual_information(rows, p, col, cards[p], cards[col])))
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    let mut parents: Vec<usize> = scored.into_iter().take(degree).map(|(p, _)| p).collect();
    parents.sort_unstable();
    parents
}

/// Pairwise mutual information over discretized columns, in nats.
fn mutual_information(
    rows: &[Vec<usize>],
    a: usize,
    b: usize,
    card_a: usize,
    card_b: usize,
) -> f64 {
    let n = rows.len() as f64;
    let mut joint = vec![0.0f64; card_a * card_b];
    let mut marg_a = vec![0.0f64; card_a];
    let mut marg_b = vec![0.0f64; card_b];

    for row in rows {
        joint[row[a] * card_b + row[b]] += 1.0;
        marg_a[row[a]] += 1.0;
        marg_b[row[b]] += 1.0;
    }

    let mut mi = 0.0;
    for ia in 0..card_a {
        for ib in 0..card_b {
            let p_ab = joint[ia * card_b + ib] / n;
            if p_ab > 0.0 {
                let p_a = marg_a[ia] / n;
                let p_b = marg_b[ib] / n;
                mi += p_ab * (p_ab / (p_a * p_b)).ln();
            }
        }
    }
    mi
}

/// Build the CPT and marginal fallback for one node, optionally noisy.
fn fit_distributions(
    rows: &[Vec<usize>],
    cards: &[usize],
    col: usize,
    parents: &[usize],
    noise_scale: Option<f64>,
    rng: &mut StdRng,
) -> (HashMap<Vec<usize>, Vec<f64>>, Vec<f64>) {
    let card = cards[col];

    let mut counts: HashMap<Vec<usize>, Vec<f64>> = HashMap::new();
    let mut marginal_counts = vec![0.0f64; card];
    for row in rows {
        let key: Vec<usize> = parents.iter().map(|&p| row[p]).collect();
        counts.entry(key).or_insert_with(|| vec![0.0; card])[row[col]] += 1.0;
        marginal_counts[row[col]] += 1.0;
    }

    let cpt = counts
        .into_iter()
        .map(|(key, cells)| (key, normalize_noisy(cells, noise_scale, rng)))
        .collect();
    let marginal = normalize_noisy(marginal_counts, noise_scale, rng);

    (cpt, marginal)
}

/// Perturb counts (when a scale is given), clamp negatives, normalize.
/// An all-zero vector falls back to uniform rather than dividing by zero.
fn normalize_noisy(mut cells: Vec<f64>, noise_scale: Option<f64>, rng: &mut StdRng) -> Vec<f64> {
    if let Some(scale) = noise_scale {
        for cell in &mut cells {
            *cell = (*cell + laplace(rng, scale)).max(0.0);
        }
    }
    let total: f64 = cells.iter().sum();
    if total <= 0.0 {
        let uniform = 1.0 / cells.len() as f64;
        return vec![uniform; cells.len()];
    }
    cells.iter().map(|c| c / total).collect()
}

/// Laplace sample, mu = 0, via inverse CDF.
fn laplace(rng: &mut StdRng, scale: f64) -> f64 {
    let u: f64 = rng.gen::<f64>() - 0.5;
    -scale * u.signum() * (1.0 - 2.0 * u.abs()).ln()
}

fn sample_categorical(dist: &[f64], rng: &mut StdRng) -> usize {
    let r: f64 = rng.gen();
    let mut cumulative = 0.0;
    for (idx, p) in dist.iter().enumerate() {
        cumulative += p;
        if r < cumulative {
            return idx;
        }
    }
    dist.len() - 1
}
