//! Pairwise Pearson correlation between item response vectors.

use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::error::Result;
use crate::model::{ItemIndex, ITEM_COUNT};

/// 10×10 item correlation matrix.
///
/// `matrix[i][j]` is the Pearson correlation between items `i + 1` and
/// `j + 1`. The diagonal is always 1.0. When an item has zero variance its
/// off-diagonal entries are reported as 0.0 and its label is listed in
/// `degenerate_items`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub question_labels: Vec<String>,
    pub matrix: Vec<Vec<f64>>,
    #[serde(default)]
    pub degenerate_items: Vec<String>,
}

impl CorrelationMatrix {
    /// Look up the coefficient for a pair of items.
    pub fn get(&self, a: ItemIndex, b: ItemIndex) -> f64 {
        self.matrix[a.offset()][b.offset()]
    }
}

/// Pearson correlation coefficient of two equally long series.
///
/// Returns `None` when the series are empty, of different lengths, or when
/// either has zero variance.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.is_empty() || x.len() != y.len() {
        return None;
    }
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some((cov / (var_x * var_y).sqrt()).clamp(-1.0, 1.0))
}

fn has_variance(column: &[f64]) -> bool {
    column.windows(2).any(|w| w[0] != w[1])
}

/// Build the item correlation matrix for a dataset.
pub fn correlation_matrix(dataset: &Dataset) -> Result<CorrelationMatrix> {
    dataset.require_records()?;

    let columns: Vec<Vec<f64>> = ItemIndex::all().map(|i| dataset.item_column(i)).collect();
    let degenerate_items: Vec<String> = ItemIndex::all()
        .filter(|i| !has_variance(&columns[i.offset()]))
        .map(ItemIndex::label)
        .collect();

    let mut matrix = vec![vec![0.0; ITEM_COUNT]; ITEM_COUNT];
    for i in 0..ITEM_COUNT {
        matrix[i][i] = 1.0;
        for j in (i + 1)..ITEM_COUNT {
            let r = pearson(&columns[i], &columns[j]).unwrap_or(0.0);
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
    }

    if !degenerate_items.is_empty() {
        tracing::debug!(
            items = ?degenerate_items,
            "zero-variance items, off-diagonal correlations reported as 0"
        );
    }

    Ok(CorrelationMatrix {
        question_labels: ItemIndex::all().map(ItemIndex::label).collect(),
        matrix,
        degenerate_items,
    })
}
