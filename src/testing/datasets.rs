use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// `n_classes` blobs of `n_per_class` rows; class `c` sits around `4c` on
/// every feature with uniform noise in `[-1, 1)`, so classes never overlap.
pub fn blobs(
    n_per_class: usize,
    n_classes: usize,
    n_features: usize,
    seed: u64,
) -> (Array2<f64>, Array1<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let n = n_per_class * n_classes;
    let y = Array1::from_shape_fn(n, |i| (i / n_per_class) as f64);
    let x = Array2::from_shape_fn((n, n_features), |(i, _)| {
        4.0 * y[i] + rng.random_range(-1.0..1.0)
    });
    (x, y)
}

/// Delimited text with a header row; the label column is written last under `target_name`.
pub fn to_delimited(
    x: &Array2<f64>,
    y: &Array1<f64>,
    target_name: &str,
    separator: &str,
) -> String {
    let mut header: Vec<String> = (0..x.ncols()).map(|j| format!("f{j}")).collect();
    header.push(target_name.to_string());

    let mut out = header.join(separator);
    out.push('\n');
    for (row, label) in x.rows().into_iter().zip(y.iter()) {
        let mut cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        cells.push(label.to_string());
        out.push_str(&cells.join(separator));
        out.push('\n');
    }
    out
}
