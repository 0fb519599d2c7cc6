/// Splits `data` into `k` contiguous `(train, validation)` fold pairs.
///
/// `k` is clamped to the number of samples; the last fold absorbs the
/// remainder when `k` does not divide the length evenly. Callers wanting a
/// randomized split shuffle `data` first.
///
/// # Panics
/// Panics if `k` is zero.
pub fn k_fold_split<T: Clone>(data: &[T], k: usize) -> Vec<(Vec<T>, Vec<T>)> {
    assert!(k > 0, "k_fold_split: k must be at least 1");
    let n = data.len();
    let k = k.min(n);
    if k == 0 {
        return Vec::new();
    }

    let fold_size = n / k;
    let mut folds = Vec::with_capacity(k);
    let mut start = 0;
    for i in 0..k {
        let end = if i == k - 1 { n } else { start + fold_size };
        let validation = data[start..end].to_vec();
        let mut train = Vec::with_capacity(n - (end - start));
        train.extend_from_slice(&data[..start]);
        train.extend_from_slice(&data[end..]);
        folds.push((train, validation));
        start = end;
    }
    folds
}
