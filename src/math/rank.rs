//! Ranking and moment helpers shared by the dependence estimators.

/// 1-based ranks with ties resolved by the average rank of the tied block.
///
/// Ordering uses `f64::total_cmp`; callers are expected to pass finite values.
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; n];
    let mut start = 0;
    while start < n {
        let mut end = start + 1;
        while end < n && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // Positions start..end (0-based) hold ranks start+1..=end.
        let avg_rank = (start + end + 1) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = avg_rank;
        }
        start = end;
    }
    ranks
}

/// Sizes of tied blocks (only blocks of size > 1).
pub fn tie_groups(values: &[f64]) -> Vec<usize> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mut groups = Vec::new();
    let mut start = 0;
    while start < sorted.len() {
        let mut end = start + 1;
        while end < sorted.len() && sorted[end] == sorted[start] {
            end += 1;
        }
        if end - start > 1 {
            groups.push(end - start);
        }
        start = end;
    }
    groups
}

/// `true` if every element equals the first (an empty slice counts as constant).
pub fn is_constant(values: &[f64]) -> bool {
    match values.first() {
        Some(&first) => values.iter().all(|&v| v == first),
        None => true,
    }
}

/// Pearson correlation; `None` when either input has zero variance.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len().min(y.len());
    if n < 2 {
        return None;
    }
    let nf = n as f64;
    let mx = x[..n].iter().sum::<f64>() / nf;
    let my = y[..n].iter().sum::<f64>() / nf;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for i in 0..n {
        let dx = x[i] - mx;
        let dy = y[i] - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn ranks_without_ties() {
        assert_eq!(average_ranks(&[3.0, 1.0, 2.0]), vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn ties_get_average_rank() {
        let r = average_ranks(&[10.0, 20.0, 20.0, 5.0, 20.0]);
        assert_eq!(r, vec![2.0, 4.0, 4.0, 1.0, 4.0]);
        assert_eq!(tie_groups(&[10.0, 20.0, 20.0, 5.0, 20.0, 5.0]), vec![2, 3]);
    }

    #[test]
    fn pearson_of_linear_data_is_one() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [2.0, 4.0, 6.0, 8.0];
        assert_abs_diff_eq!(pearson(&x, &y).unwrap(), 1.0, epsilon = 1e-15);
        let y_rev = [8.0, 6.0, 4.0, 2.0];
        assert_abs_diff_eq!(pearson(&x, &y_rev).unwrap(), -1.0, epsilon = 1e-15);
    }

    #[test]
    fn pearson_undefined_for_constant_input() {
        assert!(pearson(&[1.0, 2.0, 3.0], &[5.0, 5.0, 5.0]).is_none());
        assert!(is_constant(&[5.0, 5.0, 5.0]));
        assert!(!is_constant(&[5.0, 5.0, 5.1]));
    }
}
