//! Held-out evaluation metrics for binary classifiers.

/// Area under the ROC curve via the rank-sum statistic, averaging ranks across ties.
///
/// Returns `None` unless both classes are present.
pub fn roc_auc(labels: &[f64], scores: &[f64]) -> Option<f64> {
    let positives = labels.iter().filter(|label| **label >= 0.5).count();
    let negatives = labels.len() - positives;
    if positives == 0 || negatives == 0 || labels.len() != scores.len() {
        return None;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|a, b| scores[*a].total_cmp(&scores[*b]));

    let mut ranks = vec![0.0; scores.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start;
        while end + 1 < order.len() && scores[order[end + 1]] == scores[order[start]] {
            end += 1;
        }
        // 1-based ranks; tied scores share the mean of their positions.
        let shared = (start + end) as f64 / 2.0 + 1.0;
        for idx in &order[start..=end] {
            ranks[*idx] = shared;
        }
        start = end + 1;
    }

    let positive_rank_sum: f64 = labels
        .iter()
        .zip(&ranks)
        .filter(|(label, _)| **label >= 0.5)
        .map(|(_, rank)| rank)
        .sum();
    let positives = positives as f64;
    let negatives = negatives as f64;
    Some((positive_rank_sum - positives * (positives + 1.0) / 2.0) / (positives * negatives))
}

/// Root mean squared error, `None` for empty input.
pub fn rmse(labels: &[f64], predictions: &[f64]) -> Option<f64> {
    if labels.is_empty() || labels.len() != predictions.len() {
        return None;
    }
    let sum: f64 = labels
        .iter()
        .zip(predictions)
        .map(|(label, prediction)| (label - prediction).powi(2))
        .sum();
    Some((sum / labels.len() as f64).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_ranking_scores_one() {
        let auc = roc_auc(&[0.0, 0.0, 1.0, 1.0], &[0.1, 0.2, 0.8, 0.9]).expect("both classes");
        assert!((auc - 1.0).abs() < 1e-12);
    }

    #[test]
    fn inverted_ranking_scores_zero() {
        let auc = roc_auc(&[1.0, 1.0, 0.0, 0.0], &[0.1, 0.2, 0.8, 0.9]).expect("both classes");
        assert!(auc.abs() < 1e-12);
    }

    #[test]
    fn ties_count_half() {
        let auc = roc_auc(&[0.0, 1.0], &[0.5, 0.5]).expect("both classes");
        assert!((auc - 0.5).abs() < 1e-12);
    }

    #[test]
    fn single_class_has_no_auc() {
        assert_eq!(roc_auc(&[1.0, 1.0], &[0.3, 0.7]), None);
        assert_eq!(roc_auc(&[], &[]), None);
    }

    #[test]
    fn rmse_matches_hand_computation() {
        // errors 0.2 and 0.4 -> sqrt((0.04 + 0.16) / 2) = sqrt(0.1)
        let value = rmse(&[1.0, 0.0], &[0.8, 0.4]).expect("non-empty");
        assert!((value - 0.1_f64.sqrt()).abs() < 1e-12);
        assert_eq!(rmse(&[], &[]), None);
    }
}
