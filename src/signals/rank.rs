/// Ascending rank starting at 1; tied values share the mean of their positions.
///
/// `[30, 10, 10, 50]` ranks as `[3.0, 1.5, 1.5, 4.0]`.
pub fn average_rank(values: &[u64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by_key(|&i| values[i]);

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let value = values[order[start]];
        let mut end = start;
        while end + 1 < order.len() && values[order[end + 1]] == value {
            end += 1;
        }
        // positions start..=end are 1-based ranks start+1..=end+1
        let rank = (start + end) as f64 / 2.0 + 1.0;
        for &i in &order[start..=end] {
            ranks[i] = rank;
        }
        start = end + 1;
    }
    ranks
}
