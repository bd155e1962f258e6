//! Truncating oversized groups.

use log::warn;

/// Truncates every group to at most `max_size` members, keeping order.
///
/// # Examples
///
/// ```
/// use u_canvass::balance::cap;
///
/// let groups = vec![vec![1, 2, 3, 4], vec![5]];
/// assert_eq!(cap(groups, 2), vec![vec![1, 2], vec![5]]);
/// ```
pub fn cap<T>(groups: Vec<Vec<T>>, max_size: usize) -> Vec<Vec<T>> {
    cap_with_overflow(groups, max_size).0
}

/// Like [`cap`], also returning the dropped members in group order.
///
/// Dropped members are only left out of this run's output.
pub fn cap_with_overflow<T>(mut groups: Vec<Vec<T>>, max_size: usize) -> (Vec<Vec<T>>, Vec<T>) {
    let mut overflow = Vec::new();
    for (i, group) in groups.iter_mut().enumerate() {
        if group.len() > max_size {
            warn!(
                "team {i} capped at {max_size}: dropping {} members",
                group.len() - max_size
            );
            overflow.extend(group.drain(max_size..));
        }
    }
    (groups, overflow)
}
