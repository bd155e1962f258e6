//! Folding undersized groups into their neighbours.

use log::debug;

fn smallest<T>(groups: &[Vec<T>]) -> Option<usize> {
    groups
        .iter()
        .enumerate()
        .min_by_key(|(_, g)| g.len())
        .map(|(i, _)| i)
}

/// Removes the smallest group and appends its members to the next smallest.
///
/// Ties go to the first group encountered. The relative order of all other
/// groups, and of members within each group, is unchanged. With fewer than
/// two groups the input is returned as is.
///
/// # Examples
///
/// ```
/// use u_canvass::balance::merge_smallest;
///
/// let groups = vec![vec![1, 2, 3], vec![4], vec![5, 6]];
/// assert_eq!(merge_smallest(groups), vec![vec![1, 2, 3], vec![5, 6, 4]]);
/// ```
pub fn merge_smallest<T>(mut groups: Vec<Vec<T>>) -> Vec<Vec<T>> {
    if groups.len() < 2 {
        return groups;
    }
    let Some(from) = smallest(&groups) else {
        return groups;
    };
    let removed = groups.remove(from);
    if let Some(into) = smallest(&groups) {
        debug!(
            "merging group of {} into group of {}",
            removed.len(),
            groups[into].len()
        );
        groups[into].extend(removed);
    }
    groups
}

/// Applies [`merge_smallest`] `times` times, stopping early at one group.
pub fn merge_smallest_n<T>(mut groups: Vec<Vec<T>>, times: usize) -> Vec<Vec<T>> {
    for _ in 0..times {
        if groups.len() < 2 {
            break;
        }
        groups = merge_smallest(groups);
    }
    groups
}
