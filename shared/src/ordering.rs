//! Order assignment service
//!
//! 所有 `sort_order` 值的唯一来源。Area / Project / TaskSection / Task /
//! ChecklistItem / Tag 在各自 scope 内的排序值全部经由这里计算，
//! 服务端（创建追加、批量重排）和客户端（拖拽插入）共用同一套函数。
//!
//! 排序策略：fractional ordering。新值取相邻两项的中点，单次移动只写
//! 一条记录；当相邻间隔缩小到 [`MIN_GAP`] 以下时由调用方触发
//! [`renumber_scope`] 重排整个 scope。
//!
//! 约定：
//! - `sort_order` 为严格正数的 f64，同一 scope 内按升序比较
//! - 同值时以 `id` 升序作为稳定次序
//! - `order_for_insert_between` 要求 `prev < next`（两者都提供时），
//!   排序正确性由调用方保证

/// 追加/重排时的默认间隔
pub const GAP: f64 = 1000.0;

/// 重排阈值：相邻间隔小于该值时不再取中点，先重排 scope
pub const MIN_GAP: f64 = 1.0;

/// Order value for appending to the end of a scope.
///
/// Returns a value strictly greater than every existing order,
/// or [`GAP`] for an empty scope.
pub fn order_for_append(existing: &[f64]) -> f64 {
    match existing.iter().copied().fold(None::<f64>, |acc, v| {
        Some(acc.map_or(v, |m| if v > m { v } else { m }))
    }) {
        Some(max) => max + GAP,
        None => GAP,
    }
}

/// Order value for inserting between two neighbors.
///
/// - both absent: first item ever, returns [`GAP`]
/// - only `next`: insert before the first item, returns `next / 2`
/// - only `prev`: insert after the last item, returns `prev + GAP`
/// - both: midpoint `prev + (next - prev) / 2`
///
/// Returns `None` when the available gap has collapsed below
/// [`MIN_GAP`] (or a before-first insert can no longer stay at least
/// [`MIN_GAP`] above zero). The caller must renumber the scope via
/// [`renumber_scope`] and retry; `None` must never surface to the user.
pub fn order_for_insert_between(prev: Option<f64>, next: Option<f64>) -> Option<f64> {
    match (prev, next) {
        (None, None) => Some(GAP),
        (Some(p), None) => Some(p + GAP),
        (None, Some(n)) => {
            let half = n / 2.0;
            if half < MIN_GAP { None } else { Some(half) }
        }
        (Some(p), Some(n)) => {
            debug_assert!(p < n, "order_for_insert_between requires prev < next");
            if n - p < MIN_GAP {
                None
            } else {
                Some(p + (n - p) / 2.0)
            }
        }
    }
}

/// Convenience wrapper: order value for dropping an item at
/// `dest_index` of a scope.
///
/// `sorted` must be the scope's current orders ascending, WITHOUT the
/// item being moved. `dest_index` may equal `sorted.len()` (append).
pub fn order_for_index_move(sorted: &[f64], dest_index: usize) -> Option<f64> {
    let prev = if dest_index == 0 {
        None
    } else {
        sorted.get(dest_index - 1).copied()
    };
    let next = sorted.get(dest_index).copied();
    order_for_insert_between(prev, next)
}

/// Renumber a whole scope: `GAP, 2*GAP, 3*GAP, …` in input sequence.
///
/// `ids` must already be in the desired final order. Used for the batch
/// reorder endpoint and for renormalization after fractional gaps have
/// been exhausted; the relative sequence is preserved exactly.
pub fn renumber_scope(ids: &[i64]) -> Vec<(i64, f64)> {
    ids.iter()
        .enumerate()
        .map(|(i, id)| (*id, (i as f64 + 1.0) * GAP))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_to_empty_scope() {
        assert_eq!(order_for_append(&[]), GAP);
    }

    #[test]
    fn test_append_is_strictly_greater() {
        let existing = [1000.0, 2000.0, 1500.0, 250.5];
        let appended = order_for_append(&existing);
        for v in existing {
            assert!(appended > v);
        }
        assert_eq!(appended, 3000.0);
    }

    #[test]
    fn test_sequential_appends() {
        // 空列表追加两项: 1000, 2000
        let first = order_for_append(&[]);
        assert_eq!(first, 1000.0);
        let second = order_for_append(&[first]);
        assert_eq!(second, 2000.0);
    }

    #[test]
    fn test_insert_into_empty_scope() {
        assert_eq!(order_for_insert_between(None, None), Some(GAP));
    }

    #[test]
    fn test_insert_after_last() {
        assert_eq!(order_for_insert_between(Some(3000.0), None), Some(4000.0));
    }

    #[test]
    fn test_insert_before_first() {
        assert_eq!(order_for_insert_between(None, Some(1000.0)), Some(500.0));
    }

    #[test]
    fn test_insert_before_first_exhausted() {
        // next/2 已低于 MIN_GAP，必须先重排
        assert_eq!(order_for_insert_between(None, Some(1.5)), None);
    }

    #[test]
    fn test_midpoint_between_neighbors() {
        assert_eq!(
            order_for_insert_between(Some(1000.0), Some(2000.0)),
            Some(1500.0)
        );
    }

    #[test]
    fn test_midpoint_bounds() {
        // prev < result < next for a range of gap widths
        let pairs = [
            (1000.0, 2000.0),
            (1.0, 2.5),
            (999.0, 1000.5),
            (0.5, 1000000.0),
        ];
        for (prev, next) in pairs {
            let mid = order_for_insert_between(Some(prev), Some(next)).unwrap();
            assert!(prev < mid && mid < next, "midpoint {mid} out of ({prev}, {next})");
        }
    }

    #[test]
    fn test_midpoint_gap_exhausted() {
        assert_eq!(order_for_insert_between(Some(1000.0), Some(1000.5)), None);
        // 恰好等于 MIN_GAP 仍然可用
        assert!(order_for_insert_between(Some(1000.0), Some(1001.0)).is_some());
    }

    #[test]
    fn test_repeated_halving_eventually_requires_renumber() {
        // 反复在头部插入，间隔折半，最终必须触发重排而不是无限缩小
        let mut first = GAP;
        let mut steps = 0;
        while let Some(v) = order_for_insert_between(None, Some(first)) {
            assert!(v < first);
            first = v;
            steps += 1;
            assert!(steps < 64, "halving never hit the renumber threshold");
        }
        assert!(first >= MIN_GAP);
    }

    #[test]
    fn test_index_move_front_middle_end() {
        let sorted = [1000.0, 2000.0, 3000.0];
        assert_eq!(order_for_index_move(&sorted, 0), Some(500.0));
        assert_eq!(order_for_index_move(&sorted, 1), Some(1500.0));
        assert_eq!(order_for_index_move(&sorted, 3), Some(4000.0));
    }

    #[test]
    fn test_index_move_empty() {
        assert_eq!(order_for_index_move(&[], 0), Some(GAP));
    }

    #[test]
    fn test_renumber_preserves_sequence() {
        let ids = [42, 7, 99, 3];
        let renumbered = renumber_scope(&ids);
        assert_eq!(renumbered.len(), ids.len());
        // 顺序与输入一致
        for (i, (id, _)) in renumbered.iter().enumerate() {
            assert_eq!(*id, ids[i]);
        }
        // 严格递增且间隔为 GAP
        for window in renumbered.windows(2) {
            assert!(window[0].1 < window[1].1);
            assert_eq!(window[1].1 - window[0].1, GAP);
        }
        assert_eq!(renumbered[0].1, GAP);
    }

    #[test]
    fn test_renumber_empty() {
        assert!(renumber_scope(&[]).is_empty());
    }

    #[test]
    fn test_exhausted_gap_scenario() {
        // [T1(1000), T2(1000.0000000001)]: 间隔耗尽，中点不可用，
        // 重排后再取中点必须成功
        let t1 = 1000.0;
        let t2 = 1000.0000000001;
        assert_eq!(order_for_insert_between(Some(t1), Some(t2)), None);

        let renumbered = renumber_scope(&[1, 2]);
        let (new_t1, new_t2) = (renumbered[0].1, renumbered[1].1);
        let mid = order_for_insert_between(Some(new_t1), Some(new_t2)).unwrap();
        assert!(new_t1 < mid && mid < new_t2);
    }
}
