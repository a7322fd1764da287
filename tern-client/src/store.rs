//! In-memory ordered item store
//!
//! 每个 [`Scope`] 一条有序列表，协调器是唯一写入方；视图只读取
//! [`ItemStore::items`] 的排序投影。列表恒按 `(sort_order, id)` 升序
//! 维护，`id` 作为同值时的稳定次序，保证重复读取顺序一致。

use std::collections::HashMap;

use shared::Scope;

/// One ordered item as the store tracks it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScopedItem {
    pub id: i64,
    pub sort_order: f64,
}

impl ScopedItem {
    pub fn new(id: i64, sort_order: f64) -> Self {
        Self { id, sort_order }
    }
}

/// Scope-keyed ordered collections
#[derive(Debug, Default)]
pub struct ItemStore {
    scopes: HashMap<Scope, Vec<ScopedItem>>,
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load (or replace) a scope's items. The input is re-sorted
    /// defensively — server ordering is not trusted.
    pub fn load(&mut self, scope: Scope, mut items: Vec<ScopedItem>) {
        sort_items(&mut items);
        self.scopes.insert(scope, items);
    }

    /// Sorted projection of one scope (empty if never loaded)
    pub fn items(&self, scope: Scope) -> &[ScopedItem] {
        self.scopes.get(&scope).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self, scope: Scope) -> usize {
        self.items(scope).len()
    }

    pub fn is_empty(&self, scope: Scope) -> bool {
        self.len(scope) == 0
    }

    /// Find which scope currently holds `id`, and at what index
    pub fn locate(&self, id: i64) -> Option<(Scope, usize)> {
        for (scope, items) in &self.scopes {
            if let Some(index) = items.iter().position(|it| it.id == id) {
                return Some((*scope, index));
            }
        }
        None
    }

    pub fn index_of(&self, scope: Scope, id: i64) -> Option<usize> {
        self.items(scope).iter().position(|it| it.id == id)
    }

    /// Current sort_order values of a scope, ascending
    pub fn orders(&self, scope: Scope) -> Vec<f64> {
        self.items(scope).iter().map(|it| it.sort_order).collect()
    }

    /// Current IDs of a scope in display order
    pub fn ids(&self, scope: Scope) -> Vec<i64> {
        self.items(scope).iter().map(|it| it.id).collect()
    }

    /// Insert an item at its sorted position, returning that position
    pub fn insert(&mut self, scope: Scope, item: ScopedItem) -> usize {
        let items = self.scopes.entry(scope).or_default();
        let pos = items
            .iter()
            .position(|it| !items_less(it, &item))
            .unwrap_or(items.len());
        items.insert(pos, item);
        pos
    }

    pub fn remove(&mut self, scope: Scope, id: i64) -> Option<ScopedItem> {
        let items = self.scopes.get_mut(&scope)?;
        let pos = items.iter().position(|it| it.id == id)?;
        Some(items.remove(pos))
    }

    /// Apply a set of (id, sort_order) assignments to one scope, then
    /// restore the sort invariant. Unknown IDs are ignored.
    pub fn apply_orders(&mut self, scope: Scope, assignments: &[(i64, f64)]) {
        if let Some(items) = self.scopes.get_mut(&scope) {
            for (id, sort_order) in assignments {
                if let Some(item) = items.iter_mut().find(|it| it.id == *id) {
                    item.sort_order = *sort_order;
                }
            }
            sort_items(items);
        }
    }

    /// Copy of a scope's current state, for pre-drag rollback
    pub fn snapshot(&self, scope: Scope) -> Vec<ScopedItem> {
        self.items(scope).to_vec()
    }

    /// Restore a scope from a snapshot
    pub fn restore(&mut self, scope: Scope, snapshot: Vec<ScopedItem>) {
        self.scopes.insert(scope, snapshot);
    }
}

fn items_less(a: &ScopedItem, b: &ScopedItem) -> bool {
    match a.sort_order.total_cmp(&b.sort_order) {
        std::cmp::Ordering::Less => true,
        std::cmp::Ordering::Greater => false,
        std::cmp::Ordering::Equal => a.id < b.id,
    }
}

fn sort_items(items: &mut [ScopedItem]) {
    items.sort_by(|a, b| {
        a.sort_order
            .total_cmp(&b.sort_order)
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> Scope {
        Scope::project_tasks(1)
    }

    #[test]
    fn test_load_resorts_defensively() {
        // 服务端顺序不可信，载入时重排
        let mut store = ItemStore::new();
        store.load(
            scope(),
            vec![
                ScopedItem::new(3, 3000.0),
                ScopedItem::new(1, 1000.0),
                ScopedItem::new(2, 2000.0),
            ],
        );
        assert_eq!(store.ids(scope()), vec![1, 2, 3]);
    }

    #[test]
    fn test_ties_break_by_id() {
        let mut store = ItemStore::new();
        store.load(
            scope(),
            vec![
                ScopedItem::new(9, 1000.0),
                ScopedItem::new(4, 1000.0),
                ScopedItem::new(7, 1000.0),
            ],
        );
        assert_eq!(store.ids(scope()), vec![4, 7, 9]);

        // 重复载入同样数据得到同样顺序
        store.load(
            scope(),
            vec![
                ScopedItem::new(7, 1000.0),
                ScopedItem::new(9, 1000.0),
                ScopedItem::new(4, 1000.0),
            ],
        );
        assert_eq!(store.ids(scope()), vec![4, 7, 9]);
    }

    #[test]
    fn test_insert_returns_sorted_position() {
        let mut store = ItemStore::new();
        store.load(
            scope(),
            vec![ScopedItem::new(1, 1000.0), ScopedItem::new(2, 2000.0)],
        );
        let pos = store.insert(scope(), ScopedItem::new(3, 1500.0));
        assert_eq!(pos, 1);
        assert_eq!(store.ids(scope()), vec![1, 3, 2]);
    }

    #[test]
    fn test_remove_and_locate() {
        let mut store = ItemStore::new();
        store.load(
            scope(),
            vec![ScopedItem::new(1, 1000.0), ScopedItem::new(2, 2000.0)],
        );
        assert_eq!(store.locate(2), Some((scope(), 1)));

        let removed = store.remove(scope(), 2).unwrap();
        assert_eq!(removed.sort_order, 2000.0);
        assert_eq!(store.locate(2), None);
        assert_eq!(store.len(scope()), 1);
    }

    #[test]
    fn test_apply_orders_resorts() {
        let mut store = ItemStore::new();
        store.load(
            scope(),
            vec![
                ScopedItem::new(1, 1000.0),
                ScopedItem::new(2, 2000.0),
                ScopedItem::new(3, 3000.0),
            ],
        );
        store.apply_orders(scope(), &[(3, 1000.0), (1, 2000.0), (2, 3000.0)]);
        assert_eq!(store.ids(scope()), vec![3, 1, 2]);
    }

    #[test]
    fn test_snapshot_restore_roundtrip() {
        let mut store = ItemStore::new();
        store.load(
            scope(),
            vec![ScopedItem::new(1, 1000.0), ScopedItem::new(2, 2000.0)],
        );
        let snapshot = store.snapshot(scope());

        store.remove(scope(), 1);
        store.insert(scope(), ScopedItem::new(1, 5000.0));
        assert_eq!(store.ids(scope()), vec![2, 1]);

        store.restore(scope(), snapshot);
        assert_eq!(store.ids(scope()), vec![1, 2]);
    }
}
