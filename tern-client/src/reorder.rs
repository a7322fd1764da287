//! Reorder synchronization controller
//!
//! 把一次拖拽手势（目标 scope + 目标下标）变成持久化的排序变更：
//!
//! 1. **Resolving**: 在 store 锁内完成本地乐观重排，经
//!    `shared::ordering` 算出新的 sort_order
//! 2. **Persisting**: 带超时地调用 [`OrderPersistence`]，同一 scope 的
//!    持久化按手势完成顺序串行
//! 3. **Settled / Reverted**: 成功即采纳；失败按策略重试，最终失败则
//!    回滚到拖拽前快照并向调用方报错
//!
//! fractional 策略下一次移动只写一条记录；相邻间隔耗尽时自动重排
//! 整个 scope（对调用方透明），此时批量写是唯一的例外。
//! 本地与服务端排序静默分叉是明确不允许的结果。

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::Mutex;
use thiserror::Error;

use crate::error::ClientError;
use crate::persistence::OrderPersistence;
use crate::store::{ItemStore, ScopedItem};
use shared::{ItemKey, Scope, ordering};

/// 持久化失败时的恢复策略
#[derive(Debug, Clone, Copy)]
pub enum RecoveryPolicy {
    /// 立即回滚到拖拽前快照
    Revert,
    /// 先重试，耗尽次数后回滚
    RetryThenRevert { attempts: u32, backoff: Duration },
}

/// 一次拖拽手势的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Idle,
    Dragging,
    Resolving,
    Persisting,
    Settled,
    Reverted,
}

/// An in-flight drag gesture, created by [`ReorderController::begin_drag`]
#[derive(Debug, Clone)]
pub struct DragGesture {
    pub item: ItemKey,
    pub origin_scope: Scope,
    pub origin_index: usize,
    pub phase: GesturePhase,
}

/// Outcome of a settled single-item reorder
#[derive(Debug, Clone)]
pub struct ReorderOutcome {
    pub item: ItemKey,
    pub scope: Scope,
    pub new_order: f64,
    /// 此次手势是否触发了整个 scope 的重排
    pub renumbered: bool,
}

/// Outcome of a settled full-list reorder
#[derive(Debug, Clone)]
pub struct ReorderAllOutcome {
    pub scope: Scope,
    /// 实际写入服务端的记录数（diff 快路径下为 1，重排时为全量）
    pub persisted: usize,
    pub renumbered: bool,
}

/// Reorder errors surfaced to the caller
#[derive(Debug, Error)]
pub enum ReorderError {
    /// 目标下标越界；状态未被修改
    #[error("invalid destination index {index} (scope holds {len} items)")]
    InvalidPosition { index: usize, len: usize },

    /// 条目不在当前本地集合中（可能已被删除）；状态未被修改
    #[error("item {0} not found in the local collection")]
    ItemNotFound(i64),

    /// 持久化最终失败，本地状态已回滚到拖拽前
    #[error("failed to persist new order: {source}")]
    Persistence {
        #[source]
        source: ClientError,
    },
}

/// 持久化计划：每个手势恰好一次调用；跨 scope 且间隔耗尽的罕见
/// 组合需要 move + batch 两步
enum PersistPlan {
    Single {
        item: ItemKey,
        order: f64,
    },
    Batch {
        scope: Scope,
        ordered_ids: Vec<i64>,
    },
    Move {
        item: ItemKey,
        dest: Scope,
        order: f64,
    },
    MoveThenBatch {
        item: ItemKey,
        dest: Scope,
        appended: f64,
        ordered_ids: Vec<i64>,
    },
}

/// Drag-reorder coordinator: optimistic local state + server reconciliation
pub struct ReorderController<P> {
    store: Mutex<ItemStore>,
    persistence: P,
    policy: RecoveryPolicy,
    timeout: Duration,
    scope_locks: DashMap<Scope, Arc<tokio::sync::Mutex<()>>>,
}

impl<P: OrderPersistence> ReorderController<P> {
    /// 默认策略：失败即回滚，持久化超时 10s
    pub fn new(persistence: P) -> Self {
        Self {
            store: Mutex::new(ItemStore::new()),
            persistence,
            policy: RecoveryPolicy::Revert,
            timeout: Duration::from_secs(10),
            scope_locks: DashMap::new(),
        }
    }

    pub fn with_policy(mut self, policy: RecoveryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    // ========== Store access ==========

    /// Load (or refresh) a scope's items from a server fetch
    pub fn load_scope(&self, scope: Scope, items: Vec<ScopedItem>) {
        self.store.lock().load(scope, items);
    }

    /// Sorted projection for rendering
    pub fn items(&self, scope: Scope) -> Vec<ScopedItem> {
        self.store.lock().items(scope).to_vec()
    }

    /// Display order of one scope
    pub fn ids(&self, scope: Scope) -> Vec<i64> {
        self.store.lock().ids(scope)
    }

    pub fn position_of(&self, scope: Scope, id: i64) -> Option<usize> {
        self.store.lock().index_of(scope, id)
    }

    // ========== Gesture lifecycle ==========

    /// Capture the dragged item and its origin. No mutation happens here;
    /// intermediate drag-over states never touch the store or the server.
    pub fn begin_drag(&self, item: ItemKey) -> Result<DragGesture, ReorderError> {
        let store = self.store.lock();
        let (origin_scope, origin_index) = store
            .locate(item.id)
            .ok_or(ReorderError::ItemNotFound(item.id))?;
        Ok(DragGesture {
            item,
            origin_scope,
            origin_index,
            phase: GesturePhase::Dragging,
        })
    }

    /// Resolve and persist a completed drag
    pub async fn complete_drag(
        &self,
        mut gesture: DragGesture,
        dest_scope: Scope,
        dest_index: usize,
    ) -> Result<ReorderOutcome, ReorderError> {
        gesture.phase = GesturePhase::Resolving;

        // Resolving: 本地乐观更新在 store 锁内同步完成，后续手势
        // 一定基于已更新的本地状态计算，绝不基于陈旧快照
        let (plan, new_order, renumbered, rollback) = {
            let mut store = self.store.lock();

            let (origin_scope, _) = store
                .locate(gesture.item.id)
                .ok_or(ReorderError::ItemNotFound(gesture.item.id))?;
            let same_scope = origin_scope == dest_scope;

            // 校验先于任何修改
            let rendered_len = store.len(dest_scope);
            if dest_index > rendered_len {
                return Err(ReorderError::InvalidPosition {
                    index: dest_index,
                    len: rendered_len,
                });
            }

            let origin_snapshot = store.snapshot(origin_scope);
            let dest_snapshot = (!same_scope).then(|| store.snapshot(dest_scope));

            let moved = store
                .remove(origin_scope, gesture.item.id)
                .ok_or(ReorderError::ItemNotFound(gesture.item.id))?;
            let effective = dest_index.min(store.len(dest_scope));
            let neighbors = store.orders(dest_scope);

            match ordering::order_for_index_move(&neighbors, effective) {
                Some(order) => {
                    store.insert(dest_scope, ScopedItem::new(moved.id, order));
                    let plan = if same_scope {
                        PersistPlan::Single {
                            item: gesture.item,
                            order,
                        }
                    } else {
                        PersistPlan::Move {
                            item: gesture.item,
                            dest: dest_scope,
                            order,
                        }
                    };
                    (
                        plan,
                        order,
                        false,
                        (origin_scope, origin_snapshot, dest_snapshot),
                    )
                }
                None => {
                    // 间隔耗尽：重排目标 scope，移动的条目并入同一次重排
                    tracing::debug!(
                        scope = %dest_scope,
                        "Fractional gap exhausted, renumbering scope"
                    );
                    let appended = ordering::order_for_append(&neighbors);
                    let mut ids = store.ids(dest_scope);
                    ids.insert(effective, moved.id);
                    let assignments = ordering::renumber_scope(&ids);
                    store.insert(dest_scope, ScopedItem::new(moved.id, appended));
                    store.apply_orders(dest_scope, &assignments);

                    let new_order = assignments
                        .iter()
                        .find(|(id, _)| *id == moved.id)
                        .map(|(_, order)| *order)
                        .unwrap_or(appended);
                    let plan = if same_scope {
                        PersistPlan::Batch {
                            scope: dest_scope,
                            ordered_ids: ids,
                        }
                    } else {
                        PersistPlan::MoveThenBatch {
                            item: gesture.item,
                            dest: dest_scope,
                            appended,
                            ordered_ids: ids,
                        }
                    };
                    (
                        plan,
                        new_order,
                        true,
                        (origin_scope, origin_snapshot, dest_snapshot),
                    )
                }
            }
        };

        // Persisting: 同一 scope 串行，带超时与重试
        gesture.phase = GesturePhase::Persisting;
        match self.persist_with_recovery(dest_scope, &plan).await {
            Ok(()) => {
                gesture.phase = GesturePhase::Settled;
                tracing::debug!(
                    item = %gesture.item,
                    scope = %dest_scope,
                    index = dest_index,
                    order = new_order,
                    renumbered,
                    "Reorder settled"
                );
                Ok(ReorderOutcome {
                    item: gesture.item,
                    scope: dest_scope,
                    new_order,
                    renumbered,
                })
            }
            Err(source) => {
                // Reverted: 回滚到拖拽前快照，向调用方报错
                let (origin_scope, origin_snapshot, dest_snapshot) = rollback;
                let mut store = self.store.lock();
                store.restore(origin_scope, origin_snapshot);
                if let Some(snapshot) = dest_snapshot {
                    store.restore(dest_scope, snapshot);
                }
                gesture.phase = GesturePhase::Reverted;
                tracing::warn!(
                    item = %gesture.item,
                    scope = %dest_scope,
                    error = %source,
                    "Reorder persistence failed, local state reverted"
                );
                Err(ReorderError::Persistence { source })
            }
        }
    }

    /// Convenience: begin + complete in one call
    pub async fn reorder(
        &self,
        item: ItemKey,
        dest_scope: Scope,
        dest_index: usize,
    ) -> Result<ReorderOutcome, ReorderError> {
        let gesture = self.begin_drag(item)?;
        self.complete_drag(gesture, dest_scope, dest_index).await
    }

    /// Full-list reorder, e.g. from a drag-and-drop library that reports
    /// the whole new sequence.
    ///
    /// 与当前顺序 diff：恰好一个条目被移动时走单条写入的快路径，
    /// 其余情况整体重排（O(n) 写，但保持单次批量调用）。
    pub async fn reorder_all(
        &self,
        scope: Scope,
        ordered_ids: &[i64],
    ) -> Result<ReorderAllOutcome, ReorderError> {
        let (plan, persisted, snapshot) = {
            let mut store = self.store.lock();
            let current = store.ids(scope);

            // 必须是当前集合的一个排列
            if ordered_ids.len() != current.len() {
                return Err(ReorderError::InvalidPosition {
                    index: ordered_ids.len(),
                    len: current.len(),
                });
            }
            for id in ordered_ids {
                if !current.contains(id) {
                    return Err(ReorderError::ItemNotFound(*id));
                }
            }

            if current == ordered_ids {
                // 顺序未变，零写入
                return Ok(ReorderAllOutcome {
                    scope,
                    persisted: 0,
                    renumbered: false,
                });
            }

            let snapshot = store.snapshot(scope);

            match single_displaced_item(&current, ordered_ids) {
                Some((moved_id, dest_index)) => {
                    let moved = store
                        .remove(scope, moved_id)
                        .ok_or(ReorderError::ItemNotFound(moved_id))?;
                    let neighbors = store.orders(scope);
                    match ordering::order_for_index_move(&neighbors, dest_index) {
                        Some(order) => {
                            store.insert(scope, ScopedItem::new(moved.id, order));
                            (
                                PersistPlan::Single {
                                    item: ItemKey::new(scope.kind(), moved_id),
                                    order,
                                },
                                1,
                                snapshot,
                            )
                        }
                        None => {
                            // 快路径撞上间隔耗尽，退回整体重排
                            store.insert(scope, moved);
                            let assignments = ordering::renumber_scope(ordered_ids);
                            store.apply_orders(scope, &assignments);
                            (
                                PersistPlan::Batch {
                                    scope,
                                    ordered_ids: ordered_ids.to_vec(),
                                },
                                ordered_ids.len(),
                                snapshot,
                            )
                        }
                    }
                }
                None => {
                    let assignments = ordering::renumber_scope(ordered_ids);
                    store.apply_orders(scope, &assignments);
                    (
                        PersistPlan::Batch {
                            scope,
                            ordered_ids: ordered_ids.to_vec(),
                        },
                        ordered_ids.len(),
                        snapshot,
                    )
                }
            }
        };

        let renumbered = matches!(plan, PersistPlan::Batch { .. });
        match self.persist_with_recovery(scope, &plan).await {
            Ok(()) => Ok(ReorderAllOutcome {
                scope,
                persisted,
                renumbered,
            }),
            Err(source) => {
                self.store.lock().restore(scope, snapshot);
                tracing::warn!(
                    scope = %scope,
                    error = %source,
                    "Full reorder persistence failed, local state reverted"
                );
                Err(ReorderError::Persistence { source })
            }
        }
    }

    // ========== Persistence ==========

    /// 串行化同一 scope 的持久化调用，按策略重试，超时视为失败
    async fn persist_with_recovery(&self, scope: Scope, plan: &PersistPlan) -> Result<(), ClientError> {
        let lock = self
            .scope_locks
            .entry(scope)
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone();
        let _serialized = lock.lock().await;

        let max_attempts = match self.policy {
            RecoveryPolicy::Revert => 0,
            RecoveryPolicy::RetryThenRevert { attempts, .. } => attempts,
        };

        let mut attempt = 0;
        loop {
            let result = match tokio::time::timeout(self.timeout, self.execute_plan(plan)).await {
                Ok(inner) => inner,
                Err(_) => Err(ClientError::Timeout),
            };

            match result {
                Ok(()) => return Ok(()),
                Err(e) if attempt < max_attempts => {
                    attempt += 1;
                    tracing::warn!(
                        scope = %scope,
                        attempt,
                        error = %e,
                        "Order persistence failed, retrying"
                    );
                    if let RecoveryPolicy::RetryThenRevert { backoff, .. } = self.policy {
                        tokio::time::sleep(backoff).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn execute_plan(&self, plan: &PersistPlan) -> Result<(), ClientError> {
        match plan {
            PersistPlan::Single { item, order } => {
                self.persistence.update_order(*item, *order).await
            }
            PersistPlan::Batch { scope, ordered_ids } => {
                self.check_batch(*scope, ordered_ids).await
            }
            PersistPlan::Move { item, dest, order } => {
                self.persistence.move_item(*item, *dest, *order).await
            }
            PersistPlan::MoveThenBatch {
                item,
                dest,
                appended,
                ordered_ids,
            } => {
                self.persistence.move_item(*item, *dest, *appended).await?;
                self.check_batch(*dest, ordered_ids).await
            }
        }
    }

    /// 批量写必须覆盖全部条目，数量不符视为持久化失败
    async fn check_batch(&self, scope: Scope, ordered_ids: &[i64]) -> Result<(), ClientError> {
        let updated = self
            .persistence
            .batch_update_order(scope, ordered_ids)
            .await?;
        if updated != ordered_ids.len() {
            return Err(ClientError::InvalidResponse(format!(
                "batch reorder wrote {updated} of {} records",
                ordered_ids.len()
            )));
        }
        Ok(())
    }
}

/// Detect whether `target` is `current` with exactly one element moved.
/// Returns the moved id and its destination index in the list WITHOUT
/// that element (the shape `order_for_index_move` expects).
fn single_displaced_item(current: &[i64], target: &[i64]) -> Option<(i64, usize)> {
    debug_assert_eq!(current.len(), target.len());

    // 候选一：target 中第一个错位的元素是被前移的
    let first = current.iter().zip(target).position(|(c, t)| c != t)?;

    let moved_forward = target[first];
    if removed(current, moved_forward) == removed(target, moved_forward) {
        let dest = target.iter().position(|id| *id == moved_forward)?;
        return Some((moved_forward, dest));
    }

    // 候选二：current 中第一个错位的元素是被后移的
    let moved_backward = current[first];
    if removed(current, moved_backward) == removed(target, moved_backward) {
        // 目的下标在移除该元素后的列表中度量
        let dest_in_target = target.iter().position(|id| *id == moved_backward)?;
        return Some((moved_backward, dest_in_target));
    }

    None
}

fn removed(ids: &[i64], id: i64) -> Vec<i64> {
    ids.iter().copied().filter(|x| *x != id).collect()
}

#[cfg(test)]
mod tests {
    use super::single_displaced_item;

    #[test]
    fn test_single_displacement_detected() {
        // [1,2,3,4] -> [2,1,3,4]: 1 moved after 2 (or 2 moved to front)
        assert!(single_displaced_item(&[1, 2, 3, 4], &[2, 1, 3, 4]).is_some());

        // [1,2,3,4] -> [1,3,4,2]: 2 moved to the end
        let (id, dest) = single_displaced_item(&[1, 2, 3, 4], &[1, 3, 4, 2]).unwrap();
        assert_eq!(id, 2);
        assert_eq!(dest, 3);
    }

    #[test]
    fn test_multi_displacement_rejected() {
        // 完全反转不是单条移动
        assert!(single_displaced_item(&[1, 2, 3, 4], &[4, 3, 2, 1]).is_none());
    }

    #[test]
    fn test_front_move_dest_index() {
        // [1,2,3] -> [3,1,2]: 3 moved to index 0
        let (id, dest) = single_displaced_item(&[1, 2, 3], &[3, 1, 2]).unwrap();
        assert_eq!(id, 3);
        assert_eq!(dest, 0);
    }
}
