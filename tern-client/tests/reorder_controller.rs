//! Reorder controller behavior tests
//!
//! 用可注入失败/延迟的 mock 持久化层验证协调器：乐观更新、单条写入、
//! 间隔耗尽重排、失败回滚、重试、超时与手势串行化。

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tern_client::{
    ClientError, ClientResult, ItemKey, ItemKind, OrderPersistence, RecoveryPolicy,
    ReorderController, ReorderError, Scope, ScopedItem,
};

// =============================================================================
// Mock persistence
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Update { id: i64, order: f64 },
    Batch { ids: Vec<i64> },
    Move { id: i64, dest: Scope, order: f64 },
}

#[derive(Default)]
struct MockInner {
    calls: Mutex<Vec<Call>>,
    /// 前 N 次调用返回错误
    fail_times: AtomicU32,
    /// 每次调用前的人工延迟（毫秒）
    delay_ms: AtomicU32,
    /// 批量调用返回偏小的 updated 数（模拟服务端部分失败）
    short_batch: AtomicU32,
}

#[derive(Clone, Default)]
struct MockPersistence {
    inner: Arc<MockInner>,
}

impl MockPersistence {
    fn new() -> Self {
        Self::default()
    }

    fn fail_times(&self, n: u32) {
        self.inner.fail_times.store(n, Ordering::SeqCst);
    }

    fn delay_ms(&self, ms: u32) {
        self.inner.delay_ms.store(ms, Ordering::SeqCst);
    }

    fn short_batch(&self) {
        self.inner.short_batch.store(1, Ordering::SeqCst);
    }

    fn calls(&self) -> Vec<Call> {
        self.inner.calls.lock().unwrap().clone()
    }

    async fn before_call(&self) -> ClientResult<()> {
        let delay = self.inner.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay as u64)).await;
        }
        let remaining = self.inner.fail_times.load(Ordering::SeqCst);
        if remaining > 0 {
            self.inner.fail_times.store(remaining - 1, Ordering::SeqCst);
            return Err(ClientError::Internal("simulated network error".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderPersistence for MockPersistence {
    async fn update_order(&self, item: ItemKey, sort_order: f64) -> ClientResult<()> {
        self.before_call().await?;
        self.inner.calls.lock().unwrap().push(Call::Update {
            id: item.id,
            order: sort_order,
        });
        Ok(())
    }

    async fn batch_update_order(&self, _scope: Scope, ordered_ids: &[i64]) -> ClientResult<usize> {
        self.before_call().await?;
        self.inner.calls.lock().unwrap().push(Call::Batch {
            ids: ordered_ids.to_vec(),
        });
        if self.inner.short_batch.load(Ordering::SeqCst) > 0 {
            return Ok(ordered_ids.len().saturating_sub(1));
        }
        Ok(ordered_ids.len())
    }

    async fn move_item(&self, item: ItemKey, dest: Scope, sort_order: f64) -> ClientResult<()> {
        self.before_call().await?;
        self.inner.calls.lock().unwrap().push(Call::Move {
            id: item.id,
            dest,
            order: sort_order,
        });
        Ok(())
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn task_scope() -> Scope {
    Scope::project_tasks(10)
}

fn task(id: i64) -> ItemKey {
    ItemKey::new(ItemKind::Task, id)
}

/// 标准三任务场景: [1(1000), 2(2000), 3(3000)]
fn controller_with_three(
    mock: &MockPersistence,
) -> ReorderController<MockPersistence> {
    let controller = ReorderController::new(mock.clone());
    controller.load_scope(
        task_scope(),
        vec![
            ScopedItem::new(1, 1000.0),
            ScopedItem::new(2, 2000.0),
            ScopedItem::new(3, 3000.0),
        ],
    );
    controller
}

// =============================================================================
// Single-item reorder
// =============================================================================

#[tokio::test]
async fn test_reorder_to_front_halves_first_order() {
    let mock = MockPersistence::new();
    let controller = controller_with_three(&mock);

    // 把 2 拖到下标 0：新值是首项的一半
    let outcome = controller
        .reorder(task(2), task_scope(), 0)
        .await
        .unwrap();

    assert_eq!(outcome.new_order, 500.0);
    assert!(!outcome.renumbered);
    assert_eq!(controller.ids(task_scope()), vec![2, 1, 3]);
    assert_eq!(
        mock.calls(),
        vec![Call::Update { id: 2, order: 500.0 }]
    );
}

#[tokio::test]
async fn test_single_move_leaves_other_orders_untouched() {
    let mock = MockPersistence::new();
    let controller = controller_with_three(&mock);

    // 把 1 拖到末尾：只有 1 被写，2/3 的排序值逐位不变
    controller.reorder(task(1), task_scope(), 3).await.unwrap();

    let items = controller.items(task_scope());
    assert_eq!(
        items.iter().map(|it| it.id).collect::<Vec<_>>(),
        vec![2, 3, 1]
    );
    assert_eq!(items[0].sort_order, 2000.0);
    assert_eq!(items[1].sort_order, 3000.0);
    assert_eq!(items[2].sort_order, 4000.0);
    assert_eq!(mock.calls().len(), 1);
}

#[tokio::test]
async fn test_midpoint_move() {
    let mock = MockPersistence::new();
    let controller = controller_with_three(&mock);

    // 把 3 拖到 1 和 2 之间
    let outcome = controller
        .reorder(task(3), task_scope(), 1)
        .await
        .unwrap();

    assert_eq!(outcome.new_order, 1500.0);
    assert_eq!(controller.ids(task_scope()), vec![1, 3, 2]);
}

#[tokio::test]
async fn test_begin_drag_issues_no_persistence() {
    let mock = MockPersistence::new();
    let controller = controller_with_three(&mock);

    // 拖拽开始/中间态不触发任何持久化调用
    let gesture = controller.begin_drag(task(2)).unwrap();
    assert_eq!(gesture.origin_index, 1);
    assert!(mock.calls().is_empty());
}

// =============================================================================
// Validation
// =============================================================================

#[tokio::test]
async fn test_invalid_position_rejected_before_mutation() {
    let mock = MockPersistence::new();
    let controller = controller_with_three(&mock);

    let err = controller
        .reorder(task(2), task_scope(), 7)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ReorderError::InvalidPosition { index: 7, len: 3 }
    ));
    // 本地状态未被触碰，服务端没有收到请求
    assert_eq!(controller.ids(task_scope()), vec![1, 2, 3]);
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn test_unknown_item_rejected() {
    let mock = MockPersistence::new();
    let controller = controller_with_three(&mock);

    let err = controller
        .reorder(task(42), task_scope(), 0)
        .await
        .unwrap_err();

    assert!(matches!(err, ReorderError::ItemNotFound(42)));
    assert!(mock.calls().is_empty());
}

// =============================================================================
// Failure recovery
// =============================================================================

#[tokio::test]
async fn test_persistence_failure_reverts_local_state() {
    let mock = MockPersistence::new();
    let controller = controller_with_three(&mock);
    mock.fail_times(1);

    let err = controller
        .reorder(task(2), task_scope(), 0)
        .await
        .unwrap_err();

    assert!(matches!(err, ReorderError::Persistence { .. }));
    // 回滚到拖拽前：顺序与排序值都复原
    let items = controller.items(task_scope());
    assert_eq!(
        items.iter().map(|it| it.id).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert_eq!(items[1].sort_order, 2000.0);
}

#[tokio::test]
async fn test_retry_then_success_keeps_optimistic_state() {
    let mock = MockPersistence::new();
    let controller = controller_with_three(&mock).with_policy(RecoveryPolicy::RetryThenRevert {
        attempts: 2,
        backoff: Duration::from_millis(1),
    });
    mock.fail_times(1);

    let outcome = controller
        .reorder(task(2), task_scope(), 0)
        .await
        .unwrap();

    assert_eq!(outcome.new_order, 500.0);
    assert_eq!(controller.ids(task_scope()), vec![2, 1, 3]);
}

#[tokio::test]
async fn test_retry_exhaustion_reverts() {
    let mock = MockPersistence::new();
    let controller = controller_with_three(&mock).with_policy(RecoveryPolicy::RetryThenRevert {
        attempts: 2,
        backoff: Duration::from_millis(1),
    });
    mock.fail_times(5);

    let err = controller
        .reorder(task(2), task_scope(), 0)
        .await
        .unwrap_err();

    assert!(matches!(err, ReorderError::Persistence { .. }));
    assert_eq!(controller.ids(task_scope()), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_timeout_counts_as_failure() {
    let mock = MockPersistence::new();
    let controller =
        controller_with_three(&mock).with_timeout(Duration::from_millis(10));
    mock.delay_ms(200);

    let err = controller
        .reorder(task(2), task_scope(), 0)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ReorderError::Persistence {
            source: ClientError::Timeout
        }
    ));
    assert_eq!(controller.ids(task_scope()), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_short_batch_write_is_a_failure() {
    let mock = MockPersistence::new();
    let controller = ReorderController::new(mock.clone());
    controller.load_scope(
        task_scope(),
        vec![
            ScopedItem::new(1, 1000.0),
            ScopedItem::new(2, 2000.0),
            ScopedItem::new(3, 3000.0),
        ],
    );
    mock.short_batch();

    // 整体重排走批量写；服务端只写了部分记录时必须回滚而不是静默接受
    let err = controller
        .reorder_all(task_scope(), &[3, 2, 1])
        .await
        .unwrap_err();

    assert!(matches!(err, ReorderError::Persistence { .. }));
    assert_eq!(controller.ids(task_scope()), vec![1, 2, 3]);
}

// =============================================================================
// Renormalization
// =============================================================================

#[tokio::test]
async fn test_gap_exhaustion_triggers_scope_renumber() {
    let mock = MockPersistence::new();
    let controller = ReorderController::new(mock.clone());
    // 1 和 2 的间隔已经耗尽
    controller.load_scope(
        task_scope(),
        vec![
            ScopedItem::new(1, 1000.0),
            ScopedItem::new(2, 1000.0000000001),
            ScopedItem::new(3, 5000.0),
        ],
    );

    // 把 3 拖到 1 和 2 之间：中点不可用，scope 整体重排
    let outcome = controller
        .reorder(task(3), task_scope(), 1)
        .await
        .unwrap();

    assert!(outcome.renumbered);
    assert_eq!(controller.ids(task_scope()), vec![1, 3, 2]);
    // 重排后间隔回到 GAP
    let items = controller.items(task_scope());
    assert_eq!(items[0].sort_order, 1000.0);
    assert_eq!(items[1].sort_order, 2000.0);
    assert_eq!(items[2].sort_order, 3000.0);
    // 一次手势恰好一次批量调用
    assert_eq!(mock.calls(), vec![Call::Batch { ids: vec![1, 3, 2] }]);
}

// =============================================================================
// Cross-scope moves
// =============================================================================

#[tokio::test]
async fn test_cross_scope_move_appends_to_destination() {
    let mock = MockPersistence::new();
    let controller = ReorderController::new(mock.clone());
    let origin = Scope::project_tasks(10);
    let dest = Scope::Tasks {
        project_id: Some(10),
        section_id: Some(77),
    };
    controller.load_scope(
        origin,
        vec![ScopedItem::new(1, 1000.0), ScopedItem::new(2, 2000.0)],
    );
    controller.load_scope(
        dest,
        vec![ScopedItem::new(5, 1000.0), ScopedItem::new(6, 2000.0)],
    );

    // 拖到目标分组末尾：排序值按目标 scope 追加计算
    let outcome = controller.reorder(task(1), dest, 2).await.unwrap();

    assert_eq!(outcome.new_order, 3000.0);
    assert_eq!(controller.ids(origin), vec![2]);
    assert_eq!(controller.ids(dest), vec![5, 6, 1]);
    assert_eq!(
        mock.calls(),
        vec![Call::Move {
            id: 1,
            dest,
            order: 3000.0
        }]
    );
}

#[tokio::test]
async fn test_cross_scope_failure_restores_both_scopes() {
    let mock = MockPersistence::new();
    let controller = ReorderController::new(mock.clone());
    let origin = Scope::project_tasks(10);
    let dest = Scope::project_tasks(20);
    controller.load_scope(origin, vec![ScopedItem::new(1, 1000.0)]);
    controller.load_scope(dest, vec![ScopedItem::new(5, 1000.0)]);
    mock.fail_times(1);

    let err = controller.reorder(task(1), dest, 0).await.unwrap_err();

    assert!(matches!(err, ReorderError::Persistence { .. }));
    assert_eq!(controller.ids(origin), vec![1]);
    assert_eq!(controller.ids(dest), vec![5]);
}

// =============================================================================
// Full-list reorder
// =============================================================================

#[tokio::test]
async fn test_reorder_all_single_displacement_fast_path() {
    let mock = MockPersistence::new();
    let controller = controller_with_three(&mock);

    // [1,2,3] -> [1,3,2]: 只有 3 被移动，走单条写入
    let outcome = controller
        .reorder_all(task_scope(), &[1, 3, 2])
        .await
        .unwrap();

    assert_eq!(outcome.persisted, 1);
    assert!(!outcome.renumbered);
    assert_eq!(controller.ids(task_scope()), vec![1, 3, 2]);
    assert!(matches!(mock.calls()[0], Call::Update { id: 3, .. }));
}

#[tokio::test]
async fn test_reorder_all_full_renumber_fallback() {
    let mock = MockPersistence::new();
    let controller = controller_with_three(&mock);

    // 完全反转不是单条移动，整体重排
    let outcome = controller
        .reorder_all(task_scope(), &[3, 2, 1])
        .await
        .unwrap();

    assert_eq!(outcome.persisted, 3);
    assert!(outcome.renumbered);
    assert_eq!(controller.ids(task_scope()), vec![3, 2, 1]);
    assert_eq!(mock.calls(), vec![Call::Batch { ids: vec![3, 2, 1] }]);
}

#[tokio::test]
async fn test_reorder_all_unchanged_sequence_writes_nothing() {
    let mock = MockPersistence::new();
    let controller = controller_with_three(&mock);

    let outcome = controller
        .reorder_all(task_scope(), &[1, 2, 3])
        .await
        .unwrap();

    assert_eq!(outcome.persisted, 0);
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn test_reorder_all_rejects_foreign_ids() {
    let mock = MockPersistence::new();
    let controller = controller_with_three(&mock);

    let err = controller
        .reorder_all(task_scope(), &[1, 2, 99])
        .await
        .unwrap_err();

    assert!(matches!(err, ReorderError::ItemNotFound(99)));
    assert!(mock.calls().is_empty());
}

// =============================================================================
// Gesture serialization
// =============================================================================

#[tokio::test]
async fn test_rapid_gestures_compute_from_updated_state() {
    let mock = MockPersistence::new();
    let controller = Arc::new(controller_with_three(&mock));
    mock.delay_ms(30);

    // 手势 A 先落地本地（同步），其持久化还在飞行中时发起手势 B；
    // B 必须基于 A 更新后的本地状态计算，且两次持久化按完成顺序串行
    let a = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.reorder(task(3), task_scope(), 0).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    let b = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.reorder(task(2), task_scope(), 0).await })
    };

    a.await.unwrap().unwrap();
    let outcome_b = b.await.unwrap().unwrap();

    // A: [1,2,3] -> [3,1,2] (3 拿到 500)
    // B 基于更新后的状态: [3,1,2] -> [2,3,1] (2 拿到 250)
    assert_eq!(controller.ids(task_scope()), vec![2, 3, 1]);
    assert_eq!(outcome_b.new_order, 250.0);

    let calls = mock.calls();
    assert_eq!(
        calls,
        vec![
            Call::Update { id: 3, order: 500.0 },
            Call::Update { id: 2, order: 250.0 },
        ]
    );
}
