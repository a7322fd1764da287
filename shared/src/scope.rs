//! Ordering scopes
//!
//! A [`Scope`] names the grouping within which `sort_order` values are
//! comparable: two items order each other only when they live in the
//! same scope. Moving an item to another scope recomputes its order
//! against the destination's items.

use serde::{Deserialize, Serialize};

/// The grouping an ordered item belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    /// 所有区域（全局排序）
    Areas,
    /// 某个区域下的项目；`None` 表示未归入任何区域的项目
    Projects { area_id: Option<i64> },
    /// 某个项目下的分组
    Sections { project_id: i64 },
    /// 任务：按项目 + 分组分桶；`section_id` 为 `None` 时是项目的默认分组，
    /// `project_id` 为 `None` 时是收件箱
    Tasks {
        project_id: Option<i64>,
        section_id: Option<i64>,
    },
    /// 某个任务下的子任务清单
    Checklist { task_id: i64 },
    /// 所有标签
    Tags,
}

impl Scope {
    /// Scope for tasks living directly in a project (no section)
    pub fn project_tasks(project_id: i64) -> Self {
        Scope::Tasks {
            project_id: Some(project_id),
            section_id: None,
        }
    }

    /// Scope for the inbox (tasks with no project)
    pub fn inbox() -> Self {
        Scope::Tasks {
            project_id: None,
            section_id: None,
        }
    }

    /// The kind of item this scope contains
    pub fn kind(&self) -> ItemKind {
        match self {
            Scope::Areas => ItemKind::Area,
            Scope::Projects { .. } => ItemKind::Project,
            Scope::Sections { .. } => ItemKind::Section,
            Scope::Tasks { .. } => ItemKind::Task,
            Scope::Checklist { .. } => ItemKind::ChecklistItem,
            Scope::Tags => ItemKind::Tag,
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Areas => write!(f, "areas"),
            Scope::Projects { area_id } => match area_id {
                Some(id) => write!(f, "projects(area={id})"),
                None => write!(f, "projects(unfiled)"),
            },
            Scope::Sections { project_id } => write!(f, "sections(project={project_id})"),
            Scope::Tasks {
                project_id,
                section_id,
            } => match (project_id, section_id) {
                (Some(p), Some(s)) => write!(f, "tasks(project={p},section={s})"),
                (Some(p), None) => write!(f, "tasks(project={p})"),
                _ => write!(f, "tasks(inbox)"),
            },
            Scope::Checklist { task_id } => write!(f, "checklist(task={task_id})"),
            Scope::Tags => write!(f, "tags"),
        }
    }
}

/// Entity kinds that carry a `sort_order`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Area,
    Project,
    Section,
    Task,
    ChecklistItem,
    Tag,
}

/// Stable reference to one ordered item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemKey {
    pub kind: ItemKind,
    pub id: i64,
}

impl ItemKey {
    pub fn new(kind: ItemKind, id: i64) -> Self {
        Self { kind, id }
    }

    pub fn task(id: i64) -> Self {
        Self::new(ItemKind::Task, id)
    }
}

impl std::fmt::Display for ItemKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}:{}", self.kind, self.id)
    }
}
