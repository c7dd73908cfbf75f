//! 交互层：编辑对话框、删除确认和结果通知

use std::collections::VecDeque;
use std::future::Future;

use super::form::ProductForm;
use super::model::Product;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub text: String,
}

impl Notification {
    pub fn success(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            title: title.into(),
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            title: "Ups...".to_string(),
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NotificationLevel::Error
    }
}

/// 用户交互接口
///
/// 对话框是挂起点：操作会等待用户确认或取消后再继续。
pub trait Interaction {
    /// 显示预填的编辑表单；返回 `None` 表示用户取消
    fn edit_product(&mut self, form: ProductForm) -> impl Future<Output = Option<ProductForm>>;

    /// 删除前确认；`product` 为本地镜像中的对应记录（可能不存在）
    fn confirm_delete(&mut self, id: &str, product: Option<&Product>) -> impl Future<Output = bool>;

    fn notify(&mut self, notification: Notification) -> impl Future<Output = ()>;
}

/// 预先编排好答复的交互实现，用于自动化和测试
///
/// 编辑答复和确认答复各自按队列顺序消费，队列耗尽时视为取消。
#[derive(Debug, Default)]
pub struct ScriptedInteraction {
    edits: VecDeque<Option<ProductForm>>,
    confirmations: VecDeque<bool>,
    pub notifications: Vec<Notification>,
    pub delete_prompts: Vec<String>,
    pub edit_prompts: Vec<ProductForm>,
}

impl ScriptedInteraction {
    pub fn new() -> Self {
        Self::default()
    }

    /// 下一次编辑对话框提交给定表单
    pub fn submit_edit(mut self, form: ProductForm) -> Self {
        self.edits.push_back(Some(form));
        self
    }

    /// 下一次编辑对话框被取消
    pub fn cancel_edit(mut self) -> Self {
        self.edits.push_back(None);
        self
    }

    pub fn confirm(mut self, answer: bool) -> Self {
        self.confirmations.push_back(answer);
        self
    }

    pub fn last_notification(&self) -> Option<&Notification> {
        self.notifications.last()
    }
}

impl Interaction for ScriptedInteraction {
    async fn edit_product(&mut self, form: ProductForm) -> Option<ProductForm> {
        self.edit_prompts.push(form);
        self.edits.pop_front().flatten()
    }

    async fn confirm_delete(&mut self, id: &str, _product: Option<&Product>) -> bool {
        self.delete_prompts.push(id.to_string());
        self.confirmations.pop_front().unwrap_or(false)
    }

    async fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }
}
