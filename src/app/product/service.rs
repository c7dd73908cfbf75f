//! 产品业务服务
//!
//! 每个操作都是 请求 → 响应 → 检查状态 → 修改本地镜像 → 通知。
//! 只有远程返回成功后才会修改本地镜像，失败时镜像和槽位保持原样。

use tracing::{info, warn};

use super::client::ProductApi;
use super::dialog::{Interaction, Notification};
use super::form::ProductForm;
use super::model::{DeleteAck, Product};
use super::store::MirrorStore;
use crate::core::error::CoreError;
use crate::infrastructure::storage::SlotStorage;

const CREATE_FALLBACK: &str = "Ocurrió un error al crear el producto";
const CREATE_NOT_SAVED: &str =
    "El producto se creó en el servidor, pero no se pudo guardar localmente. No lo vuelvas a enviar";
const EDIT_FALLBACK: &str = "Ocurrió un error al editar el producto";
const DELETE_FALLBACK: &str = "Ocurrió un error al eliminar el producto";
const REFRESH_FALLBACK: &str = "Ocurrió un error al actualizar los productos";

/// 操作结果
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Created(Product),
    Updated(Product),
    Deleted { id: String, message: String },
    /// 刷新成功，值为被远程版本替换的条目数
    Refreshed(usize),
    /// 用户取消了对话框，没有发出任何请求
    Declined,
}

pub struct ProductService<A: ProductApi, S: SlotStorage> {
    api: A,
    store: MirrorStore<S>,
}

impl<A: ProductApi, S: SlotStorage> ProductService<A, S> {
    pub fn new(api: A, store: MirrorStore<S>) -> Self {
        Self { api, store }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn store(&self) -> &MirrorStore<S> {
        &self.store
    }

    pub fn products(&self) -> &[Product] {
        self.store.products()
    }

    /// 提交表单创建产品，成功后清空表单；失败时表单保留用户输入
    pub async fn create<I: Interaction>(
        &mut self,
        form: &mut ProductForm,
        ui: &mut I,
    ) -> Result<Outcome, CoreError> {
        match self.try_create(form).await {
            Ok(product) => {
                ui.notify(Notification::success(
                    "Producto creado",
                    "El producto se ha creado correctamente",
                ))
                .await;
                form.clear();
                Ok(Outcome::Created(product))
            }
            // 存储错误只会发生在远程创建成功之后，重复提交会在远程产生重复对象
            Err(err @ CoreError::Storage(_)) => fail(ui, "create", CREATE_NOT_SAVED, err).await,
            Err(err) => fail(ui, "create", CREATE_FALLBACK, err).await,
        }
    }

    async fn try_create(&mut self, form: &ProductForm) -> Result<Product, CoreError> {
        let payload = form.to_payload()?;
        let product = self.api.create(&payload).await?;
        self.store.append(product.clone())?;
        info!(id = ?product.id, name = %product.name, "产品已创建");
        Ok(product)
    }

    /// 编辑本地镜像中的产品；对话框取消时不发请求
    pub async fn edit<I: Interaction>(
        &mut self,
        id: &str,
        ui: &mut I,
    ) -> Result<Outcome, CoreError> {
        let current = match self.store.find(id) {
            Some(product) => product.clone(),
            None => {
                let err = CoreError::NotFound(format!("产品 {} 不在本地镜像中", id));
                return fail(ui, "edit", EDIT_FALLBACK, err).await;
            }
        };

        let Some(form) = ui.edit_product(ProductForm::from_product(&current)).await else {
            info!(id, "编辑已取消，未保存修改");
            return Ok(Outcome::Declined);
        };

        match self.try_update(id, &form).await {
            Ok(product) => {
                ui.notify(Notification::success(
                    "Producto editado",
                    "El producto se ha editado correctamente",
                ))
                .await;
                Ok(Outcome::Updated(product))
            }
            Err(err) => fail(ui, "edit", EDIT_FALLBACK, err).await,
        }
    }

    async fn try_update(&mut self, id: &str, form: &ProductForm) -> Result<Product, CoreError> {
        let payload = form.to_payload()?;
        let product = self.api.update(id, &payload).await?;
        self.store.replace(id, product.clone())?;
        info!(id, name = %product.name, "产品已更新");
        Ok(product)
    }

    /// 确认后删除产品；拒绝确认时不发请求
    pub async fn delete<I: Interaction>(
        &mut self,
        id: &str,
        ui: &mut I,
    ) -> Result<Outcome, CoreError> {
        let target = self.store.find(id).cloned();
        if !ui.confirm_delete(id, target.as_ref()).await {
            info!(id, "删除已取消");
            return Ok(Outcome::Declined);
        }

        match self.try_delete(id).await {
            Ok(ack) => {
                ui.notify(Notification::success(
                    "Producto eliminado",
                    "El producto se ha eliminado correctamente",
                ))
                .await;
                Ok(Outcome::Deleted {
                    id: id.to_string(),
                    message: ack.message,
                })
            }
            Err(err) => fail(ui, "delete", DELETE_FALLBACK, err).await,
        }
    }

    async fn try_delete(&mut self, id: &str) -> Result<DeleteAck, CoreError> {
        let ack = self.api.delete(id).await?;
        self.store.remove(id)?;
        info!(id, message = %ack.message, "产品已删除");
        Ok(ack)
    }

    /// 用远程最新版本替换本地镜像中同 id 的条目，远程没有返回的条目保持不变
    pub async fn refresh<I: Interaction>(&mut self, ui: &mut I) -> Result<Outcome, CoreError> {
        let ids = self.store.ids();
        if ids.is_empty() {
            return Ok(Outcome::Refreshed(0));
        }

        match self.try_refresh(&ids).await {
            Ok(updated) => {
                ui.notify(Notification::success(
                    "Productos actualizados",
                    format!("Se han sincronizado {} productos", updated),
                ))
                .await;
                Ok(Outcome::Refreshed(updated))
            }
            Err(err) => fail(ui, "refresh", REFRESH_FALLBACK, err).await,
        }
    }

    async fn try_refresh(&mut self, ids: &[String]) -> Result<usize, CoreError> {
        let fresh = self.api.list(ids).await?;

        let mut updated = 0;
        let next: Vec<Product> = self
            .store
            .products()
            .iter()
            .map(|local| {
                let remote = local
                    .id
                    .as_deref()
                    .and_then(|id| fresh.iter().find(|p| p.has_id(id)));
                match remote {
                    Some(remote) => {
                        updated += 1;
                        remote.clone()
                    }
                    None => local.clone(),
                }
            })
            .collect();

        self.store.replace_all(next)?;
        info!(requested = ids.len(), updated, "本地镜像已刷新");
        Ok(updated)
    }
}

/// 记录日志并通知用户，错误原样返回给调用方
async fn fail<I: Interaction>(
    ui: &mut I,
    action: &str,
    fallback: &str,
    err: CoreError,
) -> Result<Outcome, CoreError> {
    warn!(action, error = %err, "操作失败");
    let text = err.detail().unwrap_or_else(|| fallback.to_string());
    ui.notify(Notification::error(text)).await;
    Err(err)
}
