//! 本地镜像存储
//!
//! 渲染的唯一数据源。启动时读取一次槽位，之后每次修改都先构造新序列，
//! 整体写入槽位成功后再替换内存中的序列；写入失败时内存内容保持不变。

use tracing::debug;

use super::model::Product;
use crate::core::error::CoreError;
use crate::infrastructure::storage::SlotStorage;

pub struct MirrorStore<S: SlotStorage> {
    storage: S,
    slot: String,
    products: Vec<Product>,
}

impl<S: SlotStorage> MirrorStore<S> {
    /// 读取槽位；槽位不存在时为空，内容损坏时返回 `CoreError::Storage`
    pub fn open(storage: S, slot: impl Into<String>) -> Result<Self, CoreError> {
        let slot = slot.into();
        let products: Vec<Product> = storage.load(&slot)?.unwrap_or_default();
        debug!(slot = %slot, count = products.len(), "加载本地镜像");

        Ok(Self {
            storage,
            slot,
            products,
        })
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn find(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.has_id(id))
    }

    /// 所有已分配 id 的产品 id，按存储顺序
    pub fn ids(&self) -> Vec<String> {
        self.products.iter().filter_map(|p| p.id.clone()).collect()
    }

    /// 追加到末尾
    pub fn append(&mut self, product: Product) -> Result<&[Product], CoreError> {
        let mut next = self.products.clone();
        next.push(product);
        self.commit(next)
    }

    /// 按 id 原位替换所有匹配项，位置不变
    pub fn replace(&mut self, id: &str, product: Product) -> Result<&[Product], CoreError> {
        let next = self
            .products
            .iter()
            .map(|p| if p.has_id(id) { product.clone() } else { p.clone() })
            .collect();
        self.commit(next)
    }

    /// 删除所有 id 匹配的项
    pub fn remove(&mut self, id: &str) -> Result<&[Product], CoreError> {
        let next = self
            .products
            .iter()
            .filter(|p| !p.has_id(id))
            .cloned()
            .collect();
        self.commit(next)
    }

    /// 整体替换
    pub fn replace_all(&mut self, products: Vec<Product>) -> Result<&[Product], CoreError> {
        self.commit(products)
    }

    fn commit(&mut self, next: Vec<Product>) -> Result<&[Product], CoreError> {
        self.storage.save(&self.slot, &next)?;
        debug!(slot = %self.slot, count = next.len(), "本地镜像已写入");
        self.products = next;
        Ok(&self.products)
    }
}
