//! 槽位持久化基础设施
//!
//! 每个槽位保存一份完整的 JSON 文档，写入时整体覆盖。

use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::core::error::CoreError;

/// 按名称读写槽位的持久化接口
pub trait SlotStorage {
    /// 读取槽位原始内容，槽位不存在时返回 `None`
    fn read_slot(&self, slot: &str) -> Result<Option<String>, CoreError>;

    /// 整体覆盖写入槽位
    fn write_slot(&mut self, slot: &str, content: &str) -> Result<(), CoreError>;

    fn load<T: DeserializeOwned>(&self, slot: &str) -> Result<Option<T>, CoreError> {
        match self.read_slot(slot)? {
            Some(content) => serde_json::from_str(&content)
                .map(Some)
                .map_err(|e| CoreError::Storage(format!("槽位 {} 内容损坏: {}", slot, e))),
            None => Ok(None),
        }
    }

    fn save<T: Serialize>(&mut self, slot: &str, value: &T) -> Result<(), CoreError> {
        let content = serde_json::to_string(value)
            .map_err(|e| CoreError::Storage(format!("序列化槽位 {} 失败: {}", slot, e)))?;
        self.write_slot(slot, &content)
    }
}

/// 基于文件的槽位存储：`<data_dir>/<slot>.json`
#[derive(Debug, Clone)]
pub struct FileSlotStorage {
    data_dir: PathBuf,
}

impl FileSlotStorage {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn slot_path(&self, slot: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", slot))
    }
}

impl SlotStorage for FileSlotStorage {
    fn read_slot(&self, slot: &str) -> Result<Option<String>, CoreError> {
        match fs::read_to_string(self.slot_path(slot)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CoreError::Storage(format!("读取槽位 {} 失败: {}", slot, e))),
        }
    }

    fn write_slot(&mut self, slot: &str, content: &str) -> Result<(), CoreError> {
        fs::create_dir_all(&self.data_dir)
            .map_err(|e| CoreError::Storage(format!("创建数据目录失败: {}", e)))?;

        // 先写临时文件再重命名，避免中途失败留下半截内容
        let path = self.slot_path(slot);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content)
            .map_err(|e| CoreError::Storage(format!("写入槽位 {} 失败: {}", slot, e)))?;
        fs::rename(&tmp, &path)
            .map_err(|e| CoreError::Storage(format!("写入槽位 {} 失败: {}", slot, e)))
    }
}

/// 内存槽位存储，用于测试和不需要落盘的场景
#[derive(Debug, Clone, Default)]
pub struct MemorySlotStorage {
    slots: HashMap<String, String>,
}

impl MemorySlotStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStorage for MemorySlotStorage {
    fn read_slot(&self, slot: &str) -> Result<Option<String>, CoreError> {
        Ok(self.slots.get(slot).cloned())
    }

    fn write_slot(&mut self, slot: &str, content: &str) -> Result<(), CoreError> {
        self.slots.insert(slot.to_string(), content.to_string());
        Ok(())
    }
}
