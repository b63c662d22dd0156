// 键值存储抽象 - 历史记录的持久化介质
//
// 应用中使用文件存储，测试中使用内存存储

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
#[cfg(test)]
use std::collections::HashMap;
#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};
#[cfg(test)]
use std::sync::Mutex;

/// 键值存储接口
pub trait KeyValueStore: Send + Sync {
    /// 读取键对应的值，不存在时返回 None
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// 写入键值，覆盖原有内容
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// 基于文件的键值存储，每个键对应目录下的一个 `<key>.json` 文件
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    /// 创建文件存储，目录不存在时自动创建
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("创建存储目录失败: {:?}", dir))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("读取存储文件失败: {:?}", path)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        // 先写临时文件再重命名，避免写入中断留下半个文件
        let tmp_path = self.dir.join(format!("{}.json.tmp", key));
        std::fs::write(&tmp_path, value)
            .with_context(|| format!("写入临时文件失败: {:?}", tmp_path))?;
        std::fs::rename(&tmp_path, &path)
            .with_context(|| format!("替换存储文件失败: {:?}", path))?;
        Ok(())
    }
}

/// 内存键值存储（测试用）
#[cfg(test)]
#[derive(Default)]
pub struct MemoryKeyValueStore {
    data: Mutex<HashMap<String, String>>,
    writes: AtomicUsize,
}

#[cfg(test)]
impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以已有内容初始化
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut data) = store.data.lock() {
            data.insert(key.to_string(), value.to_string());
        }
        store
    }

    /// 累计写入次数
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let data = self
            .data
            .lock()
            .map_err(|_| anyhow::anyhow!("内存存储锁已损坏"))?;
        Ok(data.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut data = self
            .data
            .lock()
            .map_err(|_| anyhow::anyhow!("内存存储锁已损坏"))?;
        data.insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
