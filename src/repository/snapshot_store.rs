// ==========================================
// 出货量预测系统 - 预测快照存储
// ==========================================
// 目录结构: {snapshot_dir}/{product_id}_{YYYY-MM-DD}.bin
// 写入: 临时文件 + rename，读者看不到半写文件
// ==========================================

use crate::domain::forecast::{snapshot_key, SavedForecast};
use crate::engine::snapshot;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

const SNAPSHOT_EXT: &str = "bin";

// ==========================================
// SnapshotStore - 快照文件存储
// ==========================================
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    /// 打开快照目录（不存在时创建）
    pub fn new<P: AsRef<Path>>(dir: P) -> RepositoryResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 快照文件路径
    pub fn path_for(&self, product_id: i64, forecast_run: NaiveDate) -> PathBuf {
        self.dir.join(format!(
            "{}.{}",
            snapshot_key(product_id, forecast_run),
            SNAPSHOT_EXT
        ))
    }

    /// 保存快照（同键覆盖）
    pub fn save(
        &self,
        forecast_run: NaiveDate,
        snapshot: &SavedForecast,
    ) -> RepositoryResult<PathBuf> {
        let bytes = snapshot::encode(snapshot)?;
        let target = self.path_for(snapshot.product_id, forecast_run);
        let tmp = target.with_extension(format!("{}.tmp", SNAPSHOT_EXT));

        // 任一步失败都清理临时文件
        if let Err(e) = write_file(&tmp, &bytes).and_then(|_| fs::rename(&tmp, &target)) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        tracing::debug!(path = %target.display(), bytes = bytes.len(), "快照已保存");
        Ok(target)
    }

    /// 读取快照
    ///
    /// # 返回
    /// - Ok(SavedForecast): 解码成功
    /// - Err(NotFound): 快照文件不存在
    /// - Err(CorruptSnapshot): 快照内容损坏
    pub fn load(
        &self,
        product_id: i64,
        forecast_run: NaiveDate,
    ) -> RepositoryResult<SavedForecast> {
        let path = self.path_for(product_id, forecast_run);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(RepositoryError::NotFound {
                    entity: "ForecastSnapshot".to_string(),
                    id: snapshot_key(product_id, forecast_run),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let saved = snapshot::decode(&bytes)?;
        if saved.product_id != product_id {
            return Err(RepositoryError::CorruptSnapshot(format!(
                "{} 中的产品ID为 {}",
                path.display(),
                saved.product_id
            )));
        }
        Ok(saved)
    }

    /// 删除快照（不存在时忽略）
    pub fn remove(&self, product_id: i64, forecast_run: NaiveDate) -> RepositoryResult<()> {
        match fs::remove_file(self.path_for(product_id, forecast_run)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// 快照是否存在
    pub fn exists(&self, product_id: i64, forecast_run: NaiveDate) -> bool {
        self.path_for(product_id, forecast_run).is_file()
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::forecast::ForecastOutput;
    use tempfile::TempDir;

    fn saved(product_id: i64) -> SavedForecast {
        SavedForecast {
            product_id,
            output: ForecastOutput {
                x_values: vec![1.0, 2.0],
                y_fitted: vec![1.0, 2.0],
                horizon_months: 1,
                x_axis: vec![1, 2, 3],
                extended_series: vec![1.0, 2.0, 3.0],
                year_labels: vec![2018],
                year_tick_positions: vec![8],
            },
        }
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path()).unwrap();
        let run = NaiveDate::from_ymd_opt(2018, 11, 20).unwrap();

        let path = store.save(run, &saved(13744)).unwrap();
        assert!(path.ends_with("13744_2018-11-20.bin"));
        assert!(store.exists(13744, run));
        assert_eq!(store.load(13744, run).unwrap(), saved(13744));

        store.remove(13744, run).unwrap();
        assert!(!store.exists(13744, run));
        store.remove(13744, run).unwrap();
    }

    #[test]
    fn test_failed_save_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path()).unwrap();
        let run = NaiveDate::from_ymd_opt(2018, 11, 20).unwrap();

        // 目标路径被目录占用，rename 失败
        fs::create_dir(store.path_for(4, run)).unwrap();
        assert!(store.save(run, &saved(4)).is_err());

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["4_2018-11-20.bin".to_string()]);
    }

    #[test]
    fn test_failed_create_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path().join("snapshots")).unwrap();
        let run = NaiveDate::from_ymd_opt(2018, 11, 20).unwrap();

        // 快照目录在保存前被移除，临时文件无法创建
        fs::remove_dir(store.dir()).unwrap();
        assert!(store.save(run, &saved(4)).is_err());
        assert!(!store.dir().exists());
        assert!(!store.exists(4, run));
    }

    #[test]
    fn test_missing_snapshot_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path()).unwrap();
        let run = NaiveDate::from_ymd_opt(2018, 11, 20).unwrap();
        assert!(matches!(
            store.load(1, run),
            Err(RepositoryError::NotFound { .. })
        ));
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path()).unwrap();
        let run = NaiveDate::from_ymd_opt(2018, 11, 20).unwrap();
        fs::write(store.path_for(5, run), b"not a snapshot").unwrap();
        assert!(matches!(
            store.load(5, run),
            Err(RepositoryError::CorruptSnapshot(_))
        ));
    }
}
