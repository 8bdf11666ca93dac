// ==========================================
// 出货量预测系统 - 配置管理器
// ==========================================
// 职责: 引擎参数加载、查询、覆写
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::forecast_config::ForecastConfig;
use crate::db::open_sqlite_connection;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::HashMap;
use std::error::Error;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（与预测记录库共用）
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA（幂等），并确保 config_kv 表存在。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
            conn_guard.execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS config_kv (
                    scope_id TEXT NOT NULL,
                    key TEXT NOT NULL,
                    value TEXT NOT NULL,
                    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
                    PRIMARY KEY (scope_id, key)
                );
                "#,
            )?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        tracing::info!(config_key = key, value, "配置已更新");
        Ok(())
    }

    /// 读取并解析配置值，缺失或格式错误时使用默认值
    fn get_parsed_or<T>(&self, key: &str, default: T) -> Result<T, Box<dyn Error>>
    where
        T: FromStr + Copy,
    {
        match self.get_config_value(key)? {
            None => Ok(default),
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(v) => Ok(v),
                Err(_) => {
                    tracing::warn!(
                        config_key = key,
                        raw_value = %raw,
                        "配置值格式错误，使用默认值"
                    );
                    Ok(default)
                }
            },
        }
    }

    /// 加载引擎参数
    pub fn load_forecast_config(&self) -> Result<ForecastConfig, Box<dyn Error>> {
        let defaults = ForecastConfig::default();

        let config = ForecastConfig {
            min_data_pts: self.get_parsed_or(config_keys::MIN_DATA_PTS, defaults.min_data_pts)?,
            min_r2: self.get_parsed_or(config_keys::MIN_R2, defaults.min_r2)?,
            low_confidence_mae: self
                .get_parsed_or(config_keys::LOW_CONFIDENCE_MAE, defaults.low_confidence_mae)?,
            negative_stub: self.get_parsed_or(config_keys::NEGATIVE_STUB, defaults.negative_stub)?,
            sentinel_year: self.get_parsed_or(config_keys::SENTINEL_YEAR, defaults.sentinel_year)?,
            min_degree: self.get_parsed_or(config_keys::MIN_DEGREE, defaults.min_degree)?,
            max_degree: self.get_parsed_or(config_keys::MAX_DEGREE, defaults.max_degree)?,
            test_ratio: self.get_parsed_or(config_keys::TEST_RATIO, defaults.test_ratio)?,
            split_seed: self.get_parsed_or(config_keys::SPLIT_SEED, defaults.split_seed)?,
        };

        // 次数区间、测试比例非法时整体回退
        if config.min_degree > config.max_degree
            || !(config.test_ratio > 0.0 && config.test_ratio < 1.0)
        {
            tracing::warn!(
                min_degree = config.min_degree,
                max_degree = config.max_degree,
                test_ratio = config.test_ratio,
                "次数区间或测试比例非法，使用默认参数"
            );
            return Ok(ForecastConfig {
                min_degree: defaults.min_degree,
                max_degree: defaults.max_degree,
                test_ratio: defaults.test_ratio,
                ..config
            });
        }

        Ok(config)
    }

    /// 获取所有配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 建模门槛
    pub const MIN_DATA_PTS: &str = "min_data_pts";
    pub const MIN_R2: &str = "min_r2";
    pub const LOW_CONFIDENCE_MAE: &str = "low_confidence_mae";

    // 预测值处理
    pub const NEGATIVE_STUB: &str = "negative_stub";

    // 数据清洗
    pub const SENTINEL_YEAR: &str = "sentinel_year";

    // 次数搜索
    pub const MIN_DEGREE: &str = "min_degree";
    pub const MAX_DEGREE: &str = "max_degree";
    pub const TEST_RATIO: &str = "test_ratio";
    pub const SPLIT_SEED: &str = "split_seed";
}
