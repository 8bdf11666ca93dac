// ==========================================
// 出货量预测系统 - 预测记录仓储
// ==========================================
// 表: Forecast（保存后的预测摘要，只追加）
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::forecast::ForecastRecord;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const DATE_FMT: &str = "%Y-%m-%d";

// ==========================================
// ForecastRepository - 预测记录仓储
// ==========================================
pub struct ForecastRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ForecastRepository {
    /// 创建新的 ForecastRepository 实例（表不存在时自动建表）
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        let repo = Self { conn };
        repo.ensure_schema()?;
        Ok(repo)
    }

    /// 共享连接（ConfigManager 与预测记录共用同一个库）
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn ensure_schema(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(CREATE_FORECAST_SQL)?;
        Ok(())
    }

    /// 重建 Forecast 表（清空全部记录）
    pub fn reset(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch("DROP TABLE IF EXISTS Forecast;")?;
        conn.execute_batch(CREATE_FORECAST_SQL)?;
        tracing::info!("Forecast 表已重建");
        Ok(())
    }

    /// 写入预测记录
    ///
    /// # 返回
    /// 新记录ID
    pub fn insert(&self, record: &ForecastRecord) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO Forecast (
                productID, forecastRun, period, expirationDate, quantity, accuracy
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                record.product_id,
                record.forecast_run.format(DATE_FMT).to_string(),
                record.period,
                record.expiration_date.format(DATE_FMT).to_string(),
                record.final_quantity,
                record.accuracy_percent,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 查询仍在有效期内的记录（expirationDate > today）
    ///
    /// # 返回
    /// 按运行日期、产品ID升序
    pub fn list_current(&self, today: NaiveDate) -> RepositoryResult<Vec<ForecastRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, productID, forecastRun, period, expirationDate, quantity, accuracy
            FROM Forecast
            WHERE expirationDate > ?1
            ORDER BY forecastRun ASC, productID ASC, id ASC
            "#,
        )?;

        let rows = stmt
            .query_map(params![today.format(DATE_FMT).to_string()], map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter().map(into_record).collect()
    }

    /// 按 (产品, 运行日期) 查询；同日多次保存时取最新一条
    pub fn find(
        &self,
        product_id: i64,
        forecast_run: NaiveDate,
    ) -> RepositoryResult<Option<ForecastRecord>> {
        let conn = self.get_conn()?;
        let row = conn
            .query_row(
                r#"
                SELECT id, productID, forecastRun, period, expirationDate, quantity, accuracy
                FROM Forecast
                WHERE productID = ?1 AND forecastRun = ?2
                ORDER BY id DESC
                LIMIT 1
                "#,
                params![product_id, forecast_run.format(DATE_FMT).to_string()],
                map_row,
            )
            .optional()?;

        row.map(into_record).transpose()
    }
}

const CREATE_FORECAST_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS Forecast (
    id INTEGER NOT NULL PRIMARY KEY,
    productID INTEGER NOT NULL,
    forecastRun TEXT NOT NULL,
    period TEXT NOT NULL,
    expirationDate TEXT NOT NULL,
    quantity REAL NOT NULL,
    accuracy REAL NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_forecast_expiration ON Forecast(expirationDate);
"#;

type ForecastRow = (i64, i64, String, String, String, f64, f64);

fn map_row(row: &Row<'_>) -> rusqlite::Result<ForecastRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn into_record(row: ForecastRow) -> RepositoryResult<ForecastRecord> {
    let (id, product_id, run, period, expiration, quantity, accuracy) = row;
    Ok(ForecastRecord {
        id: Some(id),
        product_id,
        forecast_run: parse_date("forecastRun", &run)?,
        period,
        expiration_date: parse_date("expirationDate", &expiration)?,
        final_quantity: quantity,
        accuracy_percent: accuracy,
    })
}

fn parse_date(field: &str, raw: &str) -> RepositoryResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FMT).map_err(|e| RepositoryError::FieldValueError {
        field: field.to_string(),
        message: format!("{}: {}", raw, e),
    })
}
