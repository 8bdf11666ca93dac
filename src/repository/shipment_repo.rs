// ==========================================
// 出货量预测系统 - 出货数据仓储
// ==========================================
// 表: Shipments（历史出货，对引擎只读）
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::db::{open_sqlite_connection, table_exists};
use crate::domain::shipment::{RawShipment, ShipmentRecord};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// ShipmentRepository - 出货数据仓储
// ==========================================
pub struct ShipmentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ShipmentRepository {
    /// 创建新的 ShipmentRepository 实例（表不存在时自动建表）
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

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn ensure_schema(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let existed = table_exists(&conn, "Shipments")?;
        conn.execute_batch(CREATE_SHIPMENTS_SQL)?;
        if !existed {
            tracing::warn!("Shipments 表不存在，已创建空表");
        }
        Ok(())
    }

    /// 重建 Shipments 表（清空全部历史）
    pub fn reset(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch("DROP TABLE IF EXISTS Shipments;")?;
        conn.execute_batch(CREATE_SHIPMENTS_SQL)?;
        tracing::info!("Shipments 表已重建");
        Ok(())
    }

    /// 批量写入原始出货行（单事务）
    ///
    /// # 返回
    /// 写入行数
    pub fn insert_batch(&self, rows: &[RawShipment]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO Shipments (
                    csd_date_wid, date_wid, customer_wid, mkt_item_wid,
                    cust_ship_date, order_number, quantity
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )?;
            for row in rows {
                stmt.execute(params![
                    row.csd_date_wid,
                    row.date_wid,
                    row.customer_wid,
                    row.mkt_item_wid,
                    row.cust_ship_date,
                    row.order_number,
                    row.quantity,
                ])?;
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tracing::info!(rows = rows.len(), "出货数据写入完成");
        Ok(rows.len())
    }

    /// 读取全部出货记录（产品, 发货日期, 数量）
    pub fn load_all(&self) -> RepositoryResult<Vec<ShipmentRecord>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT mkt_item_wid, cust_ship_date, quantity FROM Shipments ORDER BY id")?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, f64>(2)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(product_id, ship_date, quantity)| {
                Ok(ShipmentRecord::new(
                    product_id,
                    parse_ship_date(&ship_date)?,
                    quantity,
                ))
            })
            .collect()
    }

    /// 行数
    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n = conn.query_row("SELECT COUNT(*) FROM Shipments", [], |row| row.get(0))?;
        Ok(n)
    }
}

const CREATE_SHIPMENTS_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS Shipments (
    id INTEGER NOT NULL PRIMARY KEY,
    csd_date_wid INTEGER,
    date_wid INTEGER,
    customer_wid INTEGER,
    mkt_item_wid INTEGER NOT NULL,
    cust_ship_date TEXT NOT NULL,
    order_number TEXT,
    quantity REAL NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_shipments_item ON Shipments(mkt_item_wid);
"#;

/// 解析发货日期（取前 10 个字符 YYYY-MM-DD，兼容 "2015-08-01T07:00:00Z"）
pub fn parse_ship_date(raw: &str) -> RepositoryResult<NaiveDate> {
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|e| {
        RepositoryError::FieldValueError {
            field: "cust_ship_date".to_string(),
            message: format!("{}: {}", raw, e),
        }
    })
}
