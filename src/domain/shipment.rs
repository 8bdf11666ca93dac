// ==========================================
// 出货量预测系统 - 出货记录
// ==========================================
// 来源: Shipments 表（外部历史数据，只读）
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 出货记录（聚合输入，不可变）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentRecord {
    pub product_id: i64,
    pub ship_date: NaiveDate,
    pub quantity: f64,
}

impl ShipmentRecord {
    pub fn new(product_id: i64, ship_date: NaiveDate, quantity: f64) -> Self {
        Self {
            product_id,
            ship_date,
            quantity,
        }
    }
}

/// 出货导出文件中的原始行（建库工具使用）
///
/// 示例:
/// ```json
/// {
///   "csd_date_wid": 16649, "date_wid": 16649, "cbd_date_wid": 16679,
///   "customer_wid": 1773, "mkt_item_wid": 13744,
///   "cust_book_date": "2015-08-31T07:00:00Z",
///   "cust_ship_date": "2015-08-01T07:00:00Z",
///   "order_number": "SO4660", "quantity": 1.00
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawShipment {
    pub csd_date_wid: Option<i64>,
    pub date_wid: Option<i64>,
    pub customer_wid: Option<i64>,
    pub mkt_item_wid: i64,
    pub cust_ship_date: String,
    pub order_number: Option<String>,
    pub quantity: f64,
}
