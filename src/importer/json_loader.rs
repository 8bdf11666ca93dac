// ==========================================
// 出货量预测系统 - 出货 JSON 读取器
// ==========================================
// 输入: 出货导出文件（JSON 数组，每个元素一条出货行）
// 输出: Vec<RawShipment>
// ==========================================
// 校验:
// - cust_ship_date 必须以 YYYY-MM-DD 开头
// - quantity 必须为有限数值
// - 未识别字段（cbd_date_wid / cust_book_date 等）忽略
// ==========================================

use crate::domain::shipment::RawShipment;
use crate::importer::error::{ImportError, ImportResult};
use chrono::NaiveDate;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

// ==========================================
// ShipmentJsonLoader - 出货 JSON 读取器
// ==========================================
pub struct ShipmentJsonLoader;

impl ShipmentJsonLoader {
    /// 读取出货导出文件
    pub fn load<P: AsRef<Path>>(path: P) -> ImportResult<Vec<RawShipment>> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let reader = BufReader::new(File::open(path)?);
        let rows: Vec<RawShipment> = serde_json::from_reader(reader)?;
        Self::validate(&rows)?;

        tracing::info!(path = %path.display(), rows = rows.len(), "出货文件读取完成");
        Ok(rows)
    }

    /// 从字符串解析（测试与管道输入使用）
    pub fn parse_str(content: &str) -> ImportResult<Vec<RawShipment>> {
        let rows: Vec<RawShipment> = serde_json::from_str(content)?;
        Self::validate(&rows)?;
        Ok(rows)
    }

    fn validate(rows: &[RawShipment]) -> ImportResult<()> {
        for (idx, row) in rows.iter().enumerate() {
            let date_ok = row
                .cust_ship_date
                .get(..10)
                .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok())
                .unwrap_or(false);
            if !date_ok {
                return Err(ImportError::DateFormatError {
                    row: idx + 1,
                    field: "cust_ship_date".to_string(),
                    value: row.cust_ship_date.clone(),
                });
            }
            if !row.quantity.is_finite() {
                return Err(ImportError::InvalidNumber {
                    row: idx + 1,
                    field: "quantity".to_string(),
                    value: row.quantity,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"[
        {
            "csd_date_wid": 16649, "date_wid": 16649, "cbd_date_wid": 16679,
            "customer_wid": 1773, "mkt_item_wid": 13744,
            "cust_book_date": "2015-08-31T07:00:00Z",
            "cust_ship_date": "2015-08-01T07:00:00Z",
            "order_number": "SO4660", "quantity": 1.00
        },
        {
            "csd_date_wid": null, "date_wid": null, "customer_wid": null,
            "mkt_item_wid": 13745, "cust_ship_date": "2050-01-01T00:00:00Z",
            "order_number": null, "quantity": 3
        }
    ]"#;

    #[test]
    fn test_parse_sample() {
        let rows = ShipmentJsonLoader::parse_str(SAMPLE).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].mkt_item_wid, 13744);
        assert_eq!(rows[0].order_number.as_deref(), Some("SO4660"));
        assert_eq!(rows[1].customer_wid, None);
        assert_eq!(rows[1].quantity, 3.0);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let rows = ShipmentJsonLoader::load(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            ShipmentJsonLoader::load("/nonexistent/shipments.json"),
            Err(ImportError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            ShipmentJsonLoader::parse_str("[{\"mkt_item_wid\": 1,"),
            Err(ImportError::JsonParseError(_))
        ));
    }

    #[test]
    fn test_bad_ship_date() {
        let content = r#"[{"mkt_item_wid": 1, "cust_ship_date": "8/1/2015", "quantity": 1}]"#;
        assert!(matches!(
            ShipmentJsonLoader::parse_str(content),
            Err(ImportError::DateFormatError { row: 1, .. })
        ));
    }
}
