// ==========================================
// 出货量预测系统 - 预测快照编解码
// ==========================================
// 格式: 4 字节魔数 "SFC1" + JSON 负载（SavedForecast）
// 要求: decode(encode(x)) == x；魔数或负载不合法一律视为损坏
// ==========================================

use crate::domain::forecast::SavedForecast;
use crate::engine::error::{EngineError, EngineResult};

/// 快照魔数（含格式版本）
pub const SNAPSHOT_MAGIC: &[u8; 4] = b"SFC1";

/// 编码快照
pub fn encode(snapshot: &SavedForecast) -> EngineResult<Vec<u8>> {
    let payload = serde_json::to_vec(snapshot)
        .map_err(|e| EngineError::SnapshotEncodeError(e.to_string()))?;

    let mut bytes = Vec::with_capacity(SNAPSHOT_MAGIC.len() + payload.len());
    bytes.extend_from_slice(SNAPSHOT_MAGIC);
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// 解码快照
pub fn decode(bytes: &[u8]) -> EngineResult<SavedForecast> {
    let payload = bytes
        .strip_prefix(SNAPSHOT_MAGIC.as_slice())
        .ok_or_else(|| EngineError::CorruptSnapshot("快照头不匹配".to_string()))?;

    let snapshot: SavedForecast = serde_json::from_slice(payload)
        .map_err(|e| EngineError::CorruptSnapshot(e.to_string()))?;

    // 结构一致性校验
    let output = &snapshot.output;
    if output.x_axis.len() != output.extended_series.len()
        || output.x_values.len() != output.y_fitted.len()
        || output.year_labels.len() != output.year_tick_positions.len()
    {
        return Err(EngineError::CorruptSnapshot(format!(
            "product_id={} 快照数组长度不一致",
            snapshot.product_id
        )));
    }

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::forecast::ForecastOutput;

    fn sample() -> SavedForecast {
        SavedForecast {
            product_id: 13744,
            output: ForecastOutput {
                x_values: vec![1.0, 3.0, 4.0],
                y_fitted: vec![2.25, 3.5, 0.1],
                horizon_months: 1,
                x_axis: vec![1, 2, 3, 4, 5],
                extended_series: vec![2.0, 0.0, 3.5, 0.125, 0.05],
                year_labels: vec![2018],
                year_tick_positions: vec![8],
            },
        }
    }

    #[test]
    fn test_round_trip() {
        let snapshot = sample();
        let bytes = encode(&snapshot).unwrap();
        assert!(bytes.starts_with(SNAPSHOT_MAGIC));
        assert_eq!(decode(&bytes).unwrap(), snapshot);
    }

    #[test]
    fn test_bad_header_is_corrupt() {
        let mut bytes = encode(&sample()).unwrap();
        bytes[0] = b'X';
        assert!(matches!(decode(&bytes), Err(EngineError::CorruptSnapshot(_))));
        assert!(matches!(decode(b""), Err(EngineError::CorruptSnapshot(_))));
    }

    #[test]
    fn test_truncated_payload_is_corrupt() {
        let bytes = encode(&sample()).unwrap();
        let truncated = &bytes[..bytes.len() - 5];
        assert!(matches!(decode(truncated), Err(EngineError::CorruptSnapshot(_))));
    }

    #[test]
    fn test_inconsistent_arrays_are_corrupt() {
        let mut snapshot = sample();
        snapshot.output.x_axis.pop();
        let bytes = encode(&snapshot).unwrap();
        assert!(matches!(decode(&bytes), Err(EngineError::CorruptSnapshot(_))));
    }
}
