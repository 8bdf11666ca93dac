// ==========================================
// Repository 层集成测试
// ==========================================
// 测试目标: 出货导入 → 读取、预测记录、快照文件的持久化
// ==========================================


use chrono::Datelike;
use shipment_forecast::config::{config_keys, ConfigManager};
use shipment_forecast::domain::{ForecastOutput, ForecastRecord, Horizon, SavedForecast};
use shipment_forecast::importer::ShipmentJsonLoader;
use shipment_forecast::logging;
use shipment_forecast::repository::{
    ForecastRepository, RepositoryError, ShipmentRepository, SnapshotStore,
};
use std::fs;
use test_helpers::*;

fn sample_output() -> ForecastOutput {
    ForecastOutput {
        x_values: vec![1.0, 2.0, 3.0],
        y_fitted: vec![1.5, 2.5, 3.5],
        horizon_months: 3,
        x_axis: vec![1, 2, 3, 4, 5, 6],
        extended_series: vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        year_labels: vec![2018],
        year_tick_positions: vec![8],
    }
}

// ==========================================
// 测试用例
// ==========================================

#[test]
fn test_json_import_to_shipments_table() {
    logging::init_test();
    let env = TestEnv::new().unwrap();

    let json_path = env.dir.path().join("shipments.json");
    fs::write(
        &json_path,
        r#"[
            {"csd_date_wid": 16649, "date_wid": 16649, "cbd_date_wid": 16679,
             "customer_wid": 1773, "mkt_item_wid": 13744,
             "cust_book_date": "2015-08-31T07:00:00Z",
             "cust_ship_date": "2015-08-01T07:00:00Z",
             "order_number": "SO4660", "quantity": 1.00},
            {"csd_date_wid": 16650, "date_wid": 16650, "cbd_date_wid": 16680,
             "customer_wid": 1774, "mkt_item_wid": 13744,
             "cust_book_date": "2015-09-01T07:00:00Z",
             "cust_ship_date": "2015-08-20T07:00:00Z",
             "order_number": "SO4661", "quantity": 4.00}
        ]"#,
    )
    .unwrap();

    let rows = ShipmentJsonLoader::load(&json_path).unwrap();
    let repo = ShipmentRepository::new(&env.shipments_db()).unwrap();
    repo.reset().unwrap();
    assert_eq!(repo.insert_batch(&rows).unwrap(), 2);

    let records = repo.load_all().unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.product_id == 13744));
    assert_eq!(records[1].ship_date, date(2015, 8, 20));
    assert_eq!(records.iter().map(|r| r.quantity).sum::<f64>(), 5.0);
}

#[test]
fn test_reset_replaces_previous_import() {
    let env = TestEnv::new().unwrap();
    env.seed_shipments(&monthly_rows(1, 2016, 12, |_| 1.0)).unwrap();
    env.seed_shipments(&monthly_rows(2, 2017, 6, |_| 1.0)).unwrap();

    let repo = ShipmentRepository::new(&env.shipments_db()).unwrap();
    let records = repo.load_all().unwrap();
    assert_eq!(records.len(), 6);
    assert!(records.iter().all(|r| r.product_id == 2 && r.ship_date.year() == 2017));
}

#[test]
fn test_forecast_records_survive_reopen() {
    let env = TestEnv::new().unwrap();
    let run = date(2018, 11, 20);

    {
        let repo = ForecastRepository::new(&env.forecast_db()).unwrap();
        repo.insert(&ForecastRecord::new(13744, Horizon::OneYear, run, 42.0, 310.0))
            .unwrap();
    }

    let repo = ForecastRepository::new(&env.forecast_db()).unwrap();
    let current = repo.list_current(run).unwrap();
    assert_eq!(current.len(), 1);
    assert_eq!(current[0].period, "One Year");
    assert_eq!(current[0].expiration_date, date(2018, 12, 20));
    assert_eq!(current[0].accuracy_percent, 310.0);

    // 失效当天不再列出
    assert!(repo.list_current(date(2018, 12, 20)).unwrap().is_empty());
}

#[test]
fn test_config_overrides_share_forecast_db() {
    let env = TestEnv::new().unwrap();
    let repo = ForecastRepository::new(&env.forecast_db()).unwrap();

    let manager = ConfigManager::from_connection(repo.connection()).unwrap();
    manager
        .set_global_config_value(config_keys::MIN_DATA_PTS, "6")
        .unwrap();
    manager
        .set_global_config_value(config_keys::NEGATIVE_STUB, "not-a-number")
        .unwrap();

    let config = manager.load_forecast_config().unwrap();
    assert_eq!(config.min_data_pts, 6);
    // 格式错误回退默认值
    assert_eq!(config.negative_stub, 0.05);

    // 重新打开仍可读到
    let reopened = ConfigManager::new(&env.forecast_db()).unwrap();
    assert_eq!(reopened.load_forecast_config().unwrap().min_data_pts, 6);
}

#[test]
fn test_snapshot_store_overwrite_and_isolation() {
    let env = TestEnv::new().unwrap();
    let store = SnapshotStore::new(&env.paths.snapshot_dir).unwrap();
    let run = date(2018, 11, 20);

    let first = SavedForecast {
        product_id: 1,
        output: sample_output(),
    };
    let mut second = first.clone();
    second.output.extended_series[5] = 0.05;

    store.save(run, &first).unwrap();
    store.save(run, &second).unwrap();
    assert_eq!(store.load(1, run).unwrap(), second);

    // 没有遗留临时文件
    let names: Vec<String> = fs::read_dir(store.dir())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["1_2018-11-20.bin".to_string()]);

    // 其他日期、其他产品互不影响
    assert!(matches!(
        store.load(1, date(2018, 11, 21)),
        Err(RepositoryError::NotFound { .. })
    ));
    assert!(matches!(
        store.load(2, run),
        Err(RepositoryError::NotFound { .. })
    ));
}

#[test]
fn test_truncated_snapshot_is_corrupt() {
    let env = TestEnv::new().unwrap();
    let store = SnapshotStore::new(&env.paths.snapshot_dir).unwrap();
    let run = date(2018, 11, 20);

    let path = store
        .save(
            run,
            &SavedForecast {
                product_id: 3,
                output: sample_output(),
            },
        )
        .unwrap();
    let bytes = fs::read(&path).unwrap();
    fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

    assert!(matches!(
        store.load(3, run),
        Err(RepositoryError::CorruptSnapshot(_))
    ));
}
