// ==========================================
// ModelSelector 集成测试
// ==========================================
// 测试目标: 建模门槛、次数选择、并行评估的确定性
// ==========================================


use shipment_forecast::config::ForecastConfig;
use shipment_forecast::engine::{EngineError, ModelSelector, SeriesBuilder};
use test_helpers::*;

#[test]
fn test_products_below_threshold_are_excluded() {
    let mut records = monthly_records(1, 2016, 10, |_| 3.0);
    records.extend(monthly_records(2, 2016, 11, |_| 3.0));
    let series = SeriesBuilder::default().build(&records);
    let selector = ModelSelector::default();

    let qualifying = selector.qualifying_products(&series);
    assert!(!qualifying.contains(&1));
    assert!(qualifying.contains(&2));

    match selector.select(1, &series) {
        Err(EngineError::InsufficientData {
            product_id,
            required,
            actual,
        }) => {
            assert_eq!(product_id, 1);
            assert_eq!(required, 10);
            assert_eq!(actual, 10);
        }
        other => panic!("expected InsufficientData, got {:?}", other),
    }
}

#[test]
fn test_unknown_product() {
    let series = SeriesBuilder::default().build(&monthly_records(1, 2016, 24, linear_quantity));
    assert!(matches!(
        ModelSelector::default().select(99, &series),
        Err(EngineError::ProductNotFound(99))
    ));
}

#[test]
fn test_exact_linear_trend_selects_good_model() {
    let series = SeriesBuilder::default().build(&monthly_records(5, 2016, 24, linear_quantity));
    let selected = ModelSelector::default().select(5, &series).unwrap();

    assert!(selected.max_r2 >= 0.9, "max_r2 = {}", selected.max_r2);
    assert!((2..=8).contains(&selected.degree));
    assert_eq!(selected.evaluations.len(), 7);

    // 全量重拟合模型复现训练数据
    for (x, y) in series.get(5).unwrap().non_zero_points() {
        assert!((selected.model.predict(x) - y).abs() < 1e-6);
    }
}

#[test]
fn test_selection_is_deterministic_for_fixed_seed() {
    let records = monthly_records(8, 2015, 36, |i| ((i * 7) % 11) as f64 + 1.0);
    let series = SeriesBuilder::default().build(&records);
    let selector = ModelSelector::default();

    let a = selector.select(8, &series).unwrap();
    let b = selector.select(8, &series).unwrap();
    assert_eq!(a, b);

    let c = selector.select_with_seed(8, &series, 42).unwrap();
    assert_eq!(a, c);

    // 配置中的种子与显式种子一致
    let seeded = ModelSelector::new(ForecastConfig::default().with_split_seed(7));
    assert_eq!(seeded.config().split_seed, 7);
    assert_eq!(
        seeded.select(8, &series).unwrap(),
        selector.select_with_seed(8, &series, 7).unwrap()
    );
}

#[test]
fn test_selected_degree_has_maximum_test_r2() {
    let records = monthly_records(8, 2015, 36, |i| ((i * 7) % 11) as f64 + 1.0);
    let series = SeriesBuilder::default().build(&records);
    let selected = ModelSelector::default().select(8, &series).unwrap();

    let best = selected
        .evaluations
        .iter()
        .map(|e| e.test_r2)
        .fold(f64::NEG_INFINITY, f64::max);
    assert_eq!(selected.max_r2, best);

    // 并列时取较小次数
    let first_best = selected
        .evaluations
        .iter()
        .find(|e| e.test_r2 == best)
        .unwrap();
    assert_eq!(selected.degree, first_best.degree);
    assert_eq!(selected.mae, first_best.test_mae);
}

#[test]
fn test_custom_threshold_and_degree_range() {
    let config = ForecastConfig {
        min_data_pts: 5,
        min_degree: 2,
        max_degree: 3,
        ..ForecastConfig::default()
    };
    let series = SeriesBuilder::default().build(&monthly_records(4, 2016, 8, linear_quantity));
    let selector = ModelSelector::new(config);

    assert!(selector.qualifying_products(&series).contains(&4));
    let selected = selector.select(4, &series).unwrap();
    assert_eq!(selected.evaluations.len(), 2);
}
