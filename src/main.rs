// ==========================================
// 出货量预测系统 - 命令行入口
// ==========================================
// 用法:
//   shipment-forecast products
//   shipment-forecast forecast <product_id> <0|1|2> <20YY-MM-DD> [--save] [--export <dir>]
//   shipment-forecast list
//   shipment-forecast replay <product_id> <run_date>
// ==========================================
// 周期: 0 = 一个月, 1 = 一个季度, 2 = 一年
// 存储位置见 ForecastPaths（环境变量或用户数据目录）
// SHIPMENT_FORECAST_LOG_FORMAT=json 时日志输出为 JSON
// ==========================================

use anyhow::{bail, Context};
use chrono::{Local, NaiveDate};
use shipment_forecast::{logging, ForecastApi, ForecastOutput, ForecastPaths, Horizon};
use std::path::PathBuf;

const USAGE: &str = "\
用法:
  shipment-forecast products
  shipment-forecast forecast <product_id> <0|1|2> <20YY-MM-DD> [--save] [--export <dir>]
  shipment-forecast list
  shipment-forecast replay <product_id> <run_date>";

fn main() -> anyhow::Result<()> {
    logging::init_from_env();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        println!("{}", USAGE);
        return Ok(());
    };

    tracing::info!(
        "{} v{} - {}",
        shipment_forecast::APP_NAME,
        shipment_forecast::VERSION,
        command
    );

    let paths = ForecastPaths::resolve();
    let api = ForecastApi::open(&paths).context("无法打开预测存储")?;
    let today = Local::now().date_naive();

    match command.as_str() {
        "products" => {
            let products = api.list_qualifying_products();
            println!("{} products with enough history:", products.len());
            for id in products {
                println!("{}", id);
            }
        }
        "forecast" => run_forecast(&api, &args[1..], today)?,
        "list" => {
            let records = api.list_current_forecasts(today)?;
            println!(
                "{:<10} {:<12} {:<12} {:<12} {:>12} {:>10}",
                "Product", "Run", "Period", "Expires", "Quantity", "Accuracy"
            );
            for r in records {
                println!(
                    "{:<10} {:<12} {:<12} {:<12} {:>12.2} {:>10.2}",
                    r.product_id,
                    r.forecast_run,
                    r.period,
                    r.expiration_date,
                    r.final_quantity,
                    r.accuracy_percent
                );
            }
        }
        "replay" => {
            let (product_id, run_date) = match &args[1..] {
                [id, run] => (parse_product_id(id)?, parse_run_date(run)?),
                _ => bail!("{}", USAGE),
            };
            let saved = api.replay_forecast(product_id, run_date)?;
            println!("Product {} (saved {})", saved.product_id, run_date);
            print_output(&saved.output);
        }
        other => bail!("未知命令: {}\n{}", other, USAGE),
    }

    Ok(())
}

fn run_forecast(api: &ForecastApi, args: &[String], today: NaiveDate) -> anyhow::Result<()> {
    let (id, horizon, date) = match args {
        [id, horizon, date, ..] => (id, horizon, date),
        _ => bail!("{}", USAGE),
    };

    let product_id = parse_product_id(id)?;
    let horizon = horizon
        .parse::<usize>()
        .ok()
        .and_then(Horizon::from_index)
        .with_context(|| format!("周期必须为 0/1/2: {}", horizon))?;
    let start_date = ForecastApi::parse_start_date(date)?;

    let mut save = false;
    let mut export_dir: Option<PathBuf> = None;
    let mut rest = args[3..].iter();
    while let Some(flag) = rest.next() {
        match flag.as_str() {
            "--save" => save = true,
            "--export" => {
                let dir = rest.next().context("--export 需要目录参数")?;
                export_dir = Some(PathBuf::from(dir));
                save = true;
            }
            other => bail!("未知参数: {}", other),
        }
    }

    let view = api.create_forecast(product_id, horizon, start_date)?;
    println!(
        "Product {} - {} from {} (degree {}, R² {:.4}, MAE {:.4})",
        view.product_id,
        view.horizon.display_name(),
        view.start_date,
        view.degree,
        view.max_r2,
        view.mae
    );
    print_output(&view.output);

    if save {
        let receipt = api.save_forecast(&view, today, export_dir.as_deref())?;
        println!("Saved snapshot: {}", receipt.snapshot_path.display());
        if let Some(path) = receipt.export_path {
            println!("Exported: {}", path.display());
        }
    }
    Ok(())
}

fn print_output(output: &ForecastOutput) {
    let history = output.history_len();
    let months = output.month_labels();
    println!("Years: {:?}", output.year_labels);
    for (i, (x, y)) in output
        .x_axis
        .iter()
        .zip(&output.extended_series)
        .enumerate()
        .skip(history)
    {
        println!("  x={:<5} month={:<3} forecast={:.2}", x, months[i], y);
    }
}

fn parse_product_id(raw: &str) -> anyhow::Result<i64> {
    raw.trim()
        .parse()
        .with_context(|| format!("无效的产品ID: {}", raw))
}

fn parse_run_date(raw: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("运行日期格式应为 YYYY-MM-DD: {}", raw))
}
