use egostrategy_kline::chart::BreakStyle;
use egostrategy_kline::config::Config;
use egostrategy_kline::fetchers::base::MarketDataFetcher;
use egostrategy_kline::fetchers::infoway::InfowayFetcher;
use egostrategy_kline::models::timeframe::{self, CATALOG};
use egostrategy_kline::services::chart_service::{ChartPanel, ChartRequest, ChartService, Dashboard};
use egostrategy_kline::symbol::format_code;
use egostrategy_kline::{Quote, Region};

use anyhow::Context;
use clap::{App, Arg, ArgMatches, SubCommand};
use log::{error, info};
use std::sync::Arc;

fn code_arg() -> Arg<'static> {
    Arg::with_name("code")
        .short('c')
        .long("code")
        .value_name("CODE")
        .help("Stock code, e.g. 600519, 00700, AAPL")
        .takes_value(true)
        .default_value("600519")
}

fn region_arg() -> Arg<'static> {
    Arg::with_name("region")
        .short('r')
        .long("region")
        .value_name("REGION")
        .help("Market region (cn, hk, us)")
        .takes_value(true)
        .default_value("cn")
}

fn parse_region(matches: &ArgMatches) -> anyhow::Result<Region> {
    let region = matches.value_of("region").unwrap_or("cn");
    Ok(region.parse::<Region>()?)
}

fn parse_usize(matches: &ArgMatches, name: &str) -> anyhow::Result<usize> {
    let value = matches.value_of(name).unwrap_or_default();
    value
        .parse::<usize>()
        .with_context(|| format!("invalid --{}: {}", name, value))
}

fn build_service(matches: &ArgMatches, kline_count: Option<usize>) -> anyhow::Result<ChartService> {
    let mut config = Config::from_env();
    if let Some(token) = matches.value_of("token") {
        config = config.with_api_token(token);
    }
    if let Some(count) = kline_count {
        config = config.with_kline_count(count);
    }

    let fetcher: Arc<dyn MarketDataFetcher + Send + Sync> = Arc::new(InfowayFetcher::new(config.clone())?);
    Ok(ChartService::new(config, fetcher))
}

fn print_quote(quote: &Quote) {
    println!("实时行情: {}", quote.code);
    println!(
        "{:<12} {:<16} {:<18} {:<20}",
        "当前价格", "成交量", "成交额", "更新时间"
    );
    println!(
        "{:<12} {:<16} {:<18} {:<20}",
        quote.display_price(),
        quote.display_volume(),
        quote.display_turnover(),
        quote.display_time()
    );
}

fn print_bars(dashboard: &Dashboard, limit: usize) {
    println!("K线走势 ({})", dashboard.timeframe.display_name());
    println!("{:-<100}", "");
    println!(
        "{:<20} {:<10} {:<10} {:<10} {:<10} {:<14} {:<10} {:<10} {:<10}",
        "Time", "Open", "High", "Low", "Close", "Volume", "MA5", "MA10", "MA20"
    );
    println!("{:-<100}", "");

    let fmt_ma = |v: Option<f64>| v.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string());
    for point in dashboard.series.tail(limit) {
        let bar = &point.bar;
        println!(
            "{:<20} {:<10.2} {:<10.2} {:<10.2} {:<10.2} {:<14} {:<10} {:<10} {:<10}",
            bar.time.format("%Y-%m-%d %H:%M"),
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.volume,
            fmt_ma(point.ma5),
            fmt_ma(point.ma10),
            fmt_ma(point.ma20)
        );
    }

    if dashboard.series.len() > limit {
        println!("... and {} earlier bars", dashboard.series.len() - limit);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::init();

    let app = App::new("KlineDashboard")
        .version("1.0.0")
        .author("EgoStrategy Team")
        .about("Quote and candlestick dashboard for A/HK/US equities")
        .arg(
            Arg::with_name("token")
                .long("token")
                .value_name("TOKEN")
                .help("API token, overrides INFOWAY_API_TOKEN")
                .takes_value(true)
                .global(true),
        );

    let app = app
        .subcommand(
            SubCommand::with_name("chart")
                .about("Fetch quote and kline data and emit a chart spec")
                .arg(code_arg())
                .arg(region_arg())
                .arg(
                    Arg::with_name("timeframe")
                        .short('t')
                        .long("timeframe")
                        .value_name("TIMEFRAME")
                        .help("Kline period (1m, 5m, 15m, 30m, 1h, 1d, 1w, 1mo)")
                        .takes_value(true)
                        .default_value("1d"),
                )
                .arg(
                    Arg::with_name("count")
                        .short('n')
                        .long("count")
                        .value_name("COUNT")
                        .help("Number of bars to request")
                        .takes_value(true)
                        .default_value("500"),
                )
                .arg(
                    Arg::with_name("output")
                        .short('o')
                        .long("output")
                        .value_name("FILE")
                        .help("Write chart spec JSON to FILE instead of stdout")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("limit")
                        .short('l')
                        .long("limit")
                        .value_name("LIMIT")
                        .help("Number of latest bars to display")
                        .takes_value(true)
                        .default_value("10"),
                )
                .arg(
                    Arg::with_name("split-breaks")
                        .long("split-breaks")
                        .help("Emit the overnight break as two same-day ranges"),
                ),
        )
        .subcommand(
            SubCommand::with_name("quote")
                .about("Fetch the latest trade snapshot")
                .arg(code_arg())
                .arg(region_arg()),
        )
        .subcommand(
            SubCommand::with_name("format")
                .about("Print the provider code for a raw ticker")
                .arg(code_arg())
                .arg(region_arg()),
        )
        .subcommand(SubCommand::with_name("timeframes").about("List supported kline periods"));

    let matches = app.get_matches();

    if let Some(matches) = matches.subcommand_matches("chart") {
        let region = parse_region(matches)?;
        let raw_code = matches.value_of("code").unwrap_or("600519");
        let timeframe = timeframe::resolve(matches.value_of("timeframe").unwrap_or("1d"))?.timeframe;
        let count = parse_usize(matches, "count")?;
        let limit = parse_usize(matches, "limit")?;
        let break_style = if matches.is_present("split-breaks") {
            BreakStyle::SameDay
        } else {
            BreakStyle::Wraparound
        };

        let service = build_service(matches, Some(count))?;
        let request = ChartRequest::new(raw_code, region, timeframe).with_break_style(break_style);
        let dashboard = service.refresh(&request).await?;

        match &dashboard.quote {
            Ok(quote) => print_quote(quote),
            Err(e) => error!("获取行情失败: {}", e),
        }

        match &dashboard.chart {
            ChartPanel::Ready(spec) => {
                print_bars(&dashboard, limit);
                if let Some(path) = matches.value_of("output") {
                    spec.write_json(path).with_context(|| format!("failed to write {}", path))?;
                    info!("Chart spec written to {}", path);
                } else {
                    println!("{}", spec.to_json()?);
                }
            }
            ChartPanel::Empty => println!("暂无K线数据"),
            ChartPanel::Failed(e) => {
                error!("获取K线失败: {}", e);
                if e.is_retryable() {
                    println!("获取K线失败，请稍后重试: {}", e);
                }
                return Err(anyhow::anyhow!("kline fetch failed for {}", dashboard.code));
            }
        }
    } else if let Some(matches) = matches.subcommand_matches("quote") {
        let region = parse_region(matches)?;
        let raw_code = matches.value_of("code").unwrap_or("600519");
        let service = build_service(matches, None)?;
        let quote = service.fetch_quote(raw_code, region).await?;
        print_quote(&quote);
    } else if let Some(matches) = matches.subcommand_matches("format") {
        let region = parse_region(matches)?;
        let raw_code = matches.value_of("code").unwrap_or("600519");
        println!("{}", format_code(raw_code, region));
    } else if matches.subcommand_matches("timeframes").is_some() {
        println!("{:<6} {:<10} {:<6} {:<10}", "Label", "Name", "Type", "Granularity");
        for entry in CATALOG.iter() {
            println!(
                "{:<6} {:<10} {:<6} {:<10}",
                entry.label,
                entry.display,
                entry.provider_type_code,
                format!("{:?}", entry.granularity)
            );
        }
    } else {
        info!("No command specified. Use --help for usage information.");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart_matches(args: &[&str]) -> ArgMatches {
        App::new("test")
            .arg(Arg::with_name("count").long("count").takes_value(true).default_value("500"))
            .arg(Arg::with_name("limit").long("limit").takes_value(true).default_value("10"))
            .get_matches_from(args)
    }

    #[test]
    fn test_numeric_flags_use_defaults() {
        let matches = chart_matches(&["test"]);
        assert_eq!(parse_usize(&matches, "count").unwrap(), 500);
        assert_eq!(parse_usize(&matches, "limit").unwrap(), 10);
    }

    #[test]
    fn test_bad_limit_is_reported_like_count() {
        let matches = chart_matches(&["test", "--limit", "ten", "--count", "many"]);
        let limit_err = parse_usize(&matches, "limit").unwrap_err();
        let count_err = parse_usize(&matches, "count").unwrap_err();
        assert_eq!(limit_err.to_string(), "invalid --limit: ten");
        assert_eq!(count_err.to_string(), "invalid --count: many");
    }
}
