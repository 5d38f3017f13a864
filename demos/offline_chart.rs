use egostrategy_kline::chart::assemble;
use egostrategy_kline::fetchers::infoway::parse_kline_response;
use egostrategy_kline::normalizer::normalize;
use egostrategy_kline::session::gaps;
use egostrategy_kline::symbol::format_code;
use egostrategy_kline::{Region, Timeframe};

// 数据源K线响应样例，含一条重复时间戳和一条坏数据
const SAMPLE: &str = r#"{"ret":200,"msg":"success","data":[{"s":"600519.SH","respList":[
    {"t":"1704159060","o":"1700.00","h":"1702.00","l":"1698.50","c":"1701.20","v":"120"},
    {"t":"1704159120","o":"1701.20","h":"1703.00","l":"1700.00","c":"1702.80","v":"95"},
    {"t":"1704159120","o":"1701.20","h":"1704.00","l":"1700.00","c":"1703.50","v":"101"},
    {"t":"1704159180","o":"--","h":"1704.00","l":"1702.00","c":"1703.00","v":"80"},
    {"t":"1704159240","o":"1703.50","h":"1705.00","l":"1703.00","c":"1704.10","v":"150"},
    {"t":"1704159300","o":"1704.10","h":"1704.50","l":"1701.00","c":"1701.90","v":"210"},
    {"t":"1704159360","o":"1701.90","h":"1702.30","l":"1700.80","c":"1702.00","v":"66"}
]}]}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let code = format_code(" 600519 ", Region::Domestic);
    let timeframe: Timeframe = "1分钟".parse()?;
    println!("代码: {}  周期: {}", code, timeframe.display_name());

    let raw_bars = parse_kline_response(SAMPLE, &code)?;
    let series = normalize(&raw_bars);
    println!("原始 {} 条, 标准化后 {} 条", raw_bars.len(), series.len());

    for point in series.points() {
        println!(
            "{}  O {:<8.2} C {:<8.2} V {:<6} MA5 {}",
            point.bar.time,
            point.bar.open,
            point.bar.close,
            point.bar.volume,
            point.ma5.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string())
        );
    }

    let gap_set = gaps(Region::Domestic, timeframe.granularity());
    let spec = assemble(&series, &gap_set)?.with_title(&format!("{} ({})", code, timeframe.display_name()));
    println!("{}", spec.to_json()?);

    Ok(())
}
