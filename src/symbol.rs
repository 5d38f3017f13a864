use crate::models::stock::{CanonicalCode, Exchange, Region};

/// A股已带后缀的写法，.SS 为上交所的另一种后缀
const DOMESTIC_SUFFIXES: &[(&str, Exchange)] = &[
    (".SH", Exchange::Shanghai),
    (".SS", Exchange::Shanghai),
    (".SZ", Exchange::Shenzhen),
    (".BJ", Exchange::Beijing),
];

/// 按首位数字判断A股交易所，新增规则只需加一行
const DOMESTIC_PREFIX_RULES: &[(char, Exchange)] = &[
    ('6', Exchange::Shanghai),
    ('0', Exchange::Shenzhen),
    ('3', Exchange::Shenzhen),
    ('8', Exchange::Beijing),
    ('4', Exchange::Beijing),
];

const DOMESTIC_FALLBACK: Exchange = Exchange::Shanghai;

/// 将用户输入的代码转换为数据源代码
///
/// 纯函数，任何输入都有结果；对已规范化的代码再次调用结果不变。
pub fn format_code(raw: &str, region: Region) -> CanonicalCode {
    let code = raw.trim().to_uppercase();

    let formatted = match region {
        Region::Domestic => format_domestic(code),
        Region::HongKong => append_suffix(code, Exchange::HongKong),
        Region::Us => append_suffix(code, Exchange::Us),
    };

    CanonicalCode::new(formatted)
}

fn format_domestic(code: String) -> String {
    if let Some((suffix, exchange)) = DOMESTIC_SUFFIXES.iter().find(|(s, _)| code.ends_with(s)) {
        let base = &code[..code.len() - suffix.len()];
        return format!("{}{}", base, exchange.suffix());
    }

    let exchange = classify_domestic(&code);
    format!("{}{}", code, exchange.suffix())
}

/// 根据首位数字判断交易所，无法识别时归入上交所
pub fn classify_domestic(code: &str) -> Exchange {
    code.chars()
        .next()
        .and_then(|first| {
            DOMESTIC_PREFIX_RULES
                .iter()
                .find(|(digit, _)| *digit == first)
                .map(|(_, exchange)| *exchange)
        })
        .unwrap_or(DOMESTIC_FALLBACK)
}

fn append_suffix(code: String, exchange: Exchange) -> String {
    if code.ends_with(exchange.suffix()) {
        code
    } else {
        format!("{}{}", code, exchange.suffix())
    }
}
