//! OCRテキストパーサー
//!
//! OCRサーバーが返す改行区切りのテキストを、行ごとの数値列に変換する。
//! どちらのパーサーも入力行数と同じ長さの列を返し、行を捨てない
//! （価格列と数量列の位置対応を保つため）。

use crate::types::ParsedNumber;
use regex::Regex;

lazy_static::lazy_static! {
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();
}

/// OCRテキストを行に分割
///
/// 末尾の改行による空行も1行として残す。各行の前後の空白（`\r` を含む）は除去する。
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n').map(str::trim).collect()
}

/// 価格列のテキストをパース
///
/// 行ごとに:
/// 1. カンマをピリオドに置換（小数点がカンマで描画されるキャプチャがある）
/// 2. 浮動小数としてパース。失敗したら `Invalid`
/// 3. 元のトークンにカンマもピリオドも含まれない場合は100で割る
///    （OCRが小数点を落とすことがあるため、`125` は `1.25` とみなす）
///
/// # Examples
/// ```
/// use auction_ocr_common::{parse_prices, ParsedNumber};
///
/// let prices = parse_prices("12,5\n125\nabc");
/// assert_eq!(prices, vec![
///     ParsedNumber::Valid(12.5),
///     ParsedNumber::Valid(1.25),
///     ParsedNumber::Invalid,
/// ]);
/// ```
pub fn parse_prices(text: &str) -> Vec<ParsedNumber<f64>> {
    split_lines(text).into_iter().map(parse_price).collect()
}

fn parse_price(token: &str) -> ParsedNumber<f64> {
    let normalized = token.replace(',', ".");
    match normalized.parse::<f64>() {
        Ok(value) if value.is_finite() => {
            if token.contains(',') || token.contains('.') {
                ParsedNumber::Valid(value)
            } else {
                ParsedNumber::Valid(value / 100.0)
            }
        }
        _ => ParsedNumber::Invalid,
    }
}

/// 数量列のテキストをパース
///
/// 価格と同じくカンマをピリオドに置換してから整数としてパースする。
/// `4,2` は `4.2` になり整数として読めないので `Invalid`。
pub fn parse_amounts(text: &str) -> Vec<ParsedNumber<i64>> {
    split_lines(text).into_iter().map(parse_amount).collect()
}

fn parse_amount(token: &str) -> ParsedNumber<i64> {
    token.replace(',', ".").parse::<i64>().ok().into()
}

/// タイトル領域のOCRテキストを1行のアイテム名に整形
///
/// 改行や連続する空白を1つの空白にまとめ、前後を除去する。
pub fn normalize_title(text: &str) -> String {
    WHITESPACE_RE.replace_all(text.trim(), " ").into_owned()
}
