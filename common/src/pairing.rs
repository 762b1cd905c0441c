//! 価格列と数量列の突き合わせ
//!
//! i行目の価格とi行目の数量は画面上の同じ出品行に対応する。
//! 両方が有効な行だけをレコードにする。

use crate::types::{ParsedNumber, PricedRecord};
use std::iter::Zip;
use std::slice::Iter;

/// `pair` が返す遅延イテレータ
///
/// 短い方の列の長さで打ち切る（OCRが列ごとに異なる行数を返しても
/// 余った末尾は黙って捨てる）。
pub struct Pairing<'a> {
    title: &'a str,
    rows: Zip<Iter<'a, ParsedNumber<f64>>, Iter<'a, ParsedNumber<i64>>>,
}

impl Iterator for Pairing<'_> {
    type Item = PricedRecord;

    fn next(&mut self) -> Option<Self::Item> {
        for (price, amount) in self.rows.by_ref() {
            if let (Some(price), Some(amount)) = (price.value(), amount.value()) {
                return Some(PricedRecord {
                    title: self.title.to_string(),
                    amount,
                    price,
                });
            }
        }
        None
    }
}

/// タイトル・価格列・数量列からレコード列を作る
///
/// # Examples
/// ```
/// use auction_ocr_common::{pair, ParsedNumber::{Invalid, Valid}};
///
/// let prices = [Valid(10.0), Invalid, Valid(5.0)];
/// let amounts = [Valid(3), Valid(2), Invalid];
/// let records: Vec<_> = pair("Iron Ore", &prices, &amounts).collect();
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].amount, 3);
/// ```
pub fn pair<'a>(
    title: &'a str,
    prices: &'a [ParsedNumber<f64>],
    amounts: &'a [ParsedNumber<i64>],
) -> Pairing<'a> {
    Pairing {
        title,
        rows: prices.iter().zip(amounts.iter()),
    }
}
