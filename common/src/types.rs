//! パイプラインで受け渡される型定義
//!
//! - ImageRegion: スクリーンショット内の固定矩形
//! - ParsedNumber: OCRトークン1行分の数値（または解析不能）
//! - PricedRecord: 同じ行の価格と数量を組にした最終出力

use serde::{Deserialize, Serialize};
use std::fmt;

/// ピクセル矩形
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ImageRegion {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// 右端（排他的）。u32を超える場合はNone
    pub fn right(&self) -> Option<u32> {
        self.x.checked_add(self.width)
    }

    /// 下端（排他的）。u32を超える場合はNone
    pub fn bottom(&self) -> Option<u32> {
        self.y.checked_add(self.height)
    }

    /// `image_width` x `image_height` の画像に完全に収まるか
    ///
    /// 幅または高さが0の矩形は画素を含まないため収まらないとみなす
    pub fn fits_within(&self, image_width: u32, image_height: u32) -> bool {
        if self.width == 0 || self.height == 0 {
            return false;
        }
        match (self.right(), self.bottom()) {
            (Some(right), Some(bottom)) => right <= image_width && bottom <= image_height,
            _ => false,
        }
    }
}

impl fmt::Display for ImageRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// OCRトークン1行分の解析結果
///
/// 負の値も正当な値として扱えるよう、番兵値ではなく列挙型で表す
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParsedNumber<T> {
    Valid(T),
    Invalid,
}

impl<T: Copy> ParsedNumber<T> {
    pub fn value(&self) -> Option<T> {
        match self {
            ParsedNumber::Valid(v) => Some(*v),
            ParsedNumber::Invalid => None,
        }
    }
}

impl<T> From<Option<T>> for ParsedNumber<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => ParsedNumber::Valid(v),
            None => ParsedNumber::Invalid,
        }
    }
}

impl<T: fmt::Display> fmt::Display for ParsedNumber<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsedNumber::Valid(v) => write!(f, "{}", v),
            ParsedNumber::Invalid => write!(f, "-"),
        }
    }
}

/// 出品1行分のレコード（タイトル・数量・価格）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedRecord {
    pub title: String,
    pub amount: i64,
    pub price: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_fits_within() {
        let region = ImageRegion::new(10, 20, 30, 40);
        assert!(region.fits_within(40, 60));
        assert!(region.fits_within(100, 100));
        assert!(!region.fits_within(39, 60));
        assert!(!region.fits_within(40, 59));
    }

    #[test]
    fn test_region_zero_size_does_not_fit() {
        assert!(!ImageRegion::new(0, 0, 0, 10).fits_within(100, 100));
        assert!(!ImageRegion::new(0, 0, 10, 0).fits_within(100, 100));
    }

    #[test]
    fn test_region_overflow_does_not_fit() {
        let region = ImageRegion::new(u32::MAX, 0, 2, 2);
        assert!(region.right().is_none());
        assert!(!region.fits_within(u32::MAX, u32::MAX));
    }

    #[test]
    fn test_region_display() {
        assert_eq!(ImageRegion::new(166, 491, 415, 81).to_string(), "415x81+166+491");
    }

    #[test]
    fn test_parsed_number_accessors() {
        let valid = ParsedNumber::Valid(-1);
        assert_eq!(valid.value(), Some(-1));

        let invalid: ParsedNumber<i64> = ParsedNumber::Invalid;
        assert_eq!(invalid.value(), None);
        assert_eq!(invalid.to_string(), "-");
    }

    #[test]
    fn test_priced_record_serializes_camel_case() {
        let record = PricedRecord {
            title: "Iron Ore".to_string(),
            amount: 3,
            price: 12.5,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"title":"Iron Ore","amount":3,"price":12.5}"#);
    }
}
