//! 画面レイアウト設定モジュール
//!
//! 取引所画面のスクリーンショット上で、タイトル・価格列・数量列が
//! 描画される固定座標を保持する。座標は 1920x1080 のキャプチャ基準。

use crate::error::{Error, Result};
use crate::types::ImageRegion;
use serde::{Deserialize, Serialize};

/// アイテム名の領域
pub const TITLE_REGION: ImageRegion = ImageRegion::new(166, 491, 415, 81);
/// 価格列の領域
pub const PRICE_REGION: ImageRegion = ImageRegion::new(969, 321, 141, 726);
/// 数量列の領域
pub const AMOUNT_REGION: ImageRegion = ImageRegion::new(1511, 317, 58, 688);

/// 3つのフィールド領域
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenLayout {
    pub title: ImageRegion,
    pub price: ImageRegion,
    pub amount: ImageRegion,
}

impl Default for ScreenLayout {
    fn default() -> Self {
        Self {
            title: TITLE_REGION,
            price: PRICE_REGION,
            amount: AMOUNT_REGION,
        }
    }
}

impl ScreenLayout {
    /// 幅・高さが0の領域がないか確認
    pub fn validate(&self) -> Result<()> {
        for (name, region) in self.regions() {
            if region.width == 0 || region.height == 0 {
                return Err(Error::EmptyRegion { name, region });
            }
        }
        Ok(())
    }

    pub fn regions(&self) -> [(&'static str, ImageRegion); 3] {
        [("title", self.title), ("price", self.price), ("amount", self.amount)]
    }
}
