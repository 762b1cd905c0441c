//! レイアウト検証のエラー

use crate::types::ImageRegion;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// 幅または高さが0の領域（画素を切り出せない）
    #[error("{name}領域のサイズが0です: {region}")]
    EmptyRegion {
        name: &'static str,
        region: ImageRegion,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_region_message_names_field_and_geometry() {
        let error = Error::EmptyRegion {
            name: "price",
            region: ImageRegion::new(969, 321, 0, 726),
        };
        assert_eq!(error.to_string(), "price領域のサイズが0です: 0x726+969+321");
    }
}
