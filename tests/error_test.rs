//! エラーケーステスト
//!
//! 各種エラーの表示・段階・変換を検証

use auction_ocr::error::{AppError, PipelineError, Stage};
use auction_ocr::scanner;
use auction_ocr_common::ImageRegion;
use std::path::Path;

/// 段階ごとの分類
#[test]
fn test_pipeline_error_stages() {
    let cases = vec![
        (PipelineError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")), Stage::Read),
        (PipelineError::DecodeFailed("bad header".into()), Stage::Extract),
        (
            PipelineError::OutOfBounds {
                region: ImageRegion::new(0, 0, 10, 10),
                image_width: 5,
                image_height: 5,
            },
            Stage::Extract,
        ),
        (PipelineError::EncodeFailed("png".into()), Stage::Ocr),
        (PipelineError::TransportFailed("refused".into()), Stage::Ocr),
        (PipelineError::MalformedResponse("no result".into()), Stage::Ocr),
        (PipelineError::EmissionFailed("401".into()), Stage::Emit),
    ];

    for (err, stage) in cases {
        assert_eq!(err.stage(), stage, "{:?}", err);
        assert!(!err.to_string().is_empty());
    }
}

#[test]
fn test_out_of_bounds_message_names_region_and_image() {
    let err = PipelineError::OutOfBounds {
        region: ImageRegion::new(969, 321, 141, 726),
        image_width: 1280,
        image_height: 720,
    };
    let display = err.to_string();
    assert!(display.contains("141x726+969+321"));
    assert!(display.contains("1280x720"));
}

#[test]
fn test_stage_display() {
    assert_eq!(Stage::Read.to_string(), "read");
    assert_eq!(Stage::Extract.to_string(), "extract");
    assert_eq!(Stage::Ocr.to_string(), "ocr");
    assert_eq!(Stage::Emit.to_string(), "emit");
}

/// 存在しないフォルダをスキャンした場合
#[test]
fn test_scan_nonexistent_folder() {
    let result = scanner::scan_folder(Path::new("/nonexistent/path/12345"), ".png");
    assert!(matches!(result, Err(AppError::FolderNotFound(_))));
}

/// パイプラインエラーは透過的に表示される
#[test]
fn test_pipeline_error_conversion_is_transparent() {
    let err: AppError = PipelineError::TransportFailed("refused".into()).into();
    assert!(matches!(err, AppError::Pipeline(_)));
    assert!(err.to_string().contains("refused"));
}

#[test]
fn test_common_error_conversion() {
    let common_err = auction_ocr_common::Error::EmptyRegion {
        name: "title",
        region: ImageRegion::new(0, 0, 0, 0),
    };
    let err: AppError = common_err.into();
    assert!(matches!(err, AppError::Common(_)));
    assert!(err.to_string().contains("領域"));
}

#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err: AppError = io_err.into();
    assert!(matches!(err, AppError::Io(_)));
}
