use tracing_subscriber::EnvFilter;

/// `RUST_LOG` 未設定時のフィルタ
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "auction_ocr=debug"
    } else {
        "auction_ocr=info"
    }
}

/// ログ出力を初期化（二重初期化は無視）
pub fn init(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose))),
        )
        .try_init();
}
