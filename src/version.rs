// Version information for the product NLP node

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-fasttext-serving-2026-10-19";

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Build date
pub const BUILD_DATE: &str = "2026-10-19";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "vectorize",
    "predict",
    "fasttext-bin-v12",
    "hierarchical-softmax",
    "label-prefix-stripping",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Product NLP Node {} ({})", VERSION_NUMBER, BUILD_DATE)
}
