//! Language catalog endpoint

use axum::Json;
use tandem_common::languages::{LanguageInfo, LANGUAGE_CATALOG};

/// GET /api/languages
///
/// Codes the client offers in its pickers. Codes outside the catalog are
/// still accepted on write.
pub async fn list_languages() -> Json<&'static [LanguageInfo]> {
    Json(LANGUAGE_CATALOG)
}
