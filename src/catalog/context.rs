//! Catalog context builder
//!
//! Turns a catalog into the text block handed to the model as grounding.
//! The output is bounded: at most `limit` rows, and long descriptions are
//! clipped.

use super::Catalog;
use super::columns::{CanonicalField, ColumnMap};
use super::price::format_rupiah;
use tracing::{debug, warn};

pub const DEFAULT_ROW_LIMIT: usize = 60;

pub const DESCRIPTION_MAX_CHARS: usize = 120;

pub const ELLIPSIS: char = '…';

/// Returned instead of a catalog dump when name or price cannot be resolved.
pub const NOT_READY_MESSAGE: &str =
    "Katalog belum siap: kolom name/nama dan price/harga wajib ada.";

const CATALOG_TITLE: &str = "Katalog Frozen Food (ringkas):";

/// Order of fields on each bullet.
const BULLET_ORDER: [CanonicalField; 7] = [
    CanonicalField::Name,
    CanonicalField::Price,
    CanonicalField::Brand,
    CanonicalField::Packaging,
    CanonicalField::Category,
    CanonicalField::Stock,
    CanonicalField::Description,
];

/// Text summary of a catalog, built once per upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogContext {
    text: String,
    ready: bool,
    bullets: usize,
}

impl CatalogContext {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// False when the catalog lacked a name or price column.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Number of product bullets in the text.
    pub fn bullet_count(&self) -> usize {
        self.bullets
    }
}

impl std::fmt::Display for CatalogContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

fn clip_description(text: String) -> String {
    if text.chars().count() > DESCRIPTION_MAX_CHARS {
        let mut clipped: String = text.chars().take(DESCRIPTION_MAX_CHARS).collect();
        clipped.push(ELLIPSIS);
        clipped
    } else {
        text
    }
}

fn header_line(columns: &ColumnMap) -> String {
    let found = columns.found().map(|f| f.key()).collect::<Vec<_>>();
    format!("Kolom tersedia: {}.", found.join(", "))
}

/// Build the context for the first `limit` rows of `catalog`.
pub fn build_catalog_context(catalog: &Catalog, limit: usize) -> CatalogContext {
    let columns = ColumnMap::resolve(catalog.headers());
    if !columns.is_ready() {
        warn!(headers = ?catalog.headers(), "Catalog has no name or price column");
        return CatalogContext {
            text: NOT_READY_MESSAGE.to_string(),
            ready: false,
            bullets: 0,
        };
    }

    let mut lines = vec![header_line(&columns), CATALOG_TITLE.to_string()];
    for row in catalog.rows().take(limit) {
        let mut parts = Vec::with_capacity(BULLET_ORDER.len());
        for field in BULLET_ORDER {
            let Some(col) = columns.get(field) else {
                continue;
            };
            let cell = &row[col];
            if cell.is_blank() && !field.is_required() {
                continue;
            }
            let value = match field {
                CanonicalField::Price => format_rupiah(cell),
                CanonicalField::Description => clip_description(cell.to_string()),
                _ => cell.to_string(),
            };
            parts.push(format!("{}: {}", field.label(), value));
        }
        lines.push(format!("- {}", parts.join(" | ")));
    }

    let bullets = lines.len() - 2;
    debug!(bullets, total_rows = catalog.len(), limit, "Catalog context built");
    CatalogContext {
        text: lines.join("\n"),
        ready: true,
        bullets,
    }
}
