//! Column inference
//!
//! Maps free-form spreadsheet headers onto the handful of product attributes
//! the sales agent understands. Matching is exact (case-insensitive) first,
//! then substring, over a fixed priority list per field.

use tracing::debug;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    Name,
    Price,
    Category,
    Stock,
    Description,
    Brand,
    Packaging,
}

impl CanonicalField {
    /// All fields, in the order they are listed in the context header.
    pub const ALL: [CanonicalField; 7] = [
        CanonicalField::Name,
        CanonicalField::Price,
        CanonicalField::Category,
        CanonicalField::Stock,
        CanonicalField::Description,
        CanonicalField::Brand,
        CanonicalField::Packaging,
    ];

    /// Candidate header names, highest priority first.
    pub fn candidates(self) -> &'static [&'static str] {
        match self {
            CanonicalField::Name => &["name", "nama", "product_name", "title"],
            CanonicalField::Price => &["price", "harga", "unit_price"],
            CanonicalField::Category => &["category", "kategori", "type", "jenis"],
            CanonicalField::Stock => &["stock", "stok", "qty", "quantity"],
            CanonicalField::Description => &["description", "deskripsi", "detail", "spec"],
            CanonicalField::Brand => &["brand", "merek", "merk", "brand_name"],
            CanonicalField::Packaging => &[
                "kemasan", "packaging", "pack", "ukuran", "size", "netto", "berat", "weight",
                "volume", "isi", "pack size",
            ],
        }
    }

    /// Key used in the "available columns" header line.
    pub fn key(self) -> &'static str {
        match self {
            CanonicalField::Name => "name",
            CanonicalField::Price => "price",
            CanonicalField::Category => "category",
            CanonicalField::Stock => "stock",
            CanonicalField::Description => "description",
            CanonicalField::Brand => "brand",
            CanonicalField::Packaging => "packaging",
        }
    }

    /// Label printed in front of the value on each catalog bullet.
    pub fn label(self) -> &'static str {
        match self {
            CanonicalField::Name => "Nama",
            CanonicalField::Price => "Harga",
            CanonicalField::Category => "Kategori",
            CanonicalField::Stock => "Stok",
            CanonicalField::Description => "Deskripsi",
            CanonicalField::Brand => "Merek",
            CanonicalField::Packaging => "Kemasan",
        }
    }

    pub fn is_required(self) -> bool {
        matches!(self, CanonicalField::Name | CanonicalField::Price)
    }

    fn index(self) -> usize {
        match self {
            CanonicalField::Name => 0,
            CanonicalField::Price => 1,
            CanonicalField::Category => 2,
            CanonicalField::Stock => 3,
            CanonicalField::Description => 4,
            CanonicalField::Brand => 5,
            CanonicalField::Packaging => 6,
        }
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Find the column position for a field given its candidate names.
///
/// An exact case-insensitive match on any candidate wins, taking candidates
/// in priority order and, for each, the leftmost column. Otherwise the
/// leftmost column whose header contains any candidate is returned. `None`
/// when nothing matches.
pub fn infer_column(headers: &[String], candidates: &[&str]) -> Option<usize> {
    let lowered: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
    let candidates: Vec<String> = candidates.iter().map(|c| c.to_lowercase()).collect();

    for cand in &candidates {
        if let Some(pos) = lowered.iter().position(|h| h == cand) {
            return Some(pos);
        }
    }

    lowered
        .iter()
        .position(|h| candidates.iter().any(|cand| h.contains(cand.as_str())))
}

/// Resolved column position for every canonical field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ColumnMap {
    columns: [Option<usize>; 7],
}

impl ColumnMap {
    pub fn resolve(headers: &[String]) -> Self {
        let mut map = ColumnMap::default();
        for field in CanonicalField::ALL {
            let column = infer_column(headers, field.candidates());
            match column {
                Some(pos) => debug!(field = %field, header = %headers[pos], "Column resolved"),
                None => debug!(field = %field, "Column not found"),
            }
            map.columns[field.index()] = column;
        }
        map
    }

    pub fn get(&self, field: CanonicalField) -> Option<usize> {
        self.columns[field.index()]
    }

    /// Both required fields (name and price) resolved.
    pub fn is_ready(&self) -> bool {
        CanonicalField::ALL
            .iter()
            .filter(|f| f.is_required())
            .all(|f| self.get(*f).is_some())
    }

    /// Fields that resolved, in [`CanonicalField::ALL`] order.
    pub fn found(&self) -> impl Iterator<Item = CanonicalField> + '_ {
        CanonicalField::ALL
            .into_iter()
            .filter(|f| self.get(*f).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_exact_match_beats_earlier_substring() {
        let cols = headers(&["Harga Grosir", "Harga"]);
        assert_eq!(infer_column(&cols, &["price", "harga"]), Some(1));
    }

    #[test]
    fn test_exact_match_is_case_insensitive() {
        let cols = headers(&["NAMA", "HARGA"]);
        assert_eq!(infer_column(&cols, CanonicalField::Name.candidates()), Some(0));
        assert_eq!(infer_column(&cols, CanonicalField::Price.candidates()), Some(1));
    }

    #[test]
    fn test_candidate_priority_orders_exact_matches() {
        // "name" outranks "nama" even though "nama" is further left
        let cols = headers(&["nama", "name"]);
        assert_eq!(infer_column(&cols, CanonicalField::Name.candidates()), Some(1));
    }

    #[test]
    fn test_substring_takes_leftmost_column() {
        let cols = headers(&["Kode", "Nama Produk", "Nama Singkat"]);
        assert_eq!(infer_column(&cols, CanonicalField::Name.candidates()), Some(1));
    }

    #[test]
    fn test_no_match_is_none() {
        let cols = headers(&["Kode", "Satuan"]);
        assert_eq!(infer_column(&cols, CanonicalField::Price.candidates()), None);
        assert_eq!(infer_column(&[], CanonicalField::Price.candidates()), None);
    }

    #[test]
    fn test_substring_is_greedy_on_short_candidates() {
        // "isi" from the packaging list appears inside "Posisi"
        let cols = headers(&["Posisi Rak"]);
        assert_eq!(infer_column(&cols, CanonicalField::Packaging.candidates()), Some(0));
    }

    #[test]
    fn test_column_map_readiness() {
        let map = ColumnMap::resolve(&headers(&["Nama", "Harga", "Stok"]));
        assert!(map.is_ready());
        assert_eq!(map.get(CanonicalField::Stock), Some(2));
        assert_eq!(map.get(CanonicalField::Brand), None);
        let found: Vec<_> = map.found().collect();
        assert_eq!(
            found,
            vec![CanonicalField::Name, CanonicalField::Price, CanonicalField::Stock]
        );

        let map = ColumnMap::resolve(&headers(&["Nama", "Stok"]));
        assert!(!map.is_ready());
    }
}
