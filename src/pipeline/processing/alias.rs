//! Curated alias tables correcting known naming gaps between the rent data
//! and the station master.
//!
//! The tables are one-way: source-side spelling to master-side canonical
//! spelling, keyed by normalized text. Anything not listed passes through
//! unchanged, so the mapping stays a partial function that is total by
//! convention.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::pipeline::processing::normalize::normalize;

/// Which of the two independent mappings to consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasKind {
    Operator,
    Line,
}

/// Immutable substitution tables for operator and line spellings.
///
/// Constructed explicitly (never a mutable global) so a test can build a
/// one-entry table and exercise a single rule in isolation.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    operators: HashMap<String, String>,
    lines: HashMap<String, String>,
}

impl AliasTable {
    /// Builds a table from explicit entry lists. Keys are normalized on the
    /// way in so lookups and entries agree on spelling.
    pub fn new<K, V>(
        operators: impl IntoIterator<Item = (K, V)>,
        lines: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        Self {
            operators: collect_normalized(operators),
            lines: collect_normalized(lines),
        }
    }

    /// The hand-curated production table.
    pub fn curated() -> &'static AliasTable {
        &CURATED
    }

    /// Map-or-identity lookup: the canonical spelling when `normalize(text)`
    /// is listed, the input unchanged otherwise.
    pub fn resolve(&self, kind: AliasKind, text: &str) -> String {
        let table = match kind {
            AliasKind::Operator => &self.operators,
            AliasKind::Line => &self.lines,
        };
        match table.get(&normalize(text)) {
            Some(canonical) => canonical.clone(),
            None => text.to_string(),
        }
    }
}

fn collect_normalized<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> HashMap<String, String>
where
    K: AsRef<str>,
    V: Into<String>,
{
    entries
        .into_iter()
        .map(|(k, v)| (normalize(k.as_ref()), v.into()))
        .collect()
}

/// Operator spellings that differ between the two datasets: JR group legal
/// entities, municipal operators, and private-railway abbreviations.
const OPERATOR_ALIASES: &[(&str, &str)] = &[
    ("北海道旅客鉄道", "jr"),
    ("東日本旅客鉄道", "jr"),
    ("東海旅客鉄道", "jr"),
    ("西日本旅客鉄道", "jr"),
    ("四国旅客鉄道", "jr"),
    ("九州旅客鉄道", "jr"),
    ("東京都", "都営地下鉄"),
    ("東京地下鉄", "東京メトロ"),
    ("大阪市高速電気軌道", "osakametro"),
    ("名古屋市", "名古屋市営地下鉄"),
    ("札幌市", "札幌市営地下鉄"),
    ("京都市", "京都市営地下鉄"),
    ("福岡市", "福岡市営地下鉄"),
    ("横浜市", "横浜市営地下鉄"),
    ("神戸市", "神戸市営地下鉄"),
    ("仙台市", "仙台市営地下鉄"),
    ("一般社団法人札幌市交通事業振興公社", "札幌市電"),
    ("首都圏新都市鉄道", "つくばエクスプレス"),
    // Private railways: short brand names to registered company names
    ("南海電鉄", "南海電気鉄道"),
    ("京阪電鉄", "京阪電気鉄道"),
    ("阪神電鉄", "阪神電気鉄道"),
    ("阪急電鉄", "阪急電鉄"),
    ("山陽電鉄", "山陽電気鉄道"),
    ("近鉄", "近畿日本鉄道"),
    ("名鉄", "名古屋鉄道"),
    ("西鉄", "西日本鉄道"),
    ("京急", "京浜急行電鉄"),
    ("東急", "東急電鉄"),
    ("小田急", "小田急電鉄"),
    ("京王", "京王電鉄"),
    ("西武", "西武鉄道"),
    ("東武", "東武鉄道"),
    ("京成", "京成電鉄"),
    ("相鉄", "相模鉄道"),
];

/// Line spellings not already covered by `normalize_line`: the rapid-service
/// branding of the Chuo line maps onto the master's plain line name.
const LINE_ALIASES: &[(&str, &str)] = &[("中央線快速", "中央線")];

static CURATED: Lazy<AliasTable> = Lazy::new(|| {
    AliasTable::new(
        OPERATOR_ALIASES.iter().copied(),
        LINE_ALIASES.iter().copied(),
    )
});
