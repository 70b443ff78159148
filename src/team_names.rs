use std::collections::HashMap;

use once_cell::sync::Lazy;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// football-data.co.uk label -> FBref label for La Liga / Segunda.
const LALIGA_OVERRIDES: &[(&str, &str)] = &[
    ("Alaves", "Alavés"),
    ("Ath Bilbao", "Athletic Club"),
    ("Ath Madrid", "Atlético Madrid"),
    ("Atletico Madrid", "Atlético Madrid"),
    ("Barcelona", "Barcelona"),
    ("Betis", "Real Betis"),
    ("Cadiz", "Cádiz"),
    ("Celta", "Celta Vigo"),
    ("Espanol", "Espanyol"),
    ("Getafe", "Getafe"),
    ("Girona", "Girona"),
    ("Granada", "Granada"),
    ("Las Palmas", "Las Palmas"),
    ("Mallorca", "Mallorca"),
    ("Osasuna", "Osasuna"),
    ("Rayo Vallecano", "Rayo Vallecano"),
    ("Real Madrid", "Real Madrid"),
    ("Real Sociedad", "Real Sociedad"),
    ("Sevilla", "Sevilla"),
    ("Valencia", "Valencia"),
    ("Valladolid", "Real Valladolid"),
    ("Villarreal", "Villarreal"),
    ("Almeria", "Almería"),
    ("Leganes", "Leganés"),
    ("Oviedo", "Oviedo"),
    ("Levante", "Levante"),
    ("Elche", "Elche"),
];

static LALIGA_MAP: Lazy<TeamNameMap> = Lazy::new(|| TeamNameMap::from_pairs(LALIGA_OVERRIDES));

/// Comparison key for a team name: lower-cased, canonically decomposed, with
/// combining marks dropped. "Cádiz" and "cadiz" share a key.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .nfd()
        .filter(|ch| !is_combining_mark(*ch))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Hand-curated override table from one provider's labels to the other's.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamNameMap {
    entries: HashMap<String, String>,
}

impl TeamNameMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let entries = pairs
            .iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect();
        Self { entries }
    }

    /// The built-in Spanish league table.
    pub fn laliga() -> &'static TeamNameMap {
        &LALIGA_MAP
    }

    pub fn insert(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.entries.insert(from.into(), to.into());
    }

    /// Keys are matched verbatim: the table is written against a known source vocabulary.
    pub fn get(&self, source: &str) -> Option<&str> {
        self.entries.get(source).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    Partial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamMatch<'a> {
    pub name: &'a str,
    pub kind: MatchKind,
    pub via_override: bool,
}

/// Maps `source` onto an entry of `universe`; see [`reconcile_detailed`].
pub fn reconcile<'a>(source: &str, universe: &[&'a str], map: &TeamNameMap) -> Option<&'a str> {
    reconcile_detailed(source, universe, map).map(|m| m.name)
}

/// First match wins: override-or-normalized key, then exact key equality,
/// then substring containment in either direction.
///
/// The substring pass is permissive on purpose and can pair a short name with
/// an unrelated longer one ("Betis" inside "Real Betis B"). Callers that care
/// should check for [`MatchKind::Partial`]. An override always decides the key,
/// even when the raw source name would have matched some other entry exactly.
///
/// Two cases differ from plain substring containment, where the empty string
/// is contained in everything: a source that normalizes to an empty key
/// matches nothing, and universe entries that normalize to empty are never
/// partial candidates.
pub fn reconcile_detailed<'a>(
    source: &str,
    universe: &[&'a str],
    map: &TeamNameMap,
) -> Option<TeamMatch<'a>> {
    let override_target = map.get(source);
    let key = normalize(override_target.unwrap_or(source));
    if key.is_empty() {
        return None;
    }
    let via_override = override_target.is_some();

    let normalized: Vec<(&'a str, String)> = universe
        .iter()
        .map(|name| (*name, normalize(name)))
        .collect();

    if let Some((name, _)) = normalized.iter().find(|(_, norm)| *norm == key) {
        log::debug!("reconcile '{source}' -> '{name}' (exact)");
        return Some(TeamMatch {
            name: *name,
            kind: MatchKind::Exact,
            via_override,
        });
    }

    let partial = normalized
        .iter()
        .filter(|(_, norm)| !norm.is_empty())
        .find(|(_, norm)| key.contains(norm.as_str()) || norm.contains(key.as_str()));
    if let Some((name, _)) = partial {
        log::debug!("reconcile '{source}' -> '{name}' (partial)");
        return Some(TeamMatch {
            name: *name,
            kind: MatchKind::Partial,
            via_override,
        });
    }

    log::debug!("reconcile '{source}': no match among {} teams", universe.len());
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_accents_and_case() {
        assert_eq!(normalize("Cádiz"), "cadiz");
        assert_eq!(normalize("ATLÉTICO Madrid"), "atletico madrid");
        assert_eq!(normalize("  Leganés "), "leganes");
    }

    #[test]
    fn normalize_is_idempotent() {
        for raw in ["Alavés", "Ath Bilbao", "İstanbul", "Ñandú  ", "e\u{301} ", ""] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "input {raw:?}");
        }
    }

    #[test]
    fn laliga_table_has_known_entries() {
        let map = TeamNameMap::laliga();
        assert_eq!(map.get("Ath Madrid"), Some("Atlético Madrid"));
        assert_eq!(map.get("ath madrid"), None);
    }
}
