//! Integer coding of the three Iris species and their display names.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Integer class label used by every stage after preparation.
pub type Label = usize;

/// Display string used when a label has no entry in the map.
pub const UNKNOWN_SPECIES: &str = "Unknown species";

/// Raw species strings in label order, starting at label 1.
pub const IRIS_SPECIES: [&str; 3] = ["Iris-setosa", "Iris-versicolor", "Iris-virginica"];

/// Lookup from integer label to the raw species string.
///
/// Built once during preparation and persisted with the prepared dataset, so
/// later stages display exactly the coding the model was trained on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeciesMap {
    entries: BTreeMap<Label, String>,
}

impl SpeciesMap {
    /// The fixed Iris coding: setosa = 1, versicolor = 2, virginica = 3.
    pub fn iris() -> Self {
        IRIS_SPECIES
            .iter()
            .enumerate()
            .map(|(idx, name)| (idx + 1, (*name).to_string()))
            .collect()
    }

    /// Label assigned to a raw species string, if it is one of the known values.
    pub fn label_for(&self, species: &str) -> Option<Label> {
        let species = species.trim();
        self.entries
            .iter()
            .find(|(_, name)| name.as_str() == species)
            .map(|(label, _)| *label)
    }

    /// Raw species string for a label.
    pub fn name(&self, label: Label) -> Option<&str> {
        self.entries.get(&label).map(String::as_str)
    }

    /// Short, capitalized species name (`"Iris-setosa"` becomes `"Setosa"`).
    ///
    /// Labels missing from the map render as [`UNKNOWN_SPECIES`].
    pub fn display_name(&self, label: Label) -> String {
        short_name(self.name(label).unwrap_or(UNKNOWN_SPECIES))
    }

    /// Labels in ascending order.
    pub fn labels(&self) -> Vec<Label> {
        self.entries.keys().copied().collect()
    }

    /// Short display names in ascending label order.
    pub fn display_names(&self) -> Vec<String> {
        self.entries.values().map(|name| short_name(name)).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Label, &str)> {
        self.entries
            .iter()
            .map(|(label, name)| (*label, name.as_str()))
    }
}

impl Default for SpeciesMap {
    fn default() -> Self {
        Self::iris()
    }
}

impl FromIterator<(Label, String)> for SpeciesMap {
    fn from_iter<I: IntoIterator<Item = (Label, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl std::fmt::Display for SpeciesMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .entries
            .iter()
            .map(|(label, name)| format!("{label}: '{name}'"))
            .collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

/// Last hyphen-delimited token, lowercased, then capitalized.
pub fn short_name(species: &str) -> String {
    let token = species.rsplit('-').next().unwrap_or(species).to_lowercase();
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iris_coding_is_a_bijection() {
        let map = SpeciesMap::iris();
        for (idx, species) in IRIS_SPECIES.iter().enumerate() {
            let label = map.label_for(species).unwrap();
            assert_eq!(label, idx + 1);
            assert_eq!(map.name(label), Some(*species));
        }
        assert_eq!(map.labels(), vec![1, 2, 3]);
    }

    #[test]
    fn unknown_species_has_no_label() {
        let map = SpeciesMap::iris();
        assert_eq!(map.label_for("Iris-germanica"), None);
        assert_eq!(map.label_for("setosa"), None);
    }

    #[test]
    fn display_name_uses_last_token_capitalized() {
        let map = SpeciesMap::iris();
        assert_eq!(map.display_name(1), "Setosa");
        assert_eq!(map.display_name(3), "Virginica");
        assert_eq!(
            map.display_names(),
            vec!["Setosa", "Versicolor", "Virginica"]
        );
    }

    #[test]
    fn missing_label_falls_back_to_sentinel() {
        let map = SpeciesMap::iris();
        assert_eq!(map.display_name(7), "Unknown species");
    }

    #[test]
    fn json_keys_round_trip_as_integers() {
        let map = SpeciesMap::iris();
        let json = serde_json::to_string(&map).unwrap();
        assert!(json.contains("\"1\":\"Iris-setosa\""));
        let back: SpeciesMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }
}
