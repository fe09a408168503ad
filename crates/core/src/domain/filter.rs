use serde::{Deserialize, Serialize};

/// The five optional search fields a user may fill in.
///
/// `None`, empty and whitespace-only values all mean "no constraint".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSet {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub set_name: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub rarity: Option<String>,
    #[serde(default, rename = "type")]
    pub card_type: Option<String>,
}

impl FilterSet {
    /// Trims every field and drops the ones left empty.
    pub fn normalized(self) -> Self {
        Self {
            name: normalize_field(self.name),
            set_name: normalize_field(self.set_name),
            number: normalize_field(self.number),
            rarity: normalize_field(self.rarity),
            card_type: normalize_field(self.card_type),
        }
    }
}

fn normalize_field(value: Option<String>) -> Option<String> {
    value.map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::FilterSet;

    #[test]
    fn normalized_trims_and_drops_blank_fields() {
        let filters = FilterSet {
            name: Some("  Pikachu ".to_string()),
            set_name: Some("   ".to_string()),
            number: Some(String::new()),
            rarity: None,
            card_type: Some("Lightning".to_string()),
        }
        .normalized();

        assert_eq!(filters.name.as_deref(), Some("Pikachu"));
        assert_eq!(filters.set_name, None);
        assert_eq!(filters.number, None);
        assert_eq!(filters.card_type.as_deref(), Some("Lightning"));
    }

    #[test]
    fn whitespace_only_filters_normalize_to_default() {
        let filters = FilterSet { rarity: Some(" \t".to_string()), ..FilterSet::default() };
        assert_eq!(filters.normalized(), FilterSet::default());
    }
}
