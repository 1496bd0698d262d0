use serde::{Deserialize, Deserializer, Serialize};

/// A key element as listed by the catalog service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogElement {
    pub elements_code: i64,
    #[serde(default)]
    pub elements_key: String,
}

/// A skill as listed by the catalog service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSkill {
    #[serde(default)]
    pub skill_name: String,
    #[serde(default, deserialize_with = "one_or_many")]
    pub skill_code: Vec<i64>,
    #[serde(default)]
    pub skill_type: i64,
    #[serde(default)]
    pub skill_offset: i64,
}

/// A color the user sampled and saved under a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedColor {
    pub id: i64,
    pub coordinate: String,
    /// `r,g,b`
    pub rgb: String,
    #[serde(default)]
    pub name: String,
}

/// Older catalog entries carry a single skill code instead of a list.
pub(crate) fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(i64),
        Many(Vec<i64>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(code)) => vec![code],
        Some(OneOrMany::Many(codes)) => codes,
        None => Vec::new(),
    })
}
