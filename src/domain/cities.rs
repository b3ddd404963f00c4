//! City name → source identifier index.
//!
//! The identifier is the path segment weather.com.cn uses for a city's
//! 7-day forecast page. Matching is exact and case-sensitive.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use crate::error::AppError;

/// Built-in index: municipalities and provincial capitals.
const BUILTIN_CITIES: [(&str, &str); 31] = [
    ("北京", "101010100"),
    ("上海", "101020100"),
    ("天津", "101030100"),
    ("重庆", "101040100"),
    ("哈尔滨", "101050101"),
    ("长春", "101060101"),
    ("沈阳", "101070101"),
    ("呼和浩特", "101080101"),
    ("石家庄", "101090101"),
    ("太原", "101100101"),
    ("济南", "101120101"),
    ("郑州", "101180101"),
    ("西安", "101110101"),
    ("兰州", "101160101"),
    ("银川", "101170101"),
    ("西宁", "101150101"),
    ("乌鲁木齐", "101130101"),
    ("合肥", "101220101"),
    ("南京", "101190101"),
    ("杭州", "101210101"),
    ("福州", "101230101"),
    ("南昌", "101240101"),
    ("长沙", "101250101"),
    ("武汉", "101200101"),
    ("成都", "101270101"),
    ("贵阳", "101260101"),
    ("昆明", "101290101"),
    ("南宁", "101300101"),
    ("拉萨", "101140101"),
    ("海口", "101310101"),
    ("广州", "101280101"),
];

/// Read-only mapping from city name to source identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityIndex {
    entries: BTreeMap<String, String>,
}

impl Default for CityIndex {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CityIndex {
    pub fn builtin() -> Self {
        Self::from_pairs(BUILTIN_CITIES)
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Load an index from a JSON object of `"name": "id"` pairs.
    pub fn from_json_file(path: &Path) -> Result<Self, AppError> {
        let file = File::open(path).map_err(|e| {
            AppError::new(2, format!("Failed to open city index '{}': {e}", path.display()))
        })?;
        let entries: BTreeMap<String, String> = serde_json::from_reader(file)
            .map_err(|e| AppError::new(2, format!("Invalid city index JSON: {e}")))?;
        if entries.is_empty() {
            return Err(AppError::new(2, "City index file contains no cities."));
        }
        Ok(Self { entries })
    }

    /// The built-in index, or the file named by `WX_CITY_INDEX` when set.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        match std::env::var("WX_CITY_INDEX") {
            Ok(path) if !path.trim().is_empty() => Self::from_json_file(Path::new(path.trim())),
            _ => Ok(Self::builtin()),
        }
    }

    pub fn source_id(&self, city: &str) -> Option<&str> {
        self.entries.get(city).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(name, id)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_index_resolves_exact_names() {
        let index = CityIndex::builtin();
        assert_eq!(index.len(), 31);
        assert_eq!(index.source_id("北京"), Some("101010100"));
        assert_eq!(index.source_id("广州"), Some("101280101"));
        assert_eq!(index.source_id("北京市"), None);
        assert_eq!(index.source_id(" 北京"), None);
    }

    #[test]
    fn matching_is_case_sensitive() {
        let index = CityIndex::from_pairs([("Beijing", "101010100")]);
        assert_eq!(index.source_id("Beijing"), Some("101010100"));
        assert_eq!(index.source_id("beijing"), None);
    }

    #[test]
    fn loads_index_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"Springfield": "999", "Shelbyville": "998"}}"#).unwrap();
        let index = CityIndex::from_json_file(file.path()).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.names(), vec!["Shelbyville", "Springfield"]);
        assert_eq!(index.source_id("Springfield"), Some("999"));
    }

    #[test]
    fn empty_json_index_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{}}").unwrap();
        let err = CityIndex::from_json_file(file.path()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
