use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Vertical,
    Horizontal,
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Vertical => f.write_str("vertical"),
            Orientation::Horizontal => f.write_str("horizontal"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogImage {
    pub id: String,
    /// Path relative to the assets directory.
    pub src: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogGroup {
    pub id: Orientation,
    pub category: String,
    pub images: Vec<CatalogImage>,
}

/// Bundled background images, grouped by card orientation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    groups: Vec<CatalogGroup>,
}

impl Catalog {
    pub fn new(groups: Vec<CatalogGroup>) -> Self {
        Self { groups }
    }

    pub fn find(&self, id: &str) -> Option<(Orientation, &CatalogImage)> {
        self.groups.iter().find_map(|group| {
            group
                .images
                .iter()
                .find(|image| image.id == id)
                .map(|image| (group.id, image))
        })
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.images.len()).sum()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        let group = |orientation: Orientation, prefix: &str, category: &str, label: &str| CatalogGroup {
            id: orientation,
            category: category.to_string(),
            images: (1..=3)
                .map(|n| CatalogImage {
                    id: format!("{}{}", prefix, n),
                    src: format!("images/{}/{}{}.jpg", orientation, prefix, n),
                    label: format!("{} {}", label, n),
                })
                .collect(),
        };

        Self::new(vec![
            group(Orientation::Vertical, "V", "Vertical cards", "Vertical card"),
            group(Orientation::Horizontal, "H", "Horizontal cards", "Horizontal card"),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_has_both_orientations() {
        let catalog = Catalog::default();
        assert_eq!(catalog.len(), 6);

        let (orientation, image) = catalog.find("V2").unwrap();
        assert_eq!(orientation, Orientation::Vertical);
        assert_eq!(image.src, "images/vertical/V2.jpg");

        let (orientation, image) = catalog.find("H3").unwrap();
        assert_eq!(orientation, Orientation::Horizontal);
        assert_eq!(image.label, "Horizontal card 3");
    }

    #[test]
    fn test_find_is_case_sensitive() {
        assert!(Catalog::default().find("v1").is_none());
    }

    #[test]
    fn test_catalog_deserializes_from_json() {
        let json = r#"[
            {"id": "horizontal", "category": "Wide", "images": [
                {"id": "H9", "src": "cards/h9.png", "label": "Nine"}
            ]}
        ]"#;
        let catalog: Catalog = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.find("H9").unwrap().0, Orientation::Horizontal);
    }
}
