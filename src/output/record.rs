use serde::{Deserialize, Serialize};

/// Image reference recorded for a card without a usable `src`
pub const NO_IMAGE: &str = "No Image";

/// Name recorded for a card without a display name
pub const UNKNOWN_PRODUCT: &str = "Unknown Product";

/// Name of the placeholder row written when nothing matched
pub const NO_PRODUCT_FOUND: &str = "No product card found";

/// One product card found on a page
///
/// Field names match the report columns: `pageUrl,name,imageSrc,isMissing`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "pageUrl")]
    pub page_url: String,

    pub name: String,

    #[serde(rename = "imageSrc")]
    pub image_ref: String,

    #[serde(rename = "isMissing")]
    pub is_missing: bool,
}

impl ProductRecord {
    /// Builds a record from the raw attributes of a matched card
    ///
    /// An absent or empty `src` becomes [`NO_IMAGE`] and marks the image as
    /// missing. An absent or blank name becomes [`UNKNOWN_PRODUCT`].
    pub fn from_card(page_url: &str, name: Option<&str>, image_src: Option<&str>) -> Self {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(UNKNOWN_PRODUCT);

        let image_ref = image_src.filter(|src| !src.is_empty());

        Self {
            page_url: page_url.to_string(),
            name: name.to_string(),
            image_ref: image_ref.unwrap_or(NO_IMAGE).to_string(),
            is_missing: image_ref.is_none(),
        }
    }

    /// The row written in place of an empty result set
    pub fn placeholder() -> Self {
        Self {
            page_url: String::new(),
            name: NO_PRODUCT_FOUND.to_string(),
            image_ref: String::new(),
            is_missing: false,
        }
    }
}
