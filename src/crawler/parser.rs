//! HTML parser for extracting product cards
//!
//! For every element matching the card selector this module reads:
//! - the `src` of the first element matching the image selector
//! - the text of the first element matching the name selector

use crate::config::InspectorConfig;
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};

/// Compiled selectors used to find product cards
#[derive(Debug, Clone)]
pub struct CardSelectors {
    card: Selector,
    image: Selector,
    name: Selector,
}

impl CardSelectors {
    /// Compiles the three selectors
    pub fn new(card: &str, image: &str, name: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            card: compile(card)?,
            image: compile(image)?,
            name: compile(name)?,
        })
    }

    /// Compiles the selectors named in the inspector configuration
    pub fn from_config(config: &InspectorConfig) -> Result<Self, ConfigError> {
        Self::new(
            &config.card_selector,
            &config.image_selector,
            &config.name_selector,
        )
    }
}

fn compile(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector)
        .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", selector, e)))
}

/// Raw attributes read from one product card
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardMatch {
    /// Text content of the name element, untrimmed
    pub name: Option<String>,

    /// `src` attribute of the image element, possibly empty
    pub image_src: Option<String>,
}

/// Extracts every product card from an HTML document, in document order
///
/// # Example
///
/// ```
/// use image_audit::crawler::{extract_cards, CardSelectors};
///
/// let selectors = CardSelectors::new(".card", "img", "h2").unwrap();
/// let html = r#"<div class="card"><h2>Gate</h2><img src="/g.jpg"></div>"#;
/// let cards = extract_cards(html, &selectors);
/// assert_eq!(cards[0].name.as_deref(), Some("Gate"));
/// assert_eq!(cards[0].image_src.as_deref(), Some("/g.jpg"));
/// ```
pub fn extract_cards(html: &str, selectors: &CardSelectors) -> Vec<CardMatch> {
    let document = Html::parse_document(html);

    document
        .select(&selectors.card)
        .map(|card| CardMatch {
            name: extract_name(card, &selectors.name),
            image_src: extract_image_src(card, &selectors.image),
        })
        .collect()
}

fn extract_name(card: ElementRef<'_>, selector: &Selector) -> Option<String> {
    card.select(selector)
        .next()
        .map(|element| element.text().collect::<String>())
}

fn extract_image_src(card: ElementRef<'_>, selector: &Selector) -> Option<String> {
    card.select(selector)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(str::to_string)
}
