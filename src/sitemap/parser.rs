//! Sitemap XML parser
//!
//! Streams the document with `quick-xml` and collects the `<loc>` of every
//! top-level entry. Only direct `<loc>` children of an entry count, so
//! extension tags such as `<image:loc>` inside a `<url>` are ignored.

use quick_xml::events::Event;
use quick_xml::Reader;

/// A parsed sitemap document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapDocument {
    /// `<sitemapindex>`: locations of further sitemaps
    Index(Vec<String>),

    /// `<urlset>`: locations of individual pages
    UrlSet(Vec<String>),
}

impl SitemapDocument {
    /// Returns the collected locations regardless of document kind
    pub fn locations(&self) -> &[String] {
        match self {
            Self::Index(locs) | Self::UrlSet(locs) => locs,
        }
    }

    /// Consumes the document and returns its locations
    pub fn into_locations(self) -> Vec<String> {
        match self {
            Self::Index(locs) | Self::UrlSet(locs) => locs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RootKind {
    Index,
    UrlSet,
}

impl RootKind {
    fn from_tag(name: &[u8]) -> Result<Self, String> {
        match name {
            b"sitemapindex" => Ok(Self::Index),
            b"urlset" => Ok(Self::UrlSet),
            other => Err(format!(
                "unexpected root element <{}>, expected <sitemapindex> or <urlset>",
                String::from_utf8_lossy(other)
            )),
        }
    }

    fn entry_tag(self) -> &'static [u8] {
        match self {
            Self::Index => b"sitemap",
            Self::UrlSet => b"url",
        }
    }
}

// Element depths: root = 1, entry = 2, loc = 3
const ENTRY_DEPTH: usize = 2;
const LOC_DEPTH: usize = 3;

/// Parses a sitemap document
///
/// # Arguments
///
/// * `xml` - The raw XML text
///
/// # Returns
///
/// * `Ok(SitemapDocument)` - The document kind and its entry locations, in
///   document order
/// * `Err(String)` - The XML is malformed, has no root element, or the root
///   is neither `<sitemapindex>` nor `<urlset>`
///
/// # Example
///
/// ```
/// use image_audit::sitemap::{parse_sitemap, SitemapDocument};
///
/// let xml = r#"<urlset><url><loc>https://example.com/a</loc></url></urlset>"#;
/// let doc = parse_sitemap(xml).unwrap();
/// assert_eq!(doc, SitemapDocument::UrlSet(vec!["https://example.com/a".to_string()]));
/// ```
pub fn parse_sitemap(xml: &str) -> Result<SitemapDocument, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut root: Option<RootKind> = None;
    let mut depth = 0usize;
    let mut in_entry = false;
    let mut in_loc = false;
    let mut loc_buf = String::new();
    let mut entry_loc: Option<String> = None;
    let mut locations = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                depth += 1;
                let name = e.local_name();
                let name = name.as_ref();

                if depth == 1 {
                    root = Some(RootKind::from_tag(name)?);
                } else if let Some(kind) = root {
                    if depth == ENTRY_DEPTH && name == kind.entry_tag() {
                        in_entry = true;
                        entry_loc = None;
                    } else if depth == LOC_DEPTH && in_entry && name == b"loc" {
                        in_loc = true;
                        loc_buf.clear();
                    }
                }
            }
            Ok(Event::Empty(e)) => {
                // `<urlset/>` is a valid, empty document
                if depth == 0 && root.is_none() {
                    root = Some(RootKind::from_tag(e.local_name().as_ref())?);
                }
            }
            Ok(Event::End(_)) => {
                if depth == LOC_DEPTH && in_loc {
                    in_loc = false;
                    if entry_loc.is_none() {
                        entry_loc = Some(loc_buf.trim().to_string());
                    }
                } else if depth == ENTRY_DEPTH && in_entry {
                    in_entry = false;
                    if let Some(loc) = entry_loc.take().filter(|l| !l.is_empty()) {
                        locations.push(loc);
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Text(e)) if in_loc => {
                let text = e
                    .unescape()
                    .map_err(|err| format!("invalid text in <loc>: {}", err))?;
                loc_buf.push_str(&text);
            }
            Ok(Event::CData(e)) if in_loc => {
                loc_buf.push_str(&String::from_utf8_lossy(&e.into_inner()));
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "XML error at byte {}: {}",
                    reader.buffer_position(),
                    e
                ));
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err("unexpected end of document".to_string());
    }

    match root {
        Some(RootKind::Index) => Ok(SitemapDocument::Index(locations)),
        Some(RootKind::UrlSet) => Ok(SitemapDocument::UrlSet(locations)),
        None => Err("missing root element".to_string()),
    }
}

/// Keeps only the locations that contain one of the allow-list substrings
///
/// Matching is a plain substring test, not a glob.
pub fn filter_entries(locations: Vec<String>, allow_list: &[String]) -> Vec<String> {
    locations
        .into_iter()
        .filter(|loc| allow_list.iter().any(|pattern| loc.contains(pattern.as_str())))
        .collect()
}
