//! Value Objects for the storefront

use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// URL slug value object.
///
/// Only lowercase ASCII letters, digits and single inner hyphens.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    /// Derive a slug from a display name: accents stripped, lowercased,
    /// every run of other characters collapsed into one hyphen.
    pub fn generate(source: &str) -> Result<Self, SlugError> {
        let mut slug = String::with_capacity(source.len());
        let mut pending_hyphen = false;
        let chars = source
            .nfd()
            .filter(|c| !is_combining_mark(*c))
            .flat_map(char::to_lowercase);
        for c in chars {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                if pending_hyphen && !slug.is_empty() {
                    slug.push('-');
                }
                pending_hyphen = false;
                slug.push(c);
            } else {
                pending_hyphen = true;
            }
        }
        if slug.is_empty() { return Err(SlugError::Empty); }
        Ok(Self(slug))
    }

    /// Accept a slug typed by staff as-is, provided it is already canonical.
    pub fn parse(value: &str) -> Result<Self, SlugError> {
        let value = value.trim();
        if value.is_empty() { return Err(SlugError::Empty); }
        let canonical = value
            .split('-')
            .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()));
        if !canonical { return Err(SlugError::Invalid(value.to_string())); }
        Ok(Self(value.to_string()))
    }

    /// Use the explicit slug when given, otherwise derive one from `name`.
    pub fn from_input(explicit: Option<&str>, name: &str) -> Result<Self, SlugError> {
        match explicit.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => Self::parse(s),
            None => Self::generate(name),
        }
    }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl TryFrom<String> for Slug {
    type Error = SlugError;
    fn try_from(value: String) -> Result<Self, Self::Error> { Self::parse(&value) }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self { slug.0 }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum SlugError { Empty, Invalid(String) }
impl std::error::Error for SlugError {}
impl fmt::Display for SlugError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "slug is empty"),
            Self::Invalid(s) => write!(f, "slug '{s}' may only contain a-z, 0-9 and single hyphens"),
        }
    }
}

/// SKU (Stock Keeping Unit) value object
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sku(String);

impl Sku {
    pub fn new(value: impl Into<String>) -> Result<Self, SkuError> {
        let value = value.into().trim().to_uppercase();
        if value.is_empty() { return Err(SkuError::Empty); }
        if value.len() > 50 { return Err(SkuError::TooLong); }
        Ok(Self(value))
    }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum SkuError { Empty, TooLong }
impl std::error::Error for SkuError {}
impl fmt::Display for SkuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self { Self::Empty => write!(f, "SKU empty"), Self::TooLong => write!(f, "SKU too long") }
    }
}

/// Phone numbers are compared on their digits only.
pub fn phone_digits(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_lowercases_and_strips_accents() {
        assert_eq!(Slug::generate("Écran iPhone 12").unwrap().as_str(), "ecran-iphone-12");
        assert_eq!(Slug::generate("Coque Protège-Écran").unwrap().as_str(), "coque-protege-ecran");
        assert_eq!(Slug::generate("Chargeur Rapide 20W").unwrap().as_str(), "chargeur-rapide-20w");
    }

    #[test]
    fn test_slug_collapses_and_trims_separators() {
        assert_eq!(Slug::generate("  --Câble  USB-C / Lightning!! ").unwrap().as_str(), "cable-usb-c-lightning");
        assert_eq!(Slug::generate("a___b").unwrap().as_str(), "a-b");
    }

    #[test]
    fn test_slug_is_idempotent() {
        for name in ["Écouteurs sans fil", "Montre connectée", "Batterie 5000 mAh", "Tablette (10\")", "ÀÉÎÕÜ ç"] {
            let once = Slug::generate(name).unwrap();
            let twice = Slug::generate(once.as_str()).unwrap();
            assert_eq!(once, twice, "{name}");
            assert_eq!(Slug::parse(once.as_str()).unwrap(), once);
        }
    }

    #[test]
    fn test_slug_rejects_empty() {
        assert_eq!(Slug::generate("   "), Err(SlugError::Empty));
        assert_eq!(Slug::generate("!!!"), Err(SlugError::Empty));
        assert_eq!(Slug::parse(""), Err(SlugError::Empty));
    }

    #[test]
    fn test_slug_parse_rejects_non_canonical() {
        assert!(Slug::parse("Coques").is_err());
        assert!(Slug::parse("coques--iphone").is_err());
        assert!(Slug::parse("-coques").is_err());
        assert!(Slug::parse("coques iphone").is_err());
        assert!(Slug::parse("coques-iphone").is_ok());
    }

    #[test]
    fn test_slug_from_input_prefers_explicit() {
        assert_eq!(Slug::from_input(Some("housse"), "Étui cuir").unwrap().as_str(), "housse");
        assert_eq!(Slug::from_input(Some("  "), "Étui cuir").unwrap().as_str(), "etui-cuir");
        assert_eq!(Slug::from_input(None, "Étui cuir").unwrap().as_str(), "etui-cuir");
    }

    #[test]
    fn test_sku() { let sku = Sku::new("prod-001").unwrap(); assert_eq!(sku.as_str(), "PROD-001"); }

    #[test]
    fn test_phone_digits() { assert_eq!(phone_digits("54 080 419"), "54080419"); }
}
