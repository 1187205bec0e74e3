//! Locates image containers in a page and pulls out display name and image reference.

use anyhow::Result;
use scraper::{ElementRef, Html, Selector};

/// Compiled selectors for the container layout pattern.
#[derive(Debug, Clone)]
pub struct ContainerSelectors {
    container: Selector,
    anchor: Selector,
    heading: Selector,
    image: Selector,
}

impl ContainerSelectors {
    /// `div.<container_class>` containers whose `a` holds a `span.<heading_class>` name.
    pub fn new(container_class: &str, heading_class: &str) -> Result<Self> {
        Ok(Self {
            container: parse_selector(&format!("div.{}", container_class))?,
            anchor: parse_selector("a")?,
            heading: parse_selector(&format!("span.{}", heading_class))?,
            image: parse_selector("img")?,
        })
    }
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow::anyhow!("invalid selector {:?}: {}", css, e))
}

/// Image reference found in a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    /// No `img` element in the container.
    Missing,
    /// An `img` without a `src` attribute.
    NoSrc,
    /// The raw `src` attribute value.
    Src(String),
}

/// One container occurrence, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    /// Trimmed heading text; None if absent or blank.
    pub display_name: Option<String>,
    pub image: ImageRef,
}

/// Returns every container of `html` in document order.
pub fn extract_containers(html: &str, selectors: &ContainerSelectors) -> Vec<Container> {
    let document = Html::parse_document(html);
    document
        .select(&selectors.container)
        .map(|el| Container {
            display_name: display_name(el, selectors),
            image: image_ref(el, selectors),
        })
        .collect()
}

fn display_name(container: ElementRef<'_>, selectors: &ContainerSelectors) -> Option<String> {
    let anchor = container.select(&selectors.anchor).next()?;
    let heading = anchor.select(&selectors.heading).next()?;
    let text: String = heading.text().collect();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn image_ref(container: ElementRef<'_>, selectors: &ContainerSelectors) -> ImageRef {
    match container.select(&selectors.image).next() {
        None => ImageRef::Missing,
        Some(img) => match img.value().attr("src") {
            None => ImageRef::NoSrc,
            Some(src) => ImageRef::Src(src.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selectors() -> ContainerSelectors {
        ContainerSelectors::new("x-column", "heading").unwrap()
    }

    #[test]
    fn named_and_unnamed_containers() {
        let html = r#"
            <div class="x-column x-sm x-1-2">
              <a href="/loft"><span class="heading"> Modern Loft </span></a>
              <img src="/uploads/loft.jpg">
            </div>
            <div class="x-column">
              <a href="/x"><span class="subheading">Not a heading</span></a>
              <img src="/uploads/other.png?v=2">
            </div>
            <div class="x-column"><p>text only</p></div>
            <div class="x-column"><img alt="no src"></div>
            <div class="other"><img src="/ignored.jpg"></div>
        "#;
        let containers = extract_containers(html, &selectors());
        assert_eq!(
            containers,
            vec![
                Container {
                    display_name: Some("Modern Loft".to_string()),
                    image: ImageRef::Src("/uploads/loft.jpg".to_string()),
                },
                Container {
                    display_name: None,
                    image: ImageRef::Src("/uploads/other.png?v=2".to_string()),
                },
                Container {
                    display_name: None,
                    image: ImageRef::Missing,
                },
                Container {
                    display_name: None,
                    image: ImageRef::NoSrc,
                },
            ]
        );
    }

    #[test]
    fn heading_outside_anchor_is_ignored() {
        let html = r#"
            <div class="x-column">
              <span class="heading">Outside</span>
              <a href="/"><img src="a.jpg"></a>
            </div>
        "#;
        let containers = extract_containers(html, &selectors());
        assert_eq!(containers.len(), 1);
        assert_eq!(containers[0].display_name, None);
        assert_eq!(containers[0].image, ImageRef::Src("a.jpg".to_string()));
    }

    #[test]
    fn nested_heading_text_is_joined() {
        let html = r#"
            <div class="x-column">
              <a href="/"><span class="heading">Sky <em>Villa</em></span></a>
              <img src="villa.webp">
            </div>
        "#;
        let containers = extract_containers(html, &selectors());
        assert_eq!(containers[0].display_name.as_deref(), Some("Sky Villa"));
    }

    #[test]
    fn invalid_class_is_rejected() {
        assert!(ContainerSelectors::new("x column!", "heading").is_err());
    }
}
