//! Head tags derived from page metadata

use crate::page_data::Metadata;

/// One managed element in the document head
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadTag {
    /// `<title>`
    Title(String),
    /// `<meta name=... content=...>`
    Meta { name: String, content: String },
    /// `<meta property=... content=...>` (Open Graph)
    Property { property: String, content: String },
    /// `<link rel=... href=...>`
    Link { rel: String, href: String },
}

impl HeadTag {
    fn meta(name: &str, content: &str) -> Self {
        HeadTag::Meta {
            name: name.to_string(),
            content: content.to_string(),
        }
    }

    fn property(property: &str, content: &str) -> Self {
        HeadTag::Property {
            property: property.to_string(),
            content: content.to_string(),
        }
    }

    /// Render as HTML with attribute values escaped
    pub fn to_html(&self) -> String {
        match self {
            HeadTag::Title(title) => format!("<title>{}</title>", escape(title)),
            HeadTag::Meta { name, content } => {
                format!(r#"<meta name="{}" content="{}">"#, escape(name), escape(content))
            }
            HeadTag::Property { property, content } => format!(
                r#"<meta property="{}" content="{}">"#,
                escape(property),
                escape(content)
            ),
            HeadTag::Link { rel, href } => {
                format!(r#"<link rel="{}" href="{}">"#, escape(rel), escape(href))
            }
        }
    }
}

/// Tags for a page's metadata. Unset fields produce nothing, and Open Graph
/// title and description fall back to the plain ones.
pub fn head_tags(metadata: &Metadata) -> Vec<HeadTag> {
    let mut tags = Vec::new();

    if let Some(title) = &metadata.title {
        tags.push(HeadTag::Title(title.clone()));
    }
    if let Some(description) = &metadata.description {
        tags.push(HeadTag::meta("description", description));
    }
    if !metadata.keywords.is_empty() {
        tags.push(HeadTag::meta("keywords", &metadata.keywords.join(", ")));
    }
    if let Some(robots) = &metadata.robots {
        tags.push(HeadTag::meta("robots", robots));
    }
    if let Some(canonical) = &metadata.canonical {
        tags.push(HeadTag::Link {
            rel: "canonical".to_string(),
            href: canonical.clone(),
        });
    }

    if let Some(title) = metadata.og_title.as_ref().or(metadata.title.as_ref()) {
        tags.push(HeadTag::property("og:title", title));
    }
    if let Some(description) = metadata.og_description.as_ref().or(metadata.description.as_ref()) {
        tags.push(HeadTag::property("og:description", description));
    }
    if let Some(image) = &metadata.og_image {
        tags.push(HeadTag::property("og:image", image));
    }

    tags
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
