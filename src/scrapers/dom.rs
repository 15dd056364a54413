//! Read-only queries over a rendered page snapshot.

use crate::error::ScrapeError;
use scraper::{ElementRef, Html, Selector};

fn selector(css: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|e| ScrapeError::Extraction(format!("invalid selector '{css}': {e:?}")))
}

/// Find-by-selector capability shared by whole documents and single elements
pub trait ElementQuery<'a> {
    fn find_all(&self, css: &str) -> Result<Vec<Node<'a>>, ScrapeError>;

    fn find(&self, css: &str) -> Result<Option<Node<'a>>, ScrapeError> {
        Ok(self.find_all(css)?.into_iter().next())
    }

    /// Trimmed text of the first match
    fn text_of(&self, css: &str) -> Result<Option<String>, ScrapeError> {
        Ok(self.find(css)?.map(|node| node.text()))
    }
}

/// Parsed HTML of a page as it was rendered when captured
pub struct Snapshot {
    html: Html,
}

impl Snapshot {
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }
}

impl<'a> ElementQuery<'a> for &'a Snapshot {
    fn find_all(&self, css: &str) -> Result<Vec<Node<'a>>, ScrapeError> {
        let sel = selector(css)?;
        let snapshot: &'a Snapshot = *self;
        Ok(snapshot.html.select(&sel).map(Node).collect())
    }
}

/// One element of a [`Snapshot`]
#[derive(Clone, Copy)]
pub struct Node<'a>(ElementRef<'a>);

impl<'a> Node<'a> {
    /// Concatenated descendant text, trimmed
    pub fn text(&self) -> String {
        self.0.text().collect::<String>().trim().to_string()
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.0.value().attr(name)
    }
}

impl<'a> ElementQuery<'a> for Node<'a> {
    fn find_all(&self, css: &str) -> Result<Vec<Node<'a>>, ScrapeError> {
        let sel = selector(css)?;
        Ok(self.0.select(&sel).map(Node).collect())
    }
}
