//! efetch XML parsing.
//!
//! Streams the `<PubmedArticleSet>` document with `quick-xml` and keeps only
//! the fields the scorer and report need. Only the first `PubmedArticle` is
//! read; efetch is always called with a single identifier.

mod extract;

pub use extract::{extract, resolve_date};

use std::borrow::Cow;

use quick_xml::Reader;
use quick_xml::events::{BytesText, Event};

/// Fields read from one `PubmedArticle` element, in source spelling.
///
/// Single-valued fields are `None` when the element is absent; element lookups
/// follow document order and keep the first match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PubmedArticle {
    /// `MedlineCitation/PMID`.
    pub pmid: Option<String>,
    /// First `ArticleTitle`, including text of inline markup.
    pub title: Option<String>,
    /// First `Journal/Title`.
    pub journal: Option<String>,
    /// First `PubDate/Year`.
    pub year: Option<String>,
    /// First `PubDate/MedlineDate`.
    pub medline_date: Option<String>,
    /// Every `PublicationType`.
    pub publication_types: Vec<String>,
    /// Number of `Author` elements.
    pub author_count: usize,
    /// Every `AffiliationInfo/Affiliation`.
    pub affiliations: Vec<String>,
    /// Whether a `GrantList` element is present.
    pub has_grant_list: bool,
}

/// Parse an efetch response.
///
/// Returns `Ok(None)` when the document is well-formed but holds no
/// `PubmedArticle` (efetch answers unknown identifiers this way).
pub fn parse_article(xml: &str) -> Result<Option<PubmedArticle>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut state = ArticleReader::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) => state.open(e.local_name().as_ref()),
            Event::Empty(e) => {
                state.open(e.local_name().as_ref());
                state.close();
            }
            Event::End(_) => state.close(),
            Event::Text(t) => state.text(&unescape_lossy(&t)),
            Event::CData(t) => state.text(&String::from_utf8_lossy(&t)),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(state.finished)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Pmid,
    Title,
    Journal,
    Year,
    MedlineDate,
    PublicationType,
    Affiliation,
}

#[derive(Debug)]
struct Capture {
    field: Field,
    depth: usize,
    text: String,
}

#[derive(Debug, Default)]
struct ArticleReader {
    path: Vec<Vec<u8>>,
    article_depth: usize,
    current: Option<PubmedArticle>,
    finished: Option<PubmedArticle>,
    capture: Option<Capture>,
}

impl ArticleReader {
    fn open(&mut self, name: &[u8]) {
        self.path.push(name.to_vec());
        let depth = self.path.len();

        if self.finished.is_some() || self.capture.is_some() {
            return;
        }

        if name == b"PubmedArticle" && self.current.is_none() {
            self.current = Some(PubmedArticle::default());
            self.article_depth = depth;
            return;
        }

        let Some(article) = self.current.as_mut() else {
            return;
        };

        let parent = depth.checked_sub(2).map(|i| self.path[i].as_slice());
        let field = match (name, parent) {
            (b"Author", _) => {
                article.author_count += 1;
                None
            }
            (b"GrantList", _) => {
                article.has_grant_list = true;
                None
            }
            (b"PMID", Some(b"MedlineCitation")) if article.pmid.is_none() => Some(Field::Pmid),
            (b"ArticleTitle", _) if article.title.is_none() => Some(Field::Title),
            (b"Title", Some(b"Journal")) if article.journal.is_none() => Some(Field::Journal),
            (b"Year", Some(b"PubDate")) if article.year.is_none() => Some(Field::Year),
            (b"MedlineDate", Some(b"PubDate")) if article.medline_date.is_none() => {
                Some(Field::MedlineDate)
            }
            (b"PublicationType", _) => Some(Field::PublicationType),
            (b"Affiliation", Some(b"AffiliationInfo")) => Some(Field::Affiliation),
            _ => None,
        };

        if let Some(field) = field {
            self.capture = Some(Capture { field, depth, text: String::new() });
        }
    }

    fn close(&mut self) {
        let depth = self.path.len();

        if self.capture.as_ref().is_some_and(|c| c.depth == depth) {
            if let (Some(capture), Some(article)) = (self.capture.take(), self.current.as_mut()) {
                commit(article, capture.field, &capture.text);
            }
        }

        if self.current.is_some() && depth == self.article_depth {
            self.finished = self.current.take();
        }

        self.path.pop();
    }

    fn text(&mut self, text: &str) {
        if let Some(capture) = self.capture.as_mut() {
            capture.text.push_str(text);
        }
    }
}

fn commit(article: &mut PubmedArticle, field: Field, raw: &str) {
    let text = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    match field {
        Field::Pmid => article.pmid = Some(text),
        Field::Title => article.title = Some(text),
        Field::Journal => article.journal = Some(text),
        Field::Year => article.year = Some(text),
        Field::MedlineDate => article.medline_date = Some(text),
        Field::PublicationType if !text.is_empty() => article.publication_types.push(text),
        Field::Affiliation if !text.is_empty() => article.affiliations.push(text),
        Field::PublicationType | Field::Affiliation => {}
    }
}

/// Unescape entities, keeping the raw text when it holds an unknown entity.
fn unescape_lossy(text: &BytesText<'_>) -> String {
    text.unescape()
        .map(Cow::into_owned)
        .unwrap_or_else(|_| String::from_utf8_lossy(text).into_owned())
}
