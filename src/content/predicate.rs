use std::fmt;

/// A query predicate understood by the content API.
///
/// Only the `at` (equality) predicate is needed by the site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    At { path: String, value: String },
}

impl Predicate {
    pub fn at(path: impl Into<String>, value: impl Into<String>) -> Self {
        Predicate::At {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Match documents of the given custom type.
    pub fn document_type(doc_type: &str) -> Self {
        Self::at("document.type", doc_type)
    }

    /// Match the document of `doc_type` with the given UID.
    pub fn uid(doc_type: &str, uid: &str) -> Self {
        Self::at(format!("my.{doc_type}.uid"), uid)
    }

    /// Match a document by its internal id.
    pub fn document_id(id: &str) -> Self {
        Self::at("document.id", id)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::At { path, value } => {
                let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
                write!(f, "[at({path}, \"{escaped}\")]")
            }
        }
    }
}

/// Encode predicates into the `q` query parameter (`[[at(...)][at(...)]]`).
pub fn encode_predicates(predicates: &[Predicate]) -> String {
    let mut q = String::from("[");
    for predicate in predicates {
        q.push_str(&predicate.to_string());
    }
    q.push(']');
    q
}

/// A single ordering directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ordering {
    pub field: String,
    pub descending: bool,
}

impl Ordering {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }
}

impl fmt::Display for Ordering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            write!(f, "{} desc", self.field)
        } else {
            f.write_str(&self.field)
        }
    }
}

/// Encode orderings into the `orderings` query parameter.
pub fn encode_orderings(orderings: &[Ordering]) -> String {
    let joined = orderings
        .iter()
        .map(Ordering::to_string)
        .collect::<Vec<_>>()
        .join(",");
    format!("[{joined}]")
}

/// Which snapshot of the content repository a read targets.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Revision {
    /// The published content.
    #[default]
    Master,
    /// An explicit (possibly unpublished) ref, e.g. from a preview session.
    Ref(String),
}

/// A document search, built with chained setters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchQuery {
    pub predicates: Vec<Predicate>,
    pub page_size: Option<u32>,
    pub page: Option<u32>,
    pub fetch: Vec<String>,
    pub orderings: Vec<Ordering>,
    pub after: Option<String>,
    pub revision: Revision,
}

impl SearchQuery {
    pub fn new(predicates: Vec<Predicate>) -> Self {
        Self {
            predicates,
            ..Self::default()
        }
    }

    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Restrict the returned `data` to the given `type.field` paths.
    pub fn fetch<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fetch = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn order_by(mut self, ordering: Ordering) -> Self {
        self.orderings.push(ordering);
        self
    }

    /// Only return documents positioned after the given document id.
    pub fn after(mut self, document_id: impl Into<String>) -> Self {
        self.after = Some(document_id.into());
        self
    }

    pub fn revision(mut self, revision: Revision) -> Self {
        self.revision = revision;
        self
    }

    /// Query parameters for this search, excluding `ref` and `access_token`.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("q", encode_predicates(&self.predicates))];
        if let Some(size) = self.page_size {
            params.push(("pageSize", size.to_string()));
        }
        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        if !self.fetch.is_empty() {
            params.push(("fetch", self.fetch.join(",")));
        }
        if !self.orderings.is_empty() {
            params.push(("orderings", encode_orderings(&self.orderings)));
        }
        if let Some(after) = &self.after {
            params.push(("after", after.clone()));
        }
        params
    }
}
