//! Entry - one stored credential record

use serde::Serialize;

/// What an entry represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// A real credential
    Secret,
    /// Registers a category name; every field except `category` is empty
    CategoryMarker,
}

/// A stored credential
///
/// Category markers use the same type so the on-disk record stays identical.
/// `name` is the lookup key for edit/delete/upsert, but nothing here stops
/// two entries from sharing one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub name: String,
    /// The password, either plain or XOR-transformed
    pub secret: String,
    pub category: String,
    pub site: String,
    pub login: String,
}

impl Entry {
    pub fn new(
        name: impl Into<String>,
        secret: impl Into<String>,
        category: impl Into<String>,
        site: impl Into<String>,
        login: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            secret: secret.into(),
            category: category.into(),
            site: site.into(),
            login: login.into(),
        }
    }

    /// An entry that only registers `category`
    pub fn category_marker(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            ..Self::default()
        }
    }

    pub fn kind(&self) -> EntryKind {
        if self.name.is_empty()
            && self.secret.is_empty()
            && self.site.is_empty()
            && self.login.is_empty()
            && !self.category.is_empty()
        {
            EntryKind::CategoryMarker
        } else {
            EntryKind::Secret
        }
    }

    /// The five fields in on-disk order, labelled
    pub fn fields(&self) -> [(&'static str, &str); 5] {
        [
            ("name", self.name.as_str()),
            ("secret", self.secret.as_str()),
            ("category", self.category.as_str()),
            ("site", self.site.as_str()),
            ("login", self.login.as_str()),
        ]
    }

    /// Case-sensitive substring match against any field
    pub fn matches(&self, query: &str) -> bool {
        self.fields().iter().any(|(_, value)| value.contains(query))
    }
}
