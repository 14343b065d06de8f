//! Document contributors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use adpt_shared::{AdptError, Result};

/// One contributor of a document.
///
/// Immutable once built; equality compares every field and is what the
/// duplicate-author checks rely on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "AuthorRecord", into = "AuthorRecord")]
pub struct Author {
    name: String,
    surname: String,
    middle_name: Option<String>,
    email: Option<String>,
}

impl Author {
    /// Build an author from a first name and a surname (both required).
    pub fn new(name: impl AsRef<str>, surname: impl AsRef<str>) -> Result<Self> {
        let name = name.as_ref().trim();
        let surname = surname.as_ref().trim();

        if name.is_empty() {
            return Err(AdptError::invalid_author("the name can't be empty"));
        }
        if surname.is_empty() {
            return Err(AdptError::invalid_author(format!(
                "the surname of '{name}' can't be empty"
            )));
        }

        Ok(Self {
            name: name.to_string(),
            surname: surname.to_string(),
            middle_name: None,
            email: None,
        })
    }

    /// Set the middle name. Blank values clear it.
    pub fn with_middle_name(mut self, middle_name: impl AsRef<str>) -> Self {
        self.middle_name = non_blank(middle_name.as_ref());
        self
    }

    /// Set the email address. Blank values clear it.
    pub fn with_email(mut self, email: impl AsRef<str>) -> Self {
        self.email = non_blank(email.as_ref());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn surname(&self) -> &str {
        &self.surname
    }

    pub fn middle_name(&self) -> Option<&str> {
        self.middle_name.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Renders as `first [middle] last [<email>]`, the byline form.
impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(middle) = &self.middle_name {
            write!(f, " {middle}")?;
        }
        write!(f, " {}", self.surname)?;
        if let Some(email) = &self.email {
            write!(f, " <{email}>")?;
        }
        Ok(())
    }
}

/// Parses the byline form back: `"Jane Q. Doe <jane@example.org>"`.
///
/// The first word is the name, the last word the surname, anything in
/// between the middle name. The email part is optional.
impl FromStr for Author {
    type Err = AdptError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();

        let (names, email) = match (s.rfind('<'), s.ends_with('>')) {
            (Some(start), true) => {
                let email = s[start + 1..s.len() - 1].trim();
                if email.is_empty()
                    || email.contains(char::is_whitespace)
                    || email.contains(['<', '>'])
                {
                    return Err(AdptError::invalid_author(format!(
                        "'{s}' has a malformed email"
                    )));
                }
                (&s[..start], Some(email))
            }
            (None, false) => (s, None),
            _ => {
                return Err(AdptError::invalid_author(format!(
                    "'{s}' has unbalanced angle brackets"
                )));
            }
        };

        if names.contains(['<', '>']) {
            return Err(AdptError::invalid_author(format!(
                "'{s}' has unbalanced angle brackets"
            )));
        }

        let words: Vec<&str> = names.split_whitespace().collect();
        let [first, middle @ .., last] = words.as_slice() else {
            return Err(AdptError::invalid_author(format!(
                "'{s}' needs at least a name and a surname"
            )));
        };

        let mut author = Author::new(first, last)?.with_middle_name(middle.join(" "));
        if let Some(email) = email {
            author = author.with_email(email);
        }
        Ok(author)
    }
}

/// Wire shape inside `document.json`.
#[derive(Serialize, Deserialize)]
struct AuthorRecord {
    name: String,
    surname: String,
    #[serde(default, rename = "middlename", skip_serializing_if = "Option::is_none")]
    middle_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
}

impl TryFrom<AuthorRecord> for Author {
    type Error = AdptError;

    fn try_from(record: AuthorRecord) -> Result<Self> {
        let mut author = Author::new(&record.name, &record.surname)?;
        if let Some(middle) = record.middle_name {
            author = author.with_middle_name(middle);
        }
        if let Some(email) = record.email {
            author = author.with_email(email);
        }
        Ok(author)
    }
}

impl From<Author> for AuthorRecord {
    fn from(author: Author) -> Self {
        Self {
            name: author.name,
            surname: author.surname,
            middle_name: author.middle_name,
            email: author.email,
        }
    }
}
