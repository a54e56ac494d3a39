/// Normalized resource path
///
/// Paths are the identity of resources: two spellings of the same file must
/// map to the same cache entry. Normalization:
/// - `\` becomes `/`
/// - repeated separators collapse to one
/// - a leading separator is stripped (paths are relative to the file system root)

use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourcePath(String);

impl ResourcePath {
    pub fn new(path: &str) -> Self {
        let mut normalized = String::with_capacity(path.len());
        for c in path.chars() {
            let c = if c == '\\' { '/' } else { c };
            if c == '/' && (normalized.is_empty() || normalized.ends_with('/')) {
                continue;
            }
            normalized.push(c);
        }
        Self(normalized)
    }

    /// Resolve `source` as written inside the document at `self`
    ///
    /// A source starting with a separator is rooted; anything else is
    /// relative to the directory of `self`.
    pub fn resolve(&self, source: &str) -> Self {
        if source.starts_with('/') || source.starts_with('\\') {
            Self::new(source)
        } else {
            Self::new(&format!("{}{}", self.dir(), source))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Directory part including the trailing `/`, or `""`
    pub fn dir(&self) -> &str {
        match self.0.rfind('/') {
            Some(pos) => &self.0[..=pos],
            None => "",
        }
    }

    /// Extension without the dot
    pub fn extension(&self) -> Option<&str> {
        let file = &self.0[self.dir().len()..];
        file.rfind('.').map(|pos| &file[pos + 1..])
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourcePath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

#[cfg(test)]
#[path = "path_tests.rs"]
mod tests;
