//! Location of a node inside the input tree.

use std::fmt;

/// One step from a node to one of its children.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// Path from the root of the input to a node.
///
/// Displayed as `$` for the root, `.name` for plain keys, `['some key']`
/// for other keys and `[2]` for sequence indices: `$.items[2].name`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path(Vec<Segment>);

impl Path {
    pub fn root() -> Self {
        Self::default()
    }

    /// Path of the child under `key`.
    pub fn key(&self, key: impl Into<String>) -> Self {
        self.child(Segment::Key(key.into()))
    }

    /// Path of the child at `index`.
    pub fn index(&self, index: usize) -> Self {
        self.child(Segment::Index(index))
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    fn child(&self, segment: Segment) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        Self(segments)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for segment in &self.0 {
            match segment {
                Segment::Index(index) => write!(f, "[{index}]")?,
                Segment::Key(key) if is_identifier(key) => write!(f, ".{key}")?,
                Segment::Key(key) => write!(f, "['{}']", key.replace('\'', "\\'"))?,
            }
        }
        Ok(())
    }
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    chars
        .next()
        .is_some_and(|first| first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let path = Path::root().key("items").index(2).key("name");
        assert_eq!(path.to_string(), "$.items[2].name");
        assert_eq!(Path::root().to_string(), "$");
        assert_eq!(
            Path::root().key("first name").key("it's").to_string(),
            "$['first name']['it\\'s']"
        );
        assert_eq!(Path::root().key("0").to_string(), "$['0']");
    }

    #[test]
    fn test_child_does_not_modify_parent() {
        let parent = Path::root().key("a");
        let child = parent.index(0);

        assert_eq!(parent.segments().len(), 1);
        assert_eq!(child.segments().len(), 2);
        assert!(!parent.is_root());
    }
}
