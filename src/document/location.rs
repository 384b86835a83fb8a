//! Locations of model nodes, kept as a shared parent chain of path segments.
//!
//! A [`Location`] renders two ways: as the bracket-form JSON path used in
//! findings (`$.components.schemas['Foo'].properties['bar']`) and as the JSON
//! pointer used to resolve local `$ref` values (`#/components/schemas/Foo/properties/bar`).

use std::fmt;
use std::sync::Arc;

/// One step from a parent node to a child node
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// A fixed OpenAPI field, rendered `.name`
    Field(String),
    /// A user-chosen map key, rendered `['name']`
    Key(String),
    /// A sequence position, rendered `[i]`
    Index(usize),
}

impl Segment {
    fn render_path(&self, out: &mut String) {
        match self {
            Segment::Field(name) => {
                out.push('.');
                out.push_str(name);
            }
            Segment::Key(name) => {
                out.push_str("['");
                out.push_str(&name.replace('\'', "\\'"));
                out.push_str("']");
            }
            Segment::Index(i) => {
                out.push('[');
                out.push_str(&i.to_string());
                out.push(']');
            }
        }
    }

    fn render_pointer(&self, out: &mut String) {
        out.push('/');
        match self {
            Segment::Field(name) | Segment::Key(name) => {
                out.push_str(&name.replace('~', "~0").replace('/', "~1"))
            }
            Segment::Index(i) => out.push_str(&i.to_string()),
        }
    }
}

struct Link {
    parent: Location,
    segment: Segment,
}

/// Address of a node, as the chain of segments leading to it from the root.
///
/// Cloning is cheap: children share their parent's chain.
#[derive(Clone, Default)]
pub struct Location(Option<Arc<Link>>);

impl Location {
    /// The document root (`$`)
    pub fn root() -> Self {
        Self(None)
    }

    pub fn child(&self, segment: Segment) -> Self {
        Self(Some(Arc::new(Link {
            parent: self.clone(),
            segment,
        })))
    }

    pub fn field(&self, name: &str) -> Self {
        self.child(Segment::Field(name.to_string()))
    }

    pub fn key(&self, name: &str) -> Self {
        self.child(Segment::Key(name.to_string()))
    }

    pub fn index(&self, i: usize) -> Self {
        self.child(Segment::Index(i))
    }

    pub fn is_root(&self) -> bool {
        self.0.is_none()
    }

    /// Segments from the root down to this node.
    pub fn segments(&self) -> Vec<Segment> {
        let mut out = Vec::new();
        let mut cursor = self;
        while let Some(link) = &cursor.0 {
            out.push(link.segment.clone());
            cursor = &link.parent;
        }
        out.reverse();
        out
    }

    /// Bracket-form JSON path
    pub fn path(&self) -> String {
        let mut out = String::from("$");
        for segment in self.segments() {
            segment.render_path(&mut out);
        }
        out
    }

    /// Local JSON pointer (`#/...`)
    pub fn pointer(&self) -> String {
        let mut out = String::from("#");
        for segment in self.segments() {
            segment.render_pointer(&mut out);
        }
        out
    }

    /// Whether `ancestor` is this location or one of its parents.
    pub fn is_within(&self, ancestor: &Location) -> bool {
        let mine = self.segments();
        let prefix = ancestor.segments();
        prefix.len() <= mine.len() && mine[..prefix.len()] == prefix[..]
    }

    /// Path of this location with the `base` prefix replaced by `replacement`.
    ///
    /// Returns `None` when `base` is not an ancestor of (or equal to) this location.
    pub fn rebased(&self, base: &Location, replacement: &Location) -> Option<Location> {
        let mine = self.segments();
        let prefix = base.segments();
        if prefix.len() > mine.len() || mine[..prefix.len()] != prefix[..] {
            return None;
        }
        let mut out = replacement.clone();
        for segment in &mine[prefix.len()..] {
            out = out.child(segment.clone());
        }
        Some(out)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Location({})", self.path())
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.segments() == other.segments()
    }
}

impl Eq for Location {}
