//! # Path Locator
//!
//! Turns a model location into the JSON path reported on a finding, plus every
//! equivalent path by which the same node is reachable through `$ref`.
//!
//! A node nested inside a referenced object has one alternate per referrer: the
//! referring slot's path with the remainder of the node's path appended. Alternates
//! are themselves located again, so a chain of references produces every path along
//! it. A chain never passes through the same target twice, references that sit
//! inside their own target are skipped, and recursion stops at
//! [`MAX_REFERENCE_HOPS`]. At most [`MAX_ALTERNATES`] paths are kept.

use std::collections::BTreeSet;

use crate::document::{Document, Location, NodeRef, MAX_REFERENCE_HOPS};

/// Ceiling on the number of alternate paths collected for one node.
pub const MAX_ALTERNATES: usize = 64;

/// Result of locating a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located {
    /// Canonical path
    pub path: String,
    /// The canonical path first, followed by every alternate in sorted order
    pub paths: Vec<String>,
}

impl Located {
    /// Alternates worth reporting: only when more than one path exists.
    pub fn alternates(&self) -> Option<Vec<String>> {
        (self.paths.len() > 1).then(|| self.paths.clone())
    }
}

/// Locate `location` in `document`.
pub fn locate(document: &Document, location: &Location) -> Located {
    let primary = location.path();
    let mut alternates = BTreeSet::new();
    collect_alternates(document, location, &mut Vec::new(), &mut alternates);
    alternates.remove(&primary);

    let mut paths = Vec::with_capacity(alternates.len() + 1);
    paths.push(primary.clone());
    paths.extend(alternates);
    Located {
        path: primary,
        paths,
    }
}

/// Locate `location` with a trailing field (e.g. `.minLength`) appended to every path.
pub fn locate_field(document: &Document, location: &Location, field: &str) -> Located {
    locate(document, &location.field(field))
}

fn collect_alternates(
    document: &Document,
    location: &Location,
    chain: &mut Vec<NodeRef>,
    out: &mut BTreeSet<String>,
) {
    if chain.len() >= MAX_REFERENCE_HOPS {
        return;
    }
    let index = document.reference_index();
    let mut prefixes = vec![Location::root()];
    for segment in location.segments() {
        let next = prefixes[prefixes.len() - 1].child(segment);
        prefixes.push(next);
    }

    // longest prefix first: the node itself, then each enclosing object
    while let Some(prefix) = prefixes.pop() {
        let Some(target) = document.object_at(&prefix) else {
            continue;
        };
        if chain.contains(&target) {
            continue;
        }
        for reference in index.referrers(target) {
            if out.len() >= MAX_ALTERNATES {
                return;
            }
            // a self reference adds no new way in
            if reference.origin.location.is_within(&prefix) {
                continue;
            }
            let Some(alias) = location.rebased(&prefix, &reference.origin.location) else {
                continue;
            };
            if out.insert(alias.path()) {
                chain.push(target);
                collect_alternates(document, &alias, chain, out);
                chain.pop();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    const SHARED: &str = r#"openapi: 3.0.3
paths:
  /pets:
    post:
      requestBody:
        content:
          application/json:
            schema:
              $ref: '#/components/schemas/Pet'
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Pet'
components:
  schemas:
    Pet:
      type: object
      properties:
        name:
          type: string
"#;

    #[test]
    fn test_unreferenced_node_has_single_path() {
        let doc = Document::parse(SHARED).unwrap();
        let located = locate(&doc, &Location::root().field("info"));
        assert_eq!(located.path, "$.info");
        assert_eq!(located.paths, vec!["$.info"]);
        assert!(located.alternates().is_none());
    }

    #[test]
    fn test_referenced_property_enumerates_all_paths() {
        let doc = Document::parse(SHARED).unwrap();
        let name = doc
            .schemas()
            .iter()
            .find(|s| s.name.as_deref() == Some("name"))
            .unwrap();
        let located = locate(&doc, &name.origin.location);
        assert_eq!(
            located.path,
            "$.components.schemas['Pet'].properties['name']"
        );
        assert_eq!(
            located.paths,
            vec![
                "$.components.schemas['Pet'].properties['name']",
                "$.paths['/pets'].post.requestBody.content['application/json'].schema.properties['name']",
                "$.paths['/pets'].post.responses['200'].content['application/json'].schema.properties['name']",
            ]
        );
        let located = locate_field(&doc, &name.origin.location, "type");
        assert!(located.paths.iter().all(|p| p.ends_with(".type")));
    }

    #[test]
    fn test_recursive_schema_paths_stay_bounded() {
        let doc = Document::parse(
            r#"openapi: 3.0.3
paths:
  /trees:
    get:
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Node'
    post:
      requestBody:
        content:
          application/json:
            schema:
              $ref: '#/components/schemas/Node'
      responses:
        '204':
          description: ok
components:
  schemas:
    Node:
      type: object
      properties:
        created_at:
          type: string
        left:
          $ref: '#/components/schemas/Node'
        right:
          $ref: '#/components/schemas/Node'
"#,
        )
        .unwrap();
        let created_at = doc
            .schemas()
            .iter()
            .find(|s| s.name.as_deref() == Some("created_at"))
            .unwrap();
        let located = locate(&doc, &created_at.origin.location);
        assert_eq!(
            located.paths,
            vec![
                "$.components.schemas['Node'].properties['created_at']",
                "$.paths['/trees'].get.responses['200'].content['application/json'].schema.properties['created_at']",
                "$.paths['/trees'].post.requestBody.content['application/json'].schema.properties['created_at']",
            ]
        );
    }

    #[test]
    fn test_mutually_recursive_schemas_terminate() {
        let doc = Document::parse(
            r#"openapi: 3.0.3
paths: {}
components:
  schemas:
    Folder:
      type: object
      properties:
        title:
          type: string
        files:
          $ref: '#/components/schemas/File'
    File:
      type: object
      properties:
        parent:
          $ref: '#/components/schemas/Folder'
"#,
        )
        .unwrap();
        let title = doc
            .schemas()
            .iter()
            .find(|s| s.name.as_deref() == Some("title"))
            .unwrap();
        let located = locate(&doc, &title.origin.location);
        assert_eq!(located.paths[0], "$.components.schemas['Folder'].properties['title']");
        assert!(located.paths.len() <= MAX_ALTERNATES + 1);
        assert!(located
            .paths
            .contains(&"$.components.schemas['File'].properties['parent'].properties['title']".to_string()));
    }
}
