//! Recursive subtree export and import.
//!
//! Export walks a container's fields, then its child containers, into a
//! portable tree ([`PlainTree`] or [`TypedTree`]); import walks a tree back
//! into the store, creating containers as it descends. Fields and
//! subcontainers share the output map's flat namespace; a subcontainer
//! entry written after a same-named field entry wins, and on the way back
//! in the node shape decides: nested trees are always subcontainers,
//! leaves are always fields.
//!
//! Neither direction is atomic. An export races concurrent writers entry
//! by entry (a field that vanishes between being listed and being read is
//! skipped); a failed import leaves every entry already written.
//!
//! The round-trip contract holds for the typed form: exporting a subtree
//! typed and importing it elsewhere reproduces field names, values, tags,
//! and container names exactly, absent concurrent writers.

use tracing::debug;

use hivetree_types::{PlainNode, PlainTree, TypedNode, TypedTree};

use crate::container::Container;
use crate::error::KeyResult;

/// Export a subtree untyped: each field becomes its bare decoded value and
/// the store tag is dropped (re-inferred on import).
pub fn export_tree(container: &Container<'_>) -> KeyResult<PlainTree> {
    let mut out = PlainTree::new();
    for name in container.fields()? {
        let name = name?;
        if let Some(value) = container.get(&name)? {
            out.insert(name, PlainNode::Field(value));
        }
    }
    let children: Vec<String> = container.containers()?.collect::<KeyResult<_>>()?;
    for name in children {
        let subtree = export_tree(&container.navigate(&name))?;
        out.insert(name, PlainNode::Subtree(subtree));
    }
    Ok(out)
}

/// Export a subtree typed: each field becomes a `(value, tag)` pair, so the
/// exact store type survives the round trip.
pub fn export_tree_typed(container: &Container<'_>) -> KeyResult<TypedTree> {
    let mut out = TypedTree::new();
    for name in container.fields()? {
        let name = name?;
        if let Some((value, tag)) = container.field(&name).get_with_tag()? {
            out.insert(name, TypedNode::Field(value, tag));
        }
    }
    let children: Vec<String> = container.containers()?.collect::<KeyResult<_>>()?;
    for name in children {
        let subtree = export_tree_typed(&container.navigate(&name))?;
        out.insert(name, TypedNode::Subtree(subtree));
    }
    Ok(out)
}

/// Import an untyped tree under `container`, creating it if absent.
///
/// Leaf values are re-classified on write, exactly as a direct
/// [`Field::set`](crate::Field::set) would classify them.
pub fn import_tree(container: &Container<'_>, tree: &PlainTree) -> KeyResult<()> {
    debug!(container = %container, entries = tree.len(), "importing subtree");
    container.create()?;
    for (name, node) in tree {
        match node {
            PlainNode::Subtree(subtree) => import_tree(&container.navigate(name), subtree)?,
            PlainNode::Field(value) => container.set(name.as_str(), value.clone())?,
        }
    }
    Ok(())
}

/// Import a typed tree under `container`, creating it if absent. Leaf
/// values are written under their carried tags.
pub fn import_tree_typed(container: &Container<'_>, tree: &TypedTree) -> KeyResult<()> {
    debug!(container = %container, entries = tree.len(), "importing typed subtree");
    container.create()?;
    for (name, node) in tree {
        match node {
            TypedNode::Subtree(subtree) => {
                import_tree_typed(&container.navigate(name), subtree)?
            }
            TypedNode::Field(value, tag) => {
                container.set_with_tag(name.as_str(), value.clone(), *tag)?
            }
        }
    }
    Ok(())
}
