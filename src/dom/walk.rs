//! Depth-first, pre-order traversal over any tree that can answer three
//! questions: first child, next sibling, parent.
//!
//! ```text
//!        root (depth 0)
//!       /    \
//!      a      d          visit order: root, a, b, c, d
//!     / \
//!    b   c
//! ```
//!
//! The walk never leaves the subtree it started in: after the last
//! descendant of `root` it stops instead of continuing with `root`'s
//! siblings.

use markup5ever_rcdom::Handle;

/// Minimal navigation a tree must offer to be walked.
pub trait TreeCursor: Clone {
    fn first_child(&self) -> Option<Self>;
    fn next_sibling(&self) -> Option<Self>;
    fn parent(&self) -> Option<Self>;
}

/// Position in an rcdom tree.
///
/// Remembers every ancestor together with the child index taken below it,
/// so a sibling step is one index lookup instead of a search through the
/// parent's children. The path only reaches back to the node the cursor
/// was created at.
#[derive(Clone)]
pub struct DomCursor {
    node: Handle,
    path: Vec<(Handle, usize)>,
}

impl DomCursor {
    pub fn new(root: &Handle) -> Self {
        Self {
            node: root.clone(),
            path: Vec::new(),
        }
    }

    pub fn node(&self) -> &Handle {
        &self.node
    }

    pub fn into_node(self) -> Handle {
        self.node
    }
}

impl TreeCursor for DomCursor {
    fn first_child(&self) -> Option<Self> {
        let child = self.node.children.borrow().first().cloned()?;
        let mut path = self.path.clone();
        path.push((self.node.clone(), 0));
        Some(Self { node: child, path })
    }

    fn next_sibling(&self) -> Option<Self> {
        let (parent, index) = self.path.last()?;
        let sibling = parent.children.borrow().get(index + 1).cloned()?;
        let mut path = self.path.clone();
        if let Some(last) = path.last_mut() {
            last.1 += 1;
        }
        Some(Self {
            node: sibling,
            path,
        })
    }

    fn parent(&self) -> Option<Self> {
        let mut path = self.path.clone();
        let (parent, _) = path.pop()?;
        Some(Self { node: parent, path })
    }
}

/// Visit `root` and its descendants in document order, passing each node
/// with its depth below `root`. Stops at the first node for which `pred`
/// returns `true` and returns it.
pub fn find_if<N: TreeCursor>(root: &N, mut pred: impl FnMut(&N, usize) -> bool) -> Option<N> {
    let mut node = root.clone();
    let mut depth = 0usize;
    loop {
        if pred(&node, depth) {
            return Some(node);
        }
        if let Some(child) = node.first_child() {
            node = child;
            depth += 1;
            continue;
        }
        loop {
            if depth == 0 {
                return None;
            }
            if let Some(sibling) = node.next_sibling() {
                node = sibling;
                break;
            }
            node = node.parent()?;
            depth -= 1;
        }
    }
}

/// Visit every node under (and including) `root` in document order.
pub fn for_each<N: TreeCursor>(root: &N, mut visit: impl FnMut(&N, usize)) {
    find_if(root, |node, depth| {
        visit(node, depth);
        false
    });
}

/// [`find_if`] over an rcdom subtree.
pub fn find_node(root: &Handle, mut pred: impl FnMut(&Handle, usize) -> bool) -> Option<Handle> {
    find_if(&DomCursor::new(root), |cursor, depth| pred(cursor.node(), depth))
        .map(DomCursor::into_node)
}

/// [`for_each`] over an rcdom subtree.
pub fn for_each_node(root: &Handle, mut visit: impl FnMut(&Handle, usize)) {
    for_each(&DomCursor::new(root), |cursor, depth| visit(cursor.node(), depth));
}
