use super::tree::{ActionChild, ActionTree};
use std::fmt;

/// Renders an action tree with box-drawing guides, for logs and the CLI.
pub struct DisplayTree<'a> {
    pub tree: &'a ActionTree,
}

impl<'a> DisplayTree<'a> {
    pub fn new(tree: &'a ActionTree) -> Self {
        Self { tree }
    }

    fn fmt_as_tree(
        &self,
        child: &ActionChild,
        f: &mut fmt::Formatter<'_>,
        prefix: &str,
        is_last: bool,
    ) -> fmt::Result {
        let node_marker = if is_last { "└── " } else { "├── " };
        writeln!(f, "{}{}[{}] {}", prefix, node_marker, child.branch, child.element)?;

        let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
        self.fmt_children(child.children.as_deref(), f, &child_prefix)
    }

    fn fmt_children(
        &self,
        children: Option<&[ActionChild]>,
        f: &mut fmt::Formatter<'_>,
        prefix: &str,
    ) -> fmt::Result {
        let children = children.unwrap_or_default();
        for (i, child) in children.iter().enumerate() {
            self.fmt_as_tree(child, f, prefix, i + 1 == children.len())?;
        }
        Ok(())
    }
}

impl<'a> fmt::Display for DisplayTree<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = &self.tree.header;
        writeln!(f, "Header: {} (code {})", header.elements_key, header.elements_code)?;
        self.fmt_children(self.tree.children.as_deref(), f, "")
    }
}
