//! Directory-tree visualization.
//!
//! Directories sort before files, both case-insensitive alphabetical.
//! Single-child directory chains collapse into combined `a/b/c` segments.

use std::fmt::Write;

use crate::descriptor::FileDescriptor;

#[derive(Debug, Clone, Copy, Default)]
pub struct TreeOptions {
    /// Append `(size, tokens)` annotations to file lines.
    pub annotate: bool,
    /// Truncate below this depth, rendering `...` instead.
    pub max_depth: Option<usize>,
}

#[derive(Default)]
struct Node {
    dirs: Vec<(String, Node)>,
    files: Vec<(String, u64, usize)>,
}

impl Node {
    fn child(&mut self, name: &str) -> &mut Node {
        if let Some(idx) = self.dirs.iter().position(|(n, _)| n == name) {
            return &mut self.dirs[idx].1;
        }
        self.dirs.push((name.to_string(), Node::default()));
        &mut self.dirs.last_mut().unwrap().1
    }

    fn insert(&mut self, path: &str, size: u64, tokens: usize) {
        match path.split_once('/') {
            Some((dir, rest)) => self.child(dir).insert(rest, size, tokens),
            None => self.files.push((path.to_string(), size, tokens)),
        }
    }

    /// Collapse single-child directory chains into combined names.
    fn collapse(&mut self) {
        for (name, node) in &mut self.dirs {
            while node.files.is_empty() && node.dirs.len() == 1 {
                let (child_name, child_node) = node.dirs.pop().unwrap();
                name.push('/');
                name.push_str(&child_name);
                *node = child_node;
            }
            node.collapse();
        }
    }

    fn sort(&mut self) {
        self.dirs.sort_by(|(a, _), (b, _)| {
            a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
        });
        self.files.sort_by(|(a, _, _), (b, _, _)| {
            a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
        });
        for (_, node) in &mut self.dirs {
            node.sort();
        }
    }

    fn render(&self, out: &mut String, prefix: &str, depth: usize, opts: &TreeOptions) {
        let total = self.dirs.len() + self.files.len();

        if opts.max_depth.is_some_and(|max| depth >= max) && total > 0 {
            let _ = writeln!(out, "{prefix}├── ...");
            return;
        }

        let mut index = 0;
        for (name, node) in &self.dirs {
            index += 1;
            let last = index == total;
            let connector = if last { "└── " } else { "├── " };
            let _ = writeln!(out, "{prefix}{connector}{name}/");
            let child_prefix = format!("{prefix}{}", if last { "   " } else { "│  " });
            node.render(out, &child_prefix, depth + 1, opts);
        }
        for (name, size, tokens) in &self.files {
            index += 1;
            let connector = if index == total { "└── " } else { "├── " };
            if opts.annotate {
                let _ = writeln!(out, "{prefix}{connector}{name} ({size} B, {tokens} tokens)");
            } else {
                let _ = writeln!(out, "{prefix}{connector}{name}");
            }
        }
    }
}

/// Render the tree for the included descriptors.
#[must_use]
pub fn render_tree(files: &[FileDescriptor], opts: &TreeOptions) -> String {
    let mut root = Node::default();
    for fd in files {
        root.insert(&fd.path, fd.size, fd.token_count);
    }
    root.collapse();
    root.sort();

    let mut out = String::new();
    root.render(&mut out, "", 0, opts);
    out
}

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tests;
