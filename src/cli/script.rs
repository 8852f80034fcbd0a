//! Line-oriented tree scripts.
//!
//! One command per line, words separated by whitespace, `#` starts a
//! comment:
//!
//! ```text
//! node root a b c      # create unparented nodes
//! restrict c ro        # c only accepts parents whose name starts with "ro"
//! append root a b c
//! after a c
//! children root        # -> "root: a c b"
//! print root
//! ```

use std::collections::HashMap;

use itertools::Itertools;
use termtree::Tree;
use tracing::{debug, instrument};

use crate::cli::error::{CliError, CliResult};
use crate::config::{Backend, Settings};
use crate::indexed::IndexedTree;
use crate::linked::LinkedTree;
use crate::node::NodeId;
use crate::tree_traits::NodeTree;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Node(Vec<String>),
    Restrict { name: String, prefixes: Vec<String> },
    Append { parent: String, items: Vec<String> },
    Prepend { parent: String, items: Vec<String> },
    Before { anchor: String, items: Vec<String> },
    After { anchor: String, items: Vec<String> },
    Replace { anchor: String, items: Vec<String> },
    Remove(Vec<String>),
    Delete(String),
    Children(String),
    Print(String),
}

/// Parse one script line; blank and comment-only lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Command>, String> {
    let code = line.split('#').next().unwrap_or_default();
    let mut words = code.split_whitespace().map(str::to_string);
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let args: Vec<String> = words.collect();

    let head_and_rest = |args: Vec<String>| -> Result<(String, Vec<String>), String> {
        let mut args = args.into_iter();
        let head = args
            .next()
            .ok_or_else(|| format!("{}: missing target node", verb))?;
        Ok((head, args.collect()))
    };
    let exactly_one = |args: Vec<String>| -> Result<String, String> {
        match <[String; 1]>::try_from(args) {
            Ok([name]) => Ok(name),
            Err(args) => Err(format!("{}: expected one node, got {}", verb, args.len())),
        }
    };

    let command = match verb.as_str() {
        "node" if args.is_empty() => return Err("node: missing node name".into()),
        "node" => Command::Node(args),
        "restrict" => {
            let (name, prefixes) = head_and_rest(args)?;
            if prefixes.is_empty() {
                return Err("restrict: missing parent prefix".into());
            }
            Command::Restrict { name, prefixes }
        }
        "append" => {
            let (parent, items) = head_and_rest(args)?;
            Command::Append { parent, items }
        }
        "prepend" => {
            let (parent, items) = head_and_rest(args)?;
            Command::Prepend { parent, items }
        }
        "before" => {
            let (anchor, items) = head_and_rest(args)?;
            Command::Before { anchor, items }
        }
        "after" => {
            let (anchor, items) = head_and_rest(args)?;
            Command::After { anchor, items }
        }
        "replace" => {
            let (anchor, items) = head_and_rest(args)?;
            Command::Replace { anchor, items }
        }
        "remove" if args.is_empty() => return Err("remove: missing node name".into()),
        "remove" => Command::Remove(args),
        "delete" => Command::Delete(exactly_one(args)?),
        "children" => Command::Children(exactly_one(args)?),
        "print" => Command::Print(exactly_one(args)?),
        other => return Err(format!("unknown command: {}", other)),
    };
    Ok(Some(command))
}

/// Executes commands against one tree, addressing nodes by name.
pub struct ScriptRunner<B> {
    tree: B,
    names: HashMap<String, NodeId>,
}

impl<B: NodeTree<Data = String>> ScriptRunner<B> {
    pub fn new(tree: B) -> Self {
        Self {
            tree,
            names: HashMap::new(),
        }
    }

    pub fn tree(&self) -> &B {
        &self.tree
    }

    /// Run every line of `source`, collecting the output of `children` and
    /// `print`. Stops at the first failing line.
    pub fn run(&mut self, source: &str) -> CliResult<String> {
        let mut output = Vec::new();
        for (index, line) in source.lines().enumerate() {
            let at_line = |message: String| CliError::script(index + 1, message);
            let Some(command) = parse_line(line).map_err(at_line)? else {
                continue;
            };
            if let Some(text) = self.execute(&command).map_err(at_line)? {
                output.push(text);
            }
        }
        Ok(output.join("\n"))
    }

    #[instrument(level = "debug", skip(self))]
    pub fn execute(&mut self, command: &Command) -> Result<Option<String>, String> {
        match command {
            Command::Node(names) => {
                for name in names {
                    if self.names.contains_key(name) {
                        return Err(format!("node {} already exists", name));
                    }
                    let id = self.tree.insert(name.clone());
                    self.names.insert(name.clone(), id);
                }
            }
            Command::Restrict { name, prefixes } => {
                let id = self.lookup(name)?;
                let prefixes = prefixes.clone();
                let allowed = move |_: &String, parent: &String| -> Result<(), String> {
                    if prefixes.iter().any(|prefix| parent.starts_with(prefix.as_str())) {
                        Ok(())
                    } else {
                        Err(format!(
                            "parent {} does not start with {}",
                            parent,
                            prefixes.iter().join(" or ")
                        ))
                    }
                };
                self.tree.set_constraint(id, allowed).map_err(|e| e.to_string())?;
            }
            Command::Append { parent, items } => {
                let (parent, items) = (self.lookup(parent)?, self.lookup_all(items)?);
                self.tree.append(parent, &items).map_err(|e| e.to_string())?;
            }
            Command::Prepend { parent, items } => {
                let (parent, items) = (self.lookup(parent)?, self.lookup_all(items)?);
                self.tree.prepend(parent, &items).map_err(|e| e.to_string())?;
            }
            Command::Before { anchor, items } => {
                let (anchor, items) = (self.lookup(anchor)?, self.lookup_all(items)?);
                self.tree.before(anchor, &items).map_err(|e| e.to_string())?;
            }
            Command::After { anchor, items } => {
                let (anchor, items) = (self.lookup(anchor)?, self.lookup_all(items)?);
                self.tree.after(anchor, &items).map_err(|e| e.to_string())?;
            }
            Command::Replace { anchor, items } => {
                let (anchor, items) = (self.lookup(anchor)?, self.lookup_all(items)?);
                self.tree.replace_with(anchor, &items).map_err(|e| e.to_string())?;
            }
            Command::Remove(names) => {
                for id in self.lookup_all(names)? {
                    self.tree.remove(id).map_err(|e| e.to_string())?;
                }
            }
            Command::Delete(name) => {
                let id = self.lookup(name)?;
                self.tree.delete(id).map_err(|e| e.to_string())?;
                let tree = &self.tree;
                self.names.retain(|_, id| tree.contains(*id));
                debug!(remaining = self.names.len(), "forgot deleted names");
            }
            Command::Children(name) => {
                let id = self.lookup(name)?;
                let listed = self
                    .tree
                    .children(id)
                    .values()
                    .map(|child| self.label(child))
                    .join(" ");
                return Ok(Some(format!("{}: {}", name, listed).trim_end().to_string()));
            }
            Command::Print(name) => {
                let id = self.lookup(name)?;
                return Ok(Some(self.render(id).to_string().trim_end().to_string()));
            }
        }
        Ok(None)
    }

    fn lookup(&self, name: &str) -> Result<NodeId, String> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| format!("unknown node: {}", name))
    }

    fn lookup_all(&self, names: &[String]) -> Result<Vec<NodeId>, String> {
        names.iter().map(|name| self.lookup(name)).collect()
    }

    fn label(&self, id: NodeId) -> String {
        self.tree.get(id).cloned().unwrap_or_default()
    }

    /// Builds bottom-up over the reversed pre-order, so every child's tree
    /// is finished before its parent asks for it.
    fn render(&self, id: NodeId) -> Tree<String> {
        let order: Vec<NodeId> = self.tree.descendants(id).collect();
        let mut built: HashMap<NodeId, Tree<String>> = HashMap::with_capacity(order.len());
        for &node in order.iter().rev() {
            let mut tree = Tree::new(self.label(node));
            tree.leaves = self
                .tree
                .children(node)
                .values()
                .filter_map(|child| built.remove(&child))
                .collect();
            built.insert(node, tree);
        }
        built
            .remove(&id)
            .unwrap_or_else(|| Tree::new(self.label(id)))
    }
}

/// Run `source` on a fresh tree of the configured backend.
#[instrument(level = "debug", skip(source))]
pub fn run_script(source: &str, settings: &Settings) -> CliResult<String> {
    match settings.backend {
        Backend::Linked => ScriptRunner::new(LinkedTree::with_settings(settings)).run(source),
        Backend::Indexed => ScriptRunner::new(IndexedTree::with_settings(settings)).run(source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", None)]
    #[case("   # only a comment", None)]
    #[case("node a b", Some(Command::Node(vec!["a".into(), "b".into()])))]
    #[case("append p x # trailing", Some(Command::Append { parent: "p".into(), items: vec!["x".into()] }))]
    #[case("print p", Some(Command::Print("p".into())))]
    fn test_parse_line(#[case] line: &str, #[case] expected: Option<Command>) {
        assert_eq!(parse_line(line).unwrap(), expected);
    }

    #[rstest]
    #[case("frobnicate a", "unknown command: frobnicate")]
    #[case("node", "node: missing node name")]
    #[case("append", "append: missing target node")]
    #[case("print a b", "print: expected one node, got 2")]
    #[case("restrict a", "restrict: missing parent prefix")]
    fn test_parse_line_rejects(#[case] line: &str, #[case] message: &str) {
        assert_eq!(parse_line(line).unwrap_err(), message);
    }

    #[test]
    fn test_error_reports_line_number() {
        let err = run_script("node p\n\nappend p ghost\n", &Settings::default()).unwrap_err();
        assert!(matches!(err, CliError::Script { line: 3, .. }));
        assert_eq!(err.to_string(), "line 3: unknown node: ghost");
    }

    #[test]
    fn test_delete_forgets_subtree_names() {
        let mut runner = ScriptRunner::new(LinkedTree::new());
        runner.run("node p a b\nappend p a\nappend a b\ndelete a").unwrap();
        assert_eq!(runner.lookup("b").unwrap_err(), "unknown node: b");
        assert!(runner.lookup("p").is_ok());
        assert_eq!(runner.tree().len(), 1);
    }

    #[test]
    fn test_print_renders_deep_chain() {
        const DEPTH: usize = 1_000;
        let names: Vec<String> = (0..DEPTH).map(|i| format!("n{}", i)).collect();
        let mut script = format!("node {}\n", names.join(" "));
        for pair in names.windows(2) {
            script.push_str(&format!("append {} {}\n", pair[0], pair[1]));
        }
        script.push_str("print n0");

        let rendered = run_script(&script, &Settings::default()).unwrap();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), DEPTH);
        assert_eq!(lines[0], "n0");
        assert!(lines[DEPTH - 1].ends_with("n999"));
    }

    #[test]
    fn test_print_keeps_sibling_order() {
        let script = "node r a b c d\nappend r a b c\nappend b d\nprint r";
        let rendered = run_script(script, &Settings::default()).unwrap();
        let labels: Vec<&str> = rendered
            .lines()
            .map(|line| line.trim_start_matches(|c: char| !c.is_alphanumeric()))
            .collect();
        assert_eq!(labels, ["r", "a", "b", "d", "c"]);
    }
}
