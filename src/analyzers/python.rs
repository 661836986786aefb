//! Tree-sitter based extraction of Python function outlines.
//!
//! Walks the syntax tree with a scoped accumulator: every function-like node
//! (def, lambda, comprehension with a filter clause) opens a fresh decision
//! counter before its body is visited, so branches always attribute to the
//! innermost enclosing unit and never leak into an ancestor.

use crate::core::errors::{Error, Result};
use crate::core::FunctionKind;
use anyhow::Context as _;
use std::path::Path;
use tree_sitter::{Node, Parser, Tree};

/// Skeleton of one extracted unit: everything a [`crate::core::FunctionRecord`]
/// needs except coverage and score.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionOutline {
    pub qualified_name: String,
    pub line_start: usize,
    pub line_end: usize,
    pub complexity: u32,
    pub kind: FunctionKind,
    pub is_async: bool,
}

/// Extract all function outlines from one Python source file.
///
/// A file whose tree contains syntax errors fails as a whole with
/// [`Error::Parse`]; the caller decides whether that aborts anything
/// (the run coordinator never lets it).
pub fn extract_functions(content: &str, path: &Path) -> Result<Vec<FunctionOutline>> {
    let tree = parse_source(content).map_err(|e| Error::parse(path, e.to_string()))?;

    let root = tree.root_node();
    if root.has_error() {
        return Err(Error::parse(path, describe_syntax_error(root)));
    }

    let mut extractor = Extractor {
        source: content,
        scope: Vec::new(),
        outlines: Vec::new(),
    };
    extractor.visit_module_level(root);
    Ok(extractor.outlines)
}

fn parse_source(content: &str) -> anyhow::Result<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .context("failed to load Python grammar")?;
    parser
        .parse(content, None)
        .context("tree-sitter returned no tree")
}

/// Point at the first ERROR or MISSING node so the diagnostic names a line.
fn describe_syntax_error(root: Node) -> String {
    fn find_error(node: Node) -> Option<Node> {
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if let Some(found) = find_error(child) {
                return Some(found);
            }
        }
        None
    }

    match find_error(root) {
        Some(node) => format!("syntax error at line {}", node.start_position().row + 1),
        None => "syntax error".to_string(),
    }
}

#[derive(Clone, Copy, PartialEq)]
enum ScopeKind {
    Class,
    Unit,
}

struct Scope {
    name: String,
    kind: ScopeKind,
}

/// How a node participates in extraction.
enum NodeRole<'t> {
    /// Opens a new accumulation context and emits a record.
    Unit(UnitHead<'t>),
    /// Qualifies names but emits nothing itself.
    Class,
    /// Counts one decision point toward the innermost enclosing unit.
    Decision,
    Other,
}

struct UnitHead<'t> {
    name: String,
    kind: FunctionKind,
    is_async: bool,
    node: Node<'t>,
}

struct Extractor<'a> {
    source: &'a str,
    scope: Vec<Scope>,
    outlines: Vec<FunctionOutline>,
}

impl<'a> Extractor<'a> {
    /// Traversal outside any unit. Module-level branches produce no record,
    /// but definitions nested under them still must be found.
    fn visit_module_level(&mut self, node: Node) {
        match self.classify(node) {
            NodeRole::Unit(head) => self.extract_unit(head),
            NodeRole::Class => self.visit_class(node, |s, child| s.visit_module_level(child)),
            NodeRole::Decision | NodeRole::Other => {
                let mut cursor = node.walk();
                for child in node.children(&mut cursor) {
                    self.visit_module_level(child);
                }
            }
        }
    }

    /// Traversal inside a unit's body, counting decisions into `decisions`.
    fn visit_in_unit(&mut self, node: Node, decisions: &mut u32) {
        match self.classify(node) {
            NodeRole::Unit(head) => self.extract_unit(head),
            NodeRole::Class => self.visit_class(node, |s, child| s.visit_in_unit(child, decisions)),
            NodeRole::Decision => {
                *decisions += 1;
                let mut cursor = node.walk();
                for child in node.children(&mut cursor) {
                    self.visit_in_unit(child, decisions);
                }
            }
            NodeRole::Other => {
                let mut cursor = node.walk();
                for child in node.children(&mut cursor) {
                    self.visit_in_unit(child, decisions);
                }
            }
        }
    }

    fn visit_class<F>(&mut self, node: Node, mut visit_child: F)
    where
        F: FnMut(&mut Self, Node),
    {
        let name = self.node_name(node).unwrap_or_else(|| "<class>".to_string());
        self.scope.push(Scope {
            name,
            kind: ScopeKind::Class,
        });
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            visit_child(self, child);
        }
        self.scope.pop();
    }

    fn extract_unit(&mut self, head: UnitHead) {
        let qualified_name = self.qualify(&head.name);
        self.scope.push(Scope {
            name: head.name,
            kind: ScopeKind::Unit,
        });

        let mut decisions = 0;
        let mut cursor = head.node.walk();
        for child in head.node.children(&mut cursor) {
            self.visit_in_unit(child, &mut decisions);
        }
        self.scope.pop();

        self.outlines.push(FunctionOutline {
            qualified_name,
            line_start: head.node.start_position().row + 1,
            line_end: head.node.end_position().row + 1,
            complexity: 1 + decisions,
            kind: head.kind,
            is_async: head.is_async,
        });
    }

    fn classify<'t>(&self, node: Node<'t>) -> NodeRole<'t> {
        match node.kind() {
            "function_definition" => {
                let name = self
                    .node_name(node)
                    .unwrap_or_else(|| "<function>".to_string());
                let kind = if self.innermost_is_class() {
                    FunctionKind::Method
                } else {
                    FunctionKind::Function
                };
                NodeRole::Unit(UnitHead {
                    name,
                    kind,
                    is_async: has_async_keyword(node),
                    node,
                })
            }
            "lambda" => NodeRole::Unit(UnitHead {
                name: "<lambda>".to_string(),
                kind: FunctionKind::Closure,
                is_async: false,
                node,
            }),
            "list_comprehension" | "set_comprehension" | "dictionary_comprehension"
            | "generator_expression" => {
                // Only a comprehension with a filter clause forms its own
                // unit; a plain one is transparent.
                if has_filter_clause(node) {
                    NodeRole::Unit(UnitHead {
                        name: comprehension_scope_name(node.kind()).to_string(),
                        kind: FunctionKind::Comprehension,
                        is_async: false,
                        node,
                    })
                } else {
                    NodeRole::Other
                }
            }
            "class_definition" => NodeRole::Class,
            "if_statement" | "elif_clause" | "while_statement" | "for_statement"
            | "except_clause" | "boolean_operator" | "conditional_expression" | "if_clause" => {
                NodeRole::Decision
            }
            _ => NodeRole::Other,
        }
    }

    fn node_name(&self, node: Node) -> Option<String> {
        node.child_by_field_name("name")
            .and_then(|n| n.utf8_text(self.source.as_bytes()).ok())
            .map(|s| s.to_string())
    }

    fn innermost_is_class(&self) -> bool {
        matches!(
            self.scope.last(),
            Some(Scope {
                kind: ScopeKind::Class,
                ..
            })
        )
    }

    fn qualify(&self, name: &str) -> String {
        if self.scope.is_empty() {
            return name.to_string();
        }
        let mut path: Vec<&str> = self.scope.iter().map(|s| s.name.as_str()).collect();
        path.push(name);
        path.join(".")
    }
}

fn has_async_keyword(node: Node) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| c.kind() == "async");
    found
}

fn has_filter_clause(node: Node) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| c.kind() == "if_clause");
    found
}

fn comprehension_scope_name(kind: &str) -> &'static str {
    // CPython's own scope names for these constructs.
    match kind {
        "list_comprehension" => "<listcomp>",
        "set_comprehension" => "<setcomp>",
        "dictionary_comprehension" => "<dictcomp>",
        _ => "<genexpr>",
    }
}
