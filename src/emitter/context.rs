use super::{Emitter, Rendered, precedence};
use crate::error::EmitError;
use crate::graph::{Graph, Node, NodeId, SlotBinding};
use crate::registry::{FieldSpec, NodeType, Placement, SlotSpec, Tier, tier};
use ahash::AHashSet;
use itertools::Itertools;

const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while", "abstract", "become", "box", "do", "final", "gen",
    "macro", "override", "priv", "try", "typeof", "unsized", "virtual", "yield",
];

/// True for `[A-Za-z_][A-Za-z0-9_]*` names that are not Rust keywords.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return false;
    }
    if name == "_" {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_') && !RUST_KEYWORDS.contains(&name)
}

/// The state threaded through one top-level emission.
///
/// Tracks the nodes currently being rendered so a node reached again through
/// its own subtree fails instead of recursing forever.
pub struct RenderContext<'a> {
    emitter: &'a Emitter,
    graph: &'a Graph,
    stack: AHashSet<NodeId>,
}

impl<'a> RenderContext<'a> {
    pub(super) fn new(emitter: &'a Emitter, graph: &'a Graph) -> Self {
        Self {
            emitter,
            graph,
            stack: AHashSet::new(),
        }
    }

    pub fn graph(&self) -> &'a Graph {
        self.graph
    }

    /// Dispatches a node to its renderer after the checks every block shares.
    pub fn emit_node(&mut self, node: &Node) -> Result<Rendered, EmitError> {
        if self.stack.contains(node.id()) {
            return Err(EmitError::CyclicChain {
                node_id: node.id().clone(),
            });
        }
        let node_type = self.node_type(node)?;
        let emitter = self.emitter;
        let renderer =
            emitter
                .renderer(node.type_id())
                .ok_or_else(|| EmitError::UnhandledNodeType {
                    node_id: node.id().clone(),
                    type_id: node.type_id().to_string(),
                })?;
        self.check_placement(node, node_type)?;

        self.stack.insert(node.id().clone());
        let result = renderer.render(node, self);
        self.stack.remove(node.id());

        let mut rendered = result?;
        rendered.tier = if node_type.produces_value {
            rendered
                .tier
                .or(node_type.precedence_tier)
                .or(Some(tier::ATOMIC))
        } else {
            None
        };
        Ok(rendered)
    }

    fn node_type(&self, node: &Node) -> Result<&'a NodeType, EmitError> {
        let emitter = self.emitter;
        emitter
            .registry()
            .get_type(node.type_id())
            .map_err(|_| EmitError::UnknownNodeType {
                node_id: node.id().clone(),
                type_id: node.type_id().to_string(),
            })
    }

    fn check_placement(&self, node: &Node, node_type: &NodeType) -> Result<(), EmitError> {
        let at_top_level = self.graph.parent(node.id()).is_none();
        let inside_any = |types: &[String]| {
            types
                .iter()
                .any(|t| self.graph.ancestors_of_type(node.id(), t))
        };
        let violation = match &node_type.placement {
            Placement::Anywhere => None,
            Placement::TopLevel if !at_top_level => {
                Some("must be placed at the top level".to_string())
            }
            Placement::TopLevel => None,
            Placement::Within(types) if !inside_any(types) => Some(format!(
                "must be placed inside one of: {}",
                types.iter().join(", ")
            )),
            Placement::Within(_) => None,
            Placement::TopLevelOr(types) if !at_top_level && !inside_any(types) => Some(format!(
                "must be placed at the top level or inside one of: {}",
                types.iter().join(", ")
            )),
            Placement::TopLevelOr(_) => None,
        };
        match violation {
            Some(message) => Err(EmitError::InvalidPlacement {
                node_id: node.id().clone(),
                type_id: node.type_id().to_string(),
                message,
            }),
            None => Ok(()),
        }
    }

    /// The node owning the slot `node` is bound into.
    pub fn parent(&self, node: &Node) -> Option<&'a Node> {
        let graph = self.graph;
        graph.parent(node.id()).and_then(|id| graph.node(id))
    }

    // --- Fields ---

    fn field_spec(&self, node: &Node, name: &str) -> Result<&'a FieldSpec, EmitError> {
        self.node_type(node)?
            .field(name)
            .ok_or_else(|| EmitError::MissingRequiredField {
                node_id: node.id().clone(),
                field: name.to_string(),
            })
    }

    fn raw_field(&self, node: &Node, spec: &FieldSpec) -> String {
        node.field(&spec.name)
            .map(|v| v.to_string())
            .unwrap_or_else(|| spec.default.to_string())
    }

    fn invalid_field(node: &Node, field: &str, value: &str, reason: String) -> EmitError {
        EmitError::InvalidFieldValue {
            node_id: node.id().clone(),
            field: field.to_string(),
            value: value.to_string(),
            reason,
        }
    }

    /// A free-text field, checked for presence and identifier syntax as declared.
    pub fn field_text(&self, node: &Node, name: &str) -> Result<String, EmitError> {
        let spec = self.field_spec(node, name)?;
        let raw = self.raw_field(node, spec);
        let trimmed = raw.trim();
        if spec.required && trimmed.is_empty() {
            return Err(EmitError::MissingRequiredField {
                node_id: node.id().clone(),
                field: name.to_string(),
            });
        }
        if spec.identifier {
            if !is_valid_identifier(trimmed) {
                return Err(Self::invalid_field(
                    node,
                    name,
                    trimmed,
                    "is not a valid Rust identifier".to_string(),
                ));
            }
            return Ok(trimmed.to_string());
        }
        Ok(raw)
    }

    /// A dropdown field. The value must be one of the declared options.
    pub fn field_choice(&self, node: &Node, name: &str) -> Result<String, EmitError> {
        let spec = self.field_spec(node, name)?;
        let raw = self.raw_field(node, spec);
        let Some(options) = spec.options() else {
            return Ok(raw);
        };
        if raw.is_empty() && spec.required {
            return Err(EmitError::MissingRequiredField {
                node_id: node.id().clone(),
                field: name.to_string(),
            });
        }
        if options.iter().any(|o| o.value == raw) {
            Ok(raw)
        } else {
            Err(Self::invalid_field(
                node,
                name,
                &raw,
                format!(
                    "expected one of {}",
                    options.iter().map(|o| o.value.as_str()).join(", ")
                ),
            ))
        }
    }

    pub fn field_number(&self, node: &Node, name: &str) -> Result<f64, EmitError> {
        let spec = self.field_spec(node, name)?;
        let value = node.field(name).unwrap_or(&spec.default);
        match value.as_number() {
            Some(n) if n.is_finite() => Ok(n),
            _ => Err(Self::invalid_field(
                node,
                name,
                &value.to_string(),
                "is not a finite number".to_string(),
            )),
        }
    }

    // --- Slots ---

    fn slot_spec(&self, node: &Node, slot: &str) -> Result<&'a SlotSpec, EmitError> {
        self.node_type(node)?
            .slot(slot)
            .ok_or_else(|| Self::missing_slot(node, slot))
    }

    fn missing_slot(node: &Node, slot: &str) -> EmitError {
        EmitError::MissingRequiredSlot {
            node_id: node.id().clone(),
            slot: slot.to_string(),
        }
    }

    fn mismatch(node: &Node, slot: &str, child: &NodeId, message: &'static str) -> EmitError {
        EmitError::TypeMismatchInSlot {
            node_id: node.id().clone(),
            slot: slot.to_string(),
            child_id: child.clone(),
            message,
        }
    }

    fn lookup(&self, id: &NodeId) -> Result<&'a Node, EmitError> {
        let graph = self.graph;
        graph
            .node(id)
            .ok_or_else(|| EmitError::DanglingReference(id.clone()))
    }

    pub fn is_bound(&self, node: &Node, slot: &str) -> bool {
        node.slot(slot).is_some()
    }

    /// Emits the expression bound to `slot`, parenthesized if its tier is looser
    /// than `required`. Returns `None` for an empty optional slot.
    pub fn optional_value(
        &mut self,
        node: &Node,
        slot: &str,
        required: Tier,
    ) -> Result<Option<String>, EmitError> {
        let spec = self.slot_spec(node, slot)?;
        let child_id = match node.slot(slot) {
            None if spec.required => return Err(Self::missing_slot(node, slot)),
            None => return Ok(None),
            Some(SlotBinding::Chain(head)) => {
                return Err(Self::mismatch(
                    node,
                    slot,
                    head,
                    "is a statement chain where an expression is expected",
                ));
            }
            Some(SlotBinding::Single(child)) => child,
        };
        let child = self.lookup(child_id)?;
        if !self.node_type(child)?.produces_value {
            return Err(Self::mismatch(
                node,
                slot,
                child_id,
                "is a statement and does not produce a value",
            ));
        }
        let rendered = self.emit_node(child)?;
        Ok(Some(precedence::wrap(rendered, required)))
    }

    /// Like [`optional_value`](Self::optional_value), falling back to the slot's
    /// declared default code.
    pub fn value(&mut self, node: &Node, slot: &str, required: Tier) -> Result<String, EmitError> {
        match self.optional_value(node, slot, required)? {
            Some(code) => Ok(code),
            None => self
                .slot_spec(node, slot)?
                .default_code
                .clone()
                .ok_or_else(|| Self::missing_slot(node, slot)),
        }
    }

    /// The rendered fragment of every member of a chain slot, in chain order.
    pub fn chain_fragments(&mut self, node: &Node, slot: &str) -> Result<Vec<String>, EmitError> {
        let spec = self.slot_spec(node, slot)?;
        let head = match node.slot(slot) {
            None if spec.required => return Err(Self::missing_slot(node, slot)),
            None => return Ok(Vec::new()),
            Some(SlotBinding::Single(child)) => {
                return Err(Self::mismatch(
                    node,
                    slot,
                    child,
                    "is a single block where a statement chain is expected",
                ));
            }
            Some(SlotBinding::Chain(head)) => head.clone(),
        };

        let mut fragments = Vec::new();
        let mut visited = AHashSet::new();
        let mut current = Some(head);
        while let Some(id) = current {
            if !visited.insert(id.clone()) {
                return Err(EmitError::CyclicChain { node_id: id });
            }
            let member = self.lookup(&id)?;
            if self.node_type(member)?.produces_value {
                return Err(Self::mismatch(
                    node,
                    slot,
                    &id,
                    "produces a value and cannot be used as a statement",
                ));
            }
            fragments.push(self.emit_node(member)?.code);
            current = member.next().cloned();
        }
        Ok(fragments)
    }

    /// A chain slot rendered as a block body, one indentation level deeper.
    pub fn statements(&mut self, node: &Node, slot: &str) -> Result<String, EmitError> {
        let body: String = self.chain_fragments(node, slot)?.concat();
        Ok(self.indent(&body))
    }

    /// A chain slot rendered at the current indentation level.
    pub fn flat_statements(&mut self, node: &Node, slot: &str) -> Result<String, EmitError> {
        Ok(self.chain_fragments(node, slot)?.concat())
    }

    pub fn indent_unit(&self) -> String {
        self.emitter.config().indent_unit()
    }

    /// Prefixes every non-empty line with one indentation unit.
    pub fn indent(&self, code: &str) -> String {
        let unit = self.indent_unit();
        let mut out = String::with_capacity(code.len());
        for line in code.split_inclusive('\n') {
            if !line.trim().is_empty() {
                out.push_str(&unit);
            }
            out.push_str(line);
        }
        out
    }
}
