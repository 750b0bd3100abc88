use crate::graph::FieldValue;
use serde::Serialize;

/// Binding strength of an emitted expression. Lower binds tighter.
pub type Tier = u8;

/// One entry of a dropdown field: what the editor shows and what the emitter sees.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumOption {
    pub label: String,
    pub value: String,
}

impl EnumOption {
    pub fn new(label: &str, value: &str) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
        }
    }
}

/// The kind of a user-editable leaf value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "options", rename_all = "camelCase")]
pub enum FieldKind {
    FreeText,
    EnumChoice(Vec<EnumOption>),
    Number,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub default: FieldValue,
    /// An empty value is rejected at emission time.
    pub required: bool,
    /// The value must be a valid Rust identifier.
    pub identifier: bool,
}

impl FieldSpec {
    pub fn text(name: &str, default: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::FreeText,
            default: FieldValue::Text(default.to_string()),
            required: false,
            identifier: false,
        }
    }

    pub fn number(name: &str, default: f64) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::Number,
            default: FieldValue::Number(default),
            required: false,
            identifier: false,
        }
    }

    /// A dropdown. The first option is the default.
    pub fn choice(name: &str, options: &[(&str, &str)]) -> Self {
        let options: Vec<EnumOption> = options
            .iter()
            .map(|(label, value)| EnumOption::new(label, value))
            .collect();
        let default = options
            .first()
            .map(|o| FieldValue::Text(o.value.clone()))
            .unwrap_or_else(|| FieldValue::Text(String::new()));
        Self {
            name: name.to_string(),
            kind: FieldKind::EnumChoice(options),
            default,
            required: true,
            identifier: false,
        }
    }

    /// A required identifier-like text field, the common case for names.
    pub fn identifier(name: &str, default: &str) -> Self {
        Self {
            required: true,
            identifier: true,
            ..Self::text(name, default)
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn options(&self) -> Option<&[EnumOption]> {
        match &self.kind {
            FieldKind::EnumChoice(options) => Some(options),
            _ => None,
        }
    }
}

/// What a slot accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SlotArity {
    SingleExpression,
    StatementChain,
}

impl SlotArity {
    pub fn describe(self) -> &'static str {
        match self {
            SlotArity::SingleExpression => "a single expression",
            SlotArity::StatementChain => "a statement chain",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotSpec {
    pub name: String,
    pub arity: SlotArity,
    /// An empty slot is rejected at emission time.
    pub required: bool,
    /// Text emitted in place of an empty, optional expression slot.
    pub default_code: Option<String>,
}

impl SlotSpec {
    pub fn expression(name: &str, default_code: &str) -> Self {
        Self {
            name: name.to_string(),
            arity: SlotArity::SingleExpression,
            required: false,
            default_code: Some(default_code.to_string()),
        }
    }

    pub fn chain(name: &str) -> Self {
        Self {
            name: name.to_string(),
            arity: SlotArity::StatementChain,
            required: false,
            default_code: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self.default_code = None;
        self
    }
}

/// Where a block may appear in the graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "rule", content = "types", rename_all = "camelCase")]
pub enum Placement {
    Anywhere,
    /// Only as a root.
    TopLevel,
    /// Somewhere below a node of one of these types.
    Within(Vec<String>),
    /// Either as a root or below a node of one of these types.
    TopLevelOr(Vec<String>),
}

impl Placement {
    pub fn within(types: &[&str]) -> Self {
        Placement::Within(types.iter().map(|t| t.to_string()).collect())
    }

    pub fn top_level_or(types: &[&str]) -> Self {
        Placement::TopLevelOr(types.iter().map(|t| t.to_string()).collect())
    }
}

/// The schema a node is an instance of.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeType {
    pub id: String,
    pub category: String,
    pub fields: Vec<FieldSpec>,
    pub slots: Vec<SlotSpec>,
    pub produces_value: bool,
    /// Only meaningful when `produces_value` is set. For blocks whose operator is
    /// chosen by a field this is the loosest tier the block can produce.
    pub precedence_tier: Option<Tier>,
    pub placement: Placement,
}

impl NodeType {
    pub fn statement(id: &str, category: &str) -> Self {
        Self {
            id: id.to_string(),
            category: category.to_string(),
            fields: Vec::new(),
            slots: Vec::new(),
            produces_value: false,
            precedence_tier: None,
            placement: Placement::Anywhere,
        }
    }

    pub fn expression(id: &str, category: &str, tier: Tier) -> Self {
        Self {
            produces_value: true,
            precedence_tier: Some(tier),
            ..Self::statement(id, category)
        }
    }

    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_slot(mut self, slot: SlotSpec) -> Self {
        self.slots.push(slot);
        self
    }

    pub fn placed(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn slot(&self, name: &str) -> Option<&SlotSpec> {
        self.slots.iter().find(|s| s.name == name)
    }
}
