//! The JSX-like element tree model.
//!
//! A parsed component file is a list of top-level elements; each component
//! owns one root element tree. Nodes form a closed tagged union so every
//! traversal is exhaustively matched — adding a variant breaks every site
//! that must handle it.
//!
//! Every node carries exactly one UID, unique within a parsed file. For a
//! `JsxElement` the `data-uid` attribute value is kept identical to the
//! node's own UID; `set_element_uid` is the only way both are written.

use crate::uid::Uid;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ─── Expressions ─────────────────────────────────────────────────────────

/// A plain literal appearing in an attribute position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimpleValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Null,
}

/// An entry of a nested-array expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayElement {
    pub value: Expression,
}

/// An entry of a nested-object expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectProperty {
    pub key: String,
    pub value: Expression,
}

/// Elements embedded inside free-form code, keyed by their UID.
/// Values are always `ElementChild::Element` variants.
pub type ElementsWithin = HashMap<Uid, ElementChild>;

/// An attribute-position expression. Each variant carries its own UID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    Value {
        value: SimpleValue,
        uid: Uid,
    },
    NestedArray {
        content: Vec<ArrayElement>,
        uid: Uid,
    },
    NestedObject {
        content: Vec<ObjectProperty>,
        uid: Uid,
    },
    FunctionCall {
        function_name: String,
        parameters: Vec<Expression>,
        uid: Uid,
    },
    /// Free-form code, with any elements it renders keyed by UID.
    OtherJavaScript {
        code: String,
        elements_within: ElementsWithin,
        uid: Uid,
    },
}

impl Expression {
    /// A text literal expression.
    pub fn text(value: &str, uid: Uid) -> Self {
        Expression::Value {
            value: SimpleValue::Text(value.to_string()),
            uid,
        }
    }

    pub fn uid(&self) -> Uid {
        match self {
            Expression::Value { uid, .. }
            | Expression::NestedArray { uid, .. }
            | Expression::NestedObject { uid, .. }
            | Expression::FunctionCall { uid, .. }
            | Expression::OtherJavaScript { uid, .. } => *uid,
        }
    }

    pub fn with_uid(self, uid: Uid) -> Self {
        match self {
            Expression::Value { value, .. } => Expression::Value { value, uid },
            Expression::NestedArray { content, .. } => Expression::NestedArray { content, uid },
            Expression::NestedObject { content, .. } => Expression::NestedObject { content, uid },
            Expression::FunctionCall {
                function_name,
                parameters,
                ..
            } => Expression::FunctionCall {
                function_name,
                parameters,
                uid,
            },
            Expression::OtherJavaScript {
                code,
                elements_within,
                ..
            } => Expression::OtherJavaScript {
                code,
                elements_within,
                uid,
            },
        }
    }
}

// ─── Attributes ──────────────────────────────────────────────────────────

/// One part of an element's ordered attribute list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JsxAttributePart {
    Entry { key: String, value: Expression },
    Spread { value: Expression },
}

/// The ordered attribute list of a `JsxElement`.
pub type JsxAttributes = Vec<JsxAttributePart>;

/// Look up a named attribute's value expression.
pub fn get_jsx_attribute<'a>(attributes: &'a JsxAttributes, key: &str) -> Option<&'a Expression> {
    attributes.iter().find_map(|part| match part {
        JsxAttributePart::Entry { key: k, value } if k == key => Some(value),
        _ => None,
    })
}

/// Replace a named attribute in place, or append it when absent.
/// Order of unrelated attributes is preserved.
pub fn set_jsx_attribute(attributes: &mut JsxAttributes, key: &str, value: Expression) {
    for part in attributes.iter_mut() {
        if let JsxAttributePart::Entry { key: k, value: v } = part
            && k == key
        {
            *v = value;
            return;
        }
    }
    attributes.push(JsxAttributePart::Entry {
        key: key.to_string(),
        value,
    });
}

// ─── Tree nodes ──────────────────────────────────────────────────────────

/// An element with a tag name, ordered attributes, and ordered children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsxElement {
    pub name: String,
    pub attributes: JsxAttributes,
    pub children: Vec<ElementChild>,
    pub uid: Uid,
}

/// The UID minted for a fresh `data-uid` attribute expression. Every
/// expression node carries its own UID; deriving it keeps it distinct from
/// the element's UID (the two must never collide in uniqueness bookkeeping)
/// while staying deterministic.
pub(crate) fn data_uid_expression_uid(element_uid: Uid) -> Uid {
    Uid::intern(&format!("{element_uid}p"))
}

impl JsxElement {
    /// Create an element whose `data-uid` attribute matches `uid`.
    pub fn new(name: &str, uid: Uid) -> Self {
        let mut element = Self {
            name: name.to_string(),
            attributes: Vec::new(),
            children: Vec::new(),
            uid,
        };
        set_jsx_attribute(
            &mut element.attributes,
            "data-uid",
            Expression::text(uid.as_str(), data_uid_expression_uid(uid)),
        );
        element
    }
}

/// A keyless grouping node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsxFragment {
    pub children: Vec<ElementChild>,
    pub uid: Uid,
}

/// Raw text appearing between elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsxTextBlock {
    pub text: String,
    pub uid: Uid,
}

/// A ternary with element-valued branches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsxConditional {
    pub condition: Expression,
    pub when_true: Box<ElementChild>,
    pub when_false: Box<ElementChild>,
    pub uid: Uid,
}

/// Any node that can appear in element-child position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElementChild {
    Element(JsxElement),
    Fragment(JsxFragment),
    TextBlock(JsxTextBlock),
    Conditional(JsxConditional),
    Expression(Expression),
}

impl ElementChild {
    pub fn uid(&self) -> Uid {
        match self {
            ElementChild::Element(e) => e.uid,
            ElementChild::Fragment(f) => f.uid,
            ElementChild::TextBlock(t) => t.uid,
            ElementChild::Conditional(c) => c.uid,
            ElementChild::Expression(x) => x.uid(),
        }
    }

    pub fn as_element(&self) -> Option<&JsxElement> {
        match self {
            ElementChild::Element(e) => Some(e),
            _ => None,
        }
    }
}

/// Set an element's UID, keeping the `data-uid` attribute in sync. An
/// existing attribute expression keeps its own UID.
pub fn set_element_uid(element: &mut JsxElement, uid: Uid) {
    element.uid = uid;
    let attr_uid = get_jsx_attribute(&element.attributes, "data-uid")
        .map(Expression::uid)
        .unwrap_or_else(|| data_uid_expression_uid(uid));
    set_jsx_attribute(
        &mut element.attributes,
        "data-uid",
        Expression::text(uid.as_str(), attr_uid),
    );
}

// ─── Top level ───────────────────────────────────────────────────────────

/// Free-form top-of-file code with any elements it renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArbitraryJsBlock {
    pub code: String,
    pub elements_within: ElementsWithin,
    pub uid: Uid,
}

/// One component declaration: a name and its root element tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDef {
    pub name: String,
    pub root_element: ElementChild,
    pub arbitrary_block: Option<ArbitraryJsBlock>,
}

/// An import line, kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportStatement {
    pub module: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TopLevelElement {
    Component(ComponentDef),
    ArbitraryBlock(ArbitraryJsBlock),
    Import(ImportStatement),
    Unparsed(String),
}

/// Source-region bounds for one UID, used by the editor to map elements
/// back to text. Rewritten through UID mappings after a fix-up pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HighlightBounds {
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
    pub uid: Uid,
}

pub type HighlightBoundsForUids = HashMap<Uid, HighlightBounds>;

/// The successful parse of one component file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedSource {
    pub top_level: Vec<TopLevelElement>,
    pub combined_arbitrary_block: Option<ArbitraryJsBlock>,
    pub highlight_bounds: HighlightBoundsForUids,
    pub full_highlight_bounds: HighlightBoundsForUids,
}

impl ParsedSource {
    pub fn new(top_level: Vec<TopLevelElement>) -> Self {
        Self {
            top_level,
            combined_arbitrary_block: None,
            highlight_bounds: HashMap::new(),
            full_highlight_bounds: HashMap::new(),
        }
    }

    /// The component declarations, in file order.
    pub fn components(&self) -> impl Iterator<Item = &ComponentDef> {
        self.top_level.iter().filter_map(|tle| match tle {
            TopLevelElement::Component(c) => Some(c),
            _ => None,
        })
    }
}
