//! UID-consistent reconciliation of a freshly parsed tree against its
//! previous version.
//!
//! Re-parsing a file assigns UIDs from scratch, which would break element
//! identity everywhere a UID is stored (selection, highlight bounds,
//! metadata keys). This pass walks the old and new trees in structural
//! lockstep and rewrites the new tree's UIDs so that:
//!
//! - an unchanged node keeps its old UID,
//! - a collision with a UID already emitted elsewhere gets a deterministic
//!   replacement derived from the old UID (stable across repeated runs),
//! - a spurious UID change (old ≠ new at the same position) is reverted to
//!   the old UID,
//!
//! recording every rewrite as an `(original → new)` mapping so externally
//! stored UID references (highlight bounds) can be re-targeted afterwards.
//!
//! The pass is referentially non-destructive: a subtree whose final UID
//! equals its input UID is moved through unchanged, so unchanged content
//! keeps its existing heap buffers.

use crate::element::{
    ArbitraryJsBlock, ArrayElement, ComponentDef, ElementChild, ElementsWithin, Expression,
    HighlightBoundsForUids, JsxAttributePart, JsxAttributes, JsxElement, ObjectProperty,
    ParsedSource, SimpleValue, TopLevelElement, get_jsx_attribute,
};
use crate::uid::{Uid, UidSet, generate_consistent_uid};
use std::collections::{HashMap, HashSet};

// ─── State ───────────────────────────────────────────────────────────────

/// One recorded UID rewrite: the UID the new parse produced, and the UID
/// that replaced it in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UidMapping {
    pub original_uid: Uid,
    pub new_uid: Uid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UidUpdateMethod {
    /// Copy UIDs from the previous tree, deduplicating collisions.
    CopyUidsFixDuplicates,
    /// Apply previously recorded mappings verbatim.
    UseMappings,
    /// Blindly adopt the old UID.
    ForcedUpdate,
}

/// Mutable context threaded by reference through the whole fix pass.
struct FixUidsState {
    /// Every UID already placed in the output (seeded with the UIDs of all
    /// *other* files in the project).
    all_new_uids: UidSet,
    /// UIDs expected to still appear later in this pass; replacements must
    /// not steal them.
    expected: UidSet,
    mappings: Vec<UidMapping>,
    method: UidUpdateMethod,
}

fn resolve_uid(old_uid: Uid, new_uid: Uid, state: &mut FixUidsState) -> Uid {
    match state.method {
        UidUpdateMethod::CopyUidsFixDuplicates => {
            let uid_to_use = if state.all_new_uids.contains(&old_uid) {
                // Unchanged UID, but already used elsewhere in the new
                // structure: deduplicate deterministically and record it.
                let fresh = generate_consistent_uid(old_uid, &state.all_new_uids, &state.expected);
                state.mappings.push(UidMapping {
                    original_uid: new_uid,
                    new_uid: fresh,
                });
                fresh
            } else if old_uid == new_uid {
                new_uid
            } else {
                // The re-parse changed the UID; treat that as spurious and
                // keep the old one.
                state.mappings.push(UidMapping {
                    original_uid: new_uid,
                    new_uid: old_uid,
                });
                old_uid
            };
            state.all_new_uids.insert(uid_to_use);
            uid_to_use
        }
        UidUpdateMethod::UseMappings => state
            .mappings
            .iter()
            .find(|m| m.original_uid == old_uid)
            .map(|m| m.new_uid)
            .unwrap_or(old_uid),
        UidUpdateMethod::ForcedUpdate => old_uid,
    }
}

// ─── Entry point ─────────────────────────────────────────────────────────

/// Reconcile `new` against `old`, returning a UID-consistent version of
/// `new`. `already_existing` holds the UIDs of every *other* file in the
/// project; `expected` holds UIDs known to appear later.
pub fn fix_parse_success_uids(
    old: Option<&ParsedSource>,
    new: ParsedSource,
    already_existing: UidSet,
    expected: UidSet,
) -> ParsedSource {
    let mut state = FixUidsState {
        all_new_uids: already_existing,
        expected,
        mappings: Vec::new(),
        method: UidUpdateMethod::CopyUidsFixDuplicates,
    };

    let fixed_top_level = fix_top_level_elements(
        old.map(|o| o.top_level.as_slice()),
        new.top_level,
        &mut state,
    );

    // The combined block aggregates code already fixed above, so it must
    // reuse the mappings rather than re-deduplicate.
    let fixed_combined = new.combined_arbitrary_block.map(|block| {
        fix_combined_arbitrary_block(
            old.and_then(|o| o.combined_arbitrary_block.as_ref()),
            block,
            &mut state,
        )
    });

    let fixed_highlight_bounds = update_highlight_bounds(new.highlight_bounds, &state.mappings);
    let fixed_full_highlight_bounds =
        update_highlight_bounds(new.full_highlight_bounds, &state.mappings);

    ParsedSource {
        top_level: fixed_top_level,
        combined_arbitrary_block: fixed_combined,
        highlight_bounds: fixed_highlight_bounds,
        full_highlight_bounds: fixed_full_highlight_bounds,
    }
}

/// Re-target externally stored UID → bounds entries through the accumulated
/// mappings so they continue to reference valid elements.
pub fn update_highlight_bounds(
    bounds: HighlightBoundsForUids,
    mappings: &[UidMapping],
) -> HighlightBoundsForUids {
    if mappings.is_empty() {
        return bounds;
    }
    let remap: HashMap<Uid, Uid> = mappings
        .iter()
        .map(|m| (m.original_uid, m.new_uid))
        .collect();
    bounds
        .into_iter()
        .map(|(uid, mut entry)| match remap.get(&uid) {
            Some(&new_uid) => {
                entry.uid = new_uid;
                (new_uid, entry)
            }
            None => (uid, entry),
        })
        .collect()
}

// ─── Array matching ──────────────────────────────────────────────────────

/// Fix the elements of an array, matching old entries to new entries.
///
/// When a UID accessor is available, a new entry is first matched against an
/// old entry with the same UID at *any* index (insertions and reorderings
/// shift positions); entries with no UID match fall back to positional
/// correspondence, and positions already claimed by a shifted match are
/// treated as entirely new.
fn fix_array_elements<T>(
    uid_of: Option<fn(&T) -> Uid>,
    old: Option<&[T]>,
    new: Vec<T>,
    state: &mut FixUidsState,
    fix: &mut dyn FnMut(Option<&T>, T, &mut FixUidsState) -> T,
) -> Vec<T> {
    let len = new.len();
    let mut slots: Vec<Option<T>> = new.into_iter().map(Some).collect();
    let mut fixed: Vec<Option<T>> = (0..len).map(|_| None).collect();
    let mut old_indexes_used: HashSet<usize> = HashSet::new();

    // First pass: UID-shifted matches (and everything, when there is no old
    // side to match against).
    if let Some(uid_of) = uid_of {
        for i in 0..len {
            let new_uid = uid_of(slots[i].as_ref().expect("slot unconsumed"));
            match old {
                None => {
                    let value = slots[i].take().expect("slot unconsumed");
                    fixed[i] = Some(fix(None, value, state));
                }
                Some(old_elements) => {
                    let mut matched: Option<usize> = None;
                    for (old_index, old_element) in old_elements.iter().enumerate() {
                        if uid_of(old_element) == new_uid {
                            matched = Some(old_index);
                            old_indexes_used.insert(old_index);
                        }
                    }
                    if let Some(old_index) = matched {
                        let value = slots[i].take().expect("slot unconsumed");
                        fixed[i] = Some(fix(Some(&old_elements[old_index]), value, state));
                    }
                }
            }
        }
    }

    // Second pass: positional fallback for the rest.
    (0..len)
        .map(|i| {
            if let Some(done) = fixed[i].take() {
                return done;
            }
            let value = slots[i].take().expect("slot unconsumed");
            if !old_indexes_used.contains(&i) {
                let old_element = old.and_then(|o| o.get(i));
                fix(old_element, value, state)
            } else {
                // This position was claimed by a shifted match: entirely new.
                fix(None, value, state)
            }
        })
        .collect()
}

// ─── Top level ───────────────────────────────────────────────────────────

fn fix_top_level_elements(
    old: Option<&[TopLevelElement]>,
    new: Vec<TopLevelElement>,
    state: &mut FixUidsState,
) -> Vec<TopLevelElement> {
    fix_array_elements(None, old, new, state, &mut |old_element, new_element, st| {
        fix_top_level_element(old_element, new_element, st)
    })
}

fn fix_top_level_element(
    old: Option<&TopLevelElement>,
    new: TopLevelElement,
    state: &mut FixUidsState,
) -> TopLevelElement {
    match new {
        TopLevelElement::Component(component) => {
            let old_component = match old {
                Some(TopLevelElement::Component(c)) => Some(c),
                _ => None,
            };
            TopLevelElement::Component(fix_component(old_component, component, state))
        }
        TopLevelElement::ArbitraryBlock(block) => {
            let old_block = match old {
                Some(TopLevelElement::ArbitraryBlock(b)) => Some(b),
                _ => None,
            };
            TopLevelElement::ArbitraryBlock(fix_arbitrary_block(old_block, block, state))
        }
        imported @ TopLevelElement::Import(_) => imported,
        unparsed @ TopLevelElement::Unparsed(_) => unparsed,
    }
}

fn fix_component(
    old: Option<&ComponentDef>,
    new: ComponentDef,
    state: &mut FixUidsState,
) -> ComponentDef {
    let fixed_block = new.arbitrary_block.map(|block| {
        fix_arbitrary_block(old.and_then(|o| o.arbitrary_block.as_ref()), block, state)
    });
    let fixed_root = fix_element_child(old.map(|o| &o.root_element), new.root_element, state);
    ComponentDef {
        name: new.name,
        root_element: fixed_root,
        arbitrary_block: fixed_block,
    }
}

fn fix_arbitrary_block(
    old: Option<&ArbitraryJsBlock>,
    new: ArbitraryJsBlock,
    state: &mut FixUidsState,
) -> ArbitraryJsBlock {
    let fixed_within = fix_elements_within(
        old.map(|o| &o.elements_within),
        new.elements_within,
        state,
    );
    ArbitraryJsBlock {
        code: new.code,
        elements_within: fixed_within,
        uid: new.uid,
    }
}

/// The combined top-level block is processed after the main tree and must
/// stay consistent with it, so it applies the recorded mappings verbatim
/// instead of re-running deduplication.
fn fix_combined_arbitrary_block(
    old: Option<&ArbitraryJsBlock>,
    new: ArbitraryJsBlock,
    state: &mut FixUidsState,
) -> ArbitraryJsBlock {
    let previous_method = state.method;
    state.method = UidUpdateMethod::UseMappings;
    let fixed = fix_arbitrary_block(old, new, state);
    state.method = previous_method;
    fixed
}

fn fix_elements_within(
    old: Option<&ElementsWithin>,
    new: ElementsWithin,
    state: &mut FixUidsState,
) -> ElementsWithin {
    let mut result = ElementsWithin::new();
    for (key, new_element) in new {
        let old_element = old.and_then(|o| o.get(&key));
        let fixed = fix_element_child(old_element, new_element, state);
        // Re-keyed by the fixed UID.
        result.insert(fixed.uid(), fixed);
    }
    result
}

// ─── Element children ────────────────────────────────────────────────────

fn element_child_uid(child: &ElementChild) -> Uid {
    child.uid()
}

fn fix_element_child_array(
    old: Option<&[ElementChild]>,
    new: Vec<ElementChild>,
    state: &mut FixUidsState,
) -> Vec<ElementChild> {
    fix_array_elements(
        Some(element_child_uid),
        old,
        new,
        state,
        &mut |old_element, new_element, st| fix_element_child(old_element, new_element, st),
    )
}

fn fix_element_child(
    old: Option<&ElementChild>,
    new: ElementChild,
    state: &mut FixUidsState,
) -> ElementChild {
    let old_uid = old.map(ElementChild::uid);
    match new {
        ElementChild::Element(element) => {
            ElementChild::Element(fix_jsx_element(old, element, state))
        }
        ElementChild::Fragment(mut fragment) => {
            let old_children = match old {
                Some(ElementChild::Fragment(of)) => Some(of.children.as_slice()),
                _ => None,
            };
            fragment.children =
                fix_element_child_array(old_children, std::mem::take(&mut fragment.children), state);
            fragment.uid = resolve_uid(old_uid.unwrap_or(fragment.uid), fragment.uid, state);
            ElementChild::Fragment(fragment)
        }
        ElementChild::TextBlock(mut text) => {
            text.uid = resolve_uid(old_uid.unwrap_or(text.uid), text.uid, state);
            ElementChild::TextBlock(text)
        }
        ElementChild::Conditional(mut conditional) => {
            let (old_condition, old_true, old_false) = match old {
                Some(ElementChild::Conditional(oc)) => (
                    Some(&oc.condition),
                    Some(oc.when_true.as_ref()),
                    Some(oc.when_false.as_ref()),
                ),
                _ => (None, None, None),
            };
            conditional.condition = fix_expression(
                old_condition,
                std::mem::replace(
                    &mut conditional.condition,
                    Expression::text("", conditional.uid),
                ),
                state,
            );
            conditional.when_true = Box::new(fix_element_child(
                old_true,
                *std::mem::replace(
                    &mut conditional.when_true,
                    Box::new(ElementChild::Expression(Expression::text(
                        "",
                        conditional.uid,
                    ))),
                ),
                state,
            ));
            conditional.when_false = Box::new(fix_element_child(
                old_false,
                *std::mem::replace(
                    &mut conditional.when_false,
                    Box::new(ElementChild::Expression(Expression::text(
                        "",
                        conditional.uid,
                    ))),
                ),
                state,
            ));
            conditional.uid = resolve_uid(old_uid.unwrap_or(conditional.uid), conditional.uid, state);
            ElementChild::Conditional(conditional)
        }
        ElementChild::Expression(expression) => {
            let old_expression = match old {
                Some(ElementChild::Expression(ox)) => Some(ox),
                _ => None,
            };
            match old_expression {
                Some(ox) => ElementChild::Expression(fix_expression(Some(ox), expression, state)),
                None => {
                    // No structurally matching old expression: only the UID
                    // itself is reconciled against whatever sat here before.
                    let resolved =
                        resolve_uid(old_uid.unwrap_or(expression.uid()), expression.uid(), state);
                    if resolved == expression.uid() {
                        ElementChild::Expression(expression)
                    } else {
                        ElementChild::Expression(expression.with_uid(resolved))
                    }
                }
            }
        }
    }
}

fn fix_jsx_element(
    old: Option<&ElementChild>,
    mut new: JsxElement,
    state: &mut FixUidsState,
) -> JsxElement {
    let old_element = match old {
        Some(ElementChild::Element(oe)) => Some(oe),
        _ => None,
    };

    // Work through props and children before touching the element's own UID,
    // so the `data-uid` prop cannot clash with descendants.
    let (old_attributes, old_children) = match old_element {
        Some(oe) => (
            Some(oe.attributes.as_slice()),
            Some(oe.children.as_slice()),
        ),
        None => (None, None),
    };
    let mut fixed_attributes =
        fix_jsx_attributes(old_attributes, std::mem::take(&mut new.attributes), state);
    let fixed_children =
        fix_element_child_array(old_children, std::mem::take(&mut new.children), state);

    let old_uid = old.map(ElementChild::uid).unwrap_or(new.uid);
    let resolved_uid = resolve_uid(old_uid, new.uid, state);

    // Carry the UID of the `data-uid` prop expression over as well, unless
    // the old prop UID is already taken in the new structure.
    let mut data_uid_prop_uid: Option<Uid> = None;
    if let Some(oe) = old_element {
        let old_prop_uid = get_jsx_attribute(&oe.attributes, "data-uid").map(Expression::uid);
        let new_prop_uid = get_jsx_attribute(&fixed_attributes, "data-uid").map(Expression::uid);
        if let (Some(old_prop_uid), Some(new_prop_uid)) = (old_prop_uid, new_prop_uid) {
            data_uid_prop_uid = if state.all_new_uids.contains(&old_prop_uid) {
                Some(new_prop_uid)
            } else {
                // Forced update: blindly adopt the old prop UID.
                Some(old_prop_uid)
            };
        }
    }

    let attr_uid = data_uid_prop_uid
        .or_else(|| get_jsx_attribute(&fixed_attributes, "data-uid").map(Expression::uid))
        .unwrap_or_else(|| crate::element::data_uid_expression_uid(resolved_uid));
    crate::element::set_jsx_attribute(
        &mut fixed_attributes,
        "data-uid",
        Expression::Value {
            value: SimpleValue::Text(resolved_uid.as_str().to_string()),
            uid: attr_uid,
        },
    );

    JsxElement {
        name: new.name,
        attributes: fixed_attributes,
        children: fixed_children,
        uid: resolved_uid,
    }
}

// ─── Attributes & expressions ────────────────────────────────────────────

fn fix_jsx_attributes(
    old: Option<&[JsxAttributePart]>,
    new: JsxAttributes,
    state: &mut FixUidsState,
) -> JsxAttributes {
    fix_array_elements(None, old, new, state, &mut |old_part, new_part, st| {
        fix_jsx_attribute_part(old_part, new_part, st)
    })
}

fn fix_jsx_attribute_part(
    old: Option<&JsxAttributePart>,
    new: JsxAttributePart,
    state: &mut FixUidsState,
) -> JsxAttributePart {
    match new {
        JsxAttributePart::Entry { key, value } => {
            let old_value = match old {
                Some(JsxAttributePart::Entry { value: ov, .. }) => Some(ov),
                _ => None,
            };
            JsxAttributePart::Entry {
                key,
                value: fix_expression(old_value, value, state),
            }
        }
        JsxAttributePart::Spread { value } => {
            let old_value = match old {
                Some(JsxAttributePart::Spread { value: ov }) => Some(ov),
                _ => None,
            };
            JsxAttributePart::Spread {
                value: fix_expression(old_value, value, state),
            }
        }
    }
}

fn expression_uid(expression: &Expression) -> Uid {
    expression.uid()
}

fn fix_expression_array(
    old: Option<&[Expression]>,
    new: Vec<Expression>,
    state: &mut FixUidsState,
) -> Vec<Expression> {
    fix_array_elements(
        Some(expression_uid),
        old,
        new,
        state,
        &mut |old_expression, new_expression, st| {
            fix_expression(old_expression, new_expression, st)
        },
    )
}

fn fix_array_element_list(
    old: Option<&[ArrayElement]>,
    new: Vec<ArrayElement>,
    state: &mut FixUidsState,
) -> Vec<ArrayElement> {
    fix_array_elements(None, old, new, state, &mut |old_entry, new_entry, st| {
        ArrayElement {
            value: fix_expression(old_entry.map(|o| &o.value), new_entry.value, st),
        }
    })
}

fn fix_object_property_list(
    old: Option<&[ObjectProperty]>,
    new: Vec<ObjectProperty>,
    state: &mut FixUidsState,
) -> Vec<ObjectProperty> {
    fix_array_elements(None, old, new, state, &mut |old_entry, new_entry, st| {
        ObjectProperty {
            key: new_entry.key,
            value: fix_expression(old_entry.map(|o| &o.value), new_entry.value, st),
        }
    })
}

fn fix_expression(
    old: Option<&Expression>,
    new: Expression,
    state: &mut FixUidsState,
) -> Expression {
    let old_uid = old.map(Expression::uid);
    match new {
        Expression::Value { value, uid } => {
            let resolved = resolve_uid(old_uid.unwrap_or(uid), uid, state);
            Expression::Value {
                value,
                uid: resolved,
            }
        }
        Expression::NestedArray { content, uid } => {
            let old_content = match old {
                Some(Expression::NestedArray { content: oc, .. }) => Some(oc.as_slice()),
                _ => None,
            };
            let fixed_content = fix_array_element_list(old_content, content, state);
            let resolved = resolve_uid(old_uid.unwrap_or(uid), uid, state);
            Expression::NestedArray {
                content: fixed_content,
                uid: resolved,
            }
        }
        Expression::NestedObject { content, uid } => {
            let old_content = match old {
                Some(Expression::NestedObject { content: oc, .. }) => Some(oc.as_slice()),
                _ => None,
            };
            let fixed_content = fix_object_property_list(old_content, content, state);
            let resolved = resolve_uid(old_uid.unwrap_or(uid), uid, state);
            Expression::NestedObject {
                content: fixed_content,
                uid: resolved,
            }
        }
        Expression::FunctionCall {
            function_name,
            parameters,
            uid,
        } => {
            let old_parameters = match old {
                Some(Expression::FunctionCall { parameters: op, .. }) => Some(op.as_slice()),
                _ => None,
            };
            let fixed_parameters = fix_expression_array(old_parameters, parameters, state);
            let resolved = resolve_uid(old_uid.unwrap_or(uid), uid, state);
            Expression::FunctionCall {
                function_name,
                parameters: fixed_parameters,
                uid: resolved,
            }
        }
        Expression::OtherJavaScript {
            code,
            elements_within,
            uid,
        } => {
            let old_within = match old {
                Some(Expression::OtherJavaScript {
                    elements_within: ow,
                    ..
                }) => Some(ow),
                _ => None,
            };
            let fixed_within = fix_elements_within(old_within, elements_within, state);
            let resolved = resolve_uid(old_uid.unwrap_or(uid), uid, state);
            Expression::OtherJavaScript {
                code,
                elements_within: fixed_within,
                uid: resolved,
            }
        }
    }
}
