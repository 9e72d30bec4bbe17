//! Path-addressed operations over parsed element trees.
//!
//! Paths address elements by UID. Fragments are transparent: they never
//! consume a path segment, so a fragment's children match against the same
//! segment as the fragment itself. Free-form code blocks resolve through
//! their `elements_within` map.
//!
//! `transform_element_at_path` treats an unresolvable path as a precondition
//! violation and errors; `insert_element_child` and `remove_element_child`
//! no-op instead, because they run on user gestures where the tree may have
//! shifted under the interaction.

use crate::element::{
    ComponentDef, ElementChild, Expression, JsxElement, ParsedSource, SimpleValue,
    TopLevelElement, get_jsx_attribute, set_element_uid,
};
use crate::path::ElementPath;
use crate::uid::{Uid, UidSet, generate_uid};

// ─── Find ────────────────────────────────────────────────────────────────

/// Resolve a path to the element child it addresses, or `None`. Never errors.
pub fn find_element_at_path<'a>(
    components: &'a [ComponentDef],
    path: &ElementPath,
) -> Option<&'a ElementChild> {
    if path.is_empty() {
        return None;
    }
    components
        .iter()
        .find_map(|component| find_inner(&component.root_element, path.parts()))
}

fn find_inner<'a>(element: &'a ElementChild, working: &[Uid]) -> Option<&'a ElementChild> {
    let first = *working.first()?;
    match element {
        ElementChild::Element(el) => {
            if el.uid != first {
                return None;
            }
            let tail = &working[1..];
            if tail.is_empty() {
                return Some(element);
            }
            el.children.iter().find_map(|child| find_inner(child, tail))
        }
        // Fragments are transparent to paths.
        ElementChild::Fragment(fragment) => fragment
            .children
            .iter()
            .find_map(|child| find_inner(child, working)),
        ElementChild::Expression(Expression::OtherJavaScript {
            elements_within, ..
        }) => elements_within
            .get(&first)
            // The embedded element's own UID is the matched segment, so it is
            // searched with the full working path.
            .and_then(|embedded| find_inner(embedded, working)),
        ElementChild::TextBlock(_)
        | ElementChild::Conditional(_)
        | ElementChild::Expression(_) => None,
    }
}

// ─── Transform ───────────────────────────────────────────────────────────

/// Replace the element at `path` with `transform(element)`, rebuilding the
/// ancestors along the path in place.
///
/// # Errors
/// When the path does not resolve to a `JsxElement` — callers are expected
/// to have validated the path first.
pub fn transform_element_at_path(
    components: &mut [ComponentDef],
    path: &ElementPath,
    transform: &mut dyn FnMut(JsxElement) -> JsxElement,
) -> Result<(), String> {
    if transform_at_path_optionally(components, path, transform) {
        Ok(())
    } else {
        Err(format!("Did not find element to transform {path}"))
    }
}

fn transform_at_path_optionally(
    components: &mut [ComponentDef],
    path: &ElementPath,
    transform: &mut dyn FnMut(JsxElement) -> JsxElement,
) -> bool {
    if path.is_empty() {
        return false;
    }
    for component in components.iter_mut() {
        if transform_inner(&mut component.root_element, path.parts(), transform) {
            return true;
        }
    }
    false
}

fn transform_inner(
    element: &mut ElementChild,
    working: &[Uid],
    transform: &mut dyn FnMut(JsxElement) -> JsxElement,
) -> bool {
    let Some(&first) = working.first() else {
        return false;
    };
    match element {
        ElementChild::Element(el) => {
            if el.uid != first {
                return false;
            }
            let tail = &working[1..];
            if tail.is_empty() {
                let uid = el.uid;
                let taken = std::mem::replace(el, JsxElement::new("", uid));
                *el = transform(taken);
                return true;
            }
            el.children
                .iter_mut()
                .any(|child| transform_inner(child, tail, transform))
        }
        ElementChild::Fragment(fragment) => fragment
            .children
            .iter_mut()
            .any(|child| transform_inner(child, working, transform)),
        ElementChild::Expression(Expression::OtherJavaScript {
            elements_within, ..
        }) => {
            let Some(embedded) = elements_within.get_mut(&first) else {
                return false;
            };
            // Embedded elements keep their map key even if the transform
            // rewrites their UID.
            transform_inner(embedded, working, transform)
        }
        ElementChild::TextBlock(_)
        | ElementChild::Conditional(_)
        | ElementChild::Expression(_) => false,
    }
}

// ─── Insert ──────────────────────────────────────────────────────────────

/// Insert `element` under the parent at `target_parent`, defaulting to the
/// project's storyboard root when no parent is given. With an index the child
/// lands at that position (clamped to the child count); otherwise it is
/// appended. Returns false (leaving the tree unchanged) when the parent does
/// not resolve to an element.
pub fn insert_element_child(
    components: &mut [ComponentDef],
    target_parent: Option<&ElementPath>,
    element: ElementChild,
    index: Option<usize>,
    storyboard_path: Option<&ElementPath>,
) -> bool {
    let Some(parent_path) = target_parent.or(storyboard_path) else {
        log::debug!("insert: no parent and no storyboard root, dropping insert");
        return false;
    };
    let mut inserted = Some(element);
    let did_transform = transform_at_path_optionally(components, parent_path, &mut |mut parent| {
        if let Some(new_child) = inserted.take() {
            match index {
                Some(i) => {
                    let i = i.min(parent.children.len());
                    parent.children.insert(i, new_child);
                }
                None => parent.children.push(new_child),
            }
        }
        parent
    });
    did_transform && inserted.is_none()
}

// ─── Remove ──────────────────────────────────────────────────────────────

/// Remove the child matching the target's UID from its direct parent, and
/// strip the same UID from any fragment children of that parent (fragments
/// are transparent to paths, so the target may actually live one level down
/// inside one).
pub fn remove_element_child(components: &mut [ComponentDef], target: &ElementPath) -> bool {
    let Some(parent_path) = target.parent() else {
        return false;
    };
    let Some(target_uid) = target.to_uid() else {
        return false;
    };
    transform_at_path_optionally(components, &parent_path, &mut |mut parent| {
        parent.children.retain(|child| child.uid() != target_uid);
        for child in parent.children.iter_mut() {
            remove_shallow(child, target_uid);
        }
        parent
    })
}

fn remove_shallow(element: &mut ElementChild, target_uid: Uid) {
    if let ElementChild::Fragment(fragment) = element {
        fragment.children.retain(|child| child.uid() != target_uid);
        for child in fragment.children.iter_mut() {
            remove_shallow(child, target_uid);
        }
    }
}

// ─── Z-index ─────────────────────────────────────────────────────────────

/// The sibling index of the element at `target` under its parent, or -1 when
/// the parent or the element cannot be found. Used as a stable ordering
/// signal for z-ordering decisions.
pub fn z_index_of_element(top_level: &[TopLevelElement], target: &ElementPath) -> i64 {
    let Some(parent_path) = target.parent() else {
        return -1;
    };
    let Some(target_uid) = target.to_uid() else {
        return -1;
    };
    let parent = top_level.iter().find_map(|tle| match tle {
        TopLevelElement::Component(component) => {
            match find_inner(&component.root_element, parent_path.parts()) {
                Some(ElementChild::Element(parent)) => Some(parent),
                _ => None,
            }
        }
        _ => None,
    });
    let Some(parent) = parent else {
        return -1;
    };
    parent
        .children
        .iter()
        .position(|child| matches!(child, ElementChild::Element(el) if el.uid == target_uid))
        .map(|i| i as i64)
        .unwrap_or(-1)
}

// ─── Project-wide UID bookkeeping ────────────────────────────────────────

/// Collect every UID present in `data-uid` attributes across the given parsed
/// sources.
///
/// With `strict_actions` set, a duplicate UID or an element missing its
/// `data-uid` is a fatal condition reported with the responsible action list.
/// Without it, such elements are tolerated and skipped.
pub fn get_all_unique_uids<'a>(
    sources: impl IntoIterator<Item = &'a ParsedSource>,
    strict_actions: Option<&str>,
) -> Result<UidSet, String> {
    let mut uids = UidSet::new();
    for source in sources {
        for component in source.components() {
            extract_uids(&component.root_element, strict_actions, &mut uids)?;
        }
    }
    Ok(uids)
}

fn extract_uids(
    element: &ElementChild,
    strict_actions: Option<&str>,
    uids: &mut UidSet,
) -> Result<(), String> {
    if let ElementChild::Element(el) = element {
        for child in &el.children {
            extract_uids(child, strict_actions, uids)?;
        }
        match get_jsx_attribute(&el.attributes, "data-uid") {
            Some(Expression::Value {
                value: SimpleValue::Text(uid_text),
                ..
            }) => {
                let uid = Uid::intern(uid_text);
                if !uids.insert(uid)
                    && let Some(actions) = strict_actions
                {
                    return Err(format!(
                        "Found duplicate UID: '{uid}'. Suspicious action(s): {actions}"
                    ));
                }
            }
            _ => {
                if let Some(actions) = strict_actions {
                    return Err(format!(
                        "Found element with missing UID. Suspicious action(s): {actions}"
                    ));
                }
            }
        }
    }
    Ok(())
}

/// Scan the whole project's parsed trees and return one newly generated UID
/// guaranteed absent from them.
pub fn generate_uid_with_existing_components<'a>(
    sources: impl IntoIterator<Item = &'a ParsedSource>,
) -> Uid {
    // Non-strict collection never errors.
    let existing = get_all_unique_uids(sources, None).unwrap_or_default();
    generate_uid(&existing)
}

/// Walk freshly built elements, re-keying any UID that collides with
/// `existing` (or is missing) and keeping `data-uid` attributes in sync.
/// Newly placed UIDs are added to `existing`.
pub fn guarantee_unique_uids(elements: &mut [ElementChild], existing: &mut UidSet) {
    for element in elements {
        guarantee_unique_uids_inner(element, existing);
    }
}

fn guarantee_unique_uids_inner(element: &mut ElementChild, existing: &mut UidSet) {
    match element {
        ElementChild::Element(el) => {
            let has_data_uid = matches!(
                get_jsx_attribute(&el.attributes, "data-uid"),
                Some(Expression::Value {
                    value: SimpleValue::Text(_),
                    ..
                })
            );
            if !has_data_uid || existing.contains(&el.uid) {
                let fresh = generate_uid(existing);
                set_element_uid(el, fresh);
            }
            existing.insert(el.uid);
            for child in el.children.iter_mut() {
                guarantee_unique_uids_inner(child, existing);
            }
        }
        ElementChild::Fragment(fragment) => {
            if existing.contains(&fragment.uid) {
                fragment.uid = generate_uid(existing);
            }
            existing.insert(fragment.uid);
            for child in fragment.children.iter_mut() {
                guarantee_unique_uids_inner(child, existing);
            }
        }
        ElementChild::TextBlock(text) => {
            if existing.contains(&text.uid) {
                text.uid = generate_uid(existing);
            }
            existing.insert(text.uid);
        }
        ElementChild::Conditional(conditional) => {
            if existing.contains(&conditional.uid) {
                conditional.uid = generate_uid(existing);
            }
            existing.insert(conditional.uid);
            guarantee_unique_uids_inner(&mut conditional.when_true, existing);
            guarantee_unique_uids_inner(&mut conditional.when_false, existing);
        }
        ElementChild::Expression(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{JsxFragment, TopLevelElement};

    fn element(name: &str, uid: &str, children: Vec<ElementChild>) -> ElementChild {
        let mut el = JsxElement::new(name, Uid::intern(uid));
        el.children = children;
        ElementChild::Element(el)
    }

    fn fragment(uid: &str, children: Vec<ElementChild>) -> ElementChild {
        ElementChild::Fragment(JsxFragment {
            children,
            uid: Uid::intern(uid),
        })
    }

    fn storyboard() -> Vec<ComponentDef> {
        vec![ComponentDef {
            name: "App".to_string(),
            root_element: element(
                "Storyboard",
                "sb",
                vec![element(
                    "Scene",
                    "scene",
                    vec![
                        element("div", "card", vec![]),
                        element("div", "hero", vec![]),
                    ],
                )],
            ),
            arbitrary_block: None,
        }]
    }

    #[test]
    fn find_resolves_nested_paths() {
        let components = storyboard();
        let path = ElementPath::from_strs(&["sb", "scene", "hero"]);
        let found = find_element_at_path(&components, &path).expect("path should resolve");
        assert_eq!(found.uid().as_str(), "hero");

        let missing = ElementPath::from_strs(&["sb", "scene", "nope"]);
        assert!(find_element_at_path(&components, &missing).is_none());
    }

    #[test]
    fn find_descends_transparent_fragments() {
        let components = vec![ComponentDef {
            name: "App".to_string(),
            root_element: element(
                "Storyboard",
                "sb",
                vec![fragment("frag", vec![element("div", "inner", vec![])])],
            ),
            arbitrary_block: None,
        }];
        // The fragment does not appear in the path.
        let path = ElementPath::from_strs(&["sb", "inner"]);
        let found = find_element_at_path(&components, &path).expect("fragment is transparent");
        assert_eq!(found.uid().as_str(), "inner");
    }

    #[test]
    fn insert_then_find_returns_the_new_child() {
        let mut components = storyboard();
        let parent = ElementPath::from_strs(&["sb", "scene"]);
        let new_child = element("div", "fresh", vec![]);
        assert!(insert_element_child(
            &mut components,
            Some(&parent),
            new_child,
            Some(1),
            None,
        ));

        let path = parent.append(Uid::intern("fresh"));
        let found = find_element_at_path(&components, &path).expect("inserted child resolves");
        assert_eq!(found.uid().as_str(), "fresh");
        assert_eq!(
            z_index_of_element(
                &[TopLevelElement::Component(components[0].clone())],
                &path
            ),
            1
        );
    }

    #[test]
    fn insert_without_parent_falls_back_to_storyboard() {
        let mut components = storyboard();
        let root = ElementPath::from_strs(&["sb"]);
        assert!(insert_element_child(
            &mut components,
            None,
            element("div", "floating", vec![]),
            None,
            Some(&root),
        ));
        let path = ElementPath::from_strs(&["sb", "floating"]);
        assert!(find_element_at_path(&components, &path).is_some());
    }

    #[test]
    fn insert_with_unresolvable_parent_is_a_no_op() {
        let mut components = storyboard();
        let before = components.clone();
        let bogus = ElementPath::from_strs(&["sb", "nope"]);
        assert!(!insert_element_child(
            &mut components,
            Some(&bogus),
            element("div", "x", vec![]),
            None,
            None,
        ));
        assert_eq!(components, before);
    }

    #[test]
    fn transform_errors_on_unresolvable_path() {
        let mut components = storyboard();
        let bogus = ElementPath::from_strs(&["sb", "ghost"]);
        let result = transform_element_at_path(&mut components, &bogus, &mut |el| el);
        let message = result.expect_err("bad path must error");
        assert!(message.contains("sb/ghost"), "got: {message}");
    }

    #[test]
    fn transform_rewrites_the_target_in_place() {
        let mut components = storyboard();
        let path = ElementPath::from_strs(&["sb", "scene", "card"]);
        transform_element_at_path(&mut components, &path, &mut |mut el| {
            el.name = "section".to_string();
            el
        })
        .unwrap();

        let found = find_element_at_path(&components, &path).unwrap();
        match found {
            ElementChild::Element(el) => assert_eq!(el.name, "section"),
            other => panic!("expected element, got {other:?}"),
        }
    }

    #[test]
    fn remove_strips_target_and_fragment_duplicates() {
        // The target uid also appears inside a fragment child of the parent.
        let mut components = vec![ComponentDef {
            name: "App".to_string(),
            root_element: element(
                "Storyboard",
                "sb",
                vec![element(
                    "Scene",
                    "scene",
                    vec![
                        element("div", "card", vec![]),
                        fragment("frag", vec![element("div", "card", vec![])]),
                    ],
                )],
            ),
            arbitrary_block: None,
        }];
        let target = ElementPath::from_strs(&["sb", "scene", "card"]);
        assert!(remove_element_child(&mut components, &target));

        assert!(find_element_at_path(&components, &target).is_none());
        // The fragment itself survives, emptied.
        match find_element_at_path(&components, &ElementPath::from_strs(&["sb", "scene"])) {
            Some(ElementChild::Element(scene)) => {
                assert_eq!(scene.children.len(), 1);
                match &scene.children[0] {
                    ElementChild::Fragment(frag) => assert!(frag.children.is_empty()),
                    other => panic!("expected fragment, got {other:?}"),
                }
            }
            other => panic!("expected scene element, got {other:?}"),
        }
    }

    #[test]
    fn z_index_is_minus_one_for_unknown_targets() {
        let components = storyboard();
        let top_level = vec![TopLevelElement::Component(components[0].clone())];
        let bogus = ElementPath::from_strs(&["sb", "scene", "ghost"]);
        assert_eq!(z_index_of_element(&top_level, &bogus), -1);
    }

    #[test]
    fn strict_uid_collection_reports_duplicates_with_actions() {
        let source = ParsedSource::new(vec![TopLevelElement::Component(ComponentDef {
            name: "App".to_string(),
            root_element: element(
                "Storyboard",
                "sb",
                vec![element("div", "dup", vec![]), element("div", "dup", vec![])],
            ),
            arbitrary_block: None,
        })]);

        let err = get_all_unique_uids([&source], Some("PASTE_ELEMENT")).unwrap_err();
        assert!(err.contains("duplicate UID"), "got: {err}");
        assert!(err.contains("PASTE_ELEMENT"), "got: {err}");

        // Non-strict tolerates the duplicate.
        let uids = get_all_unique_uids([&source], None).unwrap();
        assert!(uids.contains(&Uid::intern("dup")));
    }

    #[test]
    fn guarantee_unique_uids_rewrites_collisions() {
        let mut existing = UidSet::new();
        existing.insert(Uid::intern("taken"));

        let mut elements = vec![element("div", "taken", vec![element("span", "free", vec![])])];
        guarantee_unique_uids(&mut elements, &mut existing);

        let ElementChild::Element(el) = &elements[0] else {
            panic!("expected element");
        };
        assert_ne!(el.uid.as_str(), "taken");
        // data-uid attribute follows the rewritten uid
        match get_jsx_attribute(&el.attributes, "data-uid") {
            Some(Expression::Value {
                value: SimpleValue::Text(s),
                ..
            }) => assert_eq!(s, el.uid.as_str()),
            other => panic!("expected data-uid, got {other:?}"),
        }
        assert_eq!(el.children[0].uid().as_str(), "free");
    }
}
