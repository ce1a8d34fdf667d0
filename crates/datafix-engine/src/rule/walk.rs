//! Path-based traversal support for `everywhere`.
//!
//! Traversal state lives on the heap: positions are collected breadth-first
//! into a queue, and path reads/writes are iterative loops, so arbitrarily
//! deep trees (1024+ levels) never exhaust the call stack.

use std::collections::VecDeque;

use datafix_schema::{DataType, Schema, TypeTemplate};
use datafix_tree::TreeOps;

/// One step from a node to a child.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PathStep {
    Key(String),
    Index(usize),
}

/// A structural position: where it sits and what type it carries.
#[derive(Debug, Clone)]
pub(crate) struct Position {
    pub path: Vec<PathStep>,
    pub depth: usize,
    pub data_type: DataType,
}

/// Reads the value at `path`, or `None` if the shape no longer matches.
pub(crate) fn get_at_path<O: TreeOps>(
    ops: &O,
    root: &O::Value,
    path: &[PathStep],
) -> Option<O::Value> {
    let mut current = root.clone();
    for step in path {
        current = match step {
            PathStep::Key(key) => ops.get(&current, key)?,
            PathStep::Index(index) => ops
                .list_items(&current)
                .into_result()
                .ok()?
                .get(*index)?
                .clone(),
        };
    }
    Some(current)
}

/// Rebuilds `root` with the value at `path` replaced. A path that no longer
/// matches the shape leaves the root unchanged.
pub(crate) fn set_at_path<O: TreeOps>(
    ops: &O,
    root: &O::Value,
    path: &[PathStep],
    replacement: O::Value,
) -> O::Value {
    if path.is_empty() {
        return replacement;
    }

    // walk down, keeping each ancestor
    let mut spine = Vec::with_capacity(path.len());
    let mut current = root.clone();
    for step in path {
        spine.push(current.clone());
        current = match step {
            PathStep::Key(key) => match ops.get(&current, key) {
                Some(v) => v,
                None => return root.clone(),
            },
            PathStep::Index(index) => match ops.list_items(&current).into_result() {
                Ok(items) if *index < items.len() => items[*index].clone(),
                _ => return root.clone(),
            },
        };
    }

    // fold back up
    let mut acc = replacement;
    for (parent, step) in spine.into_iter().zip(path.iter()).rev() {
        acc = match step {
            PathStep::Key(key) => ops.set(&parent, key, acc),
            PathStep::Index(index) => match ops.list_items(&parent).into_result() {
                Ok(mut items) => {
                    items[*index] = acc;
                    ops.create_list(items)
                }
                Err(_) => return root.clone(),
            },
        };
    }
    acc
}

/// Collects every structural position of `root` in breadth-first order:
/// map entry values, list elements, choice tags and variant fields.
pub(crate) fn collect_positions<O: TreeOps>(
    schema: &Schema,
    ops: &O,
    root_type: &DataType,
    root: &O::Value,
) -> Vec<Position> {
    let mut queue: VecDeque<(Vec<PathStep>, DataType, usize)> = VecDeque::new();
    let mut positions = Vec::new();
    queue.push_back((Vec::new(), root_type.clone(), 0));

    while let Some((path, data_type, depth)) = queue.pop_front() {
        let resolved = resolve_refs(schema, data_type);
        let Some(value) = get_at_path(ops, root, &path) else {
            continue;
        };
        positions.push(Position {
            path: path.clone(),
            depth,
            data_type: resolved.clone(),
        });

        match resolved.template() {
            TypeTemplate::Field { name, value: inner }
            | TypeTemplate::Optional {
                name, value: inner, ..
            } => {
                if ops.get(&value, name).is_some() {
                    queue.push_back((
                        extend(&path, PathStep::Key(name.clone())),
                        DataType::unnamed((**inner).clone()),
                        depth + 1,
                    ));
                }
            }
            TypeTemplate::List(element) => {
                if let Ok(items) = ops.list_items(&value).into_result() {
                    for index in 0..items.len() {
                        queue.push_back((
                            extend(&path, PathStep::Index(index)),
                            DataType::unnamed((**element).clone()),
                            depth + 1,
                        ));
                    }
                }
            }
            TypeTemplate::And(parts) => {
                enqueue_record_parts(parts, &path, depth, ops, &value, &mut queue);
            }
            TypeTemplate::Choice {
                tag_field,
                variants,
            } => {
                // tag entry first, then the matched variant's fields
                let tag_value = ops.get(&value, tag_field);
                if tag_value.is_some() {
                    queue.push_back((
                        extend(&path, PathStep::Key(tag_field.clone())),
                        DataType::unnamed(TypeTemplate::Str),
                        depth + 1,
                    ));
                }
                let tag = tag_value.and_then(|t| ops.as_string(&t).into_result().ok());
                if let Some(tag) = tag {
                    if let Some((_, body)) = variants.iter().find(|(t, _)| *t == tag) {
                        if let TypeTemplate::And(parts) = body {
                            enqueue_record_parts(parts, &path, depth, ops, &value, &mut queue);
                        }
                    }
                }
            }
            _ => {}
        }
    }
    positions
}

fn enqueue_record_parts<O: TreeOps>(
    parts: &[TypeTemplate],
    path: &[PathStep],
    depth: usize,
    ops: &O,
    value: &O::Value,
    queue: &mut VecDeque<(Vec<PathStep>, DataType, usize)>,
) {
    for part in parts {
        if let TypeTemplate::Field { name, value: inner }
        | TypeTemplate::Optional {
            name, value: inner, ..
        } = part
        {
            if ops.get(value, name).is_some() {
                queue.push_back((
                    extend(path, PathStep::Key(name.clone())),
                    DataType::unnamed((**inner).clone()),
                    depth + 1,
                ));
            }
        }
    }
}

/// Chases `Ref` templates through the schema chain. An unresolved reference
/// is left in place; the caller simply finds no children under it.
fn resolve_refs(schema: &Schema, data_type: DataType) -> DataType {
    let mut current = data_type;
    for _ in 0..64 {
        match current.template() {
            TypeTemplate::Ref(reference) => match schema.get_type(reference) {
                Ok(resolved) => current = resolved,
                Err(_) => break,
            },
            _ => break,
        }
    }
    current
}

fn extend(path: &[PathStep], step: PathStep) -> Vec<PathStep> {
    let mut extended = path.to_vec();
    extended.push(step);
    extended
}
