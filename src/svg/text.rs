//! Text labels
//!
//! Label positions come from the `transform` matrix drawing tools put on
//! `<text>` elements, falling back to `x`/`y` attributes.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::infer::labels::LabelCategory;
use crate::infer::Label;
use crate::parse_xml::XmlNode;

static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?").expect("number pattern"));
static OPTION_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\([A-Z]+[+-]\)$").expect("option pattern"));

/// Horizontal reach of an option suffix to its connector
const OPTION_MAX_DX: f32 = 30.0;
const OPTION_MAX_DY: f32 = 3.0;
/// Stacked shielded pair window
const PAIR_MAX_DX: f32 = 30.0;
const PAIR_MIN_DY: f32 = 5.0;
const PAIR_MAX_DY: f32 = 20.0;

/// Baseline shift that makes a tspan a new line
const BASELINE_TOLERANCE: f32 = 1.0;

const XR_MINUS: &str = "(XR-)";
const XR_PLUS: &str = "(XR+)";

fn numbers(text: &str) -> Vec<f32> {
    NUMBER
        .find_iter(text)
        .filter_map(|m| m.as_str().parse::<f32>().ok())
        .collect()
}

/// Translation part of a `matrix(a b c d e f)` or `translate(x y)` transform
pub fn transform_position(transform: &str) -> Option<(f32, f32)> {
    let transform = transform.trim();
    if let Some(args) = transform.strip_prefix("matrix(") {
        let values = numbers(args);
        return (values.len() >= 6).then(|| (values[4], values[5]));
    }
    if let Some(args) = transform.strip_prefix("translate(") {
        let values = numbers(args);
        return match values.as_slice() {
            [x, y, ..] => Some((*x, *y)),
            [x] => Some((*x, 0.0)),
            [] => None,
        };
    }
    None
}

fn first_number(value: &str) -> Option<f32> {
    numbers(value).first().copied()
}

/// Appends the text of `node` and its `<tspan>` children to `lines`. Pieces
/// on one baseline are concatenated (kerned words arrive as several tspans);
/// a tspan on another baseline starts a new line.
fn collect_lines(node: &XmlNode, lines: &mut Vec<String>, baseline: &mut Option<f32>) {
    let y = node.attr("y").and_then(first_number);
    let dy = node.attr("dy").and_then(first_number).unwrap_or(0.0);
    let moved = matches!((y, *baseline), (Some(y), Some(b)) if (y - b).abs() > BASELINE_TOLERANCE);
    if (moved || dy.abs() > BASELINE_TOLERANCE) && lines.last().map_or(false, |l| !l.is_empty()) {
        lines.push(String::new());
    }
    if y.is_some() {
        *baseline = y;
    }

    if let Some(line) = lines.last_mut() {
        line.push_str(node.text_content.trim());
    }
    for child in &node.children {
        collect_lines(child, lines, baseline);
    }
}

/// Label for a `<text>` element; `None` when it has no position or content
pub fn text_label(node: &XmlNode) -> Option<Label> {
    let mut lines = vec![String::new()];
    collect_lines(node, &mut lines, &mut None);
    let content = lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    if content.is_empty() {
        return None;
    }

    let position = match node.attr("transform").and_then(transform_position) {
        Some(position) => Some(position),
        None => {
            let x = node.attr("x").and_then(first_number);
            let y = node.attr("y").and_then(first_number);
            x.zip(y)
        }
    }?;
    Some(Label::new(content, position.0, position.1))
}

fn is_plain_connector(label: &Label) -> bool {
    label.category() == LabelCategory::ConnectorId
}

/// Join option suffixes such as `(XR-)` onto the connector to their left,
/// then stack shielded `(XR-)`/`(XR+)` pairs into one two-line label
pub fn merge_multiline_connectors(labels: Vec<Label>) -> Vec<Label> {
    stack_shielded_pairs(attach_options(labels))
}

fn attach_options(labels: Vec<Label>) -> Vec<Label> {
    // option index -> connector index
    let mut owner: Vec<Option<usize>> = vec![None; labels.len()];
    for (i, option) in labels.iter().enumerate() {
        if !OPTION_SUFFIX.is_match(option.content()) {
            continue;
        }
        owner[i] = labels.iter().enumerate().position(|(j, other)| {
            j != i
                && is_plain_connector(other)
                && other.x < option.x
                && (other.y - option.y).abs() < OPTION_MAX_DY
                && (option.x - other.x).abs() < OPTION_MAX_DX
        });
    }

    let mut merged = Vec::with_capacity(labels.len());
    for (i, label) in labels.iter().enumerate() {
        if owner[i].is_some() {
            continue;
        }
        let mut suffixes: Vec<&Label> = owner
            .iter()
            .enumerate()
            .filter(|(_, o)| **o == Some(i))
            .map(|(opt, _)| &labels[opt])
            .collect();
        if suffixes.is_empty() {
            merged.push(label.clone());
            continue;
        }
        suffixes.sort_by(|a, b| a.x.total_cmp(&b.x));
        let mut content = label.content().to_string();
        for option in suffixes {
            content.push(' ');
            content.push_str(option.content());
        }
        merged.push(Label::new(content, label.x, label.y));
    }
    merged
}

fn is_shielded(label: &Label) -> bool {
    let content = label.content();
    content.contains(&format!(" {}", XR_MINUS)) || content.contains(&format!(" {}", XR_PLUS))
}

fn stack_shielded_pairs(labels: Vec<Label>) -> Vec<Label> {
    let mut used = vec![false; labels.len()];
    let mut merged = Vec::with_capacity(labels.len());

    for i in 0..labels.len() {
        if used[i] {
            continue;
        }
        used[i] = true;
        let label = &labels[i];
        if !is_shielded(label) {
            merged.push(label.clone());
            continue;
        }

        let partner = (i + 1..labels.len()).find(|&j| {
            let other = &labels[j];
            let dy = (other.y - label.y).abs();
            let opposite = (label.content().contains(XR_MINUS) || other.content().contains(XR_MINUS))
                && (label.content().contains(XR_PLUS) || other.content().contains(XR_PLUS));
            !used[j]
                && is_shielded(other)
                && (other.x - label.x).abs() < PAIR_MAX_DX
                && PAIR_MIN_DY < dy
                && dy < PAIR_MAX_DY
                && opposite
        });

        match partner {
            Some(j) => {
                used[j] = true;
                let other = &labels[j];
                let (minus, plus) = if label.content().contains(XR_MINUS) {
                    (label, other)
                } else {
                    (other, label)
                };
                merged.push(Label::new(
                    format!("{}\n{}", minus.content(), plus.content()),
                    (label.x + other.x) / 2.0,
                    minus.y,
                ));
            }
            None => merged.push(label.clone()),
        }
    }
    merged
}
