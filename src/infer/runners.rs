//! Inference runner
//!
//! Entry point for one diagram:
//! - prepare the working label set (splice snapping, generated ids)
//! - run the horizontal stage, then the independent strategies in parallel
//! - run the color trace over everything found so far
//! - merge

use std::time::Instant;

use indexmap::IndexMap;
use log::{debug, info};
use rayon::prelude::*;

use super::error::InputError;
use super::ids::IdGenerator;
use super::labels::LabelCategory;
use super::merge::{merge, StrategyOutput};
use super::resolver::ConnectorResolver;
use super::rules::InferenceRules;
use super::spatial::LabelIndex;
use super::strategies::{
    parallel_strategies, ColorTraceStrategy, ExtractionStrategy, HorizontalWireStrategy,
    StrategyContext,
};
use super::types::{Connection, Diagram, Dot, Label, Point};

/// Height of a generated connector label above its pin
const ORPHAN_CONNECTOR_LIFT: f32 = 10.0;

/// Result of one inference run
#[derive(Debug, Clone)]
pub struct InferenceOutput {
    /// Final merged and sorted connections
    pub connections: Vec<Connection>,
    /// Raw candidate count per strategy, in run order
    pub strategy_counts: IndexMap<&'static str, usize>,
    /// Labels added by the prepare stage
    pub generated_labels: usize,
}

fn nearest_dot(dots: &[Dot], position: Point, max_distance: f32) -> Option<&Dot> {
    let mut best: Option<(&Dot, f32)> = None;
    for dot in dots {
        let distance = Point::new(dot.cx, dot.cy).distance(&position);
        if distance < max_distance && best.map_or(true, |(_, d)| distance < d) {
            best = Some((dot, distance));
        }
    }
    best.map(|(dot, _)| dot)
}

/// Working label set for one run.
///
/// Splice labels move onto the nearest dot, since the dot marks the real
/// junction. Dots with no splice label nearby get a generated splice id.
/// With `synthesize_orphan_connectors`, pins with no connector above them get
/// a generated connector label just above the pin.
pub fn prepare_labels(diagram: &Diagram, rules: &InferenceRules, ids: &mut IdGenerator) -> Vec<Label> {
    let dots = &diagram.geometry.dots;
    let mut labels: Vec<Label> = diagram
        .labels
        .iter()
        .map(|label| {
            if label.category() != LabelCategory::SpliceId {
                return label.clone();
            }
            match nearest_dot(dots, label.position(), rules.splice_snap_distance) {
                Some(dot) => label.moved_to(dot.cx, dot.cy),
                None => label.clone(),
            }
        })
        .collect();
    let original = labels.len();

    for dot in dots {
        let center = Point::new(dot.cx, dot.cy);
        let labelled = labels.iter().any(|l| {
            l.category() == LabelCategory::SpliceId && l.position().distance(&center) < rules.id_proximity
        });
        if !labelled {
            labels.push(Label::new(ids.splice_id(center), dot.cx, dot.cy));
        }
    }

    if rules.synthesize_orphan_connectors {
        let index = LabelIndex::new(labels.clone());
        let resolver = ConnectorResolver::new(&index, rules);
        let orphans: Vec<Point> = index
            .labels()
            .iter()
            .filter(|l| l.category().is_pin())
            .filter(|l| resolver.resolve_above(l.position(), false, None).is_none())
            .map(Label::position)
            .collect();
        for pin in orphans {
            let id = ids.connector_id(pin);
            labels.push(Label::new(id, pin.x, pin.y - ORPHAN_CONNECTOR_LIFT));
        }
    }

    debug!(
        "[infer] prepared {} labels ({} generated)",
        labels.len(),
        labels.len() - original
    );
    labels
}

/// Infer the connection list of one diagram
pub fn infer_connections(diagram: &Diagram, rules: &InferenceRules) -> Result<InferenceOutput, InputError> {
    rules.validate()?;
    diagram.validate()?;
    let start = Instant::now();

    let mut ids = IdGenerator::new();
    let labels = prepare_labels(diagram, rules, &mut ids);
    let generated_labels = labels.len() - diagram.labels.len();
    let index = LabelIndex::new(labels);
    let geometry = &diagram.geometry;

    let base = StrategyContext::new(&index, &diagram.wire_specs, rules);
    let stage_start = Instant::now();
    let horizontal = HorizontalWireStrategy.extract(geometry, &base);
    debug!(
        "[infer] horizontal: {} candidates in {:?}",
        horizontal.len(),
        stage_start.elapsed()
    );

    let ctx = base.with_horizontal(&horizontal);
    let strategies = parallel_strategies();
    let mut outputs: Vec<StrategyOutput> = strategies
        .par_iter()
        .map(|strategy| {
            let stage_start = Instant::now();
            let found = strategy.extract(geometry, &ctx);
            debug!(
                "[infer] {}: {} candidates in {:?}",
                strategy.name(),
                found.len(),
                stage_start.elapsed()
            );
            StrategyOutput::new(strategy.name(), found)
        })
        .collect();

    let prior: Vec<Connection> = horizontal
        .iter()
        .chain(outputs.iter().flat_map(|o| o.connections.iter()))
        .cloned()
        .collect();
    let trace = ColorTraceStrategy;
    let traced = trace.extract(geometry, &ctx.with_prior(&prior));
    outputs.push(StrategyOutput::new(trace.name(), traced));

    let mut strategy_counts = IndexMap::new();
    strategy_counts.insert(HorizontalWireStrategy.name(), horizontal.len());
    for output in &outputs {
        strategy_counts.insert(output.name, output.connections.len());
    }

    let connections = merge(&horizontal, &outputs);
    info!(
        "[infer] {} connections from {} labels in {:?}",
        connections.len(),
        index.len(),
        start.elapsed()
    );

    Ok(InferenceOutput {
        connections,
        strategy_counts,
        generated_labels,
    })
}
