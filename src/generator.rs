//! Glue between the catalog, the rewriter and the turtle: turns a request
//! into a vertex stream.

use nalgebra::Point3;
use rayon::prelude::*;

use crate::catalog::{self, Resolved, SystemId};
use crate::errors::LSystemError;
use crate::l_system::LSystem;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GenerateOptions {
    /// Fail with [`LSystemError::EmptyResult`] when nothing gets drawn.
    pub reject_empty: bool,
}

/// A catalog lookup: numeric system id plus iteration count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Request {
    pub system_id: u32,
    pub iterations: u32,
}

impl Request {
    pub fn new(system: SystemId, iterations: u32) -> Request {
        Request {
            system_id: system.id(),
            iterations,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Generated {
    pub system: SystemId,
    pub iterations: u32,
    pub file_name: String,
    pub vertices: Vec<Point3<f32>>,
}

/// Expands `grammar` and walks the result with its own turtle settings.
pub fn generate(
    grammar: &LSystem,
    iterations: u32,
    options: GenerateOptions,
) -> Result<Vec<Point3<f32>>, LSystemError> {
    let expanded = grammar.expand(iterations);
    tracing::debug!(iterations, symbols = expanded.chars().count(), "expanded l-system");
    let vertices = crate::turtle::interpret(
        &expanded,
        &grammar.draw_alphabet,
        grammar.turn_angle,
        grammar.start_heading,
    )?;
    if vertices.is_empty() && options.reject_empty {
        return Err(LSystemError::EmptyResult);
    }
    tracing::debug!(vertices = vertices.len(), "interpreted l-system");
    Ok(vertices)
}

/// Generates an already resolved grammar.
pub fn generate_resolved(
    resolved: &Resolved,
    iterations: u32,
    options: GenerateOptions,
) -> Result<Generated, LSystemError> {
    let vertices = generate(&resolved.grammar, iterations, options)?;
    tracing::info!(
        system = %resolved.system,
        iterations,
        vertices = vertices.len(),
        "generated"
    );
    Ok(Generated {
        system: resolved.system,
        iterations,
        file_name: resolved.file_name.clone(),
        vertices,
    })
}

pub fn generate_request(request: Request, options: GenerateOptions) -> Result<Generated, LSystemError> {
    let resolved = catalog::resolve(request.system_id, request.iterations)?;
    generate_resolved(&resolved, request.iterations, options)
}

/// Runs independent requests across the rayon pool. Results come back in
/// request order.
pub fn generate_many(
    requests: &[Request],
    options: GenerateOptions,
) -> Vec<Result<Generated, LSystemError>> {
    requests
        .par_iter()
        .map(|request| generate_request(*request, options))
        .collect()
}
