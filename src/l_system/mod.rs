//! The l_system module provides a small Lindenmayer string rewriter for line-art
//! generation. Take a look at the [`crate::l_system::LSystem`] struct for
//! more details, and examples.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::errors::LSystemError;
use crate::turtle;
use nalgebra::Point3;

/// A single textual production. Any occurrence of `pattern` in the current
/// state has its first symbol replaced by `replacement`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub pattern: String,
    pub replacement: String,
}

impl Rule {
    pub fn new(pattern: &str, replacement: &str) -> Rule {
        Rule {
            pattern: pattern.to_string(),
            replacement: replacement.to_string(),
        }
    }
}

/// Parses the `pattern=replacement` shorthand, e.g. `F=F+F-F`.
impl FromStr for Rule {
    type Err = LSystemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (pattern, replacement) = s
            .trim()
            .split_once('=')
            .ok_or_else(|| LSystemError::InvalidRule(s.to_string()))?;
        if pattern.is_empty() {
            return Err(LSystemError::EmptyPattern);
        }
        Ok(Rule::new(pattern, replacement))
    }
}

/// # LSystem
///
/// What it says on the box; a deterministic, context-free L-system with the
/// turtle parameters needed to draw it.
///
/// # Example
///
/// ```rust
/// use lsystem_turtle::l_system::{LSystem, Rule};
/// use std::f32::consts::PI;
///
/// let dragon = LSystem::new("FX", "F", PI / 2.0)
///     .with_rule(Rule::new("X", "X+YF+"))
///     .with_rule(Rule::new("Y", "-FX-Y"));
///
/// assert_eq!(dragon.expand(1), "FX+YF+");
/// let vertices = dragon.interpret(1).unwrap();
/// assert_eq!(vertices.len(), 2);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LSystem {
    pub axiom: String,
    pub rules: Vec<Rule>,
    /// Symbols that move the turtle forward and emit a segment.
    pub draw_alphabet: String,
    /// Radians added by `+` and removed by `-`.
    pub turn_angle: f32,
    /// Initial turtle heading, in radians.
    #[serde(default)]
    pub start_heading: f32,
}

impl Default for LSystem {
    /// The custom slot placeholder: a single binary branching rule.
    fn default() -> Self {
        LSystem::new("0", "0", std::f32::consts::PI / 4.0).with_rule(Rule::new("0", "0[0]0"))
    }
}

/// Rules with their pattern/replacement split into symbols once per expansion.
struct Compiled {
    pattern: Vec<char>,
    replacement: Vec<char>,
}

impl LSystem {
    pub fn new(axiom: &str, draw_alphabet: &str, turn_angle: f32) -> LSystem {
        LSystem {
            axiom: axiom.to_string(),
            rules: vec![],
            draw_alphabet: draw_alphabet.to_string(),
            turn_angle,
            start_heading: 0.0,
        }
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_start_heading(mut self, start_heading: f32) -> Self {
        self.start_heading = start_heading;
        self
    }

    /// Appends a rule given in `pattern=replacement` form.
    pub fn add_rule(&mut self, rule: &str) -> Result<&mut Self, LSystemError> {
        self.rules.push(rule.parse()?);
        Ok(self)
    }

    /// Checks the invariants expansion relies on.
    pub fn validate(&self) -> Result<(), LSystemError> {
        if self.rules.iter().any(|rule| rule.pattern.is_empty()) {
            return Err(LSystemError::EmptyPattern);
        }
        Ok(())
    }

    fn compile(&self) -> Vec<Compiled> {
        self.rules
            .iter()
            .filter(|rule| !rule.pattern.is_empty())
            .map(|rule| Compiled {
                pattern: rule.pattern.chars().collect(),
                replacement: rule.replacement.chars().collect(),
            })
            .collect()
    }

    /// One rewriting generation. Returns None when no rule matched, in which
    /// case every later generation is identical too.
    ///
    /// Every match is recorded against the untouched state before anything
    /// is rewritten. Occurrences may overlap: the search resumes one symbol
    /// after each match start. Where two rules hit the same position the one
    /// listed first wins. Records are then applied from the highest position
    /// down, so the lower positions still index the original symbols.
    fn step(rules: &[Compiled], state: &[char]) -> Option<Vec<char>> {
        let mut matches: BTreeMap<usize, &[char]> = BTreeMap::new();
        for rule in rules {
            if rule.pattern.len() > state.len() {
                continue;
            }
            state
                .windows(rule.pattern.len())
                .enumerate()
                .filter(|(_, window)| *window == rule.pattern.as_slice())
                .for_each(|(position, _)| {
                    matches
                        .entry(position)
                        .or_insert(rule.replacement.as_slice());
                });
        }
        if matches.is_empty() {
            return None;
        }

        // Equivalent to overwriting state[position] with the replacement's
        // first symbol and inserting the rest after it, highest position first.
        let mut chunks: Vec<&[char]> = Vec::with_capacity(matches.len() * 2 + 1);
        let mut end = state.len();
        for (&position, &replacement) in matches.iter().rev() {
            chunks.push(&state[position + 1..end]);
            chunks.push(replacement);
            end = position;
        }
        chunks.push(&state[..end]);

        let len = chunks.iter().map(|chunk| chunk.len()).sum();
        let mut next = Vec::with_capacity(len);
        for chunk in chunks.iter().rev() {
            next.extend_from_slice(chunk);
        }
        Some(next)
    }

    /// #expand
    ///
    /// Expands the L-system by the requested number of iterations. Returns a
    /// string representing the state of the L-system. Useful with
    /// [`crate::turtle::TurtleTrait::walk_lpath`].
    ///
    /// There is no internal bound on `iterations`; the state can grow
    /// exponentially so callers must cap it themselves.
    pub fn expand(&self, iterations: u32) -> String {
        let rules = self.compile();
        let mut state: Vec<char> = self.axiom.chars().collect();
        for iteration in 0..iterations {
            match Self::step(&rules, &state) {
                Some(next) => {
                    tracing::trace!(iteration, len = next.len(), "rewrote l-system state");
                    state = next;
                }
                None => {
                    tracing::trace!(iteration, "no rule matched, expansion is stable");
                    break;
                }
            }
        }
        state.into_iter().collect()
    }

    /// Iterates over the axiom followed by every successive generation.
    /// Ends at the first generation no rule matches.
    pub fn expansions(&self) -> impl Iterator<Item = String> {
        let rules = self.compile();
        let axiom: Vec<char> = self.axiom.chars().collect();
        std::iter::successors(Some(axiom), move |state| Self::step(&rules, state))
            .map(|state| state.into_iter().collect())
    }

    /// Expands then walks the result with this system's own turtle settings.
    pub fn interpret(&self, iterations: u32) -> Result<Vec<Point3<f32>>, LSystemError> {
        turtle::interpret(
            &self.expand(iterations),
            &self.draw_alphabet,
            self.turn_angle,
            self.start_heading,
        )
    }

    pub fn from_ron_str(data: &str) -> Result<LSystem> {
        let system: LSystem = ron::from_str(data)?;
        system.validate()?;
        Ok(system)
    }

    pub fn to_ron_string(&self) -> Result<String> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    /// Loads a grammar definition, e.g.
    ///
    /// ```ron
    /// (
    ///     axiom: "F",
    ///     rules: [(pattern: "F", replacement: "F[+F]F[-F]F")],
    ///     draw_alphabet: "F",
    ///     turn_angle: 0.4487,
    ///     start_heading: 1.5708,
    /// )
    /// ```
    pub fn from_file(path: &Path) -> Result<LSystem> {
        let mut reader = std::fs::File::open(path)
            .with_context(|| format!("opening grammar file {}", path.display()))?;
        let mut data = String::new();
        reader.read_to_string(&mut data)?;
        LSystem::from_ron_str(&data)
            .with_context(|| format!("parsing grammar file {}", path.display()))
    }
}
