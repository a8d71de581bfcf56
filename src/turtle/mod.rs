use nalgebra::{Point3, Vector3};

use crate::errors::LSystemError;

/// # Turtle Module
///
/// Logo-style turtle that walks an expanded L-system and records every step
/// it takes as a pair of vertices (segment start, segment end) in the XY
/// plane.
#[derive(Clone, Debug)]
pub struct Turtle {
    stack: Vec<(Point3<f32>, f32)>,
    vertices: Vec<Point3<f32>>,
    position: Point3<f32>,
    heading: f32,
}

/// Helper function to convert degrees to radians
pub fn degrees(deg: f32) -> f32 {
    std::f32::consts::PI * (deg / 180.0)
}

/// TurtleTrait provides turtle related functions for the Turtle struct.
///
/// # Example
///
/// ```
/// use lsystem_turtle::turtle::{Turtle, TurtleTrait, degrees};
/// let vertices = Turtle::new()
///     .fwd(1.0)
///     .left(degrees(90.0))
///     .fwd(1.0)
///     .into_vertices();
/// assert_eq!(vertices.len(), 4);
/// ```
pub trait TurtleTrait {
    fn new() -> Turtle;
    fn with_heading(self, heading: f32) -> Self;
    fn fwd(self, distance: f32) -> Self;
    fn left(self, angle: f32) -> Self;
    fn right(self, angle: f32) -> Self;
    fn push(self) -> Self;
    fn pop(self) -> Result<Self, LSystemError>
    where
        Self: Sized;
    fn walk_lpath(self, lpath: &str, draw_alphabet: &str, angle: f32) -> Result<Self, LSystemError>
    where
        Self: Sized;
    fn into_vertices(self) -> Vec<Point3<f32>>;
}

impl Turtle {
    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    pub fn heading(&self) -> f32 {
        self.heading
    }

    pub fn vertices(&self) -> &[Point3<f32>] {
        &self.vertices
    }

    /// Number of saved states waiting for a `]`.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl TurtleTrait for Turtle {
    fn new() -> Self {
        Turtle {
            stack: vec![],
            vertices: vec![],
            position: Point3::origin(),
            heading: 0.0,
        }
    }

    fn with_heading(mut self, heading: f32) -> Self {
        self.heading = heading;
        self
    }

    /// Always draws; every step becomes a segment.
    fn fwd(mut self, distance: f32) -> Self {
        let pos = self.position
            + Vector3::new(
                distance * self.heading.cos(),
                distance * self.heading.sin(),
                0.0,
            );
        self.vertices.push(self.position);
        self.vertices.push(pos);
        self.position = pos;
        self
    }

    fn left(mut self, angle: f32) -> Self {
        self.heading += angle;
        self
    }

    fn right(mut self, angle: f32) -> Self {
        self.heading -= angle;
        self
    }

    fn push(mut self) -> Self {
        self.stack.push((self.position, self.heading));
        self
    }

    fn pop(mut self) -> Result<Self, LSystemError> {
        let (position, heading) = self
            .stack
            .pop()
            .ok_or(LSystemError::PoppedEmptyStack)?;
        self.position = position;
        self.heading = heading;
        Ok(self)
    }

    /// Draw symbols take a unit step, `+`/`-` turn left/right by `angle`,
    /// `[`/`]` save and restore position and heading. Everything else is a
    /// structural symbol and is skipped.
    fn walk_lpath(mut self, lpath: &str, draw_alphabet: &str, angle: f32) -> Result<Self, LSystemError> {
        let draws = lpath.chars().filter(|c| draw_alphabet.contains(*c)).count();
        self.vertices.reserve(draws * 2);
        for (index, c) in lpath.chars().enumerate() {
            self = if draw_alphabet.contains(c) {
                self.fwd(1.0)
            } else {
                match c {
                    '[' => self.push(),
                    ']' => self
                        .pop()
                        .map_err(|_| LSystemError::UnbalancedStructure { index })?,
                    '+' => self.left(angle),
                    '-' => self.right(angle),
                    _ => self,
                }
            };
        }
        Ok(self)
    }

    fn into_vertices(self) -> Vec<Point3<f32>> {
        self.vertices
    }
}

/// Runs a fresh turtle over `expanded`, starting at the origin facing
/// `start_heading`. Yields two vertices per draw symbol in emission order.
pub fn interpret(
    expanded: &str,
    draw_alphabet: &str,
    turn_angle: f32,
    start_heading: f32,
) -> Result<Vec<Point3<f32>>, LSystemError> {
    Ok(Turtle::new()
        .with_heading(start_heading)
        .walk_lpath(expanded, draw_alphabet, turn_angle)?
        .into_vertices())
}

#[cfg(test)]
mod tests {
    use super::{degrees, interpret, Turtle, TurtleTrait};
    use crate::errors::LSystemError;
    use crate::l_system::{LSystem, Rule};
    use nalgebra::Point3;

    fn close(a: &Point3<f32>, b: &Point3<f32>) -> bool {
        (a - b).norm() < 0.0001
    }

    #[test]
    fn test_walk_lsystem() {
        let system = LSystem::new("A", "AB", degrees(90.0))
            .with_rule(Rule::new("A", "A+B"))
            .with_rule(Rule::new("B", "A"));
        // "A+B+A": east, north, west.
        let expanded = system.expand(2);
        assert_eq!(expanded, "A+B+A");
        let t = Turtle::new()
            .walk_lpath(&expanded, &system.draw_alphabet, system.turn_angle)
            .unwrap();
        assert!(close(&t.position(), &Point3::new(0.0, 1.0, 0.0)));
        assert_eq!(t.vertices().len(), 6);
    }

    #[test]
    fn test_stack() {
        let t = Turtle::new()
            .push()
            .fwd(100.0)
            .right(degrees(90.0))
            .fwd(100.0)
            .pop()
            .unwrap();
        assert_eq!(t.position(), Point3::origin());
        assert_eq!(t.heading(), 0.0);
        assert_eq!(t.vertices().len(), 4);
    }

    #[test]
    fn test_vertex_count_and_connectivity() {
        let vertices = interpret("FFxFyF", "F", degrees(90.0), 0.0).unwrap();
        assert_eq!(vertices.len(), 8);
        for pair in vertices.chunks(2).collect::<Vec<_>>().windows(2) {
            assert_eq!(pair[0][1], pair[1][0]);
        }
        assert!(close(vertices.last().unwrap(), &Point3::new(4.0, 0.0, 0.0)));
    }

    #[test]
    fn test_simple_box() {
        let vertices = interpret("F+F+F+F", "F", degrees(90.0), 0.0).unwrap();
        let corners = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
        ];
        for (i, segment) in vertices.chunks(2).enumerate() {
            assert!(close(&segment[0], &corners[i]));
            assert!(close(&segment[1], &corners[i + 1]));
        }
    }

    #[test]
    fn test_start_heading_and_z() {
        let vertices = interpret("F", "F", 0.0, degrees(90.0)).unwrap();
        assert!(close(&vertices[1], &Point3::new(0.0, 1.0, 0.0)));
        assert!(vertices.iter().all(|v| v.z == 0.0));
    }

    #[test]
    fn test_branches_restore_state() {
        let vertices = interpret("F[+F]F", "F", degrees(90.0), 0.0).unwrap();
        assert_eq!(vertices.len(), 6);
        // The third segment resumes from the end of the first.
        assert_eq!(vertices[4], vertices[1]);
        assert!(close(&vertices[5], &Point3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_balanced_never_errors() {
        for lpath in ["[]", "[[F]F]", "F[+F[-F]]F", "[[[[]]]]", "[F"] {
            assert!(interpret(lpath, "F", 1.0, 0.0).is_ok(), "{}", lpath);
        }
    }

    #[test]
    fn test_unbalanced_pop() {
        assert_eq!(
            interpret("F]", "F", 1.0, 0.0),
            Err(LSystemError::UnbalancedStructure { index: 1 })
        );
        assert_eq!(
            interpret("[F]]F", "F", 1.0, 0.0),
            Err(LSystemError::UnbalancedStructure { index: 3 })
        );
        assert_eq!(Turtle::new().pop().unwrap_err(), LSystemError::PoppedEmptyStack);
    }

    #[test]
    fn test_pop_after_walk_has_no_stale_index() {
        let t = Turtle::new().walk_lpath("FF[F", "F", 1.0).unwrap();
        assert_eq!(t.depth(), 1);
        let t = t.pop().unwrap();
        assert_eq!(t.pop().unwrap_err(), LSystemError::PoppedEmptyStack);

        // A second walk reports positions within its own path.
        let t = Turtle::new().walk_lpath("FFFF", "F", 1.0).unwrap();
        assert_eq!(
            t.walk_lpath("]", "F", 1.0).unwrap_err(),
            LSystemError::UnbalancedStructure { index: 0 }
        );
    }

    #[test]
    fn test_draw_alphabet_checked_first() {
        let vertices = interpret("+", "+", 1.0, 0.0).unwrap();
        assert_eq!(vertices.len(), 2);
    }

    #[test]
    fn test_empty_and_structural_only() {
        assert!(interpret("", "F", 1.0, 0.0).unwrap().is_empty());
        assert!(interpret("XY+-[]", "F", 1.0, 0.0).unwrap().is_empty());
    }
}
