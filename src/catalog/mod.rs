//! The fixed table of named L-systems, and the cache file name each
//! `(system, iterations)` request maps to.

use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;

use crate::errors::LSystemError;
use crate::l_system::{LSystem, Rule};
use crate::turtle::degrees;

/// Extension shared by every cached vertex file.
pub const FILE_EXTENSION: &str = "bin";

/// The always-overwritten slot for custom or not-yet-named output.
pub const SCRATCH_FILE_NAME: &str = "default.bin";

/// Catalog identifiers. The discriminants are the public numeric ids; 0 is
/// reserved for a grammar supplied by the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum SystemId {
    Custom = 0,
    FractalTree = 1,
    SierpinskiTriangle = 2,
    SierpinskiArrowhead = 3,
    DragonCurve = 4,
    FractalPlant = 5,
    HilbertCurve = 6,
    SimpleCurve1 = 7,
    SimpleCurve2 = 8,
    Bushes1 = 9,
    Bushes2 = 10,
    Bushes3 = 11,
    Bushes4 = 12,
    Crystals = 13,
    Snowflake1 = 14,
}

static ALL: [SystemId; 15] = [
    SystemId::Custom,
    SystemId::FractalTree,
    SystemId::SierpinskiTriangle,
    SystemId::SierpinskiArrowhead,
    SystemId::DragonCurve,
    SystemId::FractalPlant,
    SystemId::HilbertCurve,
    SystemId::SimpleCurve1,
    SystemId::SimpleCurve2,
    SystemId::Bushes1,
    SystemId::Bushes2,
    SystemId::Bushes3,
    SystemId::Bushes4,
    SystemId::Crystals,
    SystemId::Snowflake1,
];

impl SystemId {
    pub fn all() -> &'static [SystemId] {
        &ALL
    }

    /// Every id except [`SystemId::Custom`].
    pub fn predefined() -> impl Iterator<Item = SystemId> {
        ALL.iter().copied().filter(|id| *id != SystemId::Custom)
    }

    pub fn id(self) -> u32 {
        self as u32
    }

    /// Prefix used in cache file names.
    pub fn token(self) -> &'static str {
        match self {
            SystemId::Custom => "default",
            SystemId::FractalTree => "fractal_tree",
            SystemId::SierpinskiTriangle => "sierpinski_triangle",
            SystemId::SierpinskiArrowhead => "sierpinski_triangle_ah",
            SystemId::DragonCurve => "dragon_curve",
            SystemId::FractalPlant => "fractal_plant",
            SystemId::HilbertCurve => "hilbert_curve",
            SystemId::SimpleCurve1 => "simple_curve1",
            SystemId::SimpleCurve2 => "simple_curve2",
            SystemId::Bushes1 => "bushes1",
            SystemId::Bushes2 => "bushes2",
            SystemId::Bushes3 => "bushes3",
            SystemId::Bushes4 => "bushes4",
            SystemId::Crystals => "crystals",
            SystemId::Snowflake1 => "snowflake1",
        }
    }

    /// Upper-case display name, as listed by `lsgen list`.
    pub fn name(self) -> &'static str {
        match self {
            SystemId::Custom => "CUSTOM_SYSTEM",
            SystemId::FractalTree => "FRACTAL_TREE",
            SystemId::SierpinskiTriangle => "SIERPINSKI_TRIANGLE",
            SystemId::SierpinskiArrowhead => "SIERPINSKI_TRIANGLE_AH",
            SystemId::DragonCurve => "DRAGON_CURVE",
            SystemId::FractalPlant => "FRACTAL_PLANT",
            SystemId::HilbertCurve => "HILBERT_CURVE",
            SystemId::SimpleCurve1 => "SIMPLE_CURVE1",
            SystemId::SimpleCurve2 => "SIMPLE_CURVE2",
            SystemId::Bushes1 => "BUSHES1",
            SystemId::Bushes2 => "BUSHES2",
            SystemId::Bushes3 => "BUSHES3",
            SystemId::Bushes4 => "BUSHES4",
            SystemId::Crystals => "CRYSTALS",
            SystemId::Snowflake1 => "SNOWFLAKE1",
        }
    }

    /// Iteration count that gives a reasonably detailed drawing without
    /// blowing up the vertex count.
    pub fn recommended_iterations(self) -> u32 {
        match self {
            SystemId::Custom => 4,
            SystemId::FractalTree => 6,
            SystemId::SierpinskiTriangle => 6,
            SystemId::SierpinskiArrowhead => 6,
            SystemId::DragonCurve => 6,
            SystemId::FractalPlant => 5,
            SystemId::HilbertCurve => 6,
            SystemId::SimpleCurve1 => 3,
            SystemId::SimpleCurve2 => 4,
            SystemId::Bushes1 => 5,
            SystemId::Bushes2 => 4,
            SystemId::Bushes3 => 3,
            SystemId::Bushes4 => 11,
            SystemId::Crystals => 3,
            SystemId::Snowflake1 => 3,
        }
    }

    /// A fresh copy of the grammar template for this id. Custom yields the
    /// placeholder [`LSystem::default`].
    pub fn grammar(self) -> LSystem {
        match self {
            SystemId::Custom => LSystem::default(),
            SystemId::FractalTree => LSystem::new("0", "01", PI / 4.0)
                .with_rule(Rule::new("1", "11"))
                .with_rule(Rule::new("0", "1[+0]-0"))
                .with_start_heading(PI / 2.0),
            SystemId::SierpinskiTriangle => LSystem::new("F-G-G", "FG", PI * 2.0 / 3.0)
                .with_rule(Rule::new("F", "F-G+F+G-F"))
                .with_rule(Rule::new("G", "GG")),
            SystemId::SierpinskiArrowhead => LSystem::new("A", "AB", PI / 3.0)
                .with_rule(Rule::new("A", "B-A-B"))
                .with_rule(Rule::new("B", "A+B+A")),
            SystemId::DragonCurve => LSystem::new("FX", "F", PI / 2.0)
                .with_rule(Rule::new("X", "X+YF+"))
                .with_rule(Rule::new("Y", "-FX-Y")),
            SystemId::FractalPlant => LSystem::new("X", "F", degrees(25.0))
                .with_rule(Rule::new("X", "F-[[X]+X]+F[+FX]-X"))
                .with_rule(Rule::new("F", "FF"))
                .with_start_heading(PI / 2.0),
            SystemId::HilbertCurve => LSystem::new("A", "F", PI / 2.0)
                .with_rule(Rule::new("A", "-BF+AFA+FB-"))
                .with_rule(Rule::new("B", "+AF-BFB-FA+")),
            SystemId::SimpleCurve1 => LSystem::new("F+F+F+F", "F", PI / 2.0)
                .with_rule(Rule::new("F", "F+F-F-FF+F+F-F")),
            SystemId::SimpleCurve2 => LSystem::new("F+F+F+F", "F", PI / 2.0)
                .with_rule(Rule::new("F", "FF+F-F+F+FF")),
            SystemId::Bushes1 => LSystem::new("Y", "F", 0.4385496)
                .with_rule(Rule::new("X", "X[-FFF][+FFF]FX"))
                .with_rule(Rule::new("Y", "YFX[+Y][-Y]"))
                .with_start_heading(PI / 2.0),
            SystemId::Bushes2 => LSystem::new("F", "F", 0.3926991)
                .with_rule(Rule::new("F", "FF+[+F-F-F]-[F+F+F]"))
                .with_start_heading(PI),
            SystemId::Bushes3 => LSystem::new("F", "F", 0.610865)
                .with_rule(Rule::new("F", "F[+FF][-FF]F[-F][+F]F"))
                .with_start_heading(PI / 2.0),
            SystemId::Bushes4 => LSystem::new("VZFFF", "F", degrees(20.0))
                .with_rule(Rule::new("V", "[+++W][---W]YV"))
                .with_rule(Rule::new("W", "+X[-W]Z"))
                .with_rule(Rule::new("X", "-W[+X]Z"))
                .with_rule(Rule::new("Y", "YZ"))
                .with_rule(Rule::new("Z", "[-FFF][+FFF]F"))
                .with_start_heading(PI / 2.0),
            SystemId::Crystals => LSystem::new("F+F+F+F", "F", PI / 2.0)
                .with_rule(Rule::new("F", "FF+F++F+F")),
            // The trailing 's' is inert; it has no draw or turn meaning.
            SystemId::Snowflake1 => LSystem::new("F++F++F", "F", PI / 3.0)
                .with_rule(Rule::new("F", "F-F++F-Fs")),
        }
    }
}

impl TryFrom<u32> for SystemId {
    type Error = LSystemError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        ALL.get(value as usize)
            .copied()
            .ok_or(LSystemError::UnknownSystem(value))
    }
}

/// Accepts the numeric id, the display name or the file token, any case.
impl FromStr for SystemId {
    type Err = LSystemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(id) = s.parse::<u32>() {
            return SystemId::try_from(id);
        }
        ALL.iter()
            .copied()
            .find(|id| id.name().eq_ignore_ascii_case(s) || id.token().eq_ignore_ascii_case(s))
            .ok_or_else(|| LSystemError::UnknownSystemName(s.to_string()))
    }
}

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A grammar ready to expand, plus where its output is cached.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolved {
    pub system: SystemId,
    pub grammar: LSystem,
    pub file_name: String,
}

/// `<token>_vertices<iterations>.bin`, or the scratch name for Custom.
/// A pure function of its inputs.
pub fn canonical_file_name(system: SystemId, iterations: u32) -> String {
    match system {
        SystemId::Custom => SCRATCH_FILE_NAME.to_string(),
        _ => format!("{}_vertices{}.{}", system.token(), iterations, FILE_EXTENSION),
    }
}

/// Looks up a catalog grammar by numeric id. Id 0 resolves to the custom
/// placeholder and the scratch slot.
pub fn resolve(system_id: u32, iterations: u32) -> Result<Resolved, LSystemError> {
    let system = SystemId::try_from(system_id)?;
    Ok(Resolved {
        system,
        grammar: system.grammar(),
        file_name: canonical_file_name(system, iterations),
    })
}

/// Wraps a caller supplied grammar; its output always lands in the scratch slot.
pub fn resolve_custom(grammar: LSystem) -> Result<Resolved, LSystemError> {
    grammar.validate()?;
    Ok(Resolved {
        system: SystemId::Custom,
        grammar,
        file_name: SCRATCH_FILE_NAME.to_string(),
    })
}

/// Human readable id table, one system per line.
pub fn listing() -> String {
    ALL.iter()
        .map(|id| {
            format!(
                "{:<24}{:>3}   (recommended iterations: {})",
                id.name(),
                id.id(),
                id.recommended_iterations()
            )
        })
        .collect::<Vec<String>>()
        .join("\n")
}
