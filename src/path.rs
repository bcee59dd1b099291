//! Module path compiler.
//!
//! Turns a module grid into a single SVG path string. Every module is drawn from its 3x3
//! neighborhood alone: dark modules become rectangles whose exposed corners are rounded, and
//! light modules tucked into an inner corner of three dark modules get a concave fillet so
//! the inner corner matches the outer rounding.

use core::fmt;

use crate::qrcode::{ModuleGrid, QrSymbol};
use crate::VIEWPORT_SIZE;

/// Converts a rounding percentage into a fraction of the module width.
/// At 100 the radius is half a module.
pub const ROUNDING_SCALE: f64 = 0.005;

/// Clamps a rounding percentage into `[0, 100]`. NaN is treated as 0.
pub fn clamp_rounding(rounding: f64) -> f64 {
    if rounding.is_nan() {
        0.0
    } else {
        rounding.clamp(0.0, 100.0)
    }
}

/// Corner radius for the given rounding percentage and module width.
pub fn corner_radius(rounding: f64, module_width: f64) -> f64 {
    clamp_rounding(rounding) * ROUNDING_SCALE * module_width
}

fn snap(v: f64) -> i64 {
    v.round() as i64
}

/// A single drawing instruction. Coordinates are in viewport units and are rounded to
/// integers when displayed.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum PathCommand {
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    /// Clockwise quarter arc of the given radius ending at `(x, y)`.
    ArcTo { x: f64, y: f64, radius: f64 },
}

impl fmt::Display for PathCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            PathCommand::MoveTo { x, y } => write!(f, "M {} {}", snap(x), snap(y)),
            PathCommand::LineTo { x, y } => write!(f, "L {} {}", snap(x), snap(y)),
            PathCommand::ArcTo { x, y, radius } => {
                let r = snap(radius);
                write!(f, "A {r} {r} 0 0 1 {} {}", snap(x), snap(y))
            }
        }
    }
}

/// One flag per corner of a module.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Corners {
    /// Top-left.
    pub nw: bool,
    /// Top-right.
    pub ne: bool,
    /// Bottom-right.
    pub se: bool,
    /// Bottom-left.
    pub sw: bool,
}

impl Corners {
    pub const NONE: Corners = Corners { nw: false, ne: false, se: false, sw: false };

    pub fn any(self) -> bool {
        self.nw || self.ne || self.se || self.sw
    }
}

/// A module and its eight neighbors. Out-of-range neighbors read as light.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Neighborhood {
    pub nw: bool,
    pub n: bool,
    pub ne: bool,
    pub w: bool,
    pub center: bool,
    pub e: bool,
    pub sw: bool,
    pub s: bool,
    pub se: bool,
}

impl Neighborhood {
    /// Reads the module at `(row, col)` and its eight neighbors from `grid`.
    pub fn sample<G: ModuleGrid + ?Sized>(grid: &G, row: i32, col: i32) -> Self {
        let (north, south) = (row - 1, row + 1);
        let (west, east) = (col - 1, col + 1);
        Self {
            nw: grid.is_dark(north, west),
            n: grid.is_dark(north, col),
            ne: grid.is_dark(north, east),
            w: grid.is_dark(row, west),
            center: grid.is_dark(row, col),
            e: grid.is_dark(row, east),
            sw: grid.is_dark(south, west),
            s: grid.is_dark(south, col),
            se: grid.is_dark(south, east),
        }
    }

    /// Convex corners of a dark module: both edge neighbors at the corner are light.
    /// The diagonal neighbor does not matter.
    pub fn convex_corners(&self) -> Corners {
        Corners {
            nw: !self.n && !self.w,
            ne: !self.n && !self.e,
            se: !self.s && !self.e,
            sw: !self.s && !self.w,
        }
    }

    /// Concave corners of a light module: both edge neighbors and the diagonal are dark.
    pub fn concave_corners(&self) -> Corners {
        Corners {
            nw: self.n && self.w && self.nw,
            ne: self.n && self.e && self.ne,
            se: self.s && self.e && self.se,
            sw: self.s && self.w && self.sw,
        }
    }
}

/// Bounds of one module in viewport units, plus the corner radius in effect.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Cell {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub radius: f64,
}

impl Cell {
    /// Bounds of the module at `(row, col)` for modules `width` units wide.
    pub fn at(row: usize, col: usize, width: f64, radius: f64) -> Self {
        let left = col as f64 * width;
        let top = row as f64 * width;
        Self {
            left,
            top,
            right: left + width,
            bottom: top + width,
            radius,
        }
    }
}

/// Closed outline of a dark module, clockwise from the north-west corner.
pub fn draw_dark(cell: Cell, rounded: Corners) -> Vec<PathCommand> {
    use PathCommand::*;

    let Cell { left: l, top: t, right: r, bottom: b, radius: rad } = cell;
    let mut path = Vec::with_capacity(9);

    if rounded.nw {
        path.push(MoveTo { x: l + rad, y: t });
    } else {
        path.push(MoveTo { x: l, y: t });
    }

    if rounded.ne {
        path.push(LineTo { x: r - rad, y: t });
        path.push(ArcTo { x: r, y: t + rad, radius: rad });
    } else {
        path.push(LineTo { x: r, y: t });
    }

    if rounded.se {
        path.push(LineTo { x: r, y: b - rad });
        path.push(ArcTo { x: r - rad, y: b, radius: rad });
    } else {
        path.push(LineTo { x: r, y: b });
    }

    if rounded.sw {
        path.push(LineTo { x: l + rad, y: b });
        path.push(ArcTo { x: l, y: b - rad, radius: rad });
    } else {
        path.push(LineTo { x: l, y: b });
    }

    if rounded.nw {
        path.push(LineTo { x: l, y: t + rad });
        path.push(ArcTo { x: l + rad, y: t, radius: rad });
    } else {
        path.push(LineTo { x: l, y: t });
    }

    path
}

/// A fillet carved into one corner of a light module.
pub type Notch = [PathCommand; 4];

/// Fillets for the concave corners of a light module, in NW, NE, SE, SW order.
///
/// Each notch is an independent sub-path; corners that do not qualify are `None`.
pub fn draw_light(cell: Cell, notched: Corners) -> [Option<Notch>; 4] {
    use PathCommand::*;

    let Cell { left: l, top: t, right: r, bottom: b, radius: rad } = cell;

    let nw = notched.nw.then(|| {
        [
            MoveTo { x: l + rad, y: t },
            LineTo { x: l, y: t },
            LineTo { x: l, y: t + rad },
            ArcTo { x: l + rad, y: t, radius: rad },
        ]
    });
    let ne = notched.ne.then(|| {
        [
            MoveTo { x: r, y: t + rad },
            LineTo { x: r, y: t },
            LineTo { x: r - rad, y: t },
            ArcTo { x: r, y: t + rad, radius: rad },
        ]
    });
    let se = notched.se.then(|| {
        [
            MoveTo { x: r - rad, y: b },
            LineTo { x: r, y: b },
            LineTo { x: r, y: b - rad },
            ArcTo { x: r - rad, y: b, radius: rad },
        ]
    });
    let sw = notched.sw.then(|| {
        [
            MoveTo { x: l, y: b - rad },
            LineTo { x: l, y: b },
            LineTo { x: l + rad, y: b },
            ArcTo { x: l, y: b - rad, radius: rad },
        ]
    });

    [nw, ne, se, sw]
}

fn push_fragment(out: &mut String, commands: &[PathCommand]) {
    for command in commands {
        if !out.is_empty() {
            out.push(' ');
        }
        *out += &command.to_string();
    }
}

/// Compiles every module of `grid` into one path string, row by row.
///
/// `rounding` is a percentage in `[0, 100]`; values outside are clamped. With a radius of
/// zero no corner is rounded and light modules contribute nothing, so the output is the
/// plain square rendering.
pub fn compile_grid<G: ModuleGrid + ?Sized>(grid: &G, rounding: f64) -> String {
    let count = grid.module_count();
    if count == 0 {
        return String::new();
    }

    let width = VIEWPORT_SIZE / count as f64;
    let radius = corner_radius(rounding, width);
    let rounds = radius > 0.0;

    let mut path = String::new();
    for row in 0..count {
        for col in 0..count {
            let hood = Neighborhood::sample(grid, row as i32, col as i32);
            let cell = Cell::at(row, col, width, radius);
            if hood.center {
                let corners = if rounds { hood.convex_corners() } else { Corners::NONE };
                push_fragment(&mut path, &draw_dark(cell, corners));
            } else if rounds {
                for notch in draw_light(cell, hood.concave_corners()).iter().flatten() {
                    push_fragment(&mut path, notch);
                }
            }
        }
    }
    path
}

/// Compiles a symbol into a path string. A missing symbol yields an empty string.
///
/// # Example
///
/// ```rust
/// use qirust_rounded::path::compile;
/// use qirust_rounded::qrcode::{build_symbol, QrCodeEcc, QrcodeEncoder};
///
/// let qr = build_symbol(&QrcodeEncoder, "HELLO", QrCodeEcc::Quartile, 1).unwrap();
/// let d = compile(qr.as_ref(), 50.0);
/// assert!(d.starts_with("M "));
/// assert_eq!(compile(None, 50.0), "");
/// ```
pub fn compile(symbol: Option<&QrSymbol>, rounding: f64) -> String {
    match symbol {
        Some(symbol) => compile_grid(symbol, rounding),
        None => String::new(),
    }
}
