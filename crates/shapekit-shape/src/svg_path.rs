//! SVG path data (`d` attribute) reading and writing.
//!
//! Supports `M L H V C S Q T A Z` in absolute and relative forms, with
//! implicit command repetition. Arcs are converted to cubic Béziers.

use lyon::geom::{ArcFlags, SvgArc};
use lyon::math::{point, vector, Angle, Point as LPoint};
use lyon::path::{Event, Path};
use shapekit_core::{ShapeError, ShapeResult};

fn parse_error(reason: impl Into<String>) -> ShapeError {
    ShapeError::PathParse {
        reason: reason.into(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Command(char),
    Number(f32),
}

/// Splits path data into command letters and numbers.
///
/// Commas and whitespace separate numbers; a sign also starts a new number
/// unless it follows an exponent marker (`1e-5`).
fn tokenize(data: &str) -> ShapeResult<Vec<Token>> {
    let mut raw: Vec<String> = Vec::new();
    let mut current = String::new();

    for ch in data.chars() {
        match ch {
            'M' | 'm' | 'L' | 'l' | 'H' | 'h' | 'V' | 'v' | 'C' | 'c' | 'S' | 's' | 'Q'
            | 'q' | 'T' | 't' | 'A' | 'a' | 'Z' | 'z' => {
                if !current.is_empty() {
                    raw.push(std::mem::take(&mut current));
                }
                raw.push(ch.to_string());
            }
            ' ' | ',' | '\n' | '\r' | '\t' => {
                if !current.is_empty() {
                    raw.push(std::mem::take(&mut current));
                }
            }
            '-' | '+' => {
                if !current.is_empty() && !matches!(current.chars().last(), Some('e' | 'E')) {
                    raw.push(std::mem::take(&mut current));
                }
                current.push(ch);
            }
            _ => current.push(ch),
        }
    }
    if !current.is_empty() {
        raw.push(current);
    }

    raw.into_iter()
        .map(|tok| {
            let mut chars = tok.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_alphabetic() => Ok(Token::Command(c)),
                _ => match tok.parse::<f32>() {
                    Ok(n) if n.is_finite() => Ok(Token::Number(n)),
                    Ok(_) => Err(parse_error(format!("number '{}' is out of range", tok))),
                    Err(_) => Err(parse_error(format!("invalid number '{}'", tok))),
                },
            }
        })
        .collect()
}

struct PathDataParser {
    tokens: Vec<Token>,
    pos: usize,
    builder: lyon::path::path::Builder,
    current: LPoint,
    start: LPoint,
    subpath_active: bool,
    prev_cubic_ctrl: Option<LPoint>,
    prev_quad_ctrl: Option<LPoint>,
}

impl PathDataParser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            builder: Path::builder(),
            current: point(0.0, 0.0),
            start: point(0.0, 0.0),
            subpath_active: false,
            prev_cubic_ctrl: None,
            prev_quad_ctrl: None,
        }
    }

    fn parse(mut self) -> ShapeResult<Path> {
        let mut repeat: Option<char> = None;
        while self.pos < self.tokens.len() {
            let cmd = match self.tokens[self.pos] {
                Token::Command(c) => {
                    self.pos += 1;
                    c
                }
                Token::Number(_) => {
                    repeat.ok_or_else(|| parse_error("expected a command letter"))?
                }
            };
            self.command(cmd)?;
            repeat = match cmd {
                'M' => Some('L'),
                'm' => Some('l'),
                'Z' | 'z' => None,
                c => Some(c),
            };
        }
        if self.subpath_active {
            self.builder.end(false);
        }
        Ok(self.builder.build())
    }

    fn number(&mut self) -> ShapeResult<f32> {
        match self.tokens.get(self.pos) {
            Some(Token::Number(n)) => {
                self.pos += 1;
                Ok(*n)
            }
            _ => Err(parse_error(format!("missing argument at token {}", self.pos))),
        }
    }

    fn flag(&mut self) -> ShapeResult<bool> {
        Ok(self.number()? != 0.0)
    }

    fn point(&mut self, relative: bool) -> ShapeResult<LPoint> {
        let x = self.number()?;
        let y = self.number()?;
        if relative {
            finite(point(self.current.x + x, self.current.y + y))
        } else {
            Ok(point(x, y))
        }
    }

    fn ensure_begun(&mut self) {
        if !self.subpath_active {
            self.builder.begin(self.current);
            self.start = self.current;
            self.subpath_active = true;
        }
    }

    fn line_to(&mut self, to: LPoint) {
        self.ensure_begun();
        self.builder.line_to(to);
        self.current = to;
    }

    fn command(&mut self, cmd: char) -> ShapeResult<()> {
        let relative = cmd.is_ascii_lowercase();
        let mut cubic_ctrl = None;
        let mut quad_ctrl = None;

        match cmd.to_ascii_uppercase() {
            'M' => {
                let to = self.point(relative)?;
                if self.subpath_active {
                    self.builder.end(false);
                }
                self.builder.begin(to);
                self.subpath_active = true;
                self.start = to;
                self.current = to;
            }
            'L' => {
                let to = self.point(relative)?;
                self.line_to(to);
            }
            'H' => {
                let x = self.number()?;
                let x = if relative { self.current.x + x } else { x };
                let to = finite(point(x, self.current.y))?;
                self.line_to(to);
            }
            'V' => {
                let y = self.number()?;
                let y = if relative { self.current.y + y } else { y };
                let to = finite(point(self.current.x, y))?;
                self.line_to(to);
            }
            'C' | 'S' => {
                let ctrl1 = if cmd.eq_ignore_ascii_case(&'C') {
                    self.point(relative)?
                } else {
                    finite(reflect(self.prev_cubic_ctrl, self.current))?
                };
                let ctrl2 = self.point(relative)?;
                let to = self.point(relative)?;
                self.ensure_begun();
                self.builder.cubic_bezier_to(ctrl1, ctrl2, to);
                self.current = to;
                cubic_ctrl = Some(ctrl2);
            }
            'Q' | 'T' => {
                let ctrl = if cmd.eq_ignore_ascii_case(&'Q') {
                    self.point(relative)?
                } else {
                    finite(reflect(self.prev_quad_ctrl, self.current))?
                };
                let to = self.point(relative)?;
                self.ensure_begun();
                self.builder.quadratic_bezier_to(ctrl, to);
                self.current = to;
                quad_ctrl = Some(ctrl);
            }
            'A' => {
                let rx = self.number()?;
                let ry = self.number()?;
                let x_rotation = self.number()?;
                let large_arc = self.flag()?;
                let sweep = self.flag()?;
                let to = self.point(relative)?;
                self.ensure_begun();
                let arc = SvgArc {
                    from: self.current,
                    to,
                    radii: vector(rx.abs(), ry.abs()),
                    x_rotation: Angle::degrees(x_rotation),
                    flags: ArcFlags { large_arc, sweep },
                };
                if arc.is_straight_line() {
                    self.builder.line_to(to);
                } else {
                    let builder = &mut self.builder;
                    arc.for_each_cubic_bezier(&mut |seg| {
                        builder.cubic_bezier_to(seg.ctrl1, seg.ctrl2, seg.to);
                    });
                }
                self.current = to;
            }
            'Z' => {
                if self.subpath_active {
                    self.builder.end(true);
                    self.subpath_active = false;
                }
                self.current = self.start;
            }
            other => return Err(parse_error(format!("unsupported command '{}'", other))),
        }

        self.prev_cubic_ctrl = cubic_ctrl;
        self.prev_quad_ctrl = quad_ctrl;
        Ok(())
    }
}

/// Relative offsets can overflow even when every number parsed is finite.
fn finite(p: LPoint) -> ShapeResult<LPoint> {
    if p.x.is_finite() && p.y.is_finite() {
        Ok(p)
    } else {
        Err(parse_error("coordinate is out of range"))
    }
}

/// Reflection of the previous control point about `around`, or `around`
/// itself when the previous segment was not of the same kind.
fn reflect(prev: Option<LPoint>, around: LPoint) -> LPoint {
    match prev {
        Some(p) => point(2.0 * around.x - p.x, 2.0 * around.y - p.y),
        None => around,
    }
}

/// Parses SVG path data into a path.
pub fn parse_path_data(data: &str) -> ShapeResult<Path> {
    PathDataParser::new(tokenize(data)?).parse()
}

/// Writes a path as absolute SVG path data.
pub fn to_path_data(path: &Path) -> String {
    let mut parts: Vec<String> = Vec::new();
    for event in path.iter() {
        match event {
            Event::Begin { at } => parts.push(format!("M {} {}", at.x, at.y)),
            Event::Line { to, .. } => parts.push(format!("L {} {}", to.x, to.y)),
            Event::Quadratic { ctrl, to, .. } => {
                parts.push(format!("Q {} {} {} {}", ctrl.x, ctrl.y, to.x, to.y))
            }
            Event::Cubic {
                ctrl1, ctrl2, to, ..
            } => parts.push(format!(
                "C {} {} {} {} {} {}",
                ctrl1.x, ctrl1.y, ctrl2.x, ctrl2.y, to.x, to.y
            )),
            Event::End { close, .. } => {
                if close {
                    parts.push("Z".to_string());
                }
            }
        }
    }
    parts.join(" ")
}
