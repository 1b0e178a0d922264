use std::fmt;
use std::fmt::Write as _;

use crate::physics::consts::JUMP_PAD_HEIGHT;
use crate::physics::{Obstacle, ObstacleKind, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelErrorCode {
    MissingFields,
    InvalidNumber,
    InvalidValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelParseError {
    pub code: LevelErrorCode,
    pub message: String,
    /// 1-based line number.
    pub line: usize,
    pub content: String,
}

impl fmt::Display for LevelParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}: {} (line={}, content='{}')",
            self.code, self.message, self.line, self.content
        )
    }
}

impl std::error::Error for LevelParseError {}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedLevel {
    pub obstacles: Vec<Obstacle>,
    /// Lines whose leading keyword was not recognized.
    pub ignored_lines: Vec<usize>,
}

/// Parses the line-oriented `KIND,x,y,w,h` level format.
///
/// Any malformed record fails the whole document.
pub fn parse_level_text(raw: &str) -> Result<ParsedLevel, LevelParseError> {
    let mut parsed = ParsedLevel::default();

    for (idx, line) in raw.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let fields = trimmed.split(',').map(str::trim).collect::<Vec<_>>();
        let record = Record {
            line: line_no,
            content: trimmed,
            fields: &fields,
        };
        let keyword = fields[0].to_ascii_uppercase();
        let obstacle = match keyword.as_str() {
            "PLATFORM" => record.boxed(ObstacleKind::Platform)?,
            "SPIKE" => record.boxed(ObstacleKind::Spike)?,
            "JUMP_PAD" => record.jump_pad()?,
            _ => {
                parsed.ignored_lines.push(line_no);
                continue;
            }
        };
        obstacle
            .validate()
            .map_err(|error| record.error(LevelErrorCode::InvalidValue, error.to_string()))?;
        parsed.obstacles.push(obstacle);
    }

    Ok(parsed)
}

/// Writes obstacles in the format read by [`parse_level_text`].
///
/// Jump pads are written without a height; the reader restores the fixed pad
/// height.
pub fn render_level_text(obstacles: &[Obstacle]) -> String {
    let mut output = String::new();
    for obstacle in obstacles {
        let Rect { x, y, w, h } = obstacle.rect;
        let keyword = obstacle.kind.keyword();
        let _ = match (obstacle.kind, obstacle.power) {
            (ObstacleKind::JumpPad, Some(power)) => {
                writeln!(output, "{keyword},{x},{y},{w},{power}")
            }
            (ObstacleKind::JumpPad, None) => writeln!(output, "{keyword},{x},{y},{w}"),
            _ => writeln!(output, "{keyword},{x},{y},{w},{h}"),
        };
    }
    output
}

struct Record<'a> {
    line: usize,
    content: &'a str,
    fields: &'a [&'a str],
}

impl Record<'_> {
    fn boxed(&self, kind: ObstacleKind) -> Result<Obstacle, LevelParseError> {
        self.require_fields(kind, 5)?;
        Ok(Obstacle {
            kind,
            rect: Rect::new(
                self.number(1, "x")?,
                self.number(2, "y")?,
                self.extent(3, "w")?,
                self.extent(4, "h")?,
            ),
            power: None,
        })
    }

    fn jump_pad(&self) -> Result<Obstacle, LevelParseError> {
        self.require_fields(ObstacleKind::JumpPad, 4)?;
        let power = match self.fields.get(4) {
            Some(_) => Some(self.number(4, "power")?),
            None => None,
        };
        Ok(Obstacle::jump_pad(
            self.number(1, "x")?,
            self.number(2, "y")?,
            self.extent(3, "w")?,
            JUMP_PAD_HEIGHT,
            power,
        ))
    }

    fn require_fields(&self, kind: ObstacleKind, needed: usize) -> Result<(), LevelParseError> {
        if self.fields.len() < needed {
            return Err(self.error(
                LevelErrorCode::MissingFields,
                format!(
                    "{} needs {} fields, found {}",
                    kind.keyword(),
                    needed,
                    self.fields.len()
                ),
            ));
        }
        Ok(())
    }

    fn number(&self, index: usize, name: &str) -> Result<f32, LevelParseError> {
        let raw = self.fields[index];
        let value = raw.parse::<f32>().map_err(|_| {
            self.error(
                LevelErrorCode::InvalidNumber,
                format!("{name} '{raw}' is not a valid number"),
            )
        })?;
        if !value.is_finite() {
            return Err(self.error(
                LevelErrorCode::InvalidNumber,
                format!("{name} must be finite"),
            ));
        }
        Ok(value)
    }

    fn extent(&self, index: usize, name: &str) -> Result<f32, LevelParseError> {
        let value = self.number(index, name)?;
        if value < 0.0 {
            return Err(self.error(
                LevelErrorCode::InvalidValue,
                format!("{name} must be >= 0"),
            ));
        }
        Ok(value)
    }

    fn error(&self, code: LevelErrorCode, message: String) -> LevelParseError {
        LevelParseError {
            code,
            message,
            line: self.line,
            content: self.content.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_kind_case_insensitively() {
        let raw = "\
# course
platform, 0, 0, 500, 20
Spike,100,20,16,16

JUMP_PAD,200,20,30,900
jump_pad,300,20,30
";
        let parsed = parse_level_text(raw).expect("parse");
        assert_eq!(
            parsed.obstacles,
            vec![
                Obstacle::platform(0.0, 0.0, 500.0, 20.0),
                Obstacle::spike(100.0, 20.0, 16.0, 16.0),
                Obstacle::jump_pad(200.0, 20.0, 30.0, JUMP_PAD_HEIGHT, Some(900.0)),
                Obstacle::jump_pad(300.0, 20.0, 30.0, JUMP_PAD_HEIGHT, None),
            ]
        );
        assert!(parsed.ignored_lines.is_empty());
    }

    #[test]
    fn unknown_keywords_are_skipped_and_reported() {
        let raw = "PLATFORM,0,0,10,10\nPORTAL,5,5\nCOIN\nSPIKE,1,1,1,1\n";
        let parsed = parse_level_text(raw).expect("parse");
        assert_eq!(parsed.obstacles.len(), 2);
        assert_eq!(parsed.ignored_lines, vec![2, 3]);
    }

    #[test]
    fn short_record_fails_the_whole_document() {
        let raw = "PLATFORM,0,0,10,10\nSPIKE,1,2,3\nPLATFORM,20,0,10,10\n";
        let err = parse_level_text(raw).expect_err("short spike");
        assert_eq!(err.code, LevelErrorCode::MissingFields);
        assert_eq!(err.line, 2);
        assert_eq!(err.content, "SPIKE,1,2,3");
    }

    #[test]
    fn jump_pad_needs_a_width() {
        let err = parse_level_text("JUMP_PAD,1,2").expect_err("short pad");
        assert_eq!(err.code, LevelErrorCode::MissingFields);
    }

    #[test]
    fn non_numeric_and_non_finite_fields_fail() {
        let err = parse_level_text("PLATFORM,0,abc,10,10").expect_err("abc");
        assert_eq!(err.code, LevelErrorCode::InvalidNumber);
        assert_eq!(err.line, 1);

        let err = parse_level_text("SPIKE,0,0,inf,10").expect_err("inf");
        assert_eq!(err.code, LevelErrorCode::InvalidNumber);

        let err = parse_level_text("JUMP_PAD,0,0,10,NaN").expect_err("nan");
        assert_eq!(err.code, LevelErrorCode::InvalidNumber);
    }

    #[test]
    fn negative_extent_fails() {
        let err = parse_level_text("PLATFORM,0,0,-10,10").expect_err("negative");
        assert_eq!(err.code, LevelErrorCode::InvalidValue);
    }

    #[test]
    fn geometry_below_the_dead_threshold_fails() {
        let raw = "PLATFORM,0,0,1000,20\nPLATFORM,0,-1500,1000,20\n";
        let err = parse_level_text(raw).expect_err("sunken platform");
        assert_eq!(err.code, LevelErrorCode::InvalidValue);
        assert_eq!(err.line, 2);
        assert_eq!(err.content, "PLATFORM,0,-1500,1000,20");

        let parsed = parse_level_text("PLATFORM,0,-1100,1000,200").expect("top above threshold");
        assert_eq!(parsed.obstacles.len(), 1);
    }

    #[test]
    fn rendered_text_parses_back_to_the_same_obstacles() {
        let obstacles = vec![
            Obstacle::platform(-16.25, 0.0, 1234.5, 20.0),
            Obstacle::spike(400.1, 20.0, 30.0, 29.999),
            Obstacle::jump_pad(0.3, 20.0, 16.0, JUMP_PAD_HEIGHT, Some(812.75)),
            Obstacle::jump_pad(1e-3, 20.0, 16.0, JUMP_PAD_HEIGHT, None),
        ];
        let text = render_level_text(&obstacles);
        let parsed = parse_level_text(&text).expect("parse rendered");
        assert_eq!(parsed.obstacles, obstacles);
        assert_eq!(render_level_text(&parsed.obstacles), text);
    }

    #[test]
    fn error_display_includes_line_and_content() {
        let err = parse_level_text("\n\nSPIKE,1").expect_err("short");
        let rendered = err.to_string();
        assert!(rendered.contains("line=3"));
        assert!(rendered.contains("SPIKE,1"));
    }
}
