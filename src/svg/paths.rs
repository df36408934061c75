//! SVG path data (`d` attribute) parsing
//!
//! Accepts every command letter in both cases, implicit command repeats and
//! the compact number forms emitted by drawing tools (`1.5.5`, `-1-2`).

use crate::infer::geometry::PathCommand;
use crate::infer::Point;

struct Lexer<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(data: &'a str) -> Self {
        Self {
            bytes: data.as_bytes(),
            pos: 0,
        }
    }

    fn skip_separators(&mut self) {
        while self.pos < self.bytes.len()
            && (self.bytes[self.pos].is_ascii_whitespace() || self.bytes[self.pos] == b',')
        {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_separators();
        self.bytes.get(self.pos).copied()
    }

    fn starts_number(&mut self) -> bool {
        matches!(self.peek(), Some(b'0'..=b'9' | b'.' | b'-' | b'+'))
    }

    fn number(&mut self) -> anyhow::Result<f32> {
        self.skip_separators();
        let start = self.pos;
        let bytes = self.bytes;
        if matches!(bytes.get(self.pos), Some(b'-' | b'+')) {
            self.pos += 1;
        }
        let mut seen_dot = false;
        let mut seen_digit = false;
        while let Some(&b) = bytes.get(self.pos) {
            match b {
                b'0'..=b'9' => seen_digit = true,
                b'.' if !seen_dot => seen_dot = true,
                _ => break,
            }
            self.pos += 1;
        }
        if seen_digit && matches!(bytes.get(self.pos), Some(b'e' | b'E')) {
            let mark = self.pos;
            self.pos += 1;
            if matches!(bytes.get(self.pos), Some(b'-' | b'+')) {
                self.pos += 1;
            }
            if matches!(bytes.get(self.pos), Some(b'0'..=b'9')) {
                while matches!(bytes.get(self.pos), Some(b'0'..=b'9')) {
                    self.pos += 1;
                }
            } else {
                self.pos = mark;
            }
        }
        anyhow::ensure!(seen_digit, "expected a number at offset {}", start);
        let text = std::str::from_utf8(&bytes[start..self.pos])?;
        Ok(text.parse::<f32>()?)
    }

    /// Arc flags may be written without separators (`a5 5 0 011 1`)
    fn flag(&mut self) -> anyhow::Result<bool> {
        match self.peek() {
            Some(b'0') => {
                self.pos += 1;
                Ok(false)
            }
            Some(b'1') => {
                self.pos += 1;
                Ok(true)
            }
            other => anyhow::bail!(
                "expected an arc flag at offset {}, found {:?}",
                self.pos,
                other.map(char::from)
            ),
        }
    }

    fn point(&mut self) -> anyhow::Result<Point> {
        let x = self.number()?;
        let y = self.number()?;
        Ok(Point::new(x, y))
    }
}

/// Parse path data into drawing commands
pub fn parse_path_data(data: &str) -> anyhow::Result<Vec<PathCommand>> {
    let mut lexer = Lexer::new(data);
    let mut commands = Vec::new();
    let mut current: Option<u8> = None;

    while let Some(next) = lexer.peek() {
        let letter = if next.is_ascii_alphabetic() {
            lexer.pos += 1;
            next
        } else {
            match current {
                // after a moveto, extra coordinate pairs are linetos
                Some(b'M') => b'L',
                Some(b'm') => b'l',
                Some(c) if c != b'Z' && c != b'z' => c,
                _ => anyhow::bail!("path data must start with a command, found '{}'", char::from(next)),
            }
        };

        let relative = letter.is_ascii_lowercase();
        let command = match letter.to_ascii_uppercase() {
            b'M' => PathCommand::MoveTo { relative, to: lexer.point()? },
            b'L' => PathCommand::LineTo { relative, to: lexer.point()? },
            b'H' => PathCommand::Horizontal { relative, x: lexer.number()? },
            b'V' => PathCommand::Vertical { relative, y: lexer.number()? },
            b'C' => PathCommand::CubicTo {
                relative,
                ctrl1: lexer.point()?,
                ctrl2: lexer.point()?,
                to: lexer.point()?,
            },
            b'S' => PathCommand::SmoothCubicTo {
                relative,
                ctrl2: lexer.point()?,
                to: lexer.point()?,
            },
            b'Q' => PathCommand::QuadTo {
                relative,
                ctrl: lexer.point()?,
                to: lexer.point()?,
            },
            b'T' => PathCommand::SmoothQuadTo { relative, to: lexer.point()? },
            b'A' => PathCommand::Arc {
                relative,
                rx: lexer.number()?,
                ry: lexer.number()?,
                rotation: lexer.number()?,
                large_arc: lexer.flag()?,
                sweep: lexer.flag()?,
                to: lexer.point()?,
            },
            b'Z' => PathCommand::Close,
            other => anyhow::bail!("unknown path command '{}'", char::from(other)),
        };
        commands.push(command);
        current = Some(letter);

        if matches!(command, PathCommand::Close) && lexer.starts_number() {
            anyhow::bail!("coordinates after a closepath at offset {}", lexer.pos);
        }
    }
    Ok(commands)
}

/// Number of cubic curve commands in raw path data
pub fn cubic_command_count(data: &str) -> usize {
    data.bytes().filter(|b| matches!(b, b'c' | b'C')).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infer::geometry::trace_points;

    #[test]
    fn test_relative_path_with_implicit_lineto() {
        let commands = parse_path_data("m10,20 5,0 v30 h-5z").unwrap();
        assert_eq!(commands.len(), 5);
        assert!(matches!(commands[1], PathCommand::LineTo { relative: true, .. }));
        let points = trace_points(&commands);
        assert_eq!(points[0], Point::new(10.0, 20.0));
        assert_eq!(points[1], Point::new(15.0, 20.0));
        assert_eq!(points[2], Point::new(15.0, 50.0));
        assert_eq!(points[3], Point::new(10.0, 50.0));
    }

    #[test]
    fn test_compact_numbers() {
        let commands = parse_path_data("M1.5.5L-1-2e1").unwrap();
        assert_eq!(
            commands,
            vec![
                PathCommand::MoveTo {
                    relative: false,
                    to: Point::new(1.5, 0.5)
                },
                PathCommand::LineTo {
                    relative: false,
                    to: Point::new(-1.0, -20.0)
                },
            ]
        );
    }

    #[test]
    fn test_cubic_and_arc() {
        let commands = parse_path_data("M0 0c1 2 3 4 5 6 1 1 1 1 2 2a5 5 0 011 1").unwrap();
        assert_eq!(commands.len(), 4);
        assert!(matches!(
            commands[3],
            PathCommand::Arc {
                large_arc: false,
                sweep: true,
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_data_is_rejected() {
        assert!(parse_path_data("10 20").is_err());
        assert!(parse_path_data("M10").is_err());
        assert!(parse_path_data("M0 0 X5").is_err());
    }
}
