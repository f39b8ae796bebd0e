// Copyright 2016-2018 Matthew D. Michelotti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Reader for the text level format.
//!
//! A level file is six brace-delimited lists in a fixed order:
//!
//! ```text
//! materials   { { "fill", "edge", friction } ... }
//! vertices    { { x, y } ... }
//! triangles   { { vref, vref, vref, material } ... }
//!     vref    { vertex, edge_height [, flag ...] }   flag: edge collidable foreground
//! objectTypes { { "image", "sound" } ... }
//! objects     { { x, y, angle, type [, flag ...] } ... }   type < 0: the door
//! stats       { start_x, start_y, required }
//! ```
//!
//! References are 0-based positions in an earlier list. Strings may be
//! quoted or bare words. `#` starts a comment running to the end of the line.

use crate::assets::{AssetTable, BitmapId};
use crate::config::LevelConfig;
use crate::errors::{ErrorKind, Result};
use crate::geom::v2;
use crate::level::builder::{LevelBuilder, VertexRef};
use crate::level::records::{EdgeFlags, MaterialId, ObjectFlags, ObjectKind, ObjectTypeId, VertexId};
use crate::level::Level;
use failure::ResultExt;
use log::info;
use std::fs;
use std::iter::Peekable;
use std::path::Path;
use std::str::Chars;

#[derive(PartialEq, Clone, Debug)]
enum Token {
    OpenBrace,
    CloseBrace,
    Comma,
    Number(f64),
    Text(String),
}

impl Token {
    fn describe(&self) -> String {
        match *self {
            Token::OpenBrace => "'{'".to_owned(),
            Token::CloseBrace => "'}'".to_owned(),
            Token::Comma => "','".to_owned(),
            Token::Number(value) => format!("number {}", value),
            Token::Text(ref text) => format!("\"{}\"", text),
        }
    }
}

struct Tokenizer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.' || c == '/' || c == '-'
}

fn is_number_char(c: char) -> bool {
    c.is_ascii_digit() || c == '.' || c == '-' || c == '+' || c == 'e' || c == 'E'
}

impl<'a> Tokenizer<'a> {
    fn new(text: &'a str) -> Tokenizer<'a> {
        Tokenizer { chars: text.chars().peekable(), line: 1 }
    }

    // Skips whitespace and `#` comments, which run to the end of the line.
    fn skip_whitespace(&mut self) {
        let mut comment = false;
        while let Some(&c) = self.chars.peek() {
            if c == '\n' {
                self.line += 1;
                comment = false;
            } else if c == '#' {
                comment = true;
            } else if !comment && !c.is_whitespace() {
                break;
            }
            self.chars.next();
        }
    }

    fn take_while<F: Fn(char) -> bool>(&mut self, first: char, accept: F) -> String {
        let mut text = first.to_string();
        while let Some(&c) = self.chars.peek() {
            if !accept(c) {
                break;
            }
            text.push(c);
            self.chars.next();
        }
        text
    }

    fn next_token(&mut self) -> Result<Option<Token>> {
        self.skip_whitespace();
        let c = match self.chars.next() {
            Some(c) => c,
            None => return Ok(None),
        };
        let token = match c {
            '{' => Token::OpenBrace,
            '}' => Token::CloseBrace,
            ',' => Token::Comma,
            '"' => {
                let mut text = String::new();
                loop {
                    match self.chars.next() {
                        Some('"') => break,
                        Some(c) => {
                            if c == '\n' {
                                self.line += 1;
                            }
                            text.push(c);
                        }
                        None => return Err(ErrorKind::UnexpectedEof { expected: "closing quote", line: self.line }.into()),
                    }
                }
                Token::Text(text)
            }
            c if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => {
                let text = self.take_while(c, is_number_char);
                match text.parse::<f64>() {
                    Ok(value) => Token::Number(value),
                    Err(_) => {
                        return Err(ErrorKind::UnexpectedToken { expected: "number", found: text, line: self.line }.into())
                    }
                }
            }
            c if c.is_alphabetic() || c == '_' => Token::Text(self.take_while(c, is_word_char)),
            c => {
                return Err(ErrorKind::UnexpectedToken { expected: "token", found: c.to_string(), line: self.line }.into())
            }
        };
        Ok(Some(token))
    }
}

struct LevelReader<'a, 'b> {
    tokens: Tokenizer<'b>,
    assets: &'a AssetTable,
    builder: LevelBuilder<'a>,
    materials: Vec<MaterialId>,
    vertices: Vec<VertexId>,
    object_types: Vec<ObjectTypeId>,
}

impl<'a, 'b> LevelReader<'a, 'b> {
    fn line(&self) -> usize {
        self.tokens.line
    }

    fn next(&mut self, expected: &'static str) -> Result<Token> {
        match self.tokens.next_token()? {
            Some(token) => Ok(token),
            None => Err(ErrorKind::UnexpectedEof { expected, line: self.line() }.into()),
        }
    }

    fn unexpected<T>(&self, expected: &'static str, found: &Token) -> Result<T> {
        Err(ErrorKind::UnexpectedToken { expected, found: found.describe(), line: self.line() }.into())
    }

    fn expect(&mut self, expected: Token, name: &'static str) -> Result<()> {
        let token = self.next(name)?;
        if token == expected {
            Ok(())
        } else {
            self.unexpected(name, &token)
        }
    }

    fn open(&mut self) -> Result<()> {
        self.expect(Token::OpenBrace, "'{'")
    }

    fn close(&mut self) -> Result<()> {
        self.expect(Token::CloseBrace, "'}'")
    }

    fn comma(&mut self) -> Result<()> {
        self.expect(Token::Comma, "','")
    }

    fn number(&mut self) -> Result<f64> {
        match self.next("number")? {
            Token::Number(value) => Ok(value),
            other => self.unexpected("number", &other),
        }
    }

    fn text(&mut self) -> Result<String> {
        match self.next("string")? {
            Token::Text(text) => Ok(text),
            other => self.unexpected("string", &other),
        }
    }

    // `{ item* }`, where each item starts with its own opening brace.
    fn list<F>(&mut self, mut item: F) -> Result<()>
    where
        F: FnMut(&mut Self) -> Result<()>,
    {
        self.open()?;
        loop {
            match self.next("'{' or '}'")? {
                Token::CloseBrace => return Ok(()),
                Token::OpenBrace => item(self)?,
                other => return self.unexpected("'{' or '}'", &other),
            }
        }
    }

    // Either `}` or `, flag* }`, passing each flag word to `apply`.
    fn flags<F: FnMut(&str)>(&mut self, mut apply: F) -> Result<()> {
        match self.next("',' or '}'")? {
            Token::CloseBrace => return Ok(()),
            Token::Comma => {}
            other => return self.unexpected("',' or '}'", &other),
        }
        loop {
            match self.next("flag")? {
                Token::CloseBrace => return Ok(()),
                Token::Comma => {}
                Token::Text(flag) => apply(&flag),
                other => return self.unexpected("flag", &other),
            }
        }
    }

    fn bitmap(&mut self, role: &'static str) -> Result<BitmapId> {
        let name = self.text()?;
        match self.assets.obtain_bitmap(&name) {
            Some(id) => Ok(id),
            None => Err(ErrorKind::MissingBitmap { role, name, line: self.line() }.into()),
        }
    }

    fn index(&mut self) -> Result<Option<usize>> {
        let value = self.number()?;
        if value < 0.0 {
            Ok(None)
        } else {
            Ok(Some(value as usize))
        }
    }

    fn material(&mut self) -> Result<()> {
        let fill = self.bitmap("material fill")?;
        self.comma()?;
        let edge = self.bitmap("material edge")?;
        self.comma()?;
        let friction = self.number()?;
        if !(friction > 0.0) {
            return Err(ErrorKind::BadFriction(self.line()).into());
        }
        self.close()?;
        self.materials.push(self.builder.add_material(fill, edge, friction));
        Ok(())
    }

    fn vertex(&mut self) -> Result<()> {
        let x = self.number()?;
        self.comma()?;
        let y = self.number()?;
        self.close()?;
        self.vertices.push(self.builder.add_vertex(v2(x, y)));
        Ok(())
    }

    fn vertex_ref(&mut self) -> Result<VertexRef> {
        self.open()?;
        let index = self.index()?;
        let vertex = match index.and_then(|index| self.vertices.get(index)) {
            Some(&vertex) => vertex,
            None => return Err(ErrorKind::UnknownVertex(self.line()).into()),
        };
        self.comma()?;
        let height = self.number()?;
        let mut flags = EdgeFlags::empty();
        self.flags(|flag| match flag {
            "edge" => flags.insert(EdgeFlags::EDGE),
            "collidable" => flags.insert(EdgeFlags::COLLIDABLE),
            "foreground" => flags.insert(EdgeFlags::FOREGROUND),
            _ => {}
        })?;
        Ok(VertexRef { vertex, height, flags })
    }

    fn triangle(&mut self) -> Result<()> {
        let a = self.vertex_ref()?;
        self.comma()?;
        let b = self.vertex_ref()?;
        self.comma()?;
        let c = self.vertex_ref()?;
        self.comma()?;
        let index = self.index()?;
        let material = match index.and_then(|index| self.materials.get(index)) {
            Some(&material) => material,
            None => return Err(ErrorKind::UnknownMaterial(self.line()).into()),
        };
        self.close()?;
        self.builder.add_triangle([a, b, c], material);
        Ok(())
    }

    fn object_type(&mut self) -> Result<()> {
        let image = self.bitmap("object image")?;
        self.comma()?;
        let sound = self.text()?;
        self.close()?;
        // a missing sound is allowed; the object is collected silently
        let sound = self.assets.obtain_sample(&sound);
        self.object_types.push(self.builder.add_object_type(image, sound));
        Ok(())
    }

    fn object(&mut self) -> Result<()> {
        let x = self.number()?;
        self.comma()?;
        let y = self.number()?;
        self.comma()?;
        let angle = self.number()?;
        self.comma()?;
        let kind = match self.index()? {
            None => ObjectKind::Door,
            Some(index) => match self.object_types.get(index) {
                Some(&id) => ObjectKind::Typed(id),
                None => return Err(ErrorKind::UnknownObjectType(self.line()).into()),
            },
        };
        let mut flags = ObjectFlags::empty();
        self.flags(|flag| match flag {
            "collidable" => flags.insert(ObjectFlags::COLLIDABLE),
            "foreground" => flags.insert(ObjectFlags::FOREGROUND),
            _ => {}
        })?;
        self.builder.add_object(v2(x, y), angle, kind, flags);
        Ok(())
    }

    fn stats(&mut self) -> Result<()> {
        self.open()?;
        let x = self.number()?;
        self.comma()?;
        let y = self.number()?;
        self.comma()?;
        let required = self.number()?;
        self.close()?;
        self.builder.set_stats(v2(x, y), required.max(0.0) as usize);
        Ok(())
    }

    fn read(mut self) -> Result<Level> {
        self.list(Self::material)?;
        self.list(Self::vertex)?;
        self.list(Self::triangle)?;
        self.list(Self::object_type)?;
        self.list(Self::object)?;
        self.stats()?;
        self.builder.build()
    }
}

/// Parses a level from text and builds it.
pub fn load_level_from_str(text: &str, assets: &AssetTable, config: &LevelConfig) -> Result<Level> {
    let reader = LevelReader {
        tokens: Tokenizer::new(text),
        assets,
        builder: LevelBuilder::new(assets, config),
        materials: Vec::new(),
        vertices: Vec::new(),
        object_types: Vec::new(),
    };
    reader.read()
}

/// Reads and builds the level file at `path`.
pub fn load_level<P: AsRef<Path>>(path: P, assets: &AssetTable, config: &LevelConfig) -> Result<Level> {
    let path = path.as_ref();
    info!("Loading level {}...", path.display());
    let text = fs::read_to_string(path).context(ErrorKind::Unreadable(path.display().to_string()))?;
    load_level_from_str(&text, assets, config)
}
