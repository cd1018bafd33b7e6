//! Single-pass JSON tokenizer that records where every path starts.
//!
//! Object members are anchored at the opening quote of their key, array
//! elements at their first character. Duplicate keys keep the first
//! occurrence. Returns `None` for text that does not tokenize, e.g. while
//! the user is halfway through an edit, or nests deeper than
//! [`MAX_DEPTH`].

use std::collections::HashMap;

use crate::diff::Path;

/// 1-based `(line, column)` in chars.
pub(crate) type Anchor = (usize, usize);

/// Matches serde_json's recursion limit.
pub(crate) const MAX_DEPTH: usize = 128;

pub(crate) fn index_anchors(text: &str) -> Option<HashMap<Path, Anchor>> {
  let mut scanner = Scanner::new(text);
  scanner.skip_whitespace();
  scanner.value(&Path::root())?;
  scanner.skip_whitespace();

  if scanner.peek().is_some() {
    return None;
  }
  Some(scanner.anchors)
}

struct Scanner {
  chars:   Vec<char>,
  pos:     usize,
  line:    usize,
  column:  usize,
  depth:   usize,
  anchors: HashMap<Path, Anchor>
}

impl Scanner {
  fn new(text: &str) -> Self {
    Self { chars: text.chars().collect(), pos: 0, line: 1, column: 1, depth: 0, anchors: HashMap::new() }
  }

  fn peek(&self) -> Option<char> {
    self.chars.get(self.pos).copied()
  }

  fn bump(&mut self) -> Option<char> {
    let c = self.peek()?;
    self.pos += 1;
    if c == '\n' {
      self.line += 1;
      self.column = 1;
    } else {
      self.column += 1;
    }
    Some(c)
  }

  fn expect(&mut self, expected: char) -> Option<()> {
    (self.bump()? == expected).then_some(())
  }

  fn here(&self) -> Anchor {
    (self.line, self.column)
  }

  fn skip_whitespace(&mut self) {
    while self.peek().is_some_and(char::is_whitespace) {
      self.bump();
    }
  }

  fn value(&mut self, path: &Path) -> Option<()> {
    match self.peek()? {
      open @ ('{' | '[') => {
        if self.depth == MAX_DEPTH {
          return None;
        }
        self.depth += 1;
        let nested = if open == '{' { self.object(path) } else { self.array(path) };
        self.depth -= 1;
        nested
      },
      '"' => self.string().map(|_| ()),
      't' => self.literal("true"),
      'f' => self.literal("false"),
      'n' => self.literal("null"),
      c if c == '-' || c.is_ascii_digit() => self.number(),
      _ => None
    }
  }

  fn object(&mut self, path: &Path) -> Option<()> {
    self.expect('{')?;
    self.skip_whitespace();
    if self.peek()? == '}' {
      self.bump();
      return Some(());
    }

    loop {
      self.skip_whitespace();
      let at = self.here();
      let key = self.string()?;
      let child = path.child(key);
      self.anchors.entry(child.clone()).or_insert(at);

      self.skip_whitespace();
      self.expect(':')?;
      self.skip_whitespace();
      self.value(&child)?;
      self.skip_whitespace();

      match self.bump()? {
        ',' => continue,
        '}' => return Some(()),
        _ => return None
      }
    }
  }

  fn array(&mut self, path: &Path) -> Option<()> {
    self.expect('[')?;
    self.skip_whitespace();
    if self.peek()? == ']' {
      self.bump();
      return Some(());
    }

    let mut index = 0;
    loop {
      self.skip_whitespace();
      let at = self.here();
      let child = path.child(index);
      self.anchors.entry(child.clone()).or_insert(at);
      self.value(&child)?;
      self.skip_whitespace();
      index += 1;

      match self.bump()? {
        ',' => continue,
        ']' => return Some(()),
        _ => return None
      }
    }
  }

  fn string(&mut self) -> Option<String> {
    self.expect('"')?;
    let mut out = String::new();

    loop {
      match self.bump()? {
        '"' => return Some(out),
        '\\' => {
          let escaped = match self.bump()? {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'u' => self.unicode_escape()?,
            other => other
          };
          out.push(escaped);
        },
        '\n' => return None,
        c => out.push(c)
      }
    }
  }

  fn unicode_escape(&mut self) -> Option<char> {
    let mut code = 0u32;
    for _ in 0..4 {
      code = code * 16 + self.bump()?.to_digit(16)?;
    }
    Some(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER))
  }

  fn number(&mut self) -> Option<()> {
    let start = self.pos;
    while self.peek().is_some_and(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E')) {
      self.bump();
    }
    (self.pos > start).then_some(())
  }

  fn literal(&mut self, word: &str) -> Option<()> {
    for expected in word.chars() {
      self.expect(expected)?;
    }
    Some(())
  }
}
