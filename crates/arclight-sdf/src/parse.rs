//! SDF tokenizer and grammar.
//!
//! Parses IEEE 1497 delay files into a small AST the annotator walks:
//! header entries, CELL groups, DELAY ABSOLUTE/INCREMENT definitions, and
//! TIMINGCHECK entries. Triple values stay in file units; the reader
//! applies the TIMESCALE.

use arclight_common::Transition;

use crate::error::SdfError;

/// `(min : typ : max)` with optional slots, or a single broadcast value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SdfTriple {
    pub min: Option<f32>,
    pub typ: Option<f32>,
    pub max: Option<f32>,
}

impl SdfTriple {
    pub fn from_value(value: f32) -> Self {
        SdfTriple {
            min: Some(value),
            typ: Some(value),
            max: Some(value),
        }
    }

    pub fn has_value(&self) -> bool {
        self.min.is_some() || self.typ.is_some() || self.max.is_some()
    }

    pub fn scaled(&self, scale: f32) -> Self {
        let s = |v: Option<f32>| v.map(|v| v * scale);
        SdfTriple {
            min: s(self.min),
            typ: s(self.typ),
            max: s(self.max),
        }
    }
}

/// A port reference with an optional edge and, for timing checks, an
/// optional condition.
#[derive(Debug, Clone, PartialEq)]
pub struct SdfPortSpec {
    pub transition: Transition,
    pub port: String,
    pub cond: Option<String>,
}

impl SdfPortSpec {
    pub fn wildcard(port: &str) -> Self {
        SdfPortSpec {
            transition: Transition::RiseFall,
            port: port.to_string(),
            cond: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SdfInstanceSpec {
    Path(String),
    Wildcard,
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SdfDelayDef {
    IoPath {
        from: SdfPortSpec,
        to: String,
        triples: Vec<SdfTriple>,
        cond: Option<String>,
        condelse: bool,
    },
    Interconnect {
        from: String,
        to: String,
        triples: Vec<SdfTriple>,
    },
    Port {
        to: String,
        triples: Vec<SdfTriple>,
    },
    Device {
        port: Option<String>,
        triples: Vec<SdfTriple>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SdfCheck {
    Setup {
        data: SdfPortSpec,
        clk: SdfPortSpec,
        triple: SdfTriple,
    },
    Hold {
        data: SdfPortSpec,
        clk: SdfPortSpec,
        triple: SdfTriple,
    },
    SetupHold {
        data: SdfPortSpec,
        clk: SdfPortSpec,
        setup: SdfTriple,
        hold: SdfTriple,
    },
    Recovery {
        data: SdfPortSpec,
        clk: SdfPortSpec,
        triple: SdfTriple,
    },
    Removal {
        data: SdfPortSpec,
        clk: SdfPortSpec,
        triple: SdfTriple,
    },
    RecRem {
        data: SdfPortSpec,
        clk: SdfPortSpec,
        recovery: SdfTriple,
        removal: SdfTriple,
    },
    Width {
        port: SdfPortSpec,
        triple: SdfTriple,
    },
    Period {
        port: SdfPortSpec,
        triple: SdfTriple,
    },
    Skew {
        data: SdfPortSpec,
        clk: SdfPortSpec,
        triple: SdfTriple,
    },
    Nochange {
        data: SdfPortSpec,
        clk: SdfPortSpec,
        before: SdfTriple,
        after: SdfTriple,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SdfCellEntry {
    Delay {
        incremental: bool,
        defs: Vec<SdfDelayDef>,
    },
    TimingChecks(Vec<SdfCheck>),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SdfCell {
    pub celltype: Option<String>,
    pub instance: Option<SdfInstanceSpec>,
    pub entries: Vec<SdfCellEntry>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SdfFile {
    pub design: Option<String>,
    pub divider: Option<char>,
    pub timescale: Option<(f32, String)>,
    pub cells: Vec<SdfCell>,
}

/* ─────────────────────────── tokenizer ───────────────────────────── */

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    LParen,
    RParen,
    Colon,
    Word(String),
    Str(String),
}

struct Tokens {
    toks: Vec<(Tok, u32)>,
    pos: usize,
    filename: String,
}

fn tokenize(src: &str, filename: &str) -> Result<Tokens, SdfError> {
    let bytes = src.as_bytes();
    let mut toks = Vec::new();
    let mut i = 0;
    let mut line = 1u32;
    while i < bytes.len() {
        let ch = bytes[i];
        match ch {
            b'\n' => {
                line += 1;
                i += 1;
            }
            b' ' | b'\t' | b'\r' => i += 1,
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    if bytes[i] == b'\n' {
                        line += 1;
                    }
                    i += 1;
                }
                if i + 1 >= bytes.len() {
                    return Err(SdfError::syntax(filename, line, "unterminated comment"));
                }
                i += 2;
            }
            b'(' => {
                toks.push((Tok::LParen, line));
                i += 1;
            }
            b')' => {
                toks.push((Tok::RParen, line));
                i += 1;
            }
            b':' => {
                toks.push((Tok::Colon, line));
                i += 1;
            }
            b'"' => {
                let start_line = line;
                i += 1;
                let mut text = String::new();
                loop {
                    match bytes.get(i) {
                        Some(b'"') => {
                            i += 1;
                            break;
                        }
                        Some(b'\\') => {
                            if let Some(next) = bytes.get(i + 1) {
                                text.push(*next as char);
                                i += 2;
                            } else {
                                return Err(SdfError::syntax(
                                    filename,
                                    start_line,
                                    "unterminated string",
                                ));
                            }
                        }
                        Some(ch) => {
                            if *ch == b'\n' {
                                line += 1;
                            }
                            text.push(*ch as char);
                            i += 1;
                        }
                        None => {
                            return Err(SdfError::syntax(
                                filename,
                                start_line,
                                "unterminated string",
                            ));
                        }
                    }
                }
                toks.push((Tok::Str(text), start_line));
            }
            _ => {
                let start = i;
                while i < bytes.len() {
                    match bytes[i] {
                        b'(' | b')' | b':' | b'"' | b' ' | b'\t' | b'\r' | b'\n' => break,
                        b'\\' => {
                            // Escaped character, keep it and the next.
                            i += 2;
                        }
                        _ => i += 1,
                    }
                }
                let i_end = i.min(bytes.len());
                toks.push((Tok::Word(src[start..i_end].to_string()), line));
            }
        }
    }
    Ok(Tokens {
        toks,
        pos: 0,
        filename: filename.to_string(),
    })
}

impl Tokens {
    fn peek(&self) -> Option<&Tok> {
        self.toks.get(self.pos).map(|(t, _)| t)
    }

    fn peek2(&self) -> Option<&Tok> {
        self.toks.get(self.pos + 1).map(|(t, _)| t)
    }

    fn line(&self) -> u32 {
        self.toks
            .get(self.pos.min(self.toks.len().saturating_sub(1)))
            .map_or(0, |(_, l)| *l)
    }

    fn bump(&mut self) -> Option<Tok> {
        let tok = self.toks.get(self.pos).map(|(t, _)| t.clone());
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn syntax(&self, msg: impl Into<String>) -> SdfError {
        SdfError::syntax(&self.filename, self.line(), msg)
    }

    fn expect_lparen(&mut self) -> Result<(), SdfError> {
        match self.bump() {
            Some(Tok::LParen) => Ok(()),
            _ => Err(self.syntax("expected '('")),
        }
    }

    fn expect_rparen(&mut self) -> Result<(), SdfError> {
        match self.bump() {
            Some(Tok::RParen) => Ok(()),
            _ => Err(self.syntax("expected ')'")),
        }
    }

    fn word(&mut self) -> Result<String, SdfError> {
        match self.bump() {
            Some(Tok::Word(w)) => Ok(w),
            Some(Tok::Str(s)) => Ok(s),
            _ => Err(self.syntax("expected a name")),
        }
    }

    /// Keyword at the head of a group, uppercased.
    fn keyword(&mut self) -> Result<String, SdfError> {
        Ok(self.word()?.to_ascii_uppercase())
    }

    /// Skip the remainder of the current group (after its keyword),
    /// including the closing paren.
    fn skip_group(&mut self) -> Result<(), SdfError> {
        let mut depth = 1usize;
        loop {
            match self.bump() {
                Some(Tok::LParen) => depth += 1,
                Some(Tok::RParen) => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                Some(_) => {}
                None => return Err(self.syntax("unterminated group")),
            }
        }
    }
}

/* ──────────────────────────── grammar ────────────────────────────── */

pub struct SdfParser {
    toks: Tokens,
}

impl SdfParser {
    pub fn new(src: &str, filename: &str) -> Result<Self, SdfError> {
        Ok(SdfParser {
            toks: tokenize(src, filename)?,
        })
    }

    pub fn parse(mut self) -> Result<SdfFile, SdfError> {
        let mut file = SdfFile::default();
        self.toks.expect_lparen()?;
        let kw = self.toks.keyword()?;
        if kw != "DELAYFILE" {
            return Err(self.toks.syntax("expected DELAYFILE"));
        }
        loop {
            match self.toks.peek() {
                Some(Tok::LParen) => {
                    self.toks.bump();
                    let kw = self.toks.keyword()?;
                    match kw.as_str() {
                        "DESIGN" => {
                            file.design = Some(self.toks.word()?);
                            self.toks.expect_rparen()?;
                        }
                        "DIVIDER" => {
                            let word = self.toks.word()?;
                            file.divider = word.chars().next();
                            self.toks.expect_rparen()?;
                        }
                        "TIMESCALE" => {
                            file.timescale = Some(self.parse_timescale()?);
                        }
                        "CELL" => {
                            file.cells.push(self.parse_cell()?);
                        }
                        // SDFVERSION, DATE, VENDOR, PROGRAM, VERSION,
                        // VOLTAGE, PROCESS, TEMPERATURE: recorded nowhere.
                        _ => self.toks.skip_group()?,
                    }
                }
                Some(Tok::RParen) => {
                    self.toks.bump();
                    return Ok(file);
                }
                _ => return Err(self.toks.syntax("expected a group")),
            }
        }
    }

    fn parse_timescale(&mut self) -> Result<(f32, String), SdfError> {
        // Either "10ps" as one word or "10 ps" as two.
        let word = self.toks.word()?;
        let (mult_str, units) = match word.find(|c: char| c.is_ascii_alphabetic()) {
            Some(split) if split > 0 => {
                let (m, u) = word.split_at(split);
                (m.to_string(), u.to_string())
            }
            Some(_) => (String::from("1"), word),
            None => (word, self.toks.word()?),
        };
        let mult: f32 = mult_str
            .parse()
            .map_err(|_| self.toks.syntax("bad TIMESCALE multiplier"))?;
        self.toks.expect_rparen()?;
        Ok((mult, units.to_lowercase()))
    }

    fn parse_cell(&mut self) -> Result<SdfCell, SdfError> {
        let mut cell = SdfCell::default();
        loop {
            match self.toks.peek() {
                Some(Tok::LParen) => {
                    self.toks.bump();
                    let kw = self.toks.keyword()?;
                    match kw.as_str() {
                        "CELLTYPE" => {
                            cell.celltype = Some(self.toks.word()?);
                            self.toks.expect_rparen()?;
                        }
                        "INSTANCE" => {
                            cell.instance = Some(match self.toks.peek() {
                                Some(Tok::RParen) => SdfInstanceSpec::Empty,
                                Some(Tok::Word(w)) if w == "*" => {
                                    self.toks.bump();
                                    SdfInstanceSpec::Wildcard
                                }
                                _ => SdfInstanceSpec::Path(self.toks.word()?),
                            });
                            self.toks.expect_rparen()?;
                        }
                        "DELAY" => {
                            cell.entries.extend(self.parse_delay()?);
                            // parse_delay consumes the DELAY close paren.
                        }
                        "TIMINGCHECK" => {
                            cell.entries
                                .push(SdfCellEntry::TimingChecks(self.parse_timing_checks()?));
                        }
                        _ => self.toks.skip_group()?,
                    }
                }
                Some(Tok::RParen) => {
                    self.toks.bump();
                    return Ok(cell);
                }
                _ => return Err(self.toks.syntax("expected a CELL entry")),
            }
        }
    }

    fn parse_delay(&mut self) -> Result<Vec<SdfCellEntry>, SdfError> {
        let mut entries = Vec::new();
        loop {
            match self.toks.peek() {
                Some(Tok::LParen) => {
                    self.toks.bump();
                    let kw = self.toks.keyword()?;
                    match kw.as_str() {
                        "ABSOLUTE" => entries.push(SdfCellEntry::Delay {
                            incremental: false,
                            defs: self.parse_delay_defs()?,
                        }),
                        "INCREMENT" | "INCREMENTAL" => entries.push(SdfCellEntry::Delay {
                            incremental: true,
                            defs: self.parse_delay_defs()?,
                        }),
                        _ => self.toks.skip_group()?,
                    }
                }
                Some(Tok::RParen) => {
                    self.toks.bump();
                    return Ok(entries);
                }
                _ => return Err(self.toks.syntax("expected ABSOLUTE or INCREMENT")),
            }
        }
    }

    fn parse_delay_defs(&mut self) -> Result<Vec<SdfDelayDef>, SdfError> {
        let mut defs = Vec::new();
        loop {
            match self.toks.peek() {
                Some(Tok::LParen) => {
                    self.toks.bump();
                    let kw = self.toks.keyword()?;
                    match kw.as_str() {
                        "IOPATH" => defs.push(self.parse_iopath(None, false)?),
                        "COND" => {
                            let cond = self.parse_cond_text()?;
                            // The conditioned construct follows.
                            self.toks.expect_lparen()?;
                            let inner = self.toks.keyword()?;
                            if inner == "IOPATH" {
                                defs.push(self.parse_iopath(Some(cond), false)?);
                            } else {
                                self.toks.skip_group()?;
                            }
                            self.toks.expect_rparen()?;
                        }
                        "CONDELSE" => {
                            self.toks.expect_lparen()?;
                            let inner = self.toks.keyword()?;
                            if inner == "IOPATH" {
                                defs.push(self.parse_iopath(None, true)?);
                            } else {
                                self.toks.skip_group()?;
                            }
                            self.toks.expect_rparen()?;
                        }
                        "INTERCONNECT" => {
                            let from = self.toks.word()?;
                            let to = self.toks.word()?;
                            let triples = self.parse_triples()?;
                            defs.push(SdfDelayDef::Interconnect { from, to, triples });
                        }
                        "PORT" => {
                            let to = self.toks.word()?;
                            let triples = self.parse_triples()?;
                            defs.push(SdfDelayDef::Port { to, triples });
                        }
                        "DEVICE" => {
                            let port = match self.toks.peek() {
                                Some(Tok::Word(_)) | Some(Tok::Str(_)) => Some(self.toks.word()?),
                                _ => None,
                            };
                            let triples = self.parse_triples()?;
                            defs.push(SdfDelayDef::Device { port, triples });
                        }
                        _ => self.toks.skip_group()?,
                    }
                }
                Some(Tok::RParen) => {
                    self.toks.bump();
                    return Ok(defs);
                }
                _ => return Err(self.toks.syntax("expected a delay definition")),
            }
        }
    }

    fn parse_iopath(
        &mut self,
        cond: Option<String>,
        condelse: bool,
    ) -> Result<SdfDelayDef, SdfError> {
        let from = self.parse_port_spec()?;
        let to = self.toks.word()?;
        // RETAIN groups are not annotated; skip them.
        let mut triples = Vec::new();
        loop {
            match self.toks.peek() {
                Some(Tok::LParen) => {
                    if let Some(Tok::Word(w)) = self.toks.peek2() {
                        if w.eq_ignore_ascii_case("retain") {
                            self.toks.bump();
                            self.toks.bump();
                            self.toks.skip_group()?;
                            continue;
                        }
                    }
                    triples.push(self.parse_triple()?);
                }
                Some(Tok::RParen) => {
                    self.toks.bump();
                    return Ok(SdfDelayDef::IoPath {
                        from,
                        to,
                        triples,
                        cond,
                        condelse,
                    });
                }
                _ => return Err(self.toks.syntax("expected a triple")),
            }
        }
    }

    /// Condition text after COND up to the conditioned construct's
    /// opening paren.
    fn parse_cond_text(&mut self) -> Result<String, SdfError> {
        let mut text = String::new();
        loop {
            match self.toks.peek() {
                Some(Tok::LParen) => return Ok(text.trim().to_string()),
                Some(Tok::RParen) => return Ok(text.trim().to_string()),
                Some(_) => {
                    let tok = self.toks.bump();
                    match tok {
                        Some(Tok::Word(w)) => {
                            if !text.is_empty() {
                                text.push(' ');
                            }
                            text.push_str(&w);
                        }
                        Some(Tok::Str(s)) => {
                            if !text.is_empty() {
                                text.push(' ');
                            }
                            text.push_str(&s);
                        }
                        Some(Tok::Colon) => text.push(':'),
                        _ => {}
                    }
                }
                None => return Err(self.toks.syntax("unterminated COND")),
            }
        }
    }

    fn parse_timing_checks(&mut self) -> Result<Vec<SdfCheck>, SdfError> {
        let mut checks = Vec::new();
        loop {
            match self.toks.peek() {
                Some(Tok::LParen) => {
                    self.toks.bump();
                    let kw = self.toks.keyword()?;
                    match kw.as_str() {
                        "SETUP" => {
                            let (data, clk, triple) = self.parse_check_2port_1triple()?;
                            checks.push(SdfCheck::Setup { data, clk, triple });
                        }
                        "HOLD" => {
                            let (data, clk, triple) = self.parse_check_2port_1triple()?;
                            checks.push(SdfCheck::Hold { data, clk, triple });
                        }
                        "SETUPHOLD" => {
                            let data = self.parse_port_spec()?;
                            let clk = self.parse_port_spec()?;
                            let setup = self.parse_triple()?;
                            let hold = self.parse_triple()?;
                            self.toks.expect_rparen()?;
                            checks.push(SdfCheck::SetupHold {
                                data,
                                clk,
                                setup,
                                hold,
                            });
                        }
                        "RECOVERY" => {
                            let (data, clk, triple) = self.parse_check_2port_1triple()?;
                            checks.push(SdfCheck::Recovery { data, clk, triple });
                        }
                        "REMOVAL" => {
                            let (data, clk, triple) = self.parse_check_2port_1triple()?;
                            checks.push(SdfCheck::Removal { data, clk, triple });
                        }
                        "RECREM" => {
                            let data = self.parse_port_spec()?;
                            let clk = self.parse_port_spec()?;
                            let recovery = self.parse_triple()?;
                            let removal = self.parse_triple()?;
                            self.toks.expect_rparen()?;
                            checks.push(SdfCheck::RecRem {
                                data,
                                clk,
                                recovery,
                                removal,
                            });
                        }
                        "SKEW" => {
                            let (data, clk, triple) = self.parse_check_2port_1triple()?;
                            checks.push(SdfCheck::Skew { data, clk, triple });
                        }
                        "WIDTH" => {
                            let port = self.parse_port_spec()?;
                            let triple = self.parse_triple()?;
                            self.toks.expect_rparen()?;
                            checks.push(SdfCheck::Width { port, triple });
                        }
                        "PERIOD" => {
                            let port = self.parse_port_spec()?;
                            let triple = self.parse_triple()?;
                            self.toks.expect_rparen()?;
                            checks.push(SdfCheck::Period { port, triple });
                        }
                        "NOCHANGE" => {
                            let data = self.parse_port_spec()?;
                            let clk = self.parse_port_spec()?;
                            let before = self.parse_triple()?;
                            let after = self.parse_triple()?;
                            self.toks.expect_rparen()?;
                            checks.push(SdfCheck::Nochange {
                                data,
                                clk,
                                before,
                                after,
                            });
                        }
                        _ => self.toks.skip_group()?,
                    }
                }
                Some(Tok::RParen) => {
                    self.toks.bump();
                    return Ok(checks);
                }
                _ => return Err(self.toks.syntax("expected a timing check")),
            }
        }
    }

    fn parse_check_2port_1triple(
        &mut self,
    ) -> Result<(SdfPortSpec, SdfPortSpec, SdfTriple), SdfError> {
        let data = self.parse_port_spec()?;
        let clk = self.parse_port_spec()?;
        let triple = self.parse_triple()?;
        self.toks.expect_rparen()?;
        Ok((data, clk, triple))
    }

    /// `port`, `(posedge port)`, `(negedge port)`, `(01 port)`, or
    /// `(COND expr port-or-edge)`.
    fn parse_port_spec(&mut self) -> Result<SdfPortSpec, SdfError> {
        match self.toks.peek() {
            Some(Tok::Word(_)) | Some(Tok::Str(_)) => {
                Ok(SdfPortSpec::wildcard(&self.toks.word()?))
            }
            Some(Tok::LParen) => {
                self.toks.bump();
                let word = self.toks.word()?;
                if word.eq_ignore_ascii_case("cond") {
                    let spec = self.parse_cond_port_spec()?;
                    self.toks.expect_rparen()?;
                    return Ok(spec);
                }
                let transition = edge_transition(&word)
                    .ok_or_else(|| self.toks.syntax(format!("unknown edge {word}")))?;
                let port = self.toks.word()?;
                self.toks.expect_rparen()?;
                Ok(SdfPortSpec {
                    transition,
                    port,
                    cond: None,
                })
            }
            _ => Err(self.toks.syntax("expected a port")),
        }
    }

    fn parse_cond_port_spec(&mut self) -> Result<SdfPortSpec, SdfError> {
        // Condition tokens run until the port: either a nested edge group
        // or the last bare word before ')'.
        let mut words: Vec<String> = Vec::new();
        loop {
            match self.toks.peek() {
                Some(Tok::LParen) => {
                    // Nested edge spec terminates the condition.
                    self.toks.bump();
                    let edge_word = self.toks.word()?;
                    let transition = edge_transition(&edge_word)
                        .ok_or_else(|| self.toks.syntax(format!("unknown edge {edge_word}")))?;
                    let port = self.toks.word()?;
                    self.toks.expect_rparen()?;
                    return Ok(SdfPortSpec {
                        transition,
                        port,
                        cond: Some(words.join(" ")),
                    });
                }
                Some(Tok::RParen) => {
                    // The last word is the port, the rest the condition.
                    let port = words
                        .pop()
                        .ok_or_else(|| self.toks.syntax("COND missing port"))?;
                    return Ok(SdfPortSpec {
                        transition: Transition::RiseFall,
                        port,
                        cond: Some(words.join(" ")),
                    });
                }
                Some(_) => match self.toks.bump() {
                    Some(Tok::Word(w)) => words.push(w),
                    Some(Tok::Str(s)) => words.push(s),
                    Some(Tok::Colon) => words.push(":".to_string()),
                    _ => {}
                },
                None => return Err(self.toks.syntax("unterminated COND")),
            }
        }
    }

    fn parse_triples(&mut self) -> Result<Vec<SdfTriple>, SdfError> {
        let mut triples = Vec::new();
        loop {
            match self.toks.peek() {
                Some(Tok::LParen) => triples.push(self.parse_triple()?),
                Some(Tok::RParen) => {
                    self.toks.bump();
                    return Ok(triples);
                }
                _ => return Err(self.toks.syntax("expected a triple")),
            }
        }
    }

    /// `(v)`, `(min:typ:max)` with any slot empty, or `()`.
    fn parse_triple(&mut self) -> Result<SdfTriple, SdfError> {
        self.toks.expect_lparen()?;
        let mut slots: [Option<f32>; 3] = [None, None, None];
        let mut slot = 0usize;
        let mut seen_colon = false;
        let mut count = 0usize;
        loop {
            match self.toks.bump() {
                Some(Tok::RParen) => break,
                Some(Tok::Colon) => {
                    slot += 1;
                    seen_colon = true;
                    if slot > 2 {
                        return Err(self.toks.syntax("triple has too many slots"));
                    }
                }
                Some(Tok::Word(w)) => {
                    let value: f32 = w
                        .parse()
                        .map_err(|_| self.toks.syntax(format!("bad triple value {w}")))?;
                    slots[slot] = Some(value);
                    count += 1;
                }
                _ => return Err(self.toks.syntax("bad triple")),
            }
        }
        if !seen_colon && count == 1 {
            // Single value broadcasts to all three slots.
            let value = slots[0];
            return Ok(SdfTriple {
                min: value,
                typ: value,
                max: value,
            });
        }
        Ok(SdfTriple {
            min: slots[0],
            typ: slots[1],
            max: slots[2],
        })
    }
}

fn edge_transition(word: &str) -> Option<Transition> {
    match word.to_ascii_lowercase().as_str() {
        "posedge" => Some(Transition::Rise),
        "negedge" => Some(Transition::Fall),
        other => Transition::find(other),
    }
}

/// Parse SDF text to its AST.
pub fn parse_sdf(src: &str, filename: &str) -> Result<SdfFile, SdfError> {
    SdfParser::new(src, filename)?.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_header_and_iopath() {
        let src = r#"
(DELAYFILE
 (SDFVERSION "3.0")
 (DESIGN "top")
 (DIVIDER /)
 (TIMESCALE 1ns)
 (CELL
  (CELLTYPE "BUF1")
  (INSTANCE u1)
  (DELAY
   (ABSOLUTE
    (IOPATH A Z (0.3:0.3:0.3) (0.4:0.4:0.4))
   )
  )
 )
)
"#;
        let file = parse_sdf(src, "test.sdf").unwrap();
        assert_eq!(file.design.as_deref(), Some("top"));
        assert_eq!(file.divider, Some('/'));
        assert_eq!(file.timescale, Some((1.0, "ns".to_string())));
        assert_eq!(file.cells.len(), 1);
        let cell = &file.cells[0];
        assert_eq!(cell.celltype.as_deref(), Some("BUF1"));
        assert_eq!(
            cell.instance,
            Some(SdfInstanceSpec::Path("u1".to_string()))
        );
        match &cell.entries[0] {
            SdfCellEntry::Delay { incremental, defs } => {
                assert!(!incremental);
                match &defs[0] {
                    SdfDelayDef::IoPath { from, to, triples, cond, condelse } => {
                        assert_eq!(from.port, "A");
                        assert_eq!(from.transition, Transition::RiseFall);
                        assert_eq!(to, "Z");
                        assert_eq!(triples.len(), 2);
                        assert_eq!(triples[0].min, Some(0.3));
                        assert_eq!(triples[1].max, Some(0.4));
                        assert!(cond.is_none());
                        assert!(!condelse);
                    }
                    other => panic!("unexpected {other:?}"),
                }
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn triples_with_empty_slots_and_broadcast() {
        let src = r#"
(DELAYFILE
 (CELL
  (INSTANCE u1)
  (DELAY (ABSOLUTE (IOPATH A Z (::0.5) (1.5))))
 )
)
"#;
        let file = parse_sdf(src, "test.sdf").unwrap();
        match &file.cells[0].entries[0] {
            SdfCellEntry::Delay { defs, .. } => match &defs[0] {
                SdfDelayDef::IoPath { triples, .. } => {
                    assert_eq!(triples[0].min, None);
                    assert_eq!(triples[0].typ, None);
                    assert_eq!(triples[0].max, Some(0.5));
                    assert_eq!(triples[1].min, Some(1.5));
                    assert_eq!(triples[1].typ, Some(1.5));
                    assert_eq!(triples[1].max, Some(1.5));
                }
                other => panic!("unexpected {other:?}"),
            },
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parses_timing_checks() {
        let src = r#"
(DELAYFILE
 (CELL
  (INSTANCE u2)
  (TIMINGCHECK
   (SETUP D (posedge CK) (0.2))
   (HOLD D (posedge CK) (0.1))
   (WIDTH (negedge CK) (0.6))
   (SETUPHOLD D (posedge CK) (0.2) (0.1))
  )
 )
)
"#;
        let file = parse_sdf(src, "test.sdf").unwrap();
        match &file.cells[0].entries[0] {
            SdfCellEntry::TimingChecks(checks) => {
                assert_eq!(checks.len(), 4);
                match &checks[0] {
                    SdfCheck::Setup { data, clk, triple } => {
                        assert_eq!(data.port, "D");
                        assert_eq!(data.transition, Transition::RiseFall);
                        assert_eq!(clk.port, "CK");
                        assert_eq!(clk.transition, Transition::Rise);
                        assert_eq!(triple.max, Some(0.2));
                    }
                    other => panic!("unexpected {other:?}"),
                }
                match &checks[2] {
                    SdfCheck::Width { port, .. } => {
                        assert_eq!(port.transition, Transition::Fall);
                    }
                    other => panic!("unexpected {other:?}"),
                }
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn cond_iopath_and_wildcard_instance() {
        let src = r#"
(DELAYFILE
 (CELL
  (INSTANCE *)
  (DELAY (ABSOLUTE
    (COND EN == 1'b1 (IOPATH A Z (0.3)))
    (CONDELSE (IOPATH A Z (0.5)))
  ))
 )
)
"#;
        let file = parse_sdf(src, "test.sdf").unwrap();
        assert_eq!(file.cells[0].instance, Some(SdfInstanceSpec::Wildcard));
        match &file.cells[0].entries[0] {
            SdfCellEntry::Delay { defs, .. } => {
                match &defs[0] {
                    SdfDelayDef::IoPath { cond, condelse, .. } => {
                        assert_eq!(cond.as_deref(), Some("EN == 1'b1"));
                        assert!(!condelse);
                    }
                    other => panic!("unexpected {other:?}"),
                }
                match &defs[1] {
                    SdfDelayDef::IoPath { cond, condelse, .. } => {
                        assert!(cond.is_none());
                        assert!(condelse);
                    }
                    other => panic!("unexpected {other:?}"),
                }
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn interconnect_and_port_and_device() {
        let src = r#"
(DELAYFILE
 (CELL
  (INSTANCE u3)
  (DELAY (INCREMENT
    (INTERCONNECT top/u1/Z top/u2/A (0.05))
    (PORT u2/A (0.02))
    (DEVICE Z (0.07))
  ))
 )
)
"#;
        let file = parse_sdf(src, "test.sdf").unwrap();
        match &file.cells[0].entries[0] {
            SdfCellEntry::Delay { incremental, defs } => {
                assert!(*incremental);
                assert!(matches!(&defs[0], SdfDelayDef::Interconnect { from, to, .. }
                    if from == "top/u1/Z" && to == "top/u2/A"));
                assert!(matches!(&defs[1], SdfDelayDef::Port { to, .. } if to == "u2/A"));
                assert!(matches!(&defs[2], SdfDelayDef::Device { port: Some(p), .. } if p == "Z"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn syntax_errors_carry_position() {
        let err = parse_sdf("(DELAYFILE (CELL", "bad.sdf").unwrap_err();
        match err {
            SdfError::Syntax { filename, .. } => assert_eq!(filename, "bad.sdf"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
