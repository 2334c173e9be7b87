//! XLIFF 1.2 reader and writer.
//!
//! Only the subset needed to carry one domain in one language is handled:
//! a single `<file>` whose `original` attribute names the domain and whose
//! `target-language` (or `source-language`) names the language, containing
//! `<trans-unit>` elements. A unit's string name is its `resname` attribute,
//! or its `<source>` text when `resname` is absent; its content is the
//! `<target>` text, or the source when there is no target.

use std::fmt::Write as _;
use std::io;
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{Error, Result};
use crate::model::{DomainFile, TranslationUnit};

/// File extension of interchange files.
pub const EXTENSION: &str = "xliff";

const XLIFF_VERSION: &str = "1.2";
const XLIFF_NAMESPACE: &str = "urn:oasis:names:tc:xliff:document:1.2";

/// Read and parse an interchange file.
pub fn read_file(path: &Path) -> Result<DomainFile> {
    let xml = std::fs::read_to_string(path)?;
    parse(&xml, path)
}

#[derive(Clone, Copy)]
enum Field {
    Source,
    Target,
}

#[derive(Default)]
struct UnitBuilder {
    resname: Option<String>,
    source: Option<String>,
    target: Option<String>,
}

impl UnitBuilder {
    fn set(&mut self, field: Field, text: String) {
        match field {
            Field::Source => self.source = Some(text),
            Field::Target => self.target = Some(text),
        }
    }

    fn build(self, path: &Path) -> Result<TranslationUnit> {
        let name = self
            .resname
            .filter(|n| !n.is_empty())
            .or_else(|| self.source.clone().filter(|s| !s.is_empty()))
            .ok_or_else(|| Error::parse(path, "trans-unit has neither resname nor source"))?;
        let content = self.target.or(self.source).unwrap_or_default();
        Ok(TranslationUnit { name, content })
    }
}

/// Parse XLIFF text. `path` is used for error reporting and as the fallback
/// source of the domain name.
pub fn parse(xml: &str, path: &Path) -> Result<DomainFile> {
    let mut reader = Reader::from_str(xml);

    let mut header: Option<(Option<String>, Option<String>)> = None;
    let mut units = Vec::new();
    let mut unit: Option<UnitBuilder> = None;
    let mut field: Option<Field> = None;
    let mut text = String::new();
    // Depth inside a unit child other than <source>/<target>, such as
    // <alt-trans> or <note>. Everything in there is ignored.
    let mut skipped = 0usize;

    loop {
        let event = reader.read_event().map_err(|e| {
            Error::parse(path, format!("{e} (at byte {})", reader.buffer_position()))
        })?;

        match event {
            Event::Start(_) if skipped > 0 => skipped += 1,
            Event::End(_) if skipped > 0 => skipped -= 1,
            _ if skipped > 0 => {}
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"file" => {
                if header.is_some() {
                    return Err(Error::parse(path, "multiple <file> elements"));
                }
                let language = attribute(&e, "target-language", path)?
                    .or(attribute(&e, "source-language", path)?);
                header = Some((attribute(&e, "original", path)?, language));
            }
            Event::Start(e) => match e.local_name().as_ref() {
                b"trans-unit" => {
                    unit = Some(UnitBuilder {
                        resname: attribute(&e, "resname", path)?,
                        ..Default::default()
                    });
                }
                b"source" if unit.is_some() && field.is_none() => {
                    field = Some(Field::Source);
                    text.clear();
                }
                b"target" if unit.is_some() && field.is_none() => {
                    field = Some(Field::Target);
                    text.clear();
                }
                // Inline markup inside <source>/<target> keeps its text.
                _ if field.is_some() => {}
                _ if unit.is_some() => skipped = 1,
                _ => {}
            },
            Event::Empty(e) => match (e.local_name().as_ref(), unit.as_mut()) {
                (b"trans-unit", None) => {
                    let empty = UnitBuilder {
                        resname: attribute(&e, "resname", path)?,
                        ..Default::default()
                    };
                    units.push(empty.build(path)?);
                }
                (b"source", Some(u)) if field.is_none() => u.set(Field::Source, String::new()),
                (b"target", Some(u)) if field.is_none() => u.set(Field::Target, String::new()),
                _ => {}
            },
            Event::Text(e) if field.is_some() => {
                let unescaped = e.unescape().map_err(|err| Error::parse(path, err))?;
                text.push_str(&unescaped);
            }
            Event::CData(e) if field.is_some() => {
                text.push_str(&String::from_utf8_lossy(&e));
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"source" | b"target" => {
                    if let (Some(f), Some(u)) = (field.take(), unit.as_mut()) {
                        u.set(f, std::mem::take(&mut text));
                    }
                }
                b"trans-unit" => {
                    if let Some(u) = unit.take() {
                        units.push(u.build(path)?);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    let Some((original, language)) = header else {
        return Err(Error::parse(path, "no <file> element"));
    };
    let language = language
        .filter(|l| !l.is_empty())
        .ok_or_else(|| Error::parse(path, "<file> declares no language"))?;
    let name = original
        .filter(|o| !o.is_empty())
        .or_else(|| domain_from_file_name(path))
        .ok_or_else(|| Error::parse(path, "cannot determine domain name"))?;

    Ok(DomainFile {
        name,
        language,
        units,
    })
}

fn attribute(e: &BytesStart<'_>, name: &str, path: &Path) -> Result<Option<String>> {
    let Some(attr) = e
        .try_get_attribute(name)
        .map_err(|err| Error::parse(path, err))?
    else {
        return Ok(None);
    };
    let value = attr
        .unescape_value()
        .map_err(|err| Error::parse(path, err))?;
    Ok(Some(value.into_owned()))
}

/// `messages.fr.xliff` -> `messages`.
fn domain_from_file_name(path: &Path) -> Option<String> {
    path.file_name()?
        .to_str()?
        .split('.')
        .next()
        .filter(|s| !s.is_empty())
        .map(decode_name_component)
}

/// Escape a domain or language name for use as one `.`-separated part of a
/// file name. `%`, `.`, path separators and control characters become `%XX`.
pub fn encode_name_component(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '%' | '.' | '/' | '\\' | '\0'..='\x1f' => {
                let _ = write!(out, "%{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

/// Inverse of [`encode_name_component`]. Malformed escapes are kept as is.
pub fn decode_name_component(part: &str) -> String {
    let bytes = part.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}

/// Serialize a domain file to XLIFF text.
pub fn to_string(file: &DomainFile) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(write_error)?;

    let root = BytesStart::new("xliff")
        .with_attributes([("version", XLIFF_VERSION), ("xmlns", XLIFF_NAMESPACE)]);
    writer.write_event(Event::Start(root)).map_err(write_error)?;

    let header = BytesStart::new("file").with_attributes([
        ("original", file.name.as_str()),
        ("source-language", file.language.as_str()),
        ("target-language", file.language.as_str()),
        ("datatype", "plaintext"),
    ]);
    writer.write_event(Event::Start(header)).map_err(write_error)?;
    writer
        .write_event(Event::Start(BytesStart::new("body")))
        .map_err(write_error)?;

    for (index, unit) in file.units.iter().enumerate() {
        let id = (index + 1).to_string();
        let start = BytesStart::new("trans-unit")
            .with_attributes([("id", id.as_str()), ("resname", unit.name.as_str())]);
        writer.write_event(Event::Start(start)).map_err(write_error)?;
        write_text_element(&mut writer, "source", &unit.name)?;
        write_text_element(&mut writer, "target", &unit.content)?;
        writer
            .write_event(Event::End(BytesEnd::new("trans-unit")))
            .map_err(write_error)?;
    }

    for tag in ["body", "file", "xliff"] {
        writer
            .write_event(Event::End(BytesEnd::new(tag)))
            .map_err(write_error)?;
    }

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    String::from_utf8(bytes).map_err(write_error)
}

/// Write `file` into `dir` as `<domain>.<language>.xliff`.
pub fn write_file(file: &DomainFile, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file.file_name());
    std::fs::write(&path, to_string(file)?)?;
    Ok(path)
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, tag: &str, text: &str) -> Result<()> {
    writer
        .write_event(Event::Start(BytesStart::new(tag)))
        .map_err(write_error)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(write_error)?;
    writer
        .write_event(Event::End(BytesEnd::new(tag)))
        .map_err(write_error)?;
    Ok(())
}

fn write_error(err: impl std::fmt::Display) -> Error {
    Error::Io(io::Error::new(io::ErrorKind::Other, err.to_string()))
}
