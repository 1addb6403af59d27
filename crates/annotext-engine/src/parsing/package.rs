//! Access to the parts of an OPC package (the zip container of a `.docx`).

use std::collections::HashMap;
use std::io::{Read, Seek};

use zip::ZipArchive;
use zip::result::ZipError;

use super::ParseError;
use super::xml::{attr, scan_elements};

const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const ROOT_RELATIONSHIPS_PART: &str = "_rels/.rels";
const OFFICE_DOCUMENT_SUFFIX: &str = "/officeDocument";
const MAX_READ_HINT: u64 = 1 << 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub kind: String,
    /// Part name the target resolves to, without a leading `/`.
    pub target: String,
    pub external: bool,
}

/// Relationships of one source part, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    by_id: HashMap<String, Relationship>,
}

impl Relationships {
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.by_id.get(id)
    }

    pub fn find_by_kind_suffix(&self, suffix: &str) -> Option<&Relationship> {
        let mut matching: Vec<_> = self
            .by_id
            .values()
            .filter(|r| r.kind.ends_with(suffix))
            .collect();
        matching.sort_by(|a, b| a.id.cmp(&b.id));
        matching.into_iter().next()
    }
}

#[derive(Debug, Clone, Default)]
struct ContentTypes {
    defaults: HashMap<String, String>,
    overrides: HashMap<String, String>,
}

impl ContentTypes {
    fn lookup(&self, part: &str) -> Option<&str> {
        if let Some(ct) = self.overrides.get(part) {
            return Some(ct);
        }
        let extension = part.rsplit_once('.')?.1.to_ascii_lowercase();
        self.defaults.get(&extension).map(String::as_str)
    }
}

pub struct Package<R: Read + Seek> {
    archive: ZipArchive<R>,
    content_types: ContentTypes,
}

impl<R: Read + Seek> Package<R> {
    pub fn open(reader: R) -> Result<Self, ParseError> {
        let mut package = Self {
            archive: ZipArchive::new(reader)?,
            content_types: ContentTypes::default(),
        };
        if let Some(xml) = package.try_read_part(CONTENT_TYPES_PART)? {
            package.content_types = parse_content_types(&xml)?;
        }
        Ok(package)
    }

    pub fn read_part(&mut self, name: &str) -> Result<Vec<u8>, ParseError> {
        self.try_read_part(name)?
            .ok_or_else(|| ParseError::MissingPart(name.to_string()))
    }

    pub fn try_read_part(&mut self, name: &str) -> Result<Option<Vec<u8>>, ParseError> {
        let mut file = match self.archive.by_name(name.trim_start_matches('/')) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let mut bytes = Vec::with_capacity(read_capacity(file.size()));
        file.read_to_end(&mut bytes)?;
        Ok(Some(bytes))
    }

    pub fn content_type(&self, part: &str) -> Option<&str> {
        self.content_types.lookup(part.trim_start_matches('/'))
    }

    /// Relationships declared by `part`. A part without a `.rels` file has none.
    pub fn relationships(&mut self, part: &str) -> Result<Relationships, ParseError> {
        let rels_part = relationships_part_for(part);
        match self.try_read_part(&rels_part)? {
            Some(xml) => parse_relationships(&rels_part, part, &xml),
            None => Ok(Relationships::default()),
        }
    }

    /// Name of the main document part, found through the package relationships.
    pub fn main_part_name(&mut self) -> Result<String, ParseError> {
        let xml = self
            .try_read_part(ROOT_RELATIONSHIPS_PART)?
            .ok_or(ParseError::MissingMainPart)?;
        let rels = parse_relationships(ROOT_RELATIONSHIPS_PART, "", &xml)?;
        rels.find_by_kind_suffix(OFFICE_DOCUMENT_SUFFIX)
            .filter(|r| !r.external)
            .map(|r| r.target.clone())
            .ok_or(ParseError::MissingMainPart)
    }
}

fn relationships_part_for(part: &str) -> String {
    let part = part.trim_start_matches('/');
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{dir}/_rels/{file}.rels"),
        None => format!("_rels/{part}.rels"),
    }
}

/// Resolves a relationship target against the folder of its source part.
pub(crate) fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return normalize(absolute.split('/'));
    }
    let base = source_part
        .trim_start_matches('/')
        .rsplit_once('/')
        .map_or("", |(dir, _)| dir);
    normalize(base.split('/').chain(target.split('/')))
}

fn normalize<'a>(segments: impl Iterator<Item = &'a str>) -> String {
    let mut out: Vec<&str> = Vec::new();
    for segment in segments {
        match segment {
            "" | "." => {}
            ".." => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out.join("/")
}

fn parse_relationships(
    rels_part: &str,
    source_part: &str,
    xml: &[u8],
) -> Result<Relationships, ParseError> {
    let mut by_id = HashMap::new();
    scan_elements(rels_part, xml, |name, e| {
        if name != b"Relationship" {
            return;
        }
        let (Some(id), Some(kind), Some(target)) =
            (attr(e, b"Id"), attr(e, b"Type"), attr(e, b"Target"))
        else {
            return;
        };
        let external = attr(e, b"TargetMode").is_some_and(|m| m == "External");
        let target = if external {
            target
        } else {
            resolve_target(source_part, &target)
        };
        by_id.insert(
            id.clone(),
            Relationship {
                id,
                kind,
                target,
                external,
            },
        );
    })?;
    Ok(Relationships { by_id })
}

fn parse_content_types(xml: &[u8]) -> Result<ContentTypes, ParseError> {
    let mut types = ContentTypes::default();
    scan_elements(CONTENT_TYPES_PART, xml, |name, e| match name {
        b"Default" => {
            if let (Some(ext), Some(ct)) = (attr(e, b"Extension"), attr(e, b"ContentType")) {
                types.defaults.insert(ext.to_ascii_lowercase(), ct);
            }
        }
        b"Override" => {
            if let (Some(part), Some(ct)) = (attr(e, b"PartName"), attr(e, b"ContentType")) {
                types
                    .overrides
                    .insert(part.trim_start_matches('/').to_string(), ct);
            }
        }
        _ => {}
    })?;
    Ok(types)
}

/// Up-front allocation for a part whose archive entry declares `declared`
/// uncompressed bytes. The declaration is not trusted beyond a small cap.
fn read_capacity(declared: u64) -> usize {
    declared.min(MAX_READ_HINT) as usize
}
