//! MAME software-list manifest parsing.
//!
//! A manifest looks like:
//!
//! ```xml
//! <softwarelist name="coco_cart">
//!   <software name="daggorath">
//!     <part name="cart" interface="coco_cart">
//!       <dataarea name="rom" size="8192">
//!         <rom name="dungeons of daggorath (1982)(tandy).rom" size="8192"
//!              crc="8d5f2bab" sha1="..."/>
//!       </dataarea>
//!     </part>
//!   </software>
//! </softwarelist>
//! ```
//!
//! Only `<rom>` elements nested (at any depth) inside a `<software>` element
//! below the document root are read. Everything else is ignored.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::BytesStart;
use quick_xml::events::Event;

use crate::Result;
use crate::VerifyError;

/// Expected size and digests of one ROM image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// The `name` attribute of the `<rom>` element.
    pub name: String,
    /// Declared size in bytes.
    pub expected_size: u64,
    /// Declared CRC-32, lowercase hex.
    pub expected_crc32: String,
    /// Declared SHA-1, lowercase hex.
    pub expected_sha1: String,
}

/// Mapping from ROM name to its expected values.
///
/// Iteration is ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: BTreeMap<String, ManifestEntry>,
}

impl Manifest {
    /// Creates an empty manifest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a manifest from entries; later duplicates replace earlier ones.
    pub fn from_entries(entries: impl IntoIterator<Item = ManifestEntry>) -> Self {
        let mut manifest = Self::new();
        for entry in entries {
            manifest.insert(entry);
        }
        manifest
    }

    /// Inserts an entry, replacing any entry with the same name.
    pub fn insert(&mut self, entry: ManifestEntry) -> Option<ManifestEntry> {
        self.entries.insert(entry.name.clone(), entry)
    }

    /// Number of distinct ROM names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no `<rom>` element was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up an entry by ROM name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ManifestEntry> {
        self.entries.get(name)
    }

    /// Iterates over all entries.
    pub fn iter(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.entries.values()
    }

    /// Entries whose declared size equals `size`.
    pub fn entries_with_size(&self, size: u64) -> impl Iterator<Item = &ManifestEntry> {
        self.entries
            .values()
            .filter(move |entry| entry.expected_size == size)
    }
}

/// Parses the manifest at `path`.
///
/// # Errors
///
/// - [`VerifyError::Io`] if the file cannot be opened
/// - [`VerifyError::Parse`] if the document is not well-formed
/// - [`VerifyError::MissingAttribute`] / [`VerifyError::Format`] for a bad
///   `<rom>` element
///
/// An empty [`Manifest`] is returned, not an error, when the document has no
/// `<rom>` elements.
pub fn parse_manifest(path: &Path) -> Result<Manifest> {
    let file = File::open(path)?;
    parse_manifest_reader(BufReader::new(file))
}

/// Parses a manifest held in memory.
pub fn parse_manifest_str(xml: &str) -> Result<Manifest> {
    parse_manifest_reader(xml.as_bytes())
}

/// Parses a manifest from any buffered reader.
pub fn parse_manifest_reader<R: BufRead>(source: R) -> Result<Manifest> {
    let mut reader = Reader::from_reader(source);
    let mut buf = Vec::new();
    let mut manifest = Manifest::new();

    // Names of the currently open elements, outermost first.
    let mut open: Vec<Vec<u8>> = Vec::new();
    // Open `<software>` elements excluding the document root.
    let mut software_depth = 0usize;
    let mut seen_root = false;

    loop {
        let position = reader.buffer_position();
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| VerifyError::Parse(format!("near byte {position}: {e}")))?
        {
            Event::Start(ref element) => {
                check_root(&open, &mut seen_root)?;
                let name = element.name().as_ref().to_vec();
                if name == b"rom" && software_depth > 0 {
                    manifest.insert(read_rom(element)?);
                }
                if name == b"software" && !open.is_empty() {
                    software_depth += 1;
                }
                open.push(name);
            }
            Event::Empty(ref element) => {
                check_root(&open, &mut seen_root)?;
                if element.name().as_ref() == b"rom" && software_depth > 0 {
                    manifest.insert(read_rom(element)?);
                }
            }
            Event::End(ref element) => {
                let Some(name) = open.pop() else {
                    return Err(VerifyError::Parse(format!(
                        "unmatched end tag </{}>",
                        String::from_utf8_lossy(element.name().as_ref())
                    )));
                };
                if name == b"software" && !open.is_empty() {
                    software_depth -= 1;
                }
            }
            Event::Text(ref text) => {
                if open.is_empty() && !text.iter().all(u8::is_ascii_whitespace) {
                    return Err(VerifyError::Parse(
                        "text content outside the root element".to_string(),
                    ));
                }
            }
            Event::CData(_) if open.is_empty() => {
                return Err(VerifyError::Parse(
                    "CDATA section outside the root element".to_string(),
                ));
            }
            Event::Eof => {
                if let Some(name) = open.last() {
                    return Err(VerifyError::Parse(format!(
                        "unexpected end of document: <{}> is not closed",
                        String::from_utf8_lossy(name)
                    )));
                }
                if !seen_root {
                    return Err(VerifyError::Parse("no element found".to_string()));
                }
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    tracing::debug!(entries = manifest.len(), "parsed manifest");
    Ok(manifest)
}

fn check_root(open: &[Vec<u8>], seen_root: &mut bool) -> Result<()> {
    if open.is_empty() {
        if *seen_root {
            return Err(VerifyError::Parse(
                "junk after document element".to_string(),
            ));
        }
        *seen_root = true;
    }
    Ok(())
}

fn read_rom(element: &BytesStart<'_>) -> Result<ManifestEntry> {
    let name = attribute(element, "name")?.ok_or_else(|| VerifyError::MissingAttribute {
        name: "<unnamed>".to_string(),
        attribute: "name",
    })?;

    let require = |key: &'static str| -> Result<String> {
        attribute(element, key)?.ok_or_else(|| VerifyError::MissingAttribute {
            name: name.clone(),
            attribute: key,
        })
    };

    let size_raw = require("size")?;
    let crc = require("crc")?;
    let sha1 = require("sha1")?;

    let expected_size = size_raw
        .trim()
        .parse::<u64>()
        .map_err(|_| VerifyError::Format {
            attribute: "size",
            value: size_raw.clone(),
        })?;

    Ok(ManifestEntry {
        name,
        expected_size,
        expected_crc32: crc.trim().to_ascii_lowercase(),
        expected_sha1: sha1.trim().to_ascii_lowercase(),
    })
}

fn attribute(element: &BytesStart<'_>, key: &str) -> Result<Option<String>> {
    let attr = element
        .try_get_attribute(key)
        .map_err(|e| VerifyError::Parse(format!("invalid attribute: {e}")))?;
    attr.map(|attr| {
        attr.unescape_value()
            .map(std::borrow::Cow::into_owned)
            .map_err(|e| VerifyError::Parse(format!("invalid value for '{key}': {e}")))
    })
    .transpose()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    const COCO_CART: &str = r#"<?xml version="1.0"?>
<!DOCTYPE softwarelist SYSTEM "softwarelist.dtd">
<softwarelist name="coco_cart" description="Tandy Radio Shack Color Computer cartridges">
	<software name="daggorath">
		<description>Dungeons of Daggorath</description>
		<year>1982</year>
		<publisher>Tandy</publisher>
		<part name="cart" interface="coco_cart">
			<dataarea name="rom" size="8192">
				<rom name="Dungeons of Daggorath (1982) (26-3093) (Tandy).rom" size="8192" crc="8D5F2BAB" sha1="4E8D6BA1B4A6B4B4F3C2D5A2C7D0F5E4A8B0C1D2"/>
			</dataarea>
		</part>
	</software>
	<software name="megabug">
		<part name="cart" interface="coco_cart">
			<dataarea name="rom" size="4096">
				<rom name="megabug.rom" size="4096" crc="0c6e1fa2" sha1="00112233445566778899aabbccddeeff00112233"/>
			</dataarea>
		</part>
	</software>
</softwarelist>
"#;

    #[test]
    fn test_parse_coco_cart_list() {
        let manifest = parse_manifest_str(COCO_CART).unwrap();
        assert_eq!(manifest.len(), 2);

        let dag = manifest
            .get("Dungeons of Daggorath (1982) (26-3093) (Tandy).rom")
            .unwrap();
        assert_eq!(dag.expected_size, 8192);
        assert_eq!(dag.expected_crc32, "8d5f2bab");
        assert_eq!(dag.expected_sha1, "4e8d6ba1b4a6b4b4f3c2d5a2c7d0f5e4a8b0c1d2");

        let bug = manifest.get("megabug.rom").unwrap();
        assert_eq!(bug.expected_size, 4096);
    }

    #[test]
    fn test_entries_with_size() {
        let manifest = parse_manifest_str(COCO_CART).unwrap();
        let names: Vec<_> = manifest
            .entries_with_size(4096)
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["megabug.rom"]);
        assert_eq!(manifest.entries_with_size(1).count(), 0);
    }

    #[test]
    fn test_no_roms_is_empty_not_error() {
        let manifest =
            parse_manifest_str(r#"<softwarelist><software name="x"/></softwarelist>"#).unwrap();
        assert!(manifest.is_empty());

        let manifest = parse_manifest_str("<softwarelist/>").unwrap();
        assert!(manifest.is_empty());
    }

    #[test]
    fn test_rom_outside_software_ignored() {
        let xml = r#"<softwarelist>
            <rom name="stray" size="1" crc="00" sha1="00"/>
            <software name="a"><rom name="kept" size="2" crc="AA" sha1="BB"/></software>
        </softwarelist>"#;
        let manifest = parse_manifest_str(xml).unwrap();
        assert_eq!(manifest.len(), 1);
        assert!(manifest.get("kept").is_some());
        assert!(manifest.get("stray").is_none());
    }

    #[test]
    fn test_root_software_element_is_not_a_container() {
        let xml = r#"<software name="root"><rom name="r" size="1" crc="0" sha1="0"/></software>"#;
        assert!(parse_manifest_str(xml).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_names_last_wins() {
        let xml = r#"<list>
            <software name="a"><rom name="same" size="1" crc="11111111" sha1="a"/></software>
            <software name="b"><rom name="same" size="2" crc="22222222" sha1="b"/></software>
        </list>"#;
        let manifest = parse_manifest_str(xml).unwrap();
        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.get("same").unwrap().expected_size, 2);
    }

    #[test]
    fn test_missing_attribute() {
        let xml = r#"<list><software name="a"><rom name="r" size="4" crc="00"/></software></list>"#;
        let err = parse_manifest_str(xml).unwrap_err();
        assert!(matches!(
            err,
            VerifyError::MissingAttribute {
                attribute: "sha1",
                ..
            }
        ));

        let xml = r#"<list><software name="a"><rom size="4" crc="00" sha1="00"/></software></list>"#;
        let err = parse_manifest_str(xml).unwrap_err();
        assert!(matches!(
            err,
            VerifyError::MissingAttribute {
                attribute: "name",
                ..
            }
        ));
    }

    #[test]
    fn test_non_numeric_size() {
        let xml = r#"<list><software name="a"><rom name="r" size="4k" crc="00" sha1="00"/></software></list>"#;
        let err = parse_manifest_str(xml).unwrap_err();
        match err {
            VerifyError::Format { attribute, value } => {
                assert_eq!(attribute, "size");
                assert_eq!(value, "4k");
            }
            other => panic!("expected Format error, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_size_rejected() {
        let xml = r#"<list><software name="a"><rom name="r" size="-4" crc="00" sha1="00"/></software></list>"#;
        assert!(matches!(
            parse_manifest_str(xml),
            Err(VerifyError::Format { .. })
        ));
    }

    #[test]
    fn test_malformed_documents() {
        for xml in [
            "",
            "   ",
            "<list><software></list>",
            "<list><software>",
            "<a/><b/>",
            "<list></list>trailing",
        ] {
            let result = parse_manifest_str(xml);
            assert!(
                matches!(result, Err(VerifyError::Parse(_))),
                "expected parse error for {xml:?}, got {result:?}"
            );
        }
    }

    #[test]
    fn test_escaped_attribute_values() {
        let xml = r#"<list><software name="a"><rom name="Tom &amp; Jerry.rom" size="1" crc="0" sha1="0"/></software></list>"#;
        let manifest = parse_manifest_str(xml).unwrap();
        assert!(manifest.get("Tom & Jerry.rom").is_some());
    }

    #[test]
    fn test_parse_manifest_from_file() {
        let mut file = tempfile::NamedTempFile::with_suffix(".xml").unwrap();
        file.write_all(COCO_CART.as_bytes()).unwrap();
        file.flush().unwrap();

        let manifest = parse_manifest(file.path()).unwrap();
        assert_eq!(manifest.len(), 2);
    }
}
