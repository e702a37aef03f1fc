//! Streaming reader for the catalog XML.

use std::io::BufRead;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::ListXmlError;
use crate::model::{CatalogHeader, ListXml, MachineRecord, RomEntry};

/// Parse a `-listxml` catalog from a buffered reader.
///
/// Machines without a `name` attribute are dropped, as are `<rom>` entries
/// missing any of `name`/`size`/`crc`. A machine with zero ROM entries is
/// still emitted; it may be referenced as a device provider.
pub fn parse_listxml<R: BufRead>(reader: R) -> Result<ListXml, ListXmlError> {
    let mut xml = Reader::from_reader(reader);
    xml.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut doc = ListXml::default();
    let mut current: Option<MachineRecord> = None;
    let mut current_tag = String::new();

    loop {
        let event = match xml.read_event_into(&mut buf) {
            Ok(event) => event,
            Err(source) => {
                return Err(ListXmlError::Parse {
                    offset: xml.buffer_position(),
                    source,
                });
            }
        };
        match event {
            Event::Start(ref e) => match e.name().as_ref() {
                b"mame" => doc.header = Some(parse_header(e)?),
                b"machine" => current = parse_machine(e)?,
                b"rom" => {
                    if let Some(ref mut machine) = current {
                        if let Some(rom) = parse_rom(e)? {
                            machine.roms.push(rom);
                        }
                    }
                }
                b"device_ref" => {
                    if let Some(ref mut machine) = current {
                        if let Some(name) = parse_device_ref(e)? {
                            machine.device_refs.push(name);
                        }
                    }
                }
                _ => {
                    current_tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                }
            },
            Event::Empty(ref e) => match e.name().as_ref() {
                b"machine" => {
                    if let Some(machine) = parse_machine(e)? {
                        doc.machines.push(machine);
                    }
                }
                b"rom" => {
                    if let Some(ref mut machine) = current {
                        if let Some(rom) = parse_rom(e)? {
                            machine.roms.push(rom);
                        }
                    }
                }
                b"device_ref" => {
                    if let Some(ref mut machine) = current {
                        if let Some(name) = parse_device_ref(e)? {
                            machine.device_refs.push(name);
                        }
                    }
                }
                _ => {}
            },
            Event::Text(ref e) => {
                if let Some(ref mut machine) = current {
                    let text = match e.unescape() {
                        Ok(text) => text.trim().to_string(),
                        Err(source) => {
                            return Err(ListXmlError::Parse {
                                offset: xml.buffer_position(),
                                source,
                            });
                        }
                    };
                    if !text.is_empty() {
                        match current_tag.as_str() {
                            "description" => machine.description = Some(text),
                            "year" => machine.year = Some(text),
                            "manufacturer" => machine.manufacturer = Some(text),
                            _ => {}
                        }
                    }
                }
            }
            Event::End(ref e) => match e.name().as_ref() {
                b"machine" => {
                    if let Some(machine) = current.take() {
                        doc.machines.push(machine);
                    }
                }
                _ => current_tag.clear(),
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if doc.header.is_none() && doc.machines.is_empty() {
        return Err(ListXmlError::invalid_catalog(
            "no header or machines found in catalog",
        ));
    }

    Ok(doc)
}

/// Parse a catalog from a file path.
pub fn parse_listxml_file(path: &Path) -> Result<ListXml, ListXmlError> {
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    parse_listxml(reader)
}

fn parse_header(e: &BytesStart<'_>) -> Result<CatalogHeader, ListXmlError> {
    let mut header = CatalogHeader::default();
    for attr in e.attributes() {
        let attr = attr?;
        let value = String::from_utf8_lossy(&attr.value).to_string();
        match attr.key.as_ref() {
            b"build" => header.build = Some(value),
            b"debug" => header.debug = Some(value),
            b"mameconfig" => header.mameconfig = Some(value),
            _ => {}
        }
    }
    Ok(header)
}

fn parse_machine(e: &BytesStart<'_>) -> Result<Option<MachineRecord>, ListXmlError> {
    let mut machine = MachineRecord::default();
    for attr in e.attributes() {
        let attr = attr?;
        let value = String::from_utf8_lossy(&attr.value).to_string();
        match attr.key.as_ref() {
            b"name" => machine.name = value,
            b"cloneof" => machine.cloneof = Some(value),
            b"romof" => machine.romof = Some(value),
            b"isbios" => machine.is_bios = value == "yes",
            b"isdevice" => machine.is_device = value == "yes",
            _ => {}
        }
    }
    if machine.name.is_empty() {
        log::debug!("dropping machine element without a name");
        return Ok(None);
    }
    Ok(Some(machine))
}

/// A ROM entry lacking any of name/size/crc is dropped silently.
fn parse_rom(e: &BytesStart<'_>) -> Result<Option<RomEntry>, ListXmlError> {
    let mut name: Option<String> = None;
    let mut size: Option<u64> = None;
    let mut crc: Option<String> = None;
    let mut merge: Option<String> = None;
    let mut bios: Option<String> = None;

    for attr in e.attributes() {
        let attr = attr?;
        let value = String::from_utf8_lossy(&attr.value).to_string();
        match attr.key.as_ref() {
            b"name" => name = Some(value),
            b"size" => size = value.parse().ok(),
            b"crc" => crc = Some(value.to_uppercase()),
            b"merge" => merge = Some(value),
            b"bios" => bios = Some(value),
            _ => {}
        }
    }

    Ok(match (name, size, crc) {
        (Some(name), Some(size), Some(crc)) => Some(RomEntry {
            name,
            size,
            crc,
            merge,
            bios,
        }),
        _ => None,
    })
}

fn parse_device_ref(e: &BytesStart<'_>) -> Result<Option<String>, ListXmlError> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"name" {
            return Ok(Some(String::from_utf8_lossy(&attr.value).to_string()));
        }
    }
    Ok(None)
}
