use std::io::Read;

use quick_xml::{
    Reader,
    events::{BytesStart, Event as XmlEvent},
};

use super::{Attributes, ConfigError, Event, Location};

/// Maps byte offsets to line/column, scanning forward only.
struct LineTracker<'a> {
    bytes: &'a [u8],
    offset: usize,
    line: usize,
    column: usize,
}

impl<'a> LineTracker<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0, line: 1, column: 1 }
    }

    fn at(&mut self, position: usize) -> Location {
        let end = position.min(self.bytes.len());
        for &byte in &self.bytes[self.offset.min(end)..end] {
            if byte == b'\n' {
                self.line += 1;
                self.column = 1;
            } else if byte & 0xC0 != 0x80 {
                // count chars, not UTF-8 continuation bytes
                self.column += 1;
            }
        }
        self.offset = self.offset.max(end);
        Location::new(self.line, self.column)
    }
}

/// Offset of the `<` opening the tag that ends at `end`.
fn tag_start(bytes: &[u8], end: usize) -> usize {
    bytes[..end.min(bytes.len())].iter().rposition(|&b| b == b'<').unwrap_or(0)
}

fn name_of(name: &[u8]) -> String {
    String::from_utf8_lossy(name).into_owned()
}

fn attributes_of(start: &BytesStart<'_>, location: Location) -> Result<Attributes, ConfigError> {
    let mut attributes = Attributes::new();
    for attribute in start.attributes() {
        let attribute = attribute
            .map_err(|err| ConfigError::Xml { location, source: quick_xml::Error::from(err) })?;
        let value = attribute
            .unescape_value()
            .map_err(|source| ConfigError::Xml { location, source })?;
        attributes.push(name_of(attribute.key.as_ref()), value.into_owned());
    }
    Ok(attributes)
}

/// Read the whole document and hand each element boundary to `handler`,
/// stopping at the first error from either side.
pub(crate) fn read_events<R, F>(mut input: R, mut handler: F) -> Result<(), ConfigError>
where
    R: Read,
    F: FnMut(Event) -> Result<(), ConfigError>,
{
    let mut bytes = Vec::new();
    input.read_to_end(&mut bytes)?;

    let mut tracker = LineTracker::new(&bytes);
    let mut reader = Reader::from_reader(bytes.as_slice());
    let mut buf = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|source| ConfigError::Xml {
            location: tracker.at(reader.buffer_position()),
            source,
        })?;

        let start = tag_start(&bytes, reader.buffer_position());
        match event {
            XmlEvent::Start(element) => {
                let location = tracker.at(start);
                let attributes = attributes_of(&element, location)?;
                let name = name_of(element.name().as_ref());
                handler(Event::Enter { name, attributes, location })?;
            }
            XmlEvent::Empty(element) => {
                let location = tracker.at(start);
                let name = name_of(element.name().as_ref());
                let attributes = attributes_of(&element, location)?;
                handler(Event::Enter { name: name.clone(), attributes, location })?;
                handler(Event::Exit { name, location })?;
            }
            XmlEvent::End(element) => {
                let location = tracker.at(start);
                handler(Event::Exit { name: name_of(element.name().as_ref()), location })?;
            }
            XmlEvent::Eof => break,
            // declarations, comments, text and processing instructions carry no weights
            _ => {}
        }
        buf.clear();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(document: &str) -> Result<Vec<Event>, ConfigError> {
        let mut events = Vec::new();
        read_events(document.as_bytes(), |event| {
            events.push(event);
            Ok(())
        })?;
        Ok(events)
    }

    #[test]
    fn empty_elements_yield_enter_and_exit() {
        let events = collect(r#"<A><B x="1"/></A>"#).unwrap();
        assert_eq!(events.len(), 4);
        match &events[1] {
            Event::Enter { name, attributes, location } => {
                assert_eq!(name, "B");
                assert_eq!(attributes.get("x"), Some("1"));
                assert_eq!(*location, Location::new(1, 4));
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(matches!(&events[2], Event::Exit { name, .. } if name == "B"));
    }

    #[test]
    fn locations_track_lines_and_columns() {
        let doc = "<?xml version=\"1.0\"?>\n<!-- weights -->\n<A>\n  <B/>\n</A>\n";
        let events = collect(doc).unwrap();
        let locations: Vec<Location> = events
            .iter()
            .map(|event| match event {
                Event::Enter { location, .. } | Event::Exit { location, .. } => *location,
            })
            .collect();
        assert_eq!(
            locations,
            vec![Location::new(3, 1), Location::new(4, 3), Location::new(4, 3), Location::new(5, 1)]
        );
    }

    #[test]
    fn attribute_entities_are_unescaped() {
        let events = collect(r#"<A label="Central &amp; Eastern"/>"#).unwrap();
        match &events[0] {
            Event::Enter { attributes, .. } => {
                assert_eq!(attributes.get("label"), Some("Central & Eastern"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn malformed_xml_is_reported() {
        let err = collect("<A><B></A>").unwrap_err();
        assert!(matches!(err, ConfigError::Xml { .. }));
    }

    #[test]
    fn handler_errors_stop_reading() {
        let mut seen = 0;
        let result = read_events("<A><B/><C/></A>".as_bytes(), |_| {
            seen += 1;
            Err(ConfigError::MissingRoot)
        });
        assert!(matches!(result, Err(ConfigError::MissingRoot)));
        assert_eq!(seen, 1);
    }
}
