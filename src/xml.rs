use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::borrow::Cow;

/// Placeholder namespace URI both fragment prefixes resolve against.
/// Consuming systems are expected to bind `log4j:` and `nlog:` to this
/// same URI; the fragment itself carries no `xmlns` declarations.
pub const PLACEHOLDER_NAMESPACE: &str = "http://nlog-project.org/dummynamespace";

/// Error raised by the underlying XML writer.
#[derive(thiserror::Error, Debug)]
pub enum FragmentError {
    #[error("xml writer error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("i/o error writing fragment: {0}")]
    Io(#[from] std::io::Error),
}

fn is_valid_xml_char(c: char) -> bool {
    matches!(c,
        '\u{09}' | '\u{0A}' | '\u{0D}'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

/// Replaces characters XML 1.0 cannot represent with U+FFFD, so a single
/// bad byte degrades one value instead of dropping the whole event.
pub fn sanitize(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_valid_xml_char) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(
            text.chars()
                .map(|c| if is_valid_xml_char(c) { c } else { '\u{FFFD}' })
                .collect(),
        )
    }
}

fn element<'a>(name: &'a str, attrs: &[(&str, &str)]) -> BytesStart<'a> {
    let mut el = BytesStart::new(name);
    for (key, value) in attrs {
        el.push_attribute((*key, sanitize(value).as_ref()));
    }
    el
}

/// Streaming writer for one self-contained XML fragment.
///
/// Reserved characters in attribute values and element text are escaped by
/// the underlying writer; indentation is purely cosmetic and never changes
/// content or ordering.
pub struct FragmentWriter {
    writer: Writer<Vec<u8>>,
}

impl FragmentWriter {
    pub fn new(indent: bool) -> Self {
        let writer = if indent {
            Writer::new_with_indent(Vec::new(), b' ', 2)
        } else {
            Writer::new(Vec::new())
        };
        FragmentWriter { writer }
    }

    pub fn start_element(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), FragmentError> {
        self.writer.write_event(Event::Start(element(name, attrs)))?;
        Ok(())
    }

    pub fn empty_element(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), FragmentError> {
        self.writer.write_event(Event::Empty(element(name, attrs)))?;
        Ok(())
    }

    /// Writes `<name>text</name>`, collapsing to a self-closed element when
    /// the text is empty.
    pub fn text_element(&mut self, name: &str, text: &str) -> Result<(), FragmentError> {
        let clean = sanitize(text);
        if clean.is_empty() {
            return self.empty_element(name, &[]);
        }
        self.writer.write_event(Event::Start(BytesStart::new(name)))?;
        self.writer.write_event(Event::Text(BytesText::new(clean.as_ref())))?;
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    pub fn end_element(&mut self, name: &str) -> Result<(), FragmentError> {
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    pub fn into_string(self) -> String {
        String::from_utf8_lossy(&self.writer.into_inner()).into_owned()
    }
}
