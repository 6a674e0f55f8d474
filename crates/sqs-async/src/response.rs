//! Typed views of Query API response bodies.
//!
//! Each resource the client hands back implements [`ParseResponse`]. The
//! parsers are deliberately lenient: they pick out the elements they know and
//! ignore everything else, including namespaces and response metadata.

use crate::error::ParseError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::BTreeMap;
use url::Url;

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;

/// Conversion from a raw response body into a typed value
pub trait ParseResponse: Sized {
    fn parse(body: &str) -> Result<Self, ParseError>;
}

/// An existing queue, identified by its resource URL
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Queue {
    url: Url,
}

impl Queue {
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    /// Parse a queue from the text of a `QueueUrl` element.
    pub fn from_url(url: &str) -> Result<Self, ParseError> {
        Url::parse(url)
            .map(Self::new)
            .map_err(|e| ParseError::InvalidValue {
                element: "QueueUrl".to_string(),
                message: e.to_string(),
            })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Last path segment of the queue URL
    pub fn name(&self) -> Option<&str> {
        self.url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|name| !name.is_empty())
    }
}

/// Every `QueueUrl` in a `ListQueues` or `CreateQueue` response
impl ParseResponse for Vec<Queue> {
    fn parse(body: &str) -> Result<Self, ParseError> {
        let mut queues = Vec::new();
        for_each_text(body, |path, text| {
            if path.last().map(Vec::as_slice) == Some(b"QueueUrl".as_slice()) {
                queues.push(Queue::from_url(text.trim())?);
            }
            Ok(())
        })?;
        Ok(queues)
    }
}

/// The single queue of a `CreateQueue` response
impl ParseResponse for Queue {
    fn parse(body: &str) -> Result<Self, ParseError> {
        Vec::<Queue>::parse(body)?
            .into_iter()
            .next()
            .ok_or_else(|| ParseError::MissingElement {
                element: "QueueUrl".to_string(),
            })
    }
}

/// A message returned by `ReceiveMessage`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    pub message_id: String,
    pub receipt_handle: String,
    pub md5_of_body: Option<String>,
    pub body: String,
    pub attributes: BTreeMap<String, String>,
}

impl Message {
    /// A message known only by its receipt handle, enough to delete it.
    pub fn from_receipt_handle(receipt_handle: impl Into<String>) -> Self {
        Self {
            receipt_handle: receipt_handle.into(),
            ..Self::default()
        }
    }
}

/// All messages of a `ReceiveMessage` response; empty when none are available
///
/// `Body` is user data and is kept byte for byte, including surrounding
/// whitespace and CDATA sections. Every other field is trimmed.
impl ParseResponse for Vec<Message> {
    fn parse(body: &str) -> Result<Self, ParseError> {
        let mut reader = Reader::from_str(body);
        reader.trim_text(false);

        let mut messages = Vec::new();
        let mut current: Option<Message> = None;
        let mut element: Option<Vec<u8>> = None;
        let mut attribute_name: Option<String> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    let name = e.local_name().as_ref().to_vec();
                    if name == b"Message" {
                        current = Some(Message::default());
                    }
                    element = Some(name);
                }
                Ok(Event::Text(e)) => {
                    let text = e.unescape().map_err(xml_error)?;
                    if let (Some(message), Some(name)) = (current.as_mut(), element.as_deref()) {
                        if name == b"Body" {
                            message.body.push_str(&text);
                        } else {
                            let text = text.trim();
                            match name {
                                b"MessageId" => message.message_id = text.to_string(),
                                b"ReceiptHandle" => message.receipt_handle = text.to_string(),
                                b"MD5OfBody" => message.md5_of_body = Some(text.to_string()),
                                b"Name" => attribute_name = Some(text.to_string()),
                                b"Value" => {
                                    if let Some(key) = attribute_name.take() {
                                        message.attributes.insert(key, text.to_string());
                                    }
                                }
                                _ => {}
                            }
                        }
                    }
                }
                Ok(Event::CData(e)) => {
                    if let (Some(message), Some(b"Body")) = (current.as_mut(), element.as_deref()) {
                        let raw = e.into_inner();
                        let text = std::str::from_utf8(&raw).map_err(|err| {
                            ParseError::InvalidValue {
                                element: "Body".to_string(),
                                message: err.to_string(),
                            }
                        })?;
                        message.body.push_str(text);
                    }
                }
                Ok(Event::End(ref e)) => {
                    if e.local_name().as_ref() == b"Message" {
                        if let Some(message) = current.take() {
                            if message.receipt_handle.is_empty() {
                                return Err(ParseError::MissingElement {
                                    element: "ReceiptHandle".to_string(),
                                });
                            }
                            messages.push(message);
                        }
                    }
                    element = None;
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(xml_error(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(messages)
    }
}

/// Attributes returned by `GetQueueAttributes`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueAttributes {
    attributes: BTreeMap<String, String>,
}

impl QueueAttributes {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl ParseResponse for QueueAttributes {
    fn parse(body: &str) -> Result<Self, ParseError> {
        let mut attributes = BTreeMap::new();
        let mut name: Option<String> = None;
        for_each_text(body, |path, text| {
            let in_attribute = path.iter().any(|element| element == b"Attribute");
            match path.last().map(Vec::as_slice) {
                Some(b"Name") if in_attribute => name = Some(text.to_string()),
                Some(b"Value") if in_attribute => {
                    if let Some(key) = name.take() {
                        attributes.insert(key, text.to_string());
                    }
                }
                _ => {}
            }
            Ok(())
        })?;
        Ok(Self { attributes })
    }
}

/// Contents of an `<ErrorResponse>` envelope
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorEnvelope {
    pub code: Option<String>,
    pub message: Option<String>,
    pub request_id: Option<String>,
}

impl ErrorEnvelope {
    /// Extract what can be found of the envelope; malformed XML yields
    /// whatever was read before the error.
    pub fn parse(body: &str) -> Self {
        let mut envelope = Self::default();
        let _ = for_each_text(body, |path, text| {
            let in_error = path.iter().any(|element| element == b"Error");
            match path.last().map(Vec::as_slice) {
                Some(b"Code") if in_error => envelope.code = Some(text.to_string()),
                Some(b"Message") if in_error => envelope.message = Some(text.to_string()),
                Some(b"RequestId") => envelope.request_id = Some(text.to_string()),
                _ => {}
            }
            Ok(())
        });
        envelope
    }
}

/// Walk `xml`, calling `visit` with the open element path and the unescaped
/// text of every text node.
fn for_each_text<F>(xml: &str, mut visit: F) -> Result<(), ParseError>
where
    F: FnMut(&[Vec<u8>], &str) -> Result<(), ParseError>,
{
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => path.push(e.local_name().as_ref().to_vec()),
            Ok(Event::End(_)) => {
                path.pop();
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(xml_error)?;
                visit(&path, &text)?;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

fn xml_error(e: quick_xml::Error) -> ParseError {
    ParseError::Xml {
        message: e.to_string(),
    }
}
