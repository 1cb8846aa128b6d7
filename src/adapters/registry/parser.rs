//! Registry XML parsing
//!
//! The registry answers with a document shaped like
//!
//! ```text
//! <response>
//!   <header>...</header>
//!   <body>
//!     <items>
//!       <item><ykiho>..</ykiho><clCd>11</clCd>...</item>
//!       ...
//!     </items>
//!     ...
//!   </body>
//! </response>
//! ```
//!
//! Items are located positionally (root, second child, first child) and
//! read into a small element tree before field extraction.

use crate::domain::errors::RegistryError;
use crate::domain::hospital::HospitalRecord;
use crate::domain::ids::HospitalId;
use chrono::NaiveDate;
use quick_xml::events::Event;
use quick_xml::Reader;

/// Minimal XML element: tag name, direct text, child elements
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct XmlNode {
    pub name: String,
    pub text: String,
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    fn named(name: String) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    /// First direct child with the given tag
    pub fn child(&self, tag: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == tag)
    }
}

/// Text of the first direct child named `tag`
///
/// A missing child and an element with blank text both yield `None`.
///
/// # Examples
///
/// ```
/// use purgo::adapters::registry::parser::{extract, parse_document};
///
/// let root = parse_document("<item><telno>02-1234</telno><hospUrl/></item>", 1).unwrap();
/// assert_eq!(extract(&root, "telno").as_deref(), Some("02-1234"));
/// assert_eq!(extract(&root, "hospUrl"), None);
/// assert_eq!(extract(&root, "addr"), None);
/// ```
pub fn extract(node: &XmlNode, tag: &str) -> Option<String> {
    node.child(tag)
        .map(|c| c.text.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Reads a whole document into an element tree and returns its root
///
/// # Errors
///
/// Returns [`RegistryError::Parse`] for malformed XML or an empty document.
pub fn parse_document(xml: &str, page: u32) -> Result<XmlNode, RegistryError> {
    let parse_err = |message: String| RegistryError::Parse { page, message };

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                stack.push(XmlNode::named(name));
            }
            Ok(Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                attach(&mut stack, &mut root, XmlNode::named(name))
                    .map_err(|m| parse_err(m.to_string()))?;
            }
            Ok(Event::Text(t)) => {
                let text = t
                    .unescape()
                    .map_err(|e| parse_err(format!("invalid text content: {e}")))?;
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text);
                }
            }
            Ok(Event::CData(c)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Ok(Event::End(_)) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| parse_err("unbalanced closing tag".to_string()))?;
                attach(&mut stack, &mut root, node).map_err(|m| parse_err(m.to_string()))?;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(parse_err(format!(
                    "malformed XML at byte {}: {e}",
                    reader.error_position()
                )))
            }
        }
    }

    if !stack.is_empty() {
        return Err(parse_err("document ended inside an open element".to_string()));
    }
    root.ok_or_else(|| parse_err("empty document".to_string()))
}

fn attach(
    stack: &mut [XmlNode],
    root: &mut Option<XmlNode>,
    node: XmlNode,
) -> Result<(), &'static str> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(node);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(node);
            Ok(())
        }
        None => Err("more than one root element"),
    }
}

/// Parses one page body into records, in document order
///
/// Items whose `clCd` is missing or not in `allowed_class_codes` are
/// dropped without error.
///
/// # Errors
///
/// Returns [`RegistryError::Parse`] when the body is not well-formed XML,
/// the item list is not where the registry puts it, a kept item has no
/// `ykiho`, or a numeric or date field holds malformed text.
pub fn parse_page(
    xml: &str,
    page: u32,
    allowed_class_codes: &[String],
) -> Result<Vec<HospitalRecord>, RegistryError> {
    let root = parse_document(xml, page)?;

    let items = root
        .children
        .get(1)
        .and_then(|body| body.children.first())
        .ok_or_else(|| RegistryError::Parse {
            page,
            message: format!("no item list under <{}>", root.name),
        })?;

    let mut records = Vec::with_capacity(items.children.len());
    for item in &items.children {
        if let Some(record) = parse_item(item, page, allowed_class_codes)? {
            records.push(record);
        }
    }
    Ok(records)
}

fn parse_item(
    item: &XmlNode,
    page: u32,
    allowed_class_codes: &[String],
) -> Result<Option<HospitalRecord>, RegistryError> {
    let class_code = match extract(item, "clCd") {
        Some(code) if allowed_class_codes.iter().any(|c| *c == code) => code,
        _ => return Ok(None),
    };

    let hospital_id = extract(item, "ykiho")
        .and_then(|id| HospitalId::new(id).ok())
        .ok_or_else(|| RegistryError::Parse {
            page,
            message: "item without ykiho".to_string(),
        })?;

    let int = |tag: &'static str| -> Result<Option<i32>, RegistryError> {
        extract(item, tag)
            .map(|text| {
                text.parse::<i32>().map_err(|_| RegistryError::Parse {
                    page,
                    message: format!("non-numeric {tag} '{text}' for {hospital_id}"),
                })
            })
            .transpose()
    };

    let established_at = extract(item, "estbDd")
        .map(|text| {
            NaiveDate::parse_from_str(&text, "%Y%m%d").map_err(|_| RegistryError::Parse {
                page,
                message: format!("estbDd '{text}' is not YYYYMMDD for {hospital_id}"),
            })
        })
        .transpose()?;

    let mut record = HospitalRecord::new(hospital_id.clone());
    record.hospital_name = extract(item, "yadmNm");
    record.class_code = extract(item, "clCdNm");
    record.class_code_number = Some(class_code.parse().map_err(|_| RegistryError::Parse {
        page,
        message: format!("non-numeric clCd '{class_code}' for {hospital_id}"),
    })?);
    record.phone = extract(item, "telno");
    record.url = extract(item, "hospUrl");
    record.established_at = established_at;
    record.sggu_name = extract(item, "sgguCdNm");
    record.emdong_name = extract(item, "emdongNm");
    record.post_no = int("postNo")?;
    record.address = extract(item, "addr");
    record.sido_name = extract(item, "sidoCdNm");
    record.sggu_no = int("sgguCd")?;
    record.sido_no = int("sidoCd")?;
    record.general_doctor_count = int("detyGdrCnt")?;
    record.intern_count = int("detyIntnCnt")?;
    record.resident_count = int("detyResdntCnt")?;
    record.fellow_doctor_count = int("detySdrCnt")?;

    Ok(Some(record))
}
