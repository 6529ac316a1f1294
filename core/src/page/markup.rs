// Markup reader
//
// Turns the HTML fragments returned by the refresh endpoints into a node tree.
// It is tolerant the way browsers are: unknown end tags are ignored and
// unclosed elements are closed at the end of the input.

use thiserror::Error;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarkupError {
    #[error("unterminated tag at byte {0}")]
    UnterminatedTag(usize),

    #[error("unterminated comment at byte {0}")]
    UnterminatedComment(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupNode {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        children: Vec<MarkupNode>,
    },
    Text(String),
}

struct StartTag {
    name: String,
    attributes: Vec<(String, String)>,
    self_closing: bool,
}

struct OpenElement {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<MarkupNode>,
}

impl OpenElement {
    fn into_node(self) -> MarkupNode {
        MarkupNode::Element {
            tag: self.tag,
            attributes: self.attributes,
            children: self.children,
        }
    }
}

#[derive(Default)]
struct TreeBuilder {
    roots: Vec<MarkupNode>,
    open: Vec<OpenElement>,
}

impl TreeBuilder {
    fn push(&mut self, node: MarkupNode) {
        match self.open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.roots.push(node),
        }
    }

    fn text(&mut self, text: String) {
        if !text.is_empty() {
            self.push(MarkupNode::Text(text));
        }
    }

    fn open(&mut self, tag: StartTag) {
        self.open.push(OpenElement {
            tag: tag.name,
            attributes: tag.attributes,
            children: Vec::new(),
        });
    }

    fn leaf(&mut self, tag: StartTag) {
        self.push(MarkupNode::Element {
            tag: tag.name,
            attributes: tag.attributes,
            children: Vec::new(),
        });
    }

    fn close(&mut self, name: &str) {
        let Some(idx) = self.open.iter().rposition(|e| e.tag == name) else {
            return;
        };
        while self.open.len() > idx {
            if let Some(element) = self.open.pop() {
                self.push(element.into_node());
            }
        }
    }

    fn finish(mut self) -> Vec<MarkupNode> {
        while let Some(element) = self.open.pop() {
            self.push(element.into_node());
        }
        self.roots
    }
}

/// Parse a fragment into its top-level nodes
pub fn parse(input: &str) -> Result<Vec<MarkupNode>, MarkupError> {
    let mut builder = TreeBuilder::default();
    let bytes = input.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] != b'<' {
            let end = input[pos..]
                .find('<')
                .map(|i| pos + i)
                .unwrap_or(bytes.len());
            builder.text(decode_entities(&input[pos..end]));
            pos = end;
            continue;
        }

        let rest = &input[pos..];
        if rest.starts_with("<!--") {
            let end = rest
                .find("-->")
                .ok_or(MarkupError::UnterminatedComment(pos))?;
            pos += end + 3;
        } else if rest.starts_with("<!") || rest.starts_with("<?") {
            let end = rest.find('>').ok_or(MarkupError::UnterminatedTag(pos))?;
            pos += end + 1;
        } else if rest.starts_with("</") {
            let end = rest.find('>').ok_or(MarkupError::UnterminatedTag(pos))?;
            builder.close(&rest[2..end].trim().to_ascii_lowercase());
            pos += end + 1;
        } else if rest.len() > 1 && rest.as_bytes()[1].is_ascii_alphabetic() {
            let (tag, consumed) = read_start_tag(rest).ok_or(MarkupError::UnterminatedTag(pos))?;
            pos += consumed;

            let name = tag.name.clone();
            if tag.self_closing || VOID_ELEMENTS.contains(&name.as_str()) {
                builder.leaf(tag);
            } else if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
                // body runs verbatim up to the matching end tag
                let closing = format!("</{}", name);
                let body_len = input[pos..]
                    .to_ascii_lowercase()
                    .find(&closing)
                    .unwrap_or(input.len() - pos);
                builder.open(tag);
                builder.text(input[pos..pos + body_len].to_string());
                builder.close(&name);
                pos += body_len;
                if let Some(end) = input[pos..].find('>') {
                    pos += end + 1;
                }
            } else {
                builder.open(tag);
            }
        } else {
            builder.text("<".to_string());
            pos += 1;
        }
    }

    Ok(builder.finish())
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':'
}

fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

/// Read `<name attr=...>` from the start of `src`; returns the tag and the
/// number of bytes consumed, or `None` when the tag never closes.
fn read_start_tag(src: &str) -> Option<(StartTag, usize)> {
    let bytes = src.as_bytes();
    let mut i = 1;
    while i < bytes.len() && is_name_byte(bytes[i]) {
        i += 1;
    }
    let name = src[1..i].to_ascii_lowercase();
    let mut attributes = Vec::new();

    loop {
        i = skip_whitespace(bytes, i);
        if i >= bytes.len() {
            return None;
        }
        match bytes[i] {
            b'>' => {
                return Some((
                    StartTag {
                        name,
                        attributes,
                        self_closing: false,
                    },
                    i + 1,
                ))
            }
            b'/' if bytes.get(i + 1) == Some(&b'>') => {
                return Some((
                    StartTag {
                        name,
                        attributes,
                        self_closing: true,
                    },
                    i + 2,
                ))
            }
            _ => {}
        }

        let start = i;
        while i < bytes.len()
            && !bytes[i].is_ascii_whitespace()
            && !matches!(bytes[i], b'=' | b'>' | b'/')
        {
            i += 1;
        }
        if i == start {
            // stray '/' or '='
            i += 1;
            continue;
        }
        let attr_name = src[start..i].to_ascii_lowercase();

        i = skip_whitespace(bytes, i);
        if i < bytes.len() && bytes[i] == b'=' {
            i = skip_whitespace(bytes, i + 1);
            if i >= bytes.len() {
                return None;
            }
            let value = match bytes[i] {
                quote @ (b'"' | b'\'') => {
                    let end = src[i + 1..].find(quote as char)? + i + 1;
                    let value = decode_entities(&src[i + 1..end]);
                    i = end + 1;
                    value
                }
                _ => {
                    let value_start = i;
                    while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                        i += 1;
                    }
                    decode_entities(&src[value_start..i])
                }
            };
            attributes.push((attr_name, value));
        } else {
            attributes.push((attr_name, String::new()));
        }
    }
}

/// Decode the character references the dashboard templates emit
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest
            .find(';')
            .filter(|semi| *semi <= 10)
            .and_then(|semi| decode_reference(&rest[1..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_reference(reference: &str) -> Option<char> {
    match reference {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let code = if let Some(hex) = reference
                .strip_prefix("#x")
                .or_else(|| reference.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                reference.strip_prefix('#')?.parse::<u32>().ok()?
            };
            char::from_u32(code)
        }
    }
}
