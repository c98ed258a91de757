//! Lenient HTML tokenizer.
//!
//! Tag and attribute names are ASCII `[A-Za-z0-9:_-]` and are lowercased. Text and quoted
//! attribute values have character references decoded. `script` and `style` bodies are raw text.
//! There is no parse-error recovery beyond "treat it as text" or "skip to the next `>`".

use std::borrow::Cow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Doctype(String),
    StartTag {
        name: String,
        attributes: Vec<(String, String)>,
        self_closing: bool,
    },
    EndTag(String),
    Comment(String),
    Text(String),
}

const COMMENT_START: &str = "<!--";
const COMMENT_END: &str = "-->";

pub(crate) fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':'
}

fn starts_with_ignore_ascii_case_at(haystack: &[u8], start: usize, needle: &[u8]) -> bool {
    haystack.len() >= start + needle.len()
        && haystack[start..start + needle.len()].eq_ignore_ascii_case(needle)
}

fn decode(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    htmlize::unescape(Cow::Borrowed(text)).into_owned()
}

/// Finds `</name` followed by optional whitespace and `>`; returns (start, end) byte offsets.
fn find_rawtext_close_tag(haystack: &str, name: &str) -> Option<(usize, usize)> {
    let bytes = haystack.as_bytes();
    let mut i = 0;
    while let Some(rel) = haystack[i..].find("</") {
        let at = i + rel;
        if starts_with_ignore_ascii_case_at(bytes, at + 2, name.as_bytes()) {
            let mut k = at + 2 + name.len();
            while k < bytes.len() && bytes[k].is_ascii_whitespace() {
                k += 1;
            }
            if k < bytes.len() && bytes[k] == b'>' {
                return Some((at, k + 1));
            }
        }
        i = at + 2;
    }
    None
}

pub fn tokenize(input: &str) -> Vec<Token> {
    let mut out = Vec::new();
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut text_start = 0;
    let mut i = 0;

    // Slices are only cut at ASCII structural bytes, so every endpoint is a char boundary.
    let flush_text = |out: &mut Vec<Token>, from: usize, to: usize| {
        if from < to {
            out.push(Token::Text(decode(&input[from..to])));
        }
    };

    while i < len {
        if bytes[i] != b'<' {
            i += 1;
            continue;
        }

        if input[i..].starts_with(COMMENT_START) {
            flush_text(&mut out, text_start, i);
            let body_start = i + COMMENT_START.len();
            match input[body_start..].find(COMMENT_END) {
                Some(end) => {
                    out.push(Token::Comment(input[body_start..body_start + end].to_string()));
                    i = body_start + end + COMMENT_END.len();
                }
                None => {
                    out.push(Token::Comment(input[body_start..].to_string()));
                    i = len;
                }
            }
            text_start = i;
            continue;
        }

        if i + 1 < len && bytes[i + 1] == b'!' {
            // doctype, CDATA and other markup declarations
            flush_text(&mut out, text_start, i);
            let end = input[i..].find('>').map_or(len, |e| i + e);
            let decl = input[i + 2..end].trim();
            if decl.get(..7).is_some_and(|head| head.eq_ignore_ascii_case("doctype")) {
                out.push(Token::Doctype(decl.to_string()));
            }
            i = (end + 1).min(len);
            text_start = i;
            continue;
        }

        if i + 1 < len && bytes[i + 1] == b'/' {
            let start = i + 2;
            let mut j = start;
            while j < len && is_name_byte(bytes[j]) {
                j += 1;
            }
            if j == start {
                // `</>` or `</ x>`: not a tag
                i += 1;
                continue;
            }
            flush_text(&mut out, text_start, i);
            let name = input[start..j].to_ascii_lowercase();
            while j < len && bytes[j] != b'>' {
                j += 1;
            }
            i = (j + 1).min(len);
            text_start = i;
            out.push(Token::EndTag(name));
            continue;
        }

        let start = i + 1;
        let mut k = start;
        while k < len && is_name_byte(bytes[k]) {
            k += 1;
        }
        if k == start {
            // a lone `<` is text
            i += 1;
            continue;
        }
        flush_text(&mut out, text_start, i);
        let name = input[start..k].to_ascii_lowercase();
        let mut attributes = Vec::new();
        let mut self_closing = false;

        loop {
            while k < len && bytes[k].is_ascii_whitespace() {
                k += 1;
            }
            if k >= len {
                break;
            }
            if bytes[k] == b'>' {
                k += 1;
                break;
            }
            if bytes[k] == b'/' {
                if k + 1 < len && bytes[k + 1] == b'>' {
                    self_closing = true;
                    k += 2;
                    break;
                }
                k += 1;
                continue;
            }
            let name_start = k;
            while k < len && is_name_byte(bytes[k]) {
                k += 1;
            }
            if name_start == k {
                // skip a stray byte (quote, `=`, non-ASCII) but stay on a char boundary
                k += input[k..].chars().next().map_or(1, char::len_utf8);
                continue;
            }
            let attribute_name = input[name_start..k].to_ascii_lowercase();

            while k < len && bytes[k].is_ascii_whitespace() {
                k += 1;
            }
            let mut value = String::new();
            if k < len && bytes[k] == b'=' {
                k += 1;
                while k < len && bytes[k].is_ascii_whitespace() {
                    k += 1;
                }
                if k < len && (bytes[k] == b'"' || bytes[k] == b'\'') {
                    let quote = bytes[k];
                    k += 1;
                    let value_start = k;
                    while k < len && bytes[k] != quote {
                        k += 1;
                    }
                    value = decode(&input[value_start..k]);
                    if k < len {
                        k += 1;
                    }
                } else {
                    let value_start = k;
                    while k < len && !bytes[k].is_ascii_whitespace() && bytes[k] != b'>' {
                        if bytes[k] == b'/' && k + 1 < len && bytes[k + 1] == b'>' {
                            break;
                        }
                        k += 1;
                    }
                    value = decode(&input[value_start..k]);
                }
            }
            attributes.push((attribute_name, value));
        }

        if is_void_element(&name) {
            self_closing = true;
        }
        let raw_text = !self_closing && (name == "script" || name == "style");
        out.push(Token::StartTag {
            name: name.clone(),
            attributes,
            self_closing,
        });
        i = k;

        if raw_text {
            match find_rawtext_close_tag(&input[i..], &name) {
                Some((body_end, close_end)) => {
                    if body_end > 0 {
                        out.push(Token::Text(input[i..i + body_end].to_string()));
                    }
                    i += close_end;
                }
                None => {
                    if i < len {
                        out.push(Token::Text(input[i..].to_string()));
                    }
                    i = len;
                }
            }
            out.push(Token::EndTag(name));
        }
        text_start = i;
    }

    flush_text(&mut out, text_start, len);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(name: &str, attributes: &[(&str, &str)], self_closing: bool) -> Token {
        Token::StartTag {
            name: name.to_string(),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            self_closing,
        }
    }

    #[test]
    fn tokenizes_tags_attributes_and_text() {
        let tokens = tokenize("<A HREF=\"x&amp;y\" data-x=1 hidden>t&lt;</a>");
        assert_eq!(
            tokens,
            [
                start("a", &[("href", "x&y"), ("data-x", "1"), ("hidden", "")], false),
                Token::Text("t<".to_string()),
                Token::EndTag("a".to_string()),
            ]
        );
    }

    #[test]
    fn keeps_a_lone_angle_bracket_as_text() {
        let tokens = tokenize("<p>1 < 2</p>");
        assert_eq!(tokens[1], Token::Text("1 < 2".to_string()));
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn script_bodies_are_raw_text() {
        let tokens = tokenize("<script>if (a<b) { x = '</p>'; }</SCRIPT >after");
        assert_eq!(
            tokens,
            [
                start("script", &[], false),
                Token::Text("if (a<b) { x = '</p>'; }".to_string()),
                Token::EndTag("script".to_string()),
                Token::Text("after".to_string()),
            ]
        );
    }

    #[test]
    fn reads_doctype_and_comments() {
        let tokens = tokenize("<!DOCTYPE html><!-- note --><br/>");
        assert_eq!(
            tokens,
            [
                Token::Doctype("DOCTYPE html".to_string()),
                Token::Comment(" note ".to_string()),
                start("br", &[], true),
            ]
        );
    }

    #[test]
    fn skips_declarations_with_non_ascii_names() {
        let tokens = tokenize("<p>a</p><!abcdefé><!é>");
        assert_eq!(
            tokens,
            [
                start("p", &[], false),
                Token::Text("a".to_string()),
                Token::EndTag("p".to_string()),
            ]
        );
    }

    #[test]
    fn preserves_utf8_text() {
        let tokens = tokenize("<p>👍 héllo</p>");
        assert_eq!(tokens[1], Token::Text("👍 héllo".to_string()));
    }
}
