use super::tokenizer::Token;
use super::{Element, Node};

/// Content of these elements never reaches the tree.
fn is_dropped_element(name: &str) -> bool {
    matches!(name, "head" | "script" | "style" | "template" | "title" | "noscript")
}

/// Start tags that implicitly close an open `<p>`.
fn closes_paragraph(name: &str) -> bool {
    matches!(
        name,
        "address"
            | "article"
            | "aside"
            | "blockquote"
            | "div"
            | "dl"
            | "fieldset"
            | "figure"
            | "footer"
            | "form"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "header"
            | "hr"
            | "li"
            | "main"
            | "nav"
            | "ol"
            | "p"
            | "pre"
            | "section"
            | "table"
            | "ul"
    )
}

struct TreeBuilder {
    /// `stack[0]` is the synthetic body; the rest are open elements, innermost last.
    stack: Vec<Element>,
    /// Depth of the outermost open dropped element, if any.
    dropped_from: Option<usize>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            stack: vec![Element::new("body")],
            dropped_from: None,
        }
    }

    fn append(&mut self, node: Node) {
        if let Some(parent) = self.stack.last_mut() {
            parent.children.push(node);
        }
    }

    fn append_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(parent) = self.stack.last_mut() {
            // adjacent text tokens merge into one node
            if let Some(Node::Text(last)) = parent.children.last_mut() {
                last.push_str(text);
                return;
            }
            parent.children.push(Node::Text(text.to_string()));
        }
    }

    fn open(&mut self, element: Element) {
        if self.dropped_from.is_none() && is_dropped_element(&element.name) {
            self.dropped_from = Some(self.stack.len());
        }
        self.stack.push(element);
    }

    /// Pops the innermost element and attaches it to its parent.
    fn close_one(&mut self) {
        if self.stack.len() <= 1 {
            return;
        }
        let Some(element) = self.stack.pop() else {
            return;
        };
        if self.dropped_from == Some(self.stack.len()) {
            self.dropped_from = None;
            return;
        }
        self.append(Node::Element(element));
    }

    fn position_of(&self, name: &str) -> Option<usize> {
        self.stack
            .iter()
            .enumerate()
            .skip(1)
            .rev()
            .find(|(_, element)| element.name == name)
            .map(|(i, _)| i)
    }

    fn close_to(&mut self, index: usize) {
        while self.stack.len() > index {
            self.close_one();
        }
    }

    /// Index of an open `li` that belongs to the innermost list, if any.
    fn open_list_item(&self) -> Option<usize> {
        for (i, element) in self.stack.iter().enumerate().skip(1).rev() {
            match element.name.as_str() {
                "li" => return Some(i),
                "ul" | "ol" => return None,
                _ => {}
            }
        }
        None
    }

    fn start_tag(&mut self, name: &str, attributes: &[(String, String)], self_closing: bool) {
        if name == "html" || name == "body" {
            return;
        }

        if self.dropped_from.is_none() {
            if name == "li" {
                if let Some(index) = self.open_list_item() {
                    self.close_to(index);
                }
            }
            if closes_paragraph(name) {
                if let Some(index) = self.position_of("p") {
                    self.close_to(index);
                }
            }
        }

        let mut element = Element::new(name);
        element.attributes = attributes.to_vec();
        if self_closing {
            if self.dropped_from.is_none() && !is_dropped_element(name) {
                self.append(Node::Element(element));
            }
        } else {
            self.open(element);
        }
    }

    fn end_tag(&mut self, name: &str) {
        if name == "html" || name == "body" {
            return;
        }
        if let Some(index) = self.position_of(name) {
            self.close_to(index);
        }
    }

    fn finish(mut self) -> Element {
        self.close_to(1);
        self.stack.pop().unwrap_or_else(|| Element::new("body"))
    }
}

/// Builds a tree rooted at a synthetic `body` element from a token stream.
///
/// Unmatched end tags are ignored and anything still open at the end is closed. `html` and `body`
/// tags are transparent; `head`, `script`, `style` and `template` are discarded along with
/// comments and doctypes.
pub fn build_body(tokens: &[Token]) -> Element {
    let mut builder = TreeBuilder::new();
    for token in tokens {
        match token {
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => builder.start_tag(name, attributes, *self_closing),
            Token::EndTag(name) => builder.end_tag(name),
            Token::Text(text) => {
                if builder.dropped_from.is_none() {
                    builder.append_text(text);
                }
            }
            Token::Comment(_) | Token::Doctype(_) => {}
        }
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::tokenize;

    fn build(html: &str) -> Element {
        build_body(&tokenize(html))
    }

    #[test]
    fn ignores_html_and_body_wrappers() {
        let body = build("<html><body><p>x</p></body></html>");
        assert_eq!(body.name, "body");
        assert_eq!(body.children.len(), 1);
        assert_eq!(body.children[0].node_name(), "p");
    }

    #[test]
    fn merges_adjacent_text() {
        let body = build("a<!-- c -->b");
        assert_eq!(body.children, [Node::text("ab")]);
    }

    #[test]
    fn nested_lists_keep_their_items() {
        let body = build("<ul><li>a<ul><li>b</li></ul></li><li>c</li></ul>");
        let ul = &body.children[0];
        assert_eq!(ul.children().len(), 2);
        let inner = &ul.children()[0].children()[1];
        assert_eq!(inner.node_name(), "ul");
        assert_eq!(inner.children().len(), 1);
    }

    #[test]
    fn discards_dropped_subtrees_with_nested_content() {
        let body = build("<template><p>x</p><br/></template><p>y</p>");
        assert_eq!(body.children.len(), 1);
        assert_eq!(body.children[0].first_child(), Some(&Node::text("y")));
    }
}
