use crate::model::RawBlock;
use crate::range::{range_sort, update_mutation};

fn encoding(c: char) -> Option<&'static str> {
    Some(match c {
        '&' => "&amp;",
        '<' => "&lt;",
        '>' => "&gt;",
        '"' => "&quot;",
        '\'' => "&#x27;",
        '`' => "&#x60;",
        '\n' => "<br/>",
        _ => return None,
    })
}

/// Escapes the block text and moves every range along with it.
pub fn encode_block(block: &RawBlock) -> RawBlock {
    let mut out = block.clone();
    range_sort(&mut out.inline_style_ranges);
    range_sort(&mut out.entity_ranges);

    if !block.text.chars().any(|c| encoding(c).is_some()) {
        return out;
    }

    let mut text = String::with_capacity(block.text.len());
    let mut result_index = 0;
    for c in block.text.chars() {
        let Some(encoded) = encoding(c) else {
            text.push(c);
            result_index += 1;
            continue;
        };
        let encoded_len = encoded.len();
        for range in &mut out.inline_style_ranges {
            *range = update_mutation(range, result_index, 1, encoded_len, 0, 0).into_first();
        }
        for range in &mut out.entity_ranges {
            *range = update_mutation(range, result_index, 1, encoded_len, 0, 0).into_first();
        }
        text.push_str(encoded);
        result_index += encoded_len;
    }
    out.text = text;
    out
}
