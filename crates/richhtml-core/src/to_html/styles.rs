use crate::error::{Error, Result};
use crate::hooks::StyleToHtmlFn;
use crate::markup::{Split, TagPair, split_markup};
use crate::model::{InlineStyleRange, Mutation, RawBlock};
use crate::range::range_sort;
use rustc_hash::FxHashMap;

/// Collapses overlapping or touching ranges of the same style into one run and drops empty
/// ranges. Runs keep the input position of their first range so ties sort as in the input.
fn merge_style_runs(ranges: &[InlineStyleRange]) -> Vec<InlineStyleRange> {
    let mut order: Vec<usize> = (0..ranges.len())
        .filter(|&i| ranges[i].length > 0)
        .collect();
    order.sort_by(|&a, &b| {
        ranges[a]
            .style
            .cmp(&ranges[b].style)
            .then(ranges[a].offset.cmp(&ranges[b].offset))
    });

    let mut merged: Vec<(usize, InlineStyleRange)> = Vec::new();
    for i in order {
        let range = &ranges[i];
        if let Some((first, last)) = merged.last_mut() {
            if last.style == range.style && range.offset <= last.end() {
                let end = last.end().max(range.end());
                last.length = end - last.offset;
                *first = (*first).min(i);
                continue;
            }
        }
        merged.push((i, range.clone()));
    }

    merged.sort_by_key(|(first, _)| *first);
    let mut out: Vec<InlineStyleRange> = merged.into_iter().map(|(_, range)| range).collect();
    range_sort(&mut out);
    out
}

fn style_tags(style: &str, style_to_html: &StyleToHtmlFn) -> Result<TagPair> {
    let missing = || Error::MissingStyleMarkup {
        style: style.to_string(),
    };
    let markup = style_to_html(style).ok_or_else(missing)?;
    match split_markup(&markup)? {
        Split::Pair { start, end } if !start.is_empty() && !end.is_empty() => {
            Ok(TagPair { start, end })
        }
        _ => Err(missing()),
    }
}

fn has_style(ranges: &[&InlineStyleRange], style: &str) -> bool {
    ranges.iter().any(|range| range.style == style)
}

/// Emits the block text with properly nested start and end tags for its style ranges.
///
/// Ranges that cross each other are closed and reopened where needed; the range ending last
/// always opens outermost.
pub fn render_inline_styles(block: &RawBlock, style_to_html: &StyleToHtmlFn) -> Result<String> {
    let ranges = merge_style_runs(&block.inline_style_ranges);
    if ranges.is_empty() {
        return Ok(block.text.clone());
    }

    let mut tags: FxHashMap<&str, TagPair> = FxHashMap::default();
    for range in &ranges {
        if !tags.contains_key(range.style.as_str()) {
            tags.insert(range.style.as_str(), style_tags(&range.style, style_to_html)?);
        }
    }

    let mut out = String::with_capacity(block.text.len() * 2);
    let mut stack: Vec<&InlineStyleRange> = Vec::new();

    for (index, c) in block.text.chars().enumerate() {
        let active: Vec<&InlineStyleRange> = ranges
            .iter()
            .filter(|range| range.offset <= index && index < range.end())
            .collect();
        let ending: Vec<&InlineStyleRange> = stack
            .iter()
            .filter(|open| !has_style(&active, &open.style))
            .copied()
            .collect();
        let new: Vec<&InlineStyleRange> = active
            .iter()
            .filter(|range| !has_style(&stack, &range.style))
            .copied()
            .collect();
        let remaining: Vec<&InlineStyleRange> = stack
            .iter()
            .filter(|open| !has_style(&ending, &open.style))
            .copied()
            .collect();

        // everything from the first open range that can't contain all new ranges is reopened
        let reset: Vec<&InlineStyleRange> = remaining
            .iter()
            .position(|open| {
                !new.iter()
                    .all(|range| open.offset <= range.offset && open.end() >= range.end())
            })
            .map(|from| remaining[from..].to_vec())
            .unwrap_or_default();

        for closing in ending.iter().rev().chain(reset.iter().rev()) {
            let Some(top) = stack.pop() else {
                return Err(Error::StyleStackMismatch {
                    index,
                    found: String::new(),
                    expected: closing.style.clone(),
                });
            };
            if top.style != closing.style {
                return Err(Error::StyleStackMismatch {
                    index,
                    found: top.style.clone(),
                    expected: closing.style.clone(),
                });
            }
            if let Some(pair) = tags.get(top.style.as_str()) {
                out.push_str(&pair.end);
            }
        }

        let mut opening: Vec<&InlineStyleRange> = reset.into_iter().chain(new).collect();
        opening.sort_by(|a, b| b.end().cmp(&a.end()));
        for open in opening {
            if let Some(pair) = tags.get(open.style.as_str()) {
                out.push_str(&pair.start);
            }
            stack.push(open);
        }

        out.push(c);

        if stack.len() != active.len() {
            return Err(Error::StyleStackSize {
                index,
                extra: stack.len() as isize - active.len() as isize,
            });
        }
    }

    while let Some(open) = stack.pop() {
        if let Some(pair) = tags.get(open.style.as_str()) {
            out.push_str(&pair.end);
        }
    }

    Ok(out)
}
