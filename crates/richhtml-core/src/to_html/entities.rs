use crate::error::{Error, Result};
use crate::hooks::EntityToHtmlFn;
use crate::markup::{Split, split_markup};
use crate::model::{EntityMap, EntityRange, Mutation, RawBlock};
use crate::range::{range_sort, update_mutation};

/// Fails on overlapping entity ranges or keys missing from `entity_map`.
///
/// `ranges` must already be sorted.
fn validate(block: &RawBlock, ranges: &[EntityRange], entity_map: &EntityMap) -> Result<()> {
    for pair in ranges.windows(2) {
        if pair[1].offset < pair[0].end() {
            return Err(Error::OverlappingEntityRanges {
                block: block.key.clone(),
                first: pair[0].key.clone(),
                second: pair[1].key.clone(),
            });
        }
    }
    for range in ranges {
        if entity_map.get(&range.key).is_none() {
            return Err(Error::MissingEntity {
                key: range.key.clone(),
            });
        }
    }
    Ok(())
}

/// Replaces each entity's text with its markup, keeping later entity ranges and every style
/// range aligned with the rewritten text.
pub fn render_entities(
    block: &RawBlock,
    entity_map: &EntityMap,
    entity_to_html: &EntityToHtmlFn,
) -> Result<RawBlock> {
    let mut entities = block.entity_ranges.clone();
    range_sort(&mut entities);
    validate(block, &entities, entity_map)?;

    let mut chars: Vec<char> = block.text.chars().collect();
    let mut styles = block.inline_style_ranges.clone();

    for index in 0..entities.len() {
        let current = entities[index].clone();
        let Some(entity) = entity_map.get(&current.key) else {
            return Err(Error::MissingEntity { key: current.key });
        };
        let start = current.offset.min(chars.len());
        let end = current.end().min(chars.len());
        let original: String = chars[start..end].iter().collect();

        let Some(markup) = entity_to_html(entity, &original) else {
            continue;
        };
        let split = split_markup(&markup)?;
        // an empty replacement keeps the original text
        if matches!(&split, Split::Literal(html) if html.is_empty()) {
            continue;
        }
        let (prefix_length, suffix_length) = split.tag_lengths();
        let converted: Vec<char> = split.wrap(&original).chars().collect();
        let original_length = end - start;
        let new_length = converted.len();
        tracing::trace!(
            block = %block.key,
            entity = %current.key,
            original_length,
            new_length,
            "rendered entity"
        );

        chars.splice(start..end, converted);

        let mut adjusted = Vec::with_capacity(styles.len());
        for style in &styles {
            update_mutation(
                style,
                start,
                original_length,
                new_length,
                prefix_length,
                suffix_length,
            )
            .append_to(&mut adjusted);
        }
        styles = adjusted;

        for later in entities.iter_mut().skip(index + 1) {
            *later = update_mutation(
                later,
                start,
                original_length,
                new_length,
                prefix_length,
                suffix_length,
            )
            .into_first();
        }
    }

    let mut out = block.clone();
    out.text = chars.into_iter().collect();
    out.inline_style_ranges = styles;
    out.entity_ranges = entities;
    Ok(out)
}
