use std::collections::{HashMap, HashSet};

use crate::{
    error::{AppError, AppResult},
    models::{ContentId, ContentItem},
};

/// Arranges `current` according to a previously saved order
///
/// Items named in `saved_order` come first, in that order. Ids that are no
/// longer present are skipped. Items the saved order does not mention follow
/// in their fetch order. Every current item appears exactly once.
pub fn reconcile(current: Vec<ContentItem>, saved_order: &[ContentId]) -> Vec<ContentItem> {
    if saved_order.is_empty() {
        return current;
    }

    let positions: HashMap<ContentId, usize> = current
        .iter()
        .enumerate()
        .map(|(pos, item)| (item.id().clone(), pos))
        .collect();

    let mut slots: Vec<Option<ContentItem>> = current.into_iter().map(Some).collect();
    let mut ordered = Vec::with_capacity(slots.len());

    for id in saved_order {
        if let Some(&pos) = positions.get(id) {
            if let Some(item) = slots[pos].take() {
                ordered.push(item);
            }
        }
    }

    ordered.extend(slots.into_iter().flatten());
    ordered
}

/// Ids of `items` in display order
pub fn order_of(items: &[ContentItem]) -> Vec<ContentId> {
    items.iter().map(|item| item.id().clone()).collect()
}

/// Where a dragged card was picked up and dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragMove {
    pub from: usize,
    /// `None` when the card was dropped outside the list
    pub to: Option<usize>,
}

impl DragMove {
    /// Whether applying the move would leave the list as it is
    pub fn is_noop(&self) -> bool {
        match self.to {
            None => true,
            Some(to) => to == self.from,
        }
    }
}

/// Removes the item at `from` and reinserts it at `to`
pub fn move_item(mut items: Vec<ContentItem>, drag: DragMove) -> AppResult<Vec<ContentItem>> {
    let Some(to) = drag.to else {
        return Ok(items);
    };

    if drag.from >= items.len() || to >= items.len() {
        return Err(AppError::InvalidInput(format!(
            "Cannot move item from {} to {} in a list of {}",
            drag.from,
            to,
            items.len()
        )));
    }

    if drag.from != to {
        let item = items.remove(drag.from);
        items.insert(to, item);
    }

    Ok(items)
}

/// The order to persist after rearranging one section
///
/// The section's ids come first in their new order, followed by the
/// previously saved ids outside the section, so dragging within one section
/// keeps the arrangement of the others.
pub fn merge_section_order(section: &[ContentId], previous: &[ContentId]) -> Vec<ContentId> {
    let in_section: HashSet<&ContentId> = section.iter().collect();
    section
        .iter()
        .cloned()
        .chain(previous.iter().filter(|id| !in_section.contains(id)).cloned())
        .collect()
}
