//! Publishing rendered charts to the report card.

use std::path::Path;

use crate::client::BoardApi;
use crate::error::Result;
use crate::models::RawCard;

/// Replace every attachment on `report_card` with the given charts.
///
/// `cover` becomes the card cover; `others` are attached after it without
/// touching the cover. Without a report card this does nothing.
pub fn publish<A: BoardApi + ?Sized>(
    api: &A,
    report_card: Option<&RawCard>,
    cover: &Path,
    others: &[&Path],
) -> Result<bool> {
    let Some(card) = report_card else {
        tracing::info!("No report card on the board, skipping publish");
        return Ok(false);
    };

    let attachments = api.get_all_attachments(&card.id)?;
    tracing::info!(card = %card.name, "Removing {} existing attachments", attachments.len());
    for attachment in &attachments {
        api.delete_attachment(&card.id, &attachment.id)?;
    }

    api.add_attachment(&card.id, cover, true)?;
    for path in others {
        api.add_attachment(&card.id, path, false)?;
    }
    tracing::info!(card = %card.name, "Published {} charts", others.len() + 1);
    Ok(true)
}
