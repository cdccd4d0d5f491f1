//! Asynchronous image loads into cells.
//!
//! Decoding happens outside the store. A load first takes a ticket, and its
//! result is applied only if that ticket is still the latest one issued for
//! the cell. A newer load, an explicit `set_image`/`clear`, or the cell
//! vanishing in a resize all make older tickets stale.

use super::SheetState;
use crate::types::CellImage;

/// Receipt for a pending load, addressed by grid position so it stays
/// meaningful across resizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    pub row: u32,
    pub col: u32,
    generation: u64,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl SheetState {
    /// Start a load into `index`. The cell keeps its current content until
    /// the load completes.
    pub fn begin_load(&mut self, index: usize) -> Option<LoadTicket> {
        let generation = self.next_load;
        let cell = self.cells.get_mut(index)?;
        self.next_load += 1;
        cell.pending_load = Some(generation);
        log::debug!(
            "load #{generation} started for cell ({}, {})",
            cell.row,
            cell.col
        );
        Some(LoadTicket {
            row: cell.row,
            col: cell.col,
            generation,
        })
    }

    fn ticket_index(&self, ticket: &LoadTicket) -> Option<usize> {
        let index = self.cell_index(ticket.row, ticket.col)?;
        self.cells
            .get(index)
            .filter(|c| c.pending_load == Some(ticket.generation))
            .map(|_| index)
    }

    /// Apply a finished load. Returns the cell index it landed in, or `None`
    /// when the ticket was stale and the image was discarded.
    pub fn complete_load(&mut self, ticket: &LoadTicket, image: CellImage) -> Option<usize> {
        let Some(index) = self.ticket_index(ticket) else {
            log::warn!(
                "discarding stale load #{} for cell ({}, {})",
                ticket.generation,
                ticket.row,
                ticket.col
            );
            return None;
        };
        self.set_image(index, image);
        Some(index)
    }

    /// A load failed to decode. The cell's content is left as it was.
    pub fn fail_load(&mut self, ticket: &LoadTicket) {
        if let Some(index) = self.ticket_index(ticket) {
            if let Some(cell) = self.cells.get_mut(index) {
                cell.pending_load = None;
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::types::{DecodedImage, ImageFormat};

    fn image(w: u32) -> CellImage {
        CellImage::new(
            DecodedImage::new(image::RgbaImage::new(w, 1)),
            vec![0; 4],
            ImageFormat::Png,
        )
    }

    #[test]
    fn newer_load_wins_regardless_of_completion_order() {
        let mut sheet = SheetState::default();
        let first = sheet.begin_load(3).unwrap();
        let second = sheet.begin_load(3).unwrap();

        assert_eq!(sheet.complete_load(&second, image(2)), Some(3));
        assert_eq!(sheet.complete_load(&first, image(7)), None);
        assert_eq!(sheet.cell(3).unwrap().image.as_ref().unwrap().decoded.width(), 2);
    }

    #[test]
    fn clear_supersedes_pending_load() {
        let mut sheet = SheetState::default();
        let ticket = sheet.begin_load(0).unwrap();
        sheet.clear(0);
        assert_eq!(sheet.complete_load(&ticket, image(1)), None);
        assert!(!sheet.cell(0).unwrap().has_image());
    }

    #[test]
    fn failed_load_keeps_previous_image() {
        let mut sheet = SheetState::default();
        sheet.set_image(1, image(5));
        let ticket = sheet.begin_load(1).unwrap();
        sheet.fail_load(&ticket);
        let cell = sheet.cell(1).unwrap();
        assert!(!cell.is_loading());
        assert_eq!(cell.image.as_ref().unwrap().decoded.width(), 5);
    }

    #[test]
    fn out_of_range_load_gets_no_ticket() {
        let mut sheet = SheetState::default();
        assert!(sheet.begin_load(10_000).is_none());
    }
}
