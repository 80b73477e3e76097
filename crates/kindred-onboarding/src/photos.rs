//! Photo grid editor: one mandatory main photo plus a fixed number of
//! optional slots.

use serde::{Deserialize, Serialize};
use tracing::debug;

use kindred_shared::constants::PHOTO_SLOTS;
use kindred_shared::types::MediaRef;
use kindred_shared::{ProfileDraft, ValidationError};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PhotoGrid {
    main: Option<MediaRef>,
    slots: [Option<MediaRef>; PHOTO_SLOTS],
}

impl PhotoGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the grid from what a draft already holds, so returning to a
    /// photo step shows the previous selection.
    pub fn from_draft(draft: &ProfileDraft) -> Self {
        let mut grid = Self {
            main: draft.main_photo.clone(),
            ..Self::default()
        };
        for (slot, photo) in grid.slots.iter_mut().zip(draft.photos.iter()) {
            *slot = Some(photo.clone());
        }
        grid
    }

    pub fn main(&self) -> Option<&MediaRef> {
        self.main.as_ref()
    }

    pub fn slot(&self, index: usize) -> Option<&MediaRef> {
        self.slots.get(index).and_then(|s| s.as_ref())
    }

    pub fn has_main(&self) -> bool {
        self.main.is_some()
    }

    /// Set or replace the main photo, returning the one it replaced.
    pub fn set_main(&mut self, photo: MediaRef) -> Result<Option<MediaRef>, ValidationError> {
        if self.slots.iter().flatten().any(|p| *p == photo) {
            return Err(ValidationError::DuplicatePhoto);
        }
        debug!(photo = %photo, "Main photo set");
        Ok(self.main.replace(photo))
    }

    /// The main photo can be replaced but never removed.
    pub fn remove_main(&mut self) -> Result<(), ValidationError> {
        Err(ValidationError::MainPhotoRequired)
    }

    /// Fill or replace an additional slot, returning the previous photo.
    pub fn set_slot(
        &mut self,
        index: usize,
        photo: MediaRef,
    ) -> Result<Option<MediaRef>, ValidationError> {
        if index >= PHOTO_SLOTS {
            return Err(ValidationError::SlotOutOfRange(index));
        }
        let used_elsewhere = self.main.as_ref() == Some(&photo)
            || self
                .slots
                .iter()
                .enumerate()
                .any(|(i, p)| i != index && p.as_ref() == Some(&photo));
        if used_elsewhere {
            return Err(ValidationError::DuplicatePhoto);
        }
        Ok(self.slots[index].replace(photo))
    }

    pub fn remove_slot(&mut self, index: usize) -> Result<Option<MediaRef>, ValidationError> {
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(ValidationError::SlotOutOfRange(index))?;
        Ok(slot.take())
    }

    pub fn first_empty_slot(&self) -> Option<usize> {
        self.slots.iter().position(|s| s.is_none())
    }

    pub fn filled_slots(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Filled slots in slot order, gaps removed.
    pub fn additional_photos(&self) -> Vec<MediaRef> {
        self.slots.iter().flatten().cloned().collect()
    }

    /// Main photo first, then the filled slots.
    pub fn ordered_photos(&self) -> Vec<MediaRef> {
        self.main
            .iter()
            .cloned()
            .chain(self.additional_photos())
            .collect()
    }

    pub(crate) fn require_main(&self) -> Result<&MediaRef, ValidationError> {
        self.main.as_ref().ok_or(ValidationError::MissingMainPhoto)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(n: u32) -> MediaRef {
        MediaRef::new(format!("https://img.example/{n}.jpg"))
    }

    #[test]
    fn test_main_cannot_be_removed() {
        let mut grid = PhotoGrid::new();
        assert_eq!(grid.remove_main(), Err(ValidationError::MainPhotoRequired));
        grid.set_main(photo(1)).unwrap();
        assert_eq!(grid.remove_main(), Err(ValidationError::MainPhotoRequired));
        assert_eq!(grid.main(), Some(&photo(1)));
    }

    #[test]
    fn test_replace_main_returns_previous() {
        let mut grid = PhotoGrid::new();
        assert_eq!(grid.set_main(photo(1)).unwrap(), None);
        assert_eq!(grid.set_main(photo(2)).unwrap(), Some(photo(1)));
    }

    #[test]
    fn test_duplicates_rejected() {
        let mut grid = PhotoGrid::new();
        grid.set_main(photo(1)).unwrap();
        assert_eq!(grid.set_slot(0, photo(1)), Err(ValidationError::DuplicatePhoto));
        grid.set_slot(0, photo(2)).unwrap();
        assert_eq!(grid.set_slot(3, photo(2)), Err(ValidationError::DuplicatePhoto));
        assert_eq!(grid.set_main(photo(2)), Err(ValidationError::DuplicatePhoto));
        // Re-setting a slot to its own photo is fine.
        assert_eq!(grid.set_slot(0, photo(2)).unwrap(), Some(photo(2)));
    }

    #[test]
    fn test_slot_bounds() {
        let mut grid = PhotoGrid::new();
        assert_eq!(
            grid.set_slot(PHOTO_SLOTS, photo(9)),
            Err(ValidationError::SlotOutOfRange(PHOTO_SLOTS))
        );
        assert!(grid.remove_slot(PHOTO_SLOTS).is_err());
    }

    #[test]
    fn test_ordered_photos_skip_gaps() {
        let mut grid = PhotoGrid::new();
        grid.set_main(photo(1)).unwrap();
        grid.set_slot(2, photo(3)).unwrap();
        grid.set_slot(0, photo(2)).unwrap();
        assert_eq!(grid.ordered_photos(), vec![photo(1), photo(2), photo(3)]);
        assert_eq!(grid.first_empty_slot(), Some(1));
        assert_eq!(grid.remove_slot(0).unwrap(), Some(photo(2)));
        assert_eq!(grid.filled_slots(), 1);
    }

    #[test]
    fn test_from_draft_roundtrip() {
        let mut grid = PhotoGrid::new();
        grid.set_main(photo(1)).unwrap();
        grid.set_slot(0, photo(2)).unwrap();

        let mut draft = ProfileDraft::new();
        draft.main_photo = grid.main().cloned();
        draft.photos = grid.additional_photos();

        assert_eq!(PhotoGrid::from_draft(&draft), grid);
    }
}
