//! Current/next image rotation for the display device.
//!
//! `current` is the image last handed to the device, `next` the one queued
//! for the following poll (`None` = pick at random). Every operation holds
//! the selection lock across its storage calls so a delete can never leave a
//! pointer at a missing image.

use std::sync::{Mutex, MutexGuard};

use gallery_db::{Database, DbError, Image};
use serde::Serialize;
use tracing::{error, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum RotationError {
    #[error("No images to serve")]
    EmptyCollection,

    #[error("Image {0} not found")]
    NotFound(i64),

    #[error("Queued next image {0} no longer exists")]
    DanglingNext(i64),

    #[error("Database error: {0}")]
    Db(#[from] DbError),

    #[error("Rotation lock poisoned")]
    LockPoisoned,
}

impl RotationError {
    /// HTTP status code for this error.
    pub fn status(&self) -> u16 {
        match self {
            Self::EmptyCollection | Self::NotFound(_) => 404,
            Self::DanglingNext(_) | Self::Db(_) | Self::LockPoisoned => 500,
        }
    }
}

/// Snapshot of the rotation pointers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub current: Option<i64>,
    pub next: Option<i64>,
}

impl Selection {
    /// Clear whichever pointers reference `id`.
    fn forget(&mut self, id: i64) {
        if self.current == Some(id) {
            self.current = None;
        }
        if self.next == Some(id) {
            self.next = None;
        }
    }
}

pub struct Rotation {
    db: Database,
    selection: Mutex<Selection>,
}

impl Rotation {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            selection: Mutex::new(Selection::default()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Selection>, RotationError> {
        self.selection.lock().map_err(|_| RotationError::LockPoisoned)
    }

    pub fn selection(&self) -> Result<Selection, RotationError> {
        Ok(*self.lock()?)
    }

    /// Advance the rotation and return the image to display now.
    ///
    /// The queued `next` image wins if set, otherwise a random one. The
    /// winner becomes `current` and a fresh random pick is queued; if that
    /// pick fails, `next` is left unset and the winner is still returned.
    pub fn select_next(&self) -> Result<Image, RotationError> {
        let mut selection = self.lock()?;

        let winner = match selection.next {
            Some(id) => match self.db.get_image(id)? {
                Some(image) => image,
                None => {
                    error!(id, "Queued next image is missing from storage");
                    selection.next = None;
                    return Err(RotationError::DanglingNext(id));
                }
            },
            None => self
                .db
                .get_random_image()?
                .ok_or(RotationError::EmptyCollection)?,
        };

        selection.current = Some(winner.id);
        selection.next = match self.db.get_random_image_id() {
            Ok(next) => next,
            Err(e) => {
                warn!("Failed to queue next image: {e}");
                None
            }
        };

        info!(
            current = winner.id,
            next = ?selection.next,
            title = %winner.title,
            "Advanced image rotation"
        );
        Ok(winner)
    }

    /// Queue `id` as the next image, replacing any queued image.
    pub fn set_next(&self, id: i64) -> Result<(), RotationError> {
        let mut selection = self.lock()?;
        if !self.db.image_exists(id)? {
            return Err(RotationError::NotFound(id));
        }
        selection.next = Some(id);
        info!(id, "Set next image");
        Ok(())
    }

    /// Delete an image and clear any pointer to it in one step.
    pub fn delete_image(&self, id: i64) -> Result<(), RotationError> {
        let mut selection = self.lock()?;
        if !self.db.delete_image(id)? {
            return Err(RotationError::NotFound(id));
        }
        selection.forget(id);
        info!(id, "Deleted image");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn setup(count: usize) -> (Database, Rotation, Vec<i64>) {
        let db = Database::open_in_memory().unwrap();
        let ids = (0..count)
            .map(|i| db.create_image(&format!("Image {i}"), "Artist", false, b"BM").unwrap())
            .collect();
        let rotation = Rotation::new(db.clone());
        (db, rotation, ids)
    }

    fn assert_pointers_exist(db: &Database, selection: Selection) {
        for id in [selection.current, selection.next].into_iter().flatten() {
            assert!(db.image_exists(id).unwrap(), "dangling pointer {id}");
        }
    }

    #[test]
    fn test_starts_unset() {
        let (_db, rotation, _) = setup(0);
        assert_eq!(rotation.selection().unwrap(), Selection::default());
    }

    #[test]
    fn test_first_poll_picks_random_and_queues_next() {
        let (_db, rotation, ids) = setup(3);

        let first = rotation.select_next().unwrap();
        assert!(ids.contains(&first.id));

        let selection = rotation.selection().unwrap();
        assert_eq!(selection.current, Some(first.id));
        let queued = selection.next.expect("next should be queued");
        assert!(ids.contains(&queued));

        let second = rotation.select_next().unwrap();
        assert_eq!(second.id, queued);
        assert_eq!(rotation.selection().unwrap().current, Some(queued));
    }

    #[test]
    fn test_single_image_may_queue_itself() {
        let (_db, rotation, ids) = setup(1);
        let image = rotation.select_next().unwrap();
        assert_eq!(image.id, ids[0]);
        assert_eq!(
            rotation.selection().unwrap(),
            Selection {
                current: Some(ids[0]),
                next: Some(ids[0]),
            }
        );
    }

    #[test]
    fn test_empty_gallery_reports_nothing_to_serve() {
        let (_db, rotation, _) = setup(0);
        let err = rotation.select_next().unwrap_err();
        assert!(matches!(err, RotationError::EmptyCollection));
        assert_eq!(err.status(), 404);
        assert_eq!(rotation.selection().unwrap(), Selection::default());
    }

    #[test]
    fn test_override_then_select_returns_override() {
        let (_db, rotation, ids) = setup(5);
        let target = ids[3];

        rotation.set_next(target).unwrap();
        assert_eq!(rotation.selection().unwrap().next, Some(target));

        let winner = rotation.select_next().unwrap();
        assert_eq!(winner.id, target);
        assert_eq!(winner.title, "Image 3");
    }

    #[test]
    fn test_set_next_replaces_queued_image() {
        let (_db, rotation, ids) = setup(3);
        rotation.select_next().unwrap();
        rotation.set_next(ids[2]).unwrap();
        rotation.set_next(ids[1]).unwrap();
        assert_eq!(rotation.select_next().unwrap().id, ids[1]);
    }

    #[test]
    fn test_set_next_rejects_unknown_image() {
        let (_db, rotation, ids) = setup(2);
        rotation.set_next(ids[0]).unwrap();

        let err = rotation.set_next(9999).unwrap_err();
        assert!(matches!(err, RotationError::NotFound(9999)));
        assert_eq!(rotation.selection().unwrap().next, Some(ids[0]));
    }

    #[test]
    fn test_delete_clears_matching_pointers_independently() {
        let (db, rotation, ids) = setup(3);
        let (current, next) = (ids[0], ids[1]);

        rotation.set_next(current).unwrap();
        rotation.select_next().unwrap();
        rotation.set_next(next).unwrap();
        assert_eq!(
            rotation.selection().unwrap(),
            Selection {
                current: Some(current),
                next: Some(next),
            }
        );

        rotation.delete_image(current).unwrap();
        assert_eq!(
            rotation.selection().unwrap(),
            Selection {
                current: None,
                next: Some(next),
            }
        );

        rotation.delete_image(next).unwrap();
        assert_eq!(rotation.selection().unwrap(), Selection::default());
        assert_eq!(db.count_images().unwrap(), 1);
    }

    #[test]
    fn test_delete_clears_both_when_same_image() {
        let (_db, rotation, ids) = setup(1);
        rotation.select_next().unwrap();

        rotation.delete_image(ids[0]).unwrap();
        assert_eq!(rotation.selection().unwrap(), Selection::default());
    }

    #[test]
    fn test_delete_unrelated_image_keeps_pointers() {
        let (_db, rotation, ids) = setup(3);
        rotation.set_next(ids[0]).unwrap();
        rotation.select_next().unwrap();
        rotation.set_next(ids[1]).unwrap();

        rotation.delete_image(ids[2]).unwrap();
        assert_eq!(
            rotation.selection().unwrap(),
            Selection {
                current: Some(ids[0]),
                next: Some(ids[1]),
            }
        );
    }

    #[test]
    fn test_delete_missing_image_is_not_found() {
        let (_db, rotation, _) = setup(1);
        let err = rotation.delete_image(424242).unwrap_err();
        assert!(matches!(err, RotationError::NotFound(424242)));
        assert_eq!(err.status(), 404);
    }

    #[test]
    fn test_next_removed_behind_our_back_is_an_invariant_error() {
        let (db, rotation, ids) = setup(2);
        rotation.set_next(ids[0]).unwrap();
        // Deleting through storage directly skips the pointer cleanup
        db.delete_image(ids[0]).unwrap();

        let err = rotation.select_next().unwrap_err();
        assert!(matches!(err, RotationError::DanglingNext(id) if id == ids[0]));
        assert_eq!(err.status(), 500);
        assert_eq!(rotation.selection().unwrap().next, None);

        // Next poll recovers with a random pick
        assert_eq!(rotation.select_next().unwrap().id, ids[1]);
    }

    #[test]
    fn test_pointers_never_dangle_across_operation_sequence() {
        let (db, rotation, _) = setup(6);

        for step in 0..30 {
            match step % 5 {
                0 | 3 => {
                    let _ = rotation.select_next();
                }
                1 => {
                    if let Some(summary) = db.list_images().unwrap().last() {
                        rotation.set_next(summary.id).unwrap();
                    }
                }
                2 => {
                    if let Some(current) = rotation.selection().unwrap().current {
                        rotation.delete_image(current).unwrap();
                    }
                }
                _ => {
                    if let Some(next) = rotation.selection().unwrap().next {
                        rotation.delete_image(next).unwrap();
                    }
                    db.create_image("Fresh", "Artist", true, b"BM").unwrap();
                }
            }
            assert_pointers_exist(&db, rotation.selection().unwrap());
        }
    }

    #[test]
    fn test_concurrent_selects_and_deletes_keep_invariant() {
        let (db, rotation, ids) = setup(40);
        let rotation = Arc::new(rotation);

        let deleter = {
            let rotation = Arc::clone(&rotation);
            let ids = ids.clone();
            std::thread::spawn(move || {
                for id in ids.into_iter().step_by(2) {
                    rotation.delete_image(id).unwrap();
                }
            })
        };
        let pollers: Vec<_> = (0..4)
            .map(|_| {
                let rotation = Arc::clone(&rotation);
                std::thread::spawn(move || {
                    let mut served = HashSet::new();
                    for _ in 0..25 {
                        if let Ok(image) = rotation.select_next() {
                            served.insert(image.id);
                        }
                    }
                    served
                })
            })
            .collect();

        deleter.join().unwrap();
        for poller in pollers {
            assert!(!poller.join().unwrap().is_empty());
        }
        assert_pointers_exist(&db, rotation.selection().unwrap());
    }
}
