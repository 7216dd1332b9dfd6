//! In-memory results view
//!
//! Keeps the rendered cards as plain data. Used by the command line front
//! end, which prints a snapshot once loading has settled, and by tests.

use std::fmt;
use std::sync::Mutex;

use super::{Card, CardId, LoadedImage, ResultsView};
use crate::config::messages;
use crate::utils::format_size;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSlot {
    Loading,
    Loaded { url: String, size: usize },
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub id: CardId,
    pub card: Card,
    pub image: ImageSlot,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewSnapshot {
    pub message: Option<String>,
    pub cards: Vec<CardView>,
}

#[derive(Default)]
pub struct MemoryView {
    state: Mutex<ViewSnapshot>,
}

impl MemoryView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        match self.state.lock() {
            Ok(state) => state.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn update<F: FnOnce(&mut ViewSnapshot)>(&self, f: F) {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut state);
    }

    /// Set the image slot of a shown card; unknown ids are ignored
    fn set_slot(&self, id: CardId, slot: ImageSlot) {
        self.update(|state| {
            if let Some(card) = state.cards.iter_mut().find(|c| c.id == id) {
                if card.image == ImageSlot::Loading {
                    card.image = slot;
                }
            }
        });
    }
}

impl ResultsView for MemoryView {
    fn clear(&self) {
        self.update(|state| {
            state.message = None;
            state.cards.clear();
        });
    }

    fn show_message(&self, message: &str) {
        self.update(|state| {
            state.cards.clear();
            state.message = Some(message.to_string());
        });
    }

    fn add_card(&self, id: CardId, card: &Card) {
        self.update(|state| {
            state.cards.push(CardView {
                id,
                card: card.clone(),
                image: ImageSlot::Loading,
            });
        });
    }

    fn show_image(&self, id: CardId, image: LoadedImage) {
        self.set_slot(
            id,
            ImageSlot::Loaded {
                url: image.url,
                size: image.bytes.len(),
            },
        );
    }

    fn show_image_failed(&self, id: CardId) {
        self.set_slot(id, ImageSlot::Failed);
    }
}

impl fmt::Display for ViewSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(message) = &self.message {
            writeln!(f, "{}", message)?;
        }
        for card in &self.cards {
            writeln!(f, "[{}] {}", card.id.index + 1, card.card.object_key)?;
            match &card.image {
                ImageSlot::Loading => writeln!(f, "    {}", messages::LOADING)?,
                ImageSlot::Loaded { url, size } => {
                    writeln!(f, "    {} ({})", url, format_size(*size as u64))?
                }
                ImageSlot::Failed => writeln!(f, "    {}", messages::IMAGE_FAILED)?,
            }
            writeln!(f, "    Labels: {}", card.card.labels)?;
            writeln!(f, "    Created: {}", card.card.created)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(key: &str) -> Card {
        Card {
            object_key: key.to_string(),
            image_url: format!("https://b.example.com/{}", key),
            labels: "cat, sunset".to_string(),
            created: "11/14/2023".to_string(),
        }
    }

    fn id(generation: u64, index: usize) -> CardId {
        CardId { generation, index }
    }

    #[test]
    fn test_image_replaces_placeholder_once() {
        let view = MemoryView::new();
        view.add_card(id(1, 0), &card("a.jpg"));
        view.show_image(
            id(1, 0),
            LoadedImage {
                url: "https://b.example.com/a.jpg".to_string(),
                bytes: vec![0; 10],
            },
        );
        view.show_image_failed(id(1, 0));

        assert!(matches!(
            view.snapshot().cards[0].image,
            ImageSlot::Loaded { size: 10, .. }
        ));
    }

    #[test]
    fn test_updates_for_removed_cards_are_ignored() {
        let view = MemoryView::new();
        view.add_card(id(1, 0), &card("old.jpg"));
        view.clear();
        view.add_card(id(2, 0), &card("new.jpg"));
        view.show_image_failed(id(1, 0));

        let snapshot = view.snapshot();
        assert_eq!(snapshot.cards.len(), 1);
        assert_eq!(snapshot.cards[0].image, ImageSlot::Loading);
    }

    #[test]
    fn test_display_lists_cards() {
        let view = MemoryView::new();
        view.add_card(id(1, 0), &card("a.jpg"));
        view.show_image_failed(id(1, 0));

        let text = view.snapshot().to_string();
        assert!(text.contains("[1] a.jpg"));
        assert!(text.contains("Image failed to load"));
        assert!(text.contains("Labels: cat, sunset"));
        assert!(text.contains("Created: 11/14/2023"));
    }
}
