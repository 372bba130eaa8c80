use crate::domain::card::{Card, CardInput};
use crate::domain::ports::SharedStore;
use crate::error::Result;
use crate::infrastructure::codec::{read_json, write_json};
use tracing::{info, warn};

/// Store key of a user's saved cards.
pub fn vault_key(user_id: &str) -> String {
    format!("saved_cards_{user_id}")
}

/// Per-user saved payment cards.
#[derive(Clone)]
pub struct CardVault {
    store: SharedStore,
}

impl CardVault {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Saved cards of `user_id` in the order they were added. Empty for an
    /// anonymous session.
    pub async fn list_cards(&self, user_id: Option<&str>) -> Result<Vec<Card>> {
        let Some(user_id) = user_id else {
            return Ok(Vec::new());
        };
        Ok(read_json(self.store.as_ref(), &vault_key(user_id))
            .await?
            .unwrap_or_default())
    }

    /// Validates `input` and builds the masked card.
    ///
    /// With `save` set and a known user the card is appended to that user's
    /// vault; otherwise it is only returned.
    pub async fn add_card(&self, user_id: Option<&str>, input: CardInput, save: bool) -> Result<Card> {
        let card = input.into_card()?;

        match (save, user_id) {
            (true, Some(user_id)) => {
                let mut cards = self.list_cards(Some(user_id)).await?;
                cards.push(card.clone());
                write_json(self.store.as_ref(), &vault_key(user_id), &cards).await?;
                info!(user_id, card_id = %card.id, last4 = %card.last4, "card saved");
            }
            (true, None) => {
                warn!(last4 = %card.last4, "no signed-in user, card kept for this checkout only");
            }
            (false, _) => {}
        }
        Ok(card)
    }
}
