//! The live board and its persistence loop.

use crate::{
    domain::{reducer, Board, CardPatch, DragIntent, IdMinter, ListPatch},
    error::Result,
    storage::BoardStore,
};
use tracing::error;

/// Owns the live board, the backing store, and the id minter.
///
/// The board starts absent; until [`load`](Self::load) completes every
/// mutating method is a no-op. A mutation that applies replaces the
/// in-memory snapshot and is saved through the store. The snapshot keeps
/// the mutation even when the save fails; the classified save error is
/// returned for the caller to surface.
pub struct BoardSession<S: BoardStore> {
    store: S,
    board: Option<Board>,
    ids: IdMinter,
}

impl<S: BoardStore> BoardSession<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            board: None,
            ids: IdMinter::new(),
        }
    }

    /// Loads the board through the store (fail-open) and seeds the id
    /// minter from it. Safe to call again; the stored snapshot wins.
    pub async fn load(&mut self) {
        let board = self.store.load().await;
        self.ids = IdMinter::seeded_from(&board);
        self.board = Some(board);
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.board.is_some()
    }

    /// The backing store, for probes and clearing.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Replaces the board title. Empty titles are kept as given.
    pub async fn update_board_title(&mut self, title: impl Into<String>) -> Result<()> {
        let Some(board) = &self.board else {
            return Ok(());
        };
        let next = reducer::update_board_title(board, title);
        self.commit(next).await
    }

    /// Appends a fresh list and returns its minted id.
    pub async fn add_list(&mut self) -> Result<Option<String>> {
        let Some(board) = &self.board else {
            return Ok(None);
        };
        let id = self.ids.next_list_id();
        let next = reducer::add_list(board, id.as_str());
        self.commit(next).await?;
        Ok(Some(id))
    }

    pub async fn update_list(&mut self, list_id: &str, patch: ListPatch) -> Result<()> {
        let Some(board) = &self.board else {
            return Ok(());
        };
        match reducer::update_list(board, list_id, patch) {
            Some(next) => self.commit(next).await,
            None => Ok(()),
        }
    }

    pub async fn delete_list(&mut self, list_id: &str) -> Result<()> {
        let Some(board) = &self.board else {
            return Ok(());
        };
        match reducer::delete_list(board, list_id) {
            Some(next) => self.commit(next).await,
            None => Ok(()),
        }
    }

    pub async fn reorder_lists(&mut self, source_index: usize, dest_index: usize) -> Result<()> {
        let Some(board) = &self.board else {
            return Ok(());
        };
        match reducer::reorder_lists(board, source_index, dest_index) {
            Some(next) => self.commit(next).await,
            None => Ok(()),
        }
    }

    /// Appends a fresh card to the list and returns its minted id, or
    /// `None` when the list is unknown.
    pub async fn add_card(&mut self, list_id: &str) -> Result<Option<String>> {
        let Some(board) = &self.board else {
            return Ok(None);
        };
        let id = self.ids.next_card_id();
        let Some(next) = reducer::add_card(board, list_id, id.as_str()) else {
            return Ok(None);
        };
        self.commit(next).await?;
        Ok(Some(id))
    }

    pub async fn update_card(&mut self, card_id: &str, patch: CardPatch) -> Result<()> {
        let Some(board) = &self.board else {
            return Ok(());
        };
        match reducer::update_card(board, card_id, patch) {
            Some(next) => self.commit(next).await,
            None => Ok(()),
        }
    }

    pub async fn reorder_cards(
        &mut self,
        source_list_id: &str,
        dest_list_id: &str,
        source_index: usize,
        dest_index: usize,
    ) -> Result<()> {
        let Some(board) = &self.board else {
            return Ok(());
        };
        match reducer::reorder_cards(
            board,
            source_list_id,
            dest_list_id,
            source_index,
            dest_index,
        ) {
            Some(next) => self.commit(next).await,
            None => Ok(()),
        }
    }

    /// Appends a comment to the card and returns its minted id, or `None`
    /// when the card is unknown. Text is stored as given; callers decide
    /// what to do with blank input.
    pub async fn add_comment(
        &mut self,
        card_id: &str,
        text: impl Into<String>,
    ) -> Result<Option<String>> {
        let Some(board) = &self.board else {
            return Ok(None);
        };
        let id = self.ids.next_comment_id();
        let Some(next) = reducer::add_comment(board, card_id, id.as_str(), text) else {
            return Ok(None);
        };
        self.commit(next).await?;
        Ok(Some(id))
    }

    /// Dispatches a resolved drag intent onto the reorder operations.
    pub async fn apply(&mut self, intent: DragIntent) -> Result<()> {
        match intent {
            DragIntent::ReorderLists {
                source_index,
                dest_index,
            } => self.reorder_lists(source_index, dest_index).await,
            DragIntent::ReorderCards {
                source_list_id,
                dest_list_id,
                source_index,
                dest_index,
            } => {
                self.reorder_cards(&source_list_id, &dest_list_id, source_index, dest_index)
                    .await
            }
        }
    }

    async fn commit(&mut self, board: Board) -> Result<()> {
        let result = self.store.save(&board).await;
        self.board = Some(board);
        if let Err(err) = &result {
            error!(%err, "failed to save board");
        }
        result
    }
}
