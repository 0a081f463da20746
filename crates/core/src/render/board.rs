//! The query position and the FEN variants shown around the board

use std::num::NonZeroU32;

use serde::Serialize;
use shakmaty::{
    fen::{Fen, LossyFenError},
    Board, CastlingMode, Chess, Color, EnPassantMode, Position, Setup, Square,
};

use crate::material::MaterialKey;

pub const DEFAULT_FEN: &str = "4k3/8/8/8/8/8/8/4K3 w - - 0 1";

fn default_setup() -> Setup {
    let mut board = Board::empty();
    board.set_piece_at(Square::E8, Color::Black.king());
    board.set_piece_at(Square::E1, Color::White.king());
    let mut setup = Setup::empty();
    setup.board = board;
    setup
}

/// Position requested by the user, normalized for display and probing.
///
/// Accepts any parsable FEN, legal or not; unparsable input falls back to
/// [`DEFAULT_FEN`]. Move counters are always reset.
#[derive(Debug, Clone)]
pub struct QueryBoard {
    setup: Setup,
    position: Option<Chess>,
    fen: String,
}

/// Standard chess setups have no pockets or check counters, so nothing is lost.
fn fen_of(setup: Setup) -> Fen {
    Fen::try_from_setup(setup).unwrap_or_else(LossyFenError::ignore)
}

impl QueryBoard {
    pub fn parse(input: Option<&str>) -> Self {
        let setup = input
            .map(|raw| raw.replace('_', " "))
            .and_then(|raw| raw.trim().parse::<Fen>().ok())
            .map(Fen::into_setup)
            .unwrap_or_else(default_setup);
        Self::from_setup(setup)
    }

    pub fn from_setup(mut setup: Setup) -> Self {
        setup.halfmoves = 0;
        setup.fullmoves = NonZeroU32::MIN;

        let position: Option<Chess> = fen_of(setup.clone())
            .into_position(CastlingMode::Standard)
            .ok();
        let fen = match &position {
            Some(pos) => Fen::from_position(pos, EnPassantMode::Legal).to_string(),
            None => fen_of(setup.clone()).to_string(),
        };

        Self { setup, position, fen }
    }

    pub fn fen(&self) -> &str {
        &self.fen
    }

    /// The legal position, if the setup is one.
    pub fn position(&self) -> Option<&Chess> {
        self.position.as_ref()
    }

    pub fn turn(&self) -> Color {
        self.setup.turn
    }

    pub fn material(&self) -> MaterialKey {
        MaterialKey::calc_key(&self.setup.board)
    }

    pub fn piece_count(&self) -> usize {
        self.setup.board.occupied().count()
    }

    fn board_fen(&self) -> &str {
        self.fen.split(' ').next().unwrap_or_default()
    }

    fn with_turn(&self, turn: Color) -> String {
        if turn == self.setup.turn {
            return self.fen.clone();
        }
        let mut setup = self.setup.clone();
        setup.turn = turn;
        setup.ep_square = None;
        fen_of(setup).to_string()
    }

    fn check_square(&self) -> Option<String> {
        let pos = self.position.as_ref()?;
        if !pos.is_check() {
            return None;
        }
        pos.board().king_of(pos.turn()).map(|sq| sq.to_string())
    }

    fn transformed(&self, board: String) -> String {
        format!("{} {} - - 0 1", board, self.setup.turn.char())
    }

    pub fn strings(&self) -> BoardStrings {
        let board_fen = self.board_fen().to_string();

        let vertical = board_fen.split('/').rev().collect::<Vec<_>>().join("/");
        let horizontal = board_fen
            .split('/')
            .map(|rank| rank.chars().rev().collect::<String>())
            .collect::<Vec<_>>()
            .join("/");

        let mut clear = default_setup();
        clear.turn = self.setup.turn;

        BoardStrings {
            fen: self.fen.clone(),
            white_fen: self.with_turn(Color::White),
            black_fen: self.with_turn(Color::Black),
            check_square: self.check_square(),
            turn: if self.setup.turn == Color::White { "white" } else { "black" },
            horizontal_fen: self.transformed(horizontal),
            vertical_fen: self.transformed(vertical),
            swapped_fen: self.with_turn(!self.setup.turn),
            clear_fen: fen_of(clear).to_string(),
            fen_input: if self.fen == DEFAULT_FEN { String::new() } else { self.fen.clone() },
            board_fen,
        }
    }
}

impl Default for QueryBoard {
    fn default() -> Self {
        Self::from_setup(default_setup())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardStrings {
    pub fen: String,
    pub white_fen: String,
    pub black_fen: String,
    pub board_fen: String,
    pub check_square: Option<String>,
    pub turn: &'static str,
    pub horizontal_fen: String,
    pub vertical_fen: String,
    pub swapped_fen: String,
    pub clear_fen: String,
    pub fen_input: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_and_garbage_fall_back() {
        assert_eq!(QueryBoard::default().fen(), DEFAULT_FEN);
        assert_eq!(QueryBoard::parse(None).fen(), DEFAULT_FEN);
        assert_eq!(QueryBoard::parse(Some("not a fen")).fen(), DEFAULT_FEN);
        assert_eq!(QueryBoard::default().strings().fen_input, "");
    }

    #[test]
    fn test_underscores_and_counters() {
        let board = QueryBoard::parse(Some("8/8/8/8/8/8/2k5/KR6_w_-_-_37_80"));
        assert_eq!(board.fen(), "8/8/8/8/8/8/2k5/KR6 w - - 0 1");
        assert!(board.position().is_some());
        assert_eq!(board.material().to_string(), "KRvK");
        assert_eq!(board.piece_count(), 3);
    }

    #[test]
    fn test_board_strings() {
        let board = QueryBoard::parse(Some("8/8/8/8/8/8/2k5/KR6 w - - 0 1"));
        let strings = board.strings();
        assert_eq!(strings.board_fen, "8/8/8/8/8/8/2k5/KR6");
        assert_eq!(strings.white_fen, "8/8/8/8/8/8/2k5/KR6 w - - 0 1");
        assert_eq!(strings.black_fen, "8/8/8/8/8/8/2k5/KR6 b - - 0 1");
        assert_eq!(strings.swapped_fen, strings.black_fen);
        assert_eq!(strings.vertical_fen, "KR6/2k5/8/8/8/8/8/8 w - - 0 1");
        assert_eq!(strings.horizontal_fen, "8/8/8/8/8/8/5k2/6RK w - - 0 1");
        assert_eq!(strings.clear_fen, DEFAULT_FEN);
        assert_eq!(strings.fen_input, strings.fen);
        assert_eq!(strings.turn, "white");
        assert_eq!(strings.check_square, None);
    }

    #[test]
    fn test_check_square_and_clear_keeps_turn() {
        let board = QueryBoard::parse(Some("1R2k3/8/8/8/8/8/8/4K3 b - - 0 1"));
        let strings = board.strings();
        assert_eq!(strings.check_square.as_deref(), Some("e8"));
        assert_eq!(strings.clear_fen, "4k3/8/8/8/8/8/8/4K3 b - - 0 1");
        assert_eq!(strings.turn, "black");
    }

    #[test]
    fn test_illegal_setup_is_kept() {
        // Side not to move is in check.
        let board = QueryBoard::parse(Some("4k2R/8/8/8/8/8/8/4K3 w - - 0 1"));
        assert!(board.position().is_none());
        assert_eq!(board.fen(), "4k2R/8/8/8/8/8/8/4K3 w - - 0 1");
        assert_eq!(board.strings().check_square, None);
    }
}
