use chess::{Board, BoardStatus, ChessMove, Color, MoveGen, Piece, Square, EMPTY};
use std::str::FromStr;

use crate::models::game::{DrawReason, GameStatus, Side};
use crate::services::errors::board_service_errors::BoardServiceError;

const FIFTY_MOVE_HALFMOVES: u32 = 100;

/// A chess position together with the FEN move counters, which the `chess`
/// crate does not track on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    board: Board,
    halfmove_clock: u32,
    fullmove_number: u32,
}

impl Position {
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }
}

impl Default for Position {
    fn default() -> Self {
        BoardService::initial_position()
    }
}

impl From<Color> for Side {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Side::White,
            Color::Black => Side::Black,
        }
    }
}

/// Standard chess rules over FEN-encoded positions.
#[derive(Clone, Default)]
pub struct BoardService;

impl BoardService {
    pub fn initial_position() -> Position {
        Position {
            board: Board::default(),
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// Parse a full six-field FEN.
    pub fn decode(fen: &str) -> Result<Position, BoardServiceError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(BoardServiceError::InvalidPosition(format!(
                "expected 6 FEN fields, got {}",
                fields.len()
            )));
        }

        let board = Board::from_str(&fields.join(" "))
            .map_err(|e| BoardServiceError::InvalidPosition(format!("Invalid FEN: {}", e)))?;
        let halfmove_clock = fields[4].parse::<u32>().map_err(|_| {
            BoardServiceError::InvalidPosition(format!("Invalid halfmove clock: {}", fields[4]))
        })?;
        let fullmove_number = match fields[5].parse::<u32>() {
            Ok(n) if n >= 1 => n,
            _ => {
                return Err(BoardServiceError::InvalidPosition(format!(
                    "Invalid fullmove number: {}",
                    fields[5]
                )))
            }
        };

        Ok(Position {
            board,
            halfmove_clock,
            fullmove_number,
        })
    }

    pub fn encode(position: &Position) -> String {
        // The crate writes placeholder counters; keep its first four fields.
        let board_fen = position.board.to_string();
        let head: Vec<&str> = board_fen.split_whitespace().take(4).collect();
        format!(
            "{} {} {}",
            head.join(" "),
            position.halfmove_clock,
            position.fullmove_number
        )
    }

    pub fn side_to_move(position: &Position) -> Side {
        position.board.side_to_move().into()
    }

    pub fn is_check(position: &Position) -> bool {
        position.board.checkers().popcnt() > 0
    }

    pub fn status(position: &Position) -> GameStatus {
        match position.board.status() {
            BoardStatus::Checkmate => GameStatus::Checkmate {
                winner: Self::side_to_move(position).opponent(),
            },
            BoardStatus::Stalemate => GameStatus::Stalemate,
            BoardStatus::Ongoing if has_insufficient_material(&position.board) => {
                GameStatus::Draw {
                    reason: DrawReason::InsufficientMaterial,
                }
            }
            BoardStatus::Ongoing if position.halfmove_clock >= FIFTY_MOVE_HALFMOVES => {
                GameStatus::Draw {
                    reason: DrawReason::FiftyMoveRule,
                }
            }
            BoardStatus::Ongoing => GameStatus::Ongoing,
        }
    }

    /// Validate a move for the side to move and return the resulting position.
    pub fn apply_move(
        position: &Position,
        from_square: &str,
        to_square: &str,
        promotion_piece: Option<&str>,
    ) -> Result<Position, BoardServiceError> {
        if Self::status(position).is_over() {
            return Err(BoardServiceError::GameOver);
        }

        let from_sq = parse_square(from_square)?;
        let to_sq = parse_square(to_square)?;
        let promotion = promotion_piece.map(parse_promotion).transpose()?;

        let chess_move = ChessMove::new(from_sq, to_sq, promotion);

        // Full legal move generation: checks, pins, castling, en passant.
        if !MoveGen::new_legal(&position.board).any(|m| m == chess_move) {
            return Err(BoardServiceError::IllegalMove(format_move(chess_move)));
        }

        let board = &position.board;
        let resets_clock =
            board.piece_on(from_sq) == Some(Piece::Pawn) || board.piece_on(to_sq).is_some();
        let fullmove_number = match board.side_to_move() {
            Color::White => position.fullmove_number,
            Color::Black => position.fullmove_number + 1,
        };

        Ok(Position {
            board: board.make_move_new(chess_move),
            halfmove_clock: if resets_clock {
                0
            } else {
                position.halfmove_clock + 1
            },
            fullmove_number,
        })
    }

    /// Legal moves for the side to move, as `e2e4` / `a7a8q`.
    pub fn legal_moves(position: &Position) -> Vec<String> {
        MoveGen::new_legal(&position.board).map(format_move).collect()
    }
}

fn parse_square(square: &str) -> Result<Square, BoardServiceError> {
    Square::from_str(&square.trim().to_ascii_lowercase())
        .map_err(|_| BoardServiceError::InvalidSquare(square.to_string()))
}

fn parse_promotion(piece: &str) -> Result<Piece, BoardServiceError> {
    match piece.trim().to_ascii_lowercase().as_str() {
        "q" => Ok(Piece::Queen),
        "r" => Ok(Piece::Rook),
        "b" => Ok(Piece::Bishop),
        "n" => Ok(Piece::Knight),
        _ => Err(BoardServiceError::InvalidPromotion(piece.to_string())),
    }
}

fn format_move(chess_move: ChessMove) -> String {
    let promotion = match chess_move.get_promotion() {
        Some(Piece::Queen) => "q",
        Some(Piece::Rook) => "r",
        Some(Piece::Bishop) => "b",
        Some(Piece::Knight) => "n",
        _ => "",
    };
    format!(
        "{}{}{}",
        chess_move.get_source(),
        chess_move.get_dest(),
        promotion
    )
}

/// Neither side can ever deliver mate: bare kings, a single minor piece, or
/// only bishops that all stand on one square colour.
fn has_insufficient_material(board: &Board) -> bool {
    let heavy =
        *board.pieces(Piece::Pawn) | *board.pieces(Piece::Rook) | *board.pieces(Piece::Queen);
    if heavy != EMPTY {
        return false;
    }

    let knights = board.pieces(Piece::Knight).popcnt();
    let bishops = *board.pieces(Piece::Bishop);
    match (knights, bishops.popcnt()) {
        (0, 0) | (1, 0) | (0, 1) => true,
        (0, _) => {
            let mut colours =
                bishops.map(|sq| (sq.get_rank().to_index() + sq.get_file().to_index()) % 2);
            let first = colours.next();
            colours.all(|c| Some(c) == first)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::game::STARTING_FEN;
    use proptest::prelude::*;
    use test_case::test_case;

    fn play(moves: &[(&str, &str)]) -> Position {
        moves.iter().fold(BoardService::initial_position(), |pos, (from, to)| {
            BoardService::apply_move(&pos, from, to, None).unwrap()
        })
    }

    #[test]
    fn test_initial_position_encodes_to_standard_fen() {
        let position = BoardService::initial_position();

        assert_eq!(BoardService::encode(&position), STARTING_FEN);
        assert_eq!(BoardService::decode(STARTING_FEN).unwrap(), position);
        assert_eq!(BoardService::side_to_move(&position), Side::White);
        assert_eq!(BoardService::status(&position), GameStatus::Ongoing);
    }

    #[test]
    fn test_legal_moves_starting_position() {
        let legal_moves = BoardService::legal_moves(&BoardService::initial_position());

        assert_eq!(legal_moves.len(), 20);
        assert!(legal_moves.contains(&"e2e3".to_string()));
        assert!(legal_moves.contains(&"d2d4".to_string()));
        assert!(legal_moves.contains(&"b1c3".to_string()));
    }

    #[test]
    fn test_two_ply_opening() {
        let position = play(&[("e2", "e4"), ("e7", "e5")]);
        let fen = BoardService::encode(&position);

        assert!(fen.starts_with("rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq"));
        assert!(fen.ends_with(" 0 2"));
        assert_eq!(BoardService::side_to_move(&position), Side::White);
    }

    #[test]
    fn test_apply_move_flips_side() {
        let start = BoardService::initial_position();
        let next = BoardService::apply_move(&start, "E2", "e4", None).unwrap();

        assert_eq!(BoardService::side_to_move(&next), Side::Black);
        assert_eq!(next.fullmove_number(), 1);
    }

    #[test_case("e2", "e5" ; "pawn cannot jump three squares")]
    #[test_case("e7", "e5" ; "cannot move opponent piece")]
    #[test_case("b1", "b3" ; "knight does not move straight")]
    #[test_case("e1", "e2" ; "king onto own piece")]
    #[test_case("e4", "e5" ; "empty source square")]
    fn test_illegal_from_start(from: &str, to: &str) {
        let start = BoardService::initial_position();

        let result = BoardService::apply_move(&start, from, to, None);

        assert!(matches!(result, Err(BoardServiceError::IllegalMove(_))));
    }

    #[test]
    fn test_illegal_pawn_advance_after_two_plies() {
        let position = play(&[("e2", "e4"), ("e7", "e5")]);

        let result = BoardService::apply_move(&position, "e4", "e6", None);

        assert!(matches!(result, Err(BoardServiceError::IllegalMove(_))));
    }

    #[test]
    fn test_pinned_piece_cannot_expose_king() {
        let position = BoardService::decode("k3r3/8/8/8/8/8/4B3/4K3 w - - 0 1").unwrap();

        let result = BoardService::apply_move(&position, "e2", "d3", None);

        assert!(matches!(result, Err(BoardServiceError::IllegalMove(_))));
    }

    #[test]
    fn test_king_cannot_walk_into_check() {
        let position = BoardService::decode("k2r4/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();

        assert!(BoardService::apply_move(&position, "e1", "d1", None).is_err());
        assert!(BoardService::apply_move(&position, "e1", "f1", None).is_ok());
    }

    #[test]
    fn test_castling() {
        let position = BoardService::decode("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();

        let castled = BoardService::apply_move(&position, "e1", "g1", None).unwrap();
        let fen = BoardService::encode(&castled);

        assert!(fen.starts_with("r3k2r/8/8/8/8/8/8/R4RK1 b kq"));
    }

    #[test]
    fn test_cannot_castle_through_check() {
        let position = BoardService::decode("r3kr2/8/8/8/8/8/8/R3K2R w KQq - 0 1").unwrap();

        let result = BoardService::apply_move(&position, "e1", "g1", None);

        assert!(matches!(result, Err(BoardServiceError::IllegalMove(_))));
        assert!(BoardService::apply_move(&position, "e1", "c1", None).is_ok());
    }

    #[test]
    fn test_en_passant_capture() {
        let position = BoardService::decode("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2").unwrap();

        let captured = BoardService::apply_move(&position, "e5", "d6", None).unwrap();
        let fen = BoardService::encode(&captured);

        assert!(fen.starts_with("4k3/8/3P4/8/8/8/8/4K3 b"));
        assert_eq!(captured.halfmove_clock(), 0);
    }

    #[test]
    fn test_promotion() {
        let position = BoardService::decode("8/P7/8/8/8/8/8/K6k w - - 0 1").unwrap();

        let promoted = BoardService::apply_move(&position, "a7", "a8", Some("q")).unwrap();
        assert!(BoardService::encode(&promoted).starts_with("Q7/"));

        let knight = BoardService::apply_move(&position, "a7", "a8", Some("N")).unwrap();
        assert!(BoardService::encode(&knight).starts_with("N7/"));
    }

    #[test]
    fn test_promotion_requires_piece() {
        let position = BoardService::decode("8/P7/8/8/8/8/8/K6k w - - 0 1").unwrap();

        assert!(matches!(
            BoardService::apply_move(&position, "a7", "a8", None),
            Err(BoardServiceError::IllegalMove(_))
        ));
        assert!(matches!(
            BoardService::apply_move(&position, "a7", "a8", Some("k")),
            Err(BoardServiceError::InvalidPromotion(_))
        ));
    }

    #[test]
    fn test_invalid_square() {
        let start = BoardService::initial_position();

        assert!(matches!(
            BoardService::apply_move(&start, "z9", "e4", None),
            Err(BoardServiceError::InvalidSquare(_))
        ));
        assert!(matches!(
            BoardService::apply_move(&start, "e2", "", None),
            Err(BoardServiceError::InvalidSquare(_))
        ));
    }

    #[test]
    fn test_fools_mate() {
        let position = play(&[("f2", "f3"), ("e7", "e5"), ("g2", "g4"), ("d8", "h4")]);

        assert_eq!(
            BoardService::status(&position),
            GameStatus::Checkmate {
                winner: Side::Black
            }
        );
        assert!(BoardService::is_check(&position));
        assert!(BoardService::legal_moves(&position).is_empty());
        assert_eq!(
            BoardService::apply_move(&position, "e2", "e3", None),
            Err(BoardServiceError::GameOver)
        );
    }

    #[test]
    fn test_stalemate() {
        let position = BoardService::decode("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();

        assert_eq!(BoardService::status(&position), GameStatus::Stalemate);
        assert!(!BoardService::is_check(&position));
    }

    #[test_case("8/8/8/4k3/8/8/8/4K3 w - - 0 1" ; "bare kings")]
    #[test_case("8/8/8/4k3/8/8/8/3NK3 w - - 0 1" ; "lone knight")]
    #[test_case("8/8/8/4k3/8/8/8/2B1K1b1 w - - 0 1" ; "bishops on same colour")]
    fn test_insufficient_material(fen: &str) {
        let position = BoardService::decode(fen).unwrap();

        assert_eq!(
            BoardService::status(&position),
            GameStatus::Draw {
                reason: DrawReason::InsufficientMaterial
            }
        );
        assert_eq!(
            BoardService::apply_move(&position, "e1", "e2", None),
            Err(BoardServiceError::GameOver)
        );
    }

    #[test_case("8/8/8/4k3/8/8/4P3/4K3 w - - 0 1" ; "pawn left")]
    #[test_case("8/8/8/4k3/8/8/8/2B1KB2 w - - 0 1" ; "bishop pair")]
    #[test_case("8/8/8/4k3/8/8/8/3NKN2 w - - 0 1" ; "two knights")]
    fn test_sufficient_material(fen: &str) {
        let position = BoardService::decode(fen).unwrap();

        assert_eq!(BoardService::status(&position), GameStatus::Ongoing);
    }

    #[test]
    fn test_fifty_move_rule() {
        let position = BoardService::decode("8/8/8/4k3/8/8/8/R3K3 w - - 98 80").unwrap();

        let next = BoardService::apply_move(&position, "a1", "a2", None).unwrap();
        assert_eq!(next.halfmove_clock(), 99);
        assert_eq!(BoardService::status(&next), GameStatus::Ongoing);

        let last = BoardService::apply_move(&next, "e5", "e6", None).unwrap();
        assert_eq!(last.halfmove_clock(), 100);
        assert_eq!(last.fullmove_number(), 81);
        assert_eq!(
            BoardService::status(&last),
            GameStatus::Draw {
                reason: DrawReason::FiftyMoveRule
            }
        );
    }

    #[test]
    fn test_pawn_move_resets_halfmove_clock() {
        let position = BoardService::decode("4k3/8/8/8/8/8/4P3/4K2R w K - 12 30").unwrap();

        let quiet = BoardService::apply_move(&position, "h1", "h2", None).unwrap();
        assert_eq!(quiet.halfmove_clock(), 13);

        let pawn = BoardService::apply_move(&position, "e2", "e4", None).unwrap();
        assert_eq!(pawn.halfmove_clock(), 0);
    }

    #[test_case("" ; "empty")]
    #[test_case("not a fen at all" ; "garbage")]
    #[test_case("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -" ; "missing counters")]
    #[test_case("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - x 1" ; "bad halfmove")]
    #[test_case("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 0" ; "zero fullmove")]
    #[test_case("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNX w KQkq - 0 1" ; "bad piece")]
    fn test_decode_rejects(fen: &str) {
        assert!(matches!(
            BoardService::decode(fen),
            Err(BoardServiceError::InvalidPosition(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_encode_decode_roundtrip(choices in proptest::collection::vec(any::<usize>(), 0..80)) {
            let mut position = BoardService::initial_position();
            for choice in choices {
                let decoded = BoardService::decode(&BoardService::encode(&position)).unwrap();
                prop_assert_eq!(decoded, position);

                let moves: Vec<ChessMove> = MoveGen::new_legal(&position.board).collect();
                if moves.is_empty() || BoardService::status(&position).is_over() {
                    break;
                }
                let chosen = format_move(moves[choice % moves.len()]);
                let (from, rest) = chosen.split_at(2);
                let (to, promotion) = rest.split_at(2);
                let promotion = if promotion.is_empty() { None } else { Some(promotion) };
                position = BoardService::apply_move(&position, from, to, promotion).unwrap();
            }
        }
    }
}
