//! Position representation and the operations that mutate it
//! (`spec.md` §3-§4.4, §6.3).

mod fen;
mod make_move;
mod movegen;
mod position;
mod side;

pub use fen::{parse_fen, to_fen};
pub use make_move::{make_move, make_null_move};
pub use movegen::{generate_moves, is_legal};
pub use position::Position;
pub use side::{piece_attacks, SideState};
