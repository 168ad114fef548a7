use crate::types::Square;

pub const FILES: [char; 8] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H'];

/// All 64 squares in canonical index order (`file + 8 * rank`).
pub const SQUARES: [Square; 64] = [
    Square::new_unchecked(0, 0),
    Square::new_unchecked(1, 0),
    Square::new_unchecked(2, 0),
    Square::new_unchecked(3, 0),
    Square::new_unchecked(4, 0),
    Square::new_unchecked(5, 0),
    Square::new_unchecked(6, 0),
    Square::new_unchecked(7, 0),
    Square::new_unchecked(0, 1),
    Square::new_unchecked(1, 1),
    Square::new_unchecked(2, 1),
    Square::new_unchecked(3, 1),
    Square::new_unchecked(4, 1),
    Square::new_unchecked(5, 1),
    Square::new_unchecked(6, 1),
    Square::new_unchecked(7, 1),
    Square::new_unchecked(0, 2),
    Square::new_unchecked(1, 2),
    Square::new_unchecked(2, 2),
    Square::new_unchecked(3, 2),
    Square::new_unchecked(4, 2),
    Square::new_unchecked(5, 2),
    Square::new_unchecked(6, 2),
    Square::new_unchecked(7, 2),
    Square::new_unchecked(0, 3),
    Square::new_unchecked(1, 3),
    Square::new_unchecked(2, 3),
    Square::new_unchecked(3, 3),
    Square::new_unchecked(4, 3),
    Square::new_unchecked(5, 3),
    Square::new_unchecked(6, 3),
    Square::new_unchecked(7, 3),
    Square::new_unchecked(0, 4),
    Square::new_unchecked(1, 4),
    Square::new_unchecked(2, 4),
    Square::new_unchecked(3, 4),
    Square::new_unchecked(4, 4),
    Square::new_unchecked(5, 4),
    Square::new_unchecked(6, 4),
    Square::new_unchecked(7, 4),
    Square::new_unchecked(0, 5),
    Square::new_unchecked(1, 5),
    Square::new_unchecked(2, 5),
    Square::new_unchecked(3, 5),
    Square::new_unchecked(4, 5),
    Square::new_unchecked(5, 5),
    Square::new_unchecked(6, 5),
    Square::new_unchecked(7, 5),
    Square::new_unchecked(0, 6),
    Square::new_unchecked(1, 6),
    Square::new_unchecked(2, 6),
    Square::new_unchecked(3, 6),
    Square::new_unchecked(4, 6),
    Square::new_unchecked(5, 6),
    Square::new_unchecked(6, 6),
    Square::new_unchecked(7, 6),
    Square::new_unchecked(0, 7),
    Square::new_unchecked(1, 7),
    Square::new_unchecked(2, 7),
    Square::new_unchecked(3, 7),
    Square::new_unchecked(4, 7),
    Square::new_unchecked(5, 7),
    Square::new_unchecked(6, 7),
    Square::new_unchecked(7, 7),
];

