//! Hand-coded tactical shape matching.
//!
//! The matcher answers "is the empty point `p` the key point of a known
//! 3x3 tactical shape?" for the heavy playout policy and the priors. The
//! shapes are the classic set: hane answers, cuts, and edge blocking
//! shapes. Matching walks the precomputed vicinity ring — orthogonal
//! neighbours sit at odd indices, diagonals at even ones, and the ring is
//! duplicated so `vic[i + k]` never wraps. Interior points and edge
//! points use different shape sets; corner points match nothing.

use crate::board::{Board, Color, Point};

impl Board {
    /// Does `point` complete a tactical shape for `side`?
    pub(crate) fn matches_pattern(&self, point: Point, side: Color) -> bool {
        let size = self.size;
        let size2 = self.size2;
        // Corners never match.
        if point == 1 || point == size || point == size2 || point == size * (size - 1) + 1 {
            return false;
        }

        let vic = self.topo.vicinity(point);
        let occ = |p: Point| p != 0 && self.owner[p] != 0;
        let col = |p: Point| self.stone(p);

        let interior =
            point > size && point % size != 0 && point <= size * (size - 1) && point % size != 1;

        if interior {
            for i in (1..8).step_by(2) {
                let Some(adj) = col(vic[i]) else { continue };

                if occ(vic[i - 1]) && col(vic[i - 1]) != Some(adj) {
                    if !occ(vic[i + 2]) && !occ(vic[i + 6]) {
                        // Hane enclosing the contact stone.
                        if occ(vic[i + 1]) && col(vic[i + 1]) != Some(adj) {
                            return true;
                        }
                        // Hane with open surroundings.
                        if !occ(vic[i + 1]) && !occ(vic[i + 4]) {
                            return true;
                        }
                    }
                    // Hane against a far stone.
                    if !occ(vic[i + 2])
                        && !occ(vic[i + 4])
                        && occ(vic[i + 6])
                        && col(vic[i + 6]) != Some(adj)
                    {
                        return true;
                    }
                    // Unprotected cut.
                    if occ(vic[i + 6])
                        && col(vic[i + 6]) == Some(adj)
                        && (occ(vic[i + 2]) || !occ(vic[i + 4]) || col(vic[i + 4]) == Some(adj))
                        && (occ(vic[i + 4]) || !occ(vic[i + 2]) || col(vic[i + 2]) == Some(adj))
                    {
                        return true;
                    }
                }
                if occ(vic[i + 1]) && col(vic[i + 1]) != Some(adj) {
                    if !occ(vic[i + 2]) && !occ(vic[i + 6]) && !occ(vic[i - 1]) && !occ(vic[i + 4])
                    {
                        // Mirrored open hane.
                        return true;
                    }
                    // Mirrored far hane.
                    if !occ(vic[i + 4])
                        && !occ(vic[i + 6])
                        && occ(vic[i + 2])
                        && col(vic[i + 2]) != Some(adj)
                    {
                        return true;
                    }
                }
                // Cut through a keima.
                if occ(vic[i + 2])
                    && occ(vic[i + 6])
                    && col(vic[i + 2]) != Some(adj)
                    && col(vic[i + 6]) != Some(adj)
                    && (!occ(vic[i + 4]) || col(vic[i + 4]) == Some(adj))
                    && (!occ(vic[i + 3]) || col(vic[i + 3]) == Some(adj))
                    && (!occ(vic[i + 5]) || col(vic[i + 5]) == Some(adj))
                {
                    return true;
                }
                // Hane answering the opponent's contact play.
                if adj != side
                    && occ(vic[i - 1])
                    && col(vic[i - 1]) == Some(side)
                    && !occ(vic[i + 2])
                    && !occ(vic[i + 4])
                    && !occ(vic[i + 6])
                    && occ(vic[i + 1])
                    && col(vic[i + 1]) == Some(adj)
                {
                    return true;
                }
                if adj != side
                    && occ(vic[i + 1])
                    && col(vic[i + 1]) == Some(side)
                    && !occ(vic[i + 2])
                    && !occ(vic[i + 4])
                    && !occ(vic[i + 6])
                    && occ(vic[i - 1])
                    && col(vic[i - 1]) == Some(adj)
                {
                    return true;
                }
            }
        } else {
            // First and second line shapes.
            for i in (1..8).step_by(2) {
                if vic[i] == 0 {
                    continue;
                }
                if let Some(adj) = col(vic[i]) {
                    // Block along the side.
                    if occ(vic[i + 2])
                        && col(vic[i + 2]) != Some(adj)
                        && (!occ(vic[i + 6]) || col(vic[i + 6]) != Some(adj))
                    {
                        return true;
                    }
                    if occ(vic[i + 6])
                        && col(vic[i + 6]) != Some(adj)
                        && (!occ(vic[i + 2]) || col(vic[i + 2]) != Some(adj))
                    {
                        return true;
                    }
                    if adj == side {
                        // Extend past the opponent's block.
                        if occ(vic[i + 1]) && col(vic[i + 1]) != Some(side) {
                            return true;
                        }
                        if occ(vic[i - 1]) && col(vic[i - 1]) != Some(side) {
                            return true;
                        }
                    } else {
                        if occ(vic[i + 1]) && col(vic[i + 1]) == Some(side) {
                            // Block the opponent's turn.
                            if !occ(vic[i + 2]) || col(vic[i + 2]) == Some(side) {
                                return true;
                            }
                            if occ(vic[i + 2])
                                && col(vic[i + 2]) != Some(side)
                                && occ(vic[i + 6])
                                && col(vic[i + 6]) == Some(side)
                            {
                                return true;
                            }
                        }
                        if occ(vic[i - 1]) && col(vic[i - 1]) == Some(side) {
                            if !occ(vic[i + 6]) || col(vic[i + 6]) == Some(side) {
                                return true;
                            }
                            if occ(vic[i + 6])
                                && col(vic[i + 6]) != Some(side)
                                && occ(vic[i + 2])
                                && col(vic[i + 2]) == Some(side)
                            {
                                return true;
                            }
                        }
                    }
                } else if (occ(vic[i + 6]) && occ(vic[i - 1]) && col(vic[i + 6]) != col(vic[i - 1]))
                    || (occ(vic[i + 2]) && occ(vic[i + 1]) && col(vic[i + 2]) != col(vic[i + 1]))
                {
                    // Wedge between opposing stones on the side.
                    return true;
                }
            }
        }
        false
    }
}
